//! # Gallery resolvers
//!
//! One resolver per image backend. Each turns an image coordinate into a
//! fully-qualified image reference, paging through listings where the backend
//! paginates. Resolvers never cache; the [`Provider`](crate::Provider) wraps
//! them.

pub mod community;
pub mod custom;
pub mod shared;

pub use community::CommunityResolver;
pub use custom::CustomResolver;
pub use shared::SharedResolver;

use chrono::{DateTime, Utc};

/// Tracks the most recently published item seen so far.
///
/// The first item offered seeds the candidate; later items replace it only
/// when published strictly after it, so ties keep the earlier item. Items
/// without a publish date never replace a candidate.
#[derive(Debug)]
pub(crate) struct Newest<T> {
    candidate: Option<(T, Option<DateTime<Utc>>)>,
}

impl<T> Default for Newest<T> {
    fn default() -> Self {
        Self { candidate: None }
    }
}

impl<T> Newest<T> {
    pub(crate) fn offer(&mut self, item: T, published: Option<DateTime<Utc>>) {
        let replace = match &self.candidate {
            None => true,
            Some((_, current)) => match (published, current) {
                (Some(new), Some(current)) => new > *current,
                (Some(_), None) => true,
                (None, _) => false,
            },
        };
        if replace {
            self.candidate = Some((item, published));
        }
    }

    pub(crate) fn into_inner(self) -> Option<T> {
        self.candidate.map(|(item, _)| item)
    }
}
