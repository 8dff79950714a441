//! # Scheduling requirements
//!
//! Label constraints in the node-selector style, with the set semantics the
//! node provisioner uses to decide whether an image can run on an instance
//! type.
//!
//! A [`Requirement`] is stored as a value set that is either concrete (`In`,
//! `DoesNotExist`) or complemented (`NotIn`, `Exists`), plus optional integer
//! bounds for `Gt`/`Lt`. Two requirements are compatible when their
//! intersection still admits a value.

use crate::labels;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Node selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
    Gt,
    Lt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::In => "In",
            Operator::NotIn => "NotIn",
            Operator::Exists => "Exists",
            Operator::DoesNotExist => "DoesNotExist",
            Operator::Gt => "Gt",
            Operator::Lt => "Lt",
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, Operator::NotIn | Operator::DoesNotExist)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint on a single label key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    complement: bool,
    values: BTreeSet<String>,
    greater_than: Option<i64>,
    less_than: Option<i64>,
}

impl Requirement {
    /// Build a requirement.
    ///
    /// `Gt` and `Lt` read their bound from the first value; a missing or
    /// non-integer bound yields a requirement no value satisfies.
    pub fn new<I, S>(key: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        let bound = values.iter().next().and_then(|v| v.parse::<i64>().ok());
        match operator {
            Operator::In => Self::concrete(key, values),
            Operator::NotIn => Self::complemented(key, values),
            Operator::Exists => Self::complemented(key, BTreeSet::new()),
            Operator::DoesNotExist => Self::concrete(key, BTreeSet::new()),
            Operator::Gt => match bound {
                Some(n) => Self {
                    greater_than: Some(n),
                    ..Self::complemented(key, BTreeSet::new())
                },
                None => Self::concrete(key, BTreeSet::new()),
            },
            Operator::Lt => match bound {
                Some(n) => Self {
                    less_than: Some(n),
                    ..Self::complemented(key, BTreeSet::new())
                },
                None => Self::concrete(key, BTreeSet::new()),
            },
        }
    }

    fn concrete(key: String, values: BTreeSet<String>) -> Self {
        Self {
            key,
            complement: false,
            values,
            greater_than: None,
            less_than: None,
        }
    }

    fn complemented(key: String, values: BTreeSet<String>) -> Self {
        Self {
            complement: true,
            ..Self::concrete(key, values)
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The operator this requirement reduces to; bounded requirements report `Exists`
    pub fn operator(&self) -> Operator {
        match (self.complement, self.values.is_empty()) {
            (true, false) => Operator::NotIn,
            (true, true) => Operator::Exists,
            (false, false) => Operator::In,
            (false, true) => Operator::DoesNotExist,
        }
    }

    /// True when no value satisfies the requirement
    pub fn is_empty(&self) -> bool {
        !self.complement && self.values.is_empty()
    }

    /// Whether `value` satisfies the requirement
    pub fn has(&self, value: &str) -> bool {
        if self.complement {
            !self.values.contains(value) && within_bounds(value, self.greater_than, self.less_than)
        } else {
            self.values.contains(value)
        }
    }

    /// The requirement satisfied exactly by values satisfying both
    pub fn intersection(&self, other: &Requirement) -> Requirement {
        let complement = self.complement && other.complement;
        let greater_than = max_bound(self.greater_than, other.greater_than);
        let less_than = min_bound(self.less_than, other.less_than);
        if let (Some(gt), Some(lt)) = (greater_than, less_than) {
            if gt >= lt {
                return Self::concrete(self.key.clone(), BTreeSet::new());
            }
        }

        let values: BTreeSet<String> = match (self.complement, other.complement) {
            (true, true) => self.values.union(&other.values).cloned().collect(),
            (true, false) => other.values.difference(&self.values).cloned().collect(),
            (false, true) => self.values.difference(&other.values).cloned().collect(),
            (false, false) => self.values.intersection(&other.values).cloned().collect(),
        };
        let values = values
            .into_iter()
            .filter(|v| within_bounds(v, greater_than, less_than))
            .collect();

        if complement {
            Self {
                key: self.key.clone(),
                complement,
                values,
                greater_than,
                less_than,
            }
        } else {
            // Bounds are already applied to a concrete set
            Self::concrete(self.key.clone(), values)
        }
    }
}

fn within_bounds(value: &str, greater_than: Option<i64>, less_than: Option<i64>) -> bool {
    if greater_than.is_none() && less_than.is_none() {
        return true;
    }
    let Ok(n) = value.parse::<i64>() else {
        return false;
    };
    greater_than.is_none_or(|gt| n > gt) && less_than.is_none_or(|lt| n < lt)
}

fn max_bound(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_bound(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.operator())?;
        if !self.values.is_empty() {
            let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
            write!(f, " [{}]", values.join(" "))?;
        }
        if let Some(gt) = self.greater_than {
            write!(f, " >{}", gt)?;
        }
        if let Some(lt) = self.less_than {
            write!(f, " <{}", lt)?;
        }
        Ok(())
    }
}

/// Which keys may be required by one side without being defined by the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllowUndefined {
    /// Every required key must be defined
    #[default]
    None,
    WellKnownLabels,
    WellKnownAndRestrictedLabels,
}

impl AllowUndefined {
    pub fn allows(&self, key: &str) -> bool {
        match self {
            AllowUndefined::None => false,
            AllowUndefined::WellKnownLabels => labels::is_well_known(key),
            AllowUndefined::WellKnownAndRestrictedLabels => labels::is_well_known(key) || labels::is_restricted(key),
        }
    }
}

/// Reasons two requirement sets cannot be satisfied together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incompatible requirements: {}", .reasons.join("; "))]
pub struct Incompatible {
    pub reasons: Vec<String>,
}

/// A set of requirements keyed by label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    by_key: BTreeMap<String, Requirement>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement, intersecting with any existing one for the same key
    pub fn add(&mut self, requirement: Requirement) {
        let merged = match self.by_key.get(requirement.key()) {
            Some(existing) => existing.intersection(&requirement),
            None => requirement,
        };
        self.by_key.insert(merged.key.clone(), merged);
    }

    #[must_use]
    pub fn with(mut self, requirement: Requirement) -> Self {
        self.add(requirement);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Requirement> {
        self.by_key.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Check whether `incoming` can be satisfied on something described by `self`.
    ///
    /// Keys `incoming` requires but `self` does not define are rejected unless
    /// `allow` permits them or the incoming operator is negative. Keys both
    /// define must intersect, except when both sides are negative.
    pub fn compatible(&self, incoming: &Requirements, allow: AllowUndefined) -> Result<(), Incompatible> {
        let mut reasons = Vec::new();

        for (key, requirement) in &incoming.by_key {
            if allow.allows(key) || self.has(key) || requirement.operator().is_negative() {
                continue;
            }
            reasons.push(format!("label {:?} does not have known values", key));
        }

        if let Err(err) = self.intersects(incoming) {
            reasons.extend(err.reasons);
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(Incompatible { reasons })
        }
    }

    /// Check that every key defined on both sides admits a common value
    pub fn intersects(&self, incoming: &Requirements) -> Result<(), Incompatible> {
        let mut reasons = Vec::new();
        for (key, existing) in &self.by_key {
            let Some(requirement) = incoming.get(key) else {
                continue;
            };
            if !existing.intersection(requirement).is_empty() {
                continue;
            }
            if requirement.operator().is_negative() && existing.operator().is_negative() {
                continue;
            }
            reasons.push(format!("key {}, {} not in {}", key, requirement, existing));
        }
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(Incompatible { reasons })
        }
    }
}

impl FromIterator<Requirement> for Requirements {
    fn from_iter<T: IntoIterator<Item = Requirement>>(iter: T) -> Self {
        let mut requirements = Requirements::new();
        for requirement in iter {
            requirements.add(requirement);
        }
        requirements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::*;

    fn req(key: &str, op: Operator, values: &[&str]) -> Requirement {
        Requirement::new(key, op, values.iter().copied())
    }

    #[test]
    fn test_operator_round_trip() {
        assert_eq!(req("k", Operator::In, &["a"]).operator(), Operator::In);
        assert_eq!(req("k", Operator::NotIn, &["a"]).operator(), Operator::NotIn);
        assert_eq!(req("k", Operator::Exists, &[]).operator(), Operator::Exists);
        assert_eq!(req("k", Operator::DoesNotExist, &[]).operator(), Operator::DoesNotExist);
        assert_eq!(req("k", Operator::Gt, &["3"]).operator(), Operator::Exists);
    }

    #[test]
    fn test_in_intersection() {
        let a = req("k", Operator::In, &["a", "b"]);
        let b = req("k", Operator::In, &["b", "c"]);
        let both = a.intersection(&b);
        assert!(both.has("b"));
        assert!(!both.has("a"));
        assert!(a.intersection(&req("k", Operator::In, &["z"])).is_empty());
    }

    #[test]
    fn test_not_in_excludes_values() {
        let a = req("k", Operator::In, &["a", "b"]);
        let not_a = req("k", Operator::NotIn, &["a"]);
        let both = a.intersection(&not_a);
        assert!(both.has("b"));
        assert!(!both.has("a"));
        assert!(req("k", Operator::In, &["a"]).intersection(&not_a).is_empty());
    }

    #[test]
    fn test_bounds() {
        let gt = req(LABEL_SKU_CPU, Operator::Gt, &["4"]);
        let lt = req(LABEL_SKU_CPU, Operator::Lt, &["16"]);
        let range = gt.intersection(&lt);
        assert!(range.has("8"));
        assert!(!range.has("4"));
        assert!(!range.has("16"));
        assert!(!range.has("eight"));

        let cpus = req(LABEL_SKU_CPU, Operator::In, &["2", "8", "32"]);
        let fits = cpus.intersection(&range);
        assert!(fits.has("8"));
        assert!(!fits.has("2"));
        assert!(!fits.has("32"));

        assert!(req("k", Operator::Gt, &["10"]).intersection(&req("k", Operator::Lt, &["5"])).is_empty());
    }

    #[test]
    fn test_unparseable_bound_matches_nothing() {
        assert!(req("k", Operator::Gt, &["many"]).is_empty());
        assert!(req("k", Operator::Lt, &[]).is_empty());
    }

    #[test]
    fn test_add_merges_same_key() {
        let requirements = Requirements::new()
            .with(req(LABEL_ARCH, Operator::In, &[ARCH_AMD64, ARCH_ARM64]))
            .with(req(LABEL_ARCH, Operator::NotIn, &[ARCH_ARM64]));
        assert_eq!(requirements.len(), 1);
        let arch = requirements.get(LABEL_ARCH).unwrap();
        assert!(arch.has(ARCH_AMD64));
        assert!(!arch.has(ARCH_ARM64));
    }

    #[test]
    fn test_compatible_matching_instance() {
        let instance: Requirements = [
            req(LABEL_ARCH, Operator::In, &[ARCH_AMD64]),
            req(LABEL_SKU_HYPERV_GENERATION, Operator::In, &[HYPERV_GENERATION_V1, HYPERV_GENERATION_V2]),
        ]
        .into_iter()
        .collect();
        let image: Requirements = [
            req(LABEL_ARCH, Operator::In, &[ARCH_AMD64]),
            req(LABEL_SKU_HYPERV_GENERATION, Operator::In, &[HYPERV_GENERATION_V2]),
        ]
        .into_iter()
        .collect();
        assert!(instance.compatible(&image, AllowUndefined::WellKnownAndRestrictedLabels).is_ok());
    }

    #[test]
    fn test_compatible_rejects_disjoint_values() {
        let instance: Requirements = [req(LABEL_ARCH, Operator::In, &[ARCH_ARM64])].into_iter().collect();
        let image: Requirements = [req(LABEL_ARCH, Operator::In, &[ARCH_AMD64])].into_iter().collect();
        let err = instance
            .compatible(&image, AllowUndefined::WellKnownAndRestrictedLabels)
            .unwrap_err();
        assert_eq!(err.reasons.len(), 1);
        assert!(err.reasons[0].contains(LABEL_ARCH));
    }

    #[test]
    fn test_undefined_well_known_label_allowed() {
        // The instance says nothing about generation; the image requires gen2
        let instance: Requirements = [req(LABEL_ARCH, Operator::In, &[ARCH_AMD64])].into_iter().collect();
        let image: Requirements = [
            req(LABEL_ARCH, Operator::In, &[ARCH_AMD64]),
            req(LABEL_SKU_HYPERV_GENERATION, Operator::In, &[HYPERV_GENERATION_V2]),
        ]
        .into_iter()
        .collect();
        assert!(instance.compatible(&image, AllowUndefined::WellKnownAndRestrictedLabels).is_ok());
        assert!(instance.compatible(&image, AllowUndefined::None).is_err());
    }

    #[test]
    fn test_undefined_custom_label_rejected() {
        let instance = Requirements::new();
        let image: Requirements = [req("example.com/team", Operator::In, &["a"])].into_iter().collect();
        assert!(instance.compatible(&image, AllowUndefined::WellKnownAndRestrictedLabels).is_err());

        let negative: Requirements = [req("example.com/team", Operator::DoesNotExist, &[])].into_iter().collect();
        assert!(instance.compatible(&negative, AllowUndefined::None).is_ok());
    }

    #[test]
    fn test_both_negative_do_not_conflict() {
        let instance: Requirements = [req("example.com/gpu", Operator::DoesNotExist, &[])].into_iter().collect();
        let image: Requirements = [req("example.com/gpu", Operator::NotIn, &["nvidia"])].into_iter().collect();
        assert!(instance.compatible(&image, AllowUndefined::None).is_ok());
    }
}
