//! Instance type descriptor as seen by image resolution.

use crate::requirements::Requirements;

/// A compute shape: its name and the label requirements it satisfies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceType {
    pub name: String,
    pub requirements: Requirements,
}

impl InstanceType {
    pub fn new(name: impl Into<String>, requirements: Requirements) -> Self {
        Self {
            name: name.into(),
            requirements,
        }
    }
}
