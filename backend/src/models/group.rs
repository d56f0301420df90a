//! Group membership
//!
//! Every agent belongs to exactly one of two population groups. The
//! assignment is drawn once at initialization and never changes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Population group of an agent
///
/// Group B carries the structural scoring penalty `beta` and is the group
/// whose tier share is reported as the representation metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    A,
    B,
}

impl Group {
    /// Map the stored membership flag to a group
    pub fn from_is_b(is_b: bool) -> Self {
        if is_b {
            Group::B
        } else {
            Group::A
        }
    }

    pub fn is_b(self) -> bool {
        matches!(self, Group::B)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => write!(f, "A"),
            Group::B => write!(f, "B"),
        }
    }
}
