//! Instance registration identifier
//!
//! Secret configurations are scoped by the id of the data-store instance
//! registration they belong to. `Option<InstanceRegistrationId>::None` is the
//! default (global) scope and is a scope of its own, not a wildcard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of an instance registration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct InstanceRegistrationId(i32);

impl InstanceRegistrationId {
    /// Wrap a raw registration id
    pub const fn new(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstanceRegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceRegistrationId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self)
    }
}
