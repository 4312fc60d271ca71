use serde::Serialize;
use std::fmt;

use crate::error::ValidationError;

pub const MIN_LIMIT: usize = 30;
pub const MAX_LIMIT: usize = 500;
pub const DEFAULT_LIMIT: usize = 500;

/// Maximum number of logical characters a surfaced artifact may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CharLimit(usize);

impl CharLimit {
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        let out_of_range = ValidationError::LimitOutOfRange {
            value,
            min: MIN_LIMIT,
            max: MAX_LIMIT,
        };

        match usize::try_from(value) {
            Ok(limit) if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) => Ok(Self(limit)),
            _ => Err(out_of_range),
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for CharLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

impl fmt::Display for CharLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
