/// A searchable collection known only through its sample.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::errors::{FedRankError, Result};

/// Identifier plus full and sampled collection sizes.
///
/// Identity is the id alone: two `Resource`s with the same id and different
/// sizes are equal and hash the same.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    id: String,
    full_size: u64,
    sample_size: u64,
}

impl Resource {
    pub fn new(id: impl Into<String>, full_size: i64, sample_size: i64) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(FedRankError::missing("The resource id is empty."));
        }
        if full_size <= 0 {
            return Err(FedRankError::invalid(
                "full_size",
                format!("The resource size is less or equal to zero: {}", full_size),
            ));
        }
        if sample_size <= 0 {
            return Err(FedRankError::invalid(
                "sample_size",
                format!("The resource sample size is less or equal to zero: {}", sample_size),
            ));
        }
        Ok(Resource {
            id,
            full_size: full_size as u64,
            sample_size: sample_size as u64,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn full_size(&self) -> u64 {
        self.full_size
    }

    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// How many full-collection documents one sampled document stands for.
    pub fn size_ratio(&self) -> f64 {
        self.full_size as f64 / self.sample_size as f64
    }

    /// Truncated `full_size / sample_size`, used when accumulating integer
    /// complete-rank estimates.
    pub fn integral_size_ratio(&self) -> u64 {
        self.full_size / self.sample_size
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
