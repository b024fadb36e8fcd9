use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// Width of the `events.name` column.
pub const NAME_COLUMN_LENGTH: usize = 255;

/// Work factors the bcrypt crate accepts.
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Configuration for the calendar module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
            max_name_length: default_max_name_length(),
        }
    }
}

impl CalendarConfig {
    /// Reject values the storage schema or the hasher cannot honour.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            BCRYPT_COST_RANGE.contains(&self.bcrypt_cost),
            "bcrypt_cost must be between {} and {} (got {})",
            BCRYPT_COST_RANGE.start(),
            BCRYPT_COST_RANGE.end(),
            self.bcrypt_cost
        );
        ensure!(
            (1..=NAME_COLUMN_LENGTH).contains(&self.max_name_length),
            "max_name_length must be between 1 and {NAME_COLUMN_LENGTH} (got {})",
            self.max_name_length
        );
        Ok(())
    }
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_max_name_length() -> usize {
    NAME_COLUMN_LENGTH
}
