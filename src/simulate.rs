//! Seeded synthetic click logs
//!
//! Users differ strongly in click propensity, so rows from the same user are
//! correlated. That clustering is what makes row- and impression-level
//! analysis of a user-assigned A/A test overstate significance.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::Dataset;

/// Latent per-user click propensities; each user draws one uniformly
const PROPENSITY_MIXTURE: [f64; 4] = [0.02, 0.10, 0.40, 0.80];

/// Upper bound on generated rows
pub const MAX_SYNTHETIC_ROWS: usize = 10_000_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SyntheticError {
    #[error(
        "Synthetic dataset too large: {users} users x {impressions_per_user} impressions x \
         {rows_per_impression} rows exceeds {max} rows"
    )]
    TooLarge {
        users: usize,
        impressions_per_user: usize,
        rows_per_impression: usize,
        max: usize,
    },
}

/// Shape of a generated dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub users: usize,
    pub impressions_per_user: usize,
    pub rows_per_impression: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            users: 200,
            impressions_per_user: 10,
            rows_per_impression: 2,
            seed: 7,
        }
    }
}

impl SyntheticConfig {
    /// Number of rows the config describes, bounded by [`MAX_SYNTHETIC_ROWS`]
    pub fn total_rows(&self) -> Result<usize, SyntheticError> {
        self.users
            .checked_mul(self.impressions_per_user)
            .and_then(|n| n.checked_mul(self.rows_per_impression))
            .filter(|&n| n <= MAX_SYNTHETIC_ROWS)
            .ok_or(SyntheticError::TooLarge {
                users: self.users,
                impressions_per_user: self.impressions_per_user,
                rows_per_impression: self.rows_per_impression,
                max: MAX_SYNTHETIC_ROWS,
            })
    }
}

/// Generate a clustered click log; identical configs yield identical datasets
pub fn generate(config: &SyntheticConfig) -> Result<Dataset, SyntheticError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::with_capacity(config.total_rows()?);

    for user in 0..config.users {
        let user_id = format!("user{}", user);
        let propensity = PROPENSITY_MIXTURE[rng.gen_range(0..PROPENSITY_MIXTURE.len())];

        for impression in 0..config.impressions_per_user {
            let impression_id = format!("{}-imp{}", user_id, impression);
            for _ in 0..config.rows_per_impression {
                let clicked = rng.gen::<f64>() < propensity;
                records.push((impression_id.clone(), user_id.clone(), clicked));
            }
        }
    }

    Ok(Dataset::from_records(records))
}
