// Salted, deterministic user assignment
//
// Each trial gets its own salt, so assignments are independent across trials
// while every row of a user lands in the same arm within a trial.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Experiment arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    Control,
    Treatment,
}

impl Arm {
    /// Treatment bit: 0 = control, 1 = treatment
    pub fn from_bit(bit: u64) -> Self {
        if bit & 1 == 1 {
            Arm::Treatment
        } else {
            Arm::Control
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arm::Control => write!(f, "control"),
            Arm::Treatment => write!(f, "treatment"),
        }
    }
}

/// Salt used for trial `trial` under the given base seed
pub fn salt_for_trial(seed: u64, trial: usize) -> u64 {
    seed.wrapping_add(trial as u64)
}

/// Stable 64-bit hash of `(user_id, salt)`
///
/// FNV-1a over `"<user_id>::<salt as little-endian bytes>"`, then a SplitMix64
/// finalizer. The raw FNV low bit depends only on the low bits of the input
/// bytes, so the finalizer is required before taking `hash % 2`.
pub fn stable_hash(user_id: &str, salt: u64) -> u64 {
    let mut hasher = fnv::FnvHasher::default();
    hasher.write(user_id.as_bytes());
    hasher.write(b"::");
    hasher.write(&salt.to_le_bytes());
    splitmix64(hasher.finish())
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Arm for one user under one salt
pub fn assign_user(user_id: &str, salt: u64) -> Arm {
    Arm::from_bit(stable_hash(user_id, salt) % 2)
}

/// Per-user arms for a single trial, shared by every analysis level
#[derive(Debug, Clone)]
pub struct TrialAssignment {
    salt: u64,
    arms: HashMap<String, Arm>,
}

impl TrialAssignment {
    /// Assign every distinct user in the dataset under `salt`
    pub fn new(dataset: &Dataset, salt: u64) -> Self {
        let arms = dataset
            .distinct_users()
            .into_iter()
            .map(|user| (user.to_string(), assign_user(user, salt)))
            .collect();

        Self { salt, arms }
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }

    /// Arm of a user; users outside the dataset are hashed on demand
    pub fn arm_of(&self, user_id: &str) -> Arm {
        self.arms
            .get(user_id)
            .copied()
            .unwrap_or_else(|| assign_user(user_id, self.salt))
    }

    /// Number of assigned users in each arm `(control, treatment)`
    pub fn arm_sizes(&self) -> (usize, usize) {
        let treated = self
            .arms
            .values()
            .filter(|arm| **arm == Arm::Treatment)
            .count();
        (self.arms.len() - treated, treated)
    }
}
