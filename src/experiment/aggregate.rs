// Group observations into analysis units per arm
//
// A unit is the granularity the significance test treats as independent:
// a single row, an impression, or a user. Groups are keyed by (unit, arm)
// in an ordered map so per-unit samples come out in a stable order.

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Observation};
use crate::experiment::assignment::{Arm, TrialAssignment};

/// Granularity at which outcomes are aggregated before testing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisLevel {
    /// Every observation is its own unit
    Row,
    /// Observations sharing an impression_id form one unit
    Impression,
    /// Observations sharing a user_id form one unit (matches assignment)
    User,
}

impl AnalysisLevel {
    pub const ALL: [AnalysisLevel; 3] = [
        AnalysisLevel::Row,
        AnalysisLevel::Impression,
        AnalysisLevel::User,
    ];

    /// Unit an observation belongs to at this level
    pub fn unit_of<'a>(&self, obs: &'a Observation) -> UnitKey<'a> {
        match self {
            AnalysisLevel::Row => UnitKey::Row(obs.row_id),
            AnalysisLevel::Impression => UnitKey::Id(&obs.impression_id),
            AnalysisLevel::User => UnitKey::Id(&obs.user_id),
        }
    }
}

impl fmt::Display for AnalysisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisLevel::Row => write!(f, "row"),
            AnalysisLevel::Impression => write!(f, "impression"),
            AnalysisLevel::User => write!(f, "user"),
        }
    }
}

/// Identifier of an analysis unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKey<'a> {
    Row(usize),
    Id(&'a str),
}

/// Observation count and click sum for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GroupAggregate {
    count: u64,
    clicks: u64,
}

impl GroupAggregate {
    fn ctr(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.clicks as f32 / self.count as f32
        }
    }
}

/// Totals for one arm at one analysis level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmTotals {
    /// Distinct units at the analysis level
    pub units: usize,
    pub observations: u64,
    pub clicks: u64,
}

impl ArmTotals {
    /// Pooled CTR: total clicks over total observations
    pub fn ctr(&self) -> f64 {
        if self.observations == 0 {
            0.0
        } else {
            self.clicks as f64 / self.observations as f64
        }
    }

    fn add(&mut self, group: &GroupAggregate) {
        self.units += 1;
        self.observations += group.count;
        self.clicks += group.clicks;
    }
}

/// Aggregated samples for one trial at one analysis level
#[derive(Debug, Clone)]
pub struct LevelAggregate {
    pub level: AnalysisLevel,
    pub control: ArmTotals,
    pub treatment: ArmTotals,
    /// Per-unit CTRs in the control arm
    pub control_ctrs: Vec<f32>,
    /// Per-unit CTRs in the treatment arm
    pub treatment_ctrs: Vec<f32>,
}

impl LevelAggregate {
    /// Number of non-empty `(arm)` groups
    pub fn group_count(&self) -> usize {
        [self.control.units, self.treatment.units]
            .iter()
            .filter(|units| **units > 0)
            .count()
    }

    pub fn totals(&self, arm: Arm) -> &ArmTotals {
        match arm {
            Arm::Control => &self.control,
            Arm::Treatment => &self.treatment,
        }
    }
}

/// Aggregate a dataset at `level` using the arms from `assignment`
pub fn aggregate(
    dataset: &Dataset,
    level: AnalysisLevel,
    assignment: &TrialAssignment,
) -> LevelAggregate {
    let mut groups: BTreeMap<(Arm, UnitKey<'_>), GroupAggregate> = BTreeMap::new();

    for obs in dataset.observations() {
        let arm = assignment.arm_of(&obs.user_id);
        let group = groups.entry((arm, level.unit_of(obs))).or_default();
        group.count += 1;
        group.clicks += u64::from(obs.clicked);
    }

    let mut result = LevelAggregate {
        level,
        control: ArmTotals::default(),
        treatment: ArmTotals::default(),
        control_ctrs: Vec::new(),
        treatment_ctrs: Vec::new(),
    };

    for ((arm, _unit), group) in &groups {
        match arm {
            Arm::Control => {
                result.control.add(group);
                result.control_ctrs.push(group.ctr());
            }
            Arm::Treatment => {
                result.treatment.add(group);
                result.treatment_ctrs.push(group.ctr());
            }
        }
    }

    result
}
