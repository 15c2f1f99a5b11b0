//! Parsed configuration structures and validation
//!
//! The engine consumes configuration that has already been decoded by an
//! external collaborator (file parsing, schema checks and CLI handling are
//! out of scope). Everything here is therefore plain data plus the fatal
//! validation the engine itself is responsible for: point-level sanity,
//! arrival-distribution parameters, and cross-references between the
//! attribute priority order and the set of active point attributes.
//!
//! All validation failures are [`ConfigError`] values. They abort a run
//! before any scheduling begins; placement outcomes (unscheduled, forced,
//! added-slot) are never errors; they are counters on the board.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::StrategyKind;
use crate::models::AttrValue;
use crate::rng::RngManager;

/// Fatal configuration errors
///
/// Raised immediately, never retried, and surfaced to the caller of the
/// whole run. A malformed configuration aborts the run before any case is
/// scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("duplicate upper bound in point levels for attribute `{0}`")]
    DuplicatePointLevel(String),

    #[error("point levels for attribute `{0}` have no catch-all (null upper bound) level")]
    MissingCatchAllLevel(String),

    #[error("point attribute `{0}` in importance order is either not active or not defined")]
    InactivePriorityAttribute(String),

    #[error("added-slot attribute `{0}` is either not active or not defined")]
    InactiveAddedSlotAttribute(String),

    #[error("`{0}` is not an accepted arrival distribution")]
    UnknownDistribution(String),

    #[error("invalid parameters for arrival distribution: {0}")]
    InvalidArrivalParams(String),

    #[error("tried to add to scheduling count `{0}`, which does not exist")]
    UnknownCounter(String),

    #[error("case record is missing the work-category field `{0}`")]
    MissingProcedure(String),

    #[error("case record is missing point source field `{0}`")]
    MissingPointAttribute(String),

    #[error("point source field `{0}` is not numeric")]
    NonNumericPointAttribute(String),

    #[error("reorder attribute `{0}` is not present on every case record")]
    UnknownReorderAttribute(String),

    #[error("reporting end date {end} is before start date {start}")]
    EmptyHorizon { start: NaiveDate, end: NaiveDate },
}

/// Daily arrival-count distribution
///
/// Sampled once per simulated weekday on the iteration's arrivals stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrivalDistribution {
    /// Uniform integer count in `[min, max]` (both inclusive)
    Uniform { min: u32, max: u32 },

    /// Poisson-distributed count with rate λ
    Poisson { rate: f64 },
}

impl ArrivalDistribution {
    /// Build a distribution from its external name and parameter list.
    ///
    /// Accepted names are `"Uniform"` (two params: min, max) and
    /// `"Poisson"` (one param: rate).
    pub fn from_name(name: &str, params: &[f64]) -> Result<Self, ConfigError> {
        match name {
            "Uniform" => {
                if params.len() != 2 {
                    return Err(ConfigError::InvalidArrivalParams(format!(
                        "Uniform expects 2 parameters, got {}",
                        params.len()
                    )));
                }
                Ok(Self::Uniform {
                    min: params[0] as u32,
                    max: params[1] as u32,
                })
            }
            "Poisson" => {
                if params.len() != 1 {
                    return Err(ConfigError::InvalidArrivalParams(format!(
                        "Poisson expects 1 parameter, got {}",
                        params.len()
                    )));
                }
                Ok(Self::Poisson { rate: params[0] })
            }
            other => Err(ConfigError::UnknownDistribution(other.to_string())),
        }
    }

    /// Validate distribution parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Uniform { min, max } if min > max => Err(ConfigError::InvalidArrivalParams(
                format!("Uniform min {} exceeds max {}", min, max),
            )),
            Self::Poisson { rate } if *rate <= 0.0 => Err(ConfigError::InvalidArrivalParams(
                format!("Poisson rate {} must be positive", rate),
            )),
            _ => Ok(()),
        }
    }

    /// Draw one arrival count.
    pub fn sample(&self, rng: &mut RngManager) -> usize {
        match self {
            Self::Uniform { min, max } => rng.range(*min as i64, *max as i64 + 1) as usize,
            Self::Poisson { rate } => rng.poisson(*rate) as usize,
        }
    }
}

/// Arrival process parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalProcess {
    /// Per-weekday arrival-count distribution
    pub distribution: ArrivalDistribution,

    /// Minimum lead time between arrival and earliest placement, in weeks
    pub lead_weeks: usize,

    /// Width of the placement window after the lead time, in weeks
    pub window_weeks: usize,

    /// Warmup padding before the reporting period, in weeks
    pub warmup_weeks: usize,
}

/// Capacity scope of one point attribute's limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapScope {
    /// Limit applies to the whole day across all labs
    Day,
    /// Limit applies per lab within the day
    Lab,
}

/// One `(upperBound, pointValue)` level of a point attribute
///
/// `upper_bound: None` is the catch-all level; exactly one is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLevel {
    pub upper_bound: Option<f64>,
    pub points: f64,
}

/// Per-weekday limit values, indexed Monday = 0
///
/// A `None` entry means the limit is unconfigured for that weekday, which
/// the engine treats as unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekdayLimits(pub [Option<f64>; 7]);

impl WeekdayLimits {
    pub fn get(&self, weekday: usize) -> Option<f64> {
        self.0[weekday]
    }
}

/// Definition of one tracked point attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointAttributeConfig {
    /// Attribute name, e.g. `"risk"` or `"duration"`
    pub name: String,

    /// Case record field the point levels are evaluated against
    pub case_attribute: String,

    /// Whether the limit is enforced per day or per lab
    pub scope: CapScope,

    /// Whether this attribute participates in capacity accounting
    pub active: bool,

    /// Ascending levels plus one catch-all (`upper_bound: None`)
    pub levels: Vec<PointLevel>,

    /// Per-weekday limits for this attribute
    pub limits: WeekdayLimits,
}

impl PointAttributeConfig {
    /// Structural validation of the level table.
    ///
    /// Duplicate upper bounds and a missing catch-all level are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_bounds: Vec<f64> = Vec::new();
        let mut catch_alls = 0usize;
        for level in &self.levels {
            match level.upper_bound {
                Some(bound) => {
                    // Numeric equality catches 0.0 vs -0.0; the bit check
                    // catches repeated NaN bounds, which == never equates.
                    let duplicate = seen_bounds
                        .iter()
                        .any(|&seen| seen == bound || seen.to_bits() == bound.to_bits());
                    if duplicate {
                        return Err(ConfigError::DuplicatePointLevel(self.name.clone()));
                    }
                    seen_bounds.push(bound);
                }
                None => catch_alls += 1,
            }
        }
        match catch_alls {
            0 => Err(ConfigError::MissingCatchAllLevel(self.name.clone())),
            1 => Ok(()),
            _ => Err(ConfigError::DuplicatePointLevel(self.name.clone())),
        }
    }

    /// Resolve the point value for a source-field value.
    ///
    /// The lowest upper bound not exceeded by the value wins; the catch-all
    /// level applies when every bounded level is exceeded. Assumes
    /// [`validate`](Self::validate) has passed.
    pub fn points_for(&self, value: f64) -> f64 {
        let mut bounded: Vec<(f64, f64)> = self
            .levels
            .iter()
            .filter_map(|l| l.upper_bound.map(|b| (b, l.points)))
            .collect();
        bounded.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (bound, points) in bounded {
            if value <= bound {
                return points;
            }
        }
        self.levels
            .iter()
            .find(|l| l.upper_bound.is_none())
            .map(|l| l.points)
            .unwrap_or(0.0)
    }
}

/// A rule exempting matching cases from the point system
///
/// Cases whose `attribute` value is in `values` carry zero points for every
/// attribute and always pass capacity checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub attribute: String,
    pub values: Vec<AttrValue>,
}

/// Which point metric drives the added-slot fallback search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AddedSlotAttribute {
    /// Use the case's total point value
    Overall,
    /// Use one named attribute's point value
    Attribute(String),
}

impl Default for AddedSlotAttribute {
    fn default() -> Self {
        Self::Overall
    }
}

/// Complete point-system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSystemConfig {
    /// Master switch; when false no points are derived or enforced
    pub active: bool,

    /// All defined point attributes (only `active` ones participate)
    pub attributes: Vec<PointAttributeConfig>,

    /// Per-weekday overall point limits
    pub overall_limits: WeekdayLimits,

    /// Cases matching any rule are exempt from all point accounting
    pub ignore: Vec<IgnoreRule>,

    /// Priority order over active attributes for the split-cap fallback
    pub importance_order: Vec<String>,

    /// Metric driving the added-slot fallback (split-cap algorithm)
    pub added_slot_attribute: AddedSlotAttribute,
}

impl PointSystemConfig {
    /// Names of all active attributes, in configuration order.
    pub fn active_attrs(&self) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| a.active)
            .map(|a| a.name.clone())
            .collect()
    }

    /// Look up an active attribute definition by name.
    pub fn active_attribute(&self, name: &str) -> Option<&PointAttributeConfig> {
        self.attributes.iter().find(|a| a.active && a.name == name)
    }

    /// Validate level tables and attribute cross-references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.active {
            return Ok(());
        }
        for attr in self.attributes.iter().filter(|a| a.active) {
            attr.validate()?;
        }
        let active = self.active_attrs();
        for name in &self.importance_order {
            if !active.contains(name) {
                return Err(ConfigError::InactivePriorityAttribute(name.clone()));
            }
        }
        if let AddedSlotAttribute::Attribute(name) = &self.added_slot_attribute {
            if !active.contains(name) {
                return Err(ConfigError::InactiveAddedSlotAttribute(name.clone()));
            }
        }
        Ok(())
    }
}

/// Operating parameters of one lab on one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabDaySchedule {
    pub weekday: Weekday,

    /// Attending names staffing this lab on this weekday
    pub attendings: Vec<String>,

    /// Procedure categories this lab accepts on this weekday
    pub procedures: Vec<String>,

    /// Number of slots the lab offers on this weekday
    pub slots: usize,
}

/// Static configuration of one lab (capacity-bearing resource)
///
/// The weekdays a lab operates are exactly those with a day schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    pub name: String,
    pub days: Vec<LabDaySchedule>,
}

/// Complete configuration for one scheduling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// First day of the reporting period
    pub start_date: NaiveDate,

    /// Last day of the reporting period (inclusive)
    pub end_date: NaiveDate,

    /// Arrival process (distribution, lead, window, warmup)
    pub arrivals: ArrivalProcess,

    /// Placement strategy to run
    pub algorithm: StrategyKind,

    /// Point-system configuration (may be inactive)
    pub points: PointSystemConfig,

    /// Post-run same-day reorder attribute, if any
    pub reorder_attribute: Option<String>,

    /// Number of independent Monte Carlo iterations
    pub iterations: usize,

    /// Run-level seed for all random streams
    pub run_seed: u64,
}

impl SimulationConfig {
    /// Validate the whole configuration.
    ///
    /// Fatal on an empty horizon, bad arrival parameters, malformed point
    /// levels, or priority/added-slot references to inactive attributes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_date < self.start_date {
            return Err(ConfigError::EmptyHorizon {
                start: self.start_date,
                end: self.end_date,
            });
        }
        self.arrivals.distribution.validate()?;
        self.points.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(bounds: &[(Option<f64>, f64)]) -> Vec<PointLevel> {
        bounds
            .iter()
            .map(|&(upper_bound, points)| PointLevel {
                upper_bound,
                points,
            })
            .collect()
    }

    fn attr(name: &str, lvls: Vec<PointLevel>) -> PointAttributeConfig {
        PointAttributeConfig {
            name: name.to_string(),
            case_attribute: name.to_string(),
            scope: CapScope::Day,
            active: true,
            levels: lvls,
            limits: WeekdayLimits::default(),
        }
    }

    #[test]
    fn test_from_name_uniform() {
        let dist = ArrivalDistribution::from_name("Uniform", &[1.0, 3.0]).unwrap();
        assert_eq!(dist, ArrivalDistribution::Uniform { min: 1, max: 3 });
    }

    #[test]
    fn test_from_name_unknown() {
        let err = ArrivalDistribution::from_name("Gamma", &[1.0]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownDistribution("Gamma".to_string()));
    }

    #[test]
    fn test_uniform_sample_inclusive() {
        let dist = ArrivalDistribution::Uniform { min: 2, max: 4 };
        let mut rng = RngManager::new(7);
        for _ in 0..200 {
            let n = dist.sample(&mut rng);
            assert!((2..=4).contains(&n));
        }
    }

    #[test]
    fn test_poisson_rate_must_be_positive() {
        let dist = ArrivalDistribution::Poisson { rate: 0.0 };
        assert!(dist.validate().is_err());
    }

    #[test]
    fn test_duplicate_upper_bound_rejected() {
        let a = attr("risk", levels(&[(Some(2.0), 1.0), (Some(2.0), 2.0), (None, 3.0)]));
        assert_eq!(
            a.validate().unwrap_err(),
            ConfigError::DuplicatePointLevel("risk".to_string())
        );
    }

    #[test]
    fn test_signed_zero_bounds_are_duplicates() {
        let a = attr("risk", levels(&[(Some(0.0), 1.0), (Some(-0.0), 2.0), (None, 3.0)]));
        assert_eq!(
            a.validate().unwrap_err(),
            ConfigError::DuplicatePointLevel("risk".to_string())
        );
    }

    #[test]
    fn test_missing_catch_all_rejected() {
        let a = attr("risk", levels(&[(Some(2.0), 1.0)]));
        assert_eq!(
            a.validate().unwrap_err(),
            ConfigError::MissingCatchAllLevel("risk".to_string())
        );
    }

    #[test]
    fn test_points_for_picks_lowest_containing_level() {
        let a = attr(
            "risk",
            levels(&[(Some(5.0), 2.0), (Some(2.0), 1.0), (None, 9.0)]),
        );
        a.validate().unwrap();
        assert_eq!(a.points_for(1.0), 1.0);
        assert_eq!(a.points_for(2.0), 1.0); // upper bound inclusive
        assert_eq!(a.points_for(3.5), 2.0);
        assert_eq!(a.points_for(100.0), 9.0); // catch-all
    }

    #[test]
    fn test_importance_order_must_reference_active_attr() {
        let points = PointSystemConfig {
            active: true,
            attributes: vec![attr("risk", levels(&[(None, 1.0)]))],
            importance_order: vec!["duration".to_string()],
            ..Default::default()
        };
        assert_eq!(
            points.validate().unwrap_err(),
            ConfigError::InactivePriorityAttribute("duration".to_string())
        );
    }

    #[test]
    fn test_added_slot_attr_must_reference_active_attr() {
        let points = PointSystemConfig {
            active: true,
            attributes: vec![attr("risk", levels(&[(None, 1.0)]))],
            added_slot_attribute: AddedSlotAttribute::Attribute("duration".to_string()),
            ..Default::default()
        };
        assert_eq!(
            points.validate().unwrap_err(),
            ConfigError::InactiveAddedSlotAttribute("duration".to_string())
        );
    }

    #[test]
    fn test_inactive_point_system_skips_validation() {
        let points = PointSystemConfig {
            active: false,
            importance_order: vec!["whatever".to_string()],
            ..Default::default()
        };
        assert!(points.validate().is_ok());
    }
}
