//! Roster: the static lab/attending/weekday universe of a run
//!
//! Built once from parsed lab configuration and the point system, then
//! shared read-only by every day of the board. Attendings are not declared
//! directly: each lab's day schedules name them, and the roster aggregates
//! the union of their procedures and working weekdays across all labs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, LabConfig, PointSystemConfig};

use super::attending::{Attending, AttendingId};
use super::lab::{Lab, LabDayParams, LabId};
use super::weekday_index;

/// Capacity budgets for one weekday
///
/// A missing limit (overall or per attribute) is unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointLimits {
    pub overall: Option<f64>,
    pub per_attribute: BTreeMap<String, f64>,
}

impl PointLimits {
    /// Limit for a named attribute, `None` when unconfigured.
    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.per_attribute.get(name).copied()
    }
}

/// Per-weekday policy: resources open, operators available, budgets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPolicy {
    /// Labs open this weekday, in configuration order
    pub labs: Vec<LabId>,

    /// Attendings working this weekday, in roster order
    pub attendings: Vec<AttendingId>,

    /// Point budgets enforced this weekday
    pub limits: PointLimits,
}

/// The full static universe shared by a board's days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    labs: Vec<Lab>,
    attendings: Vec<Attending>,
    weekdays: [WeekdayPolicy; 7],
}

impl Roster {
    /// Build the roster from parsed lab configs and the point system.
    ///
    /// Aggregates attendings across labs (first-seen order, unioned
    /// procedures and weekdays), resolves each lab's per-day staffing to
    /// attending ids, and assembles the seven weekday policies with their
    /// point limits.
    pub fn build(
        lab_configs: &[LabConfig],
        points: &PointSystemConfig,
    ) -> Result<Self, ConfigError> {
        let mut attendings: Vec<Attending> = Vec::new();
        let mut index_by_name: BTreeMap<String, AttendingId> = BTreeMap::new();

        for lab in lab_configs {
            for day in &lab.days {
                let weekday = weekday_index(day.weekday);
                for name in &day.attendings {
                    let id = *index_by_name.entry(name.clone()).or_insert_with(|| {
                        attendings.push(Attending::new(name.clone(), Vec::new(), [false; 7]));
                        attendings.len() - 1
                    });
                    attendings[id].add_weekday(weekday);
                    for procedure in &day.procedures {
                        attendings[id].add_procedure(procedure);
                    }
                }
            }
        }

        let labs: Vec<Lab> = lab_configs
            .iter()
            .map(|config| {
                let mut day_params: [Option<LabDayParams>; 7] = Default::default();
                for day in &config.days {
                    let weekday = weekday_index(day.weekday);
                    let staffing = day
                        .attendings
                        .iter()
                        .filter_map(|name| index_by_name.get(name).copied())
                        .collect();
                    day_params[weekday] = Some(LabDayParams {
                        attendings: staffing,
                        procedures: day.procedures.clone(),
                        slot_count: day.slots,
                    });
                }
                Lab::new(config.name.clone(), day_params)
            })
            .collect();

        let mut weekdays: [WeekdayPolicy; 7] = Default::default();
        for (w, policy) in weekdays.iter_mut().enumerate() {
            policy.labs = labs
                .iter()
                .enumerate()
                .filter(|(_, lab)| lab.is_open(w))
                .map(|(id, _)| id)
                .collect();
            policy.attendings = attendings
                .iter()
                .enumerate()
                .filter(|(_, a)| a.works_on(w))
                .map(|(id, _)| id)
                .collect();

            let mut limits = PointLimits {
                overall: points.overall_limits.get(w),
                per_attribute: BTreeMap::new(),
            };
            if points.active {
                for attr in points.attributes.iter().filter(|a| a.active) {
                    if let Some(limit) = attr.limits.get(w) {
                        limits.per_attribute.insert(attr.name.clone(), limit);
                    }
                }
            }
            policy.limits = limits;
        }

        Ok(Self {
            labs,
            attendings,
            weekdays,
        })
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn attendings(&self) -> &[Attending] {
        &self.attendings
    }

    pub fn lab(&self, id: LabId) -> &Lab {
        &self.labs[id]
    }

    pub fn attending(&self, id: AttendingId) -> &Attending {
        &self.attendings[id]
    }

    /// Policy for a weekday index (Monday = 0).
    pub fn weekday(&self, weekday: usize) -> &WeekdayPolicy {
        &self.weekdays[weekday]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LabDaySchedule, WeekdayLimits};
    use chrono::Weekday;

    fn lab_config(name: &str, days: Vec<LabDaySchedule>) -> LabConfig {
        LabConfig {
            name: name.to_string(),
            days,
        }
    }

    fn day(
        weekday: Weekday,
        attendings: &[&str],
        procedures: &[&str],
        slots: usize,
    ) -> LabDaySchedule {
        LabDaySchedule {
            weekday,
            attendings: attendings.iter().map(|s| s.to_string()).collect(),
            procedures: procedures.iter().map(|s| s.to_string()).collect(),
            slots,
        }
    }

    #[test]
    fn test_attendings_aggregate_across_labs() {
        let labs = vec![
            lab_config(
                "Lab 1",
                vec![day(Weekday::Mon, &["Dr. Adams"], &["A"], 2)],
            ),
            lab_config(
                "Lab 2",
                vec![day(Weekday::Wed, &["Dr. Adams", "Dr. Brown"], &["B"], 1)],
            ),
        ];
        let roster = Roster::build(&labs, &PointSystemConfig::default()).unwrap();

        assert_eq!(roster.attendings().len(), 2);
        let adams = roster.attending(0);
        assert_eq!(adams.name(), "Dr. Adams");
        assert!(adams.can_perform("A"));
        assert!(adams.can_perform("B"));
        assert!(adams.works_on(0));
        assert!(adams.works_on(2));
        assert!(!adams.works_on(1));

        let brown = roster.attending(1);
        assert!(!brown.can_perform("A"));
        assert!(brown.works_on(2));
    }

    #[test]
    fn test_weekday_policies() {
        let labs = vec![
            lab_config("Lab 1", vec![day(Weekday::Mon, &["Dr. Adams"], &["A"], 2)]),
            lab_config("Lab 2", vec![day(Weekday::Mon, &["Dr. Brown"], &["A"], 1)]),
        ];
        let roster = Roster::build(&labs, &PointSystemConfig::default()).unwrap();

        let monday = roster.weekday(0);
        assert_eq!(monday.labs, vec![0, 1]);
        assert_eq!(monday.attendings, vec![0, 1]);
        assert!(roster.weekday(1).labs.is_empty());
    }

    #[test]
    fn test_weekday_limits_resolved() {
        use crate::config::{CapScope, PointAttributeConfig, PointLevel};

        let mut overall = WeekdayLimits::default();
        overall.0[0] = Some(10.0);
        let mut risk_limits = WeekdayLimits::default();
        risk_limits.0[0] = Some(4.0);

        let points = PointSystemConfig {
            active: true,
            attributes: vec![PointAttributeConfig {
                name: "risk".to_string(),
                case_attribute: "severity".to_string(),
                scope: CapScope::Day,
                active: true,
                levels: vec![PointLevel {
                    upper_bound: None,
                    points: 1.0,
                }],
                limits: risk_limits,
            }],
            overall_limits: overall,
            ..Default::default()
        };

        let labs = vec![lab_config(
            "Lab 1",
            vec![day(Weekday::Mon, &["Dr. Adams"], &["A"], 2)],
        )];
        let roster = Roster::build(&labs, &points).unwrap();

        assert_eq!(roster.weekday(0).limits.overall, Some(10.0));
        assert_eq!(roster.weekday(0).limits.attribute("risk"), Some(4.0));
        assert_eq!(roster.weekday(1).limits.overall, None);
    }
}
