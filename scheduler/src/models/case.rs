//! Case model
//!
//! A case is one unit of demand. It is created from a raw attribute record
//! at batch-arrival time, its capacity points are derived immediately from
//! the point-system configuration, and it is destroyed with the iteration.
//!
//! The raw record is an open field set; the engine only interprets
//! two fields directly: the work-category field [`PROCEDURE_FIELD`] and the
//! optional requested-attending field [`ATTENDING_FIELD`]. Everything else
//! rides along for point derivation, ignore rules, and the reorder pass.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ConfigError, PointSystemConfig};

use super::attending::AttendingId;
use super::lab::LabId;

/// Index of a case in the board's case arena.
pub type CaseId = usize;

/// Record field carrying the work-category identifier.
pub const PROCEDURE_FIELD: &str = "procedure";

/// Record field carrying an optional requested attending name.
pub const ATTENDING_FIELD: &str = "attending";

/// A single case attribute value
///
/// Records are open maps, so values are tagged rather than typed per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl AttrValue {
    /// Numeric view, if this value is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Total ordering for the reorder pass.
    ///
    /// Numbers sort before text before flags; numbers use IEEE total order
    /// so the result is deterministic even with unusual inputs.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        fn rank(v: &AttrValue) -> u8 {
            match v {
                AttrValue::Number(_) => 0,
                AttrValue::Text(_) => 1,
                AttrValue::Flag(_) => 2,
            }
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A raw, already-decoded case attribute record
///
/// The engine does not parse files; collaborators hand over records that
/// are already decoded (e.g. from JSON via [`CaseRecord::from_json`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord(pub BTreeMap<String, AttrValue>);

impl CaseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a record from an already-parsed JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.0.get(field)
    }
}

/// Where and with whom a scheduled case was placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,

    /// Weekday index of `date`, Monday = 0
    pub weekday: usize,

    pub lab: LabId,
    pub day_index: usize,
    pub slot_index: usize,
    pub attending: AttendingId,
}

/// One unit of demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    id: Uuid,

    /// The full raw attribute record
    attributes: CaseRecord,

    /// Work category, extracted from the record
    procedure: String,

    /// Requested attending name, if the record named one
    requested_attending: Option<String>,

    /// Derived point value per active attribute
    attribute_points: BTreeMap<String, f64>,

    /// Sum of all active attribute points
    total_points: f64,

    /// Whether an ignore rule zeroed this case's points
    ignored: bool,

    /// Board day index on which the case arrived
    arrival_day: usize,

    scheduled: bool,
    assignment: Option<Assignment>,
}

impl Case {
    /// Build a case from a raw record, deriving point values immediately.
    ///
    /// # Errors
    ///
    /// Fails when the record lacks the work-category field, or when an
    /// active point attribute's source field is missing or non-numeric on
    /// a case no ignore rule exempts.
    pub fn new(
        attributes: CaseRecord,
        points: &PointSystemConfig,
        arrival_day: usize,
    ) -> Result<Self, ConfigError> {
        let procedure = attributes
            .get(PROCEDURE_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConfigError::MissingProcedure(PROCEDURE_FIELD.to_string()))?
            .to_string();

        let requested_attending = attributes
            .get(ATTENDING_FIELD)
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut attribute_points = BTreeMap::new();
        let mut total_points = 0.0;
        let mut ignored = false;

        if points.active {
            ignored = points.ignore.iter().any(|rule| {
                attributes
                    .get(&rule.attribute)
                    .map(|v| rule.values.contains(v))
                    .unwrap_or(false)
            });

            for attr in points.attributes.iter().filter(|a| a.active) {
                let value = if ignored {
                    0.0
                } else {
                    let raw = attributes
                        .get(&attr.case_attribute)
                        .ok_or_else(|| {
                            ConfigError::MissingPointAttribute(attr.case_attribute.clone())
                        })?
                        .as_f64()
                        .ok_or_else(|| {
                            ConfigError::NonNumericPointAttribute(attr.case_attribute.clone())
                        })?;
                    attr.points_for(raw)
                };
                attribute_points.insert(attr.name.clone(), value);
                total_points += value;
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            attributes,
            procedure,
            requested_attending,
            attribute_points,
            total_points,
            ignored,
            arrival_day,
            scheduled: false,
            assignment: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attributes(&self) -> &CaseRecord {
        &self.attributes
    }

    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// Requested attending name; `None` until one is bound at placement.
    pub fn attending(&self) -> Option<&str> {
        self.requested_attending.as_deref()
    }

    /// Point value of one active attribute (0 when not tracked).
    pub fn attribute_point(&self, name: &str) -> f64 {
        self.attribute_points.get(name).copied().unwrap_or(0.0)
    }

    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn arrival_day(&self) -> usize {
        self.arrival_day
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Value used to sort this case in the reorder pass.
    ///
    /// Raw record fields win; derived point attributes and the `"points"`
    /// total are also addressable, mirroring the record-plus-points view
    /// the export surface exposes.
    pub fn reorder_key(&self, attribute: &str) -> Option<AttrValue> {
        if let Some(value) = self.attributes.get(attribute) {
            return Some(value.clone());
        }
        if let Some(points) = self.attribute_points.get(attribute) {
            return Some(AttrValue::Number(*points));
        }
        if attribute == "points" {
            return Some(AttrValue::Number(self.total_points));
        }
        None
    }

    /// Record the placement. `scheduled` never reverts to false.
    pub(crate) fn assign(&mut self, assignment: Assignment, attending_name: &str) {
        if self.requested_attending.is_none() {
            self.requested_attending = Some(attending_name.to_string());
        }
        self.assignment = Some(assignment);
        self.scheduled = true;
    }

    /// Move an already-scheduled case to another slot (reorder pass only).
    pub(crate) fn reassign_slot(&mut self, slot_index: usize) {
        if let Some(assignment) = self.assignment.as_mut() {
            assignment.slot_index = slot_index;
        }
    }
}
