//! Time-of-day periods.
//!
//! A period is a named `[start_hour, end_hour)` bucket of the day. When
//! `end_hour <= start_hour` the bucket wraps past midnight, e.g. `19 -> 4`
//! covers 19:00-23:59 and 00:00-03:59.
//!
//! The registry keeps insertion order, which is also resolution order: the
//! first period containing an hour wins. Coverage and overlap are deliberately
//! not checked here.

pub mod resolver;

pub use resolver::{resolve_hour, resolve_period, window_for, Window};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default period ids.
pub const MORNING: &str = "morning";
pub const AFTER_SCHOOL: &str = "afterSchool";
pub const NIGHT: &str = "night";

/// A named time-of-day bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub id: String,
    pub start_hour: u8,
    pub end_hour: u8,
    pub label: String,
    pub greeting: String,
}

impl Period {
    pub fn new(
        id: impl Into<String>,
        start_hour: u8,
        end_hour: u8,
        label: impl Into<String>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start_hour,
            end_hour,
            label: label.into(),
            greeting: greeting.into(),
        }
    }

    /// Whether this period crosses midnight.
    pub fn wraps(&self) -> bool {
        self.end_hour <= self.start_hour
    }

    /// Whether `hour` (0-23) falls inside this period.
    pub fn contains_hour(&self, hour: u32) -> bool {
        let start = u32::from(self.start_hour);
        let end = u32::from(self.end_hour);
        if self.wraps() {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }

    /// Hour bounds must be 0-23 and distinct.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::Empty("period id".to_string()));
        }
        for (field, hour) in [("start", self.start_hour), ("end", self.end_hour)] {
            if hour >= 24 {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.{field}", self.id),
                    message: format!("hour {hour} is outside 0-23"),
                });
            }
        }
        if self.start_hour == self.end_hour {
            return Err(ValidationError::InvalidValue {
                field: self.id.clone(),
                message: "start and end hour must differ".to_string(),
            });
        }
        Ok(())
    }
}

/// On-disk shape of one period: the id is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSpec {
    pub start: u8,
    pub end: u8,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub greeting: String,
}

/// Ordered, non-empty set of periods.
///
/// Serialized as `{ "<id>": { "start", "end", "label", "greeting" }, ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, PeriodSpec>",
    into = "IndexMap<String, PeriodSpec>"
)]
pub struct PeriodRegistry {
    periods: Vec<Period>,
}

impl Default for PeriodRegistry {
    fn default() -> Self {
        Self {
            periods: vec![
                Period::new(MORNING, 4, 12, "Morning", "Good morning"),
                Period::new(AFTER_SCHOOL, 12, 19, "After school", "Welcome home"),
                Period::new(NIGHT, 19, 4, "Before bed", "Good night"),
            ],
        }
    }
}

impl PeriodRegistry {
    /// Build a registry from periods in resolution order.
    pub fn new(periods: Vec<Period>) -> Result<Self, ValidationError> {
        if periods.is_empty() {
            return Err(ValidationError::Empty("period registry".to_string()));
        }
        let mut registry = Self { periods: Vec::with_capacity(periods.len()) };
        for period in periods {
            if registry.get(&period.id).is_some() {
                return Err(ValidationError::InvalidValue {
                    field: period.id,
                    message: "duplicate period id".to_string(),
                });
            }
            period.validate()?;
            registry.periods.push(period);
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&Period> {
        self.periods.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The fallback period used when no range matches.
    pub fn first(&self) -> &Period {
        // Construction guarantees at least one period.
        &self.periods[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.periods.iter().map(|p| p.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Replace a period in place, or append a new one at the end.
    pub fn upsert(&mut self, period: Period) -> Result<(), ValidationError> {
        period.validate()?;
        match self.periods.iter_mut().find(|p| p.id == period.id) {
            Some(existing) => *existing = period,
            None => self.periods.push(period),
        }
        Ok(())
    }

    /// Remove a period. The last remaining period cannot be removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, ValidationError> {
        let Some(index) = self.periods.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        if self.periods.len() == 1 {
            return Err(ValidationError::InvalidValue {
                field: id.to_string(),
                message: "cannot remove the only period".to_string(),
            });
        }
        self.periods.remove(index);
        Ok(true)
    }
}

impl TryFrom<IndexMap<String, PeriodSpec>> for PeriodRegistry {
    type Error = ValidationError;

    fn try_from(map: IndexMap<String, PeriodSpec>) -> Result<Self, Self::Error> {
        let periods = map
            .into_iter()
            .map(|(id, spec)| Period {
                id,
                start_hour: spec.start,
                end_hour: spec.end,
                label: spec.label,
                greeting: spec.greeting,
            })
            .collect();
        Self::new(periods)
    }
}

impl From<PeriodRegistry> for IndexMap<String, PeriodSpec> {
    fn from(registry: PeriodRegistry) -> Self {
        registry
            .periods
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    PeriodSpec {
                        start: p.start_hour,
                        end: p.end_hour,
                        label: p.label,
                        greeting: p.greeting,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_partition_the_day() {
        let registry = PeriodRegistry::default();
        for hour in 0..24 {
            let matches = registry.iter().filter(|p| p.contains_hour(hour)).count();
            assert_eq!(matches, 1, "hour {hour}");
        }
    }

    #[test]
    fn night_wraps_midnight() {
        let registry = PeriodRegistry::default();
        let night = registry.get(NIGHT).unwrap();
        assert!(night.wraps());
        assert!(night.contains_hour(23));
        assert!(night.contains_hour(0));
        assert!(night.contains_hour(3));
        assert!(!night.contains_hour(4));
        assert!(!night.contains_hour(18));
    }

    #[test]
    fn json_keeps_insertion_order() {
        let registry = PeriodRegistry::default();
        let json = serde_json::to_string(&registry).unwrap();
        assert!(json.starts_with(r#"{"morning":{"start":4,"end":12"#));

        let parsed: PeriodRegistry = serde_json::from_str(&json).unwrap();
        let ids: Vec<_> = parsed.ids().collect();
        assert_eq!(ids, vec![MORNING, AFTER_SCHOOL, NIGHT]);
    }

    #[test]
    fn deserialize_rejects_equal_hours() {
        let json = r#"{"broken":{"start":5,"end":5}}"#;
        assert!(serde_json::from_str::<PeriodRegistry>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_empty_registry() {
        assert!(serde_json::from_str::<PeriodRegistry>("{}").is_err());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut registry = PeriodRegistry::default();
        registry
            .upsert(Period::new(MORNING, 5, 11, "Early", "Hi"))
            .unwrap();
        assert_eq!(registry.first().start_hour, 5);
        assert_eq!(registry.len(), 3);

        registry
            .upsert(Period::new("lunch", 11, 13, "Lunch", "Eat"))
            .unwrap();
        assert_eq!(registry.ids().last(), Some("lunch"));
    }

    #[test]
    fn remove_keeps_at_least_one_period() {
        let mut registry =
            PeriodRegistry::new(vec![Period::new("only", 0, 12, "Only", "")]).unwrap();
        assert!(registry.remove("only").is_err());
        assert!(!registry.remove("missing").unwrap());
    }
}
