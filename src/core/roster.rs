//! Default responsible party by weekday.
//!
//! Used by callers at session start to pre-fill the responsible; the core
//! never reads it on its own.

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub monday: String,
    pub tuesday: String,
    pub wednesday: String,
    pub thursday: String,
    pub friday: String,
    pub saturday: String,
    pub sunday: String,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            monday: "Grupo 1".to_string(),
            tuesday: "Grupo 2".to_string(),
            wednesday: "Grupo 3".to_string(),
            thursday: "Grupo 4".to_string(),
            friday: "Grupo 5".to_string(),
            saturday: "Grupo 6".to_string(),
            sunday: "Grupo 7".to_string(),
        }
    }
}

impl Roster {
    pub fn for_weekday(&self, weekday: Weekday) -> &str {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn default_responsible(&self, date: NaiveDate) -> &str {
        self.for_weekday(date.weekday())
    }
}

impl Validate for Roster {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("roster.monday", &self.monday)?;
        validate_non_empty_string("roster.tuesday", &self.tuesday)?;
        validate_non_empty_string("roster.wednesday", &self.wednesday)?;
        validate_non_empty_string("roster.thursday", &self.thursday)?;
        validate_non_empty_string("roster.friday", &self.friday)?;
        validate_non_empty_string("roster.saturday", &self.saturday)?;
        validate_non_empty_string("roster.sunday", &self.sunday)?;
        Ok(())
    }
}

/// Default responsible for `date` under the built-in roster.
pub fn default_responsible(date: NaiveDate) -> String {
    Roster::default().default_responsible(date).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_by_weekday() {
        // 2026-03-02 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(default_responsible(monday), "Grupo 1");
        assert_eq!(default_responsible(monday.succ_opt().unwrap()), "Grupo 2");
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(default_responsible(sunday), "Grupo 7");
    }

    #[test]
    fn test_custom_roster() {
        let roster = Roster {
            saturday: "Guardia nocturna".to_string(),
            ..Roster::default()
        };
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(roster.default_responsible(saturday), "Guardia nocturna");
        assert!(roster.validate().is_ok());
    }

    #[test]
    fn test_blank_roster_entry_is_invalid() {
        let roster = Roster {
            friday: " ".to_string(),
            ..Roster::default()
        };
        assert!(roster.validate().is_err());
    }
}
