use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Weekly entry, keyed by lowercase weekday name in the stored map.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct DayHours {
    /// "HH:MM", zero-padded 24h clock.
    pub open: String,
    pub close: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HolidayClosure {
    /// "YYYY-MM-DD"
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Date-specific override of the weekly schedule.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct SpecialHour {
    pub date: String,
    pub open: String,
    pub close: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct CurrentHours {
    pub open: String,
    pub close: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct OpenState {
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_hours: Option<CurrentHours>,
}

/// Typed view over the profile's three JSONB schedule columns.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub opening_hours: HashMap<String, DayHours>,
    pub holiday_closures: Vec<HolidayClosure>,
    pub special_hours: Vec<SpecialHour>,
}

impl Schedule {
    pub fn from_values(
        opening_hours: &Value,
        holiday_closures: &Value,
        special_hours: &Value,
    ) -> Result<Self> {
        Ok(Self {
            opening_hours: serde_json::from_value(opening_hours.clone())
                .context("Malformed opening_hours")?,
            holiday_closures: serde_json::from_value(holiday_closures.clone())
                .context("Malformed holiday_closures")?,
            special_hours: serde_json::from_value(special_hours.clone())
                .context("Malformed special_hours")?,
        })
    }

    /// Open/closed determination for a wall-clock instant. Precedence is
    /// strict: holiday closure, then date-specific special hours, then the
    /// weekday entry. Days with no entry are closed. All open/close windows
    /// are half-open: open <= t < close, compared lexically on "HH:MM".
    pub fn resolve_open_state(&self, at: NaiveDateTime) -> OpenState {
        let date = at.format("%Y-%m-%d").to_string();
        let time = at.format("%H:%M").to_string();
        let weekday = at.format("%A").to_string().to_lowercase();

        if let Some(closure) = self.holiday_closures.iter().find(|c| c.date == date) {
            return OpenState {
                is_open: false,
                reason: Some(
                    closure
                        .reason
                        .clone()
                        .unwrap_or_else(|| "Closed for holiday".to_string()),
                ),
                current_hours: None,
            };
        }

        if let Some(special) = self.special_hours.iter().find(|s| s.date == date) {
            let is_open =
                special.open.as_str() <= time.as_str() && time.as_str() < special.close.as_str();
            return OpenState {
                is_open,
                reason: (!is_open).then(|| {
                    special
                        .reason
                        .clone()
                        .unwrap_or_else(|| "Special hours".to_string())
                }),
                current_hours: Some(CurrentHours {
                    open: special.open.clone(),
                    close: special.close.clone(),
                }),
            };
        }

        match self.opening_hours.get(&weekday) {
            None => OpenState {
                is_open: false,
                reason: Some("Closed today".to_string()),
                current_hours: None,
            },
            Some(hours) if hours.closed.unwrap_or(false) => OpenState {
                is_open: false,
                reason: Some("Closed today".to_string()),
                current_hours: None,
            },
            Some(hours) => {
                let is_open =
                    hours.open.as_str() <= time.as_str() && time.as_str() < hours.close.as_str();
                OpenState {
                    is_open,
                    reason: (!is_open).then(|| "Outside business hours".to_string()),
                    current_hours: Some(CurrentHours {
                        open: hours.open.clone(),
                        close: hours.close.clone(),
                    }),
                }
            }
        }
    }
}

/// Bootstrap schedule for a freshly seeded profile: open every day, longer
/// Friday/Saturday evenings, shorter Sunday.
pub fn default_opening_hours() -> HashMap<String, DayHours> {
    let mut hours = HashMap::new();
    for day in ["monday", "tuesday", "wednesday", "thursday"] {
        hours.insert(day.to_string(), day_hours("09:00", "22:00"));
    }
    hours.insert("friday".to_string(), day_hours("09:00", "23:00"));
    hours.insert("saturday".to_string(), day_hours("10:00", "23:00"));
    hours.insert("sunday".to_string(), day_hours("10:00", "21:00"));
    hours
}

fn day_hours(open: &str, close: &str) -> DayHours {
    DayHours {
        open: open.to_string(),
        close: close.to_string(),
        closed: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2026-03-08 is a Sunday, 2026-03-09 a Monday.
    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn weekly_schedule() -> Schedule {
        let mut opening_hours = HashMap::new();
        opening_hours.insert("sunday".to_string(), day_hours("10:00", "20:00"));
        opening_hours.insert("monday".to_string(), day_hours("09:00", "22:00"));
        Schedule {
            opening_hours,
            holiday_closures: Vec::new(),
            special_hours: Vec::new(),
        }
    }

    #[test]
    fn open_inside_regular_hours_closed_on_the_boundary() {
        let schedule = weekly_schedule();
        assert!(schedule.resolve_open_state(at(8, 19, 59)).is_open);
        // close is exclusive: 20:00 is already outside the window
        let boundary = schedule.resolve_open_state(at(8, 20, 0));
        assert!(!boundary.is_open);
        assert_eq!(boundary.reason.as_deref(), Some("Outside business hours"));
        let hours = boundary.current_hours.unwrap();
        assert_eq!((hours.open.as_str(), hours.close.as_str()), ("10:00", "20:00"));
    }

    #[test]
    fn open_boundary_is_inclusive() {
        let schedule = weekly_schedule();
        assert!(!schedule.resolve_open_state(at(8, 9, 59)).is_open);
        assert!(schedule.resolve_open_state(at(8, 10, 0)).is_open);
    }

    #[test]
    fn day_without_an_entry_is_closed() {
        let schedule = weekly_schedule();
        // Tuesday 2026-03-10 has no entry at all.
        let state = schedule.resolve_open_state(at(10, 12, 0));
        assert!(!state.is_open);
        assert_eq!(state.reason.as_deref(), Some("Closed today"));
    }

    #[test]
    fn closed_flag_overrides_the_stored_window() {
        let mut schedule = weekly_schedule();
        schedule.opening_hours.insert(
            "monday".to_string(),
            DayHours {
                open: "09:00".to_string(),
                close: "22:00".to_string(),
                closed: Some(true),
            },
        );
        let state = schedule.resolve_open_state(at(9, 12, 0));
        assert!(!state.is_open);
        assert_eq!(state.reason.as_deref(), Some("Closed today"));
    }

    #[test]
    fn special_hours_replace_the_weekly_window_for_that_date() {
        let mut schedule = weekly_schedule();
        schedule.special_hours.push(SpecialHour {
            date: "2026-03-09".to_string(),
            open: "12:00".to_string(),
            close: "15:00".to_string(),
            reason: None,
        });
        // 10:00 would be open on a regular Monday, but not under special hours.
        let state = schedule.resolve_open_state(at(9, 10, 0));
        assert!(!state.is_open);
        assert_eq!(state.reason.as_deref(), Some("Special hours"));
        assert!(schedule.resolve_open_state(at(9, 12, 0)).is_open);
        // No reason is reported while open.
        assert!(schedule.resolve_open_state(at(9, 12, 0)).reason.is_none());
    }

    #[test]
    fn holiday_closure_wins_over_special_hours_on_the_same_date() {
        let mut schedule = weekly_schedule();
        schedule.special_hours.push(SpecialHour {
            date: "2026-03-09".to_string(),
            open: "00:00".to_string(),
            close: "23:59".to_string(),
            reason: None,
        });
        schedule.holiday_closures.push(HolidayClosure {
            date: "2026-03-09".to_string(),
            reason: Some("Staff outing".to_string()),
        });
        let state = schedule.resolve_open_state(at(9, 12, 0));
        assert!(!state.is_open);
        assert_eq!(state.reason.as_deref(), Some("Staff outing"));
    }

    #[test]
    fn holiday_reason_falls_back_to_a_generic_message() {
        let mut schedule = weekly_schedule();
        schedule.holiday_closures.push(HolidayClosure {
            date: "2026-03-08".to_string(),
            reason: None,
        });
        let state = schedule.resolve_open_state(at(8, 12, 0));
        assert_eq!(state.reason.as_deref(), Some("Closed for holiday"));
    }

    #[test]
    fn default_hours_cover_all_seven_days() {
        let hours = default_opening_hours();
        assert_eq!(hours.len(), 7);
        assert_eq!(hours["friday"].close, "23:00");
        assert_eq!(hours["sunday"].close, "21:00");
    }

    #[test]
    fn schedule_parses_from_stored_jsonb_values() {
        let opening = serde_json::json!({
            "monday": {"open": "09:00", "close": "22:00"},
            "tuesday": {"open": "09:00", "close": "22:00", "closed": true},
        });
        let closures = serde_json::json!([{"date": "2026-12-25", "reason": "Christmas"}]);
        let specials = serde_json::json!([
            {"date": "2026-12-31", "open": "10:00", "close": "16:00"}
        ]);
        let schedule = Schedule::from_values(&opening, &closures, &specials).unwrap();
        assert_eq!(schedule.opening_hours.len(), 2);
        assert_eq!(schedule.holiday_closures.len(), 1);
        assert_eq!(schedule.special_hours[0].close, "16:00");
    }
}
