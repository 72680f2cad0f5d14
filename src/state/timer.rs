//! Timer record, its lifecycle and validated construction

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;

/// Lifecycle status of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerStatus {
    Paused,
    Running,
    Completed,
}

/// Fixed set of timer categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Workout,
    Study,
    Break,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Workout => "Workout",
            Category::Study => "Study",
            Category::Break => "Break",
        };
        f.write_str(name)
    }
}

/// Duration as submitted by a client: either a number or the raw text typed
/// into a form field. Any other JSON value is kept so it can be rejected as a
/// validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Seconds(i64),
    Text(String),
    Other(serde_json::Value),
}

impl DurationInput {
    /// Parse into a positive number of seconds
    pub fn seconds(&self) -> Result<u32, ValidationError> {
        let parsed = match self {
            DurationInput::Seconds(n) => u32::try_from(*n).ok(),
            DurationInput::Text(text) => text.trim().parse::<u32>().ok(),
            DurationInput::Other(_) => None,
        };

        match parsed {
            Some(seconds) if seconds > 0 => Ok(seconds),
            _ => Err(ValidationError::InvalidDuration(self.to_string())),
        }
    }
}

impl Default for DurationInput {
    fn default() -> Self {
        DurationInput::Text(String::new())
    }
}

impl fmt::Display for DurationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationInput::Seconds(n) => write!(f, "{}", n),
            DurationInput::Text(text) => f.write_str(text),
            DurationInput::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Request to create a timer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration: DurationInput,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub halfway_alert: bool,
}

impl TimerDraft {
    pub fn new(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            duration: DurationInput::Seconds(i64::from(duration)),
            category: Category::default(),
            halfway_alert: false,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn halfway_alert(mut self, enabled: bool) -> Self {
        self.halfway_alert = enabled;
        self
    }
}

/// What a single tick did to one timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Remaining reached half of the duration and the halfway alert is set
    pub halfway: bool,
    /// Remaining reached zero on this tick
    pub completed: bool,
}

/// Untrusted shape of a persisted timer, validated into [`Timer`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub id: Uuid,
    pub name: String,
    pub duration: u32,
    pub remaining: u32,
    pub status: TimerStatus,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub halfway_alert: bool,
}

/// One countdown timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TimerRecord")]
pub struct Timer {
    id: Uuid,
    name: String,
    duration: u32,
    remaining: u32,
    status: TimerStatus,
    category: Category,
    halfway_alert: bool,
}

impl Timer {
    /// Create a paused timer with the full duration remaining
    pub fn new(
        name: &str,
        duration: u32,
        category: Category,
        halfway_alert: bool,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if duration == 0 {
            return Err(ValidationError::InvalidDuration(duration.to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            duration,
            remaining: duration,
            status: TimerStatus::Paused,
            category,
            halfway_alert,
        })
    }

    /// Create a timer from a client draft
    pub fn from_draft(draft: &TimerDraft) -> Result<Self, ValidationError> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let duration = draft.duration.seconds()?;
        Self::new(&draft.name, duration, draft.category, draft.halfway_alert)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn halfway_alert(&self) -> bool {
        self.halfway_alert
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == TimerStatus::Completed
    }

    /// Remaining fraction of the duration, from 1.0 down to 0.0
    pub fn progress(&self) -> f64 {
        f64::from(self.remaining) / f64::from(self.duration)
    }

    /// Paused -> Running. Returns whether the status changed.
    pub fn start(&mut self) -> bool {
        if self.status != TimerStatus::Paused {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    /// Running -> Paused. Returns whether the status changed.
    pub fn pause(&mut self) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        self.status = TimerStatus::Paused;
        true
    }

    /// Restore the full duration and pause, from any status
    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.status = TimerStatus::Paused;
    }

    /// Advance a running timer by one second.
    ///
    /// Returns `None` when the timer is not running. Completion fires on the
    /// tick that brings `remaining` to zero and only then, since a completed
    /// timer is no longer running.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.status != TimerStatus::Running || self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;

        let halfway = self.halfway_alert && self.remaining == self.duration / 2;
        let completed = self.remaining == 0;
        if completed {
            self.status = TimerStatus::Completed;
        }

        Some(TickOutcome { halfway, completed })
    }
}

impl TryFrom<TimerRecord> for Timer {
    type Error = ValidationError;

    fn try_from(record: TimerRecord) -> Result<Self, Self::Error> {
        if record.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if record.duration == 0 {
            return Err(ValidationError::InvalidDuration(record.duration.to_string()));
        }
        if record.remaining > record.duration {
            return Err(ValidationError::RemainingExceedsDuration {
                remaining: record.remaining,
                duration: record.duration,
            });
        }
        match record.status {
            TimerStatus::Completed if record.remaining != 0 => {
                return Err(ValidationError::CompletedWithTimeLeft(record.remaining));
            }
            TimerStatus::Running if record.remaining == 0 => {
                return Err(ValidationError::RunningWithoutTimeLeft);
            }
            _ => {}
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            duration: record.duration,
            remaining: record.remaining,
            status: record.status,
            category: record.category,
            halfway_alert: record.halfway_alert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(duration: u32, halfway_alert: bool) -> Timer {
        let mut timer = Timer::new("Study", duration, Category::Study, halfway_alert).unwrap();
        assert!(timer.start());
        timer
    }

    #[test]
    fn new_timer_is_paused_with_full_duration() {
        let timer = Timer::new("  Plank ", 45, Category::Workout, false).unwrap();
        assert_eq!(timer.name(), "Plank");
        assert_eq!(timer.remaining(), 45);
        assert_eq!(timer.status(), TimerStatus::Paused);
    }

    #[test]
    fn new_timer_rejects_empty_name_and_zero_duration() {
        assert_eq!(
            Timer::new("   ", 10, Category::Break, false),
            Err(ValidationError::EmptyName)
        );
        assert!(matches!(
            Timer::new("Nap", 0, Category::Break, false),
            Err(ValidationError::InvalidDuration(_))
        ));
    }

    #[test]
    fn duration_input_accepts_numbers_and_numeric_text() {
        assert_eq!(DurationInput::Seconds(90).seconds(), Ok(90));
        assert_eq!(DurationInput::Text(" 25 ".into()).seconds(), Ok(25));

        for bad in [
            DurationInput::Seconds(0),
            DurationInput::Seconds(-3),
            DurationInput::Text(String::new()),
            DurationInput::Text("ten".into()),
            DurationInput::Text("1.5".into()),
        ] {
            assert!(bad.seconds().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn draft_deserializes_from_form_style_json() {
        let draft: TimerDraft =
            serde_json::from_str(r#"{"name":"Read","duration":"30","halfwayAlert":true}"#).unwrap();
        let timer = Timer::from_draft(&draft).unwrap();
        assert_eq!(timer.duration(), 30);
        assert_eq!(timer.category(), Category::Workout);
        assert!(timer.halfway_alert());
    }

    #[test]
    fn non_integer_json_durations_fail_validation() {
        for raw in [r#"1.5"#, "true", "null", "1e3", "[10]", "18446744073709551615"] {
            let json = format!(r#"{{"name":"Study","duration":{}}}"#, raw);
            let draft: TimerDraft = serde_json::from_str(&json).unwrap();
            assert!(
                matches!(Timer::from_draft(&draft), Err(ValidationError::InvalidDuration(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn paused_and_completed_timers_do_not_tick() {
        let mut timer = Timer::new("Study", 3, Category::Study, false).unwrap();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 3);

        timer.start();
        for _ in 0..3 {
            timer.tick();
        }
        assert!(timer.is_completed());
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn one_second_timer_completes_exactly_once() {
        let mut timer = running(1, false);
        assert_eq!(
            timer.tick(),
            Some(TickOutcome { halfway: false, completed: true })
        );
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn halfway_fires_only_at_floor_of_half() {
        let mut timer = running(7, true);
        let halfway_at: Vec<u32> = (0..7)
            .filter_map(|_| {
                let outcome = timer.tick()?;
                outcome.halfway.then_some(timer.remaining())
            })
            .collect();
        assert_eq!(halfway_at, vec![3]);
    }

    #[test]
    fn halfway_is_silent_without_the_flag() {
        let mut timer = running(4, false);
        assert!((0..4).all(|_| !timer.tick().unwrap().halfway));
    }

    #[test]
    fn completed_timer_only_leaves_through_reset() {
        let mut timer = running(1, false);
        timer.tick();

        assert!(!timer.start());
        assert!(!timer.pause());
        assert!(timer.is_completed());

        timer.reset();
        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.remaining(), 1);
        assert!(timer.start());
    }

    #[test]
    fn reset_restores_duration_from_running() {
        let mut timer = running(10, false);
        timer.tick();
        timer.tick();
        timer.reset();
        assert_eq!(timer.remaining(), 10);
        assert_eq!(timer.status(), TimerStatus::Paused);
    }

    #[test]
    fn serialized_timer_uses_camel_case_fields() {
        let timer = Timer::new("Study", 10, Category::Study, true).unwrap();
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["halfwayAlert"], true);
        assert_eq!(json["status"], "Paused");
        assert_eq!(json["category"], "Study");

        let back: Timer = serde_json::from_value(json).unwrap();
        assert_eq!(back, timer);
    }

    #[test]
    fn persisted_records_breaking_invariants_are_rejected() {
        let id = Uuid::new_v4();
        let cases = [
            (r#""name":"x","duration":5,"remaining":6,"status":"Paused""#, "remaining > duration"),
            (r#""name":"x","duration":5,"remaining":2,"status":"Completed""#, "completed early"),
            (r#""name":"x","duration":5,"remaining":0,"status":"Running""#, "running at zero"),
            (r#""name":"","duration":5,"remaining":5,"status":"Paused""#, "empty name"),
            (r#""name":"x","duration":0,"remaining":0,"status":"Paused""#, "zero duration"),
            (r#""name":"x","duration":5,"remaining":5,"status":"Stopped""#, "unknown status"),
        ];

        for (fields, label) in cases {
            let json = format!(r#"{{"id":"{}",{}}}"#, id, fields);
            assert!(serde_json::from_str::<Timer>(&json).is_err(), "{label}");
        }
    }
}
