use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::db::HabitStore;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
}

impl Period {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    pub name: String,
    pub period: Period,
    pub created_at: NaiveDateTime,
    pub completed_at: Vec<NaiveDateTime>,
    pub streak: u32,
    pub longest_streak: u32,
    pub missed_periods: u32,
}

impl Habit {
    pub fn new(name: &str, period: Period) -> Self {
        Self {
            name: name.to_string(),
            period,
            created_at: now_to_the_second(),
            completed_at: Vec::new(),
            streak: 0,
            longest_streak: 0,
            missed_periods: 0,
        }
    }

    pub fn check_off(&mut self, store: &HabitStore) -> Result<()> {
        self.check_off_at(store, now_to_the_second())
    }

    pub fn check_off_at(&mut self, store: &HabitStore, at: NaiveDateTime) -> Result<()> {
        self.record(at);
        store.save(self)
    }

    fn record(&mut self, at: NaiveDateTime) {
        self.completed_at.push(at);
        self.recalculate();
    }

    // Streak deltas are measured from creation, not from the previous
    // check-off: a check-off within the creation period or the one right
    // after it extends the streak, anything later resets it to 1.
    fn recalculate(&mut self) {
        let Some(latest) = self.completed_at.last() else {
            self.streak = 0;
            return;
        };

        let elapsed_days = (latest.date() - self.created_at.date()).num_days();
        let delta = match self.period {
            Period::Daily => elapsed_days,
            Period::Weekly => elapsed_days.div_euclid(7),
        };

        if delta <= 1 {
            self.streak += 1;
        } else {
            self.missed_periods += (delta - 1) as u32;
            self.streak = 1;
        }

        if self.streak > self.longest_streak {
            self.longest_streak = self.streak;
        }
    }

    pub fn analysis(&self) -> HabitAnalysis {
        HabitAnalysis {
            name: self.name.clone(),
            period: self.period.as_str().to_string(),
            created_at: format_timestamp(self.created_at),
            completion_history: self
                .completed_at
                .iter()
                .copied()
                .map(format_timestamp)
                .collect(),
            streak: self.streak,
            longest_streak: self.longest_streak,
            missed_periods: self.missed_periods,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitAnalysis {
    pub name: String,
    pub period: String,
    pub created_at: String,
    pub completion_history: Vec<String>,
    pub streak: u32,
    pub longest_streak: u32,
    pub missed_periods: u32,
}

impl HabitAnalysis {
    pub fn render(&self) -> String {
        let history = if self.completion_history.is_empty() {
            "  (no check-offs yet)".to_string()
        } else {
            self.completion_history
                .iter()
                .enumerate()
                .map(|(index, stamp)| format!("  {}. {stamp}", index + 1))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Habit '{}' ({})\n- created: {}\n- current streak: {}\n- longest streak: {}\n- missed periods: {}\n- check-offs ({}):\n{}",
            self.name,
            self.period,
            self.created_at,
            self.streak,
            self.longest_streak,
            self.missed_periods,
            self.completion_history.len(),
            history
        )
    }
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid stored timestamp: {raw}"))
}

fn now_to_the_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
