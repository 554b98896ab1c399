use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub completed: bool,
    pub created_at: String,
}

/// One habit's state as captured in a [`DayRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDetail {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub completed: bool,
}

impl From<&Habit> for HabitDetail {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id.clone(),
            name: habit.name.clone(),
            emoji: habit.emoji.clone(),
            completed: habit.completed,
        }
    }
}

/// Frozen completion snapshot for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    pub total_score: u32,
    pub completed_habits: Vec<String>,
    pub habit_details: Vec<HabitDetail>,
    pub formatted_date: String,
    pub full_date: String,
}

impl DayRecord {
    /// Builds a record from roster details; score and completed ids follow the details.
    pub fn from_details(date: NaiveDate, habit_details: Vec<HabitDetail>) -> Self {
        let completed_habits: Vec<String> = habit_details
            .iter()
            .filter(|detail| detail.completed)
            .map(|detail| detail.id.clone())
            .collect();

        Self {
            date,
            total_score: completed_habits.len() as u32,
            completed_habits,
            habit_details,
            formatted_date: short_date(date),
            full_date: long_date(date),
        }
    }
}

/// `Oct 15`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// `Thursday, October 15, 2026`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub average: f64,
    pub best: u32,
    pub total: u32,
    pub streak: u32,
}

/// Trailing window of days that statistics are computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    #[default]
    Week,
    Month,
    Quarter,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Week, Period::Month, Period::Quarter];

    pub fn days(self) -> usize {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "7" => Ok(Period::Week),
            "30" => Ok(Period::Month),
            "90" => Ok(Period::Quarter),
            other => Err(format!("period must be 7, 30 or 90, got '{other}'")),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    pub name: String,
    #[serde(default)]
    pub emoji: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<Period>,
}

/// Roster with today's score, as served to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub habits: Vec<Habit>,
    pub score: u32,
    pub total: u32,
    pub percent: u32,
    pub fault: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub period: Period,
    pub days: Vec<DayRecord>,
    pub stats: Statistics,
}
