use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::days_in_month;
use crate::error::{Error, Result};
use crate::ledger::CompletionLedger;

/// Schema version of the persisted document this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

/// How often a task comes around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Semiannually,
    Annually,
    /// Every N days.
    Custom(u32),
}

impl Frequency {
    /// Human-readable label, e.g. "Every 2 weeks".
    pub fn label(&self) -> String {
        match self {
            Frequency::Daily => "Daily".into(),
            Frequency::Weekly => "Weekly".into(),
            Frequency::Biweekly => "Every 2 weeks".into(),
            Frequency::Monthly => "Monthly".into(),
            Frequency::Quarterly => "Quarterly".into(),
            Frequency::Semiannually => "Every 6 months".into(),
            Frequency::Annually => "Annually".into(),
            Frequency::Custom(1) => "Every day".into(),
            Frequency::Custom(n) => format!("Every {} days", n),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Frequency::Custom(0) => Err(Error::Config(
                "custom frequency needs an interval of at least 1 day".into(),
            )),
            _ => Ok(()),
        }
    }

    fn kind(&self) -> FrequencyKind {
        match self {
            Frequency::Daily => FrequencyKind::Daily,
            Frequency::Weekly => FrequencyKind::Weekly,
            Frequency::Biweekly => FrequencyKind::Biweekly,
            Frequency::Monthly => FrequencyKind::Monthly,
            Frequency::Quarterly => FrequencyKind::Quarterly,
            Frequency::Semiannually => FrequencyKind::Semiannually,
            Frequency::Annually => FrequencyKind::Annually,
            Frequency::Custom(_) => FrequencyKind::Custom,
        }
    }

    fn from_parts(kind: FrequencyKind, custom_interval_days: Option<u32>) -> Result<Self> {
        let frequency = match kind {
            FrequencyKind::Daily => Frequency::Daily,
            FrequencyKind::Weekly => Frequency::Weekly,
            FrequencyKind::Biweekly => Frequency::Biweekly,
            FrequencyKind::Monthly => Frequency::Monthly,
            FrequencyKind::Quarterly => Frequency::Quarterly,
            FrequencyKind::Semiannually => Frequency::Semiannually,
            FrequencyKind::Annually => Frequency::Annually,
            FrequencyKind::Custom => match custom_interval_days {
                Some(days) => Frequency::Custom(days),
                None => {
                    return Err(Error::Config(
                        "custom frequency is missing customIntervalDays".into(),
                    ))
                }
            },
        };
        frequency.validate()?;
        Ok(frequency)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Biweekly => write!(f, "biweekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
            Frequency::Semiannually => write!(f, "semiannually"),
            Frequency::Annually => write!(f, "annually"),
            Frequency::Custom(n) => write!(f, "custom:{}", n),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    /// Parses `weekly`, `biweekly`, ... or `custom:<days>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        let frequency = match s.as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "biweekly" => Frequency::Biweekly,
            "monthly" => Frequency::Monthly,
            "quarterly" => Frequency::Quarterly,
            "semiannually" => Frequency::Semiannually,
            "annually" | "yearly" => Frequency::Annually,
            other => match other.strip_prefix("custom:") {
                Some(days) => Frequency::Custom(days.trim().parse().map_err(|_| {
                    Error::Config(format!("'{}' is not a number of days", days))
                })?),
                None => {
                    return Err(Error::Config(format!(
                        "unknown frequency '{}'. Supported: daily, weekly, biweekly, monthly, quarterly, semiannually, annually, custom:<days>",
                        other
                    )))
                }
            },
        };
        frequency.validate()?;
        Ok(frequency)
    }
}

/// Wall-clock rule for a calendar-anchored schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorPattern {
    QuarterEnd,
    HalfYearEnd,
    /// Day of month, 1-31. Short months use their last day.
    DayOfMonth(u32),
    /// Fixed month (1-12) and day every year.
    YearlyDate { month: u32, day: u32 },
}

impl AnchorPattern {
    pub fn label(&self) -> String {
        match self {
            AnchorPattern::QuarterEnd => "End of each quarter".into(),
            AnchorPattern::HalfYearEnd => "End of each half-year".into(),
            AnchorPattern::DayOfMonth(day) => format!("Day {} of each month", day),
            AnchorPattern::YearlyDate { month, day } => {
                format!("Every year on {:02}-{:02}", month, day)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            AnchorPattern::QuarterEnd | AnchorPattern::HalfYearEnd => Ok(()),
            AnchorPattern::DayOfMonth(day) if (1..=31).contains(&day) => Ok(()),
            AnchorPattern::DayOfMonth(day) => Err(Error::Config(format!(
                "anchor day {} is outside 1-31",
                day
            ))),
            AnchorPattern::YearlyDate { month, .. } if !(1..=12).contains(&month) => Err(
                Error::Config(format!("anchor month {} is outside 1-12", month)),
            ),
            // Leap year so Feb 29 is accepted; it falls on Feb 28 in common years.
            AnchorPattern::YearlyDate { month, day } if day >= 1 && day <= days_in_month(2024, month) => {
                Ok(())
            }
            AnchorPattern::YearlyDate { month, day } => Err(Error::Config(format!(
                "{:02}-{:02} is not a valid date",
                month, day
            ))),
        }
    }

    /// Value stored in `anchorDay`: the day for day-of-month, `month * 100 + day`
    /// for a yearly date.
    pub fn anchor_day(&self) -> Option<u32> {
        match *self {
            AnchorPattern::QuarterEnd | AnchorPattern::HalfYearEnd => None,
            AnchorPattern::DayOfMonth(day) => Some(day),
            AnchorPattern::YearlyDate { month, day } => Some(month * 100 + day),
        }
    }

    fn kind(&self) -> AnchorKind {
        match self {
            AnchorPattern::QuarterEnd => AnchorKind::QuarterEnd,
            AnchorPattern::HalfYearEnd => AnchorKind::HalfYearEnd,
            AnchorPattern::DayOfMonth(_) => AnchorKind::DayOfMonth,
            AnchorPattern::YearlyDate { .. } => AnchorKind::YearlyDate,
        }
    }

    fn from_parts(kind: AnchorKind, anchor_day: Option<u32>) -> Result<Self> {
        let missing = || Error::Config("calendar anchor is missing anchorDay".into());
        let pattern = match kind {
            AnchorKind::QuarterEnd => AnchorPattern::QuarterEnd,
            AnchorKind::HalfYearEnd => AnchorPattern::HalfYearEnd,
            AnchorKind::DayOfMonth => AnchorPattern::DayOfMonth(anchor_day.ok_or_else(missing)?),
            AnchorKind::YearlyDate => {
                let packed = anchor_day.ok_or_else(missing)?;
                AnchorPattern::YearlyDate {
                    month: packed / 100,
                    day: packed % 100,
                }
            }
        };
        pattern.validate()?;
        Ok(pattern)
    }
}

impl fmt::Display for AnchorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorPattern::QuarterEnd => write!(f, "quarter-end"),
            AnchorPattern::HalfYearEnd => write!(f, "half-year-end"),
            AnchorPattern::DayOfMonth(day) => write!(f, "day-of-month:{}", day),
            AnchorPattern::YearlyDate { month, day } => {
                write!(f, "yearly-date:{:02}-{:02}", month, day)
            }
        }
    }
}

impl FromStr for AnchorPattern {
    type Err = Error;

    /// Parses `quarter-end`, `half-year-end`, `day-of-month:<day>` or
    /// `yearly-date:<MM>-<DD>`. Underscores work in place of dashes.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let (name, arg) = match normalized.split_once(':') {
            Some((name, arg)) => (name.to_string(), Some(arg.trim().to_string())),
            None => (normalized.clone(), None),
        };
        let bad_number = |v: &str| Error::Config(format!("'{}' is not a valid anchor day", v));

        let pattern = match (name.as_str(), arg) {
            ("quarter-end" | "quarterly-end", None) => AnchorPattern::QuarterEnd,
            ("half-year-end", None) => AnchorPattern::HalfYearEnd,
            ("day-of-month" | "monthly-day", Some(day)) => {
                AnchorPattern::DayOfMonth(day.parse().map_err(|_| bad_number(&day))?)
            }
            ("yearly-date", Some(date)) => {
                let (month, day) = date
                    .split_once('-')
                    .ok_or_else(|| Error::Config(format!("expected MM-DD, got '{}'", date)))?;
                AnchorPattern::YearlyDate {
                    month: month.parse().map_err(|_| bad_number(month))?,
                    day: day.parse().map_err(|_| bad_number(day))?,
                }
            }
            _ => {
                return Err(Error::Config(format!(
                    "unknown anchor '{}'. Supported: quarter-end, half-year-end, day-of-month:<day>, yearly-date:<MM-DD>",
                    s.trim()
                )))
            }
        };
        pattern.validate()?;
        Ok(pattern)
    }
}

/// Whether due dates follow the last completion or the wall calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Schedule {
    /// Counted forward from the most recent completion.
    #[default]
    Interval,
    /// Fixed to the calendar, regardless of when the task was done.
    Calendar(AnchorPattern),
}

impl Schedule {
    pub fn label(&self, frequency: &Frequency) -> String {
        match self {
            Schedule::Interval => frequency.label(),
            Schedule::Calendar(anchor) => anchor.label(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Schedule::Interval => Ok(()),
            Schedule::Calendar(anchor) => anchor.validate(),
        }
    }
}

/// A recurring obligation.
///
/// `next_due` and `last_completed` are caches derived from the completion
/// history; only [`crate::manager::TaskManager`] writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskDocument", into = "TaskDocument")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub schedule: Schedule,
    pub category_id: Option<String>,
    pub first_due_date: Option<NaiveDate>,
    pub last_completed: Option<NaiveDate>,
    pub next_due: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Current editable configuration.
    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            frequency: self.frequency,
            schedule: self.schedule,
            category_id: self.category_id.clone(),
            first_due_date: self.first_due_date,
        }
    }

    /// Replaces the editable fields. Caches are left for the caller to rebuild.
    pub(crate) fn apply_draft(&mut self, draft: TaskDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.frequency = draft.frequency;
        self.schedule = draft.schedule;
        self.category_id = draft.category_id;
        self.first_due_date = draft.first_due_date;
    }

    /// First eight characters of the id, enough to tell tasks apart on screen.
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// The user-editable part of a task, used to create and edit tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub schedule: Schedule,
    pub category_id: Option<String>,
    /// Required for interval tasks that have never been completed.
    pub first_due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// An interval task with no first due date yet.
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        TaskDraft {
            name: name.into(),
            description: None,
            frequency,
            schedule: Schedule::Interval,
            category_id: None,
            first_due_date: None,
        }
    }

    pub fn first_due(mut self, date: NaiveDate) -> Self {
        self.first_due_date = Some(date);
        self
    }

    pub fn anchored(mut self, anchor: AnchorPattern) -> Self {
        self.schedule = Schedule::Calendar(anchor);
        self
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the draft on its own, without looking at history or categories.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("task name is required".into()));
        }
        self.frequency.validate()?;
        self.schedule.validate()
    }
}

/// One instance of a task being done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub id: String,
    pub task_id: String,
    /// Day the user says the task was done. Never in the future.
    pub completed_at: NaiveDate,
    /// When the record was logged.
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A label for grouping tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color, `#rgb` or `#rrggbb`.
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    /// The color as RGB components, if it is a valid `#rgb`/`#rrggbb` value.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#').filter(|h| h.is_ascii())?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some((out[0], out[1], out[2]))
            }
            _ => None,
        }
    }

    /// Categories every fresh data file starts with.
    pub fn defaults() -> Vec<Category> {
        [
            ("home", "Home", "#3b82f6"),
            ("yard", "Yard", "#22c55e"),
            ("vehicle", "Vehicle", "#f59e0b"),
            ("health", "Health", "#ef4444"),
        ]
        .into_iter()
        .map(|(id, name, color)| Category {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            is_default: true,
        })
        .collect()
    }
}

/// Everything that is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub schema_version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub completion_records: CompletionLedger,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Default for AppData {
    fn default() -> Self {
        AppData {
            schema_version: SCHEMA_VERSION,
            tasks: Vec::new(),
            completion_records: CompletionLedger::default(),
            categories: Category::defaults(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FrequencyKind {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Semiannually,
    Annually,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ScheduleKind {
    #[default]
    Interval,
    Calendar,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AnchorKind {
    #[serde(alias = "quarterly_end")]
    QuarterEnd,
    HalfYearEnd,
    #[serde(alias = "monthly_day")]
    DayOfMonth,
    YearlyDate,
}

/// Flat on-disk shape of a [`Task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDocument {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    frequency: FrequencyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_interval_days: Option<u32>,
    #[serde(default)]
    schedule_type: ScheduleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anchor_pattern: Option<AnchorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anchor_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_completed: Option<NaiveDate>,
    next_due: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskDocument> for Task {
    type Error = Error;

    fn try_from(doc: TaskDocument) -> Result<Self> {
        let frequency = Frequency::from_parts(doc.frequency, doc.custom_interval_days)?;
        let schedule = match doc.schedule_type {
            ScheduleKind::Interval => Schedule::Interval,
            ScheduleKind::Calendar => {
                let kind = doc.anchor_pattern.ok_or_else(|| {
                    Error::Config(format!("calendar task '{}' has no anchorPattern", doc.id))
                })?;
                Schedule::Calendar(AnchorPattern::from_parts(kind, doc.anchor_day)?)
            }
        };
        Ok(Task {
            id: doc.id,
            name: doc.name,
            description: doc.description,
            frequency,
            schedule,
            category_id: doc.category_id,
            first_due_date: doc.first_due_date,
            last_completed: doc.last_completed,
            next_due: doc.next_due,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

impl From<Task> for TaskDocument {
    fn from(task: Task) -> Self {
        let (schedule_type, anchor_pattern, anchor_day) = match task.schedule {
            Schedule::Interval => (ScheduleKind::Interval, None, None),
            Schedule::Calendar(anchor) => {
                (ScheduleKind::Calendar, Some(anchor.kind()), anchor.anchor_day())
            }
        };
        let custom_interval_days = match task.frequency {
            Frequency::Custom(days) => Some(days),
            _ => None,
        };
        TaskDocument {
            id: task.id,
            name: task.name,
            description: task.description,
            frequency: task.frequency.kind(),
            custom_interval_days,
            schedule_type,
            anchor_pattern,
            anchor_day,
            category_id: task.category_id,
            first_due_date: task.first_due_date,
            last_completed: task.last_completed,
            next_due: task.next_due,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_custom_interval() {
        assert_eq!("custom:45".parse::<Frequency>().unwrap(), Frequency::Custom(45));
        assert_eq!(" Weekly ".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!(matches!("custom:0".parse::<Frequency>(), Err(Error::Config(_))));
        assert!(matches!("fortnightly".parse::<Frequency>(), Err(Error::Config(_))));
    }

    #[test]
    fn anchor_parses_all_patterns() {
        assert_eq!("quarter-end".parse::<AnchorPattern>().unwrap(), AnchorPattern::QuarterEnd);
        assert_eq!("half_year_end".parse::<AnchorPattern>().unwrap(), AnchorPattern::HalfYearEnd);
        assert_eq!(
            "day-of-month:31".parse::<AnchorPattern>().unwrap(),
            AnchorPattern::DayOfMonth(31)
        );
        assert_eq!(
            "yearly-date:04-15".parse::<AnchorPattern>().unwrap(),
            AnchorPattern::YearlyDate { month: 4, day: 15 }
        );
    }

    #[test]
    fn anchor_rejects_out_of_range_days() {
        assert!(matches!("day-of-month:32".parse::<AnchorPattern>(), Err(Error::Config(_))));
        assert!(matches!("day-of-month:0".parse::<AnchorPattern>(), Err(Error::Config(_))));
        assert!(matches!("yearly-date:02-30".parse::<AnchorPattern>(), Err(Error::Config(_))));
        assert!(matches!("yearly-date:13-01".parse::<AnchorPattern>(), Err(Error::Config(_))));
        assert!("yearly-date:02-29".parse::<AnchorPattern>().is_ok());
    }

    #[test]
    fn yearly_anchor_packs_month_and_day() {
        let anchor = AnchorPattern::YearlyDate { month: 12, day: 31 };
        assert_eq!(anchor.anchor_day(), Some(1231));
        assert_eq!(
            AnchorPattern::from_parts(AnchorKind::YearlyDate, Some(1231)).unwrap(),
            anchor
        );
    }

    #[test]
    fn draft_requires_a_name() {
        let draft = TaskDraft::new("   ", Frequency::Weekly);
        assert!(matches!(draft.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn category_color_components() {
        let mut category = Category::defaults().remove(0);
        assert_eq!(category.rgb(), Some((0x3b, 0x82, 0xf6)));
        category.color = "#fa0".into();
        assert_eq!(category.rgb(), Some((0xff, 0xaa, 0x00)));
        category.color = "blue".into();
        assert_eq!(category.rgb(), None);
    }

    #[test]
    fn frequency_labels() {
        assert_eq!(Frequency::Biweekly.label(), "Every 2 weeks");
        assert_eq!(Frequency::Custom(45).label(), "Every 45 days");
    }
}
