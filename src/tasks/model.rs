//! Task data model — the core entity, its closed enums, and validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// The devotional area a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Prayer,
    Quran,
    Dhikr,
    Charity,
    Dua,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Prayer => "prayer",
            Category::Quran => "quran",
            Category::Dhikr => "dhikr",
            Category::Charity => "charity",
            Category::Dua => "dua",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prayer" => Ok(Category::Prayer),
            "quran" => Ok(Category::Quran),
            "dhikr" => Ok(Category::Dhikr),
            "charity" => Ok(Category::Charity),
            "dua" => Ok(Category::Dua),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task cadence. Only `Daily` tasks participate in streak computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(ValidationError::UnknownFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single devotional task.
///
/// `completed_at` is present iff `completed` is true. Both fields are
/// written together by the completion recorder, never independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID.
    pub id: Uuid,
    /// Owner of this task. Existence is the caller's responsibility.
    pub owner_id: String,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Devotional area.
    pub category: Category,
    /// Cadence.
    pub frequency: Frequency,
    /// Whether the task is currently marked done.
    pub completed: bool,
    /// When the task was last marked done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the task was created. Immutable.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new incomplete task with a random id.
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: description.into(),
            category,
            frequency,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: replace the random id with a caller-chosen one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// Unvalidated task fields as received from a client.
///
/// Category and frequency arrive as raw strings and are checked against
/// the closed enums here, so unrecognized values are rejected before
/// anything touches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub frequency: String,
}

impl NewTask {
    /// Validate the fields and build a `Task`.
    pub fn validate(self) -> Result<Task, ValidationError> {
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("owner_id"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        let category: Category = self.category.parse()?;
        let frequency: Frequency = self.frequency.parse()?;
        Ok(Task::new(
            self.owner_id,
            self.title,
            self.description,
            category,
            frequency,
        ))
    }
}
