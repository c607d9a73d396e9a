//! Progress aggregation — totals, completion rate, and the daily streak.
//!
//! All date work is in UTC: `completed_at` instants truncate to UTC
//! calendar dates, and "today" is the current UTC date. A user completing
//! a task late at night in a western timezone may land on the next UTC
//! day; accepted trade-off, noted in DESIGN.md.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::store::TaskStore;
use crate::tasks::model::{Frequency, Task};

/// Aggregate progress for one owner's tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Percentage of tasks completed, rounded to 2 decimals. 0 when there
    /// are no tasks.
    pub completion_rate: f64,
    pub daily_tasks: usize,
    pub weekly_tasks: usize,
    /// Consecutive UTC days ending today or yesterday on which at least
    /// one daily task was completed.
    pub streak_days: u32,
}

/// Compute the summary for a task set, with "today" injected so the
/// streak is testable against fixed dates.
pub fn summarize(tasks: &[Task], today: NaiveDate) -> ProgressSummary {
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.completed).count();

    let completion_rate = if total_tasks == 0 {
        0.0
    } else {
        let rate = completed_tasks as f64 / total_tasks as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    };

    // Monthly tasks land in neither bucket.
    let daily_tasks = tasks.iter().filter(|t| t.frequency == Frequency::Daily).count();
    let weekly_tasks = tasks.iter().filter(|t| t.frequency == Frequency::Weekly).count();

    ProgressSummary {
        total_tasks,
        completed_tasks,
        completion_rate,
        daily_tasks,
        weekly_tasks,
        streak_days: streak_days(tasks, today),
    }
}

/// Consecutive-day completion streak over daily tasks.
///
/// Distinct UTC completion dates are walked from the most recent
/// backwards; the streak is anchored at today or yesterday and stops at
/// the first gap. A most recent completion older than yesterday means
/// the streak is broken, regardless of history.
fn streak_days(tasks: &[Task], today: NaiveDate) -> u32 {
    // BTreeSet both dedups same-day completions and keeps dates ordered.
    let dates: BTreeSet<NaiveDate> = tasks
        .iter()
        .filter(|t| t.frequency == Frequency::Daily && t.completed)
        .filter_map(|t| t.completed_at)
        .map(|instant| instant.date_naive())
        .collect();

    let mut recent_first = dates.iter().rev();
    let Some(&most_recent) = recent_first.next() else {
        return 0;
    };

    let yesterday = today - Days::new(1);
    if most_recent != today && most_recent != yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut previous = most_recent;
    for &date in recent_first {
        if date + Days::new(1) != previous {
            break;
        }
        streak += 1;
        previous = date;
    }
    streak
}

/// Loads an owner's tasks and summarizes them. Read-only.
pub struct ProgressAggregator {
    store: Arc<dyn TaskStore>,
}

impl ProgressAggregator {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Progress for one owner, anchored at the current UTC date.
    pub async fn progress_for(&self, owner_id: &str) -> Result<ProgressSummary, TaskError> {
        let tasks = self.store.list_tasks(owner_id).await?;
        Ok(summarize(&tasks, Utc::now().date_naive()))
    }
}
