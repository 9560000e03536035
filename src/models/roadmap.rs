use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::lenient_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_ids: Vec<i64>,
    #[serde(default)]
    pub total_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
    /// Computed by the data-tracking service; displayed as-is.
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Roadmap {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Server-computed percentage, else derived from the task counts.
    pub fn progress(&self) -> f64 {
        match self.progress_percentage {
            Some(pct) => pct,
            None if self.total_tasks == 0 => 0.0,
            None => f64::from(self.completed_tasks) * 100.0 / f64::from(self.total_tasks),
        }
    }
}
