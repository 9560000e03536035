use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueTask {
    pub task: Task,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeglectedGroup {
    pub category: String,
    pub count: usize,
    /// Days overdue of the oldest member.
    pub days_overdue: i64,
    pub tasks: Vec<OverdueTask>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub date_key: String,
    pub week_start: DateTime<FixedOffset>,
    pub week_end: DateTime<FixedOffset>,
    pub this_week: Vec<Task>,
    pub next_by_category: BTreeMap<String, Option<Task>>,
    pub upcoming_by_category: BTreeMap<String, Vec<Task>>,
    pub neglected: Vec<NeglectedGroup>,
    pub completed_per_day: Vec<DayCount>,
    pub stats: TaskStats,
    pub trash_count: usize,
    pub updated_at: i64,
}
