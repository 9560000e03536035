//! Derived dashboard views over a task snapshot.
//!
//! Every function here is pure: inputs are borrowed, nothing is cached, and
//! the same snapshot and reference instant always yield the same output.
//! Deleted tasks are invisible to every view except [`trashed`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::{
    DayCount, NeglectedGroup, OverdueTask, Task, TaskStats, TaskStatus, PET_CATEGORIES,
};
use crate::utils::time::{days_overdue, local_date, week_window};

pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

/// Orders by due date with undated tasks last.
fn cmp_due(a: &Task, b: &Task) -> Ordering {
    match (&a.due_at, &b.due_at) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn visible(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().filter(|t| !t.is_deleted())
}

/// Open tasks due inside the current Sunday..Saturday week, soonest first.
pub fn this_week_active<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<&'a Task> {
    let window = week_window(now);
    let mut selected: Vec<&Task> = visible(tasks)
        .filter(|t| !t.is_completed())
        .filter(|t| t.due_at.as_ref().is_some_and(|due| window.contains(due)))
        .collect();
    selected.sort_by(|a, b| cmp_due(a, b));
    selected
}

/// The open task carrying `tag` with the nearest deadline.
pub fn next_task_for_tag<'a>(tasks: &'a [Task], tag: &str) -> Option<&'a Task> {
    visible(tasks)
        .filter(|t| !t.is_completed() && t.has_tag(tag))
        .min_by(|a, b| cmp_due(a, b))
}

/// Up to `n` open, not-yet-overdue tasks carrying `tag`, soonest first.
pub fn top_n_upcoming_for_tag<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    tag: &str,
    now: &DateTime<Tz>,
    n: usize,
) -> Vec<&'a Task> {
    let now_utc = now.with_timezone(&Utc);
    let mut selected: Vec<&Task> = visible(tasks)
        .filter(|t| !t.is_completed() && t.has_tag(tag))
        .filter(|t| t.due_at.map_or(true, |due| due >= now_utc))
        .collect();
    selected.sort_by(|a, b| cmp_due(a, b));
    selected.truncate(n);
    selected
}

/// Open tasks past their deadline, grouped by primary tag.
///
/// Groups come out oldest-deadline first (ties by category name); members
/// inside a group are ordered the same way.
pub fn neglected_by_category<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<NeglectedGroup> {
    let now_utc = now.with_timezone(&Utc);
    let mut order: Vec<&str> = Vec::new();
    let mut by_category: HashMap<&str, Vec<&Task>> = HashMap::new();

    for task in visible(tasks).filter(|t| !t.is_completed()) {
        let Some(due) = task.due_at else { continue };
        if due >= now_utc {
            continue;
        }
        let category = task.category();
        by_category
            .entry(category)
            .or_insert_with(|| {
                order.push(category);
                Vec::new()
            })
            .push(task);
    }

    let mut groups: Vec<(DateTime<Utc>, NeglectedGroup)> = order
        .into_iter()
        .filter_map(|category| {
            let mut members = by_category.remove(category)?;
            members.sort_by(|a, b| cmp_due(a, b));
            let oldest = members.first()?.due_at?;
            let tasks = members
                .into_iter()
                .map(|t| OverdueTask {
                    days_overdue: t.due_at.map_or(0, |due| days_overdue(&due, now)),
                    task: t.clone(),
                })
                .collect::<Vec<_>>();
            Some((
                oldest,
                NeglectedGroup {
                    category: category.to_string(),
                    count: tasks.len(),
                    days_overdue: days_overdue(&oldest, now),
                    tasks,
                },
            ))
        })
        .collect();

    groups.sort_by(|(a_due, a), (b_due, b)| a_due.cmp(b_due).then_with(|| a.category.cmp(&b.category)));
    groups.into_iter().map(|(_, group)| group).collect()
}

/// The calendar day a task's completion is credited to, if any.
fn completion_day<Tz: TimeZone>(task: &Task, tz: &Tz) -> Option<NaiveDate> {
    match (&task.completed_at, task.status) {
        (Some(at), _) => Some(local_date(at, tz)),
        (None, TaskStatus::Completed) => task.updated_at.as_ref().map(|at| local_date(at, tz)),
        (None, _) => None,
    }
}

/// Completed-task counts for the seven calendar days starting at `week_start`.
pub fn completed_per_day<Tz: TimeZone>(tasks: &[Task], week_start: &DateTime<Tz>) -> Vec<DayCount> {
    let tz = week_start.timezone();
    let first = week_start.date_naive();
    let mut days: Vec<DayCount> = (0..7)
        .filter_map(|i| first.checked_add_days(chrono::Days::new(i)))
        .map(|date| DayCount { date, count: 0 })
        .collect();

    for task in visible(tasks) {
        let Some(day) = completion_day(task, &tz) else { continue };
        if let Some(slot) = days.iter_mut().find(|d| d.date == day) {
            slot.count += 1;
        }
    }
    days
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in visible(tasks) {
        stats.total += 1;
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::InProgress => {
                stats.in_progress += 1;
                stats.pending += 1;
            }
            TaskStatus::Todo => stats.pending += 1,
        }
    }
    stats
}

pub fn next_tasks_by_category(tasks: &[Task]) -> BTreeMap<String, Option<&Task>> {
    PET_CATEGORIES
        .iter()
        .map(|tag| (tag.to_string(), next_task_for_tag(tasks, tag)))
        .collect()
}

pub fn upcoming_by_category<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    now: &DateTime<Tz>,
    n: usize,
) -> BTreeMap<String, Vec<&'a Task>> {
    PET_CATEGORIES
        .iter()
        .map(|tag| (tag.to_string(), top_n_upcoming_for_tag(tasks, tag, now, n)))
        .collect()
}

/// Soft-deleted tasks, most recently deleted first.
pub fn trashed(tasks: &[Task]) -> Vec<&Task> {
    let mut deleted: Vec<&Task> = tasks.iter().filter(|t| t.is_deleted()).collect();
    deleted.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
    deleted
}

/// Short human label for a deadline relative to today.
pub fn due_label<Tz: TimeZone>(due_at: Option<&DateTime<Utc>>, now: &DateTime<Tz>) -> String {
    let Some(due) = due_at else {
        return "No due date".to_string();
    };
    let today = now.date_naive();
    let due_day = local_date(due, &now.timezone());
    let days = (due_day - today).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d if d > 1 => format!("In {} days", d),
        -1 => "Overdue by 1 day".to_string(),
        d => format!("Overdue by {} days", -d),
    }
}
