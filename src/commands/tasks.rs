use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, TimeZone, Utc};

use pixelpet::models::{normalize_tag, NewTask, Priority, Task, TaskPatch, TaskQuery, TaskStatus};
use pixelpet::services::task_aggregator::{due_label, trashed};
use pixelpet::utils::time::parse_timestamp;

use super::{print_json, task_line, Context};

pub struct ListOptions {
    pub status: Option<String>,
    pub tag: Option<String>,
    pub trash: bool,
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub points: u32,
}

#[derive(Default)]
pub struct EditOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tag: Option<String>,
    pub due: Option<String>,
    pub points: Option<u32>,
}

impl EditOptions {
    fn into_patch(self) -> Result<TaskPatch> {
        let title = match self.title.map(|t| t.trim().to_string()) {
            Some(t) if t.is_empty() => bail!("title cannot be empty"),
            other => other,
        };
        Ok(TaskPatch {
            title,
            description: self.description,
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            status: self.status.as_deref().map(parse_status).transpose()?,
            due_at: self.due.as_deref().map(parse_due).transpose()?,
            tags: self
                .tag
                .as_deref()
                .map(|t| Some(normalize_tag(t)).filter(|t| !t.is_empty()).into_iter().collect()),
            points: self.points,
        })
    }
}

fn patch_is_empty(patch: &TaskPatch) -> bool {
    patch.title.is_none()
        && patch.description.is_none()
        && patch.priority.is_none()
        && patch.status.is_none()
        && patch.due_at.is_none()
        && patch.tags.is_none()
        && patch.points.is_none()
}

fn parse_status(raw: &str) -> Result<TaskStatus> {
    TaskStatus::normalize(raw)
        .with_context(|| format!("unknown status `{}` (todo|in_progress|completed)", raw))
}

fn parse_priority(raw: &str) -> Result<Priority> {
    Priority::normalize(raw).with_context(|| format!("invalid priority `{}` (low|medium|high)", raw))
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).with_context(|| format!("invalid due date `{}`", raw))
}

/// The trash view is served by the task service, not filtered locally.
fn list_query(opts: &ListOptions) -> Result<TaskQuery> {
    Ok(TaskQuery {
        status: opts.status.as_deref().map(parse_status).transpose()?,
        tag: opts.tag.as_deref().map(normalize_tag),
        sort: Some("due_at".to_string()),
        only_deleted: opts.trash,
        ..Default::default()
    })
}

pub async fn list<Tz: TimeZone>(ctx: &Context, tz: Tz, opts: ListOptions) -> Result<()> {
    let page = ctx.client.list_tasks(&list_query(&opts)?).await?;
    let tasks: Vec<Task> = if opts.trash {
        trashed(&page.items).into_iter().cloned().collect()
    } else {
        page.items
    };

    if ctx.json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    let now = Utc::now().with_timezone(&tz);
    for task in &tasks {
        println!("{}", task_line(task, &due_label(task.due_at.as_ref(), &now)));
    }
    Ok(())
}

pub async fn add(ctx: &Context, opts: AddOptions) -> Result<()> {
    let title = opts.title.trim().to_string();
    if title.is_empty() {
        bail!("title is required");
    }
    let priority = opts.priority.as_deref().map(parse_priority).transpose()?.unwrap_or_default();
    let due_at = opts.due.as_deref().map(parse_due).transpose()?;
    let tags = opts
        .tag
        .as_deref()
        .map(normalize_tag)
        .filter(|t| !t.is_empty())
        .into_iter()
        .collect();

    let created = ctx
        .client
        .create_task(&NewTask {
            title,
            description: opts.description,
            priority,
            due_at,
            tags,
            points: opts.points,
        })
        .await?;
    log::info!("Created task #{}", created.id);
    report(ctx, &created, "Created")
}

pub async fn show<Tz: TimeZone>(ctx: &Context, tz: Tz, id: i64) -> Result<()> {
    let task = ctx.client.get_task(id).await?;
    if ctx.json {
        return print_json(&task);
    }
    let now = Utc::now().with_timezone(&tz);
    println!("{}", task_line(&task, &due_label(task.due_at.as_ref(), &now)));
    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        println!("  {}", description);
    }
    println!("  points: {}", task.points);
    if let Some(every) = &task.repeat_every {
        println!("  repeats every {}", every);
    }
    Ok(())
}

pub async fn edit(ctx: &Context, id: i64, opts: EditOptions) -> Result<()> {
    let patch = opts.into_patch()?;
    if patch_is_empty(&patch) {
        bail!("nothing to change; pass at least one field");
    }
    let task = ctx.client.update_task(id, &patch).await?;
    report(ctx, &task, "Updated")
}

pub async fn tags(ctx: &Context) -> Result<()> {
    let tags = ctx.client.list_tags().await?;
    if ctx.json {
        return print_json(&tags);
    }
    if tags.is_empty() {
        println!("No tags yet.");
    }
    for tag in &tags {
        println!("{}", tag);
    }
    Ok(())
}

pub async fn start(ctx: &Context, id: i64) -> Result<()> {
    let task = ctx.client.start_task(id).await?;
    report(ctx, &task, "Started")
}

pub async fn complete(ctx: &Context, id: i64) -> Result<()> {
    let task = ctx.client.complete_task(id).await?;
    if task.points > 0 {
        println!("+{} points for your pet", task.points);
    }
    report(ctx, &task, "Completed")
}

pub async fn delete(ctx: &Context, id: i64) -> Result<()> {
    ctx.client.delete_task(id).await?;
    println!("Moved task #{} to trash", id);
    Ok(())
}

pub async fn restore(ctx: &Context, id: i64) -> Result<()> {
    let task = ctx.client.restore_task(id).await?;
    report(ctx, &task, "Restored")
}

fn report(ctx: &Context, task: &Task, verb: &str) -> Result<()> {
    if ctx.json {
        return print_json(task);
    }
    println!("{} #{}: {}", verb, task.id, task.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trash_listing_asks_for_deleted_tasks_only() {
        let opts = ListOptions {
            status: None,
            tag: Some("Feeding".into()),
            trash: true,
        };
        let query = list_query(&opts).unwrap();
        assert!(query.only_deleted);
        let pairs = pixelpet::services::api_client::task_query_pairs(&query);
        assert!(pairs.contains(&("only_deleted", "true".to_string())));
        assert!(pairs.contains(&("tag", "feeding".to_string())));

        let live = list_query(&ListOptions { trash: false, ..opts }).unwrap();
        assert!(!live.only_deleted);
    }

    #[test]
    fn edit_options_build_a_sparse_patch() {
        let opts = EditOptions {
            status: Some("done".into()),
            tag: Some(" Cleaning ".into()),
            due: Some("2026-10-30".into()),
            ..Default::default()
        };
        let patch = opts.into_patch().unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert_eq!(patch.tags, Some(vec!["cleaning".to_string()]));
        assert!(patch.due_at.is_some());
        assert!(patch.title.is_none());
        assert!(!patch_is_empty(&patch));
    }

    #[test]
    fn edit_options_reject_bad_values() {
        let bad_status = EditOptions {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(bad_status.into_patch().is_err());

        let blank_title = EditOptions {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(blank_title.into_patch().is_err());

        assert!(patch_is_empty(&EditOptions::default().into_patch().unwrap()));
    }
}
