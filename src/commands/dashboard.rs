use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use pixelpet::models::DashboardOverview;
use pixelpet::services::dashboard_engine::DashboardEngine;
use pixelpet::services::task_aggregator::due_label;

use super::{print_json, task_line, Context};

pub async fn show<Tz: TimeZone>(ctx: &Context, tz: Tz, watch: bool) -> Result<()> {
    let render_tz = tz.clone();
    let mut engine = DashboardEngine::new(
        ctx.client.clone(),
        tz,
        ctx.settings.dashboard.upcoming_limit,
    );

    if !watch {
        let overview = engine.refresh().await?;
        return render(ctx, overview, &Utc::now().with_timezone(&render_tz));
    }

    let interval = Duration::from_secs(ctx.settings.dashboard.poll_interval_secs.max(1));
    log::info!("Refreshing dashboard every {}s (ctrl-c to stop)", interval.as_secs());
    engine
        .run_polling(interval, |result| {
            match result {
                Ok(overview) => {
                    let now = Utc::now().with_timezone(&render_tz);
                    if let Err(e) = render(ctx, overview, &now) {
                        log::error!("Failed to render dashboard: {}", e);
                    }
                }
                // The previous render stays on screen.
                Err(e) => eprintln!("Refresh failed: {}", e),
            }
            true
        })
        .await;
    Ok(())
}

fn render<Tz: TimeZone>(ctx: &Context, overview: &DashboardOverview, now: &DateTime<Tz>) -> Result<()> {
    if ctx.json {
        return print_json(overview);
    }

    println!(
        "Week of {} .. {}",
        overview.week_start.format("%a %Y-%m-%d"),
        overview.week_end.format("%a %Y-%m-%d")
    );

    println!("\nDue this week ({}):", overview.this_week.len());
    if overview.this_week.is_empty() {
        println!("  nothing due this week");
    }
    for task in &overview.this_week {
        println!("  {}", task_line(task, &due_label(task.due_at.as_ref(), now)));
    }

    println!("\nNext up:");
    for (category, task) in &overview.next_by_category {
        match task {
            Some(task) => println!("  {:<9} {}", category, task_line(task, &due_label(task.due_at.as_ref(), now))),
            None => println!("  {:<9} -", category),
        }
    }

    println!("\nUpcoming:");
    for (category, tasks) in &overview.upcoming_by_category {
        let titles = tasks.iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        println!("  {:<9} {}", category, if titles.is_empty() { "-".to_string() } else { titles.join(" | ") });
    }

    println!("\nNeglected:");
    if overview.neglected.is_empty() {
        println!("  nothing overdue");
    }
    for group in &overview.neglected {
        println!(
            "  {}: {} task{} neglected, oldest {} day{} overdue",
            group.category,
            group.count,
            if group.count == 1 { "" } else { "s" },
            group.days_overdue,
            if group.days_overdue == 1 { "" } else { "s" }
        );
    }

    let per_day = overview
        .completed_per_day
        .iter()
        .map(|d| format!("{} {}", d.date.format("%a"), d.count))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("\nCompleted: {}", per_day);

    let stats = &overview.stats;
    println!(
        "Tasks: {} total, {} completed, {} in progress, {} pending, {} in trash",
        stats.total, stats.completed, stats.in_progress, stats.pending, overview.trash_count
    );
    Ok(())
}
