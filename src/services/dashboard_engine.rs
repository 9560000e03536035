use std::time::Duration;

use chrono::{DateTime, TimeZone};

use crate::error::ApiResult;
use crate::models::{DashboardOverview, Task};
use crate::services::api_client::GatewayClient;
use crate::services::task_aggregator as agg;
use crate::utils::time::week_window;

pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Assembles every dashboard view from one snapshot.
pub fn build_overview<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, upcoming_limit: usize) -> DashboardOverview {
    let window = week_window(now);
    let owned = |list: Vec<&Task>| list.into_iter().cloned().collect::<Vec<_>>();

    DashboardOverview {
        date_key: now.date_naive().format("%Y-%m-%d").to_string(),
        week_start: window.start.fixed_offset(),
        week_end: window.end.fixed_offset(),
        this_week: owned(agg::this_week_active(tasks, now)),
        next_by_category: agg::next_tasks_by_category(tasks)
            .into_iter()
            .map(|(tag, task)| (tag, task.cloned()))
            .collect(),
        upcoming_by_category: agg::upcoming_by_category(tasks, now, upcoming_limit)
            .into_iter()
            .map(|(tag, list)| (tag, owned(list)))
            .collect(),
        neglected: agg::neglected_by_category(tasks, now),
        completed_per_day: agg::completed_per_day(tasks, &window.start),
        stats: agg::task_stats(tasks),
        trash_count: agg::trashed(tasks).len(),
        updated_at: now.timestamp(),
    }
}

/// Keeps the most recent good overview; a failed refresh leaves it in place.
pub struct DashboardEngine<Tz: TimeZone> {
    client: GatewayClient,
    tz: Tz,
    upcoming_limit: usize,
    current: Option<DashboardOverview>,
}

impl<Tz: TimeZone> DashboardEngine<Tz> {
    pub fn new(client: GatewayClient, tz: Tz, upcoming_limit: usize) -> Self {
        Self {
            client,
            tz,
            upcoming_limit,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&DashboardOverview> {
        self.current.as_ref()
    }

    pub fn now(&self) -> DateTime<Tz> {
        chrono::Utc::now().with_timezone(&self.tz)
    }

    pub async fn refresh(&mut self) -> ApiResult<&DashboardOverview> {
        let tasks = match self.client.fetch_snapshot().await {
            Ok(tasks) => tasks,
            Err(e) => {
                if self.current.is_some() {
                    log::warn!("Dashboard refresh failed, keeping previous view: {}", e);
                } else {
                    log::error!("Dashboard refresh failed: {}", e);
                }
                return Err(e);
            }
        };
        let now = self.now();
        let overview = build_overview(&tasks, &now, self.upcoming_limit);
        log::info!(
            "Dashboard refreshed: {} tasks, {} due this week, {} neglected categories",
            overview.stats.total,
            overview.this_week.len(),
            overview.neglected.len()
        );
        let view: &DashboardOverview = self.current.insert(overview);
        Ok(view)
    }

    /// Refreshes every `interval` and hands each result to `on_update`
    /// until it returns `false` or the process receives ctrl-c.
    pub async fn run_polling<F>(&mut self, interval: Duration, mut on_update: F)
    where
        F: FnMut(ApiResult<&DashboardOverview>) -> bool,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = self.refresh().await;
                    if !on_update(result) {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Stopping dashboard polling");
                    break;
                }
            }
        }
    }
}
