pub mod dashboard;
pub mod events;
pub mod pet;
pub mod profile;
pub mod roadmaps;
pub mod tasks;

use anyhow::Result;
use serde::Serialize;

use pixelpet::models::{Settings, Task};
use pixelpet::services::api_client::GatewayClient;

/// What every command gets handed by `main`.
pub struct Context {
    pub settings: Settings,
    pub client: GatewayClient,
    pub json: bool,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn task_line(task: &Task, due: &str) -> String {
    let mut line = format!("#{} {} [{}] ({})", task.id, task.title, task.priority.as_str(), due);
    if !task.tags.is_empty() {
        line.push_str(&format!(" {}", task.tags.join(", ")));
    }
    if task.status != pixelpet::models::TaskStatus::Todo {
        line.push_str(&format!(" <{}>", task.status.as_str()));
    }
    line
}
