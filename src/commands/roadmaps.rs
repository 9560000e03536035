use anyhow::Result;

use pixelpet::models::Roadmap;

use super::{print_json, Context};

pub async fn list(ctx: &Context) -> Result<()> {
    let roadmaps = ctx.client.list_roadmaps().await?;
    if ctx.json {
        return print_json(&roadmaps);
    }
    if roadmaps.is_empty() {
        println!("No roadmaps yet.");
        return Ok(());
    }
    for roadmap in roadmaps.iter().filter(|r| r.deleted_at.is_none()) {
        println!("{}", roadmap_line(roadmap));
    }
    Ok(())
}

fn roadmap_line(roadmap: &Roadmap) -> String {
    format!(
        "#{} {} - {:.0}% ({}/{} tasks){}",
        roadmap.id,
        roadmap.title,
        roadmap.progress(),
        roadmap.completed_tasks,
        roadmap.total_tasks,
        if roadmap.is_completed() { " completed" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_printed_as_sent() {
        let roadmap: Roadmap = serde_json::from_str(
            r#"{"id": 2, "title": "Grooming", "total_tasks": 8, "completed_tasks": 3, "progress_percentage": 37.0}"#,
        )
        .unwrap();
        assert_eq!(roadmap_line(&roadmap), "#2 Grooming - 37% (3/8 tasks)");
    }
}
