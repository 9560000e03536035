use anyhow::Result;

use pixelpet::services::event_stream::subscribe;

use super::Context;

pub async fn follow(ctx: &Context) -> Result<()> {
    let prefs = &ctx.settings.notifications;
    if !prefs.enabled {
        println!("Notifications are disabled in settings.");
        return Ok(());
    }

    let json = ctx.json;
    subscribe(&ctx.client, |event, notification| {
        let muted = serde_json::to_value(&event.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .is_some_and(|kind| prefs.muted_events.iter().any(|m| m == &kind));
        if muted {
            log::debug!("Muted event {:?}", event.kind);
            return true;
        }
        if json {
            match serde_json::to_string(&notification) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to encode notification: {}", e),
            }
        } else {
            println!(
                "[{}] {}: {}",
                notification.timestamp.as_deref().unwrap_or("-"),
                notification.label,
                notification.message
            );
        }
        true
    })
    .await?;
    Ok(())
}
