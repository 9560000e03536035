use futures_util::StreamExt;
use reqwest_eventsource::{Error as SourceError, Event};

use crate::error::{ApiError, ApiResult};
use crate::models::{ChangeEvent, Notification};
use crate::services::api_client::{error_message, GatewayClient};

/// Decodes one event payload; malformed payloads are logged and dropped.
pub fn parse_event(payload: &str) -> Option<ChangeEvent> {
    match serde_json::from_str::<ChangeEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            log::warn!("Failed to parse event payload: {}", e);
            None
        }
    }
}

/// Hands one message to `handler`. Returns `false` once the handler is done.
fn dispatch<F>(payload: &str, handler: &mut F) -> bool
where
    F: FnMut(ChangeEvent, Notification) -> bool,
{
    if payload.trim().is_empty() {
        return true;
    }
    match parse_event(payload) {
        Some(event) => {
            let notification = Notification::from_event(&event);
            handler(event, notification)
        }
        None => true,
    }
}

async fn stream_error(url: &str, error: SourceError) -> ApiError {
    match error {
        SourceError::Transport(source) => ApiError::Network {
            url: url.to_string(),
            source,
        },
        SourceError::InvalidStatusCode(status, response) => {
            let text = response.text().await.unwrap_or_default();
            ApiError::Status {
                url: url.to_string(),
                status,
                message: error_message(&text, status),
            }
        }
        other => ApiError::EventStream {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

/// Streams gateway change events into `handler` until the connection drops
/// or `handler` returns `false`. No automatic reconnect.
pub async fn subscribe<F>(client: &GatewayClient, mut handler: F) -> ApiResult<()>
where
    F: FnMut(ChangeEvent, Notification) -> bool,
{
    let url = client.events_url();
    let mut source = client.open_event_stream()?;

    let result = loop {
        let Some(next) = source.next().await else {
            break Ok(());
        };
        match next {
            Ok(Event::Open) => log::info!("Connected to event stream at {}", url),
            Ok(Event::Message(message)) => {
                if !dispatch(&message.data, &mut handler) {
                    log::info!("Event stream closed by handler");
                    break Ok(());
                }
            }
            Err(SourceError::StreamEnded) => {
                log::info!("Event stream ended");
                break Ok(());
            }
            Err(e) => break Err(stream_error(&url, e).await),
        }
    };
    source.close();
    result
}
