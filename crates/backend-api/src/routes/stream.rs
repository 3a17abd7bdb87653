use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Query, State},
    response::sse::{Event, Sse},
};
use futures_util::{stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    time::{self, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};
use utoipa::IntoParams;
use voltchat_chats::ChatEvent;

use crate::{routes::servers::forbid_non_members, util::server_or_general, ApiError, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    pub server_id: Option<String>,
    /// Session token. `EventSource` cannot send an Authorization header.
    pub token: Option<String>,
}

struct StreamState {
    receiver: broadcast::Receiver<ChatEvent>,
    heartbeat: Interval,
    server_id: String,
    connected: bool,
    finished: bool,
}

impl StreamState {
    fn new(receiver: broadcast::Receiver<ChatEvent>, server_id: String, period: Duration) -> Self {
        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            receiver,
            heartbeat,
            server_id,
            connected: false,
            finished: false,
        }
    }
}

/// One `data:` payload on the stream.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum StreamFrame {
    Status {
        #[serde(rename = "type")]
        kind: &'static str,
    },
    Chat(ChatEvent),
}

#[utoipa::path(
    get,
    path = "/api/stream",
    tag = "Messages",
    params(StreamQuery),
    responses(
        (status = 200, description = "Server-Sent Events: connected, message, clear, deleted and heartbeat", content_type = "text/event-stream", body = String),
        (status = 401, description = "Missing or expired token", body = crate::error::ErrorResponse),
        (status = 403, description = "Private server the caller does not belong to", body = crate::error::ErrorResponse)
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("missing stream token"))?;
    let (user, _) = state.authenticate(token).await?;
    let server_id = server_or_general(query.server_id);

    state
        .chats()
        .can_read(&server_id, &user.email)
        .await
        .map_err(forbid_non_members)?;

    // Subscribe before answering so nothing posted after the handshake is missed.
    let receiver = state.chats().subscribe();
    let period = state.heartbeat_interval();

    info!(server_id = %server_id, username = %user.username, "stream connected");

    let initial = StreamState::new(receiver, server_id, period);

    Ok(Sse::new(
        stream::unfold(initial, next_frame).filter_map(|frame| async move {
            match Event::default().json_data(&frame) {
                Ok(event) => Some(Ok(event)),
                Err(error) => {
                    warn!(%error, "failed to encode stream event");
                    None
                }
            }
        }),
    ))
}

async fn next_frame(mut state: StreamState) -> Option<(StreamFrame, StreamState)> {
    if state.finished {
        return None;
    }
    if !state.connected {
        state.connected = true;
        return Some((StreamFrame::Status { kind: "connected" }, state));
    }

    loop {
        tokio::select! {
            _ = state.heartbeat.tick() => {
                return Some((StreamFrame::Status { kind: "heartbeat" }, state));
            }
            received = state.receiver.recv() => match received {
                Ok(event) if event.server_id() == state.server_id => {
                    if event.is_terminal() {
                        info!(server_id = %state.server_id, "server deleted, closing stream");
                        state.finished = true;
                    }
                    return Some((StreamFrame::Chat(event), state));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(server_id = %state.server_id, skipped, "stream receiver lagged");
                    continue;
                }
                Err(RecvError::Closed) => {
                    debug!(server_id = %state.server_id, "chat events closed, ending stream");
                    return None;
                }
            }
        }
    }
}
