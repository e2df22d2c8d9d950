//! WebSocket feed of creation events.
//!
//! # Responsibility
//! - Open the realtime socket, run the handshake, and subscribe to the
//!   creation stream.
//! - Forward each decoded entry as one event on an in-process channel.
//!
//! # Invariants
//! - The feed fails at most once: the first protocol or transport failure is
//!   forwarded and the read task ends. No reconnection here.
//! - Server `ping` frames are answered with `pong`; unknown message types are
//!   ignored for forward compatibility.
//!
//! # See also
//! - `wire` for the subscription document and payload shape.

use crate::model::entry::Entry;
use crate::remote::config::ApiConfig;
use crate::remote::wire::{GraphqlResponse, OnCreateAppData, ON_CREATE_APP_SUBSCRIPTION};
use crate::remote::{RemoteError, RemoteResult};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

const ACK_TIMEOUT: Duration = Duration::from_secs(10);
const SUBSCRIPTION_ID: &str = "1";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Messages this client sends over the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
    },
    Subscribe {
        id: String,
        payload: SubscribePayload,
    },
    Pong,
}

/// Operation payload of a `subscribe` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribePayload {
    pub query: String,
}

/// Messages the realtime endpoint sends back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck,
    Next {
        #[serde(default)]
        id: Option<String>,
        payload: serde_json::Value,
    },
    Error {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        payload: Option<serde_json::Value>,
    },
    Complete {
        #[serde(default)]
        id: Option<String>,
    },
    Ping,
    /// Any message type this client does not know.
    #[serde(other)]
    Unknown,
}

/// One event out of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// A creation event, decoded and field-validated.
    Push(Entry),
    /// The feed failed; delivered at most once, the feed is dead after.
    Failed(String),
    /// The server completed the stream or closed the socket.
    Closed,
}

/// Live subscription handle; dropping it ends the read task.
pub struct SubscriptionFeed {
    events: mpsc::UnboundedReceiver<SubscriptionEvent>,
    task: JoinHandle<()>,
}

impl SubscriptionFeed {
    /// Connects, performs the `connection_init`/`connection_ack` handshake,
    /// subscribes to the creation stream, and spawns the read task.
    pub async fn connect(config: &ApiConfig) -> RemoteResult<Self> {
        info!("event=subscription module=remote_subscription status=start");
        let (mut socket, _response) = match connect_async(config.realtime_endpoint.as_str()).await {
            Ok(connected) => connected,
            Err(err) => {
                error!("event=subscription module=remote_subscription status=error phase=connect error={err}");
                return Err(RemoteError::Socket(err));
            }
        };

        let init = ClientMessage::ConnectionInit {
            payload: Some(json!({ "x-api-key": config.api_key() })),
        };
        send_client_message(&mut socket, &init).await?;
        if let Err(err) = await_ack(&mut socket).await {
            error!(
                "event=subscription module=remote_subscription status=error phase=handshake error={err}"
            );
            return Err(err);
        }

        let subscribe = ClientMessage::Subscribe {
            id: SUBSCRIPTION_ID.to_string(),
            payload: SubscribePayload {
                query: ON_CREATE_APP_SUBSCRIPTION.to_string(),
            },
        };
        send_client_message(&mut socket, &subscribe).await?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (write, read) = socket.split();
        let task = tokio::spawn(pump(read, write, events_tx));
        info!("event=subscription module=remote_subscription status=ok");
        Ok(Self {
            events: events_rx,
            task,
        })
    }

    /// Next feed event; `None` once the read task is gone and the channel is
    /// drained.
    pub async fn next_event(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }
}

impl Drop for SubscriptionFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn send_client_message(socket: &mut WsStream, message: &ClientMessage) -> RemoteResult<()> {
    let text = serde_json::to_string(message)?;
    socket.send(Message::Text(text)).await?;
    Ok(())
}

/// Reads until `connection_ack`, answering pings and skipping unknown
/// messages. Anything else before the ack is a protocol violation.
async fn await_ack(socket: &mut WsStream) -> RemoteResult<()> {
    let deadline = tokio::time::timeout(ACK_TIMEOUT, async {
        loop {
            let frame = match socket.next().await {
                Some(frame) => frame?,
                None => {
                    return Err(RemoteError::Protocol(
                        "socket closed before connection_ack".to_string(),
                    ))
                }
            };
            let Message::Text(text) = frame else {
                continue;
            };
            match serde_json::from_str::<ServerMessage>(&text)? {
                ServerMessage::ConnectionAck => return Ok(()),
                ServerMessage::Ping => {
                    send_client_message(socket, &ClientMessage::Pong).await?;
                }
                ServerMessage::Unknown => {}
                other => {
                    return Err(RemoteError::Protocol(format!(
                        "expected connection_ack, got {other:?}"
                    )))
                }
            }
        }
    });
    deadline
        .await
        .map_err(|_| RemoteError::Protocol("timed out waiting for connection_ack".to_string()))?
}

/// Socket read loop; forwards events until the stream errors, completes, or
/// the feed handle is dropped.
async fn pump(
    mut read: SplitStream<WsStream>,
    mut write: SplitSink<WsStream, Message>,
    events: mpsc::UnboundedSender<SubscriptionEvent>,
) {
    while let Some(frame) = read.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                error!("event=subscription module=remote_subscription status=error phase=read error={err}");
                let _ = events.send(SubscriptionEvent::Failed(err.to_string()));
                return;
            }
        };
        match frame {
            Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::Next { payload, .. }) => match decode_push(payload) {
                    Ok(Some(entry)) => {
                        info!(
                            "event=subscription_push module=remote_subscription status=ok id={}",
                            entry.id
                        );
                        let _ = events.send(SubscriptionEvent::Push(entry));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        error!("event=subscription module=remote_subscription status=error phase=decode error={err}");
                        let _ = events.send(SubscriptionEvent::Failed(err.to_string()));
                        return;
                    }
                },
                Ok(ServerMessage::Error { payload, .. }) => {
                    let message = error_message(payload.as_ref());
                    error!("event=subscription module=remote_subscription status=error phase=stream error={message}");
                    let _ = events.send(SubscriptionEvent::Failed(message));
                    return;
                }
                Ok(ServerMessage::Complete { .. }) => {
                    info!("event=subscription module=remote_subscription status=ok phase=complete");
                    let _ = events.send(SubscriptionEvent::Closed);
                    return;
                }
                Ok(ServerMessage::Ping) => {
                    let pong = match serde_json::to_string(&ClientMessage::Pong) {
                        Ok(text) => text,
                        Err(_) => continue,
                    };
                    if write.send(Message::Text(pong)).await.is_err() {
                        let _ = events.send(SubscriptionEvent::Failed(
                            "socket write failed while answering ping".to_string(),
                        ));
                        return;
                    }
                }
                Ok(ServerMessage::ConnectionAck) | Ok(ServerMessage::Unknown) => {}
                Err(err) => {
                    error!("event=subscription module=remote_subscription status=error phase=parse error={err}");
                    let _ = events.send(SubscriptionEvent::Failed(err.to_string()));
                    return;
                }
            },
            Message::Close(_) => {
                info!("event=subscription module=remote_subscription status=ok phase=closed");
                let _ = events.send(SubscriptionEvent::Closed);
                return;
            }
            _ => {}
        }
    }
    let _ = events.send(SubscriptionEvent::Closed);
}

/// Decodes one `next` payload. Field-invalid records are skipped the same way
/// the list fetch skips them; an undecodable payload is a protocol failure.
fn decode_push(payload: serde_json::Value) -> RemoteResult<Option<Entry>> {
    let response: GraphqlResponse<OnCreateAppData> = serde_json::from_value(payload)?;
    let data = response.into_data()?;
    match data.on_create_app.into_entry() {
        Ok(entry) => Ok(Some(entry)),
        Err(err) => {
            warn!(
                "event=subscription_push module=remote_subscription status=error error_code=invalid_record error={err}"
            );
            Ok(None)
        }
    }
}

fn error_message(payload: Option<&serde_json::Value>) -> String {
    let Some(payload) = payload else {
        return "subscription error without payload".to_string();
    };
    let first_message = match payload {
        serde_json::Value::Array(items) => items.first().and_then(|item| item.get("message")),
        other => other.get("message"),
    };
    match first_message.and_then(|message| message.as_str()) {
        Some(message) => message.to_string(),
        None => payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, ClientMessage, ServerMessage, SubscribePayload};
    use serde_json::json;

    #[test]
    fn client_messages_use_snake_case_type_tags() {
        let init = ClientMessage::ConnectionInit { payload: None };
        let encoded = serde_json::to_value(&init).expect("message should serialize");
        assert_eq!(encoded, json!({ "type": "connection_init" }));

        let subscribe = ClientMessage::Subscribe {
            id: "1".to_string(),
            payload: SubscribePayload {
                query: "subscription onCreateApp { onCreateApp { id } }".to_string(),
            },
        };
        let encoded = serde_json::to_value(&subscribe).expect("message should serialize");
        assert_eq!(encoded["type"], "subscribe");
        assert_eq!(encoded["id"], "1");
        assert!(encoded["payload"]["query"]
            .as_str()
            .expect("query should be a string")
            .starts_with("subscription onCreateApp"));
    }

    #[test]
    fn unknown_server_message_types_are_tolerated() {
        let message: ServerMessage =
            serde_json::from_value(json!({ "type": "keepalive", "extra": 1 }))
                .expect("unknown type should decode");
        assert!(matches!(message, ServerMessage::Unknown));
    }

    #[test]
    fn error_message_reads_first_graphql_error() {
        let payload = json!([{ "message": "unauthorized" }, { "message": "second" }]);
        assert_eq!(error_message(Some(&payload)), "unauthorized");

        let object = json!({ "message": "single" });
        assert_eq!(error_message(Some(&object)), "single");

        assert_eq!(
            error_message(None),
            "subscription error without payload"
        );
    }
}
