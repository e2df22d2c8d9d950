//! Networked-variant glue for the managed GraphQL API.
//!
//! # Responsibility
//! - Hold process-wide API configuration (`config`).
//! - Encode/decode the three wire operations (`wire`).
//! - Execute the query/mutation over HTTP (`client`) and the creation feed
//!   over WebSocket (`subscription`).
//! - Drive the store from network completions (`session`).
//!
//! # Invariants
//! - No retry, backoff, reconnection, or offline queueing anywhere in this
//!   layer; refetch policy belongs to the embedding client.
//! - Failures convert to store events (`ListFailed`, `CreateFailed`,
//!   `SubscriptionFailed`) at the session boundary; nothing here panics.
//!
//! # See also
//! - `store` for the event vocabulary this layer feeds.

pub mod client;
pub mod config;
pub mod session;
pub mod subscription;
pub mod wire;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure taxonomy for the remote layer.
#[derive(Debug)]
pub enum RemoteError {
    /// Remote calls attempted without (or against rejected) configuration.
    Config(&'static str),
    /// HTTP transport failure before any response arrived.
    Transport(reqwest::Error),
    /// Endpoint answered outside the 2xx range.
    Status { status: u16, message: String },
    /// Well-formed GraphQL envelope carrying an error payload.
    Graphql(String),
    /// Response body did not match the expected wire shape.
    Wire(String),
    /// WebSocket transport failure.
    Socket(tokio_tungstenite::tungstenite::Error),
    /// The realtime endpoint broke the subscription protocol.
    Protocol(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(details) => write!(f, "remote configuration error: {details}"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Status { status, message } => {
                write!(f, "endpoint returned status {status}: {message}")
            }
            Self::Graphql(message) => write!(f, "graphql error: {message}"),
            Self::Wire(details) => write!(f, "malformed response: {details}"),
            Self::Socket(err) => write!(f, "socket error: {err}"),
            Self::Protocol(details) => write!(f, "subscription protocol error: {details}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Socket(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RemoteError {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Socket(value)
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(value: serde_json::Error) -> Self {
        Self::Wire(value.to_string())
    }
}

/// Result alias used across the remote layer.
pub type RemoteResult<T> = Result<T, RemoteError>;
