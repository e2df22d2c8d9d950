//! Core front-end logic for the dark-mode app list.
//! This crate is the single source of truth for form, list, and sync
//! invariants; platform UIs bind to it and stay logic-free.

pub mod form;
pub mod list;
pub mod logging;
pub mod model;
pub mod remote;
pub mod store;

pub use form::{CreateRequest, FormController, LINK_ERROR_MESSAGE, NAME_ERROR_MESSAGE};
pub use list::{ConfirmOutcome, FetchPhase, ListReconciler, ListView};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryId, EntryValidationError};
pub use remote::client::GraphqlClient;
pub use remote::config::{install as install_api_config, installed as api_config, ApiAuth, ApiConfig};
pub use remote::session::RemoteSession;
pub use remote::subscription::{SubscriptionEvent, SubscriptionFeed};
pub use remote::{RemoteError, RemoteResult};
pub use store::{AppStore, Effect, StoreMode, UiEvent};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
