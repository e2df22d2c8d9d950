//! Networked-variant session driver.
//!
//! # Responsibility
//! - Own the store, the HTTP client, and the subscription feed for one
//!   remote session.
//! - Execute `SendCreate` effects against the API and feed every network
//!   completion back into the store as an event, in arrival order.
//!
//! # Invariants
//! - Every remote outcome, success or failure, lands in the store; callers
//!   observe results through store state, not through return values.
//! - Effects the platform must perform (`OpenLink`, `FocusNameField`) pass
//!   through untouched; `SendCreate` never leaks out of this layer.

use crate::remote::client::GraphqlClient;
use crate::remote::config::ApiConfig;
use crate::remote::subscription::{SubscriptionEvent, SubscriptionFeed};
use crate::remote::RemoteResult;
use crate::store::{AppStore, Effect, StoreMode, UiEvent};

/// One remote session: store plus its network collaborators.
pub struct RemoteSession {
    store: AppStore,
    client: GraphqlClient,
    feed: Option<SubscriptionFeed>,
}

impl RemoteSession {
    pub fn new(config: &ApiConfig) -> RemoteResult<Self> {
        Ok(Self {
            store: AppStore::new(StoreMode::Remote),
            client: GraphqlClient::new(config)?,
            feed: None,
        })
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Opens the creation feed; a failed connect surfaces as the
    /// subscription banner instead of an error return, and a successful
    /// one retracts that banner.
    pub async fn connect_feed(&mut self, config: &ApiConfig) {
        match SubscriptionFeed::connect(config).await {
            Ok(feed) => {
                self.feed = Some(feed);
                self.store.apply(UiEvent::SubscriptionRestored);
            }
            Err(err) => {
                self.store
                    .apply(UiEvent::SubscriptionFailed(err.to_string()));
            }
        }
    }

    /// Runs the authoritative list fetch once and applies the outcome.
    pub async fn refresh(&mut self) {
        match self.client.list_apps().await {
            Ok(entries) => {
                self.store.apply(UiEvent::ListLoaded(entries));
            }
            Err(err) => {
                self.store.apply(UiEvent::ListFailed(err.to_string()));
            }
        }
    }

    /// Applies one UI event, executing any `SendCreate` effect it produces.
    ///
    /// Returns the effects the platform layer still has to perform.
    pub async fn apply_ui(&mut self, event: UiEvent) -> Vec<Effect> {
        let effects = self.store.apply(event);
        let mut remaining = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::SendCreate(request) => {
                    match self.client.create_app(&request).await {
                        Ok(entry) => {
                            self.store.apply(UiEvent::CreateConfirmed(entry));
                        }
                        Err(err) => {
                            self.store.apply(UiEvent::CreateFailed {
                                id: request.id,
                                message: err.to_string(),
                            });
                        }
                    }
                }
                other => remaining.push(other),
            }
        }
        remaining
    }

    /// Waits for the next feed event and applies it.
    ///
    /// Returns whether the feed may still yield more events; `false` once the
    /// feed failed, completed, or was never connected.
    pub async fn pump_push(&mut self) -> bool {
        let Some(feed) = self.feed.as_mut() else {
            return false;
        };
        match feed.next_event().await {
            Some(SubscriptionEvent::Push(entry)) => {
                self.store.apply(UiEvent::PushReceived(entry));
                true
            }
            Some(SubscriptionEvent::Failed(message)) => {
                self.store.apply(UiEvent::SubscriptionFailed(message));
                self.feed = None;
                false
            }
            Some(SubscriptionEvent::Closed) | None => {
                self.feed = None;
                false
            }
        }
    }
}
