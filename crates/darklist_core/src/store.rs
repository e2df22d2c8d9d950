//! Event-driven application store.
//!
//! # Responsibility
//! - Compose the form controller and the list reconciler into one state
//!   machine driven by discrete UI and network events.
//! - Return externally observable side effects instead of performing them;
//!   the embedding layer (FFI, remote session, CLI) executes effects.
//!
//! # Invariants
//! - Transitions are pure and synchronous: one event in, state mutated, zero
//!   or more effects out. Nothing here blocks or spawns.
//! - Completion events (`ListLoaded`, `CreateConfirmed`, `PushReceived`, ...)
//!   are applied in arrival order; the optimistic-vs-confirmed race is
//!   resolved by id comparison alone, so either order converges.
//! - `EntryTapped` never mutates state.
//!
//! # See also
//! - `form` and `list` for the per-component contracts.
//! - `remote::session` for the layer that turns effects into network calls.

use crate::form::{CreateRequest, FormController};
use crate::list::{FetchPhase, ListReconciler, ListView};
use crate::model::entry::{Entry, EntryId};

/// Banner shown after the create mutation is rejected; the provisional row
/// stays until the next authoritative load supersedes it.
pub const CREATE_FAILED_BANNER: &str = "Could not save the app";
/// Banner shown once when the live-update feed drops; list rendering is
/// unaffected.
pub const SUBSCRIPTION_FAILED_BANNER: &str = "Live updates are unavailable";
/// Banner shown when a refresh fails after the list is already showing rows.
pub const REFRESH_FAILED_BANNER: &str = "Could not refresh the list";

/// Which variant the store runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Purely in-memory: submits become final entries for the session.
    Local,
    /// Backed by the managed GraphQL API: submits are optimistic, reconciled
    /// against the mutation ack or a subscription echo.
    Remote,
}

/// One discrete input to the store, from the user or a network callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    NameChanged(String),
    LinkChanged(String),
    SubmitPressed,
    /// Authoritative list fetch resolved.
    ListLoaded(Vec<Entry>),
    /// Authoritative list fetch rejected.
    ListFailed(String),
    /// The create mutation acknowledged an entry (ours, echoed back).
    CreateConfirmed(Entry),
    /// The create mutation was rejected for the given provisional id.
    CreateFailed { id: EntryId, message: String },
    /// The subscription feed delivered a creation event (any client).
    PushReceived(Entry),
    /// The subscription feed failed; delivered at most once per feed.
    SubscriptionFailed(String),
    /// A subscription feed connected; live updates flow again.
    SubscriptionRestored,
    /// The user tapped the row at this index.
    EntryTapped(usize),
}

/// Side effect requested by a transition, executed by the embedding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the create mutation for this request (networked variant only).
    SendCreate(CreateRequest),
    /// Hand this URL to the platform opener.
    OpenLink(String),
    /// Return input focus to the name field.
    FocusNameField,
}

/// Form + list + banner, advanced one event at a time.
#[derive(Debug)]
pub struct AppStore {
    mode: StoreMode,
    form: FormController,
    list: ListReconciler,
    banner: Option<&'static str>,
}

impl AppStore {
    pub fn new(mode: StoreMode) -> Self {
        let list = match mode {
            StoreMode::Local => ListReconciler::new_ready(),
            StoreMode::Remote => ListReconciler::new_loading(),
        };
        Self {
            mode,
            form: FormController::new(),
            list,
            banner: None,
        }
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn list(&self) -> &ListReconciler {
        &self.list
    }

    /// Current inline banner, if any.
    pub fn banner(&self) -> Option<&'static str> {
        self.banner
    }

    pub fn view(&self) -> ListView<'_> {
        self.list.view()
    }

    /// Applies one event and returns the effects it requests.
    pub fn apply(&mut self, event: UiEvent) -> Vec<Effect> {
        match event {
            UiEvent::NameChanged(value) => {
                self.form.set_name(value);
                Vec::new()
            }
            UiEvent::LinkChanged(value) => {
                self.form.set_link(value);
                Vec::new()
            }
            UiEvent::SubmitPressed => self.on_submit(),
            UiEvent::ListLoaded(entries) => {
                self.list.load(entries);
                // A successful load supersedes a stale refresh-failure banner;
                // the create and subscription banners report conditions a load
                // does not fix.
                if self.banner == Some(REFRESH_FAILED_BANNER) {
                    self.banner = None;
                }
                Vec::new()
            }
            UiEvent::ListFailed(message) => {
                if self.list.phase() == &FetchPhase::Ready {
                    // Why: a failed refresh must not replace rows the user
                    // already sees with an error placeholder.
                    self.banner = Some(REFRESH_FAILED_BANNER);
                } else {
                    self.list.fail(message);
                }
                Vec::new()
            }
            UiEvent::CreateConfirmed(entry) | UiEvent::PushReceived(entry) => {
                self.list.apply_confirmed(entry);
                Vec::new()
            }
            UiEvent::CreateFailed { .. } => {
                self.banner = Some(CREATE_FAILED_BANNER);
                Vec::new()
            }
            UiEvent::SubscriptionFailed(_) => {
                self.banner = Some(SUBSCRIPTION_FAILED_BANNER);
                Vec::new()
            }
            UiEvent::SubscriptionRestored => {
                if self.banner == Some(SUBSCRIPTION_FAILED_BANNER) {
                    self.banner = None;
                }
                Vec::new()
            }
            UiEvent::EntryTapped(index) => self
                .list
                .link_at(index)
                .map(|link| vec![Effect::OpenLink(link.to_owned())])
                .unwrap_or_default(),
        }
    }

    fn on_submit(&mut self) -> Vec<Effect> {
        let Some(request) = self.form.submit() else {
            return Vec::new();
        };
        // Each banner clears when its own condition is retried: a new submit
        // supersedes the last create failure but fixes neither a dead feed
        // nor a failed refresh.
        if self.banner == Some(CREATE_FAILED_BANNER) {
            self.banner = None;
        }
        match self.mode {
            StoreMode::Local => {
                // No backend to confirm against: the submitted entry is final
                // for the session, carried under its canonical id.
                if let Ok(entry) = Entry::with_id(
                    EntryId::confirmed(request.id.canonical()),
                    request.name,
                    request.link,
                ) {
                    self.list.apply_confirmed(entry);
                }
                vec![Effect::FocusNameField]
            }
            StoreMode::Remote => {
                let mut effects = Vec::with_capacity(2);
                if let Ok(entry) =
                    Entry::with_id(request.id.clone(), &request.name, &request.link)
                {
                    self.list.append_provisional(entry);
                    effects.push(Effect::SendCreate(request));
                }
                effects.push(Effect::FocusNameField);
                effects
            }
        }
    }
}
