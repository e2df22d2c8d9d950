//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Hold the process-wide store and subscription feed behind separate locks
//!   so a blocked feed wait never stalls form edits.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store mode is selected once per process; re-init with another mode is
//!   rejected.
//! - Network-bound calls block the calling thread; Dart invokes them from a
//!   background isolate.

use darklist_core::{
    api_config, core_version as core_version_inner, init_logging as init_logging_inner,
    install_api_config, ping as ping_inner, ApiConfig, AppStore, Effect, FetchPhase,
    RemoteSession, StoreMode, SubscriptionEvent, SubscriptionFeed, UiEvent,
};
use log::info;
use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};
use tokio::runtime::Runtime;

static APP: Mutex<Option<FfiApp>> = Mutex::new(None);
static FEED: Mutex<Option<SubscriptionFeed>> = Mutex::new(None);
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

enum FfiApp {
    Local(AppStore),
    Remote(RemoteSession),
}

impl FfiApp {
    fn mode(&self) -> StoreMode {
        match self {
            Self::Local(_) => StoreMode::Local,
            Self::Remote(_) => StoreMode::Remote,
        }
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - UI-thread safe for current implementation.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - UI-thread safe for current implementation.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for command-style calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Form field snapshot returned after every edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub name: String,
    pub link: String,
    /// Inline error under the name field, if it is currently empty.
    pub name_error: Option<String>,
    /// Inline error under the link field, if it is currently empty.
    pub link_error: Option<String>,
    pub submittable: bool,
}

/// Submit outcome envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    /// Whether a create-request was emitted and the draft cleared.
    pub submitted: bool,
    /// Whether input focus should return to the name field.
    pub focus_name_field: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// One renderable list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub link: String,
    /// Whether the row is still awaiting server confirmation.
    pub provisional: bool,
}

/// Render-ready list snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshotResponse {
    /// `loading`, `ready`, or `failed`.
    pub phase: String,
    /// Placeholder message when `phase == failed`.
    pub failure_message: Option<String>,
    /// Rows in display order; populated only in the ready phase.
    pub rows: Vec<ListRow>,
    /// Inline banner text, independent of the rows.
    pub banner: Option<String>,
}

/// Row tap outcome; `link` is handed to the platform opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTapResponse {
    pub link: Option<String>,
}

/// Feed pump outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpResponse {
    /// Whether the feed may still yield more events.
    pub more: bool,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Installs the remote API configuration once per process.
///
/// `realtime_endpoint` may be empty; it is then derived from `endpoint`.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Idempotent for an identical configuration; conflicting reconfiguration
///   is rejected.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_remote(
    endpoint: String,
    realtime_endpoint: String,
    region: String,
    api_key: String,
) -> ActionResponse {
    let realtime = if realtime_endpoint.trim().is_empty() {
        None
    } else {
        Some(realtime_endpoint)
    };
    let config = match ApiConfig::new(endpoint, realtime, region, api_key) {
        Ok(config) => config,
        Err(err) => return ActionResponse::failure(format!("configure_remote failed: {err}")),
    };
    match install_api_config(config) {
        Ok(()) => {
            info!("event=remote_config module=ffi status=ok");
            ActionResponse::success("Remote API configured.")
        }
        Err(err) => ActionResponse::failure(format!("configure_remote failed: {err}")),
    }
}

/// Initializes the process-wide store in `local` or `remote` mode.
///
/// Remote mode requires `configure_remote` first.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Idempotent for the same mode; re-init with another mode is rejected.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn init_store(mode: String) -> ActionResponse {
    let mode = match parse_mode(mode.as_str()) {
        Ok(mode) => mode,
        Err(err) => return ActionResponse::failure(format!("init_store failed: {err}")),
    };
    let mut guard = match app_guard() {
        Ok(guard) => guard,
        Err(err) => return ActionResponse::failure(err),
    };
    if let Some(app) = guard.as_ref() {
        if app.mode() == mode {
            return ActionResponse::success("Store already initialized.");
        }
        return ActionResponse::failure(
            "init_store failed: store already initialized in another mode",
        );
    }
    let app = match mode {
        StoreMode::Local => FfiApp::Local(AppStore::new(StoreMode::Local)),
        StoreMode::Remote => {
            let Some(config) = api_config() else {
                return ActionResponse::failure(
                    "init_store failed: call configure_remote before remote mode",
                );
            };
            match RemoteSession::new(config) {
                Ok(session) => FfiApp::Remote(session),
                Err(err) => {
                    return ActionResponse::failure(format!("init_store failed: {err}"))
                }
            }
        }
    };
    info!(
        "event=store_init module=ffi status=ok mode={}",
        match mode {
            StoreMode::Local => "local",
            StoreMode::Remote => "remote",
        }
    );
    *guard = Some(app);
    ActionResponse::success("Store initialized.")
}

/// Replaces the name field and returns the updated form snapshot.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; an uninitialized store yields an empty snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn form_set_name(value: String) -> FormSnapshot {
    let _ = apply_event(UiEvent::NameChanged(value));
    form_snapshot()
}

/// Replaces the link field and returns the updated form snapshot.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; an uninitialized store yields an empty snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn form_set_link(value: String) -> FormSnapshot {
    let _ = apply_event(UiEvent::LinkChanged(value));
    form_snapshot()
}

/// Current form state without mutating anything.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn form_snapshot() -> FormSnapshot {
    with_store(|store| {
        let form = store.form();
        FormSnapshot {
            name: form.name().to_owned(),
            link: form.link().to_owned(),
            name_error: form.name_error().map(str::to_owned),
            link_error: form.link_error().map(str::to_owned),
            submittable: form.is_submittable(),
        }
    })
    .unwrap_or(FormSnapshot {
        name: String::new(),
        link: String::new(),
        name_error: None,
        link_error: None,
        submittable: false,
    })
}

/// Submits the current draft.
///
/// Local mode appends the entry directly; remote mode appends a provisional
/// row and runs the create mutation before returning.
///
/// # FFI contract
/// - Sync call; remote mode performs one blocking network round-trip, so
///   Dart calls it from a background isolate.
/// - At most one create-request per call.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn form_submit() -> SubmitResponse {
    match apply_event(UiEvent::SubmitPressed) {
        Ok(effects) => {
            let focus = effects.contains(&Effect::FocusNameField);
            if focus {
                SubmitResponse {
                    submitted: true,
                    focus_name_field: true,
                    message: "App submitted.".to_string(),
                }
            } else {
                SubmitResponse {
                    submitted: false,
                    focus_name_field: false,
                    message: "Missing required fields.".to_string(),
                }
            }
        }
        Err(err) => SubmitResponse {
            submitted: false,
            focus_name_field: false,
            message: format!("form_submit failed: {err}"),
        },
    }
}

/// Render-ready snapshot of the display list.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; an uninitialized store reports the loading phase.
#[flutter_rust_bridge::frb(sync)]
pub fn list_snapshot() -> ListSnapshotResponse {
    with_store(snapshot_of).unwrap_or(ListSnapshotResponse {
        phase: "loading".to_string(),
        failure_message: None,
        rows: Vec::new(),
        banner: None,
    })
}

/// Reports a tap on the row at `index`.
///
/// # FFI contract
/// - Sync call, non-blocking; never mutates list state.
/// - A stale index yields `link: None`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn row_tapped(index: u32) -> RowTapResponse {
    let link = apply_event(UiEvent::EntryTapped(index as usize))
        .ok()
        .and_then(|effects| {
            effects.into_iter().find_map(|effect| match effect {
                Effect::OpenLink(link) => Some(link),
                _ => None,
            })
        });
    RowTapResponse { link }
}

/// Runs the authoritative list fetch once; the outcome lands in the next
/// `list_snapshot`.
///
/// # FFI contract
/// - Sync call with one blocking network round-trip; Dart calls it from a
///   background isolate.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn remote_refresh() -> ActionResponse {
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(err) => return ActionResponse::failure(format!("remote_refresh failed: {err}")),
    };
    let mut guard = match app_guard() {
        Ok(guard) => guard,
        Err(err) => return ActionResponse::failure(err),
    };
    match guard.as_mut() {
        Some(FfiApp::Remote(session)) => {
            runtime.block_on(session.refresh());
            ActionResponse::success("Refresh applied.")
        }
        Some(FfiApp::Local(_)) => {
            ActionResponse::failure("remote_refresh failed: store runs in local mode")
        }
        None => ActionResponse::failure("remote_refresh failed: store not initialized"),
    }
}

/// Opens the creation feed socket.
///
/// A failed connect surfaces as the subscription banner and a successful
/// one retracts it; the call itself only fails for setup problems.
///
/// # FFI contract
/// - Sync call with one blocking connection handshake; Dart calls it from a
///   background isolate.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn remote_connect() -> ActionResponse {
    let Some(config) = api_config() else {
        return ActionResponse::failure("remote_connect failed: remote api not configured");
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(err) => return ActionResponse::failure(format!("remote_connect failed: {err}")),
    };
    let mut feed_guard = match feed_guard() {
        Ok(guard) => guard,
        Err(err) => return ActionResponse::failure(err),
    };
    if feed_guard.is_some() {
        return ActionResponse::success("Feed already connected.");
    }
    match runtime.block_on(SubscriptionFeed::connect(config)) {
        Ok(feed) => {
            *feed_guard = Some(feed);
            drop(feed_guard);
            let _ = apply_event(UiEvent::SubscriptionRestored);
            ActionResponse::success("Feed connected.")
        }
        Err(err) => {
            drop(feed_guard);
            let _ = apply_event(UiEvent::SubscriptionFailed(err.to_string()));
            ActionResponse::failure(format!("remote_connect failed: {err}"))
        }
    }
}

/// Waits for the next creation event and applies it to the store.
///
/// # FFI contract
/// - Blocking call: returns when the feed yields an event, fails, or closes.
///   Dart drives it in a loop from a background isolate while `more` is true.
/// - Holds only the feed lock while waiting; form and list calls stay
///   responsive.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn remote_pump_push() -> PumpResponse {
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            return PumpResponse {
                more: false,
                message: format!("remote_pump_push failed: {err}"),
            }
        }
    };
    let mut feed_guard = match feed_guard() {
        Ok(guard) => guard,
        Err(err) => {
            return PumpResponse {
                more: false,
                message: err,
            }
        }
    };
    let Some(feed) = feed_guard.as_mut() else {
        return PumpResponse {
            more: false,
            message: "Feed not connected.".to_string(),
        };
    };
    match runtime.block_on(feed.next_event()) {
        Some(SubscriptionEvent::Push(entry)) => {
            drop(feed_guard);
            let _ = apply_event(UiEvent::PushReceived(entry));
            PumpResponse {
                more: true,
                message: "Push applied.".to_string(),
            }
        }
        Some(SubscriptionEvent::Failed(message)) => {
            *feed_guard = None;
            drop(feed_guard);
            let _ = apply_event(UiEvent::SubscriptionFailed(message));
            PumpResponse {
                more: false,
                message: "Feed failed.".to_string(),
            }
        }
        Some(SubscriptionEvent::Closed) | None => {
            *feed_guard = None;
            drop(feed_guard);
            PumpResponse {
                more: false,
                message: "Feed closed.".to_string(),
            }
        }
    }
}

fn parse_mode(mode: &str) -> Result<StoreMode, String> {
    match mode.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(StoreMode::Local),
        "remote" => Ok(StoreMode::Remote),
        other => Err(format!("unsupported store mode `{other}`; expected local|remote")),
    }
}

fn app_guard() -> Result<MutexGuard<'static, Option<FfiApp>>, String> {
    APP.lock().map_err(|_| "app state lock poisoned".to_string())
}

fn feed_guard() -> Result<MutexGuard<'static, Option<SubscriptionFeed>>, String> {
    FEED.lock().map_err(|_| "feed lock poisoned".to_string())
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| format!("failed to start async runtime: {err}"))
    })
}

fn with_store<T>(f: impl FnOnce(&AppStore) -> T) -> Result<T, String> {
    let guard = app_guard()?;
    match guard.as_ref() {
        Some(FfiApp::Local(store)) => Ok(f(store)),
        Some(FfiApp::Remote(session)) => Ok(f(session.store())),
        None => Err("store not initialized; call init_store first".to_string()),
    }
}

fn apply_event(event: UiEvent) -> Result<Vec<Effect>, String> {
    let mut guard = app_guard()?;
    match guard.as_mut() {
        Some(FfiApp::Local(store)) => Ok(store.apply(event)),
        Some(FfiApp::Remote(session)) => {
            let runtime = runtime()?;
            Ok(runtime.block_on(session.apply_ui(event)))
        }
        None => Err("store not initialized; call init_store first".to_string()),
    }
}

fn snapshot_of(store: &AppStore) -> ListSnapshotResponse {
    let (phase, failure_message) = match store.list().phase() {
        FetchPhase::Loading => ("loading".to_string(), None),
        FetchPhase::Ready => ("ready".to_string(), None),
        FetchPhase::Failed(message) => ("failed".to_string(), Some(message.clone())),
    };
    // Rows render only once the list is ready; the loading and failed phases
    // show a placeholder even if a submit already queued a provisional entry.
    let rows = if store.list().phase() == &FetchPhase::Ready {
        store
            .list()
            .entries()
            .iter()
            .map(|entry| ListRow {
                id: entry.id.canonical(),
                name: entry.name.clone(),
                link: entry.link.clone(),
                provisional: entry.id.is_provisional(),
            })
            .collect()
    } else {
        Vec::new()
    };
    ListSnapshotResponse {
        phase,
        failure_message,
        rows,
        banner: store.banner().map(str::to_owned),
    }
}
