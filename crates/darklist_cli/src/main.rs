//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `darklist_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use darklist_core::{AppStore, Effect, ListView, StoreMode, UiEvent};

fn main() {
    // Why: keep a tiny smoke binary to validate core crate wiring
    // independently from Flutter/FFI runtime setup.
    println!("darklist_core ping={}", darklist_core::ping());
    println!("darklist_core version={}", darklist_core::core_version());

    let mut store = AppStore::new(StoreMode::Local);
    store.apply(UiEvent::NameChanged("Lyft".to_string()));
    store.apply(UiEvent::LinkChanged("https://lyft.com".to_string()));
    let effects = store.apply(UiEvent::SubmitPressed);
    println!(
        "submit focus_name_field={}",
        effects.contains(&Effect::FocusNameField)
    );

    match store.view() {
        ListView::Rows(rows) => {
            for (index, entry) in rows.iter().enumerate() {
                println!("row {index} name={} link={}", entry.name, entry.link);
            }
        }
        ListView::Empty => println!("list empty"),
        ListView::Loading => println!("list loading"),
        ListView::Failed(message) => println!("list failed: {message}"),
    }
}
