use darklist_core::{
    AppStore, Effect, Entry, EntryId, FetchPhase, ListView, StoreMode, UiEvent,
};

fn fetched(id: &str, name: &str, link: &str) -> Entry {
    Entry::with_id(EntryId::confirmed(id), name, link).unwrap()
}

fn submit(store: &mut AppStore, name: &str, link: &str) -> darklist_core::CreateRequest {
    store.apply(UiEvent::NameChanged(name.into()));
    store.apply(UiEvent::LinkChanged(link.into()));
    let effects = store.apply(UiEvent::SubmitPressed);
    effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::SendCreate(request) => Some(request),
            _ => None,
        })
        .expect("submit should emit a create request")
}

#[test]
fn remote_list_renders_loading_then_rows() {
    let mut store = AppStore::new(StoreMode::Remote);
    assert_eq!(store.view(), ListView::Loading);

    store.apply(UiEvent::ListLoaded(vec![fetched(
        "a",
        "Lyft",
        "https://lyft.com",
    )]));

    let ListView::Rows(rows) = store.view() else {
        panic!("list should render rows");
    };
    assert_eq!(rows.len(), 1);
}

#[test]
fn fetch_failure_before_any_data_renders_placeholder() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListFailed("network unreachable".into()));
    assert_eq!(store.view(), ListView::Failed("network unreachable"));
}

#[test]
fn provisional_row_is_visible_before_any_network_response() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(Vec::new()));

    submit(&mut store, "Lyft", "https://lyft.com");

    assert_eq!(store.list().len(), 1);
    assert!(store.list().entries()[0].id.is_provisional());
    assert_eq!(store.list().entries()[0].name, "Lyft");
}

#[test]
fn lyft_appears_exactly_once_after_ack_and_push() {
    // Submitting "Lyft" must never show two Lyft rows, whichever of the
    // mutation ack and the subscription echo lands first.
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(Vec::new()));
    let request = submit(&mut store, "Lyft", "https://lyft.com");
    let echoed = fetched(&request.id.canonical(), "Lyft", "https://lyft.com");

    store.apply(UiEvent::CreateConfirmed(echoed.clone()));
    store.apply(UiEvent::PushReceived(echoed));

    assert_eq!(store.list().len(), 1);
    assert_eq!(store.list().entries()[0].name, "Lyft");
    assert!(store.list().entries()[0].id.is_confirmed());
}

#[test]
fn push_arriving_before_the_ack_converges_the_same_way() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(Vec::new()));
    let request = submit(&mut store, "Lyft", "https://lyft.com");
    let echoed = fetched(&request.id.canonical(), "Lyft", "https://lyft.com");

    store.apply(UiEvent::PushReceived(echoed.clone()));
    store.apply(UiEvent::CreateConfirmed(echoed));

    assert_eq!(store.list().len(), 1);
    assert!(store.list().entries()[0].id.is_confirmed());
}

#[test]
fn duplicate_push_delivery_is_ignored() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(Vec::new()));
    let push = fetched("b", "Uber", "https://uber.com");

    store.apply(UiEvent::PushReceived(push.clone()));
    store.apply(UiEvent::PushReceived(push));

    assert_eq!(store.list().len(), 1);
}

#[test]
fn push_from_another_client_is_appended_at_the_end() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(vec![fetched(
        "a",
        "Lyft",
        "https://lyft.com",
    )]));

    store.apply(UiEvent::PushReceived(fetched("b", "Uber", "https://uber.com")));

    assert_eq!(store.list().len(), 2);
    assert_eq!(store.list().entries()[1].name, "Uber");
}

#[test]
fn confirmation_preserves_the_row_position() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(vec![fetched(
        "a",
        "Lyft",
        "https://lyft.com",
    )]));
    let request = submit(&mut store, "Uber", "https://uber.com");
    store.apply(UiEvent::PushReceived(fetched("c", "Gett", "https://gett.com")));

    let echoed = fetched(&request.id.canonical(), "Uber", "https://uber.com");
    store.apply(UiEvent::CreateConfirmed(echoed));

    let names: Vec<_> = store
        .list()
        .entries()
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, vec!["Lyft", "Uber", "Gett"]);
    assert!(store.list().entries()[1].id.is_confirmed());
}

#[test]
fn in_flight_provisional_survives_a_full_reload() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(Vec::new()));
    let request = submit(&mut store, "Uber", "https://uber.com");

    store.apply(UiEvent::ListLoaded(vec![fetched(
        "a",
        "Lyft",
        "https://lyft.com",
    )]));

    assert_eq!(store.list().len(), 2);
    assert_eq!(store.list().entries()[0].name, "Lyft");
    assert!(store.list().entries()[1].id.same_entry(&request.id));
}

#[test]
fn reload_covering_the_provisional_drops_the_placeholder() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(Vec::new()));
    let request = submit(&mut store, "Uber", "https://uber.com");

    store.apply(UiEvent::ListLoaded(vec![fetched(
        &request.id.canonical(),
        "Uber",
        "https://uber.com",
    )]));

    assert_eq!(store.list().len(), 1);
    assert!(store.list().entries()[0].id.is_confirmed());
}

#[test]
fn refresh_failure_after_rows_are_shown_keeps_them() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(vec![fetched(
        "a",
        "Lyft",
        "https://lyft.com",
    )]));

    store.apply(UiEvent::ListFailed("later outage".into()));

    assert_eq!(store.list().phase(), &FetchPhase::Ready);
    assert_eq!(store.list().len(), 1);
    assert!(store.banner().is_some());
}

#[test]
fn subscription_failure_banners_without_touching_rows() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(vec![fetched(
        "a",
        "Lyft",
        "https://lyft.com",
    )]));

    store.apply(UiEvent::SubscriptionFailed("socket closed".into()));

    assert!(store.banner().is_some());
    let ListView::Rows(rows) = store.view() else {
        panic!("list should keep rendering rows");
    };
    assert_eq!(rows.len(), 1);
}

#[test]
fn tapping_a_row_yields_its_link_and_nothing_else() {
    let mut store = AppStore::new(StoreMode::Remote);
    store.apply(UiEvent::ListLoaded(vec![
        fetched("a", "Lyft", "https://lyft.com"),
        fetched("b", "Uber", "https://uber.com"),
    ]));

    let effects = store.apply(UiEvent::EntryTapped(1));
    assert_eq!(effects, vec![Effect::OpenLink("https://uber.com".into())]);
    assert_eq!(store.list().len(), 2);

    let stale = store.apply(UiEvent::EntryTapped(5));
    assert!(stale.is_empty());
    assert_eq!(store.list().len(), 2);
}
