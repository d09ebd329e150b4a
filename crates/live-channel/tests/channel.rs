#![allow(missing_docs)]


use std::sync::Arc;

use live_channel::{ChannelConfig, ChannelState, LiveChannel};
use pretty_assertions::assert_eq;
use transit_api::{Route, Stop};
use view_model::{DeltaOutcome, FetchState, Resource, ResourceKind, ViewModelStore};

use self::provider::MockConnector;

fn route(id: &str) -> Route {
    Route {
        id: id.to_string(),
        name: format!("Ruta {id}"),
        route_type: None,
        status: None,
        status_at: None,
    }
}

fn channel(connector: &MockConnector, store: &ViewModelStore) -> LiveChannel<MockConnector> {
    LiveChannel::new(Arc::new(connector.clone()), store.clone(), &ChannelConfig::default())
        .expect("should create channel")
}

// Should connect to the endpoint derived from the origin.
#[tokio::test]
async fn connect() {
    let connector = MockConnector::new();
    let store = ViewModelStore::default();
    let mut channel = channel(&connector, &store);
    assert_eq!(channel.state(), ChannelState::Disconnected);

    channel.connect().await.expect("should connect");

    assert_eq!(channel.state(), ChannelState::Connected);
    assert_eq!(connector.endpoints(), vec!["ws://localhost:8000/ws/va-y-ven"]);
}

// Should return to disconnected when the connection is refused.
#[tokio::test]
async fn connect_refused() {
    let connector = MockConnector::new().refusing();
    let store = ViewModelStore::default();
    let mut channel = channel(&connector, &store);

    let err = channel.connect().await.unwrap_err();

    assert_eq!(err.code(), "network_error");
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

// Should refuse an origin that is neither http nor https.
#[test]
fn invalid_origin() {
    let config = ChannelConfig { origin: "file:///tmp/map".to_string(), ..ChannelConfig::default() };
    let result =
        LiveChannel::new(Arc::new(MockConnector::new()), ViewModelStore::default(), &config);

    let Err(err) = result else { panic!("should reject origin") };
    assert_eq!(err.code(), "validation_error");
}

// Should apply the backend's route update broadcast to loaded routes.
#[tokio::test]
async fn route_update() {
    let connector = MockConnector::new().with_text(
        r#"{"type":"route_update","route_id":"R2","status":"delayed","timestamp":"2024-05-02T08:15:30"}"#,
    );
    let store = ViewModelStore::default();
    store.resolve(vec![route("R1"), route("R2")]);
    let mut channel = channel(&connector, &store);
    channel.connect().await.expect("should connect");

    let outcome = channel.receive().await.expect("should receive").expect("should apply");

    assert_eq!(outcome, DeltaOutcome::Applied);
    let snapshot = store.snapshot();
    let routes = snapshot.routes.value().expect("routes should be loaded");
    assert_eq!(routes[1].status.as_deref(), Some("delayed"));
    assert!(routes[1].status_at.is_some());
}

// Should drop a malformed message, keeping state and connection.
#[tokio::test]
async fn malformed_message() {
    let connector = MockConnector::new().with_text("{not json").with_binary(&[0xff, 0xfe]);
    let store = ViewModelStore::default();
    store.resolve(vec![route("R1")]);
    let before = store.snapshot();
    let mut channel = channel(&connector, &store);
    channel.connect().await.expect("should connect");

    for _ in 0..2 {
        let err = channel.receive().await.expect("should receive").unwrap_err();
        assert_eq!(err.code(), "channel_parse_error");
        assert_eq!(channel.state(), ChannelState::Connected);
    }

    assert_eq!(store.snapshot(), before);
}

// Should buffer deltas for kinds that are not loaded yet.
#[tokio::test]
async fn delta_buffered() {
    let connector = MockConnector::new().with_text(
        r#"{"kind":"stops","upsert":[{"stop_id":7,"stop_name":"Sur","stop_lat":20.9,"stop_lon":-89.6}]}"#,
    );
    let store = ViewModelStore::default();
    let ticket = store.begin_fetch(ResourceKind::Stops).expect("should begin");
    let mut channel = channel(&connector, &store);
    channel.connect().await.expect("should connect");

    let outcome = channel.receive().await.expect("should receive").expect("should apply");
    assert_eq!(outcome, DeltaOutcome::Buffered);

    assert!(store.complete(ticket, Ok(Vec::<Stop>::new())));
    let stop = Stop { id: "7".to_string(), name: "Sur".to_string(), lat: 20.9, lon: -89.6 };
    assert_eq!(store.state(ResourceKind::Stops), FetchState::Success(Resource::Stops(vec![stop])));
}

// Should become disconnected, without reconnecting, when the peer closes.
#[tokio::test]
async fn peer_closed() {
    let connector = MockConnector::new().with_text(r#"{"kind":"routes","remove":["R1"]}"#);
    let store = ViewModelStore::default();
    let mut channel = channel(&connector, &store);
    channel.connect().await.expect("should connect");

    channel.run().await;

    assert_eq!(channel.state(), ChannelState::Disconnected);
    assert_eq!(connector.endpoints().len(), 1);
    assert_eq!(store.pending_deltas(ResourceKind::Routes), 1);
}

// Should disconnect when the socket fails.
#[tokio::test]
async fn socket_failure() {
    let connector = MockConnector::new().with_failure("connection reset");
    let store = ViewModelStore::default();
    let mut channel = channel(&connector, &store);
    channel.connect().await.expect("should connect");

    let err = channel.receive().await.expect("should receive").unwrap_err();

    assert_eq!(err.code(), "network_error");
    assert_eq!(channel.state(), ChannelState::Disconnected);
    assert!(channel.receive().await.is_none());
}

// Should publish a route status while connected.
#[tokio::test]
async fn send_route_status() {
    let connector = MockConnector::new();
    let store = ViewModelStore::default();
    let mut channel = channel(&connector, &store);

    let err = channel.send_route_status("R1", "delayed").await.unwrap_err();
    assert_eq!(err.code(), "validation_error");

    channel.connect().await.expect("should connect");
    channel.send_route_status("R1", "delayed").await.expect("should send");

    assert_eq!(connector.sent(), vec![r#"{"route_id":"R1","status":"delayed"}"#]);
}

// Should close the socket and refuse to reconnect after teardown.
#[tokio::test]
async fn teardown() {
    let connector = MockConnector::new();
    let store = ViewModelStore::default();
    let mut channel = channel(&connector, &store);
    channel.connect().await.expect("should connect");

    channel.teardown().await.expect("should tear down");

    assert_eq!(channel.state(), ChannelState::Closed);
    assert!(connector.closed());
    assert_eq!(channel.connect().await.unwrap_err().code(), "validation_error");
    assert!(channel.receive().await.is_none());
}
