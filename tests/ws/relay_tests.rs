//! End-to-end relay behavior over real sockets

use std::time::Duration;

use pretty_assertions::assert_eq;

use location_relay::domain::{Coordinates, LocationUpdate, RelayEvent};

use crate::common::TestApp;

fn location(p: &crate::common::Participant, lat: f64, lon: f64) -> RelayEvent {
    RelayEvent::LocationReceived(LocationUpdate::new(
        p.id().clone(),
        Coordinates::new(lat, lon).unwrap(),
    ))
}

#[tokio::test]
async fn test_update_reaches_every_session_including_sender() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;
    let mut bob = app.join().await;
    assert_ne!(alice.id(), bob.id());

    alice.send_location(51.5, -0.12).await;

    let expected = location(&alice, 51.5, -0.12);
    assert_eq!(alice.next_event().await, expected);
    assert_eq!(bob.next_event().await, expected);
}

#[tokio::test]
async fn test_out_of_range_update_is_dropped() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;
    let mut bob = app.join().await;

    alice.send_location(200.0, 0.0).await;
    assert_eq!(bob.try_next_event(Duration::from_millis(300)).await, None);

    // Connection survives and the next valid update goes through
    alice.send_location(10.0, 20.0).await;
    assert_eq!(bob.next_event().await, location(&alice, 10.0, 20.0));
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;

    alice.send_text("not json").await;
    alice
        .send_text(r#"{"event":"send-location","data":{"latitude":"north","longitude":1}}"#)
        .await;
    alice.send_location(1.0, 2.0).await;

    assert_eq!(alice.next_event().await, location(&alice, 1.0, 2.0));
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_sessions() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;
    let bob = app.join().await;
    let bob_id = bob.id().clone();

    bob.leave().await;

    assert_eq!(alice.next_event().await, RelayEvent::SessionEnded(bob_id));
    assert_eq!(app.hub.session_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_per_sender_order_preserved() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;
    let mut bob = app.join().await;

    for i in 0..5 {
        alice.send_location(i as f64, 0.0).await;
    }

    for i in 0..5 {
        assert_eq!(bob.next_event().await, location(&alice, i as f64, 0.0));
    }
}

#[tokio::test]
async fn test_late_joiner_sees_only_new_updates() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;
    alice.send_location(5.0, 5.0).await;
    alice.next_event().await;

    let mut carol = app.join().await;
    assert_eq!(carol.try_next_event(Duration::from_millis(200)).await, None);

    alice.send_location(6.0, 6.0).await;
    assert_eq!(carol.next_event().await, location(&alice, 6.0, 6.0));
}

#[tokio::test]
async fn test_session_dropped_by_hub_has_its_socket_closed() {
    let app = TestApp::spawn().await;
    let mut alice = app.join().await;
    let mut bob = app.join().await;
    let bob_id = bob.id().clone();

    // Same path an eviction takes: the hub forgets the session and drops its queue
    app.hub.disconnect(bob_id.clone()).await.unwrap();

    assert!(bob.closed_by_server().await);
    assert_eq!(alice.next_event().await, RelayEvent::SessionEnded(bob_id));
    assert_eq!(app.hub.session_count().await.unwrap(), 1);
}
