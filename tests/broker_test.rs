//! Broker integration tests
//!
//! Exercises publish/subscribe through the public `Broker` API only.

#[macro_use]
mod common;

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use microchat::broker::{Broker, BrokerError, BrokerOptions, SubscribeResponse};
use microchat::shared::event::{now_millis, Cursor};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{small_broker, wait_for_waiters};

#[tokio::test]
async fn test_publishes_come_back_in_order() {
    let broker = Broker::default();
    let published: Vec<_> = (0..20)
        .map(|i| assert_ok!(broker.publish("news", json!({ "n": i }))))
        .collect();

    let response = assert_ok!(
        broker
            .subscribe(&["news"], Cursor::since(0), Duration::from_secs(1))
            .await
    );
    assert_event_ids!(response, published);
    assert_eq!(response.events()[3].payload, json!({ "n": 3 }));
}

#[tokio::test]
async fn test_buffer_of_three_keeps_newest() {
    let broker = small_broker(3);
    let published: Vec<_> = (1..=4)
        .map(|i| assert_ok!(broker.publish("sports", json!(i))))
        .collect();

    let response = assert_ok!(
        broker
            .subscribe(&["sports"], Cursor::since(0), Duration::from_secs(1))
            .await
    );
    assert_event_ids!(response, published[1..]);
    assert_eq!(broker.topic_summaries()[0].event_count, 3);
}

#[tokio::test]
async fn test_subscribe_times_out_without_new_events() {
    let broker = Broker::default();
    let old = assert_ok!(broker.publish("news", json!("old")));

    let started = Instant::now();
    let response = assert_ok!(
        broker
            .subscribe(&["news"], Cursor::after(&old), Duration::from_millis(300))
            .await
    );
    let elapsed = started.elapsed();

    assert_matches!(response, SubscribeResponse::Timeout { .. });
    assert!(elapsed >= Duration::from_millis(250), "returned after {:?}", elapsed);
    assert_within!(elapsed, Duration::from_secs(2));
    assert_eq!(broker.pending_waiters(), 0);
}

#[tokio::test]
async fn test_timeout_returns_close_to_deadline() {
    let broker = Broker::default();
    let started = Instant::now();
    let response = assert_ok!(
        broker
            .subscribe(&["news"], Cursor::now(), Duration::from_secs(1))
            .await
    );
    assert_eq!(response.status(), "timeout");
    assert_within!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test]
async fn test_pending_subscribe_woken_by_publish() {
    let broker = Broker::default();
    let subscriber = {
        let broker = broker.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let response = broker
                .subscribe(&["news"], Cursor::since(0), Duration::from_secs(5))
                .await;
            (response, started.elapsed())
        })
    };
    wait_for_waiters(&broker, 1).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    let event = assert_ok!(broker.publish("news", json!("breaking")));

    let (response, elapsed) = subscriber.await.unwrap();
    let response = assert_ok!(response);
    assert_eq!(response, SubscribeResponse::Data { events: vec![event] });
    assert_within!(elapsed, Duration::from_secs(2));
}

#[tokio::test]
async fn test_other_topics_do_not_wake_subscriber() {
    let broker = Broker::default();
    let subscriber = {
        let broker = broker.clone();
        tokio::spawn(async move {
            broker
                .subscribe(&["b"], Cursor::since(0), Duration::from_millis(400))
                .await
        })
    };
    wait_for_waiters(&broker, 1).await;

    for i in 0..50 {
        assert_ok!(broker.publish("a", json!(i)));
    }
    assert_eq!(broker.pending_waiters(), 1);

    let event = assert_ok!(broker.publish("b", json!("mine")));
    let response = assert_ok!(subscriber.await.unwrap());
    assert_event_ids!(response, [event]);
}

#[tokio::test]
async fn test_many_subscribers_receive_same_event() {
    let broker = Broker::default();
    let subscribers: Vec<_> = (0..10)
        .map(|_| {
            let broker = broker.clone();
            tokio::spawn(async move {
                broker
                    .subscribe(&["room"], Cursor::since(0), Duration::from_secs(5))
                    .await
            })
        })
        .collect();
    wait_for_waiters(&broker, 10).await;

    let event = assert_ok!(broker.publish("room", json!("hello all")));
    for subscriber in subscribers {
        let response = assert_ok!(subscriber.await.unwrap());
        assert_event_ids!(response, [event.clone()]);
    }
    assert_eq!(broker.pending_waiters(), 0);
}

#[tokio::test]
async fn test_round_trip_preserves_event() {
    let broker = Broker::default();
    let payload = json!({ "display_name": "ferris", "message": "hi", "topic": "rust" });
    let event = assert_ok!(broker.publish("rust", payload.clone()));

    let response = assert_ok!(
        broker
            .subscribe(
                &["rust"],
                Cursor::since(event.timestamp - 1),
                Duration::from_secs(1)
            )
            .await
    );
    let events = response.into_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], event);
    assert_eq!(events[0].payload, payload);
    assert_eq!(events[0].topic, "rust");
}

#[tokio::test]
async fn test_last_id_resumes_within_same_millisecond() {
    let broker = Broker::default();
    let published: Vec<_> = (0..5)
        .map(|i| assert_ok!(broker.publish("burst", json!(i))))
        .collect();

    let response = assert_ok!(
        broker
            .subscribe(
                &["burst"],
                Cursor::after(&published[1]),
                Duration::from_millis(50)
            )
            .await
    );
    assert_event_ids!(response, published[2..]);
}

#[tokio::test]
async fn test_timestamps_never_decrease() {
    let broker = Broker::default();
    let mut last = 0;
    for i in 0..100 {
        let topic = if i % 2 == 0 { "even" } else { "odd" };
        let event = assert_ok!(broker.publish(topic, json!(i)));
        assert!(event.timestamp >= last);
        last = event.timestamp;
    }
    assert!(last <= now_millis());
}

#[tokio::test]
async fn test_invalid_arguments_rejected_before_waiting() {
    let broker = Broker::default();

    assert_err!(
        broker
            .subscribe(&["news"], Cursor::since(0), Duration::ZERO)
            .await,
        BrokerError::InvalidArgument { field: "timeout", .. }
    );
    assert_err!(
        broker
            .subscribe(&[""], Cursor::since(0), Duration::from_secs(1))
            .await,
        BrokerError::InvalidArgument { field: "topic", .. }
    );
    assert_err!(
        broker.publish(&"t".repeat(2000), json!(1)),
        BrokerError::InvalidArgument { field: "topic", .. }
    );
    assert_eq!(broker.pending_waiters(), 0);
}

#[tokio::test]
async fn test_waiter_limit_is_internal_error() {
    let broker =
        assert_ok!(Broker::new(BrokerOptions::default().with_max_waiters_per_topic(2)));
    let parked: Vec<_> = (0..2)
        .map(|_| {
            let broker = broker.clone();
            tokio::spawn(async move {
                broker
                    .subscribe(&["busy"], Cursor::now(), Duration::from_secs(5))
                    .await
            })
        })
        .collect();
    wait_for_waiters(&broker, 2).await;

    assert_err!(
        broker
            .subscribe(&["busy"], Cursor::now(), Duration::from_secs(1))
            .await,
        BrokerError::Internal { .. }
    );

    // Other topics keep working.
    assert_ok!(broker.publish("quiet", json!(1)));
    broker.shutdown();
    for handle in parked {
        assert_eq!(assert_ok!(handle.await.unwrap()), SubscribeResponse::Aborted);
    }
}

#[tokio::test]
async fn test_expired_events_are_not_returned() {
    let broker = assert_ok!(Broker::new(
        BrokerOptions::default().with_event_ttl(Some(Duration::from_millis(100)))
    ));
    assert_ok!(broker.publish("ephemeral", json!("soon gone")));
    tokio::time::sleep(Duration::from_millis(250)).await;

    let response = assert_ok!(
        broker
            .subscribe(&["ephemeral"], Cursor::since(0), Duration::from_millis(50))
            .await
    );
    assert_eq!(response.status(), "timeout");

    let stats = broker.purge_expired();
    assert_eq!(stats.expired_events, 1);
    assert_eq!(stats.reaped_topics, 1);
    assert_eq!(broker.topic_count(), 0);
}

#[tokio::test]
async fn test_multi_topic_subscribe_woken_by_either() {
    let broker = Broker::default();
    let subscriber = {
        let broker = broker.clone();
        tokio::spawn(async move {
            broker
                .subscribe(&["rust", "all_chats"], Cursor::since(0), Duration::from_secs(5))
                .await
        })
    };
    wait_for_waiters(&broker, 2).await;

    let event = assert_ok!(broker.publish("all_chats", json!("anywhere")));
    let response = assert_ok!(subscriber.await.unwrap());
    assert_event_ids!(response, [event]);
    assert_eq!(broker.pending_waiters(), 0);
}
