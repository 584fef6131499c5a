//! Consumers tolerate unknown types, survive replays and park poison messages.

mod support;

use std::time::Duration;

use transactional_outbox::bus::{InMemoryQueue, Message, Publisher};
use transactional_outbox::consumer::{Consumed, ConsumerError};
use transactional_outbox::domain::notification::{self, Notification, NotificationApp};
use transactional_outbox::domain::payment::{self, PaymentApp};
use transactional_outbox::{EventConsumer, EventConsumerThread};
use uuid::Uuid;

use support::{consumer_config, ctx, wait_until, Node};

fn payment_consumer() -> (EventConsumer, PaymentApp, Node) {
    let node = Node::new("payment", payment::integration::schemas());
    let app = PaymentApp::new(node.luow.clone());
    let consumer = EventConsumer::new("payment", payment::integration::handlers(app.clone()));
    (consumer, app, node)
}

fn user_created(id: &str, user_id: Uuid) -> Message {
    Message::encode(
        id,
        "user_created",
        &serde_json::json!({ "user_id": user_id, "login": "ada", "name": "Ada", "email": "ada@example.com", "created_at": 0 }),
    )
    .unwrap()
}

#[test]
fn unknown_types_are_acknowledged_and_skipped() {
    let (consumer, _, node) = payment_consumer();
    let queue = InMemoryQueue::new();
    queue
        .publish(Message::with_string_payload("other-1", "inventory_audited", "{}"))
        .unwrap();

    let worker = EventConsumerThread::spawn(consumer, queue.clone(), consumer_config("payment"));
    assert!(wait_until(Duration::from_secs(5), || queue.acknowledged() == ["other-1"]));
    let stats = worker.stop();

    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.handled, 0);
    assert!(node.outbox_types().is_empty());
}

#[test]
fn replayed_user_created_opens_one_wallet() {
    let (consumer, app, node) = payment_consumer();
    let user_id = Uuid::new_v4();
    let delivery = user_created("user-1", user_id);

    for _ in 0..3 {
        let outcome = consumer.handle(&ctx(), &delivery).unwrap();
        assert_eq!(outcome, Consumed::Handled);
    }

    assert_eq!(app.balance(&ctx(), user_id).unwrap().amount, payment::integration::WELCOME_AMOUNT);
    assert_eq!(
        node.outbox_types(),
        ["customer_account_created", "customer_amount_updated"]
    );
}

#[test]
fn replay_after_a_consumer_crash_is_harmless() {
    let (consumer, app, _node) = payment_consumer();
    let queue = InMemoryQueue::new();
    let user_id = Uuid::new_v4();
    queue.publish(user_created("user-1", user_id)).unwrap();

    let worker = EventConsumerThread::spawn(consumer.clone(), queue.clone(), consumer_config("payment"));
    assert!(wait_until(Duration::from_secs(5), || queue.acknowledged().len() == 1));
    worker.stop();

    queue.reset_position();
    let worker = EventConsumerThread::spawn(consumer, queue.clone(), consumer_config("payment"));
    assert!(wait_until(Duration::from_secs(5), || queue.acknowledged().len() == 2));
    let stats = worker.stop();

    assert_eq!(stats.handled, 1);
    assert_eq!(app.balance(&ctx(), user_id).unwrap().amount, 100);
}

#[test]
fn malformed_payload_ends_in_dead_letters() {
    let (consumer, _, node) = payment_consumer();
    let queue = InMemoryQueue::new();
    queue
        .publish(Message::with_string_payload("user-1", "user_created", r#"{"user_id":"nope"}"#))
        .unwrap();

    let err = consumer.handle(&ctx(), &queue.messages()[0]).unwrap_err();
    assert!(matches!(err, ConsumerError::Malformed { .. }));
    assert!(!err.is_retryable());

    let worker = EventConsumerThread::spawn(consumer, queue.clone(), consumer_config("payment"));
    assert!(wait_until(Duration::from_secs(5), || queue.dead_letters().len() == 1));
    let stats = worker.stop();

    assert_eq!(stats.failed, 3);
    assert!(queue.acknowledged().is_empty());
    assert!(node.outbox_types().is_empty());
}

#[test]
fn transient_handler_failure_is_redelivered() {
    let (consumer, app, node) = payment_consumer();
    let queue = InMemoryQueue::new();
    let user_id = Uuid::new_v4();
    queue.publish(user_created("user-1", user_id)).unwrap();
    node.store.fail_next_commits(1);

    let worker = EventConsumerThread::spawn(consumer, queue.clone(), consumer_config("payment"));
    assert!(wait_until(Duration::from_secs(5), || queue.acknowledged().len() == 1));
    let stats = worker.stop();

    assert_eq!((stats.failed, stats.handled), (1, 1));
    assert!(queue.dead_letters().is_empty());
    assert_eq!(app.balance(&ctx(), user_id).unwrap().amount, 100);
}

#[test]
fn notifications_are_deduplicated_by_source_event() {
    let node = Node::new("notification", notification::integration::schemas());
    let app = NotificationApp::new(node.uow());
    let consumer = EventConsumer::new("notification", notification::integration::handlers(app.clone()));
    let order_id = Uuid::new_v4();
    let paid = Message::encode(
        "order-7",
        "order_paid",
        &serde_json::json!({ "order_id": order_id, "user_id": Uuid::new_v4(), "total_price": 10, "paid_at": 0 }),
    )
    .unwrap();

    consumer.handle(&ctx(), &paid).unwrap();
    consumer.handle(&ctx(), &paid).unwrap();

    let notifications = app.notifications(&ctx()).unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].subject, "Order was paid");
    assert_eq!(
        notifications[0].body,
        format!("Order #{order_id} has been paid successfully.")
    );
    assert_eq!(
        notifications[0].id,
        Notification::id_for(&format!("order_paid:{order_id}"))
    );
    assert_eq!(node.outbox_types(), vec!["notification_created"]);
}
