//! At-least-once delivery from the outbox to the transport.

mod support;

use std::time::Duration;

use transactional_outbox::bus::InMemoryQueue;
use transactional_outbox::domain::user::{self, UserApp};
use transactional_outbox::{OutboxRelay, OutboxRelayThread};

use support::{ctx, fast_relay_config, wait_until, FlakyPublisher, ForgetfulOutbox, Node};

fn users() -> (UserApp, Node) {
    let node = Node::new("user", user::integration::schemas());
    (UserApp::new(node.luow.clone()), node)
}

fn register(app: &UserApp, count: usize) {
    for i in 0..count {
        app.create_user(&ctx(), &format!("user{i}"), "Name", &format!("user{i}@example.com"))
            .unwrap();
    }
}

#[test]
fn relay_converges_through_publish_failures() {
    let (app, node) = users();
    register(&app, 5);

    let queue = InMemoryQueue::new();
    let publisher = FlakyPublisher::new(queue.clone(), 3);
    let worker = OutboxRelayThread::spawn(node.relay(publisher.clone()));

    assert!(wait_until(Duration::from_secs(5), || queue.len() == 5));
    let stats = worker.stop();

    assert_eq!(stats.published, 5);
    assert!(stats.publish_failures >= 3);
    assert_eq!(publisher.attempts(), 8);
    assert_eq!(node.undispatched(), 0);
}

#[test]
fn failed_batch_keeps_commit_order() {
    let (app, node) = users();
    register(&app, 3);

    let queue = InMemoryQueue::new();
    let publisher = FlakyPublisher::new(queue.clone(), 0);
    let relay = node.relay(publisher.clone());

    publisher.fail_next(1);
    let first = relay.run_once().unwrap();
    assert!(first.stopped_on_failure());
    assert_eq!(first.published, 0);
    assert!(queue.is_empty());

    relay.drain().unwrap();
    let ids: Vec<_> = queue.messages().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["user-1", "user-2", "user-3"]);
}

#[test]
fn restarted_relay_resumes_where_the_last_one_stopped() {
    let (app, node) = users();
    let queue = InMemoryQueue::new();

    register(&app, 2);
    let worker = OutboxRelayThread::spawn(node.relay(queue.clone()));
    assert!(wait_until(Duration::from_secs(5), || queue.len() == 2));
    worker.stop();

    app.create_user(&ctx(), "late", "Late", "late@example.com").unwrap();
    assert_eq!(node.undispatched(), 1);

    let worker = OutboxRelayThread::spawn(node.relay(queue.clone()));
    assert!(wait_until(Duration::from_secs(5), || queue.len() == 3));
    worker.stop();

    assert_eq!(queue.event_types(), vec!["user_created"; 3]);
    assert_eq!(node.undispatched(), 0);
}

#[test]
fn lost_dispatch_mark_republishes_under_the_same_id() {
    let (app, node) = users();
    register(&app, 1);

    let queue = InMemoryQueue::new();
    let relay = OutboxRelay::new(
        ForgetfulOutbox::new(node.store.clone(), 1),
        queue.clone(),
        fast_relay_config(),
    );

    assert!(relay.run_once().is_err());
    assert_eq!(queue.len(), 1);
    assert_eq!(node.undispatched(), 1);

    let pass = relay.run_once().unwrap();
    assert_eq!(pass.published, 1);
    assert_eq!(node.undispatched(), 0);

    let ids: Vec<_> = queue.messages().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["user-1", "user-1"]);
    assert_eq!(queue.messages()[0], queue.messages()[1]);
}

#[test]
fn rolled_back_work_is_never_published() {
    let (app, node) = users();
    register(&app, 1);

    // Second registration with the same login fails inside the transaction.
    assert!(app
        .create_user(&ctx(), "user0", "Again", "again@example.com")
        .is_err());
    // A commit failure rolls back both the row and its outbox entry.
    node.store.fail_next_commits(1);
    assert!(app
        .create_user(&ctx(), "ghost", "Ghost", "ghost@example.com")
        .is_err());

    let queue = InMemoryQueue::new();
    node.relay(queue.clone()).drain().unwrap();
    assert_eq!(queue.len(), 1);
}

#[test]
fn updates_and_deletes_follow_creation() {
    let (app, node) = users();
    let created = app.create_user(&ctx(), "ada", "Ada", "ada@example.com").unwrap();
    app.update_user(&ctx(), created.id, "Ada L.", "ada@lovelace.org").unwrap();
    app.delete_user(&ctx(), created.id).unwrap();

    let queue = InMemoryQueue::new();
    node.relay(queue.clone()).drain().unwrap();

    assert_eq!(
        queue.event_types(),
        vec!["user_created", "user_updated", "user_deleted"]
    );
    let updated: user::integration::UserUpdatedSchema =
        queue.find_all_by_type("user_updated")[0].decode().unwrap();
    assert_eq!(updated.login, "ada");
    assert_eq!(updated.name, "Ada L.");
}
