//! End-to-end attack lifecycle through the library API: coordinator, workers
//! and the Twilio notifier talking to a local fake gateway.

mod common;

use std::sync::Arc;
use std::time::Duration;

use catfacts::content::ContentSource;
use catfacts::coordinator::{
    AdminAllowList, CommandOutcome, Coordinator, CoordinatorHandle, CoordinatorOptions, messages,
};
use catfacts::notifier::{TwilioConfig, TwilioNotifier};
use catfacts::observability::EventEmitter;
use catfacts::worker::WorkerSettings;
use common::{ADMIN, FakeGateway, SENDER, TARGET};
use tokio::task::JoinHandle;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

struct Service {
    handle: CoordinatorHandle,
    task: JoinHandle<()>,
    cancel: CancellationToken,
}

fn start_service(gateway: &FakeGateway, facts: &[&str], interval: Duration) -> Service {
    let mut twilio = TwilioConfig::new("ACtest", "secret");
    twilio.api_base.clone_from(&gateway.base_url);
    let notifier = Arc::new(TwilioNotifier::new(twilio).unwrap());

    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(CoordinatorOptions {
        admins: AdminAllowList::new([ADMIN]),
        notifier,
        content: ContentSource::new(facts.iter().map(ToString::to_string).collect()),
        settings: WorkerSettings {
            sender: SENDER.to_string(),
            interval,
        },
        events: Arc::new(EventEmitter::noop()),
        cancel: cancel.clone(),
    });
    let (handle, task) = coordinator.start(cancel.clone());
    Service {
        handle,
        task,
        cancel,
    }
}

#[tokio::test]
async fn attack_runs_until_facts_are_exhausted() {
    let mut gateway = FakeGateway::start().await;
    let service = start_service(&gateway, &["first", "second"], Duration::from_millis(50));

    let outcome = assert_ok!(service.handle.submit(ADMIN, TARGET).await);
    assert_eq!(
        outcome,
        CommandOutcome::StartRequested {
            target: TARGET.to_string()
        }
    );

    // launch confirmation, two facts, exhaustion notice
    let messages = gateway.take(4).await;
    assert!(messages.iter().all(|m| m.from == SENDER));

    let to_admin: Vec<&str> = messages
        .iter()
        .filter(|m| m.to == ADMIN)
        .map(|m| m.body.as_str())
        .collect();
    assert_eq!(to_admin.len(), 2);
    assert_eq!(to_admin[0], messages::attack_launched(TARGET));
    assert_eq!(to_admin[1], messages::attack_exhausted(TARGET));

    let facts: Vec<&str> = messages
        .iter()
        .filter(|m| m.to == TARGET)
        .map(|m| m.body.as_str())
        .collect();
    assert_eq!(facts, vec!["second", "first"]);

    assert!(!service.handle.is_under_attack(TARGET).await.unwrap());
    gateway.assert_quiet(Duration::from_millis(200)).await;

    service.cancel.cancel();
    service.task.await.unwrap();
}

#[tokio::test]
async fn admin_stops_a_running_attack() {
    let mut gateway = FakeGateway::start().await;
    let service = start_service(&gateway, &["fact"], Duration::from_secs(3600));

    service.handle.submit(ADMIN, TARGET).await.unwrap();
    let launched = gateway.next().await;
    assert_eq!(launched.to, ADMIN);
    assert!(launched.body.contains("downboy 5559998888"));
    assert!(service.handle.is_under_attack("+15559998888").await.unwrap());

    let outcome = assert_ok!(service.handle.submit(ADMIN, "DOWNBOY 5559998888").await);
    assert_eq!(
        outcome,
        CommandOutcome::Stopped {
            target: TARGET.to_string()
        }
    );

    let stopped = gateway.next().await;
    assert_eq!(stopped.to, ADMIN);
    assert_eq!(stopped.body, messages::attack_stopped(TARGET));
    assert!(service.handle.active_attacks().await.unwrap().is_empty());

    service.cancel.cancel();
    service.task.await.unwrap();
}

#[tokio::test]
async fn duplicate_start_never_spawns_a_second_worker() {
    let mut gateway = FakeGateway::start().await;
    let service = start_service(&gateway, &["a", "b", "c"], Duration::from_secs(3600));

    let first = service.handle.submit(ADMIN, TARGET).await.unwrap();
    let second = service.handle.submit(ADMIN, TARGET).await.unwrap();
    assert!(matches!(first, CommandOutcome::StartRequested { .. }));
    assert!(matches!(second, CommandOutcome::DuplicateIgnored { .. }));

    assert_eq!(gateway.next().await.to, ADMIN);
    let third = service.handle.submit(ADMIN, "+15559998888").await.unwrap();
    assert!(matches!(third, CommandOutcome::DuplicateIgnored { .. }));

    // exactly one launch confirmation
    gateway.assert_quiet(Duration::from_millis(200)).await;
    assert_eq!(service.handle.active_attacks().await.unwrap(), vec![TARGET]);

    service.cancel.cancel();
    service.task.await.unwrap();
}

#[tokio::test]
async fn target_and_strangers_are_handled_differently() {
    let mut gateway = FakeGateway::start().await;
    let service = start_service(&gateway, &["fact"], Duration::from_secs(3600));

    service.handle.submit(ADMIN, TARGET).await.unwrap();
    gateway.next().await;

    // the target texts back and gets deflected
    let outcome = service
        .handle
        .submit("+15559998888", "who is this")
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Deflected);
    let reply = gateway.next().await;
    assert_eq!(reply.to, "+15559998888");
    assert_eq!(reply.body, messages::DEFLECTION);

    // a stranger gets nothing, and cannot stop the attack
    let outcome = service
        .handle
        .submit("+15550000000", "downboy 5559998888")
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Ignored);
    gateway.assert_quiet(Duration::from_millis(200)).await;
    assert!(service.handle.is_under_attack(TARGET).await.unwrap());

    service.cancel.cancel();
    service.task.await.unwrap();
}

#[tokio::test]
async fn invalid_target_is_reported_and_never_registered() {
    let mut gateway = FakeGateway::start().await;
    let service = start_service(&gateway, &["fact"], Duration::from_millis(10));

    service.handle.submit(ADMIN, "downboy abc").await.unwrap();
    let reply = gateway.next().await;
    assert_eq!(reply.to, ADMIN);
    assert_eq!(reply.body, messages::invalid_target("downboy abc"));

    gateway.assert_quiet(Duration::from_millis(200)).await;
    assert!(service.handle.active_attacks().await.unwrap().is_empty());

    service.cancel.cancel();
    service.task.await.unwrap();
}

#[tokio::test]
async fn shutdown_silences_every_worker() {
    let mut gateway = FakeGateway::start().await;
    let service = start_service(&gateway, &["a", "b", "c"], Duration::from_millis(300));

    service.handle.submit(ADMIN, TARGET).await.unwrap();
    service.handle.submit(ADMIN, "5551112222").await.unwrap();
    let launches = gateway.take(2).await;
    assert!(launches.iter().all(|m| m.to == ADMIN));

    service.cancel.cancel();
    service.task.await.unwrap();
    gateway.assert_quiet(Duration::from_millis(600)).await;
}
