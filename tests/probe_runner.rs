// tests/probe_runner.rs
mod common;

use common::{GatedExecutor, Outcome, ScriptedExecutor, target};
use promptbench::errors::ConsoleError;
use promptbench::runner::{ProbeRunner, ProbeStatus};
use promptbench::workbench::{View, Workbench};
use std::sync::Arc;

#[tokio::test]
async fn test_order_is_stable_when_targets_complete_in_reverse() {
    let keys = ["c0", "c1", "c2", "c3"];
    let (executor, mut gates) = GatedExecutor::new(&keys);
    let runner = ProbeRunner::new(Arc::new(executor));

    let batch = runner.run(keys.iter().map(|k| target(k)).collect()).unwrap();

    let initial = batch.snapshot();
    assert_eq!(initial.len(), 4);
    assert!(initial.iter().all(|p| p.status == ProbeStatus::Pending));

    let mut watch = batch.subscribe();
    for (i, key) in keys.iter().enumerate().rev() {
        gates
            .remove(*key)
            .unwrap()
            .send(Outcome::reply(format!("answer {}", i), Some(i as u64)))
            .unwrap();
        watch
            .wait_for(|probes| probes[i].status.is_terminal())
            .await
            .unwrap();

        let snapshot = batch.snapshot();
        assert!(snapshot[..i].iter().all(|p| !p.status.is_terminal()));
        assert!(snapshot[i..].iter().all(|p| p.status == ProbeStatus::Success));
    }

    let probes = batch.wait().await;
    for (i, probe) in probes.iter().enumerate() {
        assert_eq!(probe.index, i);
        assert_eq!(probe.config_ref, keys[i]);
        assert_eq!(probe.label, format!("label-{}", keys[i]));
        assert_eq!(probe.result_text, Some(format!("answer {}", i)));
        assert_eq!(probe.tokens_used, Some(i as u64));
    }
}

#[tokio::test]
async fn test_every_mix_of_outcomes_settles() {
    let keys = ["a", "b", "c"];
    for mask in 0u8..8 {
        let script = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let outcome = if mask & (1 << i) != 0 {
                    Outcome::reply(format!("ok {}", key), None)
                } else {
                    Outcome::fail(format!("failed {}", key))
                };
                (*key, outcome)
            })
            .collect();
        let runner = ProbeRunner::new(Arc::new(ScriptedExecutor::new(script)));

        let batch = runner.run(keys.iter().map(|k| target(k)).collect()).unwrap();
        let probes = batch.wait().await;

        assert_eq!(probes.len(), 3);
        assert!(
            probes.iter().all(|p| p.status.is_terminal()),
            "mask {:03b} left a probe unsettled",
            mask
        );
        let succeeded = probes
            .iter()
            .filter(|p| p.status == ProbeStatus::Success)
            .count();
        assert_eq!(succeeded, mask.count_ones() as usize);
    }
}

#[tokio::test]
async fn test_one_failure_does_not_affect_siblings() {
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("t1", Outcome::reply("first answer", Some(12))),
        ("t2", Outcome::fail("Rate limit exceeded")),
        ("t3", Outcome::reply("third answer", None)),
    ]));
    let runner = ProbeRunner::new(executor.clone());

    let batch = runner
        .run(vec![target("t1"), target("t2"), target("t3")])
        .unwrap();
    let probes = batch.wait().await;

    let statuses: Vec<_> = probes.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![ProbeStatus::Success, ProbeStatus::Error, ProbeStatus::Success]
    );

    assert_eq!(probes[0].result_text.as_deref(), Some("first answer"));
    assert_eq!(probes[0].tokens_used, Some(12));
    assert!(probes[0].error_message.is_none());

    assert_eq!(probes[1].error_message.as_deref(), Some("Rate limit exceeded"));
    assert!(probes[1].result_text.is_none());
    assert!(probes[1].tokens_used.is_none());
    assert!(probes[1].execution_time_ms.is_some());

    assert_eq!(probes[2].result_text.as_deref(), Some("third answer"));
    assert_eq!(probes[2].tokens_used, None);
    assert!(probes[2].execution_time_ms.is_some());

    assert_eq!(executor.calls(), 3);
}

#[tokio::test]
async fn test_each_probe_moves_through_running_once() {
    let (executor, mut gates) = GatedExecutor::new(&["a", "b"]);
    let runner = ProbeRunner::new(Arc::new(executor));

    let mut batch = runner.run(vec![target("a"), target("b")]).unwrap();
    let mut updates = batch.take_updates().unwrap();
    assert!(batch.take_updates().is_none());

    // Both calls are in flight before either completes.
    let mut watch = batch.subscribe();
    watch
        .wait_for(|probes| probes.iter().all(|p| p.status == ProbeStatus::Running))
        .await
        .unwrap();
    assert!(batch.snapshot().iter().all(|p| p.started_at.is_some()));
    assert!(!batch.is_settled());

    gates
        .remove("b")
        .unwrap()
        .send(Outcome::fail("provider unavailable"))
        .unwrap();
    gates
        .remove("a")
        .unwrap()
        .send(Outcome::reply("fine", Some(3)))
        .unwrap();

    let mut seen = vec![Vec::new(), Vec::new()];
    while let Some(update) = updates.recv().await {
        assert_eq!(update.batch_id, batch.id());
        assert_eq!(update.probe.index, update.index);
        seen[update.index].push(update.probe.status);
    }

    assert_eq!(seen[0], vec![ProbeStatus::Running, ProbeStatus::Success]);
    assert_eq!(seen[1], vec![ProbeStatus::Running, ProbeStatus::Error]);
    assert!(batch.is_settled());
}

#[test]
fn test_empty_batch_is_rejected() {
    let runner = ProbeRunner::new(Arc::new(ScriptedExecutor::new(vec![])));
    assert!(matches!(runner.run(vec![]), Err(ConsoleError::EmptyBatch)));
}

#[tokio::test]
async fn test_rerun_replaces_previous_batch() {
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("a", Outcome::reply("a", None)),
        ("b", Outcome::reply("b", None)),
        ("c", Outcome::reply("c", None)),
    ]));
    let workbench = Workbench::new(ProbeRunner::new(executor));

    let first = workbench
        .launch(View::PromptTest, vec![target("a"), target("b"), target("c")])
        .await
        .unwrap();
    assert_eq!(first.probes.len(), 3);
    let settled = workbench.settled(View::PromptTest).await.unwrap();
    assert_eq!(settled.probes.len(), 3);
    assert!(settled.settled);

    let second = workbench
        .launch(View::PromptTest, vec![target("c"), target("a")])
        .await
        .unwrap();
    assert_ne!(first.batch_id, second.batch_id);

    let current = workbench.settled(View::PromptTest).await.unwrap();
    assert_eq!(current.batch_id, second.batch_id);
    assert_eq!(current.probes.len(), 2);
    assert_eq!(current.probes[0].config_ref, "c");
    assert_eq!(current.probes[1].config_ref, "a");
    assert_eq!(current.summary.total, 2);
}

#[tokio::test]
async fn test_views_hold_separate_batches() {
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("a", Outcome::reply("a", None)),
        ("b", Outcome::reply("b", None)),
    ]));
    let workbench = Workbench::new(ProbeRunner::new(executor));
    assert!(workbench.current(View::VersionCompare).await.is_none());

    workbench
        .launch(View::PromptTest, vec![target("a")])
        .await
        .unwrap();
    workbench
        .launch(View::VersionCompare, vec![target("a"), target("b")])
        .await
        .unwrap();

    assert_eq!(workbench.settled(View::PromptTest).await.unwrap().probes.len(), 1);
    assert_eq!(workbench.settled(View::VersionCompare).await.unwrap().probes.len(), 2);
}

#[tokio::test]
async fn test_workbench_publishes_every_transition() {
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("a", Outcome::reply("a", Some(1))),
        ("b", Outcome::fail("nope")),
    ]));
    let workbench = Workbench::new(ProbeRunner::new(executor));
    let mut events = workbench.subscribe();

    let launched = workbench
        .launch(View::VersionCompare, vec![target("a"), target("b")])
        .await
        .unwrap();

    let mut received = Vec::new();
    while received.len() < 4 {
        received.push(events.recv().await.unwrap());
    }
    assert!(received.iter().all(|e| e.view == View::VersionCompare));
    assert!(received.iter().all(|e| e.update.batch_id == launched.batch_id));
    let terminal = received
        .iter()
        .filter(|e| e.update.probe.status.is_terminal())
        .count();
    assert_eq!(terminal, 2);
}

#[tokio::test]
async fn test_concurrency_limit_keeps_extra_probes_pending() {
    let (executor, mut gates) = GatedExecutor::new(&["a", "b", "c"]);
    let runner = ProbeRunner::new(Arc::new(executor)).with_max_concurrency(Some(1));

    let batch = runner
        .run(vec![target("a"), target("b"), target("c")])
        .unwrap();
    let mut watch = batch.subscribe();

    watch
        .wait_for(|probes| probes[0].status == ProbeStatus::Running)
        .await
        .unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    let snapshot = batch.snapshot();
    assert_eq!(snapshot[1].status, ProbeStatus::Pending);
    assert_eq!(snapshot[2].status, ProbeStatus::Pending);

    gates.remove("a").unwrap().send(Outcome::reply("a", None)).unwrap();
    watch
        .wait_for(|probes| probes[1].status == ProbeStatus::Running)
        .await
        .unwrap();
    assert_eq!(batch.snapshot()[2].status, ProbeStatus::Pending);

    gates.remove("b").unwrap().send(Outcome::reply("b", None)).unwrap();
    gates.remove("c").unwrap().send(Outcome::reply("c", None)).unwrap();

    let probes = batch.wait().await;
    assert!(probes.iter().all(|p| p.status == ProbeStatus::Success));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_launches_leave_newest_current() {
    let executor = Arc::new(ScriptedExecutor::new(vec![
        ("a", Outcome::reply("a", None)),
        ("b", Outcome::reply("b", None)),
    ]));
    let workbench = Workbench::new(ProbeRunner::new(executor));

    let launches: Vec<_> = (0..16)
        .map(|i| {
            let workbench = workbench.clone();
            let targets = if i % 2 == 0 {
                vec![target("a")]
            } else {
                vec![target("a"), target("b")]
            };
            tokio::spawn(async move { workbench.launch(View::PromptTest, targets).await })
        })
        .collect();

    let mut launched = Vec::new();
    for handle in launches {
        launched.push(handle.await.unwrap().unwrap());
    }

    let mut generations: Vec<_> = launched.iter().map(|b| b.generation).collect();
    generations.sort_unstable();
    generations.dedup();
    assert_eq!(generations.len(), 16);

    let newest = launched.iter().max_by_key(|b| b.generation).unwrap();
    let current = workbench.current(View::PromptTest).await.unwrap();
    assert_eq!(current.generation, newest.generation);
    assert_eq!(current.batch_id, newest.batch_id);
    assert_eq!(current.probes.len(), newest.probes.len());
}
