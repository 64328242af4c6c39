mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use claims::{ClaimError, ClaimRecord, JobId, PollConfig, PollPhase, PollState, StatusSource};
use common::{completed, job, not_found, status, RecordingScheduler, ScriptedSource, Updates};
use tokio::sync::{mpsc, Notify};
use workflow::{CancelToken, StatusPoller, TokioScheduler};

fn poller(source: Arc<dyn StatusSource>) -> StatusPoller {
    StatusPoller::new(source, Arc::new(TokioScheduler))
}

#[tokio::test(start_paused = true)]
async fn completes_after_terminal_status_with_one_update_per_attempt() {
    let source = ScriptedSource::new(
        vec![status("PROCESSING"), status("PROCESSING")],
        Ok(common::record(serde_json::json!({
            "status": "SCORING_COMPLETE",
            "processing_complete": true
        }))),
    );
    let updates = Updates::default();

    let handle = poller(source.clone()).watch(
        job("2024/claim-01.pdf"),
        updates.sink(),
        PollConfig::from_millis(0, 10, 3),
    );
    let final_state = handle.join().await;

    assert_eq!(final_state.phase(), PollPhase::Completed);
    assert_eq!(source.calls(), 3);
    let phases: Vec<PollPhase> = updates.all().iter().map(|s| s.phase()).collect();
    assert_eq!(
        phases,
        vec![PollPhase::Polling, PollPhase::Polling, PollPhase::Completed]
    );
    assert_eq!(final_state.status(), Some("SCORING_COMPLETE"));
}

#[tokio::test(start_paused = true)]
async fn times_out_after_exactly_max_attempts() {
    let source = ScriptedSource::always(status("PROCESSING"));
    let updates = Updates::default();

    let handle = poller(source.clone()).watch(
        job("j-1"),
        updates.sink(),
        PollConfig::from_millis(0, 10, 2),
    );
    let final_state = handle.join().await;

    assert_eq!(final_state.phase(), PollPhase::TimedOut);
    assert_eq!(final_state.attempt(), 2);
    assert_eq!(source.calls(), 2);
    assert_eq!(updates.len(), 2);

    // Nothing runs after the loop ends.
    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(source.calls(), 2);

    assert!(matches!(
        final_state.into_outcome(),
        Err(ClaimError::PollTimedOut { attempts: 2, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn not_found_is_retried_until_the_record_appears() {
    let source = ScriptedSource::new(vec![not_found("j-2")], completed());
    let updates = Updates::default();

    let handle = poller(source.clone()).watch(
        job("j-2"),
        updates.sink(),
        PollConfig::from_millis(0, 10, 3),
    );
    let final_state = handle.join().await;

    assert_eq!(final_state.phase(), PollPhase::Completed);
    assert_eq!(source.calls(), 2);
    let first = &updates.all()[0];
    assert_eq!(first.phase(), PollPhase::Polling);
    assert!(first.last_error().is_some_and(ClaimError::is_not_found));
    assert!(final_state.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn other_fetch_errors_are_retried_within_budget() {
    let failure = Err(ClaimError::FetchFailed {
        reason: "502 Bad Gateway".into(),
        status: Some(502),
    });
    let source = ScriptedSource::always(failure);

    let final_state = poller(source.clone())
        .watch(job("j-3"), |_| {}, PollConfig::from_millis(0, 10, 4))
        .join()
        .await;

    assert_eq!(source.calls(), 4);
    match final_state.into_outcome() {
        Err(ClaimError::PollTimedOut {
            attempts,
            last_status,
            last_error,
            ..
        }) => {
            assert_eq!(attempts, 4);
            assert_eq!(last_status, None);
            assert_eq!(
                last_error.as_deref(),
                Some("Fetching claim failed: 502 Bad Gateway")
            );
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn waits_initial_delay_then_fixed_interval() {
    let source = ScriptedSource::always(status("PROCESSING"));
    let scheduler = Arc::new(RecordingScheduler::default());
    let poller = StatusPoller::new(source, scheduler.clone());

    let config = PollConfig::from_millis(5_000, 3_000, 3);
    let state = poller
        .run(job("j-4"), &|_: PollState| {}, &config, &CancelToken::new())
        .await;

    assert_eq!(state.phase(), PollPhase::TimedOut);
    assert_eq!(
        scheduler.sleeps(),
        vec![
            Duration::from_millis(5_000),
            Duration::from_millis(3_000),
            Duration::from_millis(3_000),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn first_fetch_happens_only_after_initial_delay() {
    let source = ScriptedSource::always(status("PROCESSING"));
    let handle = poller(source.clone()).watch(
        job("j-5"),
        |_| {},
        PollConfig::from_millis(1_000, 10, 5),
    );

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(source.calls(), 0);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(source.calls(), 1);
    handle.cancel();
    assert_eq!(handle.join().await.phase(), PollPhase::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn cancel_before_second_iteration_stops_all_updates() {
    let source = ScriptedSource::always(status("PROCESSING"));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let updates = Updates::default();
    let sink = updates.sink();

    let handle = poller(source.clone()).watch(
        job("j-6"),
        move |state| {
            sink(state.clone());
            let _ = tx.send(state);
        },
        PollConfig::from_millis(0, 10, 10),
    );

    let first = rx.recv().await.expect("first update");
    assert_eq!(first.attempt(), 1);
    handle.cancel();
    assert!(handle.is_cancelled());

    tokio::time::advance(Duration::from_millis(100)).await;

    let final_state = handle.join().await;
    assert_eq!(final_state.phase(), PollPhase::Cancelled);
    assert_eq!(updates.len(), 1);
    assert_eq!(source.calls(), 1);
    assert!(matches!(
        final_state.into_outcome(),
        Err(ClaimError::Cancelled { .. })
    ));
}

/// Blocks every fetch until released.
struct GatedSource {
    entered: mpsc::UnboundedSender<()>,
    release: Notify,
}

#[async_trait]
impl StatusSource for GatedSource {
    async fn fetch_status(&self, _job_id: &JobId) -> Result<ClaimRecord, ClaimError> {
        let _ = self.entered.send(());
        self.release.notified().await;
        completed()
    }
}

#[tokio::test(start_paused = true)]
async fn result_of_in_flight_fetch_is_discarded_after_cancel() {
    let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
    let source = Arc::new(GatedSource {
        entered: entered_tx,
        release: Notify::new(),
    });
    let updates = Updates::default();

    let handle = poller(source.clone()).watch(
        job("j-7"),
        updates.sink(),
        PollConfig::from_millis(0, 10, 3),
    );

    entered_rx.recv().await.expect("fetch started");
    handle.cancel();
    source.release.notify_one();

    let final_state = handle.join().await;
    assert_eq!(final_state.phase(), PollPhase::Cancelled);
    assert_eq!(final_state.attempt(), 0);
    assert_eq!(updates.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_watches_are_independent() {
    let fast = ScriptedSource::new(vec![status("PROCESSING")], completed());
    let slow = ScriptedSource::always(status("PROCESSING"));
    let fast_updates = Updates::default();
    let slow_updates = Updates::default();

    let fast_handle = poller(fast.clone()).watch(
        job("fast"),
        fast_updates.sink(),
        PollConfig::from_millis(0, 10, 5),
    );
    let slow_handle = poller(slow.clone()).watch(
        job("slow"),
        slow_updates.sink(),
        PollConfig::from_millis(0, 10, 3),
    );

    let (fast_state, slow_state) = tokio::join!(fast_handle.join(), slow_handle.join());

    assert_eq!(fast_state.phase(), PollPhase::Completed);
    assert_eq!(fast_state.attempt(), 2);
    assert_eq!(slow_state.phase(), PollPhase::TimedOut);
    assert_eq!(slow_state.attempt(), 3);
    assert!(fast_updates.all().iter().all(|s| s.job_id().as_str() == "fast"));
    assert!(slow_updates.all().iter().all(|s| s.job_id().as_str() == "slow"));
}

#[tokio::test(start_paused = true)]
async fn zero_budget_still_makes_one_attempt() {
    let source = ScriptedSource::always(status("PROCESSING"));
    let state = poller(source.clone())
        .watch(job("j-8"), |_| {}, PollConfig::from_millis(0, 10, 0))
        .join()
        .await;
    assert_eq!(state.phase(), PollPhase::TimedOut);
    assert_eq!(source.calls(), 1);
}
