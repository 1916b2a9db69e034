use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::{targets, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageMarker {
    Link,
    Scan,
    Scale,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStage {
    pub label: String,
    pub marker: StageMarker,
    pub offset_ms: u64,
}

impl SyncStage {
    pub fn new(label: impl Into<String>, marker: StageMarker, offset_ms: u64) -> Self {
        Self {
            label: label.into(),
            marker,
            offset_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl Default for Notice {
    fn default() -> Self {
        Self::new("Success", "Printing Started!")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProfile {
    pub stages: Vec<SyncStage>,
    /// Offset at which the status panel closes and the flow resets.
    pub close_after_ms: u64,
    #[serde(default)]
    pub notice: Notice,
}

impl SyncProfile {
    pub fn three_stage() -> Self {
        Self {
            stages: vec![
                SyncStage::new("Connecting...", StageMarker::Link, 0),
                SyncStage::new("Verifying Material...", StageMarker::Scale, 2_000),
                SyncStage::new("Accepted!", StageMarker::Success, 4_000),
            ],
            close_after_ms: 5_500,
            notice: Notice::default(),
        }
    }

    pub fn four_stage() -> Self {
        Self {
            stages: vec![
                SyncStage::new("Connecting...", StageMarker::Link, 0),
                SyncStage::new("Scanning Bottles...", StageMarker::Scan, 1_500),
                SyncStage::new("Weighing Material...", StageMarker::Scale, 3_000),
                SyncStage::new("Accepted!", StageMarker::Success, 5_000),
            ],
            close_after_ms: 6_500,
            notice: Notice::default(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |details: String| Error::InvalidSyncProfile { details };

        let Some(last) = self.stages.last() else {
            return Err(invalid("no stages defined".to_string()));
        };
        if last.marker != StageMarker::Success {
            return Err(invalid("last stage must be the success stage".to_string()));
        }

        for (index, pair) in self.stages.windows(2).enumerate() {
            if pair[1].offset_ms <= pair[0].offset_ms {
                return Err(invalid(format!(
                    "stage {} at {}ms does not follow stage {} at {}ms",
                    index + 2,
                    pair[1].offset_ms,
                    index + 1,
                    pair[0].offset_ms
                )));
            }
            if pair[0].marker == StageMarker::Success {
                return Err(invalid(format!("stage {} is marked success early", index + 1)));
            }
        }

        if self.close_after_ms <= last.offset_ms {
            return Err(invalid(format!(
                "close at {}ms must come after the final stage at {}ms",
                self.close_after_ms, last.offset_ms
            )));
        }

        Ok(())
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn step(&self, index: usize) -> Option<SyncStep> {
        let stage = self.stages.get(index)?;
        Some(SyncStep {
            index,
            count: self.stages.len(),
            label: stage.label.clone(),
            marker: stage.marker,
        })
    }

    /// Every event in firing order, with its offset from activation.
    pub fn schedule(&self) -> Vec<ScheduledEvent> {
        let mut events: Vec<ScheduledEvent> = (0..self.stages.len())
            .filter_map(|index| {
                let step = self.step(index)?;
                Some(ScheduledEvent {
                    offset: Duration::from_millis(self.stages[index].offset_ms),
                    event: SyncEvent::Stage(step),
                })
            })
            .collect();
        events.push(ScheduledEvent {
            offset: Duration::from_millis(self.close_after_ms),
            event: SyncEvent::Completed(self.notice.clone()),
        });
        events
    }
}

impl Default for SyncProfile {
    fn default() -> Self {
        Self::three_stage()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStep {
    pub index: usize,
    pub count: usize,
    pub label: String,
    pub marker: StageMarker,
}

impl SyncStep {
    pub fn is_success(&self) -> bool {
        self.marker == StageMarker::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Stage(SyncStep),
    Completed(Notice),
    Interrupted { last_step: Option<usize> },
}

impl SyncEvent {
    pub fn is_final(&self) -> bool {
        !matches!(self, SyncEvent::Stage(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub offset: Duration,
    pub event: SyncEvent,
}

/// Handle to a running machine handshake. The whole [`SyncProfile`] schedule
/// runs on one tokio task; dropping the handle aborts it.
#[derive(Debug)]
pub struct SyncTask {
    events: mpsc::UnboundedReceiver<SyncEvent>,
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl SyncTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn(profile: &SyncProfile) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        let (cancel, cancelled) = oneshot::channel();
        let schedule = profile.schedule();

        info!(
            target: targets::SYNC,
            stages = profile.stage_count(),
            close_after_ms = profile.close_after_ms,
            "Machine sync started"
        );

        let handle = tokio::spawn(run_schedule(schedule, sender, cancelled));

        Self {
            events,
            cancel: Some(cancel),
            handle,
        }
    }

    /// Next event in schedule order; `None` once the sequence has ended.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    /// Stops the sequence. The task reports one `Interrupted` event and ends.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Drains the sequence, returning the success notice.
    pub async fn finish(mut self) -> Result<Notice, Error> {
        let mut last_step = None;
        while let Some(event) = self.next_event().await {
            match event {
                SyncEvent::Stage(step) => last_step = Some(step.index),
                SyncEvent::Completed(notice) => return Ok(notice),
                SyncEvent::Interrupted { last_step } => {
                    return Err(Error::SyncInterrupted { last_step });
                }
            }
        }
        Err(Error::SyncInterrupted { last_step })
    }
}

impl Drop for SyncTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_schedule(
    schedule: Vec<ScheduledEvent>,
    events: mpsc::UnboundedSender<SyncEvent>,
    mut cancelled: oneshot::Receiver<()>,
) {
    let started = Instant::now();
    let mut last_step = None;

    for scheduled in schedule {
        tokio::select! {
            biased;
            _ = &mut cancelled => {
                warn!(target: targets::SYNC, ?last_step, "Machine sync cancelled");
                let _ = events.send(SyncEvent::Interrupted { last_step });
                return;
            }
            _ = sleep_until(started + scheduled.offset) => {}
        }

        match &scheduled.event {
            SyncEvent::Stage(step) => {
                debug!(
                    target: targets::SYNC,
                    stage = step.index + 1,
                    of = step.count,
                    label = %step.label,
                    "Machine sync stage"
                );
                last_step = Some(step.index);
            }
            SyncEvent::Completed(_) => {
                info!(target: targets::SYNC, "Machine sync completed");
            }
            SyncEvent::Interrupted { .. } => {}
        }

        if events.send(scheduled.event).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_paused<T>(future: impl std::future::Future<Output = T>) -> T {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("tokio runtime");
        runtime.block_on(future)
    }

    fn assert_near(actual: Duration, expected_ms: u64) {
        let expected = Duration::from_millis(expected_ms);
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn built_in_profiles_are_valid() {
        SyncProfile::three_stage().validate().expect("three stage");
        SyncProfile::four_stage().validate().expect("four stage");
        assert_eq!(SyncProfile::three_stage().stage_count(), 3);
        assert_eq!(SyncProfile::four_stage().stage_count(), 4);
    }

    #[test]
    fn rejects_out_of_order_stages() {
        let mut profile = SyncProfile::four_stage();
        profile.stages[2].offset_ms = 1_000;
        let error = profile.validate().expect_err("out of order");
        assert!(matches!(error, Error::InvalidSyncProfile { .. }));
    }

    #[test]
    fn rejects_early_success_and_early_close() {
        let mut profile = SyncProfile::three_stage();
        profile.stages[1].marker = StageMarker::Success;
        assert!(profile.validate().is_err());

        let mut profile = SyncProfile::three_stage();
        profile.close_after_ms = 4_000;
        assert!(profile.validate().is_err());

        let empty = SyncProfile {
            stages: Vec::new(),
            close_after_ms: 1_000,
            notice: Notice::default(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn schedule_lists_stages_then_completion() {
        let schedule = SyncProfile::three_stage().schedule();
        let offsets: Vec<u64> = schedule
            .iter()
            .map(|event| event.offset.as_millis() as u64)
            .collect();
        assert_eq!(offsets, vec![0, 2_000, 4_000, 5_500]);
        assert!(matches!(schedule[2].event, SyncEvent::Stage(ref step) if step.is_success()));
        assert!(matches!(schedule[3].event, SyncEvent::Completed(_)));
    }

    #[test]
    fn runs_every_stage_in_time_order() {
        let received = run_paused(async {
            let started = Instant::now();
            let mut task = SyncTask::spawn(&SyncProfile::four_stage());
            let mut received = Vec::new();
            while let Some(event) = task.next_event().await {
                received.push((started.elapsed(), event));
            }
            received
        });

        assert_eq!(received.len(), 5);
        let expected = [0, 1_500, 3_000, 5_000, 6_500];
        for ((elapsed, _), expected_ms) in received.iter().zip(expected) {
            assert_near(*elapsed, expected_ms);
        }
        for (index, (_, event)) in received.iter().take(4).enumerate() {
            assert!(matches!(event, SyncEvent::Stage(step) if step.index == index));
        }
        assert_eq!(
            received[4].1,
            SyncEvent::Completed(Notice::new("Success", "Printing Started!"))
        );
    }

    #[test]
    fn dropping_task_aborts_schedule() {
        let (first, alive) = run_paused(async {
            let profile = SyncProfile::three_stage();
            let mut task = SyncTask::spawn(&profile);
            let first = task.next_event().await;
            drop(task);

            tokio::time::advance(Duration::from_millis(profile.close_after_ms + 1_000)).await;
            tokio::task::yield_now().await;
            (
                first,
                tokio::runtime::Handle::current().metrics().num_alive_tasks(),
            )
        });

        assert!(matches!(first, Some(SyncEvent::Stage(step)) if step.index == 0));
        assert_eq!(alive, 0);
    }

    #[test]
    fn cancel_stops_remaining_stages() {
        let received = run_paused(async {
            let mut task = SyncTask::spawn(&SyncProfile::three_stage());
            let mut received = Vec::new();
            if let Some(event) = task.next_event().await {
                received.push(event);
            }
            task.cancel();
            while let Some(event) = task.next_event().await {
                received.push(event);
            }
            received
        });

        assert_eq!(received.len(), 2);
        assert!(matches!(received[0], SyncEvent::Stage(ref step) if step.index == 0));
        assert_eq!(received[1], SyncEvent::Interrupted { last_step: Some(0) });
    }

    #[test]
    fn finish_reports_interruption_as_error() {
        let result = run_paused(async {
            let mut task = SyncTask::spawn(&SyncProfile::three_stage());
            task.cancel();
            task.finish().await
        });

        assert!(matches!(result, Err(Error::SyncInterrupted { .. })));
    }

    #[test]
    fn finish_returns_notice() {
        let notice = run_paused(async { SyncTask::spawn(&SyncProfile::three_stage()).finish().await })
            .expect("notice");
        assert_eq!(notice.title, "Success");
    }
}
