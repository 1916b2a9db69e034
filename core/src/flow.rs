use std::fmt;

use tracing::{debug, info, warn};

use crate::analysis::AnalysisReport;
use crate::catalog::Design;
use crate::deposit::DepositCode;
use crate::model::{Job, JobId};
use crate::{targets, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStage {
    Idle,
    Analyzing,
    Result,
    CodeReady,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStage::Idle => f.write_str("idle"),
            FlowStage::Analyzing => f.write_str("analyzing"),
            FlowStage::Result => f.write_str("showing a job summary"),
            FlowStage::CodeReady => f.write_str("showing a deposit code"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    SelectPreset,
    BeginUpload,
    FinishAnalysis,
    Confirm,
    StartSync,
    RecordSyncStep,
    CompleteSync,
}

impl fmt::Display for FlowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowAction::SelectPreset => f.write_str("select a design"),
            FlowAction::BeginUpload => f.write_str("upload a file"),
            FlowAction::FinishAnalysis => f.write_str("finish analysis"),
            FlowAction::Confirm => f.write_str("confirm the job"),
            FlowAction::StartSync => f.write_str("start machine sync"),
            FlowAction::RecordSyncStep => f.write_str("record a sync stage"),
            FlowAction::CompleteSync => f.write_str("complete machine sync"),
        }
    }
}

/// Issued when analysis starts; only the newest ticket can finish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisTicket(u64);

/// Issued when a machine sync starts; only the newest ticket can finish it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncTicket(u64);

impl SyncTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptedSync {
    pub last_step: Option<usize>,
}

impl InterruptedSync {
    pub fn into_error(self) -> Error {
        Error::SyncInterrupted {
            last_step: self.last_step,
        }
    }
}

/// What a reset threw away.
#[derive(Debug, Clone, PartialEq)]
pub struct Reset {
    pub from: FlowStage,
    pub job: Option<Job>,
    pub interrupted_sync: Option<InterruptedSync>,
}

#[derive(Debug, Clone, Copy)]
struct SyncRun {
    ticket: u64,
    last_step: Option<usize>,
}

#[derive(Debug, Clone)]
enum FlowState {
    Idle,
    Analyzing {
        ticket: u64,
    },
    Result {
        job: Job,
    },
    CodeReady {
        job: Job,
        code: DepositCode,
        sync: Option<SyncRun>,
    },
}

/// State machine for a single print job: pick or upload a design, review it,
/// show the deposit code, then wait for the machine to accept the deposit.
#[derive(Debug, Clone)]
pub struct JobFlow {
    state: FlowState,
    generation: u64,
    jobs_created: u64,
}

impl Default for JobFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl JobFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            generation: 0,
            jobs_created: 0,
        }
    }

    pub fn stage(&self) -> FlowStage {
        match self.state {
            FlowState::Idle => FlowStage::Idle,
            FlowState::Analyzing { .. } => FlowStage::Analyzing,
            FlowState::Result { .. } => FlowStage::Result,
            FlowState::CodeReady { .. } => FlowStage::CodeReady,
        }
    }

    pub fn job(&self) -> Option<&Job> {
        match &self.state {
            FlowState::Result { job } | FlowState::CodeReady { job, .. } => Some(job),
            FlowState::Idle | FlowState::Analyzing { .. } => None,
        }
    }

    pub fn deposit_code(&self) -> Option<&DepositCode> {
        match &self.state {
            FlowState::CodeReady { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_run().is_some()
    }

    pub fn sync_ticket(&self) -> Option<SyncTicket> {
        self.sync_run().map(|run| SyncTicket(run.ticket))
    }

    pub fn sync_step(&self) -> Option<usize> {
        self.sync_run().and_then(|run| run.last_step)
    }

    pub fn analysis_ticket(&self) -> Option<AnalysisTicket> {
        match self.state {
            FlowState::Analyzing { ticket } => Some(AnalysisTicket(ticket)),
            _ => None,
        }
    }

    pub fn select_preset(&mut self, design: &Design) -> Result<&Job, Error> {
        self.require_idle(FlowAction::SelectPreset)?;

        let job = Job::from_design(self.next_job_id(), design);
        info!(
            target: targets::FLOW,
            job = %job.id(),
            design = %design.name,
            bottles = job.bottles_required(),
            "Preset selected"
        );
        self.state = FlowState::Result { job };
        Ok(self.current_job())
    }

    pub fn begin_upload(&mut self) -> Result<AnalysisTicket, Error> {
        self.require_idle(FlowAction::BeginUpload)?;

        let ticket = self.next_ticket();
        info!(target: targets::FLOW, ticket, "Upload analysis started");
        self.state = FlowState::Analyzing { ticket };
        Ok(AnalysisTicket(ticket))
    }

    pub fn finish_analysis(
        &mut self,
        ticket: AnalysisTicket,
        report: &AnalysisReport,
    ) -> Result<&Job, Error> {
        match self.state {
            FlowState::Analyzing { ticket: current } if current == ticket.0 => {}
            _ => return Err(Self::stale(FlowAction::FinishAnalysis)),
        }

        let job = Job::from_report(self.next_job_id(), report);
        info!(
            target: targets::FLOW,
            job = %job.id(),
            file = %job.label(),
            bottles = job.bottles_required(),
            "Upload analysed"
        );
        self.state = FlowState::Result { job };
        Ok(self.current_job())
    }

    pub fn confirm(&mut self) -> Result<&DepositCode, Error> {
        let FlowState::Result { job } = &self.state else {
            return Err(self.invalid(FlowAction::Confirm));
        };

        let code = DepositCode::for_job(job)?;
        let job = job.clone();
        info!(target: targets::FLOW, job = %job.id(), "Deposit code generated");
        self.state = FlowState::CodeReady {
            job,
            code,
            sync: None,
        };

        match &self.state {
            FlowState::CodeReady { code, .. } => Ok(code),
            _ => unreachable!("state was just set to CodeReady"),
        }
    }

    pub fn start_sync(&mut self) -> Result<SyncTicket, Error> {
        let from = self.stage();
        let ticket = self.generation + 1;
        let FlowState::CodeReady {
            sync: sync @ None,
            job,
            ..
        } = &mut self.state
        else {
            return Err(Self::rejected(from, FlowAction::StartSync));
        };

        *sync = Some(SyncRun {
            ticket,
            last_step: None,
        });
        info!(target: targets::FLOW, job = %job.id(), ticket, "Machine sync requested");
        self.generation = ticket;
        Ok(SyncTicket(ticket))
    }

    pub fn record_sync_step(&mut self, ticket: SyncTicket, index: usize) -> Result<(), Error> {
        match &mut self.state {
            FlowState::CodeReady {
                sync: Some(run), ..
            } if run.ticket == ticket.0 => {
                debug!(target: targets::FLOW, stage = index + 1, "Sync stage reached");
                run.last_step = Some(index);
                Ok(())
            }
            _ => Err(Self::stale(FlowAction::RecordSyncStep)),
        }
    }

    /// Machine accepted the deposit: the job is handed back and the flow
    /// returns to idle.
    pub fn complete_sync(&mut self, ticket: SyncTicket) -> Result<Job, Error> {
        match &self.state {
            FlowState::CodeReady {
                sync: Some(run), ..
            } if run.ticket == ticket.0 => {}
            _ => return Err(Self::stale(FlowAction::CompleteSync)),
        }

        let previous = std::mem::replace(&mut self.state, FlowState::Idle);
        self.generation += 1;
        match previous {
            FlowState::CodeReady { job, .. } => {
                info!(
                    target: targets::FLOW,
                    job = %job.id(),
                    bottles = job.bottles_required(),
                    "Machine accepted deposit"
                );
                Ok(job)
            }
            _ => unreachable!("state was checked to be CodeReady"),
        }
    }

    /// Back navigation from any state. Outstanding tickets become stale.
    pub fn back(&mut self) -> Reset {
        let from = self.stage();
        let previous = std::mem::replace(&mut self.state, FlowState::Idle);
        self.generation += 1;

        let reset = match previous {
            FlowState::Idle | FlowState::Analyzing { .. } => Reset {
                from,
                job: None,
                interrupted_sync: None,
            },
            FlowState::Result { job } => Reset {
                from,
                job: Some(job),
                interrupted_sync: None,
            },
            FlowState::CodeReady { job, sync, .. } => Reset {
                from,
                job: Some(job),
                interrupted_sync: sync.map(|run| InterruptedSync {
                    last_step: run.last_step,
                }),
            },
        };

        if reset.interrupted_sync.is_some() {
            warn!(target: targets::FLOW, "Machine sync abandoned by navigation");
        }
        if from != FlowStage::Idle {
            info!(target: targets::FLOW, from = %from, "Flow reset");
        }

        reset
    }

    fn sync_run(&self) -> Option<SyncRun> {
        match self.state {
            FlowState::CodeReady { sync, .. } => sync,
            _ => None,
        }
    }

    fn current_job(&self) -> &Job {
        match &self.state {
            FlowState::Result { job } | FlowState::CodeReady { job, .. } => job,
            _ => unreachable!("current_job called without a job"),
        }
    }

    fn require_idle(&self, action: FlowAction) -> Result<(), Error> {
        match self.state {
            FlowState::Idle => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: FlowAction) -> Error {
        Self::rejected(self.stage(), action)
    }

    fn rejected(from: FlowStage, action: FlowAction) -> Error {
        debug!(target: targets::FLOW, from = %from, action = %action, "Rejected transition");
        Error::InvalidTransition { from, action }
    }

    fn stale(action: FlowAction) -> Error {
        debug!(target: targets::FLOW, action = %action, "Ignored stale ticket");
        Error::StaleTicket { action }
    }

    fn next_ticket(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn next_job_id(&mut self) -> JobId {
        self.jobs_created += 1;
        JobId::from_sequence(self.jobs_created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MockAnalyzer;
    use crate::catalog::{DesignCatalog, DesignId};
    use crate::sync::{SyncEvent, SyncProfile, SyncTask};

    fn run_paused<T>(future: impl std::future::Future<Output = T>) -> T {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("tokio runtime");
        runtime.block_on(future)
    }

    fn whistle() -> Design {
        DesignCatalog::default()
            .find(DesignId(1))
            .expect("whistle")
            .clone()
    }

    fn flow_at_code_ready() -> JobFlow {
        let mut flow = JobFlow::new();
        flow.select_preset(&whistle()).expect("select");
        flow.confirm().expect("confirm");
        flow
    }

    #[test]
    fn preset_skips_analysis() {
        let mut flow = JobFlow::new();
        let job = flow.select_preset(&whistle()).expect("select").clone();

        assert_eq!(flow.stage(), FlowStage::Result);
        assert_eq!(job.bottles_required(), 1);
        assert_eq!(job.label(), "Whistle");
    }

    #[test]
    fn upload_analyses_then_shows_result() {
        let mut flow = JobFlow::new();
        let ticket = flow.begin_upload().expect("upload");
        assert_eq!(flow.stage(), FlowStage::Analyzing);
        assert!(flow.job().is_none());

        let report = run_paused(MockAnalyzer::default().analyze()).expect("report");
        let job = flow.finish_analysis(ticket, &report).expect("finish").clone();

        assert_eq!(flow.stage(), FlowStage::Result);
        assert!(job.source().is_upload());
        assert!(job.label().ends_with(".stl"));
        assert_eq!(job.bottles_required(), 4);
    }

    #[test]
    fn confirm_generates_deposit_code() {
        let mut flow = JobFlow::new();
        flow.select_preset(&whistle()).expect("select");
        let code = flow.confirm().expect("confirm");

        assert_eq!(code.payload().bottles_required, 1);
        assert_eq!(code.payload().job_id, "JOB-000001");
        assert_eq!(flow.stage(), FlowStage::CodeReady);
    }

    #[test]
    fn unrenderable_code_keeps_job_summary() {
        let mut flow = JobFlow::new();
        let design = Design::new(9, "X".repeat(4_000), 1, "assets/none.png", 12.0);
        flow.select_preset(&design).expect("select");

        let error = flow.confirm().expect_err("over QR capacity");
        assert!(matches!(error, Error::QrEncode { .. }));
        assert_eq!(flow.stage(), FlowStage::Result);
        assert!(flow.deposit_code().is_none());
        assert!(flow.start_sync().is_err());
    }

    #[test]
    fn sync_completes_and_resets_to_idle() {
        let mut flow = flow_at_code_ready();
        let ticket = flow.start_sync().expect("start");

        let events = run_paused(async {
            let mut task = SyncTask::spawn(&SyncProfile::three_stage());
            let mut events = Vec::new();
            while let Some(event) = task.next_event().await {
                events.push(event);
            }
            events
        });

        let mut previous = None;
        for event in events {
            match event {
                SyncEvent::Stage(step) => {
                    assert!(previous.map_or(true, |index| step.index > index));
                    flow.record_sync_step(ticket, step.index).expect("record");
                    assert_eq!(flow.sync_step(), Some(step.index));
                    previous = Some(step.index);
                }
                SyncEvent::Completed(_) => {
                    let job = flow.complete_sync(ticket).expect("complete");
                    assert_eq!(job.bottles_required(), 1);
                }
                SyncEvent::Interrupted { .. } => panic!("unexpected interruption"),
            }
        }

        assert_eq!(previous, Some(2));
        assert_eq!(flow.stage(), FlowStage::Idle);
        assert!(flow.job().is_none());
    }

    #[test]
    fn illegal_transitions_leave_state_unchanged() {
        let mut flow = JobFlow::new();
        let error = flow.confirm().expect_err("confirm from idle");
        assert!(matches!(
            error,
            Error::InvalidTransition {
                from: FlowStage::Idle,
                action: FlowAction::Confirm
            }
        ));
        assert!(flow.start_sync().is_err());
        assert_eq!(flow.stage(), FlowStage::Idle);

        flow.select_preset(&whistle()).expect("select");
        assert!(flow.begin_upload().is_err());
        assert!(flow.select_preset(&whistle()).is_err());
        assert_eq!(flow.stage(), FlowStage::Result);

        flow.confirm().expect("confirm");
        flow.start_sync().expect("start");
        let error = flow.start_sync().expect_err("already syncing");
        assert!(matches!(error, Error::InvalidTransition { .. }));
        assert_eq!(flow.stage(), FlowStage::CodeReady);
    }

    #[test]
    fn late_analysis_after_back_is_ignored() {
        let mut flow = JobFlow::new();
        let ticket = flow.begin_upload().expect("upload");
        flow.back();

        let report = run_paused(MockAnalyzer::default().analyze()).expect("report");
        let error = flow.finish_analysis(ticket, &report).expect_err("stale");
        assert!(matches!(error, Error::StaleTicket { .. }));
        assert_eq!(flow.stage(), FlowStage::Idle);

        let fresh = flow.begin_upload().expect("upload again");
        assert_eq!(flow.analysis_ticket(), Some(fresh));
        assert_ne!(fresh, ticket);
        assert!(flow.finish_analysis(ticket, &report).is_err());
        flow.finish_analysis(fresh, &report).expect("fresh ticket");
        assert_eq!(flow.stage(), FlowStage::Result);
    }

    #[test]
    fn back_mid_sync_reports_interruption() {
        let mut flow = flow_at_code_ready();
        let ticket = flow.start_sync().expect("start");
        flow.record_sync_step(ticket, 1).expect("record");

        let reset = flow.back();
        assert_eq!(reset.from, FlowStage::CodeReady);
        assert_eq!(reset.job.map(|job| job.bottles_required()), Some(1));
        let interrupted = reset.interrupted_sync.expect("interrupted");
        assert_eq!(interrupted.last_step, Some(1));
        assert!(matches!(
            interrupted.into_error(),
            Error::SyncInterrupted { last_step: Some(1) }
        ));

        assert!(flow.complete_sync(ticket).is_err());
        assert!(flow.record_sync_step(ticket, 2).is_err());
        assert_eq!(flow.stage(), FlowStage::Idle);
    }

    #[test]
    fn back_from_idle_is_harmless() {
        let mut flow = JobFlow::new();
        let reset = flow.back();
        assert_eq!(reset.from, FlowStage::Idle);
        assert!(reset.job.is_none());
        assert!(reset.interrupted_sync.is_none());
    }

    #[test]
    fn job_ids_are_sequential() {
        let mut flow = JobFlow::new();
        flow.select_preset(&whistle()).expect("select");
        flow.back();
        let job = flow.select_preset(&whistle()).expect("select again");
        assert_eq!(job.id().to_string(), "JOB-000002");
    }
}
