use std::any::TypeId;

use iced::futures::future;
use iced::{Command, Subscription};

use bottleprint_core::{AnalysisTicket, MockAnalyzer, SyncEvent, SyncProfile, SyncTask, SyncTicket};

use crate::app::types::{ErrorInfo, Message};

pub(crate) fn analysis_command(ticket: AnalysisTicket, analyzer: MockAnalyzer) -> Command<Message> {
    Command::perform(
        async move {
            analyzer
                .analyze()
                .await
                .map_err(|error| ErrorInfo::from(&error))
        },
        move |result| Message::AnalysisFinished { ticket, result },
    )
}

enum SyncFeed {
    Ready(SyncProfile),
    Running(SyncTask),
    Finished,
}

struct SyncFeedId;

/// One subscription per sync run. Removing it drops the running
/// [`SyncTask`], which aborts the schedule.
pub(crate) fn sync_subscription(ticket: SyncTicket, profile: SyncProfile) -> Subscription<Message> {
    iced::subscription::unfold(
        (TypeId::of::<SyncFeedId>(), ticket.value()),
        SyncFeed::Ready(profile),
        move |feed| next_sync_message(ticket, feed),
    )
}

async fn next_sync_message(ticket: SyncTicket, feed: SyncFeed) -> (Message, SyncFeed) {
    match feed {
        SyncFeed::Ready(profile) => next_from_task(ticket, SyncTask::spawn(&profile)).await,
        SyncFeed::Running(task) => next_from_task(ticket, task).await,
        SyncFeed::Finished => future::pending().await,
    }
}

async fn next_from_task(ticket: SyncTicket, mut task: SyncTask) -> (Message, SyncFeed) {
    match task.next_event().await {
        Some(event) => {
            let feed = if event.is_final() {
                SyncFeed::Finished
            } else {
                SyncFeed::Running(task)
            };
            (Message::SyncProgress { ticket, event }, feed)
        }
        None => (
            Message::SyncProgress {
                ticket,
                event: SyncEvent::Interrupted { last_step: None },
            },
            SyncFeed::Finished,
        ),
    }
}
