use bottleprint_core::{
    AnalysisReport, AnalysisTicket, DesignId, Error, KioskConfig, Notice, SyncEvent, SyncTicket,
};

use crate::logging::{LogLevel, LogStore, ReloadHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Print,
    Diagnostics,
}

#[derive(Debug, Clone)]
pub enum Message {
    LogTick,
    LogLevelChanged(LogLevel),
    ToggleTarget(String, bool),
    CopyDiagnostics,
    SelectTab(Tab),
    SelectDesign(DesignId),
    UploadCustom,
    AnalysisFinished {
        ticket: AnalysisTicket,
        result: Result<AnalysisReport, ErrorInfo>,
    },
    Back,
    Confirm,
    StartSync,
    SyncProgress {
        ticket: SyncTicket,
        event: SyncEvent,
    },
    DismissBanner,
}

#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub(crate) summary: String,
    pub(crate) detail: String,
}

impl From<&Error> for ErrorInfo {
    fn from(error: &Error) -> Self {
        Self {
            summary: error.user_summary(),
            detail: error.technical_detail(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BannerKind {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub(crate) struct Banner {
    pub(crate) kind: BannerKind,
    pub(crate) title: String,
    pub(crate) body: String,
}

impl Banner {
    pub(crate) fn success(notice: Notice) -> Self {
        Self {
            kind: BannerKind::Success,
            title: notice.title,
            body: notice.body,
        }
    }

    pub(crate) fn failure(info: &ErrorInfo) -> Self {
        Self {
            kind: BannerKind::Failure,
            title: "Something went wrong".to_string(),
            body: info.summary.clone(),
        }
    }

    pub(crate) fn cancelled(info: &ErrorInfo) -> Self {
        Self {
            kind: BannerKind::Failure,
            title: "Sync cancelled".to_string(),
            body: info.detail.clone(),
        }
    }
}

pub struct Flags {
    pub log_store: LogStore,
    pub reload_handle: ReloadHandle,
    pub config: KioskConfig,
}
