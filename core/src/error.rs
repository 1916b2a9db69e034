use std::fmt;

use crate::catalog::DesignId;
use crate::flow::{FlowAction, FlowStage};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid volume: {volume_cm3}")]
    InvalidVolume { volume_cm3: f64 },
    #[error("Invalid weight: {weight_grams}")]
    InvalidWeight { weight_grams: f64 },
    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: FlowStage, action: FlowAction },
    #[error("Stale ticket for {action}")]
    StaleTicket { action: FlowAction },
    #[error("Machine sync interrupted")]
    SyncInterrupted { last_step: Option<usize> },
    #[error("Invalid sync profile")]
    InvalidSyncProfile { details: String },
    #[error("Unknown design: {id}")]
    UnknownDesign { id: DesignId },
    #[error("Deposit payload encode error")]
    PayloadEncode {
        #[source]
        source: serde_json::Error,
    },
    #[error("Deposit payload decode error")]
    PayloadDecode {
        #[source]
        source: serde_json::Error,
    },
    #[error("Deposit code render error")]
    QrEncode { details: String },
    #[error("RON {action} error")]
    RonDecode {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("RON {action} error")]
    RonEncode {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: ron::Error,
    },
    #[error("Storage {action} error")]
    StorageIo {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAction {
    Load,
    Save,
}

impl fmt::Display for StorageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageAction::Load => f.write_str("load"),
            StorageAction::Save => f.write_str("save"),
        }
    }
}

impl Error {
    pub fn user_summary(&self) -> String {
        match self {
            Error::InvalidVolume { .. } => "Model volume must be greater than zero.".to_string(),
            Error::InvalidWeight { .. } => "Model weight must be greater than zero.".to_string(),
            Error::InvalidTransition { from, action } => {
                format!("Cannot {action} while {from}.")
            }
            Error::StaleTicket { .. } => "That request was cancelled.".to_string(),
            Error::SyncInterrupted { .. } => "Machine sync cancelled.".to_string(),
            Error::InvalidSyncProfile { .. } => "Machine sync settings are invalid.".to_string(),
            Error::UnknownDesign { id } => format!("Design {id} is not in the catalog."),
            Error::PayloadEncode { .. } => "Failed to build the deposit code.".to_string(),
            Error::PayloadDecode { .. } => "Deposit code could not be read.".to_string(),
            Error::QrEncode { .. } => "Failed to render the deposit code.".to_string(),
            Error::RonDecode { action, .. } | Error::RonEncode { action, .. } => {
                format!("Failed to {action} configuration data.")
            }
            Error::StorageIo { action, .. } => format!("Failed to {action} configuration file."),
        }
    }

    pub fn technical_detail(&self) -> String {
        match self {
            Error::InvalidVolume { volume_cm3 } => {
                format!("Volume {volume_cm3} cm3 rejected; must be finite and > 0.")
            }
            Error::InvalidWeight { weight_grams } => {
                format!("Weight {weight_grams} g rejected; must be finite and > 0.")
            }
            Error::InvalidTransition { from, action } => {
                format!("Illegal flow transition: {action} from {from}.")
            }
            Error::StaleTicket { action } => {
                format!("Ignored {action} for a ticket issued before the last reset.")
            }
            Error::SyncInterrupted { last_step } => match last_step {
                Some(step) => format!("Sync interrupted after stage {}.", step + 1),
                None => "Sync interrupted before the first stage.".to_string(),
            },
            Error::InvalidSyncProfile { details } => format!("Invalid sync profile: {details}"),
            Error::UnknownDesign { id } => format!("No catalog entry with id {id}."),
            Error::PayloadEncode { source } => format!("JSON encode failed: {source}"),
            Error::PayloadDecode { source } => format!("JSON decode failed: {source}"),
            Error::QrEncode { details } => format!("QR encode failed: {details}"),
            Error::RonDecode {
                action,
                path,
                source,
            } => {
                let path = path
                    .as_ref()
                    .map(|value| format!(" path={value}."))
                    .unwrap_or_default();
                format!("RON {action} error.{path} {source}")
            }
            Error::RonEncode {
                action,
                path,
                source,
            } => {
                let path = path
                    .as_ref()
                    .map(|value| format!(" path={value}."))
                    .unwrap_or_default();
                format!("RON {action} error.{path} {source}")
            }
            Error::StorageIo {
                action,
                path,
                source,
            } => {
                let path = path
                    .as_ref()
                    .map(|value| format!(" path={value}."))
                    .unwrap_or_default();
                format!("Storage {action} error.{path} {source}")
            }
        }
    }
}
