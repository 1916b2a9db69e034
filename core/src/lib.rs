pub mod analysis;
pub mod catalog;
pub mod config;
pub mod deposit;
pub mod error;
pub mod flow;
pub mod material;
pub mod model;
pub mod sync;
pub mod targets;

pub use analysis::{AnalysisReport, MockAnalyzer, MockUpload, DEFAULT_ANALYSIS_DELAY};
pub use catalog::{CatalogWarning, Design, DesignCatalog, DesignId};
pub use config::{KioskConfig, DEFAULT_CONFIG_PATH};
pub use deposit::{DepositCode, DepositPayload, QrMatrix};
pub use error::{Error, StorageAction};
pub use flow::{
    AnalysisTicket, FlowAction, FlowStage, InterruptedSync, JobFlow, Reset, SyncTicket,
};
pub use material::{
    bottles_for_weight, estimate, estimate_with, MaterialEstimate, MaterialKind, MaterialProfile,
    GRAMS_PER_BOTTLE,
};
pub use model::{ImpactStats, Job, JobId, JobSource};
pub use sync::{
    Notice, ScheduledEvent, StageMarker, SyncEvent, SyncProfile, SyncStage, SyncStep, SyncTask,
};
