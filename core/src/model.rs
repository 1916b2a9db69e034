use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisReport;
use crate::catalog::{Design, DesignId};
use crate::material::MaterialKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("JOB-{sequence:06}"))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    Preset { design_id: DesignId },
    Upload { file_name: String, volume_cm3: f64 },
}

impl JobSource {
    pub fn is_upload(&self) -> bool {
        matches!(self, JobSource::Upload { .. })
    }
}

/// One print/deposit transaction. Fields are private so a job cannot change
/// after the flow creates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: JobId,
    source: JobSource,
    label: String,
    weight_grams: f64,
    bottles_required: u32,
    material: MaterialKind,
}

impl Job {
    pub fn from_design(id: JobId, design: &Design) -> Self {
        Self {
            id,
            source: JobSource::Preset {
                design_id: design.id,
            },
            label: design.name.clone(),
            weight_grams: design.weight_grams,
            bottles_required: design.bottles_required,
            material: MaterialKind::RPet,
        }
    }

    pub fn from_report(id: JobId, report: &AnalysisReport) -> Self {
        Self {
            id,
            source: JobSource::Upload {
                file_name: report.file_name.clone(),
                volume_cm3: report.estimate.volume_cm3,
            },
            label: report.file_name.clone(),
            weight_grams: report.estimate.weight_grams,
            bottles_required: report.estimate.bottles_required,
            material: report.estimate.material,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn source(&self) -> &JobSource {
        &self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weight_grams(&self) -> f64 {
        self.weight_grams
    }

    pub fn bottles_required(&self) -> u32 {
        self.bottles_required
    }

    pub fn material(&self) -> MaterialKind {
        self.material
    }

    pub fn design_id(&self) -> Option<DesignId> {
        match self.source {
            JobSource::Preset { design_id } => Some(design_id),
            JobSource::Upload { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactStats {
    pub eco_credits: u32,
    pub bottles: u32,
    pub co2_saved_kg: f64,
    pub prints: u32,
}

impl Default for ImpactStats {
    fn default() -> Self {
        Self {
            eco_credits: 1_250,
            bottles: 42,
            co2_saved_kg: 3.5,
            prints: 8,
        }
    }
}

impl ImpactStats {
    /// In-memory only; stats are seeded from config on every start.
    pub fn record_print(&mut self, job: &Job) {
        self.bottles = self.bottles.saturating_add(job.bottles_required());
        self.prints = self.prints.saturating_add(1);
    }
}
