use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use ron::ser::{to_string_pretty, PrettyConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{MockAnalyzer, MockUpload, DEFAULT_ANALYSIS_DELAY};
use crate::catalog::{Design, DesignCatalog};
use crate::model::ImpactStats;
use crate::sync::SyncProfile;
use crate::{targets, Error, StorageAction};

pub const DEFAULT_CONFIG_PATH: &str = "kiosk.ron";

/// Everything that differs between kiosk layouts: timing, sync stages,
/// catalog contents and the dashboard seed figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub analysis_delay_ms: u64,
    pub upload: MockUpload,
    pub sync: SyncProfile,
    pub catalog: Vec<Design>,
    pub impact: ImpactStats,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            analysis_delay_ms: DEFAULT_ANALYSIS_DELAY.as_millis() as u64,
            upload: MockUpload::default(),
            sync: SyncProfile::default(),
            catalog: DesignCatalog::default().designs().to_vec(),
            impact: ImpactStats::default(),
        }
    }
}

impl KioskConfig {
    pub fn four_stage() -> Self {
        Self {
            sync: SyncProfile::four_stage(),
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> DesignCatalog {
        DesignCatalog::new(self.catalog.clone())
    }

    pub fn analyzer(&self) -> MockAnalyzer {
        MockAnalyzer::new(
            self.upload.clone(),
            Duration::from_millis(self.analysis_delay_ms),
        )
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.sync.validate()?;
        if !self.upload.volume_cm3.is_finite() || self.upload.volume_cm3 <= 0.0 {
            return Err(Error::InvalidVolume {
                volume_cm3: self.upload.volume_cm3,
            });
        }
        self.catalog().audit();
        Ok(())
    }

    pub fn from_ron(contents: &str) -> Result<Self, Error> {
        let config: KioskConfig = ron::from_str(contents).map_err(|source| Error::RonDecode {
            action: StorageAction::Load,
            path: None,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, Error> {
        to_string_pretty(self, PrettyConfig::new()).map_err(|source| Error::RonEncode {
            action: StorageAction::Save,
            path: None,
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let path_text = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| Error::StorageIo {
            action: StorageAction::Load,
            path: Some(path_text.clone()),
            source,
        })?;

        let config = Self::from_ron(&contents).map_err(|error| match error {
            Error::RonDecode { action, source, .. } => Error::RonDecode {
                action,
                path: Some(path_text.clone()),
                source,
            },
            other => other,
        })?;

        info!(
            target: targets::CONFIG,
            path = %path_text,
            stages = config.sync.stage_count(),
            designs = config.catalog.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Falls back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Error> {
        match Self::load(path.as_ref()) {
            Err(Error::StorageIo { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                warn!(
                    target: targets::CONFIG,
                    path = %path.as_ref().display(),
                    "Configuration file not found, using defaults"
                );
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let path_text = path.display().to_string();
        let contents = self.to_ron().map_err(|error| match error {
            Error::RonEncode { action, source, .. } => Error::RonEncode {
                action,
                path: Some(path_text.clone()),
                source,
            },
            other => other,
        })?;
        fs::write(path, contents).map_err(|source| Error::StorageIo {
            action: StorageAction::Save,
            path: Some(path_text.clone()),
            source,
        })?;
        info!(target: targets::CONFIG, path = %path_text, "Configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::StageMarker;

    #[test]
    fn ron_roundtrip_keeps_variant() {
        let config = KioskConfig::four_stage();
        let ron = config.to_ron().expect("serialize RON");
        let decoded = KioskConfig::from_ron(&ron).expect("deserialize RON");

        assert_eq!(decoded, config);
        assert_eq!(decoded.sync.stage_count(), 4);
        assert_eq!(decoded.sync.stages[3].marker, StageMarker::Success);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config = KioskConfig::from_ron("(analysis_delay_ms: 500)").expect("partial config");
        assert_eq!(config.analysis_delay_ms, 500);
        assert_eq!(config.catalog.len(), 6);
        assert_eq!(config.analyzer().delay(), Duration::from_millis(500));
    }

    #[test]
    fn invalid_sync_profile_is_rejected() {
        let mut config = KioskConfig::default();
        config.sync.close_after_ms = 0;
        let ron = config.to_ron().expect("serialize RON");

        let error = KioskConfig::from_ron(&ron).expect_err("invalid profile");
        assert!(matches!(error, Error::InvalidSyncProfile { .. }));
    }

    #[test]
    fn malformed_ron_reports_decode_error() {
        let error = KioskConfig::from_ron("(analysis_delay_ms: \"soon\")").expect_err("bad RON");
        assert!(matches!(error, Error::RonDecode { .. }));
        assert_eq!(error.user_summary(), "Failed to load configuration data.");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("bottleprint-missing-config-test.ron");
        let _ = fs::remove_file(&path);

        let config = KioskConfig::load_or_default(&path).expect("defaults");
        assert_eq!(config, KioskConfig::default());

        let error = KioskConfig::load(&path).expect_err("missing file");
        assert!(matches!(error, Error::StorageIo { .. }));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "bottleprint-config-test-{}.ron",
            std::process::id()
        ));
        let config = KioskConfig::four_stage();

        config.save(&path).expect("save");
        let loaded = KioskConfig::load(&path).expect("load");
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_error_names_path() {
        let path = std::env::temp_dir().join(format!(
            "bottleprint-config-bad-{}.ron",
            std::process::id()
        ));
        fs::write(&path, "(sync: [").expect("write");

        let error = KioskConfig::load(&path).expect_err("malformed");
        let _ = fs::remove_file(&path);

        let expected = path.display().to_string();
        assert!(matches!(error, Error::RonDecode { path: Some(ref p), .. } if *p == expected));
    }
}
