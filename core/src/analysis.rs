use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::material::{self, MaterialEstimate};
use crate::{targets, Error};

pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockUpload {
    pub file_name: String,
    pub volume_cm3: f64,
}

impl Default for MockUpload {
    fn default() -> Self {
        Self {
            file_name: "Custom_Gear_v4.stl".to_string(),
            volume_cm3: 34.78,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub file_name: String,
    pub estimate: MaterialEstimate,
}

/// Stand-in for slicing an uploaded model: waits, then reports a fixed volume.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    upload: MockUpload,
    delay: Duration,
}

impl MockAnalyzer {
    pub fn new(upload: MockUpload, delay: Duration) -> Self {
        Self { upload, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn analyze(self) -> Result<AnalysisReport, Error> {
        debug!(
            target: targets::ANALYSIS,
            file = %self.upload.file_name,
            delay_ms = self.delay.as_millis() as u64,
            "Analysis started"
        );

        tokio::time::sleep(self.delay).await;

        let estimate = material::estimate(self.upload.volume_cm3)?;
        info!(
            target: targets::ANALYSIS,
            file = %self.upload.file_name,
            weight_grams = estimate.weight_grams,
            bottles = estimate.bottles_required,
            "Analysis finished"
        );

        Ok(AnalysisReport {
            file_name: self.upload.file_name,
            estimate,
        })
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new(MockUpload::default(), DEFAULT_ANALYSIS_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn run_paused<T>(future: impl std::future::Future<Output = T>) -> T {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("tokio runtime");
        runtime.block_on(future)
    }

    #[test]
    fn reports_after_fixed_delay() {
        let (report, elapsed) = run_paused(async {
            let started = Instant::now();
            let report = MockAnalyzer::default().analyze().await;
            (report, started.elapsed())
        });

        let report = report.expect("report");
        assert!(elapsed >= DEFAULT_ANALYSIS_DELAY);
        assert!(elapsed < DEFAULT_ANALYSIS_DELAY + Duration::from_millis(5));
        assert_eq!(report.file_name, "Custom_Gear_v4.stl");
        assert_eq!(report.estimate.bottles_required, 4);
        assert!((report.estimate.weight_grams - 48.0).abs() < 0.01);
    }

    #[test]
    fn invalid_mock_volume_fails() {
        let analyzer = MockAnalyzer::new(
            MockUpload {
                file_name: "empty.stl".to_string(),
                volume_cm3: 0.0,
            },
            Duration::from_millis(10),
        );

        let error = run_paused(analyzer.analyze()).expect_err("invalid volume");
        assert!(matches!(error, Error::InvalidVolume { .. }));
    }
}
