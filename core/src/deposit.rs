use qrcode::QrCode;
use serde::{Deserialize, Serialize};

use crate::material::MaterialKind;
use crate::model::Job;
use crate::Error;

const QUIET_ZONE: usize = 4;

/// Payload a kiosk scanner reads to open intake for a job.
///
/// `jobId` and `bottlesRequired` are always present; the remaining fields are
/// descriptive and skipped when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    pub job_id: String,
    pub bottles_required: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_id: Option<u32>,
}

impl DepositPayload {
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id().to_string(),
            bottles_required: job.bottles_required(),
            label: Some(job.label().to_string()),
            weight_grams: Some(job.weight_grams()),
            material: Some(job.material()),
            design_id: job.design_id().map(|id| id.0),
        }
    }

    pub fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|source| Error::PayloadEncode { source })
    }

    pub fn decode(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|source| Error::PayloadDecode { source })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepositCode {
    payload: DepositPayload,
    text: String,
    matrix: QrMatrix,
}

impl DepositCode {
    pub fn for_job(job: &Job) -> Result<Self, Error> {
        let payload = DepositPayload::from_job(job);
        let text = payload.encode()?;
        let matrix = QrMatrix::encode(text.as_bytes())?;
        Ok(Self {
            payload,
            text,
            matrix,
        })
    }

    pub fn payload(&self) -> &DepositPayload {
        &self.payload
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn qr_matrix(&self) -> &QrMatrix {
        &self.matrix
    }
}

/// Square grid of QR modules, `true` for dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(data: &[u8]) -> Result<Self, Error> {
        let code = QrCode::new(data).map_err(|error| Error::QrEncode {
            details: error.to_string(),
        })?;
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();
        Ok(Self { width, modules })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Renders two module rows per text line with half-block glyphs,
    /// surrounded by a light quiet zone.
    pub fn to_text(&self) -> String {
        let size = self.width + QUIET_ZONE * 2;
        let dark = |x: usize, y: usize| {
            x >= QUIET_ZONE
                && y >= QUIET_ZONE
                && self.is_dark(x - QUIET_ZONE, y - QUIET_ZONE)
        };

        let mut output = String::new();
        for y in (0..size).step_by(2) {
            for x in 0..size {
                let glyph = match (dark(x, y), dark(x, y + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                };
                output.push(glyph);
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Design;
    use crate::model::JobId;

    fn whistle_job() -> Job {
        let design = Design::new(1, "Whistle", 1, "assets/whistle.png", 12.0);
        Job::from_design(JobId::from_sequence(3), &design)
    }

    #[test]
    fn payload_uses_camel_case_schema() {
        let code = DepositCode::for_job(&whistle_job()).expect("code");
        let value: serde_json::Value = serde_json::from_str(code.text()).expect("json");

        assert_eq!(value["jobId"], "JOB-000003");
        assert_eq!(value["bottlesRequired"], 1);
        assert_eq!(value["label"], "Whistle");
        assert_eq!(value["material"], "rPET");
        assert_eq!(value["designId"], 1);
    }

    #[test]
    fn minimal_payload_decodes() {
        let payload =
            DepositPayload::decode(r#"{"jobId":"JOB-000010","bottlesRequired":4}"#).expect("decode");
        assert_eq!(payload.job_id, "JOB-000010");
        assert_eq!(payload.bottles_required, 4);
        assert_eq!(payload.label, None);

        let encoded = payload.encode().expect("encode");
        assert_eq!(encoded, r#"{"jobId":"JOB-000010","bottlesRequired":4}"#);
    }

    #[test]
    fn payload_without_bottles_is_rejected() {
        let error = DepositPayload::decode(r#"{"jobId":"JOB-1"}"#).expect_err("missing field");
        assert!(matches!(error, Error::PayloadDecode { .. }));
    }

    #[test]
    fn qr_matrix_has_finder_patterns() {
        let code = DepositCode::for_job(&whistle_job()).expect("code");
        let matrix = code.qr_matrix();

        assert!(matrix.width() >= 21);
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(matrix.width() - 1, 0));
        assert!(matrix.is_dark(0, matrix.width() - 1));
        assert!(!matrix.is_dark(matrix.width(), 0));

        let text = matrix.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), (matrix.width() + QUIET_ZONE * 2).div_ceil(2));
        assert!(lines[0].chars().all(|glyph| glyph == ' '));
        assert!(lines[1].chars().all(|glyph| glyph == ' '));
    }

    #[test]
    fn oversized_payload_fails_to_encode() {
        let design = Design::new(9, "X".repeat(4_000), 1, "assets/none.png", 12.0);
        let job = Job::from_design(JobId::from_sequence(1), &design);

        let error = DepositCode::for_job(&job).expect_err("over QR capacity");
        assert!(matches!(error, Error::QrEncode { .. }));
    }
}
