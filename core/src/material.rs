use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{targets, Error};

/// Grams of printable filament recovered from one standard bottle.
pub const GRAMS_PER_BOTTLE: f64 = 12.0;

const RATIO_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    #[default]
    #[serde(rename = "rPET")]
    RPet,
}

impl MaterialKind {
    pub fn label(self) -> &'static str {
        match self {
            MaterialKind::RPet => "rPET",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MaterialKind::RPet => "rPET (Recycled)",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProfile {
    pub kind: MaterialKind,
    pub density_g_per_cm3: f64,
}

const PROFILES: [MaterialProfile; 1] = [MaterialProfile {
    kind: MaterialKind::RPet,
    density_g_per_cm3: 1.38,
}];

impl MaterialProfile {
    pub fn lookup(kind: MaterialKind) -> MaterialProfile {
        PROFILES
            .iter()
            .copied()
            .find(|profile| profile.kind == kind)
            .unwrap_or(PROFILES[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialEstimate {
    pub material: MaterialKind,
    pub volume_cm3: f64,
    pub weight_grams: f64,
    pub bottles_required: u32,
}

/// Estimates the rPET weight and bottle deposit for a model volume.
pub fn estimate(volume_cm3: f64) -> Result<MaterialEstimate, Error> {
    estimate_with(MaterialProfile::lookup(MaterialKind::RPet), volume_cm3)
}

pub fn estimate_with(profile: MaterialProfile, volume_cm3: f64) -> Result<MaterialEstimate, Error> {
    if !volume_cm3.is_finite() || volume_cm3 <= 0.0 {
        return Err(Error::InvalidVolume { volume_cm3 });
    }

    let weight_grams = volume_cm3 * profile.density_g_per_cm3;
    let bottles_required = bottles_for_weight(weight_grams)
        .map_err(|_| Error::InvalidVolume { volume_cm3 })?;

    trace!(
        target: targets::CALCULATOR,
        volume_cm3,
        weight_grams,
        bottles_required,
        "Material estimate"
    );

    Ok(MaterialEstimate {
        material: profile.kind,
        volume_cm3,
        weight_grams,
        bottles_required,
    })
}

/// Bottle count for a weight, rounded up. Never under-estimates the deposit.
pub fn bottles_for_weight(weight_grams: f64) -> Result<u32, Error> {
    if !weight_grams.is_finite() || weight_grams <= 0.0 {
        return Err(Error::InvalidWeight { weight_grams });
    }

    let ratio = weight_grams / GRAMS_PER_BOTTLE;
    if ratio > f64::from(u32::MAX) {
        return Err(Error::InvalidWeight { weight_grams });
    }
    let nearest = ratio.round();
    let bottles = if (ratio - nearest).abs() < RATIO_TOLERANCE {
        nearest
    } else {
        ratio.ceil()
    };

    Ok(bottles.max(1.0) as u32)
}
