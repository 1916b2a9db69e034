use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::material::bottles_for_weight;
use crate::{targets, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DesignId(pub u32);

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub id: DesignId,
    pub name: String,
    pub bottles_required: u32,
    /// Reference image, relative to the asset directory.
    pub image: String,
    pub weight_grams: f64,
}

impl Design {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        bottles_required: u32,
        image: impl Into<String>,
        weight_grams: f64,
    ) -> Self {
        Self {
            id: DesignId(id),
            name: name.into(),
            bottles_required,
            image: image.into(),
            weight_grams,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogWarning {
    DuplicateId { id: DesignId },
    ZeroBottles { id: DesignId },
    InvalidWeight { id: DesignId, weight_grams: f64 },
    BottleMismatch { id: DesignId, listed: u32, computed: u32 },
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogWarning::DuplicateId { id } => write!(f, "Duplicate design id {id}"),
            CatalogWarning::ZeroBottles { id } => write!(f, "Design {id} lists zero bottles"),
            CatalogWarning::InvalidWeight { id, weight_grams } => {
                write!(f, "Design {id} has invalid weight {weight_grams} g")
            }
            CatalogWarning::BottleMismatch {
                id,
                listed,
                computed,
            } => write!(
                f,
                "Design {id} lists {listed} bottles but its weight needs {computed}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignCatalog {
    designs: Vec<Design>,
}

impl DesignCatalog {
    pub fn new(designs: Vec<Design>) -> Self {
        Self { designs }
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn find(&self, id: DesignId) -> Result<&Design, Error> {
        self.designs
            .iter()
            .find(|design| design.id == id)
            .ok_or(Error::UnknownDesign { id })
    }

    /// Checks listed bottle counts against their weights. Listed values stay
    /// authoritative; mismatches are only reported.
    pub fn audit(&self) -> Vec<CatalogWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for design in &self.designs {
            if !seen.insert(design.id) {
                warnings.push(CatalogWarning::DuplicateId { id: design.id });
            }
            if design.bottles_required == 0 {
                warnings.push(CatalogWarning::ZeroBottles { id: design.id });
            }
            match bottles_for_weight(design.weight_grams) {
                Ok(computed) if computed != design.bottles_required => {
                    warnings.push(CatalogWarning::BottleMismatch {
                        id: design.id,
                        listed: design.bottles_required,
                        computed,
                    });
                }
                Ok(_) => {}
                Err(_) => warnings.push(CatalogWarning::InvalidWeight {
                    id: design.id,
                    weight_grams: design.weight_grams,
                }),
            }
        }

        for warning in &warnings {
            warn!(target: targets::CATALOG, "{}", warning);
        }

        warnings
    }
}

impl Default for DesignCatalog {
    fn default() -> Self {
        Self::new(vec![
            Design::new(1, "Whistle", 1, "assets/whistle.png", 12.0),
            Design::new(2, "Phone Stand", 3, "assets/phone_stand.png", 34.0),
            Design::new(3, "Bag Clip", 1, "assets/clip.png", 8.0),
            Design::new(4, "Comb", 2, "assets/comb.png", 22.0),
            Design::new(5, "Carabiner", 2, "assets/carabiner.png", 18.0),
            Design::new(6, "Planter", 5, "assets/planter.png", 55.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_consistent() {
        let catalog = DesignCatalog::default();
        assert_eq!(catalog.designs().len(), 6);
        assert!(catalog.audit().is_empty());
    }

    #[test]
    fn finds_whistle() {
        let catalog = DesignCatalog::default();
        let whistle = catalog.find(DesignId(1)).expect("whistle");
        assert_eq!(whistle.name, "Whistle");
        assert_eq!(whistle.bottles_required, 1);
    }

    #[test]
    fn unknown_design_is_an_error() {
        let catalog = DesignCatalog::default();
        let error = catalog.find(DesignId(99)).expect_err("missing");
        assert!(matches!(error, Error::UnknownDesign { id } if id == DesignId(99)));
    }

    #[test]
    fn audit_reports_problems() {
        let catalog = DesignCatalog::new(vec![
            Design::new(1, "Vase", 2, "assets/vase.png", 60.0),
            Design::new(1, "Vase copy", 0, "assets/vase.png", -3.0),
        ]);

        let warnings = catalog.audit();
        assert!(warnings.contains(&CatalogWarning::BottleMismatch {
            id: DesignId(1),
            listed: 2,
            computed: 5,
        }));
        assert!(warnings.contains(&CatalogWarning::DuplicateId { id: DesignId(1) }));
        assert!(warnings.contains(&CatalogWarning::ZeroBottles { id: DesignId(1) }));
        assert!(warnings
            .iter()
            .any(|warning| matches!(warning, CatalogWarning::InvalidWeight { .. })));
    }
}
