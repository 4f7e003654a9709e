//! The per-coverage set of section schemas that make up a plant record
//!
//! Each schema renders one step of the plant workflow. All of them write into
//! a single shared form data tree, each under its own `sectionKey`, which is
//! what lets a condition in one step refer to an answer given in another.

use serde::{Deserialize, Serialize};

use super::section::FormSchema;

/// All section schemas configured for one coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSchemas {
    /// Coverage the schemas belong to
    pub coverage_id:                  u64,
    /// Step 1: general information
    pub section_general_info:         FormSchema,
    /// Step 2: market and offtakers
    pub section_market_and_offtakers: FormSchema,
    /// Step 3: electricity and water
    pub section_electricity_water:    FormSchema,
    /// Step 4: greenhouse gas reduction
    pub section_ghg_reduction:        FormSchema,
    /// Step 5: traceability
    pub section_traceability:         FormSchema,
    /// Step 6: certifications
    pub section_certifications:       FormSchema,
}

impl PlantSchemas {
    /// Six empty schemas with their conventional root keys
    pub fn empty(coverage_id: u64) -> Self {
        Self {
            coverage_id,
            section_general_info: FormSchema::empty("generalInfo", "General Info"),
            section_market_and_offtakers: FormSchema::empty(
                "marketAndOfftakers",
                "Market and Offtakers",
            ),
            section_electricity_water: FormSchema::empty(
                "electricityWater",
                "Electricity and Water",
            ),
            section_ghg_reduction: FormSchema::empty("ghgReduction", "GHG Reduction"),
            section_traceability: FormSchema::empty("traceability", "Traceability"),
            section_certifications: FormSchema::empty("certifications", "Certifications"),
        }
    }

    /// Schemas in workflow step order
    pub fn steps(&self) -> [&FormSchema; 6] {
        [
            &self.section_general_info,
            &self.section_market_and_offtakers,
            &self.section_electricity_water,
            &self.section_ghg_reduction,
            &self.section_traceability,
            &self.section_certifications,
        ]
    }

    /// Schema owning the given root key
    pub fn by_section_key(&self, section_key: &str) -> Option<&FormSchema> {
        self.steps()
            .into_iter()
            .find(|schema| schema.section_key == section_key)
    }
}
