//! Cost estimation records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-trade cost split, present on freshly calculated estimations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCosts {
    pub flooring_cost: Option<f64>,
    pub wall_cost: Option<f64>,
    pub ceiling_cost: Option<f64>,
    pub electrical_cost: Option<f64>,
    pub plumbing_cost: Option<f64>,
    pub hvac_cost: Option<f64>,
    pub furniture_cost: Option<f64>,
    pub lighting_cost: Option<f64>,
    pub decoration_cost: Option<f64>,
}

impl CategoryCosts {
    /// Labelled categories that carry a value, in display order
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        [
            ("Flooring", self.flooring_cost),
            ("Walls", self.wall_cost),
            ("Ceiling", self.ceiling_cost),
            ("Electrical", self.electrical_cost),
            ("Plumbing", self.plumbing_cost),
            ("HVAC", self.hvac_cost),
            ("Furniture", self.furniture_cost),
            ("Lighting", self.lighting_cost),
            ("Decoration", self.decoration_cost),
        ]
        .into_iter()
        .filter_map(|(label, cost)| cost.map(|c| (label, c)))
        .collect()
    }
}

/// Cost estimation for a project
///
/// The calculate endpoint returns `estimation_id` plus the category split,
/// the lookup endpoint returns `id` plus status and validity; both parse here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Estimation {
    #[serde(alias = "estimation_id")]
    pub id: Option<i64>,
    pub project_id: Option<i64>,
    pub total_cost: f64,
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub additional_cost: f64,
    #[serde(flatten)]
    pub categories: CategoryCosts,
    pub breakdown: BTreeMap<String, Value>,
    pub assumptions: Vec<String>,
    pub status: Option<String>,
    pub valid_until: Option<String>,
}

/// Result of `POST /estimation/audit/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationAudit {
    pub expert_insight: String,
    pub risk_factors: Vec<String>,
    pub buffer_percent: f64,
    pub buffer_amount: f64,
    pub adjusted_total: f64,
}
