//! Project and client records as served by the studio backend

use serde::{Deserialize, Serialize};

use crate::format::format_number;

/// A construction / fit-out project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub client_id: Option<i64>,
    /// Free-form on the backend ("villa", "Luxury Villa", ...)
    pub property_type: Option<String>,
    /// Area in square meters
    pub area: Option<f64>,
    pub location: Option<String>,
    pub status: Option<String>,
    /// Budget in AED
    pub budget: Option<f64>,
}

impl Project {
    /// One-line brief used to seed the design wizard
    ///
    /// Missing property type and location fall back to the studio's most
    /// common engagement (a luxury villa in Dubai).
    pub fn design_brief(&self) -> String {
        let property_type = self
            .property_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Luxury Villa");
        let location = self
            .location
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Dubai");

        let mut brief = String::new();
        if !self.title.is_empty() {
            brief.push_str(&self.title);
            brief.push_str(": ");
        }
        brief.push_str(&format!("{property_type} in {location}."));
        if let Some(area) = self.area {
            brief.push_str(&format!(" Area: {} sqm.", format_number(area)));
        }
        if let Some(budget) = self.budget {
            brief.push_str(&format!(" Budget: AED {}.", format_number(budget)));
        }
        brief
    }
}

/// Body for `POST /projects/`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

/// A studio client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// e.g. "commercial", "vip"
    pub segment: Option<String>,
    pub preferences: Option<String>,
    pub budget_range: Option<String>,
}
