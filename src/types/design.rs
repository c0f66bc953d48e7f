//! Design generation types: wizard presets, request payloads and results

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Error returned when a preset id does not match any known option
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownPreset {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! preset_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => ($id:literal, $label:literal, $desc:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl $name {
            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            /// Identifier sent to the backend
            pub fn id(&self) -> &'static str {
                match self {
                    $($name::$variant => $id,)+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $($name::$variant => $desc,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }

        impl FromStr for $name {
            type Err = UnknownPreset;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                $name::all()
                    .iter()
                    .copied()
                    .find(|p| p.id().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| UnknownPreset {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $name::all()
                            .iter()
                            .map(|p| p.id())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

preset_enum! {
    /// Kind of property being designed
    PropertyType, "property type" {
        Villa => ("villa", "Luxury Villa", "Private residence with multiple living areas"),
        Apartment => ("apartment", "Penthouse & Apt", "Apartment or penthouse unit"),
        Office => ("office", "Corporate Office", "Workspace for a company"),
        Retail => ("retail", "Retail & Showroom", "Shop floor or showroom"),
    }
}

preset_enum! {
    /// Aesthetic direction for the concept
    DesignStyle, "design style" {
        ModernLuxury => ("modern_luxury", "Modern Luxury", "Clean lines, marble, gold accents"),
        Minimalist => ("minimalist", "Minimalist", "Simplicity, functionality, light tones"),
        ArabicModern => ("arabic_modern", "Arabic Modern", "Traditional patterns with modern twist"),
        Industrial => ("industrial", "Industrial Chic", "Raw materials, exposed structures"),
        Neoclassic => ("neoclassic", "Neoclassic", "Timeless elegance and symmetry"),
        Cyberpunk => ("cyberpunk", "Cyberpunk", "Neon lights, dark tech aesthetics"),
    }
}

preset_enum! {
    /// Fit-out budget tier
    BudgetRange, "budget range" {
        Economy => ("Economy", "Economy Fit-out", "Cost-conscious finishes"),
        Standard => ("Standard", "Standard Fit-out", "Good quality, mainstream materials"),
        Premium => ("Premium", "Premium Fit-out", "High-end materials and joinery"),
        Luxury => ("Luxury", "Luxury Fit-out", "Bespoke pieces and natural stone"),
        Royal => ("Royal", "Royal Fit-out", "No compromises"),
    }
}

preset_enum! {
    /// Room types offered by the quick-add list
    RoomType, "room type" {
        LivingRoom => ("living_room", "Living Room", "Main reception and lounge space"),
        Bedroom => ("bedroom", "Master Bedroom", "Sleeping quarters"),
        Kitchen => ("kitchen", "Kitchen", "Cooking and dining prep"),
        Bathroom => ("bathroom", "Bathroom", "Wet room or ensuite"),
        Office => ("office", "Home Office", "Study or work corner"),
    }
}

impl RoomType {
    /// Area in square meters suggested when the room is quick-added
    pub fn default_area(&self) -> f64 {
        match self {
            RoomType::LivingRoom => 30.0,
            RoomType::Bedroom => 25.0,
            RoomType::Kitchen => 15.0,
            RoomType::Bathroom => 10.0,
            RoomType::Office => 12.0,
        }
    }
}

/// One configured space in the draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEntry {
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub quantity: u32,
    /// Area in square meters
    pub area: f64,
}

impl RoomEntry {
    pub fn new(room_type: RoomType, quantity: u32, area: f64) -> Self {
        Self {
            room_type,
            quantity,
            area,
        }
    }

    /// Quick-add entry: one room with the type's default area
    pub fn preset(room_type: RoomType) -> Self {
        Self::new(room_type, 1, room_type.default_area())
    }

    /// Quantity at least one and a strictly positive, finite area
    pub fn is_valid(&self) -> bool {
        self.quantity >= 1 && self.area.is_finite() && self.area > 0.0
    }
}

impl FromStr for RoomEntry {
    type Err = String;

    /// Parse `type[:quantity[:area]]`, e.g. `living_room:1:30`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let room_type: RoomType = parts
            .next()
            .unwrap_or_default()
            .parse()
            .map_err(|e: UnknownPreset| e.to_string())?;

        let quantity = match parts.next() {
            Some(q) => q
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid room quantity '{q}'"))?,
            None => 1,
        };

        let area = match parts.next() {
            Some(a) => a
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid room area '{a}'"))?,
            None => room_type.default_area(),
        };

        if parts.next().is_some() {
            return Err(format!("expected type:quantity:area, got '{s}'"));
        }

        Ok(Self::new(room_type, quantity, area))
    }
}

/// Payload for `POST /design/generate-by-presets`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetDesignRequest {
    pub property_type: PropertyType,
    pub design_style: DesignStyle,
    pub rooms: Vec<RoomEntry>,
    pub budget_range: BudgetRange,
    pub additional_preferences: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

/// Payload for `POST /design/generate` and `POST /design/validate-compliance`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDesignRequest {
    pub client_preferences: String,
    pub project_details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub use_pro_for_image: bool,
    pub check_compliance: bool,
}

/// Per-room concept returned by the preset endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomDesign {
    pub room_type: String,
    pub quantity: u32,
    pub area: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
}

/// Generated design concept
///
/// Parsed leniently: any field may be missing and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub style: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
    /// Scene description for the 3D preview, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms_designs: Option<Vec<RoomDesign>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_report: Option<Value>,
}

impl DesignResult {
    /// Headline shown above the concept
    pub fn title(&self) -> &str {
        if self.style.is_empty() {
            "Custom Design"
        } else {
            &self.style
        }
    }
}

/// Outcome of `POST /design/validate-compliance`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceReport {
    pub status: String,
    /// Issues are free-form: plain strings or objects depending on the checker
    pub issues: Vec<Value>,
    pub recommendation: Option<String>,
    /// Present when the check was skipped
    pub reason: Option<String>,
}

impl ComplianceReport {
    /// One display line per issue
    pub fn issue_lines(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| match issue {
                Value::String(s) => s.clone(),
                Value::Object(map) => map
                    .get("description")
                    .or_else(|| map.get("issue"))
                    .or_else(|| map.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| issue.to_string()),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Payload for `POST /reports/generate`
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub project_details: ReportProjectDetails,
    pub design_result: DesignResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportProjectDetails {
    pub project_details: String,
}
