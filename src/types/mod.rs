//! Records exchanged with the studio backend.

mod design;
mod estimation;
mod project;

pub use design::{
    BudgetRange, ComplianceReport, DesignResult, DesignStyle, PresetDesignRequest, PropertyType,
    ReportProjectDetails, ReportRequest, RoomDesign, RoomEntry, RoomType, TextDesignRequest,
    UnknownPreset,
};
pub use estimation::{CategoryCosts, Estimation, EstimationAudit};
pub use project::{Client, NewProject, Project};
