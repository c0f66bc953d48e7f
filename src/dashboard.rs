//! Project dashboard: where a project stands across design, compliance and
//! cost estimation

use std::fmt;

use crate::api::{ApiError, BackendClient, ProjectService};
use crate::types::{DesignResult, Estimation, Project};

/// Progress of one dashboard stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    /// Ready to work on
    Active,
    /// Waiting on an earlier stage
    Locked,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageStatus::Completed => "completed",
            StageStatus::Active => "active",
            StageStatus::Locked => "locked",
        };
        f.write_str(label)
    }
}

/// A project with its design and estimation, if they exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOverview {
    pub project: Project,
    pub design: Option<DesignResult>,
    pub estimation: Option<Estimation>,
}

impl ProjectOverview {
    /// Fetch the project, then its design and estimation concurrently.
    /// A 404 on either lookup reads as "none yet".
    pub async fn load(client: &BackendClient, project_id: i64) -> Result<Self, ApiError> {
        let project = client.get_project(project_id).await?;
        let (design, estimation) = tokio::try_join!(
            client.design_for_project(project_id),
            client.project_estimation(project_id)
        )?;
        Ok(Self {
            project,
            design,
            estimation,
        })
    }

    pub fn design_status(&self) -> StageStatus {
        if self.design.is_some() {
            StageStatus::Completed
        } else {
            StageStatus::Active
        }
    }

    pub fn compliance_status(&self) -> StageStatus {
        match &self.design {
            Some(design) if design.compliance_report.is_some() => StageStatus::Completed,
            Some(_) => StageStatus::Active,
            None => StageStatus::Locked,
        }
    }

    pub fn estimation_status(&self) -> StageStatus {
        match (&self.estimation, &self.design) {
            (Some(_), _) => StageStatus::Completed,
            (None, Some(_)) => StageStatus::Active,
            (None, None) => StageStatus::Locked,
        }
    }

    /// Stage titles with their status, in order
    pub fn stages(&self) -> [(&'static str, StageStatus); 3] {
        [
            ("Design", self.design_status()),
            ("Compliance", self.compliance_status()),
            ("Estimate", self.estimation_status()),
        ]
    }
}

/// File name for a project's master report
pub fn master_report_file_name(title: &str) -> String {
    let title: String = title
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("MasterReport_{title}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overview(design: Option<DesignResult>, estimation: Option<Estimation>) -> ProjectOverview {
        ProjectOverview {
            project: Project {
                id: 3,
                title: "Villa A".to_string(),
                ..Project::default()
            },
            design,
            estimation,
        }
    }

    #[test]
    fn test_new_project_only_design_is_open() {
        let statuses = overview(None, None).stages().map(|(_, s)| s);
        assert_eq!(
            statuses,
            [StageStatus::Active, StageStatus::Locked, StageStatus::Locked]
        );
    }

    #[test]
    fn test_design_without_compliance_opens_later_stages() {
        let statuses = overview(Some(DesignResult::default()), None)
            .stages()
            .map(|(_, s)| s);
        assert_eq!(
            statuses,
            [StageStatus::Completed, StageStatus::Active, StageStatus::Active]
        );
    }

    #[test]
    fn test_all_stages_completed() {
        let design = DesignResult {
            compliance_report: Some(json!({"status": "compliant"})),
            ..DesignResult::default()
        };
        let overview = overview(Some(design), Some(Estimation::default()));
        assert!(overview
            .stages()
            .iter()
            .all(|(_, s)| *s == StageStatus::Completed));
        assert_eq!(overview.stages()[2].0, "Estimate");
    }

    #[test]
    fn test_master_report_file_name() {
        assert_eq!(master_report_file_name("Villa A"), "MasterReport_Villa A.pdf");
        assert_eq!(
            master_report_file_name("Unit 4/B"),
            "MasterReport_Unit 4_B.pdf"
        );
        assert_eq!(StageStatus::Locked.to_string(), "locked");
    }
}
