//! Prefill from an existing project

use tracing::{info, warn};

use crate::api::ProjectService;
use crate::types::Project;

/// What the wizard takes from a project before the first step
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectContext {
    pub project_id: i64,
    pub title: String,
    /// Free-text brief built from the project's fields
    pub brief: String,
}

impl From<Project> for ProjectContext {
    fn from(project: Project) -> Self {
        Self {
            project_id: project.id,
            brief: project.design_brief(),
            title: project.title,
        }
    }
}

/// Fetch the project and derive its context. Failures are logged and
/// reported as `None`; the wizard starts empty in that case.
pub async fn load_project_context(
    projects: &dyn ProjectService,
    project_id: i64,
) -> Option<ProjectContext> {
    match projects.get_project(project_id).await {
        Ok(project) => {
            info!(project_id, title = %project.title, "Loaded project context");
            Some(project.into())
        }
        Err(e) => {
            warn!(project_id, error = %e, "Could not load project context");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::types::NewProject;
    use async_trait::async_trait;

    struct StubProjects(Result<Project, ApiError>);

    #[async_trait]
    impl ProjectService for StubProjects {
        async fn get_project(&self, _project_id: i64) -> Result<Project, ApiError> {
            self.0.clone()
        }

        async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
            Ok(Vec::new())
        }

        async fn create_project(&self, _project: &NewProject) -> Result<Project, ApiError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_loads_context() {
        let project = Project {
            id: 42,
            title: "Villa A".to_string(),
            location: Some("Dubai".to_string()),
            ..Project::default()
        };
        let context = load_project_context(&StubProjects(Ok(project)), 42)
            .await
            .unwrap();
        assert_eq!(context.project_id, 42);
        assert_eq!(context.title, "Villa A");
        assert!(context.brief.contains("Villa A"));
        assert!(context.brief.contains("Dubai"));
    }

    #[tokio::test]
    async fn test_failure_is_none() {
        let stub = StubProjects(Err(ApiError::NotFound("Project not found".to_string())));
        assert!(load_project_context(&stub, 7).await.is_none());
    }
}
