//! Project and client endpoints

use async_trait::async_trait;

use super::client::BackendClient;
use super::error::ApiError;
use crate::types::{Client, NewProject, Project};

/// External project service
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// `GET /projects/{id}`
    async fn get_project(&self, project_id: i64) -> Result<Project, ApiError>;

    /// `GET /projects/`
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    /// `POST /projects/`
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;
}

#[async_trait]
impl ProjectService for BackendClient {
    async fn get_project(&self, project_id: i64) -> Result<Project, ApiError> {
        self.get_json(&format!("/projects/{project_id}")).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json("/projects/").await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.post_json("/projects/", project).await
    }
}

impl BackendClient {
    /// `GET /clients/`
    pub async fn list_clients(&self) -> Result<Vec<Client>, ApiError> {
        self.get_json("/clients/").await
    }

    /// `GET /reports/project/{id}/master`, the combined design and cost document
    pub async fn project_master_report(&self, project_id: i64) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/reports/project/{project_id}/master"))
            .await
    }
}
