//! Cost estimation endpoints

use super::client::BackendClient;
use super::error::ApiError;
use crate::types::{Estimation, EstimationAudit};

impl BackendClient {
    /// `POST /estimation/calculate/{id}`: (re)calculate and store the estimation
    pub async fn calculate_estimation(&self, project_id: i64) -> Result<Estimation, ApiError> {
        self.post_empty(&format!("/estimation/calculate/{project_id}"))
            .await
    }

    /// `GET /estimation/project/{id}`; `None` until one has been calculated
    pub async fn project_estimation(&self, project_id: i64) -> Result<Option<Estimation>, ApiError> {
        self.get_optional(&format!("/estimation/project/{project_id}"))
            .await
    }

    /// `POST /estimation/audit/{id}`: expert review of the stored estimation
    pub async fn audit_estimation(&self, project_id: i64) -> Result<EstimationAudit, ApiError> {
        self.post_empty(&format!("/estimation/audit/{project_id}"))
            .await
    }
}
