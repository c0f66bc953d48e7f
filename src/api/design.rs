//! Design generation, compliance and report endpoints

use async_trait::async_trait;

use super::client::BackendClient;
use super::error::ApiError;
use crate::types::{
    ComplianceReport, DesignResult, PresetDesignRequest, ReportRequest, TextDesignRequest,
};

/// External design generation service
#[async_trait]
pub trait DesignService: Send + Sync {
    /// `POST /design/generate-by-presets`
    async fn generate_by_presets(
        &self,
        request: &PresetDesignRequest,
    ) -> Result<DesignResult, ApiError>;

    /// `POST /design/generate`
    async fn generate_from_text(&self, request: &TextDesignRequest)
        -> Result<DesignResult, ApiError>;

    /// `POST /design/validate-compliance`
    async fn validate_compliance(
        &self,
        request: &TextDesignRequest,
    ) -> Result<ComplianceReport, ApiError>;

    /// `POST /reports/generate`, returns the document bytes
    async fn generate_report(&self, request: &ReportRequest) -> Result<Vec<u8>, ApiError>;
}

#[async_trait]
impl DesignService for BackendClient {
    async fn generate_by_presets(
        &self,
        request: &PresetDesignRequest,
    ) -> Result<DesignResult, ApiError> {
        self.post_json("/design/generate-by-presets", request).await
    }

    async fn generate_from_text(
        &self,
        request: &TextDesignRequest,
    ) -> Result<DesignResult, ApiError> {
        self.post_json("/design/generate", request).await
    }

    async fn validate_compliance(
        &self,
        request: &TextDesignRequest,
    ) -> Result<ComplianceReport, ApiError> {
        self.post_json("/design/validate-compliance", request).await
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<Vec<u8>, ApiError> {
        self.post_bytes("/reports/generate", request).await
    }
}

impl BackendClient {
    /// `GET /design/project/{id}`; `None` when the project has no design yet
    pub async fn design_for_project(
        &self,
        project_id: i64,
    ) -> Result<Option<DesignResult>, ApiError> {
        self.get_optional(&format!("/design/project/{project_id}"))
            .await
    }
}
