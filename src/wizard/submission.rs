//! Single-flight submission of design requests
//!
//! The coordinator owns the submission state machine:
//!
//! ```text
//! Idle | Failed | Success --submit--> Loading --ok--> Success
//!                                             \--err--> Failed
//! ```
//!
//! The state is checked and moved to `Loading` under a lock before the
//! request future is even created, so a second submit while one is in flight
//! is rejected without touching the network. The lock is never held across
//! an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

use super::cache::ResultCache;
use super::draft::{Draft, IncompleteDraft};
use crate::api::{ApiError, DesignService};
use crate::types::{DesignResult, TextDesignRequest};

/// Shown when a preset submission fails without a usable server message
pub const PRESET_FAILURE_FALLBACK: &str = "Error generating design. Please try again.";
/// Shown when a text submission fails without a usable server message
pub const TEXT_FAILURE_FALLBACK: &str = "Error generating design. Please check inputs.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Success(DesignResult),
    Failed(String),
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Loading => "loading",
            SubmissionState::Success(_) => "success",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("a design is already being generated")]
    InFlight,

    #[error(transparent)]
    Incomplete(#[from] IncompleteDraft),

    /// The request was sent and failed; `message` is what the state holds
    #[error("{message}")]
    Failed { message: String, source: ApiError },
}

pub struct SubmissionCoordinator {
    service: Arc<dyn DesignService>,
    cache: Arc<dyn ResultCache>,
    state: Mutex<SubmissionState>,
}

impl SubmissionCoordinator {
    pub fn new(service: Arc<dyn DesignService>, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            service,
            cache,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.lock(), SubmissionState::Loading)
    }

    pub fn result(&self) -> Option<DesignResult> {
        match &*self.lock() {
            SubmissionState::Success(result) => Some(result.clone()),
            _ => None,
        }
    }

    /// Show a previously cached result without writing it back
    pub fn restore(&self, result: DesignResult) {
        let mut state = self.lock();
        if !matches!(*state, SubmissionState::Loading) {
            *state = SubmissionState::Success(result);
        }
    }

    /// Back to `Idle`. Refused while a request is in flight.
    pub fn reset(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, SubmissionState::Loading) {
            return false;
        }
        *state = SubmissionState::Idle;
        true
    }

    /// Submit the draft as a preset request
    pub async fn submit(&self, draft: &Draft) -> Result<DesignResult, SubmitError> {
        let request = draft.to_preset_request()?;
        self.begin()?;
        info!(
            property_type = %request.property_type,
            style = %request.design_style,
            rooms = request.rooms.len(),
            "Generating design from presets"
        );
        let outcome = self.service.generate_by_presets(&request).await;
        self.finish(outcome, PRESET_FAILURE_FALLBACK)
    }

    /// Submit a free-text brief
    pub async fn submit_text(&self, request: &TextDesignRequest) -> Result<DesignResult, SubmitError> {
        self.begin()?;
        info!(
            project_id = ?request.project_id,
            pro = request.use_pro_for_image,
            compliance = request.check_compliance,
            "Generating design from text brief"
        );
        let outcome = self.service.generate_from_text(request).await;
        self.finish(outcome, TEXT_FAILURE_FALLBACK)
    }

    fn begin(&self) -> Result<(), SubmitError> {
        let mut state = self.lock();
        if matches!(*state, SubmissionState::Loading) {
            warn!("Ignoring submit while a design is being generated");
            return Err(SubmitError::InFlight);
        }
        *state = SubmissionState::Loading;
        Ok(())
    }

    fn finish(
        &self,
        outcome: Result<DesignResult, ApiError>,
        fallback: &str,
    ) -> Result<DesignResult, SubmitError> {
        match outcome {
            Ok(result) => {
                *self.lock() = SubmissionState::Success(result.clone());
                info!(style = %result.title(), "Design generated");
                if let Err(e) = self.cache.save(&result) {
                    warn!(error = %e, "Failed to cache design result");
                }
                Ok(result)
            }
            Err(source) => {
                let message = source.user_message(fallback);
                warn!(error = %source, "Design generation failed");
                *self.lock() = SubmissionState::Failed(message.clone());
                Err(SubmitError::Failed { message, source })
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FieldError;
    use crate::types::{
        BudgetRange, ComplianceReport, DesignStyle, PresetDesignRequest, PropertyType,
        ReportRequest, RoomEntry, RoomType,
    };
    use crate::wizard::cache::MemoryResultCache;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubDesign {
        outcome: Result<DesignResult, ApiError>,
        calls: AtomicUsize,
    }

    impl StubDesign {
        fn new(outcome: Result<DesignResult, ApiError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DesignService for StubDesign {
        async fn generate_by_presets(
            &self,
            _request: &PresetDesignRequest,
        ) -> Result<DesignResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.outcome.clone()
        }

        async fn generate_from_text(
            &self,
            _request: &TextDesignRequest,
        ) -> Result<DesignResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }

        async fn validate_compliance(
            &self,
            _request: &TextDesignRequest,
        ) -> Result<ComplianceReport, ApiError> {
            Ok(ComplianceReport::default())
        }

        async fn generate_report(&self, _request: &ReportRequest) -> Result<Vec<u8>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn complete_draft() -> Draft {
        Draft {
            property_type: Some(PropertyType::Villa),
            style: Some(DesignStyle::ModernLuxury),
            rooms: vec![RoomEntry::new(RoomType::LivingRoom, 1, 30.0)],
            budget: Some(BudgetRange::Premium),
            ..Draft::default()
        }
    }

    fn ok_result() -> DesignResult {
        DesignResult {
            style: "Modern Luxury".to_string(),
            description: "Marble and brass".to_string(),
            ..DesignResult::default()
        }
    }

    #[tokio::test]
    async fn test_success_moves_to_success_and_caches_once() {
        let service = StubDesign::new(Ok(ok_result()));
        let cache = Arc::new(MemoryResultCache::new());
        let coordinator = SubmissionCoordinator::new(service.clone(), cache.clone());

        let result = coordinator.submit(&complete_draft()).await.unwrap();

        assert_eq!(result, ok_result());
        assert_eq!(coordinator.state(), SubmissionState::Success(ok_result()));
        assert_eq!(cache.save_count(), 1);
        assert_eq!(cache.load().unwrap().unwrap().result, ok_result());
    }

    #[tokio::test]
    async fn test_validation_failure_joins_messages() {
        let service = StubDesign::new(Err(ApiError::ValidationRejected(vec![
            FieldError {
                field: "rooms.0.area".to_string(),
                message: "area too small".to_string(),
            },
            FieldError {
                field: "budget_range".to_string(),
                message: "unknown budget".to_string(),
            },
        ])));
        let cache = Arc::new(MemoryResultCache::new());
        let coordinator = SubmissionCoordinator::new(service, cache.clone());

        let err = coordinator.submit(&complete_draft()).await.unwrap_err();

        assert_eq!(err.to_string(), "area too small, unknown budget");
        assert_eq!(
            coordinator.state(),
            SubmissionState::Failed("area too small, unknown budget".to_string())
        );
        assert_eq!(cache.save_count(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback() {
        let service = StubDesign::new(Err(ApiError::NetworkUnreachable("refused".to_string())));
        let coordinator =
            SubmissionCoordinator::new(service, Arc::new(MemoryResultCache::new()));

        coordinator.submit(&complete_draft()).await.unwrap_err();
        assert_eq!(
            coordinator.state(),
            SubmissionState::Failed(PRESET_FAILURE_FALLBACK.to_string())
        );

        coordinator
            .submit_text(&TextDesignRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            coordinator.state(),
            SubmissionState::Failed(TEXT_FAILURE_FALLBACK.to_string())
        );
    }

    #[tokio::test]
    async fn test_incomplete_draft_is_rejected_without_request() {
        let service = StubDesign::new(Ok(ok_result()));
        let coordinator =
            SubmissionCoordinator::new(service.clone(), Arc::new(MemoryResultCache::new()));

        let err = coordinator.submit(&Draft::default()).await.unwrap_err();

        assert!(matches!(err, SubmitError::Incomplete(_)));
        assert_eq!(coordinator.state(), SubmissionState::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_single_flight() {
        let service = StubDesign::new(Ok(ok_result()));
        let cache = Arc::new(MemoryResultCache::new());
        let coordinator = SubmissionCoordinator::new(service.clone(), cache.clone());
        let draft = complete_draft();

        let (first, second) = tokio::join!(coordinator.submit(&draft), coordinator.submit(&draft));

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), SubmitError::InFlight);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.save_count(), 1);
    }

    #[tokio::test]
    async fn test_resubmit_after_failure_and_success() {
        let coordinator = SubmissionCoordinator::new(
            StubDesign::new(Ok(ok_result())),
            Arc::new(MemoryResultCache::new()),
        );
        *coordinator.lock() = SubmissionState::Failed("earlier".to_string());
        assert!(coordinator.submit(&complete_draft()).await.is_ok());
        assert!(coordinator.submit(&complete_draft()).await.is_ok());
    }

    #[test]
    fn test_reset_refused_while_loading() {
        let coordinator = SubmissionCoordinator::new(
            StubDesign::new(Ok(ok_result())),
            Arc::new(MemoryResultCache::new()),
        );
        coordinator.begin().unwrap();
        assert!(!coordinator.reset());
        assert!(coordinator.is_loading());
        coordinator.restore(ok_result());
        assert!(coordinator.is_loading());
    }

    #[test]
    fn test_restore_does_not_write_cache() {
        let cache = Arc::new(MemoryResultCache::new());
        let coordinator =
            SubmissionCoordinator::new(StubDesign::new(Ok(ok_result())), cache.clone());
        coordinator.restore(ok_result());
        assert_eq!(coordinator.result(), Some(ok_result()));
        assert_eq!(cache.save_count(), 0);
        assert!(coordinator.reset());
        assert_eq!(coordinator.state(), SubmissionState::Idle);
    }
}
