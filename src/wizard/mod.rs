//! Guided design wizard
//!
//! Ties together the pieces of a design session:
//! - `draft`: the field store holding user input
//! - `steps`: step order and forward gating
//! - `submission`: single-flight generation requests
//! - `cache`: the last successful result across restarts
//! - `context`: prefill from an existing project

pub mod cache;
pub mod context;
pub mod draft;
pub mod steps;
pub mod submission;


use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, DesignService, ProjectService};
use crate::types::{
    BudgetRange, ComplianceReport, DesignResult, DesignStyle, PropertyType, ReportProjectDetails,
    ReportRequest, RoomEntry, TextDesignRequest,
};

pub use cache::{FileResultCache, MemoryResultCache, PersistedRecord, ResultCache};
pub use context::{load_project_context, ProjectContext};
pub use draft::{Draft, DraftField, FieldStore, IncompleteDraft, RoomField};
pub use steps::{NavigationError, StepDescriptor, StepSequencer, DESIGN_STEPS};
pub use submission::{SubmissionCoordinator, SubmissionState, SubmitError};

/// Which request variant `generate` sends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DesignMode {
    #[default]
    Presets,
    Text,
}

/// What the wizard is showing
#[derive(Debug, Clone, PartialEq)]
pub enum WizardPhase {
    Editing { step: usize },
    Result(DesignResult),
}

#[derive(Debug, Clone, Copy)]
pub struct WizardOptions {
    pub auto_advance: bool,
    /// Project to prefill from
    pub project_id: Option<i64>,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            auto_advance: true,
            project_id: None,
        }
    }
}

/// File name for a report downloaded on `date`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("Design_Report_{}.pdf", date.format("%Y-%m-%d"))
}

/// Shown when a report cannot be fetched or saved
pub const REPORT_FAILURE_MESSAGE: &str = "Failed to download report";

/// Saving a report failed; the wizard itself is unaffected
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report download failed: {0}")]
    Download(#[from] ApiError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// One line for inline display
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Download(e) => e.user_message(REPORT_FAILURE_MESSAGE),
            ReportError::Write { .. } => REPORT_FAILURE_MESSAGE.to_string(),
        }
    }
}

pub struct DesignWizard {
    store: FieldStore,
    sequencer: StepSequencer,
    coordinator: SubmissionCoordinator,
    design: Arc<dyn DesignService>,
    mode: DesignMode,
    brief: TextDesignRequest,
    project_title: Option<String>,
    restored: Option<PersistedRecord>,
}

impl DesignWizard {
    /// A fresh wizard with nothing loaded
    pub fn new(
        design: Arc<dyn DesignService>,
        cache: Arc<dyn ResultCache>,
        auto_advance: bool,
    ) -> Self {
        Self {
            store: FieldStore::new(),
            sequencer: StepSequencer::new(auto_advance),
            coordinator: SubmissionCoordinator::new(Arc::clone(&design), cache),
            design,
            mode: DesignMode::Presets,
            brief: TextDesignRequest::default(),
            project_title: None,
            restored: None,
        }
    }

    /// Build a wizard, rehydrate the cached result and apply project context
    pub async fn start(
        options: WizardOptions,
        design: Arc<dyn DesignService>,
        projects: &dyn ProjectService,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        let restored = match cache.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Could not read cached design result");
                None
            }
        };

        let mut wizard = Self::new(design, cache, options.auto_advance);
        if let Some(record) = restored {
            debug!(saved_at = ?record.saved_at, "Restored last design result");
            wizard.coordinator.restore(record.result.clone());
            wizard.restored = Some(record);
        }

        if let Some(project_id) = options.project_id {
            if let Some(context) = load_project_context(projects, project_id).await {
                wizard.apply_context(context);
            }
        }
        wizard
    }

    /// Seed the draft and text brief from a project and switch to text mode
    pub fn apply_context(&mut self, context: ProjectContext) {
        self.store.update(DraftField::Details(context.brief.clone()));
        self.store
            .update(DraftField::ProjectId(Some(context.project_id)));
        self.brief.project_details = context.brief;
        self.brief.project_id = Some(context.project_id);
        self.project_title = Some(context.title);
        self.mode = DesignMode::Text;
    }

    pub fn draft(&self) -> Arc<Draft> {
        self.store.get()
    }

    pub fn step(&self) -> usize {
        self.sequencer.current()
    }

    pub fn total_steps(&self) -> usize {
        self.sequencer.total()
    }

    pub fn current_step(&self) -> Option<&'static StepDescriptor> {
        self.sequencer.descriptor()
    }

    pub fn is_last_step(&self) -> bool {
        self.sequencer.is_last()
    }

    pub fn phase(&self) -> WizardPhase {
        match self.coordinator.result() {
            Some(result) => WizardPhase::Result(result),
            None => WizardPhase::Editing {
                step: self.sequencer.current(),
            },
        }
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.coordinator.state()
    }

    pub fn mode(&self) -> DesignMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DesignMode) {
        self.mode = mode;
    }

    pub fn project_title(&self) -> Option<&str> {
        self.project_title.as_deref()
    }

    /// The record rehydrated at startup, if there was one
    pub fn restored(&self) -> Option<&PersistedRecord> {
        self.restored.as_ref()
    }

    /// Choose a property type; returns true when the wizard moved on
    pub fn select_property_type(&mut self, property_type: PropertyType) -> bool {
        let draft = self
            .store
            .update(DraftField::PropertyType(Some(property_type)));
        self.sequencer.current() == 1 && self.sequencer.after_select(&draft)
    }

    /// Choose a style; returns true when the wizard moved on
    pub fn select_style(&mut self, style: DesignStyle) -> bool {
        let draft = self.store.update(DraftField::Style(Some(style)));
        self.sequencer.current() == 2 && self.sequencer.after_select(&draft)
    }

    pub fn set_budget(&mut self, budget: BudgetRange) {
        self.store.update(DraftField::Budget(Some(budget)));
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        self.store.update(DraftField::Details(details.into()));
    }

    pub fn add_room(&mut self, entry: RoomEntry) {
        self.store.add_room(entry);
    }

    pub fn update_room(&mut self, index: usize, field: RoomField) {
        self.store.update_room(index, field);
    }

    pub fn remove_room(&mut self, index: usize) {
        self.store.remove_room(index);
    }

    pub fn update(&mut self, field: DraftField) {
        self.store.update(field);
    }

    pub fn next(&mut self) -> Result<usize, NavigationError> {
        let draft = self.store.get();
        self.sequencer.next(&draft)
    }

    pub fn back(&mut self) -> usize {
        self.sequencer.back()
    }

    /// Every step is complete and nothing is in flight
    pub fn can_generate(&self) -> bool {
        self.sequencer.all_complete(&self.store.get()) && !self.coordinator.is_loading()
    }

    /// Submit the current draft as a preset request
    pub async fn generate(&self) -> Result<DesignResult, SubmitError> {
        let draft = self.store.get();
        self.coordinator.submit(&draft).await
    }

    pub fn brief(&self) -> &TextDesignRequest {
        &self.brief
    }

    pub fn brief_mut(&mut self) -> &mut TextDesignRequest {
        &mut self.brief
    }

    /// Submit the text brief, linked to the draft's project
    pub async fn generate_from_text(&self) -> Result<DesignResult, SubmitError> {
        let mut request = self.brief.clone();
        request.project_id = self.store.get().project_id.or(request.project_id);
        self.coordinator.submit_text(&request).await
    }

    /// Check the text brief against building regulations.
    /// Does not touch the submission state.
    pub async fn validate_compliance(&self) -> Result<ComplianceReport, ApiError> {
        info!("Validating brief against building regulations");
        self.design.validate_compliance(&self.brief).await
    }

    /// Report document for the current result; `None` without one
    pub async fn download_report(&self) -> Result<Option<Vec<u8>>, ApiError> {
        let Some(result) = self.coordinator.result() else {
            return Ok(None);
        };
        let request = ReportRequest {
            project_details: ReportProjectDetails {
                project_details: self.report_details(&result),
            },
            design_result: result,
        };
        let bytes = self.design.generate_report(&request).await?;
        info!(bytes = bytes.len(), "Downloaded design report");
        Ok(Some(bytes))
    }

    /// Download the report and write it to `path`.
    /// Returns the path written, or `None` when there is no result yet.
    pub async fn save_report(&self, path: &Path) -> Result<Option<PathBuf>, ReportError> {
        let Some(bytes) = self.download_report().await? else {
            return Ok(None);
        };
        std::fs::write(path, &bytes).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Saved design report");
        Ok(Some(path.to_path_buf()))
    }

    fn report_details(&self, result: &DesignResult) -> String {
        let draft = self.store.get();
        if !draft.details.is_empty() {
            draft.details.clone()
        } else if !self.brief.project_details.is_empty() {
            self.brief.project_details.clone()
        } else {
            result.description.clone()
        }
    }

    /// Leave the result screen and start from an empty draft.
    /// Returns false while a request is in flight.
    pub fn start_over(&mut self) -> bool {
        if !self.coordinator.reset() {
            return false;
        }
        self.store.clear();
        self.sequencer.reset();
        self.brief = TextDesignRequest::default();
        self.mode = DesignMode::Presets;
        self.project_title = None;
        true
    }
}
