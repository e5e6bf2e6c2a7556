//! Sequences one review session end-to-end: framework content, uploads,
//! analysis, report. Remote handles are deleted on every exit path —
//! success, fatal error, or unwind — via `CleanupGuard`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{
    AnalysisRequest, AnalysisResult, DocumentType, Framework, ProjectInfo, UploadedDocument,
};
use crate::pipeline::{AnalysisError, AnalysisOrchestrator};
use crate::provider::ContentProvider;
use crate::report::{render_report, ReportError};
use crate::store::DocumentStore;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("No documents were uploaded successfully")]
    NoDocuments,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Render(#[from] ReportError),
}

/// Inputs collected before any remote call is made.
#[derive(Debug, Clone)]
pub struct SessionInput {
    pub project_info: ProjectInfo,
    pub documents: Vec<(PathBuf, DocumentType)>,
    pub frameworks: Vec<Framework>,
    pub user_prompt: String,
}

/// Deletes tracked remote handles when dropped. Holding cleanup in a guard
/// (rather than calling it on each exit path) covers unwinds too, and makes
/// double-deletion impossible.
pub struct CleanupGuard<'a> {
    store: &'a dyn DocumentStore,
    handles: Vec<String>,
}

impl<'a> CleanupGuard<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            handles: Vec::new(),
        }
    }

    pub fn track(&mut self, handle: &str) {
        self.handles.push(handle.to_string());
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        tracing::debug!(count = self.handles.len(), "Cleaning up uploaded files");
        for handle in self.handles.drain(..) {
            if !self.store.delete(&handle) {
                tracing::warn!(%handle, "Could not delete uploaded file during cleanup");
            }
        }
    }
}

/// Run one session. Returns the path of the written report.
pub fn run_session(
    store: &dyn DocumentStore,
    provider: &dyn ContentProvider,
    orchestrator: &AnalysisOrchestrator,
    input: SessionInput,
    output_dir: &Path,
) -> Result<PathBuf, WorkflowError> {
    let mut cleanup = CleanupGuard::new(store);

    // Upload each document in order. A failed upload is terminal for that
    // file only; the document stays without a handle and never reaches the
    // prompt.
    let mut documents = Vec::new();
    for (path, document_type) in input.documents {
        let mut doc = UploadedDocument::new(path, document_type);
        let label = format!("{} - {}", doc.document_type, doc.file_name());
        match store.upload(&doc.path, &label) {
            Ok(handle) => {
                cleanup.track(&handle);
                doc.remote_handle = Some(handle);
                documents.push(doc);
            }
            Err(e) => {
                tracing::warn!(
                    file = %doc.path.display(),
                    error = %e,
                    "Upload failed, excluding document from the analysis"
                );
            }
        }
    }

    if documents.is_empty() {
        return Err(WorkflowError::NoDocuments);
    }

    verify_uploads(store, &documents);

    let request = AnalysisRequest::new(
        input.project_info,
        documents,
        input.frameworks,
        input.user_prompt,
    );

    let frameworks_content = provider.fetch_all(
        &request.selected_frameworks,
        request.project_info.council.as_deref(),
    );

    let payload = orchestrator.analyze(&request, &frameworks_content)?;
    let result = AnalysisResult::from_value(&payload);
    if result.is_empty() {
        tracing::warn!("Analysis payload contained none of the expected sections");
    }

    let report_path = render_report(&request, &result, output_dir)?;
    Ok(report_path)
}

/// Best-effort verification of every uploaded document. Failures are shown,
/// never fatal — analysis continues on partial verification.
fn verify_uploads(store: &dyn DocumentStore, documents: &[UploadedDocument]) {
    for doc in documents {
        let Some(handle) = doc.remote_handle.as_deref() else {
            continue;
        };
        match store.info(handle) {
            Ok(meta) => {
                tracing::info!(
                    document = doc.document_type.as_str(),
                    size_bytes = meta.size_bytes,
                    "Upload verified"
                );
            }
            Err(e) => {
                tracing::warn!(
                    document = doc.document_type.as_str(),
                    error = %e,
                    "Verification failed, continuing anyway"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectType;
    use crate::pipeline::backoff::{RecordingSleeper, RetryPolicy};
    use crate::pipeline::{MockModelClient, ModelClient, ModelError};
    use crate::provider::StaticPolicyProvider;
    use crate::store::MockDocumentStore;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::time::Duration;

    const VALID_RESPONSE: &str = r#"Here is my review:
```json
{
  "aiReviewFramework": [],
  "planByPlanReview": [],
  "policyCompatibilitySummary": [],
  "aiRecommendationSummary": "Looks fine."
}
```"#;

    struct PanickingClient;

    impl ModelClient for PanickingClient {
        fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            panic!("simulated interrupt mid-call");
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_secs(1),
            transient_delay: Duration::from_secs(1),
        }
    }

    fn orchestrator(client: Box<dyn ModelClient + Send + Sync>) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(client, fast_policy(), Box::new(RecordingSleeper::new()))
    }

    fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 test bytes").unwrap();
        path
    }

    fn input_with_documents(documents: Vec<(PathBuf, DocumentType)>) -> SessionInput {
        SessionInput {
            project_info: ProjectInfo {
                address: "9 Station Road".into(),
                project_type: ProjectType::ResidentialRearExtension,
                council: None,
                planning_reference: None,
            },
            documents,
            frameworks: vec![Framework::Nppf, Framework::Pdr],
            user_prompt: "Review against the selected policies.".into(),
        }
    }

    #[test]
    fn success_path_cleans_up_each_handle_once() {
        let dir = tempfile::tempdir().unwrap();
        let site = write_pdf(dir.path(), "site.pdf");
        let sections = write_pdf(dir.path(), "sections.pdf");

        let store = MockDocumentStore::new();
        let orch = orchestrator(Box::new(MockModelClient::new(VALID_RESPONSE)));
        let input = input_with_documents(vec![
            (site, DocumentType::SitePlan),
            (sections, DocumentType::Sections),
        ]);

        let report = run_session(&store, &StaticPolicyProvider, &orch, input, dir.path()).unwrap();
        assert!(report.exists());

        let mut deleted = store.deleted_handles();
        deleted.sort();
        assert_eq!(deleted, vec!["mock://files/0", "mock://files/1"]);
    }

    #[test]
    fn fatal_analysis_error_still_cleans_up_once() {
        let dir = tempfile::tempdir().unwrap();
        let site = write_pdf(dir.path(), "site.pdf");

        struct InvalidRequestClient;
        impl ModelClient for InvalidRequestClient {
            fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
                Err(ModelError::InvalidRequest("bad payload".into()))
            }
        }

        let store = MockDocumentStore::new();
        let orch = orchestrator(Box::new(InvalidRequestClient));
        let input = input_with_documents(vec![(site, DocumentType::SitePlan)]);

        let err = run_session(&store, &StaticPolicyProvider, &orch, input, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Analysis(AnalysisError::InvalidRequest(_))
        ));
        assert_eq!(store.deleted_handles(), vec!["mock://files/0"]);
    }

    #[test]
    fn unwind_mid_analysis_still_cleans_up_once() {
        let dir = tempfile::tempdir().unwrap();
        let site = write_pdf(dir.path(), "site.pdf");

        let store = MockDocumentStore::new();
        let orch = orchestrator(Box::new(PanickingClient));
        let input = input_with_documents(vec![(site, DocumentType::SitePlan)]);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            run_session(&store, &StaticPolicyProvider, &orch, input, dir.path())
        }));
        assert!(outcome.is_err());
        assert_eq!(store.deleted_handles(), vec!["mock://files/0"]);
    }

    #[test]
    fn all_uploads_failing_aborts_with_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let site = write_pdf(dir.path(), "site.pdf");

        let store = MockDocumentStore::failing();
        let orch = orchestrator(Box::new(MockModelClient::new(VALID_RESPONSE)));
        let input = input_with_documents(vec![(site, DocumentType::SitePlan)]);

        let err = run_session(&store, &StaticPolicyProvider, &orch, input, dir.path()).unwrap_err();
        assert!(matches!(err, WorkflowError::NoDocuments));
        assert!(store.deleted_handles().is_empty());
    }

    #[test]
    fn failed_upload_is_skipped_but_session_continues() {
        let dir = tempfile::tempdir().unwrap();
        let site = write_pdf(dir.path(), "site.pdf");
        let missing = dir.path().join("never-written.pdf");

        let store = MockDocumentStore::new();
        let orch = orchestrator(Box::new(MockModelClient::new(VALID_RESPONSE)));
        let input = input_with_documents(vec![
            (site, DocumentType::SitePlan),
            (missing, DocumentType::Sections),
        ]);

        let report = run_session(&store, &StaticPolicyProvider, &orch, input, dir.path());
        assert!(report.is_ok());
        // Only the successful upload acquired (and released) a handle.
        assert_eq!(store.deleted_handles(), vec!["mock://files/0"]);
    }

    #[test]
    fn guard_without_tracked_handles_is_a_no_op() {
        let store = MockDocumentStore::new();
        {
            let _guard = CleanupGuard::new(&store);
        }
        assert!(store.deleted_handles().is_empty());
    }
}
