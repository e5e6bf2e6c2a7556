use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::enums::{DocumentType, Framework, ProjectType};

/// Facts about the project under review. Immutable once collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub address: String,
    pub project_type: ProjectType,
    pub council: Option<String>,
    pub planning_reference: Option<String>,
}

/// One local drawing or statement. `remote_handle` stays empty until the
/// upload step succeeds; documents without a handle never reach the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub path: PathBuf,
    pub document_type: DocumentType,
    pub remote_handle: Option<String>,
}

impl UploadedDocument {
    pub fn new(path: PathBuf, document_type: DocumentType) -> Self {
        Self {
            path,
            document_type,
            remote_handle: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Everything the prompt builder needs for one analysis. Immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub project_info: ProjectInfo,
    pub documents: Vec<UploadedDocument>,
    pub selected_frameworks: Vec<Framework>,
    pub user_prompt: String,
    pub created_at: DateTime<Local>,
}

impl AnalysisRequest {
    pub fn new(
        project_info: ProjectInfo,
        documents: Vec<UploadedDocument>,
        selected_frameworks: Vec<Framework>,
        user_prompt: String,
    ) -> Self {
        Self {
            project_info,
            documents,
            selected_frameworks,
            user_prompt,
            created_at: Local::now(),
        }
    }

    /// Documents that made it to remote storage, in upload order.
    pub fn uploaded_documents(&self) -> impl Iterator<Item = &UploadedDocument> {
        self.documents.iter().filter(|d| d.remote_handle.is_some())
    }
}
