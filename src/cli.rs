//! Non-interactive collection surface: flags in, `SessionInput` out.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::models::{DocumentType, Framework, ProjectInfo, ProjectType};
use crate::workflow::SessionInput;

/// Default instruction sent alongside the drawings.
pub const DEFAULT_USER_PROMPT: &str = "Please review these drawings for compliance \
with all selected planning policies and building regulations.";

#[derive(Parser, Debug)]
#[command(
    name = "archopinion",
    version,
    about = "AI architectural review: UK planning-compliance analysis of drawing sets"
)]
pub struct Cli {
    /// Project address
    #[arg(long)]
    pub address: String,

    /// Project type, e.g. "Residential - Extension (Rear)"
    #[arg(long, value_parser = parse_project_type)]
    pub project_type: ProjectType,

    /// Local planning authority (optional)
    #[arg(long)]
    pub council: Option<String>,

    /// Previous planning reference (optional)
    #[arg(long)]
    pub planning_reference: Option<String>,

    /// Document as "TYPE=PATH", or a bare PATH to auto-detect the type from
    /// the file name. Repeatable; order is preserved.
    #[arg(long = "document", required = true)]
    pub documents: Vec<String>,

    /// Framework code to check against (repeatable). Defaults to NPPF and PDR.
    #[arg(long = "framework", value_parser = parse_framework)]
    pub frameworks: Vec<Framework>,

    /// Analysis instruction passed to the model
    #[arg(long, default_value = DEFAULT_USER_PROMPT)]
    pub prompt: String,

    /// Report output directory (falls back to OUTPUT_DIR, then ./reports)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

fn parse_project_type(s: &str) -> Result<ProjectType, String> {
    ProjectType::from_str(s).map_err(|_| {
        let options = ProjectType::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown project type {s:?}; expected one of: {options}")
    })
}

fn parse_framework(s: &str) -> Result<Framework, String> {
    Framework::from_str(&s.to_uppercase()).map_err(|_| {
        let options = Framework::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown framework {s:?}; expected one of: {options}")
    })
}

impl Cli {
    pub fn into_session_input(self) -> SessionInput {
        let documents = self.documents.iter().map(|s| parse_document_arg(s)).collect();

        let frameworks = if self.frameworks.is_empty() {
            vec![Framework::Nppf, Framework::Pdr]
        } else {
            self.frameworks
        };

        SessionInput {
            project_info: ProjectInfo {
                address: self.address,
                project_type: self.project_type,
                council: self.council.filter(|c| !c.trim().is_empty()),
                planning_reference: self.planning_reference.filter(|r| !r.trim().is_empty()),
            },
            documents,
            frameworks,
            user_prompt: self.prompt,
        }
    }
}

/// "TYPE=PATH" when the prefix is a catalog type, otherwise the whole string
/// is a path and the type is detected from its file name.
fn parse_document_arg(arg: &str) -> (PathBuf, DocumentType) {
    if let Some((prefix, rest)) = arg.split_once('=') {
        if let Ok(document_type) = DocumentType::from_str(prefix.trim()) {
            return (PathBuf::from(rest), document_type);
        }
    }
    let path = PathBuf::from(arg);
    let detected = detect_document_type(&path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
    (path, detected)
}

/// Keyword-based type detection from the file name.
pub fn detect_document_type(filename: &str) -> DocumentType {
    let name = filename.to_lowercase();

    if name.contains("site") {
        DocumentType::SitePlan
    } else if name.contains("floor") && name.contains("exist") {
        DocumentType::FloorPlansExisting
    } else if name.contains("floor") && name.contains("prop") {
        DocumentType::FloorPlansProposed
    } else if name.contains("elevation") && name.contains("exist") {
        DocumentType::ElevationsExisting
    } else if name.contains("elevation") && name.contains("prop") {
        DocumentType::ElevationsProposed
    } else if name.contains("section") {
        DocumentType::Sections
    } else if name.contains("design") || name.contains("access") {
        DocumentType::DesignAccessStatement
    } else if name.contains("plan") {
        DocumentType::SitePlan
    } else {
        DocumentType::OtherSupporting
    }
}
