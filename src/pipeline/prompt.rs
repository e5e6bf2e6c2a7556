//! Prompt assembly. Pure functions over a confirmed request and the fetched
//! framework texts.

use crate::models::{AnalysisRequest, Framework};

/// Per-framework content cap. Bounds prompt size deterministically
/// regardless of what the content provider returns.
pub const MAX_FRAMEWORK_CHARS: usize = 1000;

/// Marker appended when framework content is cut at the cap.
pub const TRUNCATION_MARKER: &str = "\n[Content truncated]";

/// Construct the master analysis prompt.
///
/// Embeds project facts, one line per uploaded document (type + remote
/// handle), the truncated framework texts, the user instruction, and a
/// literal description of the expected JSON output shape. The field names in
/// the shape description must match `AnalysisResult` exactly — the extraction
/// step depends on it informally, not via schema validation.
pub fn build_master_prompt(
    request: &AnalysisRequest,
    frameworks_content: &[(Framework, String)],
) -> String {
    let doc_refs = request
        .uploaded_documents()
        .map(|doc| {
            format!(
                "- {}: {}",
                doc.document_type,
                doc.remote_handle.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut frameworks_text = String::new();
    for (framework, content) in frameworks_content {
        frameworks_text.push_str(&format!(
            "\n**{}:**\n{}\n",
            framework.as_str(),
            truncate_content(content)
        ));
    }

    let info = &request.project_info;
    let reference_line = match info.planning_reference.as_deref() {
        Some(reference) => format!("PREVIOUS PLANNING REF: {reference}\n"),
        None => String::new(),
    };

    format!(
        r#"You are an expert AI Planning Consultant analyzing architectural drawings for UK planning compliance.

PROJECT: {project_type}
ADDRESS: {address}
AUTHORITY: {authority}
{reference_line}
UPLOADED FILES:
{doc_refs}

INSTRUCTIONS:
1. EXAMINE each page of the PDF carefully
2. IDENTIFY all architectural drawings (plans, elevations, sections, site plans)
3. READ dimensions, annotations, and labels
4. ANALYZE for compliance with UK planning regulations

WHAT TO LOOK FOR:
- Building dimensions (height, width, depth)
- Extension sizes and setbacks
- Relationship to boundaries and neighbors
- Materials and design features
- Any text annotations or notes

REGULATIONS TO CHECK:
{frameworks_text}
USER REQUEST:
{user_prompt}

OUTPUT FORMAT - Provide a JSON object with:
{{
  "aiReviewFramework": [
    {{
      "framework": "Framework name",
      "relevantPolicies": ["List specific policies"],
      "keyConsiderations": "How this framework applies to the drawings"
    }}
  ],
  "planByPlanReview": [
    {{
      "planType": "Drawing title/type from the PDF",
      "positives": ["Good aspects observed"],
      "observations": ["Concerns or issues"],
      "complianceNotes": "Specific measurements and compliance details"
    }}
  ],
  "policyCompatibilitySummary": [
    {{
      "policyArea": "Area of concern",
      "status": "Compliant/Partially Compliant/Non-Compliant",
      "details": "Explanation with specific references to drawings",
      "recommendations": ["Actions needed"]
    }}
  ],
  "aiRecommendationSummary": "Overall assessment with specific references to the drawings analyzed"
}}

Base your analysis on the ACTUAL content visible in the PDFs."#,
        project_type = info.project_type,
        address = info.address,
        authority = info.council.as_deref().unwrap_or("Not specified"),
        user_prompt = request.user_prompt,
    )
}

/// Condensed prompt for a manual re-ask: key names only, no framework text.
pub fn build_simplified_prompt(request: &AnalysisRequest) -> String {
    let doc_refs = request
        .uploaded_documents()
        .map(|doc| doc.document_type.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Analyze the uploaded architectural PDFs for a {project_type} at {address}.

Documents: {doc_refs}

IMPORTANT: Look at ALL pages and drawings in the PDFs. Identify floor plans, elevations, sections, and site plans.

Provide a JSON response with these keys only:
- aiReviewFramework: array of framework analysis
- planByPlanReview: array of plan reviews
- policyCompatibilitySummary: array of policy summaries
- aiRecommendationSummary: string with recommendations

Keep responses concise. Output valid JSON only."#,
        project_type = request.project_info.project_type,
        address = request.project_info.address,
    )
}

fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(MAX_FRAMEWORK_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}
