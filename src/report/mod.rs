//! PDF report rendering via `printpdf`.
//!
//! Consumes a confirmed request and an extracted result. Every result field
//! is treated as optional: empty lists render as empty sections and an
//! unrecognized status gets a neutral treatment, so a sparse model response
//! still yields a valid artifact.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use printpdf::*;
use thiserror::Error;

use crate::models::{AnalysisRequest, AnalysisResult, ComplianceStatus};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF build error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP_Y: Mm = Mm(280.0);
const BOTTOM_Y: Mm = Mm(20.0);
const WRAP_COLS: usize = 90;

/// Render the report and return the written path. The file name carries a
/// timestamp so repeated runs never collide.
pub fn render_report(
    request: &AnalysisRequest,
    result: &AnalysisResult,
    output_dir: &Path,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filepath = output_dir.join(format!("archopinion_report_{timestamp}.pdf"));

    let (doc, page, layer) =
        PdfDocument::new("Archopinion Report", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let mut w = PageWriter::new(&doc, page, layer);

    // Title block
    w.heading("ARCHOPINION", 24.0, &bold);
    w.heading("AI Architectural Review Report", 13.0, &font);
    w.gap(Mm(8.0));

    render_project_info(&mut w, request, &font, &bold);
    render_framework_analysis(&mut w, result, &font, &bold);
    render_plan_reviews(&mut w, result, &font, &bold);
    render_policy_summary(&mut w, result, &font, &bold);
    render_recommendation(&mut w, result, &font, &bold);
    render_disclaimer(&mut w, &font);

    let file = File::create(&filepath)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    tracing::info!(path = %filepath.display(), "Report written");
    Ok(filepath)
}

fn render_project_info(
    w: &mut PageWriter,
    request: &AnalysisRequest,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let info = &request.project_info;
    w.section("Project Information", bold);
    let rows = [
        ("Address:", info.address.clone()),
        ("Project Type:", info.project_type.to_string()),
        (
            "Local Authority:",
            info.council.clone().unwrap_or_else(|| "Not specified".into()),
        ),
        (
            "Planning Reference:",
            info.planning_reference.clone().unwrap_or_else(|| "None".into()),
        ),
        (
            "Analysis Date:",
            request.created_at.format("%d %B %Y").to_string(),
        ),
        (
            "Documents Analyzed:",
            request.uploaded_documents().count().to_string(),
        ),
    ];
    for (label, value) in rows {
        w.labelled_line(label, &value, font, bold);
    }
    w.gap(Mm(6.0));
}

fn render_framework_analysis(
    w: &mut PageWriter,
    result: &AnalysisResult,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    w.section("Regulatory Framework Analysis", bold);
    for finding in &result.ai_review_framework {
        w.subheading(&finding.framework, bold);
        w.paragraph(
            &format!("Key Considerations: {}", finding.key_considerations),
            font,
        );
        if !finding.relevant_policies.is_empty() {
            w.paragraph(
                &format!("Relevant Policies: {}", finding.relevant_policies.join(", ")),
                font,
            );
        }
        w.gap(Mm(4.0));
    }
    w.gap(Mm(4.0));
}

fn render_plan_reviews(
    w: &mut PageWriter,
    result: &AnalysisResult,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    w.section("Plan-by-Plan Review", bold);
    for plan in &result.plan_by_plan_review {
        w.subheading(&plan.plan_type, bold);

        if !plan.positives.is_empty() {
            w.line("Positives:", 10.0, bold);
            for positive in &plan.positives {
                w.bullet(positive, font);
            }
        }
        if !plan.observations.is_empty() {
            w.line("Areas for Consideration:", 10.0, bold);
            for observation in &plan.observations {
                w.bullet(observation, font);
            }
        }
        if !plan.compliance_notes.is_empty() {
            w.paragraph(&format!("Compliance Notes: {}", plan.compliance_notes), font);
        }
        w.gap(Mm(4.0));
    }
    w.gap(Mm(4.0));
}

fn render_policy_summary(
    w: &mut PageWriter,
    result: &AnalysisResult,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    w.section("Policy Compatibility Summary", bold);
    for policy in &result.policy_compatibility_summary {
        w.subheading(&policy.policy_area, bold);

        w.colored_line(
            &format!("Status: {}", display_status(policy.status.as_str())),
            10.0,
            bold,
            status_color(policy.classified_status()),
        );
        w.paragraph(&format!("Details: {}", policy.details), font);
        if !policy.recommendations.is_empty() {
            w.line("Recommendations:", 10.0, bold);
            for recommendation in &policy.recommendations {
                w.bullet(recommendation, font);
            }
        }
        w.gap(Mm(4.0));
    }
    w.gap(Mm(4.0));
}

fn render_recommendation(
    w: &mut PageWriter,
    result: &AnalysisResult,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    w.section("AI Recommendations Summary", bold);
    for para in result.ai_recommendation_summary.split("\n\n") {
        if !para.trim().is_empty() {
            w.paragraph(para.trim(), font);
            w.gap(Mm(2.0));
        }
    }
}

fn render_disclaimer(w: &mut PageWriter, font: &IndirectFontRef) {
    w.gap(Mm(10.0));
    let disclaimer = "Disclaimer: This AI-generated report is for informational purposes only \
and should not be considered as professional architectural or planning advice. Always consult \
with qualified professionals and your local planning authority before proceeding with any \
development.";
    w.set_color(Color::Rgb(Rgb::new(0.4, 0.4, 0.4, None)));
    for line in wrap_text(disclaimer, WRAP_COLS + 20) {
        w.line(&line, 8.0, font);
    }
    w.reset_color();
}

/// Empty status strings read better as a dash than as nothing.
fn display_status(status: &str) -> &str {
    if status.trim().is_empty() {
        "—"
    } else {
        status
    }
}

/// Status colour: green / orange / red, neutral grey for anything outside
/// the three-value enum.
fn status_color(status: Option<ComplianceStatus>) -> Color {
    let (r, g, b) = match status {
        Some(ComplianceStatus::Compliant) => (0.0, 0.5, 0.1),
        Some(ComplianceStatus::PartiallyCompliant) => (0.85, 0.5, 0.0),
        Some(ComplianceStatus::NonCompliant) => (0.8, 0.1, 0.1),
        None => (0.4, 0.4, 0.4),
    };
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Cursor over the document: tracks the current layer and y position, adds
/// pages when a line would run past the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl<'a> PageWriter<'a> {
    fn new(doc: &'a PdfDocumentReference, page: PdfPageIndex, layer: PdfLayerIndex) -> Self {
        Self {
            doc,
            layer: doc.get_page(page).get_layer(layer),
            y: TOP_Y,
        }
    }

    fn ensure_space(&mut self, needed: Mm) {
        if self.y - needed < BOTTOM_Y {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
    }

    fn heading(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.ensure_space(Mm(12.0));
        self.layer.use_text(text, size, Mm(20.0), self.y, font);
        self.y -= Mm(10.0);
    }

    fn section(&mut self, title: &str, bold: &IndirectFontRef) {
        self.ensure_space(Mm(14.0));
        self.y -= Mm(2.0);
        self.layer.use_text(title, 14.0, Mm(20.0), self.y, bold);
        self.y -= Mm(8.0);
    }

    fn subheading(&mut self, text: &str, bold: &IndirectFontRef) {
        self.ensure_space(Mm(8.0));
        self.layer.use_text(text, 11.5, Mm(20.0), self.y, bold);
        self.y -= Mm(6.0);
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.ensure_space(Mm(5.0));
        self.layer.use_text(text, size, Mm(20.0), self.y, font);
        self.y -= Mm(4.5);
    }

    fn labelled_line(
        &mut self,
        label: &str,
        value: &str,
        font: &IndirectFontRef,
        bold: &IndirectFontRef,
    ) {
        self.ensure_space(Mm(5.0));
        self.layer.use_text(label, 10.0, Mm(20.0), self.y, bold);
        self.layer.use_text(value, 10.0, Mm(60.0), self.y, font);
        self.y -= Mm(4.5);
    }

    fn colored_line(&mut self, text: &str, size: f32, font: &IndirectFontRef, color: Color) {
        self.set_color(color);
        self.line(text, size, font);
        self.reset_color();
    }

    fn paragraph(&mut self, text: &str, font: &IndirectFontRef) {
        for line in wrap_text(text, WRAP_COLS) {
            self.ensure_space(Mm(5.0));
            self.layer.use_text(&line, 9.5, Mm(20.0), self.y, font);
            self.y -= Mm(4.5);
        }
    }

    fn bullet(&mut self, text: &str, font: &IndirectFontRef) {
        let mut first = true;
        for line in wrap_text(text, WRAP_COLS - 5) {
            self.ensure_space(Mm(5.0));
            let prefix = if first { "• " } else { "  " };
            self.layer
                .use_text(format!("{prefix}{line}"), 9.5, Mm(25.0), self.y, font);
            self.y -= Mm(4.5);
            first = false;
        }
    }

    fn gap(&mut self, amount: Mm) {
        self.y -= amount;
    }

    fn set_color(&mut self, color: Color) {
        self.layer.set_fill_color(color);
    }

    fn reset_color(&mut self) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
