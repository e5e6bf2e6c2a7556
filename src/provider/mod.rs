//! Regulatory framework content lookup.
//!
//! Content is served from bundled policy summaries keyed by framework code.
//! Codes without bundled text get a generic placeholder so framework
//! selection never fails the workflow.

use crate::models::Framework;

mod policy_text;

/// Supplies framework text by code. The trait seam exists so tests and future
/// live-fetch implementations can swap in without touching the workflow.
pub trait ContentProvider {
    fn fetch(&self, framework: Framework, council: Option<&str>) -> String;

    /// Fetch all selected frameworks, preserving selection order.
    fn fetch_all(
        &self,
        frameworks: &[Framework],
        council: Option<&str>,
    ) -> Vec<(Framework, String)> {
        frameworks
            .iter()
            .map(|f| (*f, self.fetch(*f, council)))
            .collect()
    }
}

/// Bundled policy summaries. Council-specific frameworks (LDF, SPD)
/// interpolate the authority name into their headings.
pub struct StaticPolicyProvider;

impl ContentProvider for StaticPolicyProvider {
    fn fetch(&self, framework: Framework, council: Option<&str>) -> String {
        let council = council.unwrap_or("Local");
        let content = match framework {
            Framework::Nppf => policy_text::NPPF.to_string(),
            Framework::Pdr => policy_text::PDR.to_string(),
            Framework::Ldf => policy_text::LDF.replace("{council}", council),
            Framework::Lp => policy_text::LP.to_string(),
            Framework::Bre => policy_text::BRE.to_string(),
            Framework::Spd => policy_text::SPD.replace("{council}", council),
            other => format!("Framework content for {}", other.as_str()),
        };
        tracing::debug!(framework = framework.as_str(), len = content.len(), "Retrieved framework content");
        content
    }
}
