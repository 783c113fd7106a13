//! Structure source seam.
//!
//! The pipeline is pure: it takes an already-parsed JSON document. This
//! module holds the boundary in front of it — the [`StructureSource`] trait
//! any generator backend implements, the fence stripping and parsing that
//! turn raw provider text into a document, and [`generate_plan`] which wires
//! a source straight through to [`process_structure`].

use anyhow::Context as _;
use serde_json::Value;

use crate::config::PlannerConfig;
use crate::error::MalformedDocument;
use crate::pipeline::{process_structure, PlanBundle};
use crate::request::PlanRequest;

/// A backend that can produce a raw structure document for a plan request.
///
/// Implementations return the provider's text verbatim, code fences and all;
/// cleanup happens in [`parse_document`]. Errors here are transport-level
/// (network, auth, quota) and surface as [`anyhow::Error`].
pub trait StructureSource {
    /// Produce the raw structure text for `request`.
    ///
    /// # Errors
    ///
    /// Any failure to obtain the text. The pipeline never retries; callers
    /// decide retry policy.
    fn fetch_structure(&self, request: &PlanRequest) -> anyhow::Result<String>;
}

/// Strip a surrounding Markdown code fence, if present.
///
/// Providers often wrap their JSON in ` ```json … ``` `. The opening fence's
/// language tag is discarded along with its line. Text without a fence is
/// returned trimmed and otherwise untouched.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((_language_tag, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse provider text into a JSON document, stripping code fences first.
///
/// # Errors
///
/// [`MalformedDocument::InvalidJson`] when the cleaned text is not valid
/// JSON. Shape checks beyond parseability belong to the validator.
pub fn parse_document(text: &str) -> Result<Value, MalformedDocument> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|err| MalformedDocument::InvalidJson(err.to_string()))
}

/// Validate a request, fetch its structure from `source`, and run the full
/// pipeline over the result.
///
/// # Errors
///
/// Request validation errors, source transport errors, and
/// [`MalformedDocument`] from parsing or validation, all as [`anyhow::Error`]
/// with context attached.
pub fn generate_plan<S: StructureSource + ?Sized>(
    source: &S,
    request: &PlanRequest,
    config: &PlannerConfig,
) -> anyhow::Result<PlanBundle> {
    request.validate().context("invalid plan request")?;

    let text = source
        .fetch_structure(request)
        .context("fetching structure from source")?;
    let doc = parse_document(&text).context("parsing structure document")?;

    let bundle = process_structure(&doc, request.duration_hours, config)
        .context("post-processing structure")?;
    Ok(bundle)
}
