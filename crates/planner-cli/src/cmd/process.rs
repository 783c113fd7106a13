//! `vplan process` — run the full pipeline over a structure document.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use planner_core::provider::parse_document;
use planner_core::{process_structure, PlanBundle, PlannerConfig, Warning};
use serde::Serialize;

use crate::output::{render, render_error, CliError, OutputMode};

/// Arguments for `vplan process`.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Path to the raw structure document (JSON, code fences tolerated).
    /// Reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Requested total plan duration in hours.
    #[arg(long)]
    pub hours: f64,
}

#[derive(Debug, Serialize)]
struct ProcessOutput {
    #[serde(flatten)]
    bundle: PlanBundle,
    warnings: Vec<Warning>,
}

/// Execute `vplan process`.
pub fn run_process(
    args: &ProcessArgs,
    output: OutputMode,
    config: &PlannerConfig,
) -> anyhow::Result<()> {
    let text = super::read_input(args.input.as_deref())?;

    let result =
        parse_document(&text).and_then(|doc| process_structure(&doc, args.hours, config));
    let bundle = match result {
        Ok(bundle) => bundle,
        Err(err) => {
            render_error(
                output,
                &CliError::with_suggestion(
                    format!("cannot process document: {err}"),
                    "the input must be a JSON object with `subtopics` and `analysis`",
                ),
            )?;
            anyhow::bail!("malformed document");
        }
    };

    let mut payload = ProcessOutput {
        warnings: Vec::new(),
        bundle,
    };
    payload.warnings = std::mem::take(&mut payload.bundle.warnings);

    render(output, &payload, render_process_human)
}

fn render_process_human(payload: &ProcessOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let bundle = &payload.bundle;
    writeln!(
        w,
        "Processed {} subtopics, {} minutes total",
        bundle.subtopics.len(),
        bundle.analysis.estimated_total_minutes
    )?;

    if bundle.analysis.cycle_member_ids.is_empty() {
        writeln!(w, "Prerequisites: acyclic")?;
    } else {
        writeln!(
            w,
            "Prerequisites: cycle repaired ({} subtopics involved)",
            bundle.analysis.cycle_member_ids.len()
        )?;
    }

    writeln!(
        w,
        "Graph: {} nodes, {} edges",
        bundle.graph.nodes.len(),
        bundle.graph.edges.len()
    )?;

    if payload.warnings.is_empty() {
        writeln!(w, "No defects recovered.")?;
    } else {
        writeln!(w, "\nRecovered defects ({}):", payload.warnings.len())?;
        for warning in &payload.warnings {
            writeln!(w, "  {warning}")?;
        }
    }

    Ok(())
}
