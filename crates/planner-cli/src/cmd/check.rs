//! `vplan check` — validate a structure document without transforming it.
//!
//! Runs validation and cycle detection, reporting every recovered defect and
//! the cycle-flagged subtopics, but leaves times and edges as the validator
//! produced them. Exit status is zero whenever the document is processable,
//! even with warnings; use the report to judge quality.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use planner_core::graph::build::PrereqGraph;
use planner_core::graph::cycles::flag_cycle_members;
use planner_core::provider::parse_document;
use planner_core::validate::validate_document;
use planner_core::{PlannerConfig, Warning};
use serde::Serialize;

use crate::output::{render, render_error, CliError, OutputMode};

/// Arguments for `vplan check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the raw structure document. Reads stdin when omitted.
    pub input: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    subtopics: usize,
    /// Names of subtopics flagged as cycle members, in document order.
    cycle_members: Vec<String>,
    warnings: Vec<Warning>,
}

/// Execute `vplan check`.
pub fn run_check(
    args: &CheckArgs,
    output: OutputMode,
    config: &PlannerConfig,
) -> anyhow::Result<()> {
    let text = super::read_input(args.input.as_deref())?;

    let result = parse_document(&text).and_then(|doc| validate_document(&doc, config));
    let batch = match result {
        Ok(batch) => batch,
        Err(err) => {
            render_error(output, &CliError::new(format!("document rejected: {err}")))?;
            anyhow::bail!("malformed document");
        }
    };

    let flagged = flag_cycle_members(&PrereqGraph::from_subtopics(&batch.subtopics));
    let cycle_members: Vec<String> = batch
        .subtopics
        .iter()
        .filter(|subtopic| flagged.contains(&subtopic.id))
        .map(|subtopic| subtopic.name.clone())
        .collect();

    let payload = CheckOutput {
        subtopics: batch.subtopics.len(),
        cycle_members,
        warnings: batch.warnings,
    };

    render(output, &payload, render_check_human)
}

fn render_check_human(payload: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Document is processable: {} subtopics", payload.subtopics)?;

    if payload.cycle_members.is_empty() {
        writeln!(w, "Prerequisites: acyclic")?;
    } else {
        writeln!(
            w,
            "Prerequisites: cycle involving {} subtopics",
            payload.cycle_members.len()
        )?;
        for name in &payload.cycle_members {
            writeln!(w, "  - {name}")?;
        }
    }

    if payload.warnings.is_empty() {
        writeln!(w, "No defects found.")?;
    } else {
        writeln!(w, "\nDefects ({}):", payload.warnings.len())?;
        for warning in &payload.warnings {
            writeln!(w, "  {warning}")?;
        }
    }

    Ok(())
}
