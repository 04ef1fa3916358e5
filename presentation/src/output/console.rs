//! Console output for outlines and batch summaries

use colored::Colorize;
use mods_application::BatchSummary;
use mods_domain::{DiscussionState, SessionRecord, Stance, VariantKey};

/// Formats discussion outlines for console display
pub struct OutlineFormatter;

impl OutlineFormatter {
    /// Colored rendering of [`DiscussionState::render_outline`]'s layout.
    pub fn format_outline(state: &DiscussionState) -> String {
        let mut output = format!("{} {}\n", "Query:".cyan().bold(), state.query());

        for entry in state.entries() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Topic:".yellow().bold(),
                entry.topic()
            ));
            if let Some(assignment) = entry.assignment() {
                let speakers = assignment
                    .documents()
                    .map(|d| (d + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                output.push_str(&format!("{} {}\n", "Speakers:".dimmed(), speakers));
            }

            let supporting = entry.facts().iter().filter(|f| f.stance == Stance::Supporting);
            let opposing = entry.facts().iter().filter(|f| f.stance == Stance::Opposing);
            for fact in supporting.chain(opposing) {
                let label = match fact.stance {
                    Stance::Supporting => fact.stance.outline_label().green(),
                    Stance::Opposing => fact.stance.outline_label().red(),
                };
                output.push_str(&format!(
                    "  - {}: {} {}\n",
                    label,
                    fact.claim,
                    format!("[{}]", fact.document + 1).dimmed()
                ));
            }
        }

        output
    }

    /// One item's record under a variant/dataset heading.
    pub fn format_record(
        variant: VariantKey,
        dataset: &str,
        index: usize,
        record: &SessionRecord,
    ) -> String {
        let heading = format!("── {} / {} #{} ──", variant, dataset, index + 1);
        match record {
            SessionRecord::Completed { state } => format!(
                "{}\n{}",
                heading.yellow().bold(),
                Self::format_outline(state)
            ),
            SessionRecord::Failed { message } => {
                format!("{}\n{} {}\n", heading.red().bold(), "Failed:".red(), message)
            }
        }
    }

    /// Every record in the bundle, variant by variant.
    pub fn format_outlines(summary: &BatchSummary) -> String {
        let mut output = String::new();
        for (variant, datasets) in &summary.bundle.variants {
            let Ok(key) = variant.parse::<VariantKey>() else {
                continue;
            };
            for (dataset, records) in datasets {
                for (index, record) in records.iter().enumerate() {
                    output.push_str(&Self::format_record(key, dataset, index, record));
                    output.push('\n');
                }
            }
        }
        output
    }

    pub fn format_summary(summary: &BatchSummary, location: &str) -> String {
        let line = "=".repeat(60);
        let failed = if summary.failed > 0 {
            summary.failed.to_string().red().bold()
        } else {
            summary.failed.to_string().green()
        };
        format!(
            "{}\n{:^60}\n{}\n{} {}\n{} {}\n{} {}\n{} {}\n{} {}\n{}",
            line.cyan(),
            format!("Run: {}", summary.bundle.run_name).bold(),
            line.cyan(),
            "Processed:".cyan().bold(),
            summary.processed,
            "Resumed past:".cyan().bold(),
            summary.skipped,
            "Failed:".cyan().bold(),
            failed,
            "Failure markers in bundle:".cyan().bold(),
            summary.bundle.failure_count(),
            "Checkpoint:".cyan().bold(),
            location,
            line.cyan()
        )
    }
}
