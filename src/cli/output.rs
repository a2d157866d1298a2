//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TaxonArgs};
use crate::error::Result;
use crate::inference::ClassificationResult;
use crate::metrics::EvalReport;

/// Result structure for bundle inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct InspectionResult {
    pub format_version: u32,
    pub trained_at: String,
    pub training_documents: usize,
    pub vocabulary_size: usize,
    pub classes: Vec<String>,
}

/// Print a serializable value as JSON, honoring `--pretty`.
fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Print an evaluation report in the selected format.
pub fn print_eval_report(report: &EvalReport, cli_args: &TaxonArgs) -> Result<()> {
    match cli_args.output_format {
        OutputFormat::Json => print_json(report, cli_args.pretty),
        OutputFormat::Human => {
            println!("=== Evaluation report ===");
            println!(
                "{:<20} {:>9} {:>9} {:>9} {:>9}",
                "label", "precision", "recall", "f1", "support"
            );
            for (label, metrics) in &report.per_label {
                println!(
                    "{:<20} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                    label, metrics.precision, metrics.recall, metrics.f1, metrics.support
                );
            }
            println!();
            println!(
                "accuracy: {:.3} over {} held-out documents",
                report.accuracy, report.total
            );
            Ok(())
        }
    }
}

/// Print a classification result in the selected format.
pub fn print_classification(result: &ClassificationResult, cli_args: &TaxonArgs) -> Result<()> {
    match cli_args.output_format {
        OutputFormat::Json => print_json(result, cli_args.pretty),
        OutputFormat::Human => {
            println!("Predicted topic: {}", result.predicted_label);
            println!();
            println!("Confidence:");

            // Highest probability first for readability.
            let mut entries: Vec<(&String, &f64)> = result.distribution.iter().collect();
            entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap().then_with(|| a.0.cmp(b.0)));
            for (label, prob) in entries {
                println!("  {label:<20} {prob:>6.1}%", prob = prob * 100.0);
            }
            Ok(())
        }
    }
}

/// Print bundle metadata in the selected format.
pub fn print_inspection(info: &InspectionResult, cli_args: &TaxonArgs) -> Result<()> {
    match cli_args.output_format {
        OutputFormat::Json => print_json(info, cli_args.pretty),
        OutputFormat::Human => {
            println!("format version:     {}", info.format_version);
            println!("trained at:         {}", info.trained_at);
            println!("training documents: {}", info.training_documents);
            println!("vocabulary size:    {}", info.vocabulary_size);
            println!("classes:            {}", info.classes.join(", "));
            Ok(())
        }
    }
}
