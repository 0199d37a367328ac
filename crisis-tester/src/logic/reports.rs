use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::{RunReport, StrategyResult};

fn pass_counts(results: &[StrategyResult]) -> (usize, usize, f64) {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let success_rate = if total == 0 {
        0.0
    } else {
        (passed as f64 / total as f64) * 100.0
    };
    (total, passed, success_rate)
}

fn format_counts(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(key, count)| format!("{key} {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn generate_console_report(
    out: &mut dyn Write,
    report: &RunReport,
    total_duration: Duration,
) -> Result<()> {
    let results = &report.results;
    writeln!(out)?;
    writeln!(out, "{}", "📊 Strategy Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;

    let (total, passed, success_rate) = pass_counts(results);
    writeln!(
        out,
        "Content: {} ({} scenarios)",
        report.content_fingerprint, report.scenario_count
    )?;
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {success_rate:.1}%")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(out, "{} {}", status, result.label().bold())?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Score: avg {:.1} (best {:.1}, worst {:.1})",
            result.average_score, result.best_score, result.worst_score
        )?;
        writeln!(out, "   Tiers: {}", format_counts(&result.tier_counts))?;
        writeln!(out, "   Styles: {}", format_counts(&result.style_counts))?;
        writeln!(out, "   Skipped crises: {}", result.total_skips)?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let ranked = results.iter().filter(|r| r.successful_iterations > 0);
    let best = ranked
        .clone()
        .max_by(|a, b| a.average_score.total_cmp(&b.average_score));
    let worst = ranked.min_by(|a, b| a.average_score.total_cmp(&b.average_score));
    if let (Some(best), Some(worst)) = (best, worst) {
        writeln!(out, "{}", "🏆 Strategy Ranking".bright_yellow().bold())?;
        writeln!(out, "{}", "==================".yellow())?;
        writeln!(out, "Highest: {} ({:.1})", best.label().green(), best.average_score)?;
        writeln!(out, "Lowest: {} ({:.1})", worst.label().yellow(), worst.average_score)?;
    }

    Ok(())
}

/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn generate_json_report(out: &mut dyn Write, report: &RunReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn generate_markdown_report(out: &mut dyn Write, report: &RunReport) -> Result<()> {
    let results = &report.results;
    writeln!(out, "# Crisis Strategy Test Results\n")?;

    let (total, passed, success_rate) = pass_counts(results);
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Generated**: {}", report.generated_at)?;
    writeln!(out, "- **Content**: `{}`", report.content_fingerprint)?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {success_rate:.1}%\n")?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Strategy | Seed | Avg score | Best | Worst | Skips |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for result in results {
        writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {:.1} | {} |",
            result.strategy,
            result.run_code,
            result.average_score,
            result.best_score,
            result.worst_score,
            result.total_skips
        )?;
    }
    writeln!(out)?;

    for result in results.iter().filter(|r| !r.failures.is_empty()) {
        writeln!(out, "### ❌ {}\n", result.label())?;
        for failure in &result.failures {
            writeln!(out, "- {failure}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}
