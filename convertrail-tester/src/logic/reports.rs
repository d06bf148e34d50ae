use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use super::{GameRun, StrategySummary};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    games: usize,
    passed: usize,
    summaries: &'a [StrategySummary],
    runs: &'a [GameRun],
}

fn passed_count(runs: &[GameRun]) -> usize {
    runs.iter().filter(|r| r.passed).count()
}

fn success_rate(runs: &[GameRun]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = passed_count(runs) as f64 / runs.len() as f64 * 100.0;
    rate
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    runs: &[GameRun],
    summaries: &[StrategySummary],
    total_duration: Duration,
) -> Result<()> {
    let passed = passed_count(runs);
    writeln!(out)?;
    writeln!(out, "{}", "📊 Play-test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;
    writeln!(out, "Games played: {}", runs.len())?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (runs.len() - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(runs))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for run in runs {
        let status = if run.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        let m = &run.metrics;
        writeln!(
            out,
            "{status} {} seed {}",
            run.strategy.to_string().bold(),
            run.seed
        )?;
        writeln!(
            out,
            "   Day {} | budget ${} | rate {:.2}% | revenue ${}",
            m.final_day,
            m.final_budget,
            m.final_conversion_rate * 100.0,
            m.total_revenue
        )?;
        writeln!(
            out,
            "   Tests: {} ({} significant) | changes: {} | {:?}",
            m.tests_run, m.significant_tests, m.changes_implemented, run.duration
        )?;
        if !run.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &run.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
    }

    if !summaries.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "💰 Strategy Balance".bright_yellow().bold())?;
        writeln!(out, "{}", "===================".yellow())?;
        for summary in summaries {
            writeln!(
                out,
                "{:10} games {:3} | mean revenue ${:>9.0} | mean rate {:.2}% \
                 | tests {:.1} | changes {:.1}",
                summary.strategy.to_string(),
                summary.games,
                summary.mean_revenue,
                summary.mean_conversion_rate * 100.0,
                summary.mean_tests,
                summary.mean_changes
            )?;
        }
        if let Some(best) = summaries
            .iter()
            .max_by(|a, b| a.mean_revenue.total_cmp(&b.mean_revenue))
        {
            writeln!(out, "Best earner: {}", best.strategy.to_string().green())?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    runs: &[GameRun],
    summaries: &[StrategySummary],
) -> Result<()> {
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        games: runs.len(),
        passed: passed_count(runs),
        summaries,
        runs,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    runs: &[GameRun],
    summaries: &[StrategySummary],
) -> Result<()> {
    writeln!(out, "# Convertrail Play-test Results\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;

    let passed = passed_count(runs);
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Games played**: {}", runs.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", runs.len() - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(runs))?;

    if !summaries.is_empty() {
        writeln!(out, "## Strategies\n")?;
        writeln!(
            out,
            "| Strategy | Games | Passed | Mean revenue | Mean rate | Mean tests | Mean changes |"
        )?;
        writeln!(out, "|---|---|---|---|---|---|---|")?;
        for s in summaries {
            writeln!(
                out,
                "| {} | {} | {} | ${:.0} | {:.2}% | {:.1} | {:.1} |",
                s.strategy,
                s.games,
                s.passed,
                s.mean_revenue,
                s.mean_conversion_rate * 100.0,
                s.mean_tests,
                s.mean_changes
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Games\n")?;
    for run in runs {
        let status = if run.passed { "✅" } else { "❌" };
        writeln!(out, "### {status} {} (seed {})\n", run.strategy, run.seed)?;
        writeln!(out, "- **Final day**: {}", run.metrics.final_day)?;
        writeln!(out, "- **Budget left**: ${}", run.metrics.final_budget)?;
        writeln!(out, "- **Revenue**: ${}", run.metrics.total_revenue)?;
        writeln!(out, "- **Tests run**: {}", run.metrics.tests_run)?;
        if !run.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &run.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
