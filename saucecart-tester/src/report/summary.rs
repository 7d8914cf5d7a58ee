use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::Outcome;

/// Flattened result of one test invocation, used for the end-of-run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub class: String,
    pub name: String,
    pub browser: String,
    pub outcome: Outcome,
    pub attempts: u32,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    pub failure: Option<String>,
}

impl TestRecord {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Fail)
    }
}

fn count(records: &[TestRecord], outcome: Outcome) -> usize {
    records.iter().filter(|r| r.outcome == outcome).count()
}

#[allow(clippy::cast_precision_loss)]
fn pass_rate(records: &[TestRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    count(records, Outcome::Pass) as f64 / records.len() as f64 * 100.0
}

pub fn generate_console_report(
    out: &mut impl Write,
    records: &[TestRecord],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Storefront Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==================================".cyan())?;
    writeln!(out, "Total tests: {}", records.len())?;
    writeln!(out, "Passed: {}", count(records, Outcome::Pass).to_string().green())?;
    writeln!(out, "Failed: {}", count(records, Outcome::Fail).to_string().red())?;
    writeln!(out, "Skipped: {}", count(records, Outcome::Skip).to_string().yellow())?;
    writeln!(
        out,
        "Failed within threshold: {}",
        count(records, Outcome::FailWithinThreshold)
    )?;
    writeln!(out, "Pass rate: {:.1}%", pass_rate(records))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for record in records {
        let status = match record.outcome {
            Outcome::Pass => "✅ PASS".green(),
            Outcome::Fail => "❌ FAIL".red(),
            Outcome::Skip => "⏭ SKIP".yellow(),
            Outcome::FailWithinThreshold => "⚠️ FAIL_WITHIN_THRESHOLD".bright_yellow(),
        };
        writeln!(
            out,
            "{} [{}] {}::{}",
            status,
            record.browser,
            record.class,
            record.name.bold()
        )?;
        writeln!(
            out,
            "   Attempts: {}  Time: {:?}",
            record.attempts, record.duration
        )?;
        if let Some(failure) = &record.failure {
            writeln!(out, "   • {}", failure.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut impl Write, records: &[TestRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut impl Write, records: &[TestRecord]) -> Result<()> {
    writeln!(out, "# Saucecart Test Results\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total tests**: {}", records.len())?;
    writeln!(out, "- **Passed**: {}", count(records, Outcome::Pass))?;
    writeln!(out, "- **Failed**: {}", count(records, Outcome::Fail))?;
    writeln!(out, "- **Skipped**: {}", count(records, Outcome::Skip))?;
    writeln!(
        out,
        "- **Failed within threshold**: {}",
        count(records, Outcome::FailWithinThreshold)
    )?;
    writeln!(out, "- **Pass rate**: {:.1}%\n", pass_rate(records))?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Browser | Class | Test | Status | Attempts |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for record in records {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            record.browser, record.class, record.name, record.outcome, record.attempts
        )?;
    }

    let failures: Vec<_> = records.iter().filter(|r| r.failure.is_some()).collect();
    if !failures.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for record in failures {
            if let Some(failure) = &record.failure {
                writeln!(out, "- `{}::{}`: {failure}", record.class, record.name)?;
            }
        }
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
