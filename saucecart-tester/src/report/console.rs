use async_trait::async_trait;
use colored::Colorize;

use super::{FailureDetail, SuiteInfo, TestInvocation, TestListener};
use crate::browser::Driver;

/// Prints colored progress lines as tests run.
pub struct ConsoleListener {
    verbose: bool,
}

impl ConsoleListener {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

#[async_trait]
impl TestListener for ConsoleListener {
    async fn on_suite_start(&self, suite: &SuiteInfo) {
        println!("{} {}", "🌐 Suite".bright_blue().bold(), suite.name.bold());
    }

    async fn on_test_start(&self, test: &TestInvocation) {
        if self.verbose {
            println!(
                "  ▶ {}::{} (attempt {})",
                test.class,
                test.display_name(),
                test.attempt
            );
        }
    }

    async fn on_test_pass(&self, test: &TestInvocation) {
        println!("  {} {}::{}", "✅ PASS".green(), test.class, test.display_name());
    }

    async fn on_test_fail(
        &self,
        test: &TestInvocation,
        failure: &FailureDetail,
        _driver: Option<&dyn Driver>,
    ) {
        println!("  {} {}::{}", "❌ FAIL".red(), test.class, test.display_name());
        println!("     • {}", failure.message.red());
    }

    async fn on_test_retry(&self, test: &TestInvocation, failure: &FailureDetail) {
        println!(
            "  {} {}::{} after attempt {}",
            "🔁 RETRY".yellow(),
            test.class,
            test.display_name(),
            test.attempt
        );
        if self.verbose {
            println!("     • {}", failure.message.yellow());
        }
    }

    async fn on_test_skip(&self, test: &TestInvocation, reason: &str) {
        println!(
            "  {} {}::{} ({reason})",
            "⏭ SKIP".bright_black(),
            test.class,
            test.display_name()
        );
    }

    async fn on_test_fail_within_threshold(&self, test: &TestInvocation, failure: &FailureDetail) {
        println!(
            "  {} {}::{}",
            "⚠️ FAIL_WITHIN_THRESHOLD".bright_yellow(),
            test.class,
            test.display_name()
        );
        println!("     • {}", failure.message.yellow());
    }

    async fn on_suite_finish(&self, suite: &SuiteInfo) {
        println!("{} {}", "🏁 Finished".bright_blue().bold(), suite.name);
    }
}
