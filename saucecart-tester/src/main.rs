mod browser;
mod config;
mod error;
mod fixture;
mod pages;
mod report;
mod runner;
mod suite;
#[cfg(test)]
mod testing;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use browser::{BrowserConfig, BrowserKind, SessionFactory, WebDriverFactory};
use config::{DEFAULT_BASE_URL, SuiteConfig};
use report::summary::{generate_console_report, generate_json_report, generate_markdown_report};
use report::{ConsoleListener, Listeners, ReportingListener, TestListener, TestRecord};
use runner::SuiteRunner;
use suite::{TestClass, get_class, list_classes};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Colored human-readable summary
    Console,
    /// Machine-readable list of test records
    Json,
    /// Markdown tables for CI job summaries
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "saucecart-tester", version)]
#[command(
    about = "End-to-end browser tests for the Sauce Labs demo storefront with retries and HTML reports"
)]
struct Args {
    /// Browsers to run (comma-separated: chrome, firefox, edge)
    #[arg(long, default_value = "chrome")]
    browsers: String,

    /// Base URL of the storefront under test
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Test classes to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    tests: String,

    /// List all available test classes and exit
    #[arg(long)]
    list_tests: bool,

    /// Run test classes of a suite concurrently, one browser session each
    #[arg(long)]
    parallel: bool,

    /// Directory for the HTML report and its JSON sidecar
    #[arg(long, default_value = "test-output")]
    report_dir: PathBuf,

    /// Directory for failure screenshots
    #[arg(long, default_value = "screenshots")]
    screenshots_dir: PathBuf,

    /// Format of the end-of-run summary
    #[arg(long, value_enum, default_value_t = SummaryFormat::Console)]
    summary: SummaryFormat,

    /// Optional path to write the summary to instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Connect to a Selenium Grid hub instead of local drivers
    #[arg(long)]
    hub: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if maybe_list_tests(&args)? {
        return Ok(());
    }

    announce_banner();

    let browsers = resolve_browsers(&args.browsers)?;
    let classes = resolve_classes(&args.tests)?;
    let suites = browsers
        .iter()
        .map(|kind| SuiteConfig::new(kind.label(), &args.base_url))
        .collect::<Result<Vec<_>, _>>()?;

    let start_time = Instant::now();
    let factory: Arc<dyn SessionFactory> =
        Arc::new(WebDriverFactory::new(build_browser_config(&args)));

    let mut records = Vec::new();
    for suite in &suites {
        records.extend(run_browser_suite(&args, &factory, suite, &classes).await?);
    }

    write_summary(&args, &records, start_time)?;

    if records.iter().any(TestRecord::is_failure) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &args.log_file {
        let file = util::open_log_file(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("initializing logger")?;
    Ok(())
}

fn maybe_list_tests(args: &Args) -> Result<bool> {
    if !args.list_tests {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available tests:")?;
    for (key, description) in list_classes() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
        if let Some(class) = get_class(key) {
            for test in suite::ordered(class.as_ref()) {
                writeln!(output_target.writer(), "      {}", test.name())?;
            }
        }
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🛒 Saucecart Storefront Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn resolve_browsers(browsers_arg: &str) -> Result<Vec<BrowserKind>> {
    let mut kinds = Vec::new();
    for name in split_csv(browsers_arg) {
        let kind: BrowserKind = name.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        bail!("no browsers selected");
    }
    Ok(kinds)
}

fn resolve_classes(tests_arg: &str) -> Result<Vec<Arc<dyn TestClass>>> {
    let mut names = split_csv(tests_arg);
    if names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
        names = list_classes()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect();
    }

    let mut classes: Vec<Arc<dyn TestClass>> = Vec::new();
    for name in &names {
        match get_class(name) {
            Some(class) if classes.iter().all(|c| c.name() != class.name()) => classes.push(class),
            Some(_) => {}
            None => eprintln!("⚠️  Unknown test class: {}", name.yellow()),
        }
    }
    if classes.is_empty() {
        bail!("no known test classes selected from '{tests_arg}'");
    }
    Ok(classes)
}

fn build_browser_config(args: &Args) -> BrowserConfig {
    BrowserConfig {
        remote_hub: args.hub.clone(),
        ..BrowserConfig::default()
    }
}

async fn run_browser_suite(
    args: &Args,
    factory: &Arc<dyn SessionFactory>,
    suite: &SuiteConfig,
    classes: &[Arc<dyn TestClass>],
) -> Result<Vec<TestRecord>> {
    println!(
        "{} {}",
        "🌐 Running Browser Tests on".bright_blue().bold(),
        suite.browser().bold()
    );
    println!("{}", "-".repeat(30).blue());

    let reporting = Arc::new(ReportingListener::new(
        args.report_dir.clone(),
        args.screenshots_dir.clone(),
    ));
    let listeners = Listeners::new(vec![
        reporting.clone() as Arc<dyn TestListener>,
        Arc::new(ConsoleListener::new(args.verbose)),
    ]);
    let runner = SuiteRunner::new(Arc::clone(factory), Arc::new(listeners))
        .parallel(args.parallel)
        .verbose(args.verbose);

    let outcome = runner
        .run_suite(suite, classes)
        .await
        .with_context(|| format!("suite {} aborted", suite.name()))?;

    if let Some(path) = reporting.report_path() {
        println!(
            "📄 Report for {} (started {}): {}",
            outcome.suite.name,
            outcome.suite.started_at.format("%H:%M:%S"),
            path.display()
        );
    }
    Ok(outcome.records)
}

fn write_summary(args: &Args, records: &[TestRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.summary {
        SummaryFormat::Json => generate_json_report(&mut output_target, records)?,
        SummaryFormat::Markdown => generate_markdown_report(&mut output_target, records)?,
        SummaryFormat::Console => {
            if records.is_empty() {
                writeln!(&mut output_target, "No tests executed.")?;
            } else {
                generate_console_report(&mut output_target, records, start_time.elapsed())?;
            }
        }
    }

    if args.summary == SummaryFormat::Console {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
