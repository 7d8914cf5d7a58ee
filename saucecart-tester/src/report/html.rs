use std::fmt::Write as _;
use std::path::Path;

use url::Url;

use super::{Outcome, ReportDocument, ReportEntry};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;background:#fafafa;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:6px 10px;text-align:left;vertical-align:top}\
th{background:#eee}\
.PASS{color:#1b7f1b}.FAIL{color:#b00020}.SKIP{color:#8a6d00}.FAIL_WITHIN_THRESHOLD{color:#c05a00}\
pre{white-space:pre-wrap;margin:0;font-size:0.85em}\
img{max-width:480px;border:1px solid #999;margin-top:6px}";

pub(super) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the self-contained HTML page for a finished suite.
#[must_use]
pub fn render_html(document: &ReportDocument) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html><head><meta charset=\"utf-8\">");
    let _ = writeln!(html, "<title>{}</title>", escape(&document.title));
    let _ = writeln!(html, "<style>{STYLE}</style></head><body>");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&document.report_name));

    let finished = document
        .finished_at
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    let _ = writeln!(
        html,
        "<p>Suite <b>{}</b> on <b>{}</b> against {}<br>Started {} &middot; Finished {}</p>",
        escape(&document.suite),
        escape(&document.browser),
        escape(&document.base_url),
        document.started_at.format("%Y-%m-%d %H:%M:%S"),
        finished
    );

    let _ = writeln!(html, "<ul class=\"summary\">");
    let _ = writeln!(html, "<li>Total: {}</li>", document.entries.len());
    for outcome in [
        Outcome::Pass,
        Outcome::Fail,
        Outcome::Skip,
        Outcome::FailWithinThreshold,
    ] {
        let _ = writeln!(
            html,
            "<li class=\"{outcome}\">{outcome}: {}</li>",
            document.count(outcome)
        );
    }
    let _ = writeln!(html, "</ul>");

    let _ = writeln!(
        html,
        "<table><tr><th>Test</th><th>Class</th><th>Status</th><th>Attempts</th><th>Details</th></tr>"
    );
    for entry in &document.entries {
        render_entry(&mut html, entry);
    }
    let _ = writeln!(html, "</table></body></html>");
    html
}

fn render_entry(html: &mut String, entry: &ReportEntry) {
    let status = entry.outcome.map_or("RUNNING", Outcome::label);
    let _ = write!(
        html,
        "<tr><td>{}</td><td>{}</td><td class=\"{status}\">{status}</td><td>{}</td><td>",
        escape(&entry.name),
        escape(&entry.class),
        entry.attempts
    );

    if let Some(reason) = &entry.skip_reason {
        let _ = write!(html, "<p>Skipped: {}</p>", escape(reason));
    }
    if let Some(failure) = &entry.failure {
        let _ = write!(
            html,
            "<p>{}</p><details><summary>Stack</summary><pre>{}</pre></details>",
            escape(&failure.message),
            escape(&failure.stack)
        );
    }
    if !entry.attempt_log.is_empty() {
        let _ = write!(html, "<details><summary>Earlier attempts</summary><ol>");
        for line in &entry.attempt_log {
            let _ = write!(html, "<li>{}</li>", escape(line));
        }
        let _ = write!(html, "</ol></details>");
    }
    if let Some(shot) = &entry.screenshot {
        let src = escape(&screenshot_href(shot));
        let _ = write!(
            html,
            "<a href=\"{src}\"><img src=\"{src}\" alt=\"screenshot\"></a>"
        );
    }
    let _ = writeln!(html, "</td></tr>");
}

/// `file://` URL for absolute paths; relative paths are linked as-is.
fn screenshot_href(shot: &Path) -> String {
    Url::from_file_path(shot).map_or_else(
        |()| shot.to_string_lossy().replace('\\', "/"),
        |url| url.to_string(),
    )
}
