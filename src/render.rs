//! Plain-text rendering of search results and breaker status for the CLI.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use sift_search::{BackendStatus, SearchResponse, UnavailableReport};

/// Outcome of one search run, as it appears in JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunReport {
    /// A backend answered.
    Answered(SearchResponse),
    /// No backend could answer.
    Unavailable(UnavailableReport),
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    runs: &'a [RunReport],
    status: &'a BTreeMap<String, BackendStatus>,
}

/// Render every run plus the final breaker status as one JSON document:
/// `{ "runs": [...], "status": {...} }`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(
    runs: &[RunReport],
    status: &BTreeMap<String, BackendStatus>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput { runs, status })
}

/// Render a successful response: one numbered block per result, then a
/// summary line naming the backend that answered.
pub fn render_results(response: &SearchResponse) -> String {
    let mut out = String::new();
    for result in &response.results {
        let _ = writeln!(out, "{:>2}. {}", result.position, result.title);
        let _ = writeln!(out, "    {}", result.url);
        if !result.description.is_empty() {
            let _ = writeln!(out, "    {}", result.description);
        }
    }
    let _ = write!(
        out,
        "{} result(s) from {} [{}-{}]",
        response.metadata.total_results,
        response.used_backend,
        response.metadata.language,
        response.metadata.country
    );
    if !response.failed.is_empty() {
        let _ = write!(out, ", failed: {}", response.failed.join(", "));
    }
    if !response.skipped.is_empty() {
        let _ = write!(out, ", circuit open: {}", response.skipped.join(", "));
    }
    out.push('\n');
    out
}

/// Render a breaker status table, one row per backend in name order.
pub fn render_status(status: &BTreeMap<String, BackendStatus>) -> String {
    let width = status
        .keys()
        .map(String::len)
        .chain(std::iter::once("BACKEND".len()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:<9}  {:>7}  {:>8}  {:>9}  RETRY AFTER",
        "BACKEND", "STATE", "CONSEC", "FAILURES", "SUCCESSES"
    );
    for (name, s) in status {
        let retry = s
            .retry_after_secs
            .map(|secs| format!("{secs:.1}s"))
            .unwrap_or_else(|| "-".to_owned());
        let _ = writeln!(
            out,
            "{:<width$}  {:<9}  {:>7}  {:>8}  {:>9}  {}",
            name,
            s.state.as_str(),
            s.consecutive_failures,
            s.failure_count,
            s.success_count,
            retry
        );
    }
    out
}

/// Render the diagnostics for a search that no backend could answer.
pub fn render_unavailable(report: &UnavailableReport) -> String {
    let mut out = format!("search for {:?} failed: {report}\n", report.query);
    if !report.status.is_empty() {
        out.push_str(&render_status(&report.status));
    }
    out
}
