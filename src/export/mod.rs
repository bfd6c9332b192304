use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, info, warn};

use crate::backend::ScanBackend;
use crate::core::{ScanResult, Severity, Vulnerability, VulnerabilityGroups};
use crate::error::{NO_RESULTS, ScanError, TransportError};
use crate::state::UiState;
use crate::view::View;

const SEPARATOR: &str = "==================================================";

/// A finished file ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `YYYY-MM-DDTHHMMSS` in UTC: ISO-8601 cut to seconds with the colons removed.
pub fn report_timestamp(now: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day]T[hour][minute][second]");
    now.to_offset(time::UtcOffset::UTC)
        .format(fmt)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

pub fn text_report_file_name(now: OffsetDateTime) -> String {
    format!("security_scan_report_{}.txt", report_timestamp(now))
}

pub fn pdf_report_file_name(now: OffsetDateTime) -> String {
    format!("security_report_{}.pdf", report_timestamp(now))
}

pub fn text_report(result: &ScanResult) -> String {
    let summary = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Scan Summary");
    let _ = writeln!(out, "{SEPARATOR}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Vulnerabilities Found: {}", summary.total);
    let _ = writeln!(out, "High Risk: {}", summary.high_risk);
    let _ = writeln!(out, "Medium Risk: {}", summary.medium_risk);
    let _ = writeln!(out, "Low Risk: {}", summary.low_risk);
    let _ = writeln!(out);
    let _ = writeln!(out, "Vulnerabilities by Risk Level:");
    for severity in Severity::ALL {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}:", severity.section_title());
        let _ = writeln!(out, "{}", format_block(result.vulnerabilities.get(severity)));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Scan completed!");
    out
}

fn format_block(vulns: &[Vulnerability]) -> String {
    vulns
        .iter()
        .map(|v| {
            format!(
                "- {}\n  Description: {}\n  Evidence: {}\n  Fix: {}\n",
                v.name, v.description, v.evidence, v.fix_recommendation
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes `download` into `dir` under its file name. The bytes go to a temporary sibling first;
/// the temporary file is removed on every path that does not end in the final rename.
pub fn save_download(dir: &Path, download: &Download) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".secuscan-")
        .suffix(".part")
        .tempfile_in(dir)?;
    tmp.write_all(&download.bytes)?;
    tmp.flush()?;

    let dest = dir.join(&download.file_name);
    tmp.persist(&dest).map_err(|err| err.error)?;
    debug!(path = %dest.display(), bytes = download.bytes.len(), "saved download");
    Ok(dest)
}

/// Builds the plain-text report from the retained result and hands it to the view.
pub fn export_text<V: View>(
    state: &UiState,
    view: &mut V,
    now: OffsetDateTime,
) -> Result<(), ScanError> {
    let Some(result) = state.retained() else {
        view.show_error(NO_RESULTS);
        return Err(ScanError::ExportPrecondition);
    };

    let download = Download {
        file_name: text_report_file_name(now),
        content_type: "text/plain",
        bytes: text_report(result).into_bytes(),
    };
    let file_name = download.file_name.clone();
    match view.deliver_download(download) {
        Ok(()) => {
            info!(file = %file_name, "text report exported");
            Ok(())
        }
        Err(err) => {
            let err = ScanError::Export(err.to_string());
            view.show_error(&err.to_string());
            Err(err)
        }
    }
}

/// What the server needs to render a PDF: the retained findings and the URL field's current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfExportRequest {
    pub vulnerabilities: VulnerabilityGroups,
    pub url: String,
}

/// Checks that a result is retained and captures the request for `POST /download_report`.
pub fn begin_pdf_export<V: View>(
    state: &UiState,
    view: &mut V,
) -> Result<PdfExportRequest, ScanError> {
    let Some(result) = state.retained() else {
        view.show_alert(NO_RESULTS);
        return Err(ScanError::ExportPrecondition);
    };
    Ok(PdfExportRequest {
        vulnerabilities: result.vulnerabilities.clone(),
        url: view.url_value(),
    })
}

/// Hands the generated document to the view, or alerts with the failure reason.
pub fn finish_pdf_export<V: View>(
    view: &mut V,
    outcome: Result<Vec<u8>, TransportError>,
    now: OffsetDateTime,
) -> Result<(), ScanError> {
    let outcome = outcome
        .map_err(|err| match err {
            TransportError::Status(code) => {
                debug!(status = code, "report generation rejected");
                "Failed to generate report".to_string()
            }
            other => other.to_string(),
        })
        .and_then(|bytes| {
            view.deliver_download(Download {
                file_name: pdf_report_file_name(now),
                content_type: "application/pdf",
                bytes,
            })
            .map_err(|err| err.to_string())
        });

    match outcome {
        Ok(()) => {
            info!("pdf report exported");
            Ok(())
        }
        Err(reason) => {
            warn!(%reason, "pdf report export failed");
            let err = ScanError::Export(reason);
            view.show_alert(&err.to_string());
            Err(err)
        }
    }
}

/// Asks the server to render a PDF of the retained result and hands the bytes to the view.
pub async fn export_pdf<B: ScanBackend, V: View>(
    state: &UiState,
    view: &mut V,
    backend: &B,
    now: OffsetDateTime,
) -> Result<(), ScanError> {
    let request = begin_pdf_export(state, view)?;
    let outcome = backend
        .download_report(&request.vulnerabilities, &request.url)
        .await;
    finish_pdf_export(view, outcome, now)
}
