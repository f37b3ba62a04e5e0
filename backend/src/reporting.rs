//! Spending report rendering for command-line callers.

use serde::Serialize;

use crate::domain::ports::{OrderRepository, RepositoryError};
use crate::domain::{CustomerReport, ReportWindow};

/// Errors raised while producing a rendered report.
#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON envelope written by the report CLI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    start: String,
    end: String,
    customers: &'a [CustomerReport],
}

/// Run the spending report for `window` and render it as pretty JSON.
pub async fn render_report(
    orders: &dyn OrderRepository,
    window: ReportWindow,
) -> Result<String, ReportingError> {
    let customers = orders.generate_report(window).await?;
    let document = ReportDocument {
        start: window.start().to_rfc3339(),
        end: window.end().to_rfc3339(),
        customers: &customers,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
