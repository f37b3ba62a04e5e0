//! Customer spending report types.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::Order;

/// Errors returned when building a [`ReportWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportWindowError {
    InvalidDate {
        value: String,
    },
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl fmt::Display for ReportWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate { value } => write!(
                f,
                "'{value}' is neither a YYYY-MM-DD date nor an RFC 3339 timestamp"
            ),
            Self::StartAfterEnd { start, end } => {
                write!(f, "report start ({start}) is after report end ({end})")
            }
        }
    }
}

impl std::error::Error for ReportWindowError {}

/// Inclusive `[start, end]` range of order creation instants.
///
/// # Examples
/// ```
/// use storefront::domain::ReportWindow;
///
/// let window = ReportWindow::parse("2024-01-01", "2024-01-31").expect("valid window");
/// assert_eq!(window.end().to_rfc3339(), "2024-01-31T23:59:59.999+00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReportWindowError> {
        if start > end {
            return Err(ReportWindowError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a window from text bounds.
    ///
    /// A bare date covers the whole day: the start bound begins at midnight
    /// and the end bound runs to the last millisecond of that day.
    pub fn parse(start: &str, end: &str) -> Result<Self, ReportWindowError> {
        let start = parse_bound(start, NaiveTime::MIN)?;
        let end = parse_bound(end, end_of_day())?;
        Self::new(start, end)
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn parse_bound(text: &str, day_time: NaiveTime) -> Result<DateTime<Utc>, ReportWindowError> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(day_time).and_utc());
    }
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| ReportWindowError::InvalidDate {
            value: text.to_owned(),
        })
}

/// One report row: a customer's aggregate spend and the orders behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    pub customer_id: String,
    pub total: f64,
    pub orders: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .expect("valid instant")
    }

    #[rstest]
    fn bare_dates_cover_whole_days() {
        let window = ReportWindow::parse("2024-01-01", "2024-01-31").expect("valid window");
        assert_eq!(window.start(), at(2024, 1, 1, 0, 0, 0));
        assert_eq!(
            window.end(),
            at(2024, 1, 31, 23, 59, 59) + chrono::Duration::milliseconds(999)
        );
    }

    #[rstest]
    fn rfc3339_bounds_are_taken_verbatim() {
        let window = ReportWindow::parse("2024-01-01T10:00:00+02:00", "2024-01-01T12:00:00Z")
            .expect("valid window");
        assert_eq!(window.start(), at(2024, 1, 1, 8, 0, 0));
        assert_eq!(window.end(), at(2024, 1, 1, 12, 0, 0));
    }

    #[rstest]
    fn single_day_windows_are_valid() {
        let window = ReportWindow::parse("2024-01-05", "2024-01-05").expect("valid window");
        assert!(window.start() < window.end());
        assert_eq!(window.start(), at(2024, 1, 5, 0, 0, 0));
    }

    #[rstest]
    #[case("yesterday", "2024-01-31")]
    #[case("2024-01-01", "2024-13-01")]
    fn unparseable_bounds_are_rejected(#[case] start: &str, #[case] end: &str) {
        let err = ReportWindow::parse(start, end).expect_err("invalid bound");
        assert!(matches!(err, ReportWindowError::InvalidDate { .. }));
    }

    #[rstest]
    fn inverted_windows_are_rejected() {
        let err = ReportWindow::new(at(2024, 2, 1, 0, 0, 0), at(2024, 1, 1, 0, 0, 0))
            .expect_err("start after end");
        assert!(err.to_string().contains("is after report end"));
    }
}
