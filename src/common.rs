/// Common types and utilities shared across handlers and services
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::ServiceError;

/// Inclusive `[start, end]` window over `transaction_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Monday 00:00 UTC of the week containing `now`, through the following Sunday.
    pub fn current_week(now: DateTime<Utc>) -> Self {
        let monday = now.date_naive()
            - Duration::days(i64::from(now.weekday().num_days_from_monday()));
        let start = start_of_day(monday);
        Self {
            start,
            end: start + Duration::days(7) - Duration::microseconds(1),
        }
    }

    /// The `days` days leading up to and including `now`.
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }
}

/// Date range parameters for filtering queries
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeParams {
    /// First day included, `YYYY-MM-DD`
    #[param(example = "2024-06-01")]
    pub start_date: Option<String>,
    /// Last day included, `YYYY-MM-DD`
    #[param(example = "2024-06-30")]
    pub end_date: Option<String>,
}

impl DateRangeParams {
    /// Parses the query dates into a window; the end date covers its whole day.
    ///
    /// Returns `Ok(None)` when neither date is given so the caller can apply
    /// its own default window.
    pub fn to_window(&self) -> Result<Option<DateWindow>, ServiceError> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_day(start, "start_date")?;
                let end = parse_day(end, "end_date")?;
                if end < start {
                    return Err(ServiceError::ValidationError(
                        "end_date must not be before start_date".to_string(),
                    ));
                }
                Ok(Some(DateWindow {
                    start: start_of_day(start),
                    end: end_of_day(end),
                }))
            }
            _ => Err(ServiceError::ValidationError(
                "start_date and end_date must be provided together".to_string(),
            )),
        }
    }
}

fn parse_day(raw: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ServiceError::ValidationError(format!("Invalid {} format (expected YYYY-MM-DD): {}", field, e))
    })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    NaiveDateTime::new(day, NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    start_of_day(day) + Duration::days(1) - Duration::microseconds(1)
}
