use chrono::{DateTime, NaiveDate, Utc};
use tracing::error;

use backend_domain::EventFilter;

use crate::dtos::{EventRecord, StatsQuery};
use crate::AppError;
use crate::AppState;

pub const DEFAULT_QUERY_LIMIT: usize = 100;
/// Ceiling on a single stats page, bounding response size and store read
/// cost regardless of the requested limit.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Returns a bounded page of events, most recent first. All supplied
/// filters must match; an empty result is not an error.
pub async fn list_events(
    state: &AppState,
    query: StatsQuery,
) -> Result<Vec<EventRecord>, AppError> {
    let filter = build_filter(&query)?;
    let events = state.event_repo.fetch_events(&filter).await.map_err(|err| {
        error!("failed to fetch events: {}", err);
        state.metrics.record_store_error();
        AppError::Internal(err)
    })?;
    state.metrics.record_query();
    Ok(events.into_iter().map(EventRecord::from).collect())
}

fn build_filter(query: &StatsQuery) -> Result<EventFilter, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_QUERY_LIMIT as i64)
        .clamp(1, MAX_QUERY_LIMIT as i64) as usize;

    Ok(EventFilter {
        event_type: non_empty(query.event_type.as_deref()),
        country: non_empty(query.country.as_deref()),
        session_id: non_empty(query.session_id.as_deref()),
        start_ms: parse_date_bound(query.start_date.as_deref(), "startDate")?,
        end_ms: parse_date_bound(query.end_date.as_deref(), "endDate")?,
        limit,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` date, which is taken as
/// midnight UTC. Both bounds are compared inclusively.
fn parse_date_bound(raw: Option<&str>, field: &'static str) -> Result<Option<i64>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.timestamp_millis()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
            .timestamp_millis();
        return Ok(Some(midnight));
    }
    Err(AppError::BadRequest(format!(
        "invalid {}: expected RFC 3339 or YYYY-MM-DD",
        field
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps_to_the_ceiling() {
        let filter = build_filter(&StatsQuery::default()).unwrap();
        assert_eq!(filter.limit, DEFAULT_QUERY_LIMIT);

        let filter = build_filter(&StatsQuery {
            limit: Some(1_000_000),
            ..StatsQuery::default()
        })
        .unwrap();
        assert_eq!(filter.limit, MAX_QUERY_LIMIT);

        let filter = build_filter(&StatsQuery {
            limit: Some(-5),
            ..StatsQuery::default()
        })
        .unwrap();
        assert_eq!(filter.limit, 1);
    }

    #[test]
    fn date_bounds_accept_rfc3339_and_bare_dates() {
        let query = StatsQuery {
            start_date: Some("2025-03-01".to_string()),
            end_date: Some("2025-03-02T12:30:00Z".to_string()),
            ..StatsQuery::default()
        };
        let filter = build_filter(&query).unwrap();
        assert_eq!(filter.start_ms, Some(1_740_787_200_000));
        assert_eq!(filter.end_ms, Some(1_740_918_600_000));
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        let query = StatsQuery {
            start_date: Some("yesterday".to_string()),
            ..StatsQuery::default()
        };
        let err = build_filter(&query).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn blank_filters_are_dropped() {
        let query = StatsQuery {
            event_type: Some("  ".to_string()),
            country: Some("Chile".to_string()),
            ..StatsQuery::default()
        };
        let filter = build_filter(&query).unwrap();
        assert_eq!(filter.event_type, None);
        assert_eq!(filter.country.as_deref(), Some("Chile"));
    }
}
