//! Conversions shared by the row structs.
//!
//! UUIDs are stored as strings and enums as their variant names; dates
//! are stored as midnight UTC datetimes.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(entity: &'static str, field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::decode(entity, format!("invalid {field} UUID: {e}")))
}

pub(crate) fn date_to_datetime(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub(crate) fn datetime_to_date(datetime: DateTime<Utc>) -> NaiveDate {
    datetime.date_naive()
}
