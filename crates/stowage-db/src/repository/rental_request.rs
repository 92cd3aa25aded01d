//! SurrealDB implementation of [`RentalRequestRepository`].
//!
//! Accept and decline run as single transactions built on conditional
//! updates, so two agents racing for the same warehouse cannot both win.

use chrono::{DateTime, Utc};
use stowage_core::error::{StowageError, StowageResult};
use stowage_core::models::rental_request::{
    CreateRequestDetails, RentalRequest, RequestDetails, RequestStatus,
};
use stowage_core::repository::RentalRequestRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::row::{date_to_datetime, datetime_to_date, parse_uuid};
use crate::transaction::in_transaction;

/// Accept the target if still open; only then invalidate the siblings
/// owned by other agents.
const ACCEPT_TX: &str = "\
LET $target = (UPDATE type::record('rental_request', $id) SET \
    status = 'Accepted', updated_at = time::now() \
    WHERE status = 'Pending' AND invalid = false RETURN AFTER);
IF array::len($target) > 0 {
    UPDATE rental_request SET invalid = true, updated_at = time::now() \
        WHERE warehouse_id = $target[0].warehouse_id \
        AND agent_id != $target[0].agent_id \
        AND invalid = false;
};
";

/// Decline the target and release the warehouse once no valid request
/// is left for it.
const DECLINE_TX: &str = "\
LET $declined = (UPDATE type::record('rental_request', $id) SET \
    status = 'Declined', invalid = true, updated_at = time::now() \
    RETURN AFTER);
IF array::len($declined) > 0 {
    LET $open = (SELECT VALUE meta::id(id) FROM rental_request \
        WHERE warehouse_id = $declined[0].warehouse_id \
        AND invalid = false);
    IF array::len($open) = 0 {
        UPDATE type::record('warehouse', $declined[0].warehouse_id) SET \
            status = 'Available', updated_at = time::now() \
            WHERE status = 'PendingRental';
    };
};
";

const CREATE_BATCH_TX: &str = "\
CREATE type::record('request_details', $details_id) SET \
    warehouse_id = $warehouse_id, \
    monthly_price_cents = $monthly_price_cents, \
    start_date = $start_date, end_date = $end_date;
FOR $request IN $requests {
    CREATE type::record('rental_request', $request.id) SET \
        details_id = $details_id, warehouse_id = $warehouse_id, \
        agent_id = $request.agent_id, \
        status = 'Pending', invalid = false;
};
";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct RentalRequestRow {
    record_id: String,
    details_id: String,
    warehouse_id: String,
    agent_id: String,
    status: String,
    invalid: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RequestDetailsRow {
    warehouse_id: String,
    monthly_price_cents: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<RequestStatus, DbError> {
    match s {
        "Pending" => Ok(RequestStatus::Pending),
        "Accepted" => Ok(RequestStatus::Accepted),
        "Declined" => Ok(RequestStatus::Declined),
        other => Err(DbError::decode(
            "rental_request",
            format!("unknown status: {other}"),
        )),
    }
}

fn status_to_string(s: RequestStatus) -> &'static str {
    match s {
        RequestStatus::Pending => "Pending",
        RequestStatus::Accepted => "Accepted",
        RequestStatus::Declined => "Declined",
    }
}

impl RentalRequestRow {
    fn try_into_request(self) -> Result<RentalRequest, DbError> {
        Ok(RentalRequest {
            id: parse_uuid("rental_request", "record", &self.record_id)?,
            details_id: parse_uuid("rental_request", "details", &self.details_id)?,
            warehouse_id: parse_uuid("rental_request", "warehouse", &self.warehouse_id)?,
            agent_id: parse_uuid("rental_request", "agent", &self.agent_id)?,
            status: parse_status(&self.status)?,
            invalid: self.invalid,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the RentalRequest repository.
#[derive(Clone)]
pub struct SurrealRentalRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRentalRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select(
        &self,
        clause: &str,
        bind: (&'static str, String),
    ) -> Result<Vec<RentalRequest>, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM rental_request \
             WHERE {clause} ORDER BY created_at ASC"
        );
        let mut result = self.db.query(&query).bind(bind).await?;

        let rows: Vec<RentalRequestRow> = result.take(0)?;

        rows.into_iter()
            .map(|row| row.try_into_request())
            .collect()
    }

    /// Run a single-record update and fail with `NotFound` if the record
    /// does not exist.
    async fn update_one(
        &self,
        id: Uuid,
        set: &str,
        bind: Option<(&'static str, String)>,
    ) -> StowageResult<()> {
        let id_str = id.to_string();
        let query = format!(
            "UPDATE type::record('rental_request', $id) SET {set}, \
             updated_at = time::now() RETURN VALUE meta::id(id)"
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(bind) = bind {
            builder = builder.bind(bind);
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        if ids.is_empty() {
            return Err(DbError::not_found("rental_request", id_str).into());
        }

        Ok(())
    }
}

impl<C: Connection> RentalRequestRepository for SurrealRentalRequestRepository<C> {
    async fn create_batch(
        &self,
        details: CreateRequestDetails,
        agent_ids: &[Uuid],
    ) -> StowageResult<(RequestDetails, Vec<RentalRequest>)> {
        if agent_ids.is_empty() {
            return Err(StowageError::validation("at least one agent is required"));
        }

        let details_id = Uuid::new_v4();
        let requests: Vec<serde_json::Value> = agent_ids
            .iter()
            .map(|agent_id| {
                serde_json::json!({
                    "id": Uuid::new_v4().to_string(),
                    "agent_id": agent_id.to_string(),
                })
            })
            .collect();

        in_transaction(&self.db, CREATE_BATCH_TX, |q| {
            q.bind(("details_id", details_id.to_string()))
                .bind(("warehouse_id", details.warehouse_id.to_string()))
                .bind(("monthly_price_cents", details.monthly_price_cents))
                .bind(("start_date", date_to_datetime(details.start_date)))
                .bind(("end_date", date_to_datetime(details.end_date)))
                .bind(("requests", serde_json::Value::Array(requests)))
        })
        .await?;

        let created = self
            .select("details_id = $details_id", ("details_id", details_id.to_string()))
            .await?;

        Ok((
            RequestDetails {
                id: details_id,
                warehouse_id: details.warehouse_id,
                monthly_price_cents: details.monthly_price_cents,
                start_date: details.start_date,
                end_date: details.end_date,
            },
            created,
        ))
    }

    async fn get_by_id(&self, id: Uuid) -> StowageResult<RentalRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('rental_request', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RentalRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("rental_request", id_str))?;

        Ok(row.try_into_request()?)
    }

    async fn get_details(&self, details_id: Uuid) -> StowageResult<RequestDetails> {
        let id_str = details_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('request_details', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RequestDetailsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("request_details", id_str))?;

        Ok(RequestDetails {
            id: details_id,
            warehouse_id: parse_uuid("request_details", "warehouse", &row.warehouse_id)?,
            monthly_price_cents: row.monthly_price_cents,
            start_date: datetime_to_date(row.start_date),
            end_date: datetime_to_date(row.end_date),
        })
    }

    async fn find_all_by_warehouse(
        &self,
        warehouse_id: Uuid,
        include_invalid: bool,
    ) -> StowageResult<Vec<RentalRequest>> {
        let clause = if include_invalid {
            "warehouse_id = $warehouse_id"
        } else {
            "warehouse_id = $warehouse_id AND invalid = false"
        };

        Ok(self
            .select(clause, ("warehouse_id", warehouse_id.to_string()))
            .await?)
    }

    async fn find_all_by_status_and_agent(
        &self,
        status: RequestStatus,
        agent_id: Uuid,
    ) -> StowageResult<Vec<RentalRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM rental_request \
                 WHERE agent_id = $agent_id AND status = $status \
                 AND invalid = false \
                 ORDER BY created_at ASC",
            )
            .bind(("agent_id", agent_id.to_string()))
            .bind(("status", status_to_string(status).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RentalRequestRow> = result.take(0).map_err(DbError::from)?;

        let requests = rows
            .into_iter()
            .map(|row| row.try_into_request())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(requests)
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> StowageResult<()> {
        self.update_one(
            id,
            "status = $status",
            Some(("status", status_to_string(status).to_string())),
        )
        .await
    }

    async fn set_invalid(&self, id: Uuid, invalid: bool) -> StowageResult<()> {
        let set = if invalid {
            "invalid = true"
        } else {
            "invalid = false"
        };
        self.update_one(id, set, None).await
    }

    async fn accept(&self, id: Uuid) -> StowageResult<RentalRequest> {
        in_transaction(&self.db, ACCEPT_TX, |q| q.bind(("id", id.to_string()))).await?;
        self.get_by_id(id).await
    }

    async fn decline(&self, id: Uuid) -> StowageResult<RentalRequest> {
        in_transaction(&self.db, DECLINE_TX, |q| q.bind(("id", id.to_string()))).await?;
        self.get_by_id(id).await
    }
}
