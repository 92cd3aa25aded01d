//! SurrealDB implementation of [`RentalAgreementRepository`].
//!
//! Recording an agreement is one transaction: the originating request is
//! consumed, the warehouse flips to `Rented`, and the tenant and agreement
//! rows are created. A failed guard aborts everything.

use chrono::{DateTime, Utc};
use stowage_core::error::StowageResult;
use stowage_core::models::rental_agreement::{NewRentalAgreement, RentalAgreement};
use stowage_core::repository::RentalAgreementRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::row::{date_to_datetime, datetime_to_date, parse_uuid};
use crate::transaction::in_transaction;

const SAVE_TX: &str = "\
LET $consumed = (UPDATE type::record('rental_request', $request_id) SET \
    invalid = true, updated_at = time::now() \
    WHERE status = 'Accepted' AND invalid = false \
    AND agent_id = $agent_id AND warehouse_id = $warehouse_id \
    RETURN AFTER);
IF array::len($consumed) = 0 {
    THROW 'rental request is not an open accepted request of this agent';
};
LET $rented = (UPDATE type::record('warehouse', $warehouse_id) SET \
    status = 'Rented', updated_at = time::now() \
    WHERE status = 'PendingRental' AND deleted = false \
    RETURN AFTER);
IF array::len($rented) = 0 {
    THROW 'warehouse is not pending rental';
};
CREATE type::record('tenant', $tenant_id) SET \
    first_name = $first_name, last_name = $last_name, company = $company;
CREATE type::record('rental_agreement', $agreement_id) SET \
    warehouse_id = $warehouse_id, agent_id = $agent_id, \
    tenant_id = $tenant_id, request_id = $request_id, \
    start_date = $start_date, end_date = $end_date, \
    monthly_price_cents = $monthly_price_cents;
";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct RentalAgreementRow {
    record_id: String,
    warehouse_id: String,
    agent_id: String,
    tenant_id: String,
    request_id: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    monthly_price_cents: i64,
    created_at: DateTime<Utc>,
}

impl RentalAgreementRow {
    fn try_into_agreement(self) -> Result<RentalAgreement, DbError> {
        const ENTITY: &str = "rental_agreement";
        Ok(RentalAgreement {
            id: parse_uuid(ENTITY, "record", &self.record_id)?,
            warehouse_id: parse_uuid(ENTITY, "warehouse", &self.warehouse_id)?,
            agent_id: parse_uuid(ENTITY, "agent", &self.agent_id)?,
            tenant_id: parse_uuid(ENTITY, "tenant", &self.tenant_id)?,
            request_id: parse_uuid(ENTITY, "request", &self.request_id)?,
            start_date: datetime_to_date(self.start_date),
            end_date: datetime_to_date(self.end_date),
            monthly_price_cents: self.monthly_price_cents,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the RentalAgreement repository.
#[derive(Clone)]
pub struct SurrealRentalAgreementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRentalAgreementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        field: &'static str,
        value: Uuid,
    ) -> StowageResult<Vec<RentalAgreement>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM rental_agreement \
             WHERE {field} = $value ORDER BY created_at ASC"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RentalAgreementRow> = result.take(0).map_err(DbError::from)?;

        let agreements = rows
            .into_iter()
            .map(|row| row.try_into_agreement())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(agreements)
    }
}

impl<C: Connection> RentalAgreementRepository for SurrealRentalAgreementRepository<C> {
    async fn save(&self, input: NewRentalAgreement) -> StowageResult<RentalAgreement> {
        let agreement_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        in_transaction(&self.db, SAVE_TX, |q| {
            q.bind(("agreement_id", agreement_id.to_string()))
                .bind(("tenant_id", tenant_id.to_string()))
                .bind(("request_id", input.request_id.to_string()))
                .bind(("warehouse_id", input.warehouse_id.to_string()))
                .bind(("agent_id", input.agent_id.to_string()))
                .bind(("first_name", input.tenant.first_name))
                .bind(("last_name", input.tenant.last_name))
                .bind(("company", input.tenant.company))
                .bind(("start_date", date_to_datetime(input.start_date)))
                .bind(("end_date", date_to_datetime(input.end_date)))
                .bind(("monthly_price_cents", input.monthly_price_cents))
        })
        .await?;

        self.get_by_id(agreement_id).await
    }

    async fn get_by_id(&self, id: Uuid) -> StowageResult<RentalAgreement> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('rental_agreement', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RentalAgreementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("rental_agreement", id_str))?;

        Ok(row.try_into_agreement()?)
    }

    async fn list_by_agent(&self, agent_id: Uuid) -> StowageResult<Vec<RentalAgreement>> {
        self.list_where("agent_id", agent_id).await
    }

    async fn list_by_warehouse(&self, warehouse_id: Uuid) -> StowageResult<Vec<RentalAgreement>> {
        self.list_where("warehouse_id", warehouse_id).await
    }
}
