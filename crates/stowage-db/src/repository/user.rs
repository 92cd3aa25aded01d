//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use stowage_core::error::StowageResult;
use stowage_core::models::user::{CreateUser, User, UserRole};
use stowage_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::row::parse_uuid;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    received_reviews: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_role(s: &str) -> Result<UserRole, DbError> {
    match s {
        "Owner" => Ok(UserRole::Owner),
        "Agent" => Ok(UserRole::Agent),
        "Administrator" => Ok(UserRole::Administrator),
        other => Err(DbError::decode("user", format!("unknown role: {other}"))),
    }
}

pub(crate) fn role_to_string(role: UserRole) -> &'static str {
    match role {
        UserRole::Owner => "Owner",
        UserRole::Agent => "Agent",
        UserRole::Administrator => "Administrator",
    }
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let received_reviews = self
            .received_reviews
            .iter()
            .map(|raw| parse_uuid("user", "review", raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(User {
            id: parse_uuid("user", "record", &self.record_id)?,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role: parse_role(&self.role)?,
            received_reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> StowageResult<User> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, role = $role, \
                 received_reviews = []; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("role", role_to_string(input.role).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, id: Uuid) -> StowageResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_username(&self, username: &str) -> StowageResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", format!("username={username}")))?;

        Ok(row.try_into_user()?)
    }

    async fn list_by_role(&self, role: UserRole) -> StowageResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE role = $role ORDER BY username ASC",
            )
            .bind(("role", role_to_string(role).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }
}
