use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    application::repos::{CreateUserParams, RepoError, UsersRepo, UsersWriteRepo},
    domain::analytics::MonthWindow,
    domain::entities::UserRecord,
    domain::types::{Gender, UserRole},
};

use super::{PostgresRepositories, map_sqlx_error};

const USER_COLUMNS: &str = "id, name, email, gender, date_of_birth, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    gender: Gender,
    date_of_birth: Date,
    role: UserRole,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            gender: row.gender,
            date_of_birth: row.date_of_birth,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn count_users(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_created_between(&self, window: MonthWindow) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_by_gender(&self, gender: Gender) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE gender = $1")
            .bind(gender)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_by_role(&self, role: UserRole) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn list_birth_dates(&self) -> Result<Vec<Date>, RepoError> {
        sqlx::query_scalar::<_, Date>("SELECT date_of_birth FROM users")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_created_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OffsetDateTime>, RepoError> {
        sqlx::query_scalar::<_, OffsetDateTime>(
            "SELECT created_at FROM users WHERE created_at >= $1",
        )
        .bind(start)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl UsersWriteRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, gender, date_of_birth, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.email)
        .bind(params.gender)
        .bind(params.date_of_birth)
        .bind(params.role)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
