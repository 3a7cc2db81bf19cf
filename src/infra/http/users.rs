use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::Date;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::CreateUserParams;
use crate::domain::types::{Gender, UserRole};

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct CreateUserBody {
    name: String,
    email: String,
    gender: Gender,
    date_of_birth: Date,
    #[serde(default = "default_role")]
    role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Customer
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<Response, AppError> {
    let user = state
        .users
        .create_user(CreateUserParams {
            name: body.name,
            email: body.email,
            gender: body.gender,
            date_of_birth: body.date_of_birth,
            role: body.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": user })),
    )
        .into_response())
}

pub(super) async fn single(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let user = state.users.user(id).await?;
    Ok(Json(json!({ "success": true, "user": user })).into_response())
}
