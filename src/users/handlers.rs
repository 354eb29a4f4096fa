use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse, SignupRequest},
        repo::StoreError,
        usecase::UserError,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users/signup", post(signup))
        .route("/v1/users/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<&'static str>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(bad_body)?;
    state.users.signup(payload).await.map_err(into_status)?;
    Ok((StatusCode::CREATED, Json("Sign up successful")))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let Json(payload) = payload.map_err(bad_body)?;
    let resp = state.users.login(payload).await.map_err(into_status)?;
    Ok(Json(resp))
}

fn bad_body(e: JsonRejection) -> (StatusCode, String) {
    warn!(error = %e, "undecodable request body");
    (StatusCode::BAD_REQUEST, e.body_text())
}

/// One status per failure category; only the status is contractual.
pub(crate) fn into_status(e: UserError) -> (StatusCode, String) {
    match e {
        UserError::Validation(_) => {
            warn!(error = %e, "rejected request");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        UserError::InvalidCredentials => (StatusCode::BAD_REQUEST, e.to_string()),
        UserError::Store(StoreError::Duplicate(_)) => {
            (StatusCode::CONFLICT, "Email already exists".into())
        }
        UserError::Store(StoreError::NotFound) => (StatusCode::NOT_FOUND, "User not found".into()),
        UserError::Store(StoreError::Database(_))
        | UserError::Hashing(_)
        | UserError::Signing(_) => {
            error!(error = %e, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            )
        }
    }
}
