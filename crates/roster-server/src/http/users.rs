// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::RequestId;
use crate::http::response_contract::{
    json_rejection_response, not_found_response, store_error_response,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use roster_model::{CreateUserInput, UserId};
use serde_json::json;

pub(crate) const USER_CREATED_MESSAGE: &str = "User created successfully";

pub(crate) async fn list_users_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    match state.store.list_users().await {
        Ok(users) => Json(users).into_response(),
        Err(e) => store_error_response(&e, state.store.backend_tag(), request_id.as_str()),
    }
}

pub(crate) async fn get_user_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Response {
    // Ids are positive integers; anything else cannot name a user.
    let Ok(id) = raw_id.trim().parse::<UserId>() else {
        return not_found_response(&format!("user {raw_id} not found"), request_id.as_str());
    };
    match state.store.get_user(id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => store_error_response(&e, state.store.backend_tag(), request_id.as_str()),
    }
}

pub(crate) async fn create_user_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(body) => body,
        Err(rejection) => return json_rejection_response(&rejection, request_id.as_str()),
    };
    match state.store.create_user_from_input(input).await {
        Ok(id) => {
            tracing::info!(user_id = id, "user created");
            (
                StatusCode::CREATED,
                Json(json!({"id": id, "message": USER_CREATED_MESSAGE})),
            )
                .into_response()
        }
        Err(e) => store_error_response(&e, state.store.backend_tag(), request_id.as_str()),
    }
}
