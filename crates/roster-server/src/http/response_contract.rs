// SPDX-License-Identifier: Apache-2.0

use crate::report::ReportError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_model::ValidationError;
use roster_store::StoreError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

pub(crate) const GENERATION_FAILED_MESSAGE: &str = "failed to generate report";
pub(crate) const INTERNAL_MESSAGE: &str = "internal error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ApiErrorCode {
    ValidationFailed,
    PayloadTooLarge,
    Conflict,
    NotFound,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ApiErrorCode::Conflict => StatusCode::CONFLICT,
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub(crate) fn api_error(
    code: ApiErrorCode,
    message: &str,
    details: Value,
    request_id: &str,
) -> ApiError {
    ApiError {
        code,
        message: message.to_string(),
        details,
        request_id: request_id.to_string(),
    }
}

#[must_use]
pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = api_error_status(err.code);
    (status, Json(json!({"error": err}))).into_response()
}

#[must_use]
pub(crate) fn validation_details(err: &ValidationError) -> Value {
    json!({"field_errors": err.field_errors})
}

pub(crate) fn validation_error_response(err: &ValidationError, request_id: &str) -> Response {
    api_error_response(api_error(
        ApiErrorCode::ValidationFailed,
        &err.to_string(),
        validation_details(err),
        request_id,
    ))
}

pub(crate) fn json_rejection_response(rejection: &JsonRejection, request_id: &str) -> Response {
    let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiErrorCode::PayloadTooLarge
    } else {
        ApiErrorCode::ValidationFailed
    };
    api_error_response(api_error(
        code,
        "invalid request body",
        json!({"reason": rejection.body_text()}),
        request_id,
    ))
}

pub(crate) fn not_found_response(message: &str, request_id: &str) -> Response {
    api_error_response(api_error(
        ApiErrorCode::NotFound,
        message,
        json!({}),
        request_id,
    ))
}

pub(crate) fn internal_error_response(message: &str, request_id: &str) -> Response {
    api_error_response(api_error(
        ApiErrorCode::Internal,
        message,
        json!({}),
        request_id,
    ))
}

pub(crate) fn store_error_response(err: &StoreError, backend: &str, request_id: &str) -> Response {
    match err {
        StoreError::Validation(e) => validation_error_response(e, request_id),
        StoreError::Conflict(msg) => api_error_response(api_error(
            ApiErrorCode::Conflict,
            msg,
            json!({}),
            request_id,
        )),
        StoreError::NotFound(msg) => not_found_response(msg, request_id),
        other => {
            error!(request_id, backend, error = %other, "store operation failed");
            internal_error_response(INTERNAL_MESSAGE, request_id)
        }
    }
}

/// Every report failure, rejected input included, carries `"success": false`.
pub(crate) fn report_error_response(err: &ReportError, request_id: &str) -> Response {
    let error = match err {
        ReportError::Validation(e) => api_error(
            ApiErrorCode::ValidationFailed,
            &e.to_string(),
            validation_details(e),
            request_id,
        ),
        _ => {
            error!(
                request_id,
                stage = err.stage().map(|s| s.as_str()).unwrap_or("receive_request"),
                error = %err,
                "report generation failed"
            );
            api_error(
                ApiErrorCode::Internal,
                GENERATION_FAILED_MESSAGE,
                json!({}),
                request_id,
            )
        }
    };
    let status = api_error_status(error.code);
    (status, Json(json!({"error": error, "success": false}))).into_response()
}
