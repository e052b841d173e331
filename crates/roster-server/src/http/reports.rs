// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::RequestId;
use crate::http::response_contract::{
    json_rejection_response, report_error_response, store_error_response,
};
use crate::report::ReportError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use roster_model::{GenerateReportInput, GenerateReportRequest};
use serde_json::json;

pub(crate) const PDF_GENERATED_MESSAGE: &str = "PDF generated successfully";

pub(crate) async fn list_reports_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    match state.store.list_reports().await {
        Ok(reports) => Json(reports).into_response(),
        Err(e) => store_error_response(&e, state.store.backend_tag(), request_id.as_str()),
    }
}

pub(crate) async fn generate_pdf_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<GenerateReportInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(body) => body,
        Err(rejection) => return json_rejection_response(&rejection, request_id.as_str()),
    };
    let request = match GenerateReportRequest::validate(input) {
        Ok(request) => request,
        Err(e) => return report_error_response(&ReportError::Validation(e), request_id.as_str()),
    };
    match state.reports.generate(request).await {
        Ok(generated) => Json(json!({
            "success": true,
            "filename": generated.filename,
            "downloadUrl": generated.download_url,
            "message": PDF_GENERATED_MESSAGE,
            "reportId": generated.report_id,
            "userCount": generated.user_count,
        }))
        .into_response(),
        Err(e) => report_error_response(&e, request_id.as_str()),
    }
}
