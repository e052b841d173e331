// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::RequestId;
use crate::http::response_contract::{
    internal_error_response, not_found_response, INTERNAL_MESSAGE,
};
use crate::report::is_report_file_name;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use std::io::ErrorKind;
use tracing::error;

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub(crate) async fn download_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(filename): Path<String>,
) -> Response {
    if !is_report_file_name(&filename) {
        return not_found_response("report file not found", request_id.as_str());
    }
    let path = state.reports.output_dir().join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            not_found_response("report file not found", request_id.as_str())
        }
        Err(e) => {
            error!(
                request_id = request_id.as_str(),
                file = %path.display(),
                error = %e,
                "reading report file failed"
            );
            internal_error_response(INTERNAL_MESSAGE, request_id.as_str())
        }
    }
}
