use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::ApiResult;
use crate::main_lib::AppState;

/// Streams a stored PDF inline, e.g. for the review screen's preview pane.
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.documents.get(&file_name)?;
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, bytes))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/documents/{file_name}", get(get_document))
}
