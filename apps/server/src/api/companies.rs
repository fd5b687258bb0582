use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use verzoeken_core::companies::{Company, CompanyListResponse, NewCompany};
use verzoeken_core::users::{AuthContext, Role};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

fn require_admin(actor: &AuthContext) -> ApiResult<()> {
    if actor.role != Role::Administrator {
        return Err(ApiError::Forbidden(
            "Only administrators manage companies".to_string(),
        ));
    }
    Ok(())
}

async fn search_companies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CompanyListResponse>> {
    let response = state.company_service.list_companies()?;
    Ok(Json(response))
}

async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Company>> {
    let company = state.company_service.get_company(&id)?;
    Ok(Json(company))
}

async fn create_company(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Json(new_company): Json<NewCompany>,
) -> ApiResult<Json<Company>> {
    require_admin(&actor)?;
    let created = state.company_service.create_company(new_company)?;
    Ok(Json(created))
}

async fn delete_company(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    require_admin(&actor)?;
    let deleted = state.company_service.delete_company(&id)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Company '{}' not found", id)));
    }
    Ok(Json(json!({ "deleted": deleted })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies/search", post(search_companies))
        .route("/companies", post(create_company))
        .route(
            "/companies/{id}",
            axum::routing::get(get_company).delete(delete_company),
        )
}
