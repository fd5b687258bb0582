use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use verzoeken_core::users::{
    AuthContext, NewUser, Role, User, UserListQuery, UserListResponse, UserUpdate,
};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

fn require_admin(actor: &AuthContext) -> ApiResult<()> {
    if actor.role != Role::Administrator {
        return Err(ApiError::Forbidden(
            "Only administrators manage accounts".to_string(),
        ));
    }
    Ok(())
}

async fn search_users(
    State(state): State<Arc<AppState>>,
    Json(query): Json<UserListQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let response = state.user_service.list_users(&query)?;
    Ok(Json(response))
}

#[derive(serde::Deserialize)]
struct CreateUserBody {
    name: String,
    email: String,
    password: String,
    role: Role,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<Json<User>> {
    require_admin(&actor)?;
    let password = state.auth.hash_password(&body.password)?;
    let created = state.user_service.create_user(NewUser {
        name: body.name,
        email: body.email,
        password,
        role: body.role,
    })?;
    Ok(Json(created))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.get_user(&id)?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(mut update): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    require_admin(&actor)?;
    if let Some(plain) = update.password.take() {
        update.password = Some(state.auth.hash_password(&plain)?);
    }
    let updated = state.user_service.update_user(&id, update)?;
    Ok(Json(updated))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    require_admin(&actor)?;
    let deleted = state.user_service.delete_user(&id)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("User '{}' not found", id)));
    }
    Ok(Json(json!({ "deleted": deleted })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/search", post(search_users))
        .route("/users", post(create_user))
        .route(
            "/users/{id}",
            axum::routing::get(get_user).put(update_user).delete(delete_user),
        )
}
