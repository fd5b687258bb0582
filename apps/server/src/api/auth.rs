use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use verzoeken_core::notifications::EmailMessage;

use crate::auth::TokenResponse;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(serde::Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<TokenResponse>> {
    let denied = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .user_service
        .get_user_by_email(&body.email)?
        .ok_or_else(denied)?;
    if user.deactivated {
        return Err(denied());
    }
    if !state.auth.verify_password(&user.password, &body.password) {
        return Err(denied());
    }

    Ok(Json(state.auth.issue_token(&user.id, user.role)?))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequestBody {
    email: String,
    new_password: String,
}

/// Always answers 200 so the endpoint cannot be used to probe for accounts.
/// The new password is hashed up front and travels inside the signed token.
async fn send_reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetRequestBody>,
) -> ApiResult<Json<Value>> {
    let user = match state.user_service.get_user_by_email(&body.email)? {
        Some(user) if !user.deactivated => user,
        _ => return Ok(Json(json!({}))),
    };

    let new_hash = state.auth.hash_password(&body.new_password)?;
    let token = state.auth.issue_reset_token(&user.id, &new_hash)?;

    state.dispatcher.dispatch_detached(EmailMessage {
        recipient_name: user.name,
        recipient_email: user.email,
        subject: "Nieuw wachtwoord bevestigen".to_string(),
        content: "Je hebt een verzoek ingediend om je wachtwoord te resetten. Gebruik de \
                  onderstaande knop om je nieuwe wachtwoord te bevestigen. De link is 10 \
                  minuten geldig."
            .to_string(),
        button_url: format!(
            "{}/api/v1/auth/confirm-reset-password?token={}",
            state.public_base_url, token
        ),
        button_text: "Bevestigen".to_string(),
    });

    Ok(Json(json!({})))
}

#[derive(serde::Deserialize)]
struct ConfirmQuery {
    token: String,
}

async fn confirm_reset_password(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConfirmQuery>,
) -> ApiResult<Json<Value>> {
    let claims = state.auth.decode_reset_token(&query.token)?;
    state.user_service.set_password(&claims.sub, &claims.pwd)?;
    Ok(Json(json!({})))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/send-reset-password", post(send_reset_password))
        .route(
            "/auth/confirm-reset-password",
            get(confirm_reset_password),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use verzoeken_core::users::{NewUser, Role, UserUpdate};

    use crate::config::Config;
    use crate::main_lib::build_state;

    fn test_state(tmp: &TempDir) -> Arc<AppState> {
        let config = Config {
            listen_addr: "127.0.0.1:0".to_string(),
            db_path: tmp.path().join("portal.db").to_string_lossy().into_owned(),
            documents_dir: tmp.path().join("documents").to_string_lossy().into_owned(),
            jwt_secret: "test-secret".to_string(),
            mail_relay_url: None,
            public_base_url: "http://localhost:8080".to_string(),
            cors_origins: "*".to_string(),
            request_timeout_secs: 30,
        };
        build_state(&config).unwrap()
    }

    fn credentials() -> LoginBody {
        LoginBody {
            email: "femke@portal.test".to_string(),
            password: "wachtwoord".to_string(),
        }
    }

    #[tokio::test]
    async fn deactivated_users_cannot_log_in() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp);

        let password = state.auth.hash_password("wachtwoord").unwrap();
        let user = state
            .user_service
            .create_user(NewUser {
                name: "Femke".to_string(),
                email: "femke@portal.test".to_string(),
                password,
                role: Role::FinancialWorker,
            })
            .unwrap();

        let token = login(State(state.clone()), Json(credentials()))
            .await
            .unwrap();
        assert_eq!(token.0.token_type, "Bearer");

        state
            .user_service
            .update_user(
                &user.id,
                UserUpdate {
                    deactivated: Some(true),
                    ..UserUpdate::default()
                },
            )
            .unwrap();

        match login(State(state), Json(credentials())).await {
            Err(ApiError::Unauthorized(_)) => {}
            Ok(_) => panic!("deactivated account obtained a token"),
            Err(other) => panic!("expected unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_password_is_refused() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp);

        let password = state.auth.hash_password("wachtwoord").unwrap();
        state
            .user_service
            .create_user(NewUser {
                name: "Femke".to_string(),
                email: "femke@portal.test".to_string(),
                password,
                role: Role::FinancialWorker,
            })
            .unwrap();

        let body = LoginBody {
            email: "femke@portal.test".to_string(),
            password: "verkeerd".to_string(),
        };
        assert!(matches!(
            login(State(state), Json(body)).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
