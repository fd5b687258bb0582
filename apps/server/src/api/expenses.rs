use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{Map, Value};
use verzoeken_core::documents::generate_document_key;
use verzoeken_core::expenses::{
    ExpenseListQuery, ExpenseListResponse, ExpenseUpdate, ExpenseWithDetails, NewExpense,
};
use verzoeken_core::users::AuthContext;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Form fields that carry a PDF upload instead of a scalar value.
const DOCUMENT_FIELDS: [&str; 3] = ["signedOtdv", "zzpInvoice", "spreadPaymentAgreement"];

async fn search_expenses(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Json(query): Json<ExpenseListQuery>,
) -> ApiResult<Json<ExpenseListResponse>> {
    let response = state.expense_service.list_expenses(&actor, &query)?;
    Ok(Json(response))
}

async fn get_expense(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ExpenseWithDetails>> {
    let details = state.expense_service.get_expense(&actor, &id)?;
    Ok(Json(details))
}

async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    multipart: Multipart,
) -> ApiResult<Json<ExpenseWithDetails>> {
    let (fields, uploaded) = read_form(&state, multipart).await?;
    let new_expense: NewExpense = match serde_json::from_value(Value::Object(fields)) {
        Ok(parsed) => parsed,
        Err(e) => {
            discard_uploads(&state, &uploaded);
            return Err(ApiError::BadRequest(format!("Invalid expense form: {}", e)));
        }
    };
    match state.expense_service.create_expense(&actor, new_expense) {
        Ok(details) => Ok(Json(details)),
        Err(e) => {
            discard_uploads(&state, &uploaded);
            Err(e.into())
        }
    }
}

async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<ExpenseWithDetails>> {
    let (fields, uploaded) = read_form(&state, multipart).await?;
    let update: ExpenseUpdate = match serde_json::from_value(Value::Object(fields)) {
        Ok(parsed) => parsed,
        Err(e) => {
            discard_uploads(&state, &uploaded);
            return Err(ApiError::BadRequest(format!("Invalid expense form: {}", e)));
        }
    };
    match state.expense_service.edit_expense(&actor, &id, update) {
        Ok(details) => Ok(Json(details)),
        Err(e) => {
            discard_uploads(&state, &uploaded);
            Err(e.into())
        }
    }
}

async fn approve_expense(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ExpenseWithDetails>> {
    let details = state.expense_service.approve_expense(&actor, &id)?;
    Ok(Json(details))
}

#[derive(serde::Deserialize)]
struct RejectBody {
    notes: String,
}

async fn reject_expense(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<RejectBody>,
) -> ApiResult<Json<ExpenseWithDetails>> {
    let details = state
        .expense_service
        .reject_expense(&actor, &id, body.notes)?;
    Ok(Json(details))
}

async fn complete_expense(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ExpenseWithDetails>> {
    let details = state.expense_service.complete_expense(&actor, &id)?;
    Ok(Json(details))
}

/// Reads a multipart expense form. Uploaded PDFs are written to the document
/// store first; their generated keys replace the file fields, so the record
/// update only ever references blobs that already exist. The keys written by
/// this call are returned separately: when the mutation is refused the caller
/// removes them again, otherwise the blobs would be orphaned.
async fn read_form(
    state: &Arc<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(Map<String, Value>, Vec<String>)> {
    let mut fields = Map::new();
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }

        if DOCUMENT_FIELDS.contains(&name.as_str()) && field.file_name().is_some() {
            let original = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::BadRequest(format!("Failed to read uploaded file: {}", e))
            })?;
            let key = generate_document_key(original.as_deref());
            state.documents.put(&key, &bytes)?;
            uploaded.push(key.clone());
            fields.insert(name, Value::String(key));
        } else {
            let text = field.text().await.map_err(|e| {
                ApiError::BadRequest(format!("Failed to read field '{}': {}", name, e))
            })?;
            if let Some(value) = coerce_field(&name, text) {
                fields.insert(name, value);
            }
        }
    }

    Ok((fields, uploaded))
}

/// Best-effort removal of blobs written for a mutation that was refused.
fn discard_uploads(state: &Arc<AppState>, keys: &[String]) {
    for key in keys {
        if let Err(e) = state.documents.delete(key) {
            tracing::warn!("Failed to remove unused upload '{}': {}", key, e);
        }
    }
}

/// Form values arrive as strings; absent and placeholder values are dropped
/// and the few non-string fields are converted.
fn coerce_field(name: &str, raw: String) -> Option<Value> {
    if raw.is_empty() || raw == "null" || raw == "undefined" {
        return None;
    }
    match name {
        "starterLoan" => Some(Value::Bool(raw == "true")),
        _ => Some(Value::String(raw)),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/expenses/search", post(search_expenses))
        .route("/expenses", post(create_expense))
        .route("/expenses/{id}", get(get_expense).put(update_expense))
        .route("/expenses/{id}/approve", post(approve_expense))
        .route("/expenses/{id}/reject", post(reject_expense))
        .route("/expenses/{id}/complete", post(complete_expense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use tempfile::TempDir;
    use verzoeken_core::companies::NewCompany;
    use verzoeken_core::expenses::{IbDeclaration, PaymentMethod};
    use verzoeken_core::users::{NewUser, Role};

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

    fn seed_consultant(state: &Arc<AppState>) -> AuthContext {
        let password = state.auth.hash_password("wachtwoord").unwrap();
        let user = state
            .user_service
            .create_user(NewUser {
                name: "Erik".to_string(),
                email: "erik@portal.test".to_string(),
                password,
                role: Role::ExternalConsultant,
            })
            .unwrap();
        AuthContext {
            user_id: user.id,
            role: Role::ExternalConsultant,
        }
    }

    fn sample_expense(company_id: &str) -> NewExpense {
        NewExpense {
            handler_id: None,
            company_id: company_id.to_string(),
            customer_salutation: "Dhr.".to_string(),
            customer_initials: "J.".to_string(),
            customer_prefix: None,
            customer_last_name: "Jansen".to_string(),
            customer_email: "klant@voorbeeld.nl".to_string(),
            second_customer_salutation: None,
            second_customer_initials: None,
            second_customer_prefix: None,
            second_customer_last_name: None,
            second_customer_email: None,
            invoice_address: "Hoofdstraat 1".to_string(),
            postal_code: "1234 AB".to_string(),
            city: "Utrecht".to_string(),
            passing_date: None,
            notary_name: "Notariskantoor Kleiner".to_string(),
            starter_loan: false,
            object_address: "Dorpsweg 12".to_string(),
            object_postal_code: "5678 CD".to_string(),
            object_city: "Utrecht".to_string(),
            mortgage_invoice_amount: None,
            insurance_invoice_amount: None,
            other_invoice_amount: None,
            signed_otdv: None,
            zzp_invoice: None,
            spread_payment_agreement: None,
            payment_method: PaymentMethod::Notary,
            ib_declaration: IbDeclaration::No,
            notes: None,
        }
    }

    async fn form_with_upload() -> Multipart {
        let boundary = "vz-form-boundary";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"objectCity\"\r\n\r\n\
             Tilburg\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"signedOtdv\"; filename=\"Getekende OTDV.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.7 test\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method("PUT")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn stored_documents(documents_dir: &std::path::Path) -> usize {
        std::fs::read_dir(documents_dir.join("uploaded-pdfs"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn refused_edit_leaves_no_orphaned_uploads() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp);
        let documents_dir = tmp.path().join("documents");

        let actor = seed_consultant(&state);
        let company = state
            .company_service
            .create_company(NewCompany {
                id: None,
                name: "Vita Verzekeringen".to_string(),
            })
            .unwrap();
        let created = state
            .expense_service
            .create_expense(&actor, sample_expense(&company.id))
            .unwrap();

        // A freshly submitted record is locked for field edits.
        let multipart = form_with_upload().await;
        match update_expense(
            State(state.clone()),
            Extension(actor),
            Path(created.expense.id.clone()),
            multipart,
        )
        .await
        {
            Err(ApiError::Forbidden(_)) => {}
            Ok(_) => panic!("locked expense accepted an edit"),
            Err(other) => panic!("expected forbidden, got {:?}", other),
        }

        // The blob written while reading the form was removed again.
        assert_eq!(stored_documents(&documents_dir), 0);
    }
}
