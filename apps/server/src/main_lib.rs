use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use verzoeken_core::companies::{CompanyRepository, CompanyService, CompanyServiceTrait};
use verzoeken_core::db::{self, DbPool};
use verzoeken_core::documents::{DocumentStoreTrait, FsDocumentStore};
use verzoeken_core::expenses::{ExpenseRepository, ExpenseService, ExpenseServiceTrait};
use verzoeken_core::notifications::{
    HttpMailRelay, NoopNotifier, NotificationDispatcher, NotifierTrait,
};
use verzoeken_core::users::{UserRepository, UserService, UserServiceTrait};

use crate::auth::AuthManager;
use crate::config::Config;

pub struct AppState {
    pub expense_service: Arc<dyn ExpenseServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub company_service: Arc<dyn CompanyServiceTrait>,
    pub documents: Arc<dyn DocumentStoreTrait>,
    pub dispatcher: NotificationDispatcher,
    pub auth: AuthManager,
    pub public_base_url: String,
    pub pool: Arc<DbPool>,
}

pub fn init_tracing() {
    let log_format = std::env::var("VZ_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;

    let notifier: Arc<dyn NotifierTrait> = match &config.mail_relay_url {
        Some(url) => Arc::new(HttpMailRelay::new(url.clone())),
        None => Arc::new(NoopNotifier),
    };
    let dispatcher = NotificationDispatcher::new(notifier);

    let documents: Arc<dyn DocumentStoreTrait> =
        Arc::new(FsDocumentStore::new(config.documents_dir.clone()));

    let user_repository = Arc::new(UserRepository::new(pool.clone()));
    let user_service = Arc::new(UserService::new(user_repository.clone()));

    let company_repository = Arc::new(CompanyRepository::new(pool.clone()));
    let company_service = Arc::new(CompanyService::new(company_repository));

    let expense_repository = Arc::new(ExpenseRepository::new(pool.clone()));
    let expense_service = Arc::new(ExpenseService::new(
        expense_repository,
        user_repository,
        documents.clone(),
        dispatcher.clone(),
        config.public_base_url.clone(),
    ));

    Ok(Arc::new(AppState {
        expense_service,
        user_service,
        company_service,
        documents,
        dispatcher,
        auth: AuthManager::new(&config.jwt_secret),
        public_base_url: config.public_base_url.clone(),
        pool,
    }))
}
