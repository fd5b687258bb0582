/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    pub documents_dir: String,
    pub jwt_secret: String,
    /// HTTP endpoint of the mail relay; mail is logged instead when absent.
    pub mail_relay_url: Option<String>,
    /// Base URL used in notification links back into the portal.
    pub public_base_url: String,
    /// Comma-separated origins; "*" allows any.
    pub cors_origins: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr =
            std::env::var("VZ_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let db_path =
            std::env::var("VZ_DB_PATH").unwrap_or_else(|_| "./data/verzoeken.db".to_string());
        let documents_dir =
            std::env::var("VZ_DOCUMENTS_DIR").unwrap_or_else(|_| "./data/documents".to_string());
        let jwt_secret = std::env::var("VZ_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("VZ_JWT_SECRET not set; using an ephemeral secret");
            uuid::Uuid::new_v4().to_string()
        });
        let mail_relay_url = std::env::var("VZ_MAIL_RELAY_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let public_base_url = std::env::var("VZ_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        let cors_origins = std::env::var("VZ_CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let request_timeout_secs = std::env::var("VZ_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Config {
            listen_addr,
            db_path,
            documents_dir,
            jwt_secret,
            mail_relay_url,
            public_base_url,
            cors_origins,
            request_timeout_secs,
        }
    }
}
