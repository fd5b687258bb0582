use serde::{Deserialize, Serialize};

/// One outbound mail: subject, templated body and an action link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub recipient_name: String,
    pub recipient_email: String,
    pub subject: String,
    pub content: String,
    pub button_url: String,
    pub button_text: String,
}
