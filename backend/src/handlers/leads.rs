use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::AppState;

pub const LEAD_STATUS: &str = "pending";
pub const LEAD_JOURNEY_STAGE: &str = "consideration";

const LANGUAGES: &[&str] = &["en", "af", "zu"];
const AREA_TYPES: &[&str] = &["region", "development"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: String,
    pub phone_number: String,
    pub preferred_language: String,
    pub manual_location: String,
    pub selected_area: String,
    pub area_type: String,
    pub selected_plan_title: String,
    pub selected_plan_speed: String,
    pub selected_plan_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_provider_name: Option<String>,
    pub status: String,
    pub current_journey_stage: String,
}

impl LeadRecord {
    pub fn validate(&self) -> Result<(), RelayError> {
        let required = [
            ("name", &self.name),
            ("phone_number", &self.phone_number),
            ("manual_location", &self.manual_location),
            ("selected_area", &self.selected_area),
            ("selected_plan_title", &self.selected_plan_title),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(RelayError::Validation(format!("{} is required", field)));
        }
        if !LANGUAGES.contains(&self.preferred_language.as_str()) {
            return Err(RelayError::Validation(format!(
                "unsupported preferred_language {:?}",
                self.preferred_language
            )));
        }
        if !AREA_TYPES.contains(&self.area_type.as_str()) {
            return Err(RelayError::Validation(format!("unsupported area_type {:?}", self.area_type)));
        }
        if self.status != LEAD_STATUS || self.current_journey_stage != LEAD_JOURNEY_STAGE {
            return Err(RelayError::Validation("lead must start as a new pending record".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(String),
    #[error("webhook request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("webhook answered with status {0}")]
    UpstreamStatus(u16),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::Upstream(_) | RelayError::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

async fn forward(client: &reqwest::Client, url: &str, record: &LeadRecord) -> Result<(), RelayError> {
    let response = client.post(url).json(record).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::UpstreamStatus(status.as_u16()));
    }
    Ok(())
}

pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    Json(record): Json<LeadRecord>,
) -> Result<(StatusCode, Json<serde_json::Value>), RelayError> {
    if let Err(e) = record.validate() {
        warn!("Rejected lead: {}", e);
        return Err(e);
    }

    match &state.config.lead_webhook_url {
        Some(url) => {
            if let Err(e) = forward(&state.http, url, &record).await {
                error!("Failed to forward lead for {}: {}", record.selected_plan_title, e);
                return Err(e);
            }
            info!(
                plan = %record.selected_plan_title,
                area = %record.selected_area,
                "Lead forwarded to webhook"
            );
        }
        None => {
            info!(lead = ?record, "LEAD_WEBHOOK_URL not set, lead logged only");
        }
    }

    Ok((StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))))
}
