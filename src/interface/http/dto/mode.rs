use crate::application::usecases::configure_mode::ModeSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct SetModeRequest {
    pub mode: Option<Value>,
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeResponse {
    pub env: &'static str,
    pub mode: &'static str,
    pub timeout_ms: u32,
}

impl From<ModeSettings> for ModeResponse {
    fn from(settings: ModeSettings) -> Self {
        Self {
            env: settings.env.as_str(),
            mode: settings.mode.as_str(),
            timeout_ms: settings.timeout_ms,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModeResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub settings: ModeResponse,
}
