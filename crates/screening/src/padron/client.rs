use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{PadronError, PadronGateway, TaxpayerDetails};

/// Marker AFIP puts in its failure reason when the identifier simply does
/// not exist in the padrón.
const NOT_FOUND_MARKER: &str = "No existe persona";

/// HTTP client for the padrón constancia service, addressed through an AFIP
/// SDK-style REST gateway with a bearer token.
pub struct AfipPadronClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl AfipPadronClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, access_token)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            access_token,
        }
    }
}

impl std::fmt::Debug for AfipPadronClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AfipPadronClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PadronGateway for AfipPadronClient {
    async fn taxpayer_details(&self, cuit: i64) -> Result<Option<TaxpayerDetails>, PadronError> {
        let url = format!("{}/personas/{cuit}", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| {
                warn!(%url, %err, "tax registry request failed");
                PadronError::Transport(err.to_string())
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|err| PadronError::Body(err.to_string()))?;

        if let Some(message) = failure_reason(&body) {
            if message.contains(NOT_FOUND_MARKER) {
                return Err(PadronError::NotFound);
            }
            warn!(cuit, %message, "tax registry reported a failure");
            return Err(PadronError::Transport(message));
        }
        if !status.is_success() {
            return Err(PadronError::Transport(format!(
                "tax registry answered {status}"
            )));
        }

        Ok(parse_details(body)?)
    }
}

fn failure_reason(body: &Value) -> Option<String> {
    for key in ["error", "message"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

fn parse_details(body: Value) -> Result<Option<TaxpayerDetails>, PadronError> {
    match &body {
        Value::Null => return Ok(None),
        Value::Object(fields) if fields.is_empty() => return Ok(None),
        _ => {}
    }

    serde_json::from_value::<TaxpayerDetails>(body)
        .map(Some)
        .map_err(|err| PadronError::Body(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_bodies_mean_no_record() {
        assert!(parse_details(json!(null)).expect("parses").is_none());
        assert!(parse_details(json!({})).expect("parses").is_none());
    }

    #[test]
    fn constancia_body_parses_into_details() {
        let details = parse_details(json!({
            "datosGenerales": {"nombre": "JUAN", "apellido": "PEREZ"}
        }))
        .expect("parses")
        .expect("record present");
        assert_eq!(
            details
                .datos_generales
                .expect("general data")
                .nombre
                .as_deref(),
            Some("JUAN")
        );
    }

    #[test]
    fn failure_reason_reads_error_and_message_keys() {
        assert_eq!(
            failure_reason(&json!({"error": "No existe persona con ese Id"})).as_deref(),
            Some("No existe persona con ese Id")
        );
        assert_eq!(
            failure_reason(&json!({"message": "certificado vencido"})).as_deref(),
            Some("certificado vencido")
        );
        assert!(failure_reason(&json!({"datosGenerales": {}})).is_none());
    }
}
