use metrics_exporter_prometheus::PrometheusHandle;
use screening::audit::AuditSink;
use screening::config::AppConfig;
use screening::debtors::{BcraClient, DebtorsGateway};
use screening::padron::{AfipPadronClient, PadronGateway};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// External collaborators behind trait objects. `None` means the collaborator
/// was never initialized; the endpoints relying on it answer 500.
#[derive(Clone, Default)]
pub(crate) struct Gateways {
    pub(crate) debtors: Option<Arc<dyn DebtorsGateway>>,
    pub(crate) padron: Option<Arc<dyn PadronGateway>>,
    pub(crate) audit: Option<Arc<dyn AuditSink>>,
}

pub(crate) fn build_gateways(config: &AppConfig) -> Gateways {
    let debtors: Option<Arc<dyn DebtorsGateway>> =
        Some(Arc::new(BcraClient::new(config.bcra.base_url.clone())));

    let padron: Option<Arc<dyn PadronGateway>> = config.afip.base_url.as_ref().map(|base_url| {
        Arc::new(AfipPadronClient::new(
            base_url.clone(),
            config.afip.access_token.clone(),
        )) as Arc<dyn PadronGateway>
    });
    if padron.is_none() {
        warn!("AFIP_API_BASE not set; /check_afip will answer 500");
    }

    // The sheets hub wants service-account credentials injected by the
    // deployment (see GoogleSheetsSink); until that wiring exists the
    // service answers consultations without audit logging.
    if config.sheets.spreadsheet_id.is_some() {
        warn!("SHEETS_SPREADSHEET_ID is set but no authenticated sheets hub is wired; audit logging disabled");
    }

    Gateways {
        debtors,
        padron,
        audit: None,
    }
}

/// Accepts identifiers sent either as JSON strings or bare numbers; the
/// frontend is not consistent about which it produces.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_id")]
        dni: Option<String>,
    }

    #[test]
    fn identifiers_parse_from_strings_and_numbers() {
        let probe: Probe = serde_json::from_str(r#"{"dni": "12345678"}"#).expect("parses");
        assert_eq!(probe.dni.as_deref(), Some("12345678"));

        let probe: Probe = serde_json::from_str(r#"{"dni": 12345678}"#).expect("parses");
        assert_eq!(probe.dni.as_deref(), Some("12345678"));

        let probe: Probe = serde_json::from_str(r#"{"dni": null}"#).expect("parses");
        assert!(probe.dni.is_none());

        let probe: Probe = serde_json::from_str("{}").expect("parses");
        assert!(probe.dni.is_none());
    }
}
