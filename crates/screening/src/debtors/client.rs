use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{DebtRecord, DebtorsGateway, RegistryError, RegistryResponse};

/// HTTP client for the BCRA Central de Deudores API. One attempt per call;
/// whatever comes back is classified into [`RegistryResponse`] and handed to
/// the normalizers untouched.
pub struct BcraClient {
    http: reqwest::Client,
    base_url: String,
}

impl BcraClient {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://api.bcra.gob.ar/centraldedeudores/v1.0";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    async fn fetch(&self, path: &str, cuit: &str) -> Result<RegistryResponse, RegistryError> {
        let url = format!("{}/{path}/{cuit}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, %err, "debtor registry request failed");
                RegistryError::Transport(err.to_string())
            })?;

        // Error outcomes (404 included) arrive as JSON status objects, so the
        // HTTP status itself is ignored and the body decides.
        let body: Value = response
            .json()
            .await
            .map_err(|err| {
                warn!(%url, %err, "debtor registry body was not JSON");
                RegistryError::Body(err.to_string())
            })?;

        Ok(classify_body(body))
    }
}

impl std::fmt::Debug for BcraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcraClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DebtorsGateway for BcraClient {
    async fn debts(&self, cuit: &str) -> Result<RegistryResponse, RegistryError> {
        self.fetch("Deudas", cuit).await
    }

    async fn history(&self, cuit: &str) -> Result<RegistryResponse, RegistryError> {
        self.fetch("Deudas/Historicas", cuit).await
    }
}

/// Sorts a raw registry body into the tagged union. The nested
/// `results.periodos[].entidades[]` layout is flattened into one
/// [`DebtRecord`] per entity row, carrying the person's name on every row.
pub(crate) fn classify_body(body: Value) -> RegistryResponse {
    if let Some(results) = body.get("results") {
        return RegistryResponse::Records(flatten_results(results));
    }

    if body.get("status").is_some() || body.get("errorMessages").is_some() {
        let code = body
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(0);
        let messages = body
            .get("errorMessages")
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return RegistryResponse::Status { code, messages };
    }

    let shape = shape_of(&body);
    warn!(%shape, "debtor registry answered with an unrecognized body");
    RegistryResponse::Unexpected(shape)
}

fn flatten_results(results: &Value) -> Vec<DebtRecord> {
    let denominacion = results
        .get("denominacion")
        .and_then(Value::as_str)
        .map(str::to_string);

    let periodos = results
        .get("periodos")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut records = Vec::new();
    for periodo in &periodos {
        let period_label = periodo.get("periodo").map(label_of);
        let entidades = periodo
            .get("entidades")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for entidad in entidades {
            let mut record = DebtRecord {
                denominacion: denominacion.clone(),
                periodo: period_label.clone(),
                ..DebtRecord::default()
            };

            if let Value::Object(fields) = entidad {
                for (key, value) in fields {
                    match key.as_str() {
                        "entidad" => record.entidad = value.as_str().map(str::to_string),
                        "situacion" => record.situacion = Some(value),
                        "monto" => record.monto = Some(value),
                        other => {
                            record
                                .extra
                                .insert(format!("periodos_entidades_{other}"), value);
                        }
                    }
                }
            }

            records.push(record);
        }
    }

    records
}

fn label_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn shape_of(body: &Value) -> String {
    match body {
        Value::Object(fields) => {
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(_) => "array".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}
