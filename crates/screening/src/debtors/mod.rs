//! BCRA Central de Deudores: gateway boundary and response normalization.
//!
//! The registry answers either with a tabular payload (one row per reporting
//! entity and period) or with a status object carrying a numeric code and
//! error messages. Both shapes, plus anything unrecognizable, are captured in
//! [`RegistryResponse`] so the normalizers can match exhaustively instead of
//! probing the payload at every call site.

mod client;
mod history;
mod status;

pub use client::BcraClient;
pub use history::{normalize_history, DebtHistory, PeriodSummary};
pub use status::{normalize_debt_status, DebtStatus};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One debt row for a (reporting entity, period) pair, in the flattened
/// column layout the registry's tabular exports use. `situacion` and `monto`
/// are kept as raw JSON values; the registry is not consistent about emitting
/// numbers versus strings, and a bad cell must never sink the whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominacion: Option<String>,
    #[serde(
        rename = "periodos_periodo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub periodo: Option<String>,
    #[serde(
        rename = "periodos_entidades_entidad",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub entidad: Option<String>,
    #[serde(
        rename = "periodos_entidades_situacion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub situacion: Option<Value>,
    #[serde(
        rename = "periodos_entidades_monto",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub monto: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// What the registry actually said, classified at the client boundary.
#[derive(Debug, Clone)]
pub enum RegistryResponse {
    /// Tabular result; may be empty, which is a valid clean record.
    Records(Vec<DebtRecord>),
    /// Status object: `{ status, errorMessages }`.
    Status { code: u16, messages: Vec<String> },
    /// Anything that matched neither known shape.
    Unexpected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("request to the debtor registry failed: {0}")]
    Transport(String),
    #[error("debtor registry returned an unreadable body: {0}")]
    Body(String),
}

/// Single-attempt access to the debtor registry. Retry and backoff, if any,
/// belong to the implementation behind this seam, never to the normalizers.
#[async_trait]
pub trait DebtorsGateway: Send + Sync {
    async fn debts(&self, cuit: &str) -> Result<RegistryResponse, RegistryError>;
    async fn history(&self, cuit: &str) -> Result<RegistryResponse, RegistryError>;
}

/// Parse-or-skip for situation codes: integers and integer strings only.
/// Returns `None` for a value that is present but unparseable, so callers
/// can drop that row's contribution without failing the response.
pub(crate) fn situation_code(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .and_then(|code| u32::try_from(code).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Parse-or-skip for monetary amounts; accepts numbers and numeric strings.
pub(crate) fn amount_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
