use crate::infra::{deserialize_id, AppState, Gateways};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use screening::audit::ConsultationRecord;
use screening::cuil::derive_cuil;
use screening::debtors::{normalize_debt_status, normalize_history, DebtHistory, DebtStatus};
use screening::padron::{normalize_tax_profile, PadronError, TaxLookup, TaxProfile};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Debug, Deserialize)]
pub(crate) struct CheckScoreRequest {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub(crate) dni: Option<String>,
    #[serde(default)]
    pub(crate) sex: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckHistoryRequest {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub(crate) cuit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckAfipRequest {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub(crate) dni: Option<String>,
    #[serde(default)]
    pub(crate) sex: Option<String>,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub(crate) cuit: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckAfipSuccess {
    status: &'static str,
    cuit: String,
    #[serde(flatten)]
    profile: TaxProfile,
}

pub(crate) fn screening_router() -> axum::Router {
    axum::Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/check_score", post(check_score))
        .route("/check_history", post(check_history))
        .route("/check_afip", post(check_afip))
        .route("/log_consultation", post(log_consultation))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Current-debts screening. Derives the CUIL when the caller sends a bare
/// DNI; an identifier of 10+ digits is forwarded to the registry as-is.
pub(crate) async fn check_score(
    Extension(gateways): Extension<Gateways>,
    Json(payload): Json<CheckScoreRequest>,
) -> Response {
    let Some(debtors) = gateways.debtors else {
        return internal_error("BCRA client not initialized", None);
    };

    let Some(dni) = payload.dni.filter(|dni| !dni.is_empty()) else {
        return bad_request("DNI is required");
    };

    let final_cuit = if dni.len() < 10 {
        let Some(sex) = payload.sex.filter(|sex| !sex.is_empty()) else {
            return bad_request("Sexo es requerido para calcular el CUIL desde el DNI.");
        };
        match derive_cuil(&dni, &sex) {
            Ok(cuil) => cuil,
            Err(_) => return bad_request("No se pudo calcular el CUIL. Verifique el DNI."),
        }
    } else {
        dni
    };

    let response = match debtors.debts(&final_cuit).await {
        Ok(response) => response,
        Err(cause) => {
            error!(cuit = %final_cuit, %cause, "debt lookup failed");
            return internal_error(&cause.to_string(), None);
        }
    };

    match normalize_debt_status(response) {
        DebtStatus::NoData => Json(json!({
            "status": "no_data",
            "message": format!("No se encontraron datos para el CUIT {final_cuit}."),
            "calculated_cuit": final_cuit,
        }))
        .into_response(),
        DebtStatus::NotRegistered => Json(json!({
            "status": "no_data",
            "message": format!(
                "No se encontraron deudas para el CUIT {final_cuit}. (Sin registros en Central de Deudores)"
            ),
            "calculated_cuit": final_cuit,
        }))
        .into_response(),
        DebtStatus::Report {
            records,
            max_situation,
        } => Json(json!({
            "status": "success",
            "data": records,
            "summary_situation": max_situation,
            "calculated_cuit": final_cuit,
        }))
        .into_response(),
        DebtStatus::UpstreamError { code, details } => {
            error!(cuit = %final_cuit, code, "debt registry reported an error");
            internal_error(&format!("Error del BCRA (código {code})"), Some(details))
        }
        DebtStatus::Unexpected(details) => {
            internal_error("Respuesta inesperada del BCRA", Some(details))
        }
    }
}

/// Six-month debt history summary for a CUIT.
pub(crate) async fn check_history(
    Extension(gateways): Extension<Gateways>,
    Json(payload): Json<CheckHistoryRequest>,
) -> Response {
    let Some(debtors) = gateways.debtors else {
        return internal_error("BCRA client not initialized", None);
    };

    let Some(cuit) = payload.cuit.filter(|cuit| !cuit.is_empty()) else {
        return bad_request("CUIT is required");
    };

    let response = match debtors.history(&cuit).await {
        Ok(response) => response,
        Err(cause) => {
            error!(%cuit, %cause, "history lookup failed");
            return internal_error(&cause.to_string(), None);
        }
    };

    match normalize_history(response) {
        DebtHistory::NoHistory => Json(json!({
            "status": "no_history",
            "message": "Sin historial disponible.",
        }))
        .into_response(),
        DebtHistory::NotRegistered => Json(json!({
            "status": "no_history",
            "message": "Sin historial de deudas registrado.",
        }))
        .into_response(),
        DebtHistory::Report {
            periods,
            person_name,
        } => Json(json!({
            "status": "success",
            "history": periods,
            "person_name": person_name,
        }))
        .into_response(),
        DebtHistory::UpstreamError { code, details } => {
            error!(%cuit, code, "debt registry reported an error");
            internal_error(&format!("Error del BCRA ({code})"), Some(details))
        }
        DebtHistory::Unexpected(details) => internal_error("Respuesta inesperada", Some(details)),
    }
}

/// Taxpayer registration lookup. Accepts a CUIT directly or derives one
/// from DNI and sex.
pub(crate) async fn check_afip(
    Extension(gateways): Extension<Gateways>,
    Json(payload): Json<CheckAfipRequest>,
) -> Response {
    let Some(padron) = gateways.padron else {
        return internal_error("AFIP client not initialized", None);
    };

    let cuit = match payload.cuit.filter(|cuit| !cuit.is_empty()) {
        Some(cuit) => cuit,
        None => {
            let Some(dni) = payload.dni.filter(|dni| !dni.is_empty()) else {
                return bad_request("DNI o CUIT es requerido");
            };
            let Some(sex) = payload.sex.filter(|sex| !sex.is_empty()) else {
                return bad_request("Sexo es requerido para calcular el CUIL");
            };
            match derive_cuil(&dni, &sex) {
                Ok(cuil) => cuil,
                Err(_) => return bad_request("No se pudo calcular el CUIL"),
            }
        }
    };

    let cuit_number: i64 = match cuit.parse() {
        Ok(number) => number,
        Err(_) => return bad_request("CUIT inválido"),
    };

    let details = match padron.taxpayer_details(cuit_number).await {
        Ok(details) => details,
        Err(PadronError::NotFound) => {
            return Json(json!({
                "status": "not_found",
                "cuit": cuit,
                "message": format!("No se encontro persona con CUIT {cuit} en AFIP"),
            }))
            .into_response()
        }
        Err(cause) => {
            error!(%cuit, %cause, "taxpayer lookup failed");
            return internal_error(&cause.to_string(), None);
        }
    };

    match normalize_tax_profile(details) {
        TaxLookup::NoData => Json(json!({
            "status": "no_data",
            "message": "No se encontraron datos en AFIP.",
            "cuit": cuit,
        }))
        .into_response(),
        TaxLookup::Partial { nombre, errors } => Json(json!({
            "status": "partial",
            "cuit": cuit,
            "nombre": nombre,
            "errors": errors,
            "message": "Datos parciales - la constancia tiene observaciones",
        }))
        .into_response(),
        TaxLookup::Profile(profile) => Json(CheckAfipSuccess {
            status: "success",
            cuit,
            profile: *profile,
        })
        .into_response(),
    }
}

/// Appends a consultation summary to the audit sheet. The frontend fires
/// this after rendering results; a missing sink is reported, not an error.
pub(crate) async fn log_consultation(
    Extension(gateways): Extension<Gateways>,
    Json(record): Json<ConsultationRecord>,
) -> Response {
    let Some(audit) = gateways.audit else {
        return Json(json!({
            "status": "skipped",
            "message": "Registro de auditoría no configurado.",
        }))
        .into_response();
    };

    match audit.append(&record).await {
        Ok(url) => Json(json!({ "status": "logged", "url": url })).into_response(),
        Err(cause) => {
            error!(%cause, "audit append failed");
            internal_error(&cause.to_string(), None)
        }
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn internal_error(message: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => json!({ "error": message, "details": details }),
        None => json!({ "error": message }),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
