//! Audit logging of consultations to a shared spreadsheet.
//!
//! The sink is best-effort by contract: a failed append is logged and
//! reported to the caller, but it must never abort or delay the primary
//! consultation response.

mod sheet;

pub use sheet::GoogleSheetsSink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::padron::ImpuestoResumen;

/// Column headers of the audit sheet, written once when the sheet is blank.
pub const SHEET_HEADER: [&str; 20] = [
    "Fecha Consulta",
    "DNI",
    "Sexo",
    "CUIT",
    "Nombre (BCRA)",
    "Situación BCRA",
    "Deuda Total",
    "Entidades Reportando",
    "Nombre (AFIP)",
    "Estado CUIT",
    "Tipo Persona",
    "Condición Fiscal",
    "Monotributista",
    "Categoría Mono",
    "Resp. Inscripto",
    "Autónomo",
    "Rel. Dependencia",
    "Domicilio Fiscal",
    "Actividades",
    "Impuestos Activos",
];

/// Digest of the debtor-registry side of a consultation. Numeric fields stay
/// raw JSON values; callers send whatever the registry reported and the row
/// builder stringifies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BcraSummary {
    pub name: String,
    pub situacion: Value,
    pub deuda_total: Value,
    pub entidades: Value,
}

/// Digest of the tax-registry side of a consultation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AfipSummary {
    pub nombre: String,
    pub estado_clave: String,
    pub tipo_persona: String,
    pub condicion_fiscal: String,
    pub is_monotributo: bool,
    pub is_responsable_inscripto: bool,
    pub is_autonomo: bool,
    pub is_relacion_dependencia: bool,
    pub categoria_monotributo: Option<String>,
    pub domicilio: String,
    pub actividades: Vec<String>,
    pub impuestos: Vec<ImpuestoResumen>,
}

/// Flattened consultation summary destined for one spreadsheet row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationRecord {
    pub dni: String,
    pub sex: String,
    pub cuit: String,
    pub bcra: Option<BcraSummary>,
    pub afip: Option<AfipSummary>,
}

impl ConsultationRecord {
    /// Renders the record as a sheet row matching [`SHEET_HEADER`] column
    /// for column.
    pub fn to_row(&self, timestamp: &str) -> Vec<String> {
        let bcra = self.bcra.clone().unwrap_or_default();
        let afip = self.afip.clone().unwrap_or_default();

        let impuestos_activos = afip
            .impuestos
            .iter()
            .filter(|impuesto| impuesto.estado == "Activo")
            .map(|impuesto| impuesto.descripcion.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            timestamp.to_string(),
            self.dni.clone(),
            self.sex.clone(),
            self.cuit.clone(),
            bcra.name,
            cell(&bcra.situacion),
            cell(&bcra.deuda_total),
            cell(&bcra.entidades),
            afip.nombre,
            afip.estado_clave,
            afip.tipo_persona,
            afip.condicion_fiscal,
            si_no(afip.is_monotributo),
            afip.categoria_monotributo.unwrap_or_default(),
            si_no(afip.is_responsable_inscripto),
            si_no(afip.is_autonomo),
            si_no(afip.is_relacion_dependencia),
            afip.domicilio,
            afip.actividades.join(", "),
            impuestos_activos,
        ]
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn si_no(flag: bool) -> String {
    if flag { "Sí" } else { "No" }.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sheet operation failed: {0}")]
    Backend(String),
}

/// Append-only audit log. Returns a reference URL for the stored row's
/// spreadsheet.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &ConsultationRecord) -> Result<String, AuditError>;
}
