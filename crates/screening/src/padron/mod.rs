//! AFIP padrón (constancia de inscripción): taxpayer record model, gateway
//! boundary and the flattening of the nested payload into a screening
//! profile.

mod client;
mod profile;

pub use client::AfipPadronClient;
pub use profile::{normalize_tax_profile, ImpuestoResumen, TaxLookup, TaxProfile};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tax item id for the monotributo (simplified regime) inscription.
pub(crate) const MONOTRIBUTO_IMPUESTO_ID: i64 = 20;
/// Tax item id for VAT under the general regime.
pub(crate) const IVA_IMPUESTO_ID: i64 = 30;
/// Estado marker AFIP uses for an active inscription.
pub(crate) const ESTADO_ACTIVO: &str = "AC";

/// Nested constancia payload, as AFIP emits it (camelCase keys). Every field
/// is optional: partial constancias are routine and the normalizer owns the
/// fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxpayerDetails {
    pub datos_generales: Option<DatosGenerales>,
    pub error_constancia: Option<ErrorConstancia>,
    pub datos_monotributo: Option<SeccionRegimen>,
    pub datos_regimen_general: Option<SeccionRegimen>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatosGenerales {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub razon_social: Option<String>,
    pub estado_clave: Option<String>,
    pub tipo_persona: Option<String>,
    pub domicilio_fiscal: Option<DomicilioFiscal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomicilioFiscal {
    pub direccion: Option<String>,
    pub localidad: Option<String>,
    pub descripcion_provincia: Option<String>,
    pub cod_postal: Option<String>,
}

/// Observations block AFIP attaches when the constancia cannot be issued in
/// full; carries name fragments and human-readable error lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorConstancia {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub error: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeccionRegimen {
    pub impuesto: Vec<Impuesto>,
    pub actividad: Vec<Actividad>,
    pub categoria_monotributo: Option<CategoriaMonotributo>,
}

impl SeccionRegimen {
    /// AFIP sometimes emits the section as an empty object; treat that the
    /// same as an absent section.
    pub(crate) fn is_empty(&self) -> bool {
        self.impuesto.is_empty()
            && self.actividad.is_empty()
            && self.categoria_monotributo.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Impuesto {
    pub id_impuesto: Option<i64>,
    pub descripcion_impuesto: Option<String>,
    pub estado_impuesto: Option<String>,
    /// Number or string on the wire.
    pub periodo: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Actividad {
    pub id_actividad: Option<i64>,
    pub descripcion_actividad: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoriaMonotributo {
    pub id_categoria: Option<i64>,
    pub descripcion_categoria: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PadronError {
    /// The identifier does not exist in the padrón. A domain outcome, never
    /// a server failure.
    #[error("no existe persona con ese CUIT en el padrón")]
    NotFound,
    #[error("request to the tax registry failed: {0}")]
    Transport(String),
    #[error("tax registry returned an unreadable body: {0}")]
    Body(String),
}

/// Single-attempt access to the padrón. `Ok(None)` means the registry
/// answered with an empty record, which normalizes to "no data".
#[async_trait]
pub trait PadronGateway: Send + Sync {
    async fn taxpayer_details(&self, cuit: i64) -> Result<Option<TaxpayerDetails>, PadronError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_constancia() {
        let details: TaxpayerDetails = serde_json::from_value(json!({
            "datosGenerales": {
                "nombre": "JUAN",
                "apellido": "PEREZ",
                "estadoClave": "ACTIVO",
                "tipoPersona": "FISICA",
                "domicilioFiscal": {
                    "direccion": "CALLE FALSA 123",
                    "localidad": "ROSARIO",
                    "descripcionProvincia": "SANTA FE",
                    "codPostal": "2000"
                }
            },
            "datosMonotributo": {
                "impuesto": [
                    {"idImpuesto": 20, "descripcionImpuesto": "MONOTRIBUTO", "estadoImpuesto": "AC", "periodo": 202001}
                ],
                "categoriaMonotributo": {"descripcionCategoria": "Categoria D"}
            }
        }))
        .expect("deserializes");

        let generales = details.datos_generales.expect("general data");
        assert_eq!(generales.apellido.as_deref(), Some("PEREZ"));
        assert_eq!(generales.estado_clave.as_deref(), Some("ACTIVO"));

        let mono = details.datos_monotributo.expect("monotributo section");
        assert_eq!(mono.impuesto[0].id_impuesto, Some(20));
        assert!(!mono.is_empty());
    }

    #[test]
    fn empty_section_object_counts_as_absent() {
        let details: TaxpayerDetails =
            serde_json::from_value(json!({"datosRegimenGeneral": {}})).expect("deserializes");
        assert!(details
            .datos_regimen_general
            .expect("section present")
            .is_empty());
    }
}
