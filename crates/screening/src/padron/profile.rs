use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    SeccionRegimen, TaxpayerDetails, ESTADO_ACTIVO, IVA_IMPUESTO_ID, MONOTRIBUTO_IMPUESTO_ID,
};

/// Cap on the deduplicated activity listing in a profile.
const MAX_ACTIVIDADES: usize = 10;

/// One tax item across either regime section, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpuestoResumen {
    pub descripcion: String,
    pub estado: String,
    pub periodo: String,
}

/// Flat screening view of a taxpayer: who they are and under which regimes
/// they are actively inscribed.
#[derive(Debug, Clone, Serialize)]
pub struct TaxProfile {
    pub nombre: String,
    pub estado_clave: String,
    pub tipo_persona: String,
    pub condicion_fiscal: String,
    pub is_monotributo: bool,
    pub is_responsable_inscripto: bool,
    pub is_relacion_dependencia: bool,
    pub is_autonomo: bool,
    pub categoria_monotributo: Option<String>,
    pub domicilio: String,
    pub actividades: Vec<String>,
    pub impuestos: Vec<ImpuestoResumen>,
}

#[derive(Debug, Clone)]
pub enum TaxLookup {
    /// The registry answered with an empty record.
    NoData,
    /// Constancia with observations and no general data.
    Partial { nombre: String, errors: Vec<String> },
    Profile(Box<TaxProfile>),
}

pub fn normalize_tax_profile(details: Option<TaxpayerDetails>) -> TaxLookup {
    let Some(details) = details else {
        return TaxLookup::NoData;
    };

    if details.datos_generales.is_none() {
        if let Some(observaciones) = details.error_constancia {
            let nombre = join_name(
                observaciones.nombre.as_deref(),
                observaciones.apellido.as_deref(),
            );
            return TaxLookup::Partial {
                nombre: if nombre.is_empty() {
                    "N/A".to_string()
                } else {
                    nombre
                },
                errors: observaciones.error,
            };
        }
    }

    let generales = details.datos_generales.unwrap_or_default();

    let nombre = match generales.razon_social.as_deref() {
        Some(razon_social) if !razon_social.trim().is_empty() => razon_social.trim().to_string(),
        _ => join_name(generales.nombre.as_deref(), generales.apellido.as_deref()),
    };

    let mut is_monotributo = false;
    let mut categoria_monotributo = None;
    if let Some(mono) = &details.datos_monotributo {
        for impuesto in &mono.impuesto {
            if impuesto.id_impuesto == Some(MONOTRIBUTO_IMPUESTO_ID)
                && impuesto.estado_impuesto.as_deref() == Some(ESTADO_ACTIVO)
            {
                is_monotributo = true;
                categoria_monotributo = Some(
                    mono.categoria_monotributo
                        .as_ref()
                        .and_then(|categoria| categoria.descripcion_categoria.clone())
                        .unwrap_or_else(|| "N/A".to_string()),
                );
                break;
            }
        }
    }

    let mut is_responsable_inscripto = false;
    let mut is_autonomo = false;
    if let Some(general) = &details.datos_regimen_general {
        for impuesto in &general.impuesto {
            if impuesto.estado_impuesto.as_deref() != Some(ESTADO_ACTIVO) {
                continue;
            }
            let descripcion = impuesto
                .descripcion_impuesto
                .as_deref()
                .unwrap_or_default()
                .to_uppercase();
            if descripcion.contains("IVA") && impuesto.id_impuesto == Some(IVA_IMPUESTO_ID) {
                is_responsable_inscripto = true;
            }
            if descripcion.contains("AUTONOMO") || descripcion.contains("AUTÓNOMO") {
                is_autonomo = true;
            }
        }
    }

    let mut is_relacion_dependencia = false;
    let mut actividades = Vec::new();
    for section in [&details.datos_monotributo, &details.datos_regimen_general]
        .into_iter()
        .flatten()
    {
        for actividad in &section.actividad {
            let Some(descripcion) = &actividad.descripcion_actividad else {
                continue;
            };
            if !actividades.contains(descripcion) && actividades.len() < MAX_ACTIVIDADES {
                actividades.push(descripcion.clone());
            }
            let upper = descripcion.to_uppercase();
            if upper.contains("RELAC") && upper.contains("DEPENDENCIA") {
                is_relacion_dependencia = true;
            }
        }
    }

    let mut condiciones = Vec::new();
    if is_monotributo {
        condiciones.push(match &categoria_monotributo {
            Some(categoria) => format!("Monotributista ({categoria})"),
            None => "Monotributista".to_string(),
        });
    }
    if is_responsable_inscripto {
        condiciones.push("Responsable Inscripto".to_string());
    }
    if is_relacion_dependencia {
        condiciones.push("Relacion de Dependencia".to_string());
    }
    if is_autonomo {
        condiciones.push("Autonomo".to_string());
    }

    let condicion_fiscal = if condiciones.is_empty() {
        if section_absent(&details.datos_monotributo) && section_absent(&details.datos_regimen_general)
        {
            "Sin inscripciones activas — Posible empleado en relación de dependencia, jubilado o sin actividad registrada".to_string()
        } else {
            "Sin condicion activa detectada".to_string()
        }
    } else {
        condiciones.join(" | ")
    };

    let domicilio = generales
        .domicilio_fiscal
        .as_ref()
        .map(|domicilio| {
            [
                domicilio.direccion.as_deref(),
                domicilio.localidad.as_deref(),
                domicilio.descripcion_provincia.as_deref(),
                domicilio.cod_postal.as_deref(),
            ]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
        })
        .unwrap_or_default();

    let impuestos = [&details.datos_monotributo, &details.datos_regimen_general]
        .into_iter()
        .flatten()
        .flat_map(|section| section.impuesto.iter())
        .map(|impuesto| ImpuestoResumen {
            descripcion: impuesto
                .descripcion_impuesto
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            estado: if impuesto.estado_impuesto.as_deref() == Some(ESTADO_ACTIVO) {
                "Activo".to_string()
            } else {
                "Inactivo".to_string()
            },
            periodo: impuesto
                .periodo
                .as_ref()
                .map(periodo_label)
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    TaxLookup::Profile(Box::new(TaxProfile {
        nombre,
        estado_clave: or_na(generales.estado_clave),
        tipo_persona: or_na(generales.tipo_persona),
        condicion_fiscal,
        is_monotributo,
        is_responsable_inscripto,
        is_relacion_dependencia,
        is_autonomo,
        categoria_monotributo,
        domicilio,
        actividades,
        impuestos,
    }))
}

fn join_name(nombre: Option<&str>, apellido: Option<&str>) -> String {
    format!(
        "{} {}",
        nombre.unwrap_or_default(),
        apellido.unwrap_or_default()
    )
    .trim()
    .to_string()
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| "N/A".to_string())
}

fn section_absent(section: &Option<SeccionRegimen>) -> bool {
    section.as_ref().map_or(true, SeccionRegimen::is_empty)
}

fn periodo_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
