use screening::padron::{normalize_tax_profile, TaxLookup, TaxpayerDetails};
use serde_json::json;

fn details(body: serde_json::Value) -> TaxpayerDetails {
    serde_json::from_value(body).expect("padron fixture parses")
}

#[test]
fn full_profile_from_registry_payload() {
    let taxpayer = details(json!({
        "datosGenerales": {
            "nombre": "MARIA",
            "apellido": "GOMEZ",
            "estadoClave": "ACTIVO",
            "tipoPersona": "FISICA",
            "domicilioFiscal": {
                "direccion": "AV SIEMPREVIVA 742",
                "localidad": "SPRINGFIELD",
                "descripcionProvincia": "BUENOS AIRES",
                "codPostal": "1704"
            }
        },
        "datosMonotributo": {
            "impuesto": [
                {
                    "idImpuesto": 20,
                    "descripcionImpuesto": "MONOTRIBUTO",
                    "estadoImpuesto": "AC",
                    "periodo": 202401
                }
            ],
            "categoriaMonotributo": { "descripcionCategoria": "D" },
            "actividad": [
                { "descripcionActividad": "VENTA AL POR MENOR" }
            ]
        },
        "datosRegimenGeneral": {
            "impuesto": [
                {
                    "idImpuesto": 308,
                    "descripcionImpuesto": "APORTES SEG. SOCIAL AUTONOMOS",
                    "estadoImpuesto": "AC"
                },
                {
                    "idImpuesto": 30,
                    "descripcionImpuesto": "IVA",
                    "estadoImpuesto": "BD"
                }
            ],
            "actividad": [
                { "descripcionActividad": "SERVICIOS EN RELACION DE DEPENDENCIA" }
            ]
        }
    }));

    let TaxLookup::Profile(profile) = normalize_tax_profile(Some(taxpayer)) else {
        panic!("expected a full profile");
    };

    assert_eq!(profile.nombre, "MARIA GOMEZ");
    assert_eq!(profile.estado_clave, "ACTIVO");
    assert_eq!(profile.tipo_persona, "FISICA");
    assert!(profile.is_monotributo);
    assert!(profile.is_autonomo);
    assert!(profile.is_relacion_dependencia);
    // IVA row is present but inactive, so no Responsable Inscripto flag.
    assert!(!profile.is_responsable_inscripto);
    assert_eq!(profile.categoria_monotributo.as_deref(), Some("D"));
    assert_eq!(
        profile.condicion_fiscal,
        "Monotributista (D) | Relacion de Dependencia | Autonomo"
    );
    assert_eq!(
        profile.domicilio,
        "AV SIEMPREVIVA 742, SPRINGFIELD, BUENOS AIRES, 1704"
    );
    assert_eq!(profile.impuestos.len(), 3);
    assert_eq!(profile.impuestos[0].estado, "Activo");
    assert_eq!(profile.impuestos[2].estado, "Inactivo");
}

#[test]
fn constancia_observations_yield_a_partial_lookup() {
    let taxpayer = details(json!({
        "errorConstancia": {
            "nombre": "JUAN",
            "apellido": "PEREZ",
            "error": ["El contribuyente no se encuentra alcanzado"]
        }
    }));

    let TaxLookup::Partial { nombre, errors } = normalize_tax_profile(Some(taxpayer)) else {
        panic!("expected a partial lookup");
    };
    assert_eq!(nombre, "JUAN PEREZ");
    assert_eq!(errors.len(), 1);
}

#[test]
fn absent_sections_fall_back_to_the_dependency_hint() {
    let taxpayer = details(json!({
        "datosGenerales": {
            "nombre": "ANA",
            "apellido": "LOPEZ",
            "estadoClave": "ACTIVO",
            "tipoPersona": "FISICA"
        }
    }));

    let TaxLookup::Profile(profile) = normalize_tax_profile(Some(taxpayer)) else {
        panic!("expected a profile");
    };
    assert_eq!(
        profile.condicion_fiscal,
        "Sin inscripciones activas — Posible empleado en relación de dependencia, jubilado o sin actividad registrada"
    );
    assert!(profile.impuestos.is_empty());
}

#[test]
fn empty_answer_is_no_data() {
    assert!(matches!(normalize_tax_profile(None), TaxLookup::NoData));
}
