use super::{situation_code, DebtRecord, RegistryResponse};

/// Normalized outcome of a current-debts lookup.
#[derive(Debug, Clone)]
pub enum DebtStatus {
    /// The registry answered with an empty result table.
    NoData,
    /// The registry's 404: the identifier has no file in the Central de
    /// Deudores at all. A clean record, not a failure.
    NotRegistered,
    Report {
        records: Vec<DebtRecord>,
        /// Worst situation class across all rows, 0 when none parsed.
        max_situation: u32,
    },
    UpstreamError {
        code: u16,
        details: String,
    },
    Unexpected(String),
}

pub fn normalize_debt_status(response: RegistryResponse) -> DebtStatus {
    match response {
        RegistryResponse::Records(records) if records.is_empty() => DebtStatus::NoData,
        RegistryResponse::Records(records) => {
            let max_situation = records
                .iter()
                .filter_map(|record| match &record.situacion {
                    // Missing situation defaults to the mildest class (1);
                    // a present-but-unparseable one is skipped silently.
                    None => Some(1),
                    Some(value) => situation_code(value),
                })
                .max()
                .unwrap_or(0);

            DebtStatus::Report {
                records,
                max_situation,
            }
        }
        RegistryResponse::Status { code: 404, .. } => DebtStatus::NotRegistered,
        RegistryResponse::Status { code, messages } => DebtStatus::UpstreamError {
            code,
            details: if messages.is_empty() {
                format!("status {code}")
            } else {
                messages.join("; ")
            },
        },
        RegistryResponse::Unexpected(description) => DebtStatus::Unexpected(description),
    }
}
