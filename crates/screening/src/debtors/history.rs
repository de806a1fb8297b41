use serde::Serialize;

use super::{amount_value, situation_code, RegistryResponse};

/// How many of the most recent periods a history lookup summarizes.
const HISTORY_WINDOW: usize = 6;

/// Per-period digest of the time series: worst situation class, total debt
/// across reporting entities and how many of them reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: String,
    pub worst_situation: u32,
    pub total_debt: f64,
    pub num_entities: usize,
}

#[derive(Debug, Clone)]
pub enum DebtHistory {
    /// The registry answered with an empty result table.
    NoHistory,
    /// The registry's 404: no history file exists for the identifier.
    NotRegistered,
    Report {
        /// Most recent period first.
        periods: Vec<PeriodSummary>,
        person_name: String,
    },
    UpstreamError {
        code: u16,
        details: String,
    },
    Unexpected(String),
}

pub fn normalize_history(response: RegistryResponse) -> DebtHistory {
    let records = match response {
        RegistryResponse::Records(records) if records.is_empty() => {
            return DebtHistory::NoHistory
        }
        RegistryResponse::Records(records) => records,
        RegistryResponse::Status { code: 404, .. } => return DebtHistory::NotRegistered,
        RegistryResponse::Status { code, messages } => {
            return DebtHistory::UpstreamError {
                code,
                details: messages.join("; "),
            }
        }
        RegistryResponse::Unexpected(description) => {
            return DebtHistory::Unexpected(description)
        }
    };

    let mut periods: Vec<&str> = records
        .iter()
        .filter_map(|record| record.periodo.as_deref())
        .collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();
    periods.truncate(HISTORY_WINDOW);

    let summaries = periods
        .into_iter()
        .map(|period| {
            let rows = records
                .iter()
                .filter(|record| record.periodo.as_deref() == Some(period));

            let worst_situation = rows
                .clone()
                .filter_map(|record| record.situacion.as_ref().and_then(situation_code))
                .max()
                .unwrap_or(0);
            let total_debt = rows
                .clone()
                .filter_map(|record| record.monto.as_ref().and_then(amount_value))
                .sum();
            let num_entities = rows.count();

            PeriodSummary {
                period: format_period(period),
                worst_situation,
                total_debt,
                num_entities,
            }
        })
        .collect();

    let person_name = records
        .first()
        .and_then(|record| record.denominacion.clone())
        .unwrap_or_else(|| "N/A".to_string());

    DebtHistory::Report {
        periods: summaries,
        person_name,
    }
}

/// `YYYYMM` becomes `YYYY-MM`; anything else passes through untouched.
fn format_period(raw: &str) -> String {
    if raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}", &raw[..4], &raw[4..])
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debtors::DebtRecord;
    use serde_json::json;

    fn row(period: &str, situacion: u32, monto: f64) -> DebtRecord {
        DebtRecord {
            denominacion: Some("GOMEZ ANA".to_string()),
            periodo: Some(period.to_string()),
            situacion: Some(json!(situacion)),
            monto: Some(json!(monto)),
            ..DebtRecord::default()
        }
    }

    #[test]
    fn empty_table_is_no_history_while_404_is_not_registered() {
        assert!(matches!(
            normalize_history(RegistryResponse::Records(Vec::new())),
            DebtHistory::NoHistory
        ));
        assert!(matches!(
            normalize_history(RegistryResponse::Status {
                code: 404,
                messages: Vec::new()
            }),
            DebtHistory::NotRegistered
        ));
    }

    #[test]
    fn keeps_only_six_most_recent_periods_descending() {
        let records: Vec<DebtRecord> = (1..=8)
            .map(|month| row(&format!("2024{month:02}"), 1, 10.0))
            .collect();

        match normalize_history(RegistryResponse::Records(records)) {
            DebtHistory::Report { periods, .. } => {
                let labels: Vec<&str> =
                    periods.iter().map(|summary| summary.period.as_str()).collect();
                assert_eq!(
                    labels,
                    vec![
                        "2024-08", "2024-07", "2024-06", "2024-05", "2024-04", "2024-03"
                    ]
                );
            }
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn aggregates_worst_situation_total_and_entity_count_per_period() {
        let mut records = vec![
            row("202406", 1, 100.0),
            row("202406", 4, 250.5),
            row("202405", 2, 75.0),
        ];
        // A row with garbage in both cells must not poison the aggregates.
        records.push(DebtRecord {
            periodo: Some("202406".to_string()),
            situacion: Some(json!("s/d")),
            monto: Some(json!("s/d")),
            ..DebtRecord::default()
        });

        match normalize_history(RegistryResponse::Records(records)) {
            DebtHistory::Report {
                periods,
                person_name,
            } => {
                assert_eq!(person_name, "GOMEZ ANA");
                assert_eq!(periods[0].period, "2024-06");
                assert_eq!(periods[0].worst_situation, 4);
                assert_eq!(periods[0].total_debt, 350.5);
                assert_eq!(periods[0].num_entities, 3);
                assert_eq!(periods[1].period, "2024-05");
                assert_eq!(periods[1].num_entities, 1);
            }
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn missing_name_falls_back_to_na() {
        let records = vec![DebtRecord {
            periodo: Some("202401".to_string()),
            ..DebtRecord::default()
        }];
        match normalize_history(RegistryResponse::Records(records)) {
            DebtHistory::Report { person_name, .. } => assert_eq!(person_name, "N/A"),
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn non_six_digit_periods_pass_through() {
        assert_eq!(format_period("2024-06"), "2024-06");
        assert_eq!(format_period("24Q2"), "24Q2");
        assert_eq!(format_period("202406"), "2024-06");
    }

    #[test]
    fn upstream_error_carries_code_and_messages() {
        let history = normalize_history(RegistryResponse::Status {
            code: 503,
            messages: vec!["maintenance".to_string()],
        });
        match history {
            DebtHistory::UpstreamError { code, details } => {
                assert_eq!(code, 503);
                assert_eq!(details, "maintenance");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
