use async_trait::async_trait;
use chrono::Local;
use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, CellData, CellFormat, Color, ColorStyle, GridProperties,
    GridRange, RepeatCellRequest, Request, SheetProperties, TextFormat,
    UpdateSheetPropertiesRequest, ValueRange,
};
use google_sheets4::Sheets;
use serde_json::Value;

use super::{AuditError, AuditSink, ConsultationRecord, SHEET_HEADER};

/// Thin wrapper around the generated google-sheets4 client. The hub arrives
/// pre-authenticated; credential wiring is deployment concern, not ours.
pub struct GoogleSheetsSink<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    hub: Sheets<C>,
    spreadsheet_id: String,
}

impl<C> GoogleSheetsSink<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Sheets<C>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            hub,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    pub fn spreadsheet_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.spreadsheet_id
        )
    }

    fn map_error<E: std::fmt::Display>(err: E) -> AuditError {
        AuditError::Backend(err.to_string())
    }

    /// Writes and formats the header row when cell A1 is still blank.
    async fn ensure_header(&self) -> Result<(), AuditError> {
        let (_, existing) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, "A1:A1")
            .doit()
            .await
            .map_err(Self::map_error)?;

        let blank = existing
            .values
            .as_ref()
            .map_or(true, |values| values.is_empty());
        if !blank {
            return Ok(());
        }

        let header = SHEET_HEADER
            .iter()
            .map(|column| Value::String((*column).to_string()))
            .collect::<Vec<_>>();
        self.append_cells(header, "RAW").await?;

        let format = BatchUpdateSpreadsheetRequest {
            requests: Some(header_format_requests()),
            ..BatchUpdateSpreadsheetRequest::default()
        };
        self.hub
            .spreadsheets()
            .batch_update(format, &self.spreadsheet_id)
            .doit()
            .await
            .map_err(Self::map_error)?;

        Ok(())
    }

    async fn append_cells(&self, cells: Vec<Value>, input_option: &str) -> Result<(), AuditError> {
        let payload = ValueRange {
            values: Some(vec![cells]),
            ..ValueRange::default()
        };

        self.hub
            .spreadsheets()
            .values_append(payload, &self.spreadsheet_id, "A1")
            .value_input_option(input_option)
            .doit()
            .await
            .map_err(Self::map_error)?;

        Ok(())
    }
}

impl<C> std::fmt::Debug for GoogleSheetsSink<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsSink")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C> AuditSink for GoogleSheetsSink<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    async fn append(&self, record: &ConsultationRecord) -> Result<String, AuditError> {
        self.ensure_header().await?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let cells = record
            .to_row(&timestamp)
            .into_iter()
            .map(Value::String)
            .collect();
        self.append_cells(cells, "USER_ENTERED").await?;

        Ok(self.spreadsheet_url())
    }
}

/// Header styling applied once, right after the header row is written:
/// bold white text on a blue band, centered, with row 1 frozen.
fn header_format_requests() -> Vec<Request> {
    let white = Color {
        red: Some(1.0),
        green: Some(1.0),
        blue: Some(1.0),
        alpha: None,
    };
    let blue = Color {
        red: Some(0.0),
        green: Some(0.34),
        blue: Some(0.7),
        alpha: None,
    };

    let band = Request {
        repeat_cell: Some(RepeatCellRequest {
            range: Some(GridRange {
                sheet_id: Some(0),
                start_row_index: Some(0),
                end_row_index: Some(1),
                start_column_index: Some(0),
                end_column_index: Some(SHEET_HEADER.len() as i32),
            }),
            cell: Some(CellData {
                user_entered_format: Some(CellFormat {
                    background_color: Some(blue),
                    horizontal_alignment: Some("CENTER".to_string()),
                    text_format: Some(TextFormat {
                        bold: Some(true),
                        foreground_color_style: Some(ColorStyle {
                            rgb_color: Some(white),
                            theme_color: None,
                        }),
                        ..TextFormat::default()
                    }),
                    ..CellFormat::default()
                }),
                ..CellData::default()
            }),
            fields: "userEnteredFormat(backgroundColor,textFormat,horizontalAlignment)"
                .parse()
                .ok(),
        }),
        ..Request::default()
    };

    let freeze = Request {
        update_sheet_properties: Some(UpdateSheetPropertiesRequest {
            properties: Some(SheetProperties {
                sheet_id: Some(0),
                grid_properties: Some(GridProperties {
                    frozen_row_count: Some(1),
                    ..GridProperties::default()
                }),
                ..SheetProperties::default()
            }),
            fields: "gridProperties.frozenRowCount".parse().ok(),
        }),
        ..Request::default()
    };

    vec![band, freeze]
}
