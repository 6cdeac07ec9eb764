use crate::domain::{DateRange, MetricScope, MetricsRecord};
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 5] = ["Property ID", "Property", "Revenue", "Room Nights", "ADR"];

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

/// Property breakdown as a single-sheet workbook. Amounts are written as
/// numbers with a two-decimal format; a missing ADR leaves the cell blank.
pub fn build_properties_workbook(records: &[MetricsRecord]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let money = Format::new().set_num_format("#,##0.00");
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(xlsx_err("header"))?;
    }

    for (i, record) in records.iter().enumerate() {
        let r = (i + 1) as u32;
        let (id, name) = match &record.scope {
            MetricScope::Property { id, name } => (Some(*id), name.as_str()),
            _ => (None, ""),
        };

        if let Some(id) = id {
            worksheet
                .write_number(r, 0, id as f64)
                .map_err(xlsx_err("property id"))?;
        }
        worksheet
            .write_string(r, 1, name)
            .map_err(xlsx_err("property name"))?;
        worksheet
            .write_number_with_format(r, 2, record.revenue, &money)
            .map_err(xlsx_err("revenue"))?;
        worksheet
            .write_number(r, 3, record.room_nights as f64)
            .map_err(xlsx_err("room nights"))?;
        if let Some(adr) = record.adr {
            worksheet
                .write_number_with_format(r, 4, adr, &money)
                .map_err(xlsx_err("ADR"))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

pub fn export_properties_xlsx(records: &[MetricsRecord], city: &str, range: &DateRange) -> ResultResp {
    let buffer = build_properties_workbook(records)?;
    xlsx_response(buffer, &export_filename(city, range))
}

fn export_filename(city: &str, range: &DateRange) -> String {
    let slug: String = city
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("properties_{slug}_{}_{}.xlsx", range.start, range.end)
}
