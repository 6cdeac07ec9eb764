use crate::domain::metrics::{format_adr, format_count, format_currency};
use crate::domain::MetricsRecord;
use maud::{html, Markup};

pub mod error;

pub use error::html_error_response;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// Revenue, room nights and ADR tiles for one record.
pub fn kpi_cards(record: &MetricsRecord) -> Markup {
    html! {
        div class="kpis" {
            (kpi("Revenue", &format_currency(record.revenue)))
            (kpi("Room Nights", &format_count(record.room_nights)))
            (kpi("ADR", &format_adr(record.adr)))
        }
    }
}

fn kpi(label: &str, value: &str) -> Markup {
    html! {
        div class="card kpi" {
            div class="caption" { (label) }
            div class="value" { (value) }
        }
    }
}

pub fn records_table(key_header: &str, records: &[MetricsRecord]) -> Markup {
    html! {
        @if records.is_empty() {
            p class="caption" { "No data for the selected filters." }
        } @else {
            div style="overflow-x: auto;" {
                table {
                    thead {
                        tr {
                            th { (key_header) }
                            th class="num" { "Revenue" }
                            th class="num" { "Room Nights" }
                            th class="num" { "ADR" }
                        }
                    }
                    tbody {
                        @for record in records {
                            tr {
                                td { (scope_label(record)) }
                                td class="num" { (format_currency(record.revenue)) }
                                td class="num" { (format_count(record.room_nights)) }
                                td class="num" { (format_adr(record.adr)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn scope_label(record: &MetricsRecord) -> String {
    use crate::domain::MetricScope;
    match &record.scope {
        MetricScope::Portfolio => "All".to_string(),
        MetricScope::City(city) => city.clone(),
        MetricScope::Property { id, name } if name.is_empty() => format!("#{id}"),
        MetricScope::Property { name, .. } => name.clone(),
        MetricScope::Month(month) => month.clone(),
        MetricScope::Channel(label) => label.to_string(),
    }
}

pub fn sql_block(title: &str, sql: &str) -> Markup {
    html! {
        details {
            summary { (title) }
            pre class="sql" { code { (sql) } }
        }
    }
}

pub fn error_notice(message: &str) -> Markup {
    html! {
        div class="notice error" role="alert" { (message) }
    }
}


/// One paragraph per non-blank line of generated text.
pub fn paragraphs(text: &str) -> Markup {
    html! {
        @for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            p { (line) }
        }
    }
}
