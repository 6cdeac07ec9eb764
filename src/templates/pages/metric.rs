use crate::domain::MetricsReport;
use crate::query::MetricKind;
use crate::templates::components::{card, kpi_cards, records_table, sql_block};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct MetricVm {
    pub kind: MetricKind,
    pub segment: &'static str,
    pub report: MetricsReport,
    pub sql: String,
}

pub fn metric_page(vm: &MetricVm) -> Markup {
    desktop_layout(
        vm.kind.as_str(),
        html! {
            main class="container" {
                h1 { (vm.kind.as_str()) }
                p class="caption" { "Segment: " (vm.segment) }
                @match &vm.report {
                    MetricsReport::Summary(record) => (kpi_cards(record)),
                    MetricsReport::Breakdown(records) => (card("Breakdown", records_table(key_header(vm.kind), records))),
                }
                (sql_block("Generated SQL", &vm.sql))
            }
        },
    )
}

fn key_header(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::PropertyBreakdown => "Property",
        MetricKind::MonthlyTrend => "Month",
        MetricKind::ChannelMix => "Channel",
        _ => "Scope",
    }
}
