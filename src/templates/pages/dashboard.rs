use crate::domain::{DateRange, MetricsRecord};
use crate::templates::components::{
    card, error_notice, kpi_cards, paragraphs, records_table, sql_block,
};
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Current values of the filter form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub range: DateRange,
    pub city: Option<String>,
}

impl FilterForm {
    /// `start=..&end=..&city=..`, shared by the reload and export links.
    pub fn query_string(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        out.append_pair("start", &self.range.start.to_string());
        out.append_pair("end", &self.range.end.to_string());
        if let Some(city) = &self.city {
            out.append_pair("city", city);
        }
        out.finish()
    }
}

/// Everything shown once a city has been loaded.
pub struct CityReport {
    pub summary: MetricsRecord,
    pub properties: Vec<MetricsRecord>,
    pub trend: Vec<MetricsRecord>,
    pub channels: Vec<MetricsRecord>,
    /// Generated commentary, or the reason it is missing.
    pub insight: Result<String, String>,
    pub queries: Vec<(&'static str, String)>,
}

pub struct DashboardVm {
    pub cities: Vec<String>,
    pub form: FilterForm,
    pub report: Option<CityReport>,
    /// Why the last load failed; the form stays usable.
    pub error: Option<String>,
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        "City Dashboard",
        html! {
            main class="container" {
                h1 { "City Dashboard" }
                @if let Some(message) = &vm.error {
                    (error_notice(message))
                }
                (filter_form(vm))

                @match &vm.report {
                    Some(report) => (city_report(vm, report)),
                    None => p class="caption" { "Pick a city and a date range, then load the data." },
                }
            }
        },
    )
}

fn filter_form(vm: &DashboardVm) -> Markup {
    let selected = vm.form.city.as_deref();
    html! {
        section class="card" {
            form class="filters" action="/city" method="get" {
                label {
                    "Start date" br;
                    input type="date" name="start" value=(vm.form.range.start.to_string()) required;
                }
                label {
                    "End date" br;
                    input type="date" name="end" value=(vm.form.range.end.to_string()) required;
                }
                label {
                    "City" br;
                    select name="city" required {
                        @if vm.cities.is_empty() {
                            option value="" disabled selected { "No cities available" }
                        }
                        @for city in &vm.cities {
                            option value=(city) selected[Some(city.as_str()) == selected] { (city) }
                        }
                    }
                }
                button type="submit" { "Load City Data" }
            }
            p class="caption" { a href="/?refresh=1" { "Refresh city list" } }
        }
    }
}

fn city_report(vm: &DashboardVm, report: &CityReport) -> Markup {
    let city = vm.form.city.as_deref().unwrap_or_default();
    html! {
        h2 { (city) " · " (vm.form.range.to_string()) }
        (kpi_cards(&report.summary))

        (card("Insight", html! {
            @match &report.insight {
                Ok(text) => (paragraphs(text)),
                Err(reason) => (error_notice(&format!("Insight unavailable: {reason}"))),
            }
        }))

        (card("Properties", html! {
            (records_table("Property", &report.properties))
            @if !report.properties.is_empty() {
                p { a href=(format!("/city/export.xlsx?{}", vm.form.query_string())) { "Download as XLSX" } }
            }
        }))

        (card("Monthly Trend", records_table("Month", &report.trend)))
        (card("Channel Mix", records_table("Channel", &report.channels)))

        (card("Generated SQL", html! {
            @for (title, sql) in &report.queries {
                (sql_block(title, sql))
            }
        }))
    }
}
