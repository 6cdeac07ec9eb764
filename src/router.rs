use crate::app::AppState;
use crate::db::run_metrics;
use crate::domain::DateRange;
use crate::errors::ServerError;
use crate::insight::{build_prompt, build_sql_prompt, extract_sql, ExtractError};
use crate::query::{Dialect, MetricKind, ScopeFilters, Segment};
use crate::responses::html::html_with_status;
use crate::responses::html_response;
use crate::responses::ResultResp;
use crate::spreadsheets::export_properties_xlsx;
use crate::templates::pages::{
    assistant_page, dashboard_page, metric_page, AssistantOutcome, AssistantVm, CityReport,
    DashboardVm, FilterForm, MetricVm,
};
use astra::Request;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

type Params = HashMap<String, String>;

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();
    let params = parse_query(&req);
    debug!(method, path, "request");

    match (method, path) {
        ("GET", "/") => dashboard(state, &params, false),
        ("GET", "/city") => dashboard(state, &params, true),
        ("GET", "/city/export.xlsx") => export_properties(state, &params),
        ("GET", "/metrics") => metric(state, &params),
        ("GET", "/assistant") => assistant(state, &params),
        _ => Err(ServerError::NotFound),
    }
}

fn dashboard(state: &AppState, params: &Params, load: bool) -> ResultResp {
    if param(params, "refresh").is_some() {
        state.refresh_cities();
    }
    let cities = state.cities()?;
    let city = param(params, "city").or_else(|| cities.first().cloned());
    let (range, range_err) = match form_range(params) {
        Ok(range) => (range, None),
        Err(err) => {
            let (start, end) = default_form_dates();
            (DateRange::new(start, end), Some(err))
        }
    };
    let form = FilterForm { range, city };

    let loaded = match range_err {
        Some(err) => Err(err),
        None if load => city_report(state, &form).map(Some),
        None => Ok(None),
    };

    match loaded {
        Ok(report) => html_response(dashboard_page(&DashboardVm {
            cities,
            form,
            report,
            error: None,
        })),
        Err(err) => {
            warn!(error = %err, "city dashboard failed");
            html_with_status(
                err.status(),
                dashboard_page(&DashboardVm {
                    cities,
                    form,
                    report: None,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}

fn city_report(state: &AppState, form: &FilterForm) -> Result<CityReport, ServerError> {
    let scope = ScopeFilters {
        city: form.city.clone(),
        property_id: None,
    };
    let range = Some(form.range);
    let build = |kind: MetricKind| state.builder.build_query(kind, range, &scope, None);

    let summary_spec = build(MetricKind::CitySummary)?;
    let property_spec = build(MetricKind::PropertyBreakdown)?;
    let trend_spec = build(MetricKind::MonthlyTrend)?;
    let channel_spec = build(MetricKind::ChannelMix)?;

    let summary = run_metrics(&state.db, &summary_spec)?.into_summary(summary_spec.scope.clone());
    let properties = run_metrics(&state.db, &property_spec)?.into_records();
    let trend = run_metrics(&state.db, &trend_spec)?.into_records();
    let channels = run_metrics(&state.db, &channel_spec)?.into_records();

    let insight = state
        .generator
        .complete(&build_prompt(&summary), &state.model)
        .map_err(|e| {
            warn!(error = %e, scope = %summary.scope, "insight generation failed");
            e.to_string()
        });

    let queries = [
        ("City summary", &summary_spec),
        ("Property breakdown", &property_spec),
        ("Monthly trend", &trend_spec),
        ("Channel mix", &channel_spec),
    ]
    .into_iter()
    .map(|(title, spec)| (title, spec.display_sql(Dialect::Postgres)))
    .collect();

    Ok(CityReport {
        summary,
        properties,
        trend,
        channels,
        insight,
        queries,
    })
}

fn export_properties(state: &AppState, params: &Params) -> ResultResp {
    let range = required_range(params)?;
    let city = param(params, "city").ok_or_else(|| ServerError::BadRequest("city is required".into()))?;
    let spec = state.builder.build_query(
        MetricKind::PropertyBreakdown,
        Some(range),
        &ScopeFilters::city(city.as_str()),
        None,
    )?;
    let records = run_metrics(&state.db, &spec)?.into_records();
    export_properties_xlsx(&records, &city, &range)
}

fn metric(state: &AppState, params: &Params) -> ResultResp {
    let kind: MetricKind = param(params, "kind")
        .as_deref()
        .unwrap_or(MetricKind::CitySummary.as_str())
        .parse()?;
    let segment = param(params, "segment")
        .map(|s| s.parse::<Segment>())
        .transpose()
        .map_err(ServerError::BadRequest)?;
    let property_id = param(params, "property_id")
        .map(|id| {
            id.parse::<i64>()
                .map_err(|_| ServerError::BadRequest(format!("invalid property_id '{id}'")))
        })
        .transpose()?;
    let scope = ScopeFilters {
        city: param(params, "city"),
        property_id,
    };

    let spec = state
        .builder
        .build_query(kind, optional_range(params)?, &scope, segment)?;
    let report = run_metrics(&state.db, &spec)?;

    html_response(metric_page(&MetricVm {
        kind,
        segment: spec.segment.as_str(),
        sql: spec.display_sql(Dialect::Postgres),
        report,
    }))
}

fn assistant(state: &AppState, params: &Params) -> ResultResp {
    let question = params.get("question").cloned().unwrap_or_default();

    let outcome = build_sql_prompt(&question, state.builder.policy()).map(|prompt| {
        match state.generator.complete(&prompt, &state.model) {
            Ok(reply) => match extract_sql(&reply) {
                Ok(sql) => AssistantOutcome::Sql(sql),
                Err(ExtractError::NoResultExtracted { raw }) => AssistantOutcome::NoSql(raw),
            },
            Err(e) => {
                warn!(error = %e, "sql assistant request failed");
                AssistantOutcome::Failed(e.to_string())
            }
        }
    });

    html_response(assistant_page(&AssistantVm { question, outcome }))
}

/// Non-blank, trimmed parameter value.
fn param(params: &Params, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn date_param(params: &Params, key: &str) -> Result<Option<NaiveDate>, ServerError> {
    param(params, key)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| ServerError::BadRequest(format!("{key} must be a YYYY-MM-DD date, got '{v}'")))
        })
        .transpose()
}

/// Both bounds or neither; neither means the default window.
fn optional_range(params: &Params) -> Result<Option<DateRange>, ServerError> {
    match (date_param(params, "start")?, date_param(params, "end")?) {
        (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end))),
        (None, None) => Ok(None),
        _ => Err(ServerError::BadRequest(
            "start and end must be given together".into(),
        )),
    }
}

fn required_range(params: &Params) -> Result<DateRange, ServerError> {
    optional_range(params)?
        .ok_or_else(|| ServerError::BadRequest("start and end are required".into()))
}

/// Form bounds; either missing bound takes its default.
fn form_range(params: &Params) -> Result<DateRange, ServerError> {
    let (default_start, default_end) = default_form_dates();
    Ok(DateRange::new(
        date_param(params, "start")?.unwrap_or(default_start),
        date_param(params, "end")?.unwrap_or(default_end),
    ))
}

fn default_form_dates() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default(),
    )
}

fn parse_query(req: &Request) -> Params {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
