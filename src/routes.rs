use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    AppState, aggregate,
    aggregate::Dashboard,
    config::Config,
    error::{AppResult, LoadError},
    filter::{self, FilterOptions, FilterSpec},
    models::{CleanedTable, ContentType, RatingGroup, TitleRecord},
    templates::{self, Selection},
};

/// Dashboard query string. Repeated keys select several values.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default, rename = "type")]
    types: Vec<String>,
    #[serde(default, rename = "rating")]
    ratings: Vec<String>,
    #[serde(default, rename = "country")]
    countries: Vec<String>,
    year_min: Option<i16>,
    year_max: Option<i16>,
    genre: Option<String>,
    rows: Option<usize>,
    applied: Option<String>,
}

struct ResolvedQuery {
    options: FilterOptions,
    spec: FilterSpec,
    genre: Option<String>,
    rows: usize,
}

impl ResolvedQuery {
    fn new(table: &CleanedTable, q: &DashboardQuery, config: &Config) -> Self {
        let options = FilterOptions::from_table(table);

        let spec = if q.applied.is_some() {
            let lo = q.year_min.unwrap_or(*options.release_years.start());
            let hi = q.year_max.unwrap_or(*options.release_years.end());
            FilterSpec {
                content_types: q.types.iter().filter_map(|t| ContentType::from_label(t)).collect(),
                rating_groups: q.ratings.iter().filter_map(|g| RatingGroup::from_label(g)).collect(),
                release_years: lo.min(hi)..=lo.max(hi),
                countries: q
                    .countries
                    .iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        } else {
            FilterSpec::defaults(&options, &config.default_countries)
        };

        let genre = q
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != "All")
            .map(str::to_string);

        Self { options, spec, genre, rows: q.rows.unwrap_or(config.sample_rows) }
    }

    fn view<'a>(&self, table: &'a CleanedTable) -> Vec<&'a TitleRecord> {
        let view = filter::apply(&table.rows, &self.spec);
        debug!(rows = view.len(), of = table.len(), "filtered view");
        view
    }

    fn dashboard(&self, view: &[&TitleRecord], config: &Config) -> Dashboard {
        let word_view = filter::by_genre(view, self.genre.as_deref());
        Dashboard::build(view, &word_view, config.top_k, config.histogram_bins)
    }
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DashboardQuery>,
) -> AppResult<Html<String>> {
    let table = match state.catalog.table() {
        Ok(table) => table,
        Err(LoadError::Poisoned) => return Err(LoadError::Poisoned.into()),
        Err(err) => {
            warn!(error = %err, "catalog unavailable");
            return Ok(Html(templates::no_data_page(err.to_string())));
        },
    };

    let resolved = ResolvedQuery::new(&table, &q, &state.config);
    let view = resolved.view(&table);
    let dash = resolved.dashboard(&view, &state.config);
    let sample = aggregate::sample(&view, resolved.rows);

    let selection =
        Selection { spec: &resolved.spec, genre: resolved.genre.as_deref(), rows: resolved.rows };

    Ok(Html(templates::dashboard_page(&resolved.options, &selection, &dash, &sample, &table.report)))
}

pub async fn titles(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DashboardQuery>,
) -> Response {
    let table = match state.catalog.table() {
        Ok(table) => table,
        Err(err) => return unavailable(err),
    };

    let resolved = ResolvedQuery::new(&table, &q, &state.config);
    Json(resolved.view(&table)).into_response()
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DashboardQuery>,
) -> Response {
    let table = match state.catalog.table() {
        Ok(table) => table,
        Err(err) => return unavailable(err),
    };

    let resolved = ResolvedQuery::new(&table, &q, &state.config);
    let view = resolved.view(&table);
    Json(resolved.dashboard(&view, &state.config)).into_response()
}

pub async fn report(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog.table() {
        Ok(table) => Json(table.report.clone()).into_response(),
        Err(err) => unavailable(err),
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

fn unavailable(err: LoadError) -> Response {
    warn!(error = %err, "catalog unavailable");
    let body = serde_json::json!({ "error": err.to_string() });
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}
