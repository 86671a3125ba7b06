#![cfg(not(tarpaulin_include))]

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::Query;
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::downloader::{
    self, CSV_CONTENT_TYPE, CSV_FILE_NAME, XLSX_CONTENT_TYPE, XLSX_FILE_NAME,
};
use crate::error::ExportError;
use crate::filter::{
    FilteredResult, SearchStatus, apply_filters, classification_choices, description_choices,
    item_number_choices_for,
};
use crate::form::{OptionsQuery, SearchQuery};
use crate::loader;
use crate::page::PageView;
use crate::table::{CellValue, Classification, RecordTable};

/// Shared, read-only state behind every request
pub struct AppState {
    table: Arc<RecordTable>,
    config: Config,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(table: Arc<RecordTable>, config: Config) -> Result<Self, handlebars::TemplateError> {
        let mut templates = Handlebars::new();
        templates.register_template_string("index", include_str!("./static/index.html.hbs"))?;

        Ok(Self {
            table,
            config,
            templates,
        })
    }
}

#[derive(Serialize)]
struct OptionsResponse {
    item_numbers: Vec<String>,
    descriptions: Vec<String>,
    classifications: BTreeMap<&'static str, Vec<String>>,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    status: &'static str,
    count: usize,
    headers: &'a [String],
    rows: Vec<&'a [CellValue]>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

/// Load the dataset and serve the lookup page until the process is stopped
///
/// The dataset is read once through [`loader::load_cached`] before the
/// listener binds; a load failure is returned to the caller.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let table = loader::load_cached(&config.data_path)?;
    let bind_addr = config.bind_addr;

    // Setup app state
    let app_state = Arc::new(AppState::new(table, config)?);
    let app = router(app_state);

    // Start server
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router around shared state
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(serve_search_page))
        .route("/api/options", get(get_options))
        .route("/api/search", get(search))
        .route("/export", get(export_xlsx))
        .route("/export/csv", get(export_csv))
        .nest_service("/static", static_dir)
        .with_state(state)
}

async fn serve_search_page(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<SearchQuery>,
) -> Response {
    let view = PageView::build(&state.table, &state.config, &query, raw_query.as_deref());

    match state.templates.render("index", &view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("failed to render search page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn get_options(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OptionsQuery>,
) -> Json<OptionsResponse> {
    let table = &state.table;

    let classifications = Classification::ALL
        .iter()
        .map(|&column| (column.key(), classification_choices(table, column)))
        .collect();

    Json(OptionsResponse {
        item_numbers: item_number_choices_for(table, query.desc.as_deref()),
        descriptions: description_choices(table, query.itm_no.as_deref()),
        classifications,
    })
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let result = apply_filters(&state.table, &query.criteria());

    let status = match result.status() {
        SearchStatus::Found(_) => "ok",
        SearchStatus::NoMatch => "empty",
    };

    Json(SearchResponse {
        status,
        count: result.len(),
        headers: result.headers(),
        rows: result.rows().collect(),
    })
    .into_response()
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let result = page_result(&state, &query);
    download(
        downloader::result_to_xlsx(&result),
        XLSX_CONTENT_TYPE,
        "filtered_results.xlsx",
        XLSX_FILE_NAME,
    )
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let result = page_result(&state, &query);
    download(
        downloader::result_to_csv(&result),
        CSV_CONTENT_TYPE,
        "filtered_results.csv",
        CSV_FILE_NAME,
    )
}

// Exports follow the page, so the download matches what was on screen
fn page_result<'a>(state: &'a AppState, query: &SearchQuery) -> FilteredResult<'a> {
    apply_filters(&state.table, &query.page_criteria(state.config.trigger))
}

fn download(
    bytes: Result<Vec<u8>, ExportError>,
    content_type: &'static str,
    ascii_name: &str,
    file_name: &str,
) -> Response {
    match bytes {
        Ok(bytes) => {
            let disposition = format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                ascii_name,
                urlencoding::encode(file_name)
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            log::error!("export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    status: "error",
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use std::io;

    #[tokio::test]
    async fn failed_export_is_reported_as_json() {
        let error = ExportError::Io(io::Error::other("disk full"));
        let response = download(Err(error), XLSX_CONTENT_TYPE, "filtered_results.xlsx", XLSX_FILE_NAME);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "IO error: disk full");
    }

    #[tokio::test]
    async fn successful_export_is_an_attachment() {
        let response = download(Ok(b"a,b\n".to_vec()), CSV_CONTENT_TYPE, "filtered_results.csv", CSV_FILE_NAME);

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"filtered_results.csv\""));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"a,b\n");
    }
}
