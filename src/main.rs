//! ID document extractor - HTTP service over the classifier and field extractors.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use id_doc_extractor::config::ServiceConfig;
use id_doc_extractor::diagnostics::{FailureEntry, FailureLog, FailureSink};
use id_doc_extractor::ocr::{extract_pdf_text, OcrInput, OcrProvider, OcrSpaceProvider};
use id_doc_extractor::schema::Extraction;
use id_doc_extractor::store::{ExtractionStore, InsertOutcome};
use id_doc_extractor::{classify, extract, score, DocumentType, SignalScore};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    store: ExtractionStore,
    ocr: Option<Arc<dyn OcrProvider>>,
    failures: FailureLog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "id_doc_extractor=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;

    let ocr: Option<Arc<dyn OcrProvider>> =
        match OcrSpaceProvider::from_config(&config, reqwest::Client::new()) {
            Ok(provider) => {
                info!(
                    "OCR.space provider ready (language={}, engine={})",
                    config.ocr_language, config.ocr_engine
                );
                Some(Arc::new(provider) as Arc<dyn OcrProvider>)
            }
            Err(e) => {
                warn!("OCR disabled: {}. Text endpoints remain available.", e);
                None
            }
        };

    let state = AppState {
        store: ExtractionStore::new(),
        ocr,
        failures: FailureLog::new(),
    };

    let app = router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classify", post(classify_text))
        .route("/extract", post(extract_text))
        .route("/extract/upload", post(extract_upload))
        .route("/extractions", get(list_extractions))
        .route("/extractions/:id", get(get_extraction))
        .route("/extractions/:id/fields.csv", get(get_fields_csv))
        .route("/failures", get(list_failures))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(serde::Deserialize)]
struct ClassifyRequest {
    text: String,
}

#[derive(serde::Serialize)]
struct ClassifyResponse {
    doc_type: DocumentType,
    scores: Vec<SignalScore>,
}

/// Classify OCR text and return the per-type score table.
async fn classify_text(Json(req): Json<ClassifyRequest>) -> Json<ClassifyResponse> {
    let scores = score(&req.text);
    Json(ClassifyResponse {
        doc_type: id_doc_extractor::classify::best_of(&scores),
        scores: Vec::from(scores),
    })
}

#[derive(serde::Deserialize)]
struct ExtractRequest {
    text: String,
    #[serde(default)]
    doc_type: Option<DocumentType>,
    #[serde(default)]
    file_name: Option<String>,
}

/// Extract fields from already-recognized text.
async fn extract_text(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Extraction>, (StatusCode, String)> {
    if req.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Text is empty".to_string()));
    }
    let mut extraction = build_extraction(&req.text, req.doc_type);
    extraction.file_name = req.file_name;
    save(&state, extraction).map(Json)
}

/// Upload an image or PDF, read its text and extract fields.
///
/// Multipart fields: `file` (required), `doc_type` (optional override).
async fn extract_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Extraction>, (StatusCode, String)> {
    let mut filename = String::new();
    let mut file_data = Vec::new();
    let mut doc_type = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().unwrap_or("document").to_string();
                file_data = field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
                })?.to_vec();
            }
            Some("doc_type") => {
                let value = field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read doc_type: {}", e))
                })?;
                let parsed = value.trim().parse::<DocumentType>().map_err(|e| {
                    (StatusCode::BAD_REQUEST, e.to_string())
                })?;
                doc_type = Some(parsed);
            }
            _ => {}
        }
    }

    if file_data.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string()));
    }

    info!("Received file: {} ({} bytes)", filename, file_data.len());

    let size = file_data.len();
    let input = OcrInput::new(filename.clone(), file_data);
    let text = read_text(&state, &input).await?;

    if text.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Could not extract text from document".to_string(),
        ));
    }

    let extraction = build_extraction(&text, doc_type).with_file(filename, size);
    save(&state, extraction).map(Json)
}

/// List stored extractions, newest first.
async fn list_extractions(State(state): State<AppState>) -> Json<Vec<Extraction>> {
    Json(state.store.list())
}

/// Get an extraction by ID.
async fn get_extraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Extraction>, StatusCode> {
    state.store.get(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Fields of one extraction as a `Field,Value` CSV download.
async fn get_fields_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let extraction = state
        .store
        .get(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown extraction: {}", id)))?;
    let csv = extraction.fields.to_csv().map_err(|e| {
        error!("CSV rendering failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("CSV rendering failed: {}", e))
    })?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}

/// Soft failures reported by OCR and PDF reading.
async fn list_failures(State(state): State<AppState>) -> Json<Vec<FailureEntry>> {
    Json(state.failures.entries())
}

// ============================================================================
// Helper functions
// ============================================================================

/// Classify (unless overridden) and extract.
fn build_extraction(text: &str, doc_type: Option<DocumentType>) -> Extraction {
    let doc_type = doc_type.unwrap_or_else(|| classify(text));
    let fields = extract(doc_type, text);
    Extraction::new(doc_type, fields, text)
}

fn save(state: &AppState, extraction: Extraction) -> Result<Extraction, (StatusCode, String)> {
    match state.store.insert(extraction.clone()) {
        InsertOutcome::Stored { id } => {
            info!("Extraction complete: {} ({})", id, extraction.doc_type);
            Ok(extraction)
        }
        InsertOutcome::Duplicate { existing_id } => Err((
            StatusCode::CONFLICT,
            format!(
                "Duplicate {} document: already stored as {}",
                extraction.doc_type, existing_id
            ),
        )),
    }
}

/// Text of an uploaded document: PDF text layer first, then OCR.
async fn read_text(state: &AppState, input: &OcrInput) -> Result<String, (StatusCode, String)> {
    if input.is_pdf() {
        match extract_pdf_text(&input.data) {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => info!("{} has no text layer, falling back to OCR", input.filename),
            Err(e) => state.failures.report("PDF Text", &e.to_string()),
        }
    } else if input.filename.to_lowercase().ends_with(".txt") {
        return Ok(String::from_utf8_lossy(&input.data).into_owned());
    }

    let provider = state.ocr.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "OCR is not configured (set OCR_API_KEY)".to_string(),
        )
    })?;

    let result = provider.process(input, &state.failures).await.map_err(|e| {
        error!("OCR failed for {}: {}", input.filename, e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;
    info!(
        "OCR via {} for {}: engine {}, {} ms",
        result.provider_name,
        input.filename,
        result.engine,
        result
            .processing_ms
            .map_or_else(|| "unknown".to_string(), |ms| ms.to_string())
    );
    Ok(result.text)
}
