//! Settlement statement upload routes.
//!
//! Uploads are multipart forms with a `file` part holding the workbook.
//! Preview and apply take the same form; apply re-reads the file instead of
//! trusting amounts echoed back by the client.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::post,
};
use chrono::NaiveDate;
use serde::Serialize;

use rekon_core::gateway::{RecordQuery, ReconciliationGateway};
use rekon_core::matching::{ApplyReport, ApplyScope, MatchEngine, MatchResult, MatchSummary};
use rekon_core::reconciliation::{PaymentMethod, ReconError};
use rekon_core::statement::{IngestError, StatementImport, StatementIngestor};
use rekon_shared::AppError;
use rekon_shared::types::BranchId;

use crate::error::{ApiError, multipart_error, validation};
use crate::{AppState, middleware::AuthUser};

/// Creates the statement routes, accepting bodies up to `max_upload_bytes`.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/statements/sheets", post(list_sheets))
        .route(
            "/branches/{branch_id}/statements/preview",
            post(preview_statement),
        )
        .route(
            "/branches/{branch_id}/statements/apply",
            post(apply_statement),
        )
        // Multipart framing on top of the file itself.
        .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(64 * 1024)))
}

// ============================================================================
// Response Types
// ============================================================================

/// Sheets of an uploaded workbook.
#[derive(Debug, Serialize)]
pub struct SheetsResponse {
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,
}

/// Statement compared against the system records.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// Ingestion diagnostics and aggregates.
    pub import: StatementImport,
    /// Per-day comparison, newest first.
    pub results: Vec<MatchResult>,
    /// Counts over the results.
    pub summary: MatchSummary,
}

/// Outcome of writing a statement into the records.
#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    /// Per-day outcome.
    pub report: ApplyReport,
    /// Counts over the results that were applied.
    pub summary: MatchSummary,
}

// ============================================================================
// Form Parsing
// ============================================================================

/// Parsed statement upload form.
#[derive(Debug, Default)]
struct StatementForm {
    file: Option<Bytes>,
    sheet: Option<String>,
    method: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(field: &str, text: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| validation(format!("'{field}' must be a date in YYYY-MM-DD form")))
}

async fn read_form(mut multipart: Multipart, max_upload_bytes: usize) -> Result<StatementForm, ApiError> {
    let mut form = StatementForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
                if bytes.len() > max_upload_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "statement exceeds {max_upload_bytes} bytes"
                    ))
                    .into());
                }
                form.file = Some(bytes);
            }
            "sheet" | "method" | "from" | "to" => {
                let text = field.text().await.map_err(|e| multipart_error(&e))?;
                let Some(value) = non_blank(text) else {
                    continue;
                };
                match name.as_str() {
                    "sheet" => form.sheet = Some(value),
                    "method" => form.method = Some(value),
                    "from" => form.from = Some(parse_date("from", &value)?),
                    _ => form.to = Some(parse_date("to", &value)?),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn require_file(form: &StatementForm) -> Result<Bytes, ApiError> {
    form.file
        .clone()
        .ok_or_else(|| validation("multipart field 'file' is required"))
}

/// Runs a workbook decode on the blocking pool.
async fn decode<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, IngestError> + Send + 'static,
{
    let decoded = tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| AppError::Internal(format!("statement decode task: {e}")))?;
    Ok(decoded?)
}

/// Everything preview and apply share: the ingested statement matched
/// against the system records of its range.
struct Prepared {
    import: StatementImport,
    method: PaymentMethod,
    results: Vec<MatchResult>,
}

async fn prepare(
    state: &AppState,
    auth: &AuthUser,
    branch_id: BranchId,
    form: &StatementForm,
) -> Result<Prepared, ApiError> {
    let method = form
        .method
        .as_deref()
        .map(PaymentMethod::new)
        .ok_or_else(|| validation("multipart field 'method' is required"))?;
    let bytes = require_file(form)?;
    let ingestor = state.ingestor();
    let sheet = form.sheet.clone();

    let import = decode(move || ingestor.ingest(&bytes, sheet.as_deref())).await?;

    // Without an explicit range the statement's own span is compared.
    let span = import.date_span();
    let from = form.from.or(span.map(|(first, _)| first));
    let to = form.to.or(span.map(|(_, last)| last));

    let records = match (from, to) {
        (Some(from), Some(to)) if from <= to => {
            let query = RecordQuery {
                business_id: auth.business_id(),
                branch_id,
                from,
                to,
                payment_method: Some(method.clone()),
            };
            state
                .gateway
                .list_records(&query)
                .await
                .map_err(ReconError::from)?
        }
        (Some(from), Some(to)) => {
            return Err(validation(format!("Invalid date range: {from} is after {to}")));
        }
        _ => Vec::new(),
    };

    let aggregates: Vec<_> = import
        .aggregates
        .iter()
        .filter(|a| from.is_none_or(|f| a.date >= f) && to.is_none_or(|t| a.date <= t))
        .copied()
        .collect();
    let results = MatchEngine::match_daily(branch_id, &aggregates, &records);

    Ok(Prepared {
        import,
        method,
        results,
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/statements/sheets`
async fn list_sheets(
    State(state): State<AppState>,
    _auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<SheetsResponse>, ApiError> {
    let form = read_form(multipart, state.reconciliation.max_upload_bytes).await?;
    let bytes = require_file(&form)?;
    let sheets = decode(move || StatementIngestor::sheet_names(&bytes)).await?;
    Ok(Json(SheetsResponse { sheets }))
}

/// POST `/branches/{branch_id}/statements/preview`
async fn preview_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(branch_id): Path<BranchId>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError> {
    let form = read_form(multipart, state.reconciliation.max_upload_bytes).await?;
    let prepared = prepare(&state, &auth, branch_id, &form).await?;

    let summary = MatchSummary::from_results(&prepared.results);
    Ok(Json(PreviewResponse {
        import: prepared.import,
        results: prepared.results,
        summary,
    }))
}

/// POST `/branches/{branch_id}/statements/apply`
///
/// A run that stops on a store failure still answers 200; the report names
/// the failed day and the days never attempted.
async fn apply_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(branch_id): Path<BranchId>,
    multipart: Multipart,
) -> Result<Json<ApplyResponse>, ApiError> {
    let form = read_form(multipart, state.reconciliation.max_upload_bytes).await?;
    let prepared = prepare(&state, &auth, branch_id, &form).await?;

    let scope = ApplyScope {
        business_id: auth.business_id(),
        branch_id,
        payment_method: prepared.method,
    };
    let report = MatchEngine::apply(state.gateway.as_ref(), &scope, &prepared.results).await;

    Ok(Json(ApplyResponse {
        summary: MatchSummary::from_results(&prepared.results),
        report,
    }))
}
