//! HTTP Route Handlers
//!
//! Upload-and-analyze, results listing, the batch stubs, and the two
//! static frontend files.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::analyzer::analyze_pdf;
use crate::pdf::safe_filename;
use crate::types::{CriterionAnalysis, DocumentType, ResultEntry};

use super::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/upload-pdf/", post(upload_pdf))
        .route("/results/", get(get_results))
        .route("/analyze-all/", post(analyze_all))
        // Kept for older frontends that still call the grading endpoint.
        .route("/grade-all/", post(analyze_all))
}

/// Error payload: `{"error": "..."}` with an appropriate status.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::internal(format!("{:#}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}

/// Response for a single upload, mirroring the frontend contract.
#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub client_name: String,
    pub document_type: String,
    pub overall_assessment: String,
    pub analysis_summary: String,
    pub key_findings: String,
    pub red_flags: String,
    pub recommendations: String,
    pub criteria_analysis: Vec<CriterionAnalysis>,
}

/// POST /upload-pdf/ - accept a PDF, analyze it, record the result.
async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut filename = String::new();
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut document_type = "auto".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().unwrap_or("document.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("could not read file: {}", e)))?;
                file_bytes = Some(bytes.to_vec());
            }
            Some("document_type") => {
                document_type = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid document_type: {}", e)))?;
            }
            _ => {}
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::bad_request("missing 'file' field in upload"))?;

    // Same contract as the CLI: auto means detect, anything else must
    // be a known type. Checked before anything touches disk.
    let requested = match document_type.as_str() {
        "auto" => None,
        other => Some(DocumentType::from_slug(other).ok_or_else(|| {
            ApiError::bad_request(format!(
                "unknown document_type '{}'; use auto, bank_statement, credit_report, or generic",
                other
            ))
        })?),
    };

    // Stage under the incoming directory with a unique prefix so
    // repeated uploads of the same filename never clobber each other.
    std::fs::create_dir_all(&state.incoming_dir)
        .map_err(|e| ApiError::internal(format!("could not create incoming directory: {}", e)))?;
    let staged = state.incoming_dir.join(format!(
        "{}-{}",
        Uuid::new_v4(),
        safe_filename(&filename)
    ));
    std::fs::write(&staged, &file_bytes)
        .map_err(|e| ApiError::internal(format!("could not save upload: {}", e)))?;

    info!(file = %staged.display(), "upload staged");

    let (doc_type, report) = analyze_pdf(&state.gemini, &state.rubrics_path, &staged, requested)
        .await
        .map_err(|e| {
            error!("upload analysis failed: {:#}", e);
            ApiError::internal(format!("{:#}", e))
        })?;

    // Uploads carry no sender address; the email column stays blank.
    if let Err(e) = state
        .results
        .append(ResultEntry::from_report(&report, doc_type, ""))
    {
        error!("failed to record result: {:#}", e);
    }

    Ok(Json(UploadResponse {
        filename,
        client_name: report.client_name.clone(),
        document_type: doc_type.slug().to_string(),
        overall_assessment: report.overall_assessment.clone(),
        analysis_summary: report.analysis_summary.clone(),
        key_findings: report.key_findings.clone(),
        red_flags: report.red_flags.clone(),
        recommendations: report.recommendations.clone(),
        criteria_analysis: report.criteria_analysis,
    }))
}

/// GET /results/ - the full ledger.
async fn get_results(State(state): State<AppState>) -> Result<Json<Vec<ResultEntry>>, ApiError> {
    let entries = state.results.read_all()?;
    Ok(Json(entries))
}

/// POST /analyze-all/ (and /grade-all/) - batch acknowledgment stub.
async fn analyze_all() -> Json<Value> {
    Json(json!({"message": "All documents processed", "processed_count": 0}))
}

/// GET / - the frontend page.
pub async fn serve_home() -> Result<Html<String>, ApiError> {
    let body = tokio::fs::read_to_string("index.html")
        .await
        .map_err(|_| ApiError::internal("index.html not found"))?;
    Ok(Html(body))
}

/// GET /style.css - the frontend stylesheet.
pub async fn serve_css() -> Result<Response, ApiError> {
    let body = tokio::fs::read_to_string("style.css")
        .await
        .map_err(|_| ApiError::internal("style.css not found"))?;
    Ok(([(header::CONTENT_TYPE, "text/css")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use httpmock::prelude::*;
    use tower::ServiceExt;

    use crate::analyzer::GeminiClient;
    use crate::config::default_config;
    use crate::results::ResultsStore;
    use crate::server::build_app;
    use crate::types::AnalysisReport;

    const BOUNDARY: &str = "findoc-test-boundary";

    /// A tiny one-page PDF carrying one line of Helvetica text.
    fn minimal_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut buf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, object) in objects.iter().enumerate() {
            offsets.push(buf.len());
            buf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
        }
        let xref_at = buf.len();
        buf.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
        );
        for offset in offsets {
            buf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        buf
    }

    fn write_rubrics(dir: &Path) {
        let body = serde_json::json!({
            "bank_statement": {
                "name": "Bank Statement Review",
                "description": "Checks for a retail bank statement.",
                "criteria": [
                    {"title": "Balance Consistency", "points": 100, "description": "Opening plus activity equals closing."}
                ]
            }
        });
        std::fs::write(
            dir.join("rubrics.json"),
            serde_json::to_string_pretty(&body).unwrap(),
        )
        .unwrap();
    }

    fn test_state(dir: &Path, gemini_url: &str) -> AppState {
        let mut config = default_config();
        config.gemini_api_url = gemini_url.to_string();
        config.gemini_api_key = "test-key".to_string();
        let gemini = Arc::new(GeminiClient::new(&config));
        AppState {
            config: Arc::new(config),
            gemini,
            results: Arc::new(ResultsStore::new(dir.join("grading_results.json"))),
            rubrics_path: dir.join("rubrics.json"),
            incoming_dir: dir.join("incoming_pdfs"),
        }
    }

    /// Assemble a multipart/form-data body. `filename` marks file parts.
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload-pdf/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_analyzes_and_records() {
        let server = MockServer::start();
        let gemini = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(200).json_body(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{
                            "text": "{\"client_name\": \"John Doe\", \"overall_assessment\": \"Low Risk\", \"analysis_summary\": \"Stable balance.\"}"
                        }]
                    }
                }]
            }));
        });

        let dir = tempfile::tempdir().unwrap();
        write_rubrics(dir.path());
        let state = test_state(dir.path(), &server.base_url());

        let body = multipart_body(&[
            (
                "file",
                Some("statement.pdf"),
                &minimal_pdf("Account Holder: John Doe"),
            ),
            ("document_type", None, b"bank_statement"),
        ]);
        let response = build_app(state.clone())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["filename"], "statement.pdf");
        assert_eq!(json["client_name"], "John Doe");
        assert_eq!(json["document_type"], "bank_statement");
        assert_eq!(json["overall_assessment"], "Low Risk");

        gemini.assert();

        let entries = state.results.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "John Doe");
        assert_eq!(entries[0].email, "");
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), "http://127.0.0.1:1");

        let body = multipart_body(&[("document_type", None, b"auto")]);
        let response = build_app(state.clone())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("file"));
        assert!(state.results.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_unknown_document_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), "http://127.0.0.1:1");

        let body = multipart_body(&[
            ("file", Some("statement.pdf"), b"%PDF-1.4"),
            ("document_type", None, b"mortgage"),
        ]);
        let response = build_app(state.clone())
            .oneshot(upload_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("unknown document_type 'mortgage'"));
        // Rejected before anything was staged.
        assert!(!state.incoming_dir.exists());
    }

    #[tokio::test]
    async fn test_results_endpoint_returns_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), "http://127.0.0.1:1");

        let report: AnalysisReport =
            serde_json::from_value(serde_json::json!({"client_name": "Jane Roe"})).unwrap();
        state
            .results
            .append(ResultEntry::from_report(
                &report,
                DocumentType::CreditReport,
                "jane@example.com",
            ))
            .unwrap();

        let response = build_app(state)
            .oneshot(
                Request::builder()
                    .uri("/results/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["name"], "Jane Roe");
        assert_eq!(entries[0]["email"], "jane@example.com");
        assert_eq!(entries[0]["document_type"], "credit_report");
    }

    #[tokio::test]
    async fn test_analyze_all_stub_shape() {
        let Json(body) = analyze_all().await;
        assert_eq!(body["message"], "All documents processed");
        assert_eq!(body["processed_count"], 0);
    }

    #[test]
    fn test_api_error_response_status() {
        let resp = ApiError::bad_request("missing field").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::internal("boom").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
