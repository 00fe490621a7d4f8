//! HTTP client for the external extraction service.
//!
//! The service turns an uploaded PDF into a JSON array of rows and exposes a
//! health check, its upload limits, and a mapping-suggestion endpoint. All
//! calls are blocking; the application runs them on worker threads.

use crate::domain::{EditorError, EditorResult};
use crate::infrastructure::config::EditorConfig;
use reqwest::blocking::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const PROCESS_PATH: &str = "/api/process-pdf-sync/";
pub const HEALTH_PATH: &str = "/api/health";
pub const CONFIG_PATH: &str = "/api/config";

/// Confidence above which a suggestion is shown as reliable.
pub const CONFIDENT_SCORE: f64 = 0.7;

/// Rows returned by the processing endpoint plus its metadata headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub rows: Vec<Value>,
    /// Seconds spent server-side, from `X-Processing-Time`
    pub processing_time: Option<f64>,
    /// Row count reported in `X-Items-Count`
    pub items_count: Option<usize>,
    /// `production` or `demo`, from `X-Processing-Mode`
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    pub version: Option<String>,
    pub mode: Option<String>,
    #[serde(default)]
    pub real_processing: bool,
}

/// Upload limits advertised by the service.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub real_processing_available: bool,
    pub max_file_size_mb: Option<u64>,
    #[serde(default)]
    pub supported_formats: Vec<String>,
    pub mode: Option<String>,
}

impl ServiceConfig {
    /// Rejects files the service would refuse, before uploading them.
    pub fn check_upload(&self, file_name: &str, size: u64) -> EditorResult<()> {
        if !self.supported_formats.is_empty() {
            let lower = file_name.to_ascii_lowercase();
            if !self.supported_formats.iter().any(|ext| lower.ends_with(&ext.to_ascii_lowercase())) {
                return Err(EditorError::FileRejected(format!(
                    "unsupported file format, allowed: {}",
                    self.supported_formats.join(", ")
                )));
            }
        }
        if let Some(max_mb) = self.max_file_size_mb {
            if size > max_mb.saturating_mul(1024 * 1024) {
                return Err(EditorError::FileRejected(format!(
                    "file is larger than {max_mb} MB"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MappingRequest<'a> {
    pdf_element_text: &'a str,
    data_table_columns: &'a [String],
}

/// A guess linking a PDF text fragment to a table column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub suggested_column: String,
    pub confidence_score: f64,
}

impl MappingSuggestion {
    pub fn is_confident(&self) -> bool {
        self.confidence_score > CONFIDENT_SCORE
    }
}

#[derive(Debug, Clone)]
pub struct PdfApiClient {
    config: EditorConfig,
    http: Client,
}

impl PdfApiClient {
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: EditorConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Uploads a PDF file for extraction.
    pub fn process_pdf(&self, path: &Path) -> EditorResult<ProcessOutcome> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        self.process_pdf_bytes(&file_name, bytes)
    }

    /// Uploads PDF content under the given file name.
    pub fn process_pdf_bytes(&self, file_name: &str, bytes: Vec<u8>) -> EditorResult<ProcessOutcome> {
        let url = self.config.endpoint(PROCESS_PATH);
        log::info!("uploading {} ({} bytes) to {}", file_name, bytes.len(), url);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let response = check_status(self.http.post(&url).multipart(form).send()?)?;
        let processing_time = header_value(&response, "X-Processing-Time");
        let items_count = header_value(&response, "X-Items-Count");
        let mode = response
            .headers()
            .get("X-Processing-Mode")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let rows: Vec<Value> = response.json()?;
        log::info!(
            "extraction returned {} rows (server time {:?}s, mode {:?})",
            rows.len(),
            processing_time,
            mode
        );
        Ok(ProcessOutcome {
            rows,
            processing_time,
            items_count,
            mode,
        })
    }

    /// Fetches the health report. Any 2xx counts as healthy; a body that is
    /// not the expected JSON still yields a default report.
    pub fn health(&self) -> EditorResult<HealthReport> {
        let response = check_status(self.http.get(self.config.endpoint(HEALTH_PATH)).send()?)?;
        let text = response.text()?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    pub fn health_check(&self) -> bool {
        match self.health() {
            Ok(_) => true,
            Err(err) => {
                log::warn!("health check failed: {err}");
                false
            }
        }
    }

    pub fn service_config(&self) -> EditorResult<ServiceConfig> {
        let response = check_status(self.http.get(self.config.endpoint(CONFIG_PATH)).send()?)?;
        Ok(response.json()?)
    }

    /// Asks the mapping endpoint which column `text` belongs to.
    ///
    /// The answer must name one of `columns`; the score is clamped to [0, 1].
    pub fn suggest_mapping(&self, text: &str, columns: &[String]) -> EditorResult<MappingSuggestion> {
        let request = MappingRequest {
            pdf_element_text: text,
            data_table_columns: columns,
        };
        let url = self.config.endpoint(&self.config.suggest_path);
        let response = check_status(self.http.post(&url).json(&request).send()?)?;
        let mut suggestion: MappingSuggestion = response.json()?;

        if !columns.contains(&suggestion.suggested_column) {
            return Err(EditorError::InvalidSuggestion(format!(
                "'{}' is not one of the table columns",
                suggestion.suggested_column
            )));
        }
        if !suggestion.confidence_score.is_finite() {
            return Err(EditorError::InvalidSuggestion("confidence is not a number".to_string()));
        }
        suggestion.confidence_score = suggestion.confidence_score.clamp(0.0, 1.0);
        Ok(suggestion)
    }
}

/// Turns non-2xx responses into [`EditorError::Api`], preferring the
/// service's `detail` message.
fn check_status(response: Response) -> EditorResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<Value>()
        .ok()
        .and_then(|body| {
            ["detail", "error"].iter().find_map(|key| match body.get(*key) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
        })
        .unwrap_or_else(|| format!("HTTP error: status {}", status.as_u16()));

    Err(EditorError::Api {
        status: status.as_u16(),
        detail,
    })
}

fn header_value<T: std::str::FromStr>(response: &Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn client_for(base: &str) -> PdfApiClient {
        let http = Client::builder().no_proxy().build().unwrap();
        PdfApiClient::with_http_client(EditorConfig::new(base, "/api/suggest-mapping", 10), http)
    }

    fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut extra = String::new();
        for (name, value) in headers {
            extra.push_str(&format!("{name}: {value}\r\n"));
        }
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{extra}\r\n{body}",
            body.len()
        )
    }

    /// Serves one canned response and hands back the raw request text.
    fn serve_once(reply: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn read_request(stream: &mut impl Read) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok());

            match content_length {
                Some(len) if buf.len() >= end + 4 + len => break,
                Some(_) => continue,
                None if head.contains("transfer-encoding: chunked") => {
                    if buf.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                }
                None => break,
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_process_pdf_parses_rows_and_headers() {
        let body = r#"[{"id": "gen-1-0", "pos": "P1", "found_in_pdf_on_pages": [1]}, {"id": "gen-1-1", "pos": "P2"}]"#;
        let (base, server) = serve_once(response(
            "200 OK",
            &[("X-Processing-Time", "2.01"), ("X-Items-Count", "2"), ("X-Processing-Mode", "demo")],
            body,
        ));

        let outcome = client_for(&base)
            .process_pdf_bytes("equipment.pdf", b"%PDF-1.4 test".to_vec())
            .unwrap();
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0]["pos"], "P1");
        assert_eq!(outcome.processing_time, Some(2.01));
        assert_eq!(outcome.items_count, Some(2));
        assert_eq!(outcome.mode.as_deref(), Some("demo"));

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/process-pdf-sync/ HTTP/1.1"));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"equipment.pdf\""));
        assert!(request.contains("application/pdf"));
    }

    #[test]
    fn test_process_pdf_without_headers() {
        let (base, server) = serve_once(response("200 OK", &[], "[]"));
        let outcome = client_for(&base).process_pdf_bytes("empty.pdf", Vec::new()).unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.processing_time, None);
        assert_eq!(outcome.mode, None);
        server.join().unwrap();
    }

    #[test]
    fn test_error_detail_is_surfaced() {
        let (base, server) = serve_once(response(
            "500 Internal Server Error",
            &[],
            r#"{"detail": "Processing error: no tables found"}"#,
        ));
        let err = client_for(&base).process_pdf_bytes("a.pdf", b"x".to_vec()).unwrap_err();
        match err {
            EditorError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "Processing error: no tables found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_error_without_payload_reports_status() {
        let (base, server) = serve_once(response("404 Not Found", &[], "not here"));
        let err = client_for(&base).process_pdf_bytes("a.pdf", b"x".to_vec()).unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: status 404");
        server.join().unwrap();
    }

    #[test]
    fn test_health_check() {
        let (base, server) = serve_once(response(
            "200 OK",
            &[],
            r#"{"status": "ok", "version": "1.0.0", "real_processing": false, "mode": "demo"}"#,
        ));
        let report = client_for(&base).health().unwrap();
        assert_eq!(report.status, "ok");
        assert_eq!(report.mode.as_deref(), Some("demo"));
        assert!(!report.real_processing);
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/health HTTP/1.1"));
    }

    #[test]
    fn test_health_check_fails_when_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(!client_for(&format!("http://{addr}")).health_check());
    }

    #[test]
    fn test_health_check_fails_on_server_error() {
        let (base, server) = serve_once(response("503 Service Unavailable", &[], "{}"));
        assert!(!client_for(&base).health_check());
        server.join().unwrap();
    }

    #[test]
    fn test_suggest_mapping() {
        let (base, server) = serve_once(response(
            "200 OK",
            &[],
            r#"{"suggestedColumn": "manufacturer", "confidenceScore": 0.92}"#,
        ));
        let columns = vec!["name".to_string(), "manufacturer".to_string()];
        let suggestion = client_for(&base)
            .suggest_mapping("Manufacturer: Systemair", &columns)
            .unwrap();
        assert_eq!(suggestion.suggested_column, "manufacturer");
        assert!(suggestion.is_confident());

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/suggest-mapping HTTP/1.1"));
        assert!(request.contains(r#""pdfElementText":"Manufacturer: Systemair""#));
        assert!(request.contains(r#""dataTableColumns":["name","manufacturer"]"#));
    }

    #[test]
    fn test_suggest_mapping_rejects_unknown_column() {
        let (base, server) = serve_once(response(
            "200 OK",
            &[],
            r#"{"suggestedColumn": "price", "confidenceScore": 0.5}"#,
        ));
        let columns = vec!["name".to_string()];
        let err = client_for(&base).suggest_mapping("Price: 10", &columns).unwrap_err();
        assert!(matches!(err, EditorError::InvalidSuggestion(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_suggest_mapping_clamps_confidence() {
        let (base, server) = serve_once(response(
            "200 OK",
            &[],
            r#"{"suggestedColumn": "name", "confidenceScore": 1.7}"#,
        ));
        let columns = vec!["name".to_string()];
        let suggestion = client_for(&base).suggest_mapping("ITP", &columns).unwrap();
        assert_eq!(suggestion.confidence_score, 1.0);
        server.join().unwrap();
    }

    #[test]
    fn test_service_config_limits_uploads() {
        let (base, server) = serve_once(response(
            "200 OK",
            &[],
            r#"{"real_processing_available": true, "max_file_size_mb": 1, "supported_formats": [".pdf"], "mode": "production"}"#,
        ));
        let config = client_for(&base).service_config().unwrap();
        server.join().unwrap();

        assert!(config.real_processing_available);
        assert!(config.check_upload("Spec.PDF", 1024).is_ok());
        assert!(matches!(
            config.check_upload("notes.txt", 10),
            Err(EditorError::FileRejected(_))
        ));
        assert!(matches!(
            config.check_upload("big.pdf", 2 * 1024 * 1024),
            Err(EditorError::FileRejected(_))
        ));
    }

    #[test]
    fn test_empty_service_config_accepts_anything() {
        let config = ServiceConfig::default();
        assert!(config.check_upload("anything.bin", u64::MAX).is_ok());
    }

    #[test]
    fn test_huge_size_limit_does_not_overflow() {
        let config = ServiceConfig {
            max_file_size_mb: Some(u64::MAX / 1024),
            ..ServiceConfig::default()
        };
        assert!(config.check_upload("a.pdf", 10).is_ok());
        assert!(config.check_upload("a.pdf", u64::MAX).is_ok());
    }
}
