//! Google Drive upload client.
//!
//! Files are sent in a single multipart request (metadata part followed by
//! the file bytes) to the Drive v3 upload endpoint using the configured
//! bearer token.

use reqwest::multipart::{Form, Part};
use resortops_common::ApiError;
use resortops_config::DriveConfig;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

/// What Drive returns for an uploaded file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub web_view_link: Option<String>,
}

#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    config: DriveConfig,
}

impl DriveClient {
    pub fn new(config: DriveConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.config.max_upload_bytes
    }

    pub async fn upload(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<DriveFile, ApiError> {
        let token = self
            .config
            .access_token
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable("Google Drive upload is not configured".into()))?;

        if bytes.len() > self.config.max_upload_bytes {
            return Err(ApiError::BadRequest(format!(
                "file is {} bytes, the limit is {}",
                bytes.len(),
                self.config.max_upload_bytes
            )));
        }

        let mut metadata = json!({ "name": name, "mimeType": mime_type });
        if let Some(folder) = &self.config.folder_id {
            metadata["parents"] = json!([folder]);
        }

        let metadata_part = Part::text(metadata.to_string())
            .mime_str("application/json; charset=UTF-8")
            .map_err(|e| ApiError::Internal(e.into()))?;
        let file_part = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|_| ApiError::BadRequest(format!("invalid content type {mime_type:?}")))?;
        let form = Form::new().part("metadata", metadata_part).part("file", file_part);

        let response = self
            .http
            .post(&self.config.upload_url)
            .bearer_auth(token.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Drive request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Drive upload rejected");
            return Err(ApiError::Upstream(format!("Drive returned {status}")));
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("unexpected Drive response: {e}")))?;
        tracing::info!(file_id = %file.id, name = %file.name, "Uploaded file to Drive");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use secrecy::SecretString;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    async fn spawn_mock(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server run");
        });
        format!("http://{addr}/upload")
    }

    fn config(url: String, token: Option<&str>) -> DriveConfig {
        DriveConfig {
            access_token: token.map(|t| SecretString::from(t.to_string())),
            folder_id: Some("folder-1".into()),
            upload_url: url,
            max_upload_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn test_upload_sends_bearer_and_parses_file() {
        let seen: Arc<Mutex<Option<(String, Vec<u8>)>>> = Arc::default();
        let capture = seen.clone();
        let app = Router::new().route(
            "/upload",
            post(move |headers: HeaderMap, body: axum::body::Bytes| {
                let capture = capture.clone();
                async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *capture.lock().unwrap() = Some((auth, body.to_vec()));
                    Json(json!({ "id": "f-123", "name": "invoice.pdf", "webViewLink": "https://drive/f-123" }))
                }
            }),
        );
        let url = spawn_mock(app).await;

        let client = DriveClient::new(config(url, Some("tok-1")));
        let file = client.upload("invoice.pdf", "application/pdf", b"%PDF-1.5".to_vec()).await.unwrap();

        assert_eq!(file.id, "f-123");
        assert_eq!(file.web_view_link.as_deref(), Some("https://drive/f-123"));

        let (auth, body) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(auth, "Bearer tok-1");
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("\"parents\":[\"folder-1\"]"));
        assert!(body.contains("%PDF-1.5"));
    }

    #[tokio::test]
    async fn test_upstream_error_is_reported() {
        let app = Router::new().route("/upload", post(|| async { StatusCode::FORBIDDEN }));
        let url = spawn_mock(app).await;

        let client = DriveClient::new(config(url, Some("tok-1")));
        let err = client.upload("a.txt", "text/plain", b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_disabled_and_oversized() {
        let client = DriveClient::new(config("http://127.0.0.1:9/upload".into(), None));
        assert!(!client.is_enabled());
        let err = client.upload("a.txt", "text/plain", b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));

        let client = DriveClient::new(config("http://127.0.0.1:9/upload".into(), Some("tok")));
        let err = client.upload("big.bin", "application/octet-stream", vec![0; 2048]).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
