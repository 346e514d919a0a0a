//! Client for the REST backend.
//!
//! Every response is a JSON envelope `{ "success": bool, ..., "error"?: string }`.
//! Failures of any kind (transport, status, `success: false`, malformed body)
//! become [`ClientError::RemoteCall`] naming the endpoint only; the server's
//! raw message is logged and never passed to the user.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docshelf_shared::codec::Blob;

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Document row as returned by `GET /documents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteDocument {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    /// Uploader's display name.
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentsBody {
    documents: Vec<RemoteDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody {
    document_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteComment {
    pub id: i64,
    #[serde(default, alias = "documentId")]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentsBody {
    #[serde(default)]
    comments: Vec<RemoteComment>,
}

/// Payload of a successful login or registration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AuthSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentRequest<'a> {
    document_id: i64,
    comment: &'a str,
}

/// Unit payload for endpoints that only report `success`.
#[derive(Debug, Deserialize)]
struct Empty {}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let req = self.request(Method::POST, "/auth/login").json(&LoginRequest { email, password });
        self.send("POST /auth/login", req).await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        let req = self
            .request(Method::POST, "/auth/register")
            .json(&RegisterRequest { name, email, password });
        self.send("POST /auth/register", req).await
    }

    pub async fn list_documents(&self) -> Result<Vec<RemoteDocument>, ClientError> {
        let req = self.request(Method::GET, "/documents");
        let body: DocumentsBody = self.send("GET /documents", req).await?;
        Ok(body.documents)
    }

    /// Upload a file; returns the id the server assigned.
    pub async fn upload_document(
        &self,
        file_name: &str,
        blob: &Blob,
        title: &str,
        category: &str,
    ) -> Result<i64, ClientError> {
        const ENDPOINT: &str = "POST /documents/upload";

        let part = Part::bytes(blob.bytes.clone())
            .file_name(file_name.to_string())
            .mime_str(&blob.mime)
            .map_err(|e| remote_failure(ENDPOINT, &e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("title", title.to_string())
            .text("category", category.to_string());

        let req = self.request(Method::POST, "/documents/upload").multipart(form);
        let body: UploadBody = self.send(ENDPOINT, req).await?;
        Ok(body.document_id)
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/documents/{id}"));
        let _: Empty = self.send("DELETE /documents/:id", req).await?;
        Ok(())
    }

    pub async fn list_comments(&self, document_id: i64) -> Result<Vec<RemoteComment>, ClientError> {
        let req = self.request(Method::GET, &format!("/comments/{document_id}"));
        let body: CommentsBody = self.send("GET /comments/:documentId", req).await?;
        Ok(body.comments)
    }

    pub async fn add_comment(&self, document_id: i64, comment: &str) -> Result<(), ClientError> {
        let req = self
            .request(Method::POST, "/comments")
            .json(&CommentRequest { document_id, comment });
        let _: Empty = self.send("POST /comments", req).await?;
        Ok(())
    }

    pub async fn delete_comment(&self, id: i64) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("/comments/{id}"));
        let _: Empty = self.send("DELETE /comments/:id", req).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|e| remote_failure(endpoint, &e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| remote_failure(endpoint, &e.to_string()))?;

        debug!(endpoint, status = status.as_u16(), "backend responded");
        parse_envelope(endpoint, status.is_success(), &body)
    }
}

/// Decode an envelope body into `T`, rejecting non-2xx statuses and
/// `success: false` payloads.
pub fn parse_envelope<T: DeserializeOwned>(
    endpoint: &str,
    status_ok: bool,
    body: &str,
) -> Result<T, ClientError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| remote_failure(endpoint, &e.to_string()))?;
    let envelope: Envelope = serde_json::from_value(value.clone())
        .map_err(|e| remote_failure(endpoint, &e.to_string()))?;

    if !status_ok || !envelope.success {
        let detail = envelope.error.as_deref().unwrap_or("no error message");
        return Err(remote_failure(endpoint, detail));
    }

    serde_json::from_value(value).map_err(|e| remote_failure(endpoint, &e.to_string()))
}

fn remote_failure(endpoint: &str, detail: &str) -> ClientError {
    warn!(endpoint, detail, "backend call failed");
    ClientError::RemoteCall(endpoint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_envelope() {
        let body = r#"{"success":true,"documents":[
            {"id":3,"title":"Q3","filename":"q3.pdf","file_path":"uploads/1-q3.pdf","file_size":2048,"category":"Finance","uploaded_by":"Ada","created_at":"2024-01-15T10:00:00Z"}
        ]}"#;
        let docs: DocumentsBody = parse_envelope("GET /documents", true, body).unwrap();
        assert_eq!(docs.documents.len(), 1);
        assert_eq!(docs.documents[0].uploaded_by.as_deref(), Some("Ada"));
        assert_eq!(docs.documents[0].file_size, Some(2048));
    }

    #[test]
    fn test_upload_envelope() {
        let body: UploadBody =
            parse_envelope("POST /documents/upload", true, r#"{"success":true,"documentId":17}"#)
                .unwrap();
        assert_eq!(body.document_id, 17);
    }

    #[test]
    fn test_failure_hides_raw_message() {
        let raw = r#"{"success":false,"error":"ER_NO_SUCH_TABLE: Table 'docs.documents' doesn't exist"}"#;
        let err = parse_envelope::<Empty>("GET /documents", false, raw).unwrap_err();
        assert!(matches!(err, ClientError::RemoteCall(_)));
        assert!(!err.to_string().contains("ER_NO_SUCH_TABLE"));
        assert!(!err.user_message().1.contains("ER_NO_SUCH_TABLE"));
    }

    #[test]
    fn test_success_false_with_ok_status() {
        let err = parse_envelope::<Empty>(
            "POST /documents/upload",
            true,
            r#"{"success":false,"error":"No file uploaded"}"#,
        )
        .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_malformed_body() {
        assert!(parse_envelope::<Empty>("GET /documents", true, "<html>").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:3001/api/");
        assert_eq!(client.base_url, "http://localhost:3001/api");
    }
}
