use std::path::Path;

use anyhow::{anyhow, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct UploadResponse {
    summary: String,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

/// HTTP client for the document Q&A backend.
///
/// Two endpoints: `/api/upload` takes the PDF as a multipart file and
/// returns a summary, `/api/ask` takes a question and returns an answer.
/// No document or session identifier is sent; the backend answers against
/// the most recently uploaded document.
#[derive(Clone)]
pub struct DocQaClient {
    client: Client,
    base_url: String,
}

impl DocQaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a PDF and return the generated summary.
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let url = format!("{}/api/upload", self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("upload request failed ({}): {}", status, body));
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.summary)
    }

    /// Ask a question about the uploaded document and return the answer.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let form = Form::new().text("question", question.to_string());

        let url = format!("{}/api/ask", self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("ask request failed ({}): {}", status, body));
        }

        let ask: AskResponse = response.json().await?;
        Ok(ask.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let client = DocQaClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn parses_backend_responses() {
        let upload: UploadResponse =
            serde_json::from_str(r#"{"summary": "Q3 revenue rose 4%."}"#).unwrap();
        assert_eq!(upload.summary, "Q3 revenue rose 4%.");

        let ask: AskResponse = serde_json::from_str(r#"{"answer": "It rose 4%."}"#).unwrap();
        assert_eq!(ask.answer, "It rose 4%.");
    }
}
