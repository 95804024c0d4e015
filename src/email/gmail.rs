//! Gmail API Client
//!
//! Sends and receives through the Gmail REST API with a short-lived
//! OAuth access token. Receiving means listing unread messages with
//! PDF attachments and downloading the attachment bodies; sending
//! means posting a base64url-encoded MIME message.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Display name used in outgoing `From` headers.
const FROM_NAME: &str = "Financial Analyzer";

/// Default Gmail REST endpoint.
const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com";

/// Search query for inbox polling: unread, has a PDF, recent.
const INBOX_QUERY: &str = "is:unread has:attachment filename:pdf newer_than:1d";

pub struct GmailClient {
    base_url: String,
    access_token: String,
    address: String,
    http: Client,
}

/// A PDF attachment reference within a message.
#[derive(Clone, Debug)]
pub struct PdfAttachment {
    pub filename: String,
    pub attachment_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub id: String,
    pub payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    pub attachment_id: Option<String>,
}

impl GmailClient {
    pub fn new(address: String, access_token: String) -> Self {
        Self::with_base_url(address, access_token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(address: String, access_token: String, base_url: String) -> Self {
        GmailClient {
            base_url,
            access_token,
            address,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/gmail/v1/users/me{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .query(query)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("Gmail API request failed: GET {}", path))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Gmail API error: GET {} -> {}: {}", path, status.as_u16(), body);
        }
        Ok(resp.json().await?)
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Gmail API request failed: POST {}", path))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Gmail API error: POST {} -> {}: {}", path, status.as_u16(), body);
        }
        Ok(resp.json().await?)
    }

    /// Confirm the access token works before the worker starts polling.
    /// Tokens expire after about an hour, so this fails often enough to
    /// deserve a pointed message.
    pub async fn verify(&self) -> Result<()> {
        self.get_json("/profile", &[]).await.context(
            "Gmail API credentials rejected. The access token may have expired \
             (they last about an hour); generate a new one and update GMAIL_ACCESS_TOKEN",
        )?;
        info!(address = %self.address, "Gmail API credentials verified");
        Ok(())
    }

    /// List IDs of unread messages from the last day carrying PDFs.
    pub async fn list_unread_pdf_messages(&self) -> Result<Vec<String>> {
        let json = self
            .get_json("/messages", &[("q", INBOX_QUERY), ("maxResults", "25")])
            .await?;

        let ids = json
            .get("messages")
            .and_then(|m| m.as_array())
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m.get("id").and_then(|id| id.as_str()))
                    .map(|id| id.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(ids)
    }

    /// Fetch a full message, including its MIME part tree.
    pub async fn get_message(&self, id: &str) -> Result<Message> {
        let json = self
            .get_json(&format!("/messages/{}", id), &[("format", "full")])
            .await?;
        serde_json::from_value(json).context("Failed to parse Gmail message")
    }

    /// Download and decode an attachment body.
    pub async fn fetch_attachment(&self, message_id: &str, attachment_id: &str) -> Result<Vec<u8>> {
        let json = self
            .get_json(
                &format!("/messages/{}/attachments/{}", message_id, attachment_id),
                &[],
            )
            .await?;

        let data = json
            .get("data")
            .and_then(|d| d.as_str())
            .context("Attachment response had no data field")?;
        decode_base64url(data)
    }

    /// Mark a message read so the next poll skips it.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.post_json(
            &format!("/messages/{}/modify", id),
            serde_json::json!({"removeLabelIds": ["UNREAD"]}),
        )
        .await?;
        debug!(message = id, "marked read");
        Ok(())
    }

    /// Send a plain-text email.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to = extract_email_address(to);
        let mime = build_mime_message(FROM_NAME, &self.address, &to, subject, body);
        let raw = URL_SAFE_NO_PAD.encode(mime.as_bytes());

        let json = self
            .post_json("/messages/send", serde_json::json!({"raw": raw}))
            .await?;

        let message_id = json.get("id").and_then(|id| id.as_str()).unwrap_or("?");
        info!(%to, message_id, "email sent");
        Ok(())
    }
}

/// Gmail base64url payloads arrive both padded and unpadded.
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data))
        .context("Failed to decode base64url attachment data")
}

/// Assemble a minimal RFC 5322 plain-text message.
pub fn build_mime_message(
    from_name: &str,
    from_addr: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> String {
    format!(
        "From: {} <{}>\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
        from_name, from_addr, to, subject, body
    )
}

/// Pull the bare address out of a `Name <addr>` sender string.
pub fn extract_email_address(sender: &str) -> String {
    Regex::new(r"<(.+?)>")
        .ok()
        .and_then(|re| re.captures(sender).map(|c| c[1].to_string()))
        .unwrap_or_else(|| sender.trim().to_string())
}

/// Walk the MIME part tree collecting PDF attachments.
pub fn collect_pdf_attachments(part: &MessagePart) -> Vec<PdfAttachment> {
    let mut found = Vec::new();
    collect_into(part, &mut found);
    found
}

fn collect_into(part: &MessagePart, found: &mut Vec<PdfAttachment>) {
    let looks_like_pdf = part.mime_type == "application/pdf"
        || part.filename.to_lowercase().ends_with(".pdf");

    if looks_like_pdf && !part.filename.is_empty() {
        if let Some(attachment_id) = part.body.as_ref().and_then(|b| b.attachment_id.clone()) {
            found.push(PdfAttachment {
                filename: part.filename.clone(),
                attachment_id,
            });
        }
    }

    for child in &part.parts {
        collect_into(child, found);
    }
}

/// Case-insensitive header lookup on a message payload.
pub fn header_value<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}
