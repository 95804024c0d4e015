//! Email Worker
//!
//! Background inbox poller. Every tick it lists unread messages with
//! PDF attachments, stages each attachment in the incoming directory,
//! runs the analysis pipeline, records the result, and replies to the
//! sender. Per-message failures are reported back by email and logged;
//! the loop itself keeps running.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::analyzer::{analyze_pdf, GeminiClient};
use crate::config::AnalyzerConfig;
use crate::pdf::safe_filename;
use crate::results::ResultsStore;
use crate::types::ResultEntry;

use super::gmail::{collect_pdf_attachments, extract_email_address, header_value, GmailClient};
use super::report;

pub struct EmailWorker {
    gmail: GmailClient,
    gemini: Arc<GeminiClient>,
    results: ResultsStore,
    rubrics_path: PathBuf,
    incoming_dir: PathBuf,
    poll_interval: Duration,
}

impl EmailWorker {
    pub fn new(
        config: &AnalyzerConfig,
        gemini: Arc<GeminiClient>,
        results: ResultsStore,
        rubrics_path: PathBuf,
        incoming_dir: PathBuf,
    ) -> Self {
        Self::from_parts(
            GmailClient::new(
                config.email_address.clone(),
                config.gmail_access_token.clone(),
            ),
            gemini,
            results,
            rubrics_path,
            incoming_dir,
            Duration::from_secs(config.poll_interval_secs),
        )
    }

    /// Assemble a worker from pre-built clients.
    pub fn from_parts(
        gmail: GmailClient,
        gemini: Arc<GeminiClient>,
        results: ResultsStore,
        rubrics_path: PathBuf,
        incoming_dir: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        EmailWorker {
            gmail,
            gemini,
            results,
            rubrics_path,
            incoming_dir,
            poll_interval,
        }
    }

    /// Verify credentials, then poll the inbox forever.
    pub async fn run(&self) -> Result<()> {
        self.gmail
            .verify()
            .await
            .context("Email worker cannot start")?;

        info!(
            interval_secs = self.poll_interval.as_secs(),
            "email worker started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.poll_once().await {
                error!("inbox poll failed: {:#}", e);
            }
        }
    }

    /// One polling pass over the inbox.
    pub async fn poll_once(&self) -> Result<()> {
        let ids = self.gmail.list_unread_pdf_messages().await?;
        if ids.is_empty() {
            return Ok(());
        }
        info!(count = ids.len(), "unseen messages with PDF attachments");

        for id in ids {
            if let Err(e) = self.process_message(&id).await {
                error!(message = %id, "failed to process message: {:#}", e);
                continue;
            }
            // Mark read only after a full pass so a crash retries the message.
            if let Err(e) = self.gmail.mark_read(&id).await {
                warn!(message = %id, "could not mark message read: {:#}", e);
            }
        }
        Ok(())
    }

    async fn process_message(&self, id: &str) -> Result<()> {
        let message = self.gmail.get_message(id).await?;
        let payload = message
            .payload
            .as_ref()
            .context("Message had no payload")?;

        let subject = header_value(payload, "Subject").unwrap_or("(no subject)").to_string();
        let sender = header_value(payload, "From").unwrap_or_default().to_string();
        let sender_email = extract_email_address(&sender);

        info!(from = %sender_email, %subject, "processing email");

        let attachments = collect_pdf_attachments(payload);
        if attachments.is_empty() {
            info!(from = %sender_email, "no PDF attachment found");
            return Ok(());
        }

        for attachment in attachments {
            let bytes = self
                .gmail
                .fetch_attachment(&message.id, &attachment.attachment_id)
                .await?;

            std::fs::create_dir_all(&self.incoming_dir)
                .context("Failed to create incoming directory")?;
            let path = self.incoming_dir.join(safe_filename(&attachment.filename));
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to save attachment to {}", path.display()))?;
            info!(file = %path.display(), "saved PDF attachment");

            self.analyze_and_respond(&path, &sender_email, &subject).await;
        }

        Ok(())
    }

    /// Analyze one staged PDF and email the outcome either way.
    async fn analyze_and_respond(&self, path: &std::path::Path, sender: &str, subject: &str) {
        match analyze_pdf(&self.gemini, &self.rubrics_path, path, None).await {
            Ok((doc_type, analysis)) => {
                if let Err(e) = self
                    .results
                    .append(ResultEntry::from_report(&analysis, doc_type, sender))
                {
                    error!("failed to record result: {:#}", e);
                }

                let body = report::format_report_body(doc_type, &analysis);
                if let Err(e) = self
                    .gmail
                    .send(sender, &report::reply_subject(subject), &body)
                    .await
                {
                    error!(to = %sender, "failed to send analysis report: {:#}", e);
                } else {
                    info!(to = %sender, "analysis report sent");
                }
            }
            Err(e) => {
                warn!(file = %path.display(), "analysis failed: {:#}", e);
                let body = report::format_error_body(subject, &format!("{:#}", e));
                if let Err(send_err) = self
                    .gmail
                    .send(sender, &report::error_subject(subject), &body)
                    .await
                {
                    error!(to = %sender, "failed to send error notification: {:#}", send_err);
                }
            }
        }
    }
}
