use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ProductId, ProductSubmission};
use super::links::ModerationLinks;
use super::views::{
    Template, ViewContext, ViewError, ViewRenderer, APPROVAL_URL_KEY, DISAPPROVAL_URL_KEY,
    PRODUCT_ID_KEY,
};

pub const MODERATION_EMAIL_SUBJECT: &str = "New Product to be moderated";

/// Outbound message handed to a [`MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to write spooled message: {0}")]
    Spool(#[from] std::io::Error),
    #[error("failed to encode spooled message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Delivers a rendered message. Called from the blocking pool, so implementations may block.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes messages to the operational log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

impl MailTransport for LogMailTransport {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body_bytes = message.body.len(),
            "outbound mail (log transport)"
        );
        Ok(())
    }
}

/// Drops each message as a JSON file into a directory watched by a relay.
#[derive(Debug)]
pub struct SpoolMailTransport {
    directory: PathBuf,
    sequence: AtomicU64,
}

impl SpoolMailTransport {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl MailTransport for SpoolMailTransport {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        fs::create_dir_all(&self.directory)?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let file_name = format!(
            "{}-{sequence:04}.json",
            Utc::now().format("%Y%m%dT%H%M%S%.6fZ")
        );
        let path = self.directory.join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(&message)?)?;
        info!(path = %path.display(), "spooled outbound mail");
        Ok(())
    }
}

/// What the administrator needs to moderate a freshly stored product.
#[derive(Debug, Clone)]
pub struct ModerationNotice<'a> {
    pub product_id: ProductId,
    pub submission: &'a ProductSubmission,
    pub links: ModerationLinks,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Outbound hook fired once per stored submission.
pub trait ModerationNotifier: Send + Sync {
    fn notify(&self, notice: ModerationNotice<'_>) -> Result<(), NotifyError>;
}

/// Renders the moderation email and sends it to the administrator.
pub struct EmailNotifier {
    admin_email: String,
    views: Arc<dyn ViewRenderer>,
    transport: Box<dyn MailTransport>,
}

impl EmailNotifier {
    pub fn new(
        admin_email: impl Into<String>,
        views: Arc<dyn ViewRenderer>,
        transport: Box<dyn MailTransport>,
    ) -> Self {
        Self {
            admin_email: admin_email.into(),
            views,
            transport,
        }
    }
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

impl ModerationNotifier for EmailNotifier {
    fn notify(&self, notice: ModerationNotice<'_>) -> Result<(), NotifyError> {
        let mut context: ViewContext = notice.submission.fields();
        context.insert(PRODUCT_ID_KEY.to_string(), notice.product_id.to_string());
        context.insert(APPROVAL_URL_KEY.to_string(), notice.links.approve_url);
        context.insert(DISAPPROVAL_URL_KEY.to_string(), notice.links.disapprove_url);

        let body = self.views.render(Template::NewProductEmail, &context)?;
        self.transport.send(MailMessage {
            from: self.admin_email.clone(),
            to: self.admin_email.clone(),
            subject: MODERATION_EMAIL_SUBJECT.to_string(),
            content_type: mime::TEXT_HTML_UTF_8.to_string(),
            body,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::products::security::SecurityHash;
    use crate::workflows::products::views::HtmlViews;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default, Clone)]
    struct CapturingTransport {
        sent: Arc<Mutex<Vec<MailMessage>>>,
    }

    impl MailTransport for CapturingTransport {
        fn send(&self, message: MailMessage) -> Result<(), MailError> {
            self.sent.lock().expect("mail mutex poisoned").push(message);
            Ok(())
        }
    }

    fn submission() -> ProductSubmission {
        let mut attributes = BTreeMap::new();
        attributes.insert("ingredients".to_string(), "sugar".to_string());
        ProductSubmission {
            name: "Widget".to_string(),
            barcode: "-".to_string(),
            attributes,
        }
    }

    #[test]
    fn email_notifier_sends_rendered_message_to_admin() {
        let transport = CapturingTransport::default();
        let notifier = EmailNotifier::new(
            "admin@example.test",
            Arc::new(HtmlViews),
            Box::new(transport.clone()),
        );
        let submission = submission();
        let links = ModerationLinks::build(
            "https://example.test/",
            &SecurityHash::new("hash"),
            ProductId(3),
        );

        notifier
            .notify(ModerationNotice {
                product_id: ProductId(3),
                submission: &submission,
                links,
            })
            .expect("notification sent");

        let sent = transport.sent.lock().expect("mail mutex poisoned");
        assert_eq!(sent.len(), 1);
        let message = &sent[0];
        assert_eq!(message.from, "admin@example.test");
        assert_eq!(message.to, "admin@example.test");
        assert_eq!(message.subject, MODERATION_EMAIL_SUBJECT);
        assert_eq!(message.content_type, "text/html; charset=utf-8");
        assert!(message.body.contains("https://example.test/approve/hash/3"));
        assert!(message.body.contains("https://example.test/disapprove/hash/3"));
        assert!(message.body.contains("sugar"));
    }

    #[test]
    fn spool_transport_writes_json_files() {
        let spool = tempfile::tempdir().expect("temp spool dir");
        let directory = spool.path().join("outbox");
        let transport = SpoolMailTransport::new(&directory);
        let message = MailMessage {
            from: "a@example.test".to_string(),
            to: "a@example.test".to_string(),
            subject: MODERATION_EMAIL_SUBJECT.to_string(),
            content_type: mime::TEXT_HTML_UTF_8.to_string(),
            body: "<p>hi</p>".to_string(),
        };

        transport.send(message.clone()).expect("first spooled");
        transport.send(message.clone()).expect("second spooled");

        let mut files: Vec<_> = fs::read_dir(&directory)
            .expect("spool dir exists")
            .map(|entry| entry.expect("dir entry").path())
            .collect();
        files.sort();
        assert_eq!(files.len(), 2);
        let stored: MailMessage =
            serde_json::from_slice(&fs::read(&files[0]).expect("read spool file"))
                .expect("valid json");
        assert_eq!(stored, message);
    }
}
