use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;

use crate::config::{ModerationConfig, SiteConfig};
use crate::workflows::products::domain::{
    ProductId, ProductKey, ProductRecord, ProductSubmission, SubmissionForm,
};
use crate::workflows::products::links::ModerationLinks;
use crate::workflows::products::notify::{ModerationNotice, ModerationNotifier, NotifyError};
use crate::workflows::products::repository::{ProductStore, StoreError};
use crate::workflows::products::router::{moderation_router, ModerationState};
use crate::workflows::products::security::SecurityHash;
use crate::workflows::products::service::ProductModerationService;
use crate::workflows::products::store::InMemoryProductStore;
use crate::workflows::products::views::HtmlViews;
use crate::workflows::products::{MailError, MailMessage, MailTransport};

pub(super) const SITE_URL: &str = "https://products.example.test/";
pub(super) const SECRET: &str = "s3cr3t-hash";
pub(super) const ADMIN_EMAIL: &str = "admin@example.test";

pub(super) fn site() -> SiteConfig {
    SiteConfig {
        url: SITE_URL.to_string(),
        name: "Product Catalog".to_string(),
    }
}

pub(super) fn moderation() -> ModerationConfig {
    ModerationConfig {
        admin_email: ADMIN_EMAIL.to_string(),
        security_hash: SecurityHash::new(SECRET),
    }
}

pub(super) fn form(pairs: &[(&str, &str)]) -> SubmissionForm {
    pairs.iter().copied().collect()
}

pub(super) fn widget_form() -> SubmissionForm {
    form(&[
        ("addproduct", "1"),
        ("firstname", ""),
        ("name", "Widget"),
        ("barcode", ""),
        ("other", "x"),
    ])
}

pub(super) fn product_form(name: &str, barcode: &str) -> SubmissionForm {
    form(&[
        ("addproduct", "1"),
        ("firstname", ""),
        ("name", name),
        ("barcode", barcode),
        ("ingredients", "water"),
    ])
}

pub(super) fn build_service() -> (
    ProductModerationService<InMemoryProductStore, MemoryNotifier>,
    Arc<InMemoryProductStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(InMemoryProductStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service =
        ProductModerationService::new(store.clone(), notifier.clone(), &site(), &moderation());
    (service, store, notifier)
}

pub(super) fn state_for<S, N>(service: ProductModerationService<S, N>) -> ModerationState<S, N> {
    ModerationState {
        service: Arc::new(service),
        views: Arc::new(HtmlViews),
        site: site(),
    }
}

pub(super) fn router_for<S, N>(service: ProductModerationService<S, N>) -> axum::Router
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    moderation_router(state_for(service))
}

/// Notice captured by [`MemoryNotifier`].
#[derive(Debug, Clone)]
pub(super) struct SentNotice {
    pub(super) product_id: ProductId,
    pub(super) submission: ProductSubmission,
    pub(super) links: ModerationLinks,
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    sent: Arc<Mutex<Vec<SentNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<SentNotice> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ModerationNotifier for MemoryNotifier {
    fn notify(&self, notice: ModerationNotice<'_>) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(SentNotice {
                product_id: notice.product_id,
                submission: notice.submission.clone(),
                links: notice.links,
            });
        Ok(())
    }
}

pub(super) struct PanickingNotifier;

impl ModerationNotifier for PanickingNotifier {
    fn notify(&self, _notice: ModerationNotice<'_>) -> Result<(), NotifyError> {
        panic!("mail relay crashed");
    }
}

pub(super) struct FailingNotifier;

impl ModerationNotifier for FailingNotifier {
    fn notify(&self, _notice: ModerationNotice<'_>) -> Result<(), NotifyError> {
        Err(MailError::Transport("smtp relay refused connection".to_string()).into())
    }
}

#[derive(Default, Clone)]
pub(super) struct CapturingTransport {
    pub(super) sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl MailTransport for CapturingTransport {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.sent.lock().expect("mail mutex poisoned").push(message);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl ProductStore for UnavailableStore {
    fn exists(&self, _key: ProductKey<'_>) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_pending(&self, _submission: &ProductSubmission) -> Result<ProductId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn move_to_live(&self, _id: ProductId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn discard(&self, _id: ProductId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unavailable_service() -> ProductModerationService<UnavailableStore, MemoryNotifier> {
    ProductModerationService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemoryNotifier::default()),
        &site(),
        &moderation(),
    )
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) fn assert_redirects_home(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(SITE_URL)
    );
}
