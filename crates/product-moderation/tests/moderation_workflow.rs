use std::sync::{Arc, Mutex};

use product_moderation::config::{ModerationConfig, SiteConfig};
use product_moderation::workflows::products::{
    EmailNotifier, HtmlViews, InMemoryProductStore, MailError, MailMessage, MailTransport,
    ModerationAction, ModerationOutcome, ProductId, ProductModerationService, ProductStatus,
    ProductStore, SecurityHash, SubmissionForm, SubmissionOutcome, BARCODE_PLACEHOLDER,
};

#[derive(Default, Clone)]
struct Outbox {
    messages: Arc<Mutex<Vec<MailMessage>>>,
}

impl MailTransport for Outbox {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.messages.lock().expect("outbox poisoned").push(message);
        Ok(())
    }
}

fn service(
    outbox: &Outbox,
) -> (
    ProductModerationService<InMemoryProductStore, EmailNotifier>,
    Arc<InMemoryProductStore>,
) {
    let site = SiteConfig {
        url: "https://lifyzer.example.test/".to_string(),
        name: "Lifyzer".to_string(),
    };
    let moderation = ModerationConfig {
        admin_email: "moderator@example.test".to_string(),
        security_hash: SecurityHash::new("f00d-cafe"),
    };
    let store = Arc::new(InMemoryProductStore::default());
    let notifier = Arc::new(EmailNotifier::new(
        moderation.admin_email.clone(),
        Arc::new(HtmlViews),
        Box::new(outbox.clone()),
    ));
    (
        ProductModerationService::new(store.clone(), notifier, &site, &moderation),
        store,
    )
}

fn widget() -> SubmissionForm {
    [
        ("addproduct", "1"),
        ("firstname", ""),
        ("name", "Widget"),
        ("barcode", ""),
        ("other", "x"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn widget_submission_is_mailed_with_signed_links() {
    let outbox = Outbox::default();
    let (service, store) = service(&outbox);

    let outcome = service.submit(widget()).expect("submitted");
    let SubmissionOutcome::Submitted { product_id, .. } = outcome else {
        panic!("expected submitted outcome, got {outcome:?}");
    };

    let record = store.fetch(product_id).expect("fetch").expect("stored");
    assert_eq!(record.submission.barcode, BARCODE_PLACEHOLDER);
    assert_eq!(record.status, ProductStatus::Pending);

    let messages = outbox.messages.lock().expect("outbox poisoned");
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.from, "moderator@example.test");
    assert_eq!(message.to, "moderator@example.test");
    assert_eq!(message.subject, "New Product to be moderated");
    assert!(message.body.contains(&format!(
        "https://lifyzer.example.test/approve/f00d-cafe/{product_id}"
    )));
    assert!(message.body.contains(&format!(
        "https://lifyzer.example.test/disapprove/f00d-cafe/{product_id}"
    )));
}

#[test]
fn full_moderation_cycle() {
    let outbox = Outbox::default();
    let (service, store) = service(&outbox);

    let SubmissionOutcome::Submitted { product_id, .. } =
        service.submit(widget()).expect("submitted")
    else {
        panic!("expected submitted outcome");
    };

    assert!(matches!(
        service.approve("not-the-hash", product_id),
        Err(product_moderation::workflows::products::ServiceError::InvalidSecurityHash)
    ));
    assert_eq!(
        service.approve("f00d-cafe", product_id).expect("approved"),
        ModerationOutcome::Applied(ModerationAction::Approve)
    );
    assert_eq!(
        service.disapprove("f00d-cafe", product_id).expect("handled"),
        ModerationOutcome::NotPending
    );

    let live = store.fetch(product_id).expect("fetch").expect("kept");
    assert_eq!(live.status, ProductStatus::Live);
    assert!(live.published_at.is_some());

    assert_eq!(
        service.submit(widget()).expect("handled"),
        SubmissionOutcome::Duplicate { field: "name" }
    );
    assert!(store.fetch(ProductId(2)).expect("fetch").is_none());
    assert_eq!(outbox.messages.lock().expect("outbox poisoned").len(), 1);
}
