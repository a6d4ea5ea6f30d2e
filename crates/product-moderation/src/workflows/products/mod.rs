//! Product submission intake and signed-link moderation.
//!
//! Visitors post a product form; screened submissions are stored as pending and the
//! administrator is mailed approve/disapprove links that carry the shared security hash.

pub mod domain;
pub mod intake;
pub mod links;
pub mod notify;
pub mod repository;
pub mod router;
pub mod security;
pub mod service;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ProductId, ProductKey, ProductRecord, ProductStatus, ProductSubmission, SubmissionForm,
    BARCODE_PLACEHOLDER,
};
pub use intake::{SubmissionGuard, SubmissionRejection};
pub use links::ModerationLinks;
pub use notify::{
    EmailNotifier, LogMailTransport, MailError, MailMessage, MailTransport, ModerationNotice,
    ModerationNotifier, NotifyError, SpoolMailTransport, MODERATION_EMAIL_SUBJECT,
};
pub use repository::{ProductStore, StoreError};
pub use router::{moderation_router, ModerationPath, ModerationState};
pub use security::{SecurityHash, SecurityHashValidator};
pub use service::{
    ModerationAction, ModerationOutcome, ProductModerationService, ServiceError,
    SubmissionOutcome,
};
pub use store::InMemoryProductStore;
pub use views::{HtmlViews, Template, ViewContext, ViewError, ViewRenderer};
