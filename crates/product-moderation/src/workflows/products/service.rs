use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{ProductId, ProductRecord, SubmissionForm};
use super::intake::{SubmissionGuard, SubmissionRejection};
use super::links::ModerationLinks;
use super::notify::{ModerationNotice, ModerationNotifier, NotifyError};
use super::repository::{ProductStore, StoreError};
use super::security::{SecurityHash, SecurityHashValidator};
use crate::config::{ModerationConfig, SiteConfig};

pub const SUBMITTED_MESSAGE: &str = "Product successfully submitted. It will be reviewed shortly";
pub const DUPLICATE_MESSAGE: &str = "Oops! This product has already been added to the database.";
pub const APPROVED_MESSAGE: &str = "Product approved! :)";
pub const DISCARDED_MESSAGE: &str = "Product discarded! :(";
pub const NOT_PENDING_MESSAGE: &str = "An error occurred...";
pub const INVALID_HASH_MESSAGE: &str = "Invalid security hash!";

/// Service composing intake screening, the product store, and the moderation notifier.
pub struct ProductModerationService<S, N> {
    guard: SubmissionGuard,
    store: Arc<S>,
    notifier: Arc<N>,
    validator: SecurityHashValidator,
    site_url: String,
    secret: SecurityHash,
}

/// Result of a submission that passed intake screening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted {
        product_id: ProductId,
        links: ModerationLinks,
    },
    Duplicate {
        field: &'static str,
    },
}

impl SubmissionOutcome {
    pub const fn message(&self) -> &'static str {
        match self {
            SubmissionOutcome::Submitted { .. } => SUBMITTED_MESSAGE,
            SubmissionOutcome::Duplicate { .. } => DUPLICATE_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Disapprove,
}

impl ModerationAction {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Disapprove => "disapprove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationOutcome {
    Applied(ModerationAction),
    /// The id does not refer to a pending product (never existed, or already moderated).
    NotPending,
}

impl ModerationOutcome {
    pub const fn message(self) -> &'static str {
        match self {
            ModerationOutcome::Applied(ModerationAction::Approve) => APPROVED_MESSAGE,
            ModerationOutcome::Applied(ModerationAction::Disapprove) => DISCARDED_MESSAGE,
            ModerationOutcome::NotPending => NOT_PENDING_MESSAGE,
        }
    }
}

impl<S, N> ProductModerationService<S, N>
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        site: &SiteConfig,
        moderation: &ModerationConfig,
    ) -> Self {
        Self {
            guard: SubmissionGuard,
            store,
            notifier,
            validator: SecurityHashValidator::new(moderation.security_hash.clone()),
            site_url: site.url.clone(),
            secret: moderation.security_hash.clone(),
        }
    }

    /// Screen, store, and announce a posted product form.
    pub fn submit(&self, form: SubmissionForm) -> Result<SubmissionOutcome, ServiceError> {
        let submission = self.guard.screen(form)?;

        let product_id = match self.store.insert_pending(&submission) {
            Ok(id) => id,
            Err(StoreError::Conflict { field }) => {
                debug!(field, "duplicate product submission");
                return Ok(SubmissionOutcome::Duplicate { field });
            }
            Err(err) => return Err(err.into()),
        };

        let links = self.links_for(product_id);
        let notice = ModerationNotice {
            product_id,
            submission: &submission,
            links: links.clone(),
        };
        if let Err(err) = self.notifier.notify(notice) {
            // Roll the insert back so the visitor can resubmit.
            if let Err(discard_err) = self.store.discard(product_id) {
                warn!(%product_id, error = %discard_err, "failed to roll back unannounced product");
            }
            return Err(err.into());
        }

        info!(%product_id, "product queued for moderation");
        Ok(SubmissionOutcome::Submitted { product_id, links })
    }

    pub fn approve(
        &self,
        hash: &str,
        product_id: ProductId,
    ) -> Result<ModerationOutcome, ServiceError> {
        self.moderate(ModerationAction::Approve, hash, product_id)
    }

    pub fn disapprove(
        &self,
        hash: &str,
        product_id: ProductId,
    ) -> Result<ModerationOutcome, ServiceError> {
        self.moderate(ModerationAction::Disapprove, hash, product_id)
    }

    pub fn moderate(
        &self,
        action: ModerationAction,
        hash: &str,
        product_id: ProductId,
    ) -> Result<ModerationOutcome, ServiceError> {
        if !self.validator.is_valid(hash) {
            return Err(ServiceError::InvalidSecurityHash);
        }

        let applied = match action {
            ModerationAction::Approve => self.store.move_to_live(product_id)?,
            ModerationAction::Disapprove => self.store.discard(product_id)?,
        };

        if applied {
            info!(%product_id, action = action.label(), "product moderated");
            Ok(ModerationOutcome::Applied(action))
        } else {
            Ok(ModerationOutcome::NotPending)
        }
    }

    /// Approve/disapprove URLs for a product id.
    pub fn links_for(&self, product_id: ProductId) -> ModerationLinks {
        ModerationLinks::build(&self.site_url, &self.secret, product_id)
    }

    pub fn get(&self, product_id: ProductId) -> Result<ProductRecord, ServiceError> {
        self.store
            .fetch(product_id)?
            .ok_or(ServiceError::NotFound(product_id))
    }
}

/// Error raised by the product moderation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Rejected(#[from] SubmissionRejection),
    #[error("invalid security hash")]
    InvalidSecurityHash,
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
