use super::domain::ProductId;
use super::security::SecurityHash;

/// Approve/disapprove URLs sent to the administrator for one pending product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationLinks {
    pub approve_url: String,
    pub disapprove_url: String,
}

impl ModerationLinks {
    /// `site_url` is expected to end with `/`.
    pub fn build(site_url: &str, secret: &SecurityHash, id: ProductId) -> Self {
        let hash = secret.expose();
        Self {
            approve_url: format!("{site_url}approve/{hash}/{id}"),
            disapprove_url: format!("{site_url}disapprove/{hash}/{id}"),
        }
    }
}
