use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Form field carrying the submit button value; absent for anything but a real form post.
pub const SUBMIT_FLAG_FIELD: &str = "addproduct";
/// Hidden field that humans never fill in.
pub const HONEYPOT_FIELD: &str = "firstname";
pub const NAME_FIELD: &str = "name";
pub const BARCODE_FIELD: &str = "barcode";
/// Stored in place of a barcode the visitor left blank.
pub const BARCODE_PLACEHOLDER: &str = "-";

/// Store-generated numeric identifier of a product record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw form-encoded fields exactly as posted to `/submit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionForm {
    fields: BTreeMap<String, String>,
}

impl SubmissionForm {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl<K, V> FromIterator<(K, V)> for SubmissionForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A screened submission, ready to be stored as a pending product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSubmission {
    pub name: String,
    pub barcode: String,
    /// Free-form attributes other than name and barcode.
    pub attributes: BTreeMap<String, String>,
}

impl ProductSubmission {
    /// Whether the barcode is the placeholder stored for a blank entry.
    pub fn has_placeholder_barcode(&self) -> bool {
        self.barcode == BARCODE_PLACEHOLDER
    }

    /// Flattened view of every field, keyed by form field name.
    pub fn fields(&self) -> BTreeMap<String, String> {
        let mut fields = self.attributes.clone();
        fields.insert(NAME_FIELD.to_string(), self.name.clone());
        fields.insert(BARCODE_FIELD.to_string(), self.barcode.clone());
        fields
    }
}

/// Identity used for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKey<'a> {
    Name(&'a str),
    Barcode(&'a str),
}

impl ProductKey<'_> {
    pub const fn field(&self) -> &'static str {
        match self {
            ProductKey::Name(_) => NAME_FIELD,
            ProductKey::Barcode(_) => BARCODE_FIELD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Pending,
    Live,
}

impl ProductStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Live => "live",
        }
    }
}

/// Stored product with its moderation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub submission: ProductSubmission,
    pub status: ProductStatus,
    pub submitted_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    pub fn is_pending(&self) -> bool {
        self.status == ProductStatus::Pending
    }

    /// Whether this record claims the given identity.
    pub fn matches(&self, key: ProductKey<'_>) -> bool {
        match key {
            ProductKey::Name(name) => self.submission.name == name,
            ProductKey::Barcode(barcode) => {
                barcode != BARCODE_PLACEHOLDER && self.submission.barcode == barcode
            }
        }
    }
}
