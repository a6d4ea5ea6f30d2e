use std::collections::BTreeMap;

use super::domain::{
    ProductSubmission, SubmissionForm, BARCODE_FIELD, BARCODE_PLACEHOLDER, HONEYPOT_FIELD,
    NAME_FIELD, SUBMIT_FLAG_FIELD,
};

/// Reasons a posted form is turned away before it reaches the store.
///
/// None of these are shown to the visitor; the router answers every variant with a
/// redirect to the home page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionRejection {
    #[error("submit flag missing from form")]
    MissingSubmitFlag,
    #[error("honeypot field was filled in")]
    HoneypotTripped,
    #[error("required field `{0}` missing")]
    MissingField(&'static str),
    #[error("field `{field}` is blank")]
    BlankField { field: String },
}

/// Turns raw form fields into a [`ProductSubmission`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionGuard;

impl SubmissionGuard {
    pub fn screen(&self, form: SubmissionForm) -> Result<ProductSubmission, SubmissionRejection> {
        if !is_present(form.get(SUBMIT_FLAG_FIELD)) {
            return Err(SubmissionRejection::MissingSubmitFlag);
        }
        // Whitespace counts: humans never see the field.
        if is_present(form.get(HONEYPOT_FIELD)) {
            return Err(SubmissionRejection::HoneypotTripped);
        }

        let mut fields = form.into_fields();
        fields.remove(SUBMIT_FLAG_FIELD);
        fields.remove(HONEYPOT_FIELD);

        let barcode = fields
            .remove(BARCODE_FIELD)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| BARCODE_PLACEHOLDER.to_string());

        let mut attributes = BTreeMap::new();
        for (field, value) in fields {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(SubmissionRejection::BlankField { field });
            }
            attributes.insert(field, trimmed.to_string());
        }

        let name = attributes
            .remove(NAME_FIELD)
            .ok_or(SubmissionRejection::MissingField(NAME_FIELD))?;

        Ok(ProductSubmission {
            name,
            barcode,
            attributes,
        })
    }
}

/// Any non-empty raw value, whitespace included.
fn is_present(value: Option<&str>) -> bool {
    value.map_or(false, |value| !value.is_empty())
}
