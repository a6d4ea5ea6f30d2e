use std::collections::BTreeMap;

/// Key-value context handed to a renderer.
pub type ViewContext = BTreeMap<String, String>;

pub const SITE_URL_KEY: &str = "siteUrl";
pub const SITE_NAME_KEY: &str = "siteName";
pub const PAGE_NAME_KEY: &str = "pageName";
pub const MESSAGE_KEY: &str = "message";
pub const PRODUCT_ID_KEY: &str = "productId";
pub const APPROVAL_URL_KEY: &str = "approvalUrlHash";
pub const DISAPPROVAL_URL_KEY: &str = "disapprovalUrlHash";

/// Every page and email body the service produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    AddProduct,
    SubmitProduct,
    NewProductEmail,
    InternalError,
}

impl Template {
    pub const fn name(self) -> &'static str {
        match self {
            Template::AddProduct => "product/add",
            Template::SubmitProduct => "product/submit",
            Template::NewProductEmail => "emails/new-product-details",
            Template::InternalError => "errors/internal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template `{template}` requires `{key}` in its context")]
    MissingContext {
        template: &'static str,
        key: &'static str,
    },
}

/// Renders a named template against a context.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: Template, context: &ViewContext) -> Result<String, ViewError>;
}

/// Built-in HTML templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlViews;

impl ViewRenderer for HtmlViews {
    fn render(&self, template: Template, context: &ViewContext) -> Result<String, ViewError> {
        let lookup = |key: &'static str| {
            context
                .get(key)
                .map(|value| escape_html(value))
                .ok_or(ViewError::MissingContext {
                    template: template.name(),
                    key,
                })
        };

        match template {
            Template::AddProduct => {
                let site_url = lookup(SITE_URL_KEY)?;
                let body = format!(
                    "<h1>{page}</h1>\n\
                     <form method=\"post\" action=\"{site_url}submit\">\n\
                     <label>Name <input type=\"text\" name=\"name\" required></label>\n\
                     <label>Barcode <input type=\"text\" name=\"barcode\"></label>\n\
                     <label>Ingredients <textarea name=\"ingredients\" required></textarea></label>\n\
                     <div style=\"display:none\"><input type=\"text\" name=\"firstname\" tabindex=\"-1\" autocomplete=\"off\"></div>\n\
                     <button type=\"submit\" name=\"addproduct\" value=\"1\">Submit</button>\n\
                     </form>\n",
                    page = lookup(PAGE_NAME_KEY)?,
                );
                Ok(layout(&lookup(SITE_NAME_KEY)?, &lookup(PAGE_NAME_KEY)?, &body))
            }
            Template::SubmitProduct => {
                let body = format!(
                    "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"{}\">Add another product</a></p>\n",
                    lookup(PAGE_NAME_KEY)?,
                    lookup(MESSAGE_KEY)?,
                    lookup(SITE_URL_KEY)?,
                );
                Ok(layout(&lookup(SITE_NAME_KEY)?, &lookup(PAGE_NAME_KEY)?, &body))
            }
            Template::NewProductEmail => {
                let mut html = String::from("<h1>New product awaiting moderation</h1>\n<ul>\n");
                for (field, value) in context.iter().filter(|(key, _)| {
                    !matches!(key.as_str(), APPROVAL_URL_KEY | DISAPPROVAL_URL_KEY)
                }) {
                    html.push_str(&format!(
                        "<li><strong>{}</strong>: {}</li>\n",
                        escape_html(field),
                        escape_html(value)
                    ));
                }
                html.push_str("</ul>\n");
                html.push_str(&format!(
                    "<p><a href=\"{}\">Approve</a> | <a href=\"{}\">Disapprove</a></p>\n",
                    lookup(APPROVAL_URL_KEY)?,
                    lookup(DISAPPROVAL_URL_KEY)?,
                ));
                Ok(html)
            }
            Template::InternalError => {
                let site_name = lookup(SITE_NAME_KEY)?;
                Ok(layout(
                    &site_name,
                    "Internal Error",
                    "<h1>Internal Error</h1>\n<p>Something went wrong on our side. Please try again later.</p>\n",
                ))
            }
        }
    }
}

fn layout(site_name: &str, page_name: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{page_name} - {site_name}</title></head>\n<body>\n{body}</body>\n</html>\n"
    )
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
