use clap::Args;
use product_moderation::config::{ModerationConfig, SiteConfig};
use product_moderation::error::AppError;
use product_moderation::workflows::products::{
    EmailNotifier, HtmlViews, InMemoryProductStore, MailError, MailMessage, MailTransport,
    ProductModerationService, SecurityHash, SubmissionForm, SubmissionOutcome,
};
use std::sync::Arc;

const DEMO_SECURITY_HASH: &str = "demo-security-hash";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Product name to submit
    #[arg(long, default_value = "Organic Peanut Butter")]
    pub(crate) name: String,
    /// Product barcode (leave empty to store the placeholder)
    #[arg(long, default_value = "")]
    pub(crate) barcode: String,
    /// Site URL used when building moderation links
    #[arg(long, default_value = "http://127.0.0.1:3000/")]
    pub(crate) site_url: String,
    /// Stop after the submission step and leave the product pending
    #[arg(long)]
    pub(crate) skip_approval: bool,
}

/// Prints outbound mail to stdout.
struct ConsoleMailTransport;

impl MailTransport for ConsoleMailTransport {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        println!("- Mail to {} | {}", message.to, message.subject);
        for line in message.body.lines().filter(|line| line.starts_with("<li>")) {
            println!("    {line}");
        }
        Ok(())
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        name,
        barcode,
        site_url,
        skip_approval,
    } = args;

    let site = SiteConfig {
        url: if site_url.ends_with('/') {
            site_url
        } else {
            format!("{site_url}/")
        },
        name: "Product Catalog".to_string(),
    };
    let moderation = ModerationConfig {
        admin_email: "moderator@localhost".to_string(),
        security_hash: SecurityHash::new(DEMO_SECURITY_HASH),
    };

    let store = Arc::new(InMemoryProductStore::default());
    let notifier = Arc::new(EmailNotifier::new(
        moderation.admin_email.clone(),
        Arc::new(HtmlViews),
        Box::new(ConsoleMailTransport),
    ));
    let service = ProductModerationService::new(store, notifier, &site, &moderation);

    println!("Product moderation demo");
    let form: SubmissionForm = [
        ("addproduct", "1"),
        ("firstname", ""),
        ("name", name.as_str()),
        ("barcode", barcode.as_str()),
        ("ingredients", "peanuts, salt"),
    ]
    .into_iter()
    .collect();

    let product_id = match service.submit(form)? {
        SubmissionOutcome::Submitted { product_id, links } => {
            println!("- Stored pending product {product_id}");
            println!("  approve:    {}", links.approve_url);
            println!("  disapprove: {}", links.disapprove_url);
            product_id
        }
        outcome @ SubmissionOutcome::Duplicate { .. } => {
            println!("- {}", outcome.message());
            return Ok(());
        }
    };

    if skip_approval {
        return Ok(());
    }

    let outcome = service.approve(DEMO_SECURITY_HASH, product_id)?;
    println!("- Approve: {}", outcome.message());
    let record = service.get(product_id)?;
    println!(
        "- Product {} is now {} (published {})",
        record.id,
        record.status.label(),
        record
            .published_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    );

    let again = service.approve(DEMO_SECURITY_HASH, product_id)?;
    println!("- Approve again: {}", again.message());

    Ok(())
}
