use metrics_exporter_prometheus::PrometheusHandle;
use product_moderation::config::{AppConfig, MailConfig};
use product_moderation::workflows::products::{
    EmailNotifier, HtmlViews, InMemoryProductStore, LogMailTransport, MailTransport,
    ModerationState, ProductModerationService, SpoolMailTransport, ViewRenderer,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ProductService = ProductModerationService<InMemoryProductStore, EmailNotifier>;

pub(crate) fn mail_transport(config: &MailConfig) -> Box<dyn MailTransport> {
    match &config.spool_dir {
        Some(directory) => Box::new(SpoolMailTransport::new(directory.clone())),
        None => Box::new(LogMailTransport),
    }
}

/// Wire the store, notifier, and views for the HTTP routes.
pub(crate) fn moderation_state(
    config: &AppConfig,
    store: Arc<InMemoryProductStore>,
) -> ModerationState<InMemoryProductStore, EmailNotifier> {
    let views: Arc<dyn ViewRenderer> = Arc::new(HtmlViews);
    let notifier = Arc::new(EmailNotifier::new(
        config.moderation.admin_email.clone(),
        Arc::clone(&views),
        mail_transport(&config.mail),
    ));
    let service: ProductService =
        ProductModerationService::new(store, notifier, &config.site, &config.moderation);

    ModerationState {
        service: Arc::new(service),
        views,
        site: config.site.clone(),
    }
}
