use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{debug, error};

use super::domain::{ProductId, SubmissionForm};
use super::notify::ModerationNotifier;
use super::repository::ProductStore;
use super::service::{
    ModerationAction, ModerationOutcome, ProductModerationService, ServiceError,
    INVALID_HASH_MESSAGE,
};
use super::views::{
    Template, ViewContext, ViewRenderer, MESSAGE_KEY, PAGE_NAME_KEY, SITE_NAME_KEY, SITE_URL_KEY,
};
use crate::config::SiteConfig;

const ADD_PRODUCT_PAGE: &str = "Add a Product";

/// Shared state behind the moderation routes.
pub struct ModerationState<S, N> {
    pub service: Arc<ProductModerationService<S, N>>,
    pub views: Arc<dyn ViewRenderer>,
    pub site: SiteConfig,
}

impl<S, N> Clone for ModerationState<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            views: Arc::clone(&self.views),
            site: self.site.clone(),
        }
    }
}

/// Typed parameters of `/approve/:hash/:id` and `/disapprove/:hash/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationPath {
    pub hash: String,
    pub id: ProductId,
}

/// Router builder exposing the submission form, submission, and moderation links.
pub fn moderation_router<S, N>(state: ModerationState<S, N>) -> Router
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    Router::new()
        .route("/", get(add_product_handler::<S, N>))
        .route("/submit", post(submit_handler::<S, N>))
        .route("/approve/:hash/:id", get(approve_handler::<S, N>))
        .route("/disapprove/:hash/:id", get(disapprove_handler::<S, N>))
        .with_state(state)
}

pub(crate) async fn add_product_handler<S, N>(State(state): State<ModerationState<S, N>>) -> Response
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    let context = page_context(&state.site, ADD_PRODUCT_PAGE);
    render_page(&state, Template::AddProduct, &context)
}

pub(crate) async fn submit_handler<S, N>(
    State(state): State<ModerationState<S, N>>,
    form: Result<Form<SubmissionForm>, FormRejection>,
) -> Response
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    let Ok(Form(form)) = form else {
        return Redirect::to(&state.site.url).into_response();
    };

    // Mail transports may touch the filesystem or network.
    let service = Arc::clone(&state.service);
    let submitted = match tokio::task::spawn_blocking(move || service.submit(form)).await {
        Ok(submitted) => submitted,
        Err(err) => {
            error!(error = %err, "product submission task failed");
            return internal_error(&state);
        }
    };

    match submitted {
        Ok(outcome) => {
            let mut context = page_context(&state.site, ADD_PRODUCT_PAGE);
            context.insert(MESSAGE_KEY.to_string(), outcome.message().to_string());
            render_page(&state, Template::SubmitProduct, &context)
        }
        Err(ServiceError::Rejected(reason)) => {
            debug!(%reason, "submission turned away");
            Redirect::to(&state.site.url).into_response()
        }
        Err(err) => {
            error!(error = %err, detail = ?err, "product submission failed");
            internal_error(&state)
        }
    }
}

pub(crate) async fn approve_handler<S, N>(
    State(state): State<ModerationState<S, N>>,
    path: Result<Path<ModerationPath>, PathRejection>,
) -> Response
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    moderate(&state, ModerationAction::Approve, path)
}

pub(crate) async fn disapprove_handler<S, N>(
    State(state): State<ModerationState<S, N>>,
    path: Result<Path<ModerationPath>, PathRejection>,
) -> Response
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    moderate(&state, ModerationAction::Disapprove, path)
}

fn moderate<S, N>(
    state: &ModerationState<S, N>,
    action: ModerationAction,
    path: Result<Path<ModerationPath>, PathRejection>,
) -> Response
where
    S: ProductStore + 'static,
    N: ModerationNotifier + 'static,
{
    // Non-numeric ids do not match the route.
    let Ok(Path(ModerationPath { hash, id })) = path else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.service.moderate(action, &hash, id) {
        Ok(outcome @ ModerationOutcome::Applied(_)) => {
            (StatusCode::OK, outcome.message()).into_response()
        }
        Ok(outcome @ ModerationOutcome::NotPending) => {
            (StatusCode::NOT_FOUND, outcome.message()).into_response()
        }
        Err(ServiceError::InvalidSecurityHash) => {
            (StatusCode::FORBIDDEN, INVALID_HASH_MESSAGE).into_response()
        }
        Err(err) => {
            error!(product_id = %id, action = action.label(), error = %err, detail = ?err, "product moderation failed");
            internal_error(state)
        }
    }
}

fn page_context(site: &SiteConfig, page_name: &str) -> ViewContext {
    let mut context = ViewContext::new();
    context.insert(SITE_URL_KEY.to_string(), site.url.clone());
    context.insert(SITE_NAME_KEY.to_string(), site.name.clone());
    context.insert(PAGE_NAME_KEY.to_string(), page_name.to_string());
    context
}

fn render_page<S, N>(
    state: &ModerationState<S, N>,
    template: Template,
    context: &ViewContext,
) -> Response {
    match state.views.render(template, context) {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            error!(template = template.name(), error = %err, "failed to render page");
            internal_error(state)
        }
    }
}

fn internal_error<S, N>(state: &ModerationState<S, N>) -> Response {
    let context = page_context(&state.site, "Internal Error");
    match state.views.render(Template::InternalError, &context) {
        Ok(body) => (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
    }
}
