use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;
use uuid::Uuid;

use super::CurrentUser;
use crate::errors::{AppError, AppResult};
use crate::review::{
    render_markdown, Capabilities, FormFields, ReviewForm, SubmitOutcome, SubmitRejection,
    ViewMode,
};
use crate::state::AppState;

pub const INVALID_DOI_ALERT: &str = "Invalid DOI";

pub async fn index(user: Option<CurrentUser>) -> AppResult<Html<String>> {
    let mut ctx = Context::new();
    ctx.insert("user_name", &user.map(|u| u.name));
    render_template("index.html", &ctx)
}

#[derive(Deserialize)]
pub struct NewFormRequest {
    image_upload: Option<String>,
}

pub async fn create_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(req): Form<NewFormRequest>,
) -> AppResult<Redirect> {
    let has_image_upload = match req.image_upload.as_deref() {
        Some(v) => matches!(v, "on" | "true" | "1"),
        None => state.config.image_upload_default,
    };
    let form_id = state
        .forms
        .create(&user.id, &user.name, Capabilities { has_image_upload })
        .await?;
    Ok(Redirect::to(&format!("/forms/{}", form_id)))
}

pub async fn show_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let form = state.forms.get(form_id, &user.id).await?;
    let ctx = form_context(form_id, &*form.lock().await, None);
    render_template("form.html", &ctx)
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    review_contents: String,
    #[serde(default)]
    tags: String,
}

pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
    Form(req): Form<SubmitRequest>,
) -> AppResult<Response> {
    let form = state.forms.get(form_id, &user.id).await?;
    let posted = FormFields {
        title: req.title,
        review_contents: req.review_contents,
        tags: req.tags,
        photo_url: None,
    };

    let (status, alert) = match state.reviews.submit(&form, posted).await {
        SubmitOutcome::Submitted { review_id } => {
            state.forms.remove(form_id).await;
            return Ok(Redirect::to(&format!("/reviews/{}", review_id)).into_response());
        }
        SubmitOutcome::Rejected(SubmitRejection::Invalid(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, None)
        }
        SubmitOutcome::Rejected(SubmitRejection::InvalidDoi) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(INVALID_DOI_ALERT.to_string()))
        }
        SubmitOutcome::Rejected(SubmitRejection::InProgress) => {
            return Err(AppError::Conflict("submission already in progress".into()));
        }
        SubmitOutcome::Rejected(SubmitRejection::AlreadySubmitted) => {
            return Err(AppError::Conflict("review already submitted".into()));
        }
        SubmitOutcome::Failed(reason) => (
            StatusCode::BAD_GATEWAY,
            Some(format!("Submission failed ({}). Please try again.", reason)),
        ),
    };

    let ctx = form_context(form_id, &*form.lock().await, alert);
    Ok((status, render_template("form.html", &ctx)?).into_response())
}

pub async fn cancel_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
) -> AppResult<Redirect> {
    state.forms.get(form_id, &user.id).await?;
    state.forms.remove(form_id).await;
    let open_forms = state.forms.len().await;
    tracing::debug!(%form_id, open_forms, "review form cancelled");
    Ok(Redirect::to("/"))
}

pub async fn view_review(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<String>,
) -> AppResult<Html<String>> {
    let record = state
        .reviews
        .reviews()
        .get_review(&review_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {}", review_id)))?;

    let mut ctx = Context::new();
    ctx.insert("contents_html", &render_markdown(&record.contents));
    ctx.insert("review", &record);
    render_template("review.html", &ctx)
}

/// Template context for the form page.
pub fn form_context(form_id: Uuid, form: &ReviewForm, alert: Option<String>) -> Context {
    let fields = form.fields();
    let errors = form.errors();

    let mut ctx = Context::new();
    ctx.insert("form_id", &form_id);
    ctx.insert("user_name", form.user_name());
    ctx.insert("has_image_upload", &form.capabilities().has_image_upload);
    ctx.insert("doi_query", form.doi_query());
    ctx.insert("title", &fields.title);
    ctx.insert("review_contents", &fields.review_contents);
    ctx.insert("tags", &fields.tags);
    ctx.insert("photo_url", &fields.photo_url);
    ctx.insert("pending_image", &form.pending_image().map(|i| &i.file_name));
    ctx.insert("preview", &(form.mode() == ViewMode::Preview));
    if form.mode() == ViewMode::Preview {
        ctx.insert("preview_html", &form.preview_html());
    }
    ctx.insert("title_error", &errors.message_for("title"));
    ctx.insert("contents_error", &errors.message_for("review_contents"));
    ctx.insert("photo_error", &errors.message_for("photo_url"));
    ctx.insert("submission", form.submission());
    ctx.insert("loading", &form.is_loading());
    ctx.insert("alert", &alert);
    ctx
}

fn render_template(name: &str, ctx: &Context) -> AppResult<Html<String>> {
    let tera = crate::templates::get_tera()?;
    Ok(Html(tera.render(name, ctx)?))
}
