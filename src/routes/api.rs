use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::CurrentUser;
use crate::errors::{AppError, AppResult};
use crate::review::{
    split_tags, AttachError, FormLocked, LookupReply, PendingImage, ReviewRecord, ViewMode,
};
use crate::state::AppState;
use crate::storage::encode_data_url;

fn locked(err: FormLocked) -> AppError {
    match err {
        FormLocked::Submitting => AppError::Conflict("submission in progress".into()),
        FormLocked::Submitted => AppError::Conflict("review already submitted".into()),
    }
}

#[derive(Deserialize)]
pub struct LookupRequest {
    query: String,
}

pub async fn lookup_paper(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
    Json(req): Json<LookupRequest>,
) -> AppResult<Json<LookupReply>> {
    let form = state.forms.get(form_id, &user.id).await?;
    let reply = state.reviews.lookup(&form, &req.query).await.map_err(locked)?;
    Ok(Json(reply))
}

#[derive(Deserialize)]
pub struct FieldsRequest {
    contents: Option<String>,
    tags: Option<String>,
}

/// Tags as they will be stored, so the page can show the split result.
#[derive(Serialize)]
pub struct FieldsReply {
    tags: Vec<String>,
}

pub async fn update_fields(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
    Json(req): Json<FieldsRequest>,
) -> AppResult<Json<FieldsReply>> {
    let form = state.forms.get(form_id, &user.id).await?;
    let mut form = form.lock().await;
    if let Some(contents) = req.contents {
        form.set_contents(&contents).map_err(locked)?;
    }
    if let Some(tags) = req.tags {
        form.set_tags(&tags).map_err(locked)?;
    }
    Ok(Json(FieldsReply {
        tags: split_tags(&form.fields().tags),
    }))
}

#[derive(Deserialize)]
pub struct ModeRequest {
    mode: Option<ViewMode>,
    contents: Option<String>,
}

#[derive(Serialize)]
pub struct ModeReply {
    mode: ViewMode,
    preview_html: Option<String>,
}

pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
    Json(req): Json<ModeRequest>,
) -> AppResult<Json<ModeReply>> {
    let form = state.forms.get(form_id, &user.id).await?;
    let mut form = form.lock().await;
    if let Some(contents) = req.contents {
        form.set_contents(&contents).map_err(locked)?;
    }
    match req.mode {
        Some(mode) => form.set_mode(mode),
        None => {
            form.toggle_mode();
        }
    }

    let preview_html = match form.mode() {
        ViewMode::Preview => Some(form.preview_html()),
        ViewMode::Edit => None,
    };
    Ok(Json(ModeReply {
        mode: form.mode(),
        preview_html,
    }))
}

#[derive(Serialize)]
pub struct AttachReply {
    file_name: String,
    content_type: String,
    data_url: String,
}

pub async fn attach_image(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(form_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<AttachReply>> {
    let form = state.forms.get(form_id, &user.id).await?;

    let mut image: Option<PendingImage> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("photo is empty".into()));
        }
        if bytes.len() > state.config.max_image_bytes {
            return Err(AppError::BadRequest(format!(
                "photo exceeds {} bytes",
                state.config.max_image_bytes
            )));
        }

        image = Some(PendingImage {
            data_url: encode_data_url(&content_type, &bytes),
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let image = image.ok_or_else(|| AppError::BadRequest("missing photo field".into()))?;
    let reply = AttachReply {
        file_name: image.file_name.clone(),
        content_type: image.content_type.clone(),
        data_url: image.data_url.clone(),
    };

    form.lock().await.attach_image(image).map_err(|e| match e {
        AttachError::Unsupported => AppError::BadRequest("this form does not accept images".into()),
        AttachError::NotAnImage(ct) => AppError::BadRequest(format!("{} is not an image", ct)),
        AttachError::Locked(l) => locked(l),
    })?;

    tracing::debug!(%form_id, file = %reply.file_name, "image attached");
    Ok(Json(reply))
}

pub async fn review_json(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<String>,
) -> AppResult<Json<ReviewRecord>> {
    state
        .reviews
        .reviews()
        .get_review(&review_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("review {}", review_id)))
}
