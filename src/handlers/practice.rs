// src/handlers/practice.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::content::{ContentKind, PublicContentItem},
    state::AppState,
};

/// Practice sets are browse-only; nothing here is graded or recorded.
pub async fn list_practice(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = state.content.list_content(ContentKind::Practice).await?;
    let items: Vec<PublicContentItem> = items.iter().map(PublicContentItem::from).collect();
    Ok(Json(items))
}

pub async fn get_practice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .content
        .find_content(ContentKind::Practice, id)
        .await?
        .ok_or(AppError::NotFound("Practice question not found".to_string()))?;

    Ok(Json(PublicContentItem::from(&item)))
}
