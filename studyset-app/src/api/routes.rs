use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use studyset_core::{editor, filter_sets_by_text, overview, CoreError};

use crate::api::dto::{CreateSetIn, CreatedOut, ImportIn, SaveSetIn, SetDetailOut, SetOut};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn studyset_core::Repository>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    user: Option<Uuid>,
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    user: Uuid,
}

fn status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn list_sets(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<SetOut>>, StatusCode> {
    let sets = st
        .repo
        .list_study_sets(q.user)
        .await
        .map_err(|e| status(&e))?;
    let sets = match q.q {
        Some(ref needle) => filter_sets_by_text(&sets, needle),
        None => sets,
    };
    let terms = st.repo.list_terms(None).await.map_err(|e| status(&e))?;

    Ok(Json(
        overview::summarize_sets(&sets, &terms)
            .into_iter()
            .map(|o| SetOut {
                id: o.set.id,
                title: o.set.title,
                description: o.set.description,
                term_count: o.term_count,
                created_at: o.set.created_at,
                saved_at: o.set.saved_at,
            })
            .collect(),
    ))
}

pub async fn get_set(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SetDetailOut>, StatusCode> {
    let set = st.repo.get_study_set(id).await.map_err(|e| status(&e))?;
    let terms = st
        .repo
        .list_terms(Some(id))
        .await
        .map_err(|e| status(&e))?;
    Ok(Json(SetDetailOut::from_parts(set, terms)))
}

pub async fn create_set(
    State(st): State<Arc<AppState>>,
    Json(body): Json<CreateSetIn>,
) -> Result<(StatusCode, Json<CreatedOut>), StatusCode> {
    let drafts: Vec<_> = body.cards.into_iter().map(|c| c.into_draft()).collect();
    let set = editor::create_study_set(
        &*st.repo,
        body.user_id,
        &body.title,
        &body.description,
        &drafts,
    )
    .await
    .map_err(|e| status(&e))?;
    Ok((StatusCode::CREATED, Json(CreatedOut { id: set.id })))
}

pub async fn save_set(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<SaveSetIn>,
) -> Result<StatusCode, StatusCode> {
    let drafts: Vec<_> = body.cards.into_iter().map(|c| c.into_draft()).collect();
    editor::save_existing(
        &*st.repo,
        body.user_id,
        id,
        &body.title,
        &body.description,
        &drafts,
    )
    .await
    .map_err(|e| status(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn import_set(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ImportIn>,
) -> Result<StatusCode, StatusCode> {
    let set = st.repo.get_study_set(id).await.map_err(|e| status(&e))?;
    editor::ensure_owner(&set, body.user_id).map_err(|e| status(&e))?;

    let drafts = editor::load_drafts(&*st.repo, id)
        .await
        .map_err(|e| status(&e))?;
    let merged = editor::import_cards(drafts, &body.text).map_err(|e| status(&e))?;
    editor::save_existing(
        &*st.repo,
        body.user_id,
        id,
        &set.title,
        set.description.as_deref().unwrap_or(""),
        &merged,
    )
    .await
    .map_err(|e| status(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_set(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(q): Query<OwnerQuery>,
) -> Result<StatusCode, StatusCode> {
    let set = st.repo.get_study_set(id).await.map_err(|e| status(&e))?;
    editor::ensure_owner(&set, q.user).map_err(|e| status(&e))?;
    st.repo.delete_study_set(id).await.map_err(|e| status(&e))?;
    Ok(StatusCode::NO_CONTENT)
}
