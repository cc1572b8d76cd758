/*
 * Responsibility
 * - /animals 系 CRUD handler と /profiles/{id}/animals
 * - Json を DTO で受け → domain で検証・正規化 → repo 呼び出し
 * - update/delete で行が無ければ 404 (repo は bool で返す)
 * - PATCH は読んだ値が変わっていない時だけ書く (変わっていれば 409)
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::animals::{CreateAnimalRequest, PatchAnimalRequest, ReplaceAnimalRequest},
        extractors::path_id::{AnimalId, ProfileId},
    },
    domain::{AnimalChanges, AnimalInput, AnimalPosting},
    error::AppError,
    repos::animal_repo,
    state::AppState,
};

pub async fn list_active_animals(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnimalPosting>>, AppError> {
    let postings = animal_repo::find_all_active(&state.db).await?;
    Ok(Json(postings))
}

pub async fn create_animal(
    State(state): State<AppState>,
    Json(req): Json<CreateAnimalRequest>,
) -> Result<(StatusCode, Json<AnimalPosting>), AppError> {
    let posting = AnimalPosting::new(AnimalInput::from(req))?;

    animal_repo::insert(&state.db, &posting).await?;
    tracing::info!(animal_id = %posting.id(), status = %posting.status(), "animal posted");

    Ok((StatusCode::CREATED, Json(posting)))
}

pub async fn get_animal(
    State(state): State<AppState>,
    animal_id: AnimalId,
) -> Result<Json<AnimalPosting>, AppError> {
    let posting = animal_repo::find_by_id(&state.db, animal_id.id)
        .await?
        .ok_or(AppError::not_found("animal"))?;

    Ok(Json(posting))
}

pub async fn replace_animal(
    State(state): State<AppState>,
    animal_id: AnimalId,
    Json(req): Json<ReplaceAnimalRequest>,
) -> Result<Json<AnimalPosting>, AppError> {
    let posting = AnimalPosting::new(req.into_input(animal_id.id))?;

    if !animal_repo::update(&state.db, &posting).await? {
        return Err(AppError::not_found("animal"));
    }

    Ok(Json(posting))
}

pub async fn patch_animal(
    State(state): State<AppState>,
    animal_id: AnimalId,
    Json(req): Json<PatchAnimalRequest>,
) -> Result<Json<AnimalPosting>, AppError> {
    let changes = AnimalChanges::from(req);
    if changes.is_empty() {
        return Err(AppError::bad_request("INVALID_INPUT", "no fields to update"));
    }

    let current = animal_repo::find_by_id(&state.db, animal_id.id)
        .await?
        .ok_or(AppError::not_found("animal"))?;
    let posting = current.revise(changes)?;

    // the row changed or vanished between the read and the write
    if !animal_repo::update_if_unchanged(&state.db, &current, &posting).await? {
        tracing::info!(animal_id = %posting.id(), "concurrent change rejected");
        return Err(AppError::conflict(
            "CONFLICT",
            "animal was modified or removed concurrently; reload and retry",
        ));
    }
    if posting.status() != current.status() {
        tracing::info!(
            animal_id = %posting.id(),
            from = %current.status(),
            to = %posting.status(),
            "animal status changed"
        );
    }

    Ok(Json(posting))
}

pub async fn delete_animal(
    State(state): State<AppState>,
    animal_id: AnimalId,
) -> Result<StatusCode, AppError> {
    if animal_repo::delete(&state.db, animal_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("animal"))
    }
}

pub async fn list_profile_animals(
    State(state): State<AppState>,
    profile_id: ProfileId,
) -> Result<Json<Vec<AnimalPosting>>, AppError> {
    let postings = animal_repo::find_by_profile_id(&state.db, profile_id.id).await?;
    Ok(Json(postings))
}
