/*
 * Responsibility
 * - 一覧ビュー: route の (field, value) を受けて該当する検索に振り分ける
 * - 結果は観測日時の新しい順に並べて返す
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    domain::{AnimalPosting, by_observed_at_desc},
    error::AppError,
    repos::animal_repo::{self, SearchField},
    state::AppState,
};

pub async fn search_animals(
    State(state): State<AppState>,
    Path((field, value)): Path<(String, String)>,
) -> Result<Json<Vec<AnimalPosting>>, AppError> {
    let field: SearchField = field.parse()?;

    let mut postings = animal_repo::find_by_field(&state.db, field, &value).await?;
    postings.sort_by(by_observed_at_desc);

    tracing::debug!(?field, hits = postings.len(), "animal search");
    Ok(Json(postings))
}
