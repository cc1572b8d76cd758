/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /animals, /animals/search/{field}/{value}, /profiles/{profile_id}/animals
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    animals::{
        create_animal, delete_animal, get_animal, list_active_animals, list_profile_animals,
        patch_animal, replace_animal,
    },
    health::health,
    search::search_animals,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/animals", get(list_active_animals).post(create_animal))
        .route(
            "/animals/{animal_id}",
            get(get_animal)
                .put(replace_animal)
                .patch(patch_animal)
                .delete(delete_animal),
        )
        .route("/animals/search/{field}/{value}", get(search_animals))
        .route("/profiles/{profile_id}/animals", get(list_profile_animals))
}
