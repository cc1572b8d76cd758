/*
 * Responsibility
 * - 投稿 (AnimalPosting) の値オブジェクトと検証ルール
 * - DB / HTTP には依存しない (sqlx::FromRow の行型は repos 側)
 */
pub mod animal;
pub mod error;
pub mod normalize;

pub use animal::{
    AnimalChanges, AnimalInput, AnimalPosting, Gender, Species, Status, by_observed_at_desc,
};
pub use error::ValidationError;
