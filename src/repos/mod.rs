/*
 * Responsibility
 * - 永続化アクセス (SQLx) の公開インターフェース
 */
pub mod animal_repo;
pub mod error;
