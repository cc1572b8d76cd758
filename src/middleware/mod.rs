/*
 * Responsibility
 * - middleware の公開インターフェース
 * - app.rs からは apply(...) を順に呼ぶだけにする
 */
pub mod cors;
pub mod http;
pub mod security_headers;
