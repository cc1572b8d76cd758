/*
 * Responsibility
 * - モジュール宣言 (bin と tests/ の両方から使う)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod state;
