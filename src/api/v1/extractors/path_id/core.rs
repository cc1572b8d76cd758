/*
 * Responsibility
 * - Path の String を UUID として受け、リソースごとの意味付き ID 型にする
 * - 失敗時は AppError (400 INVALID_ID, JSON body) へ変換
 *   (axum 標準の Path<Uuid> は text/plain の 400 を返すため)
 */
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Clone, Copy)]
pub struct PathId<T> {
    pub id: Uuid,
    _marker: PhantomData<T>,
}

impl<T> PathId<T> {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

fn parse_or_bad_request(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request("INVALID_ID", format!("invalid id: {raw}")))
}

impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request("INVALID_ID", e.body_text()))?;
        let id = parse_or_bad_request(&raw)?;
        Ok(Self::new(id))
    }
}

impl<T> std::fmt::Debug for PathId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathId").field("id", &self.id).finish()
    }
}
