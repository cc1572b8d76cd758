/**
 * Responsibility
 * - repo が上位に伝える意味の定義 (StorageError 系)
 * - sqlx::Error は原因として保持し、分類だけを付け替える
 */
use thiserror::Error;

use crate::domain::ValidationError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict(#[source] sqlx::Error),
    /// A stored row no longer passes record validation.
    #[error("stored row could not be converted")]
    CorruptRow(#[source] ValidationError),
    #[error("invalid search term")]
    InvalidTerm(#[source] ValidationError),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict(e);
        }
        RepoError::Db(e)
    }
}
