/*
 * Responsibility
 * - animal テーブル向け SQLx 操作 (1 操作 = 1 ステートメント)
 * - PgPool は呼び出し側が持つ。ここでは借りるだけ
 * - 行 → AnimalPosting の変換は domain の正規化を通す (失敗した行は操作全体を失敗させる)
 */
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::{AnimalPosting, Status, animal, animal::TextFields, normalize},
    repos::error::{RepoError, RepoResult},
};

#[derive(Debug, Clone, FromRow)]
pub struct AnimalRow {
    #[sqlx(rename = "animalId")]
    pub id: Uuid,
    #[sqlx(rename = "animalProfileId")]
    pub profile_id: Uuid,
    #[sqlx(rename = "animalColor")]
    pub color: String,
    #[sqlx(rename = "animalDate")]
    pub observed_at: DateTime<Utc>,
    #[sqlx(rename = "animalDescription")]
    pub description: String,
    #[sqlx(rename = "animalGender")]
    pub gender: String,
    #[sqlx(rename = "animalImageUrl")]
    pub image_url: String,
    #[sqlx(rename = "animalLocation")]
    pub location: String,
    #[sqlx(rename = "animalName")]
    pub name: String,
    #[sqlx(rename = "animalSpecies")]
    pub species: String,
    #[sqlx(rename = "animalStatus")]
    pub status: String,
}

impl TryFrom<AnimalRow> for AnimalPosting {
    type Error = RepoError;

    fn try_from(row: AnimalRow) -> Result<Self, Self::Error> {
        AnimalPosting::restore(
            row.id,
            row.profile_id,
            row.observed_at,
            TextFields {
                color: &row.color,
                description: &row.description,
                gender: &row.gender,
                image_url: &row.image_url,
                location: &row.location,
                name: Some(&row.name),
                species: &row.species,
                status: &row.status,
            },
        )
        .map_err(|e| {
            tracing::warn!(animal_id = %row.id, error = %e, "stored animal row failed validation");
            RepoError::CorruptRow(e)
        })
    }
}

fn into_postings(rows: Vec<AnimalRow>) -> RepoResult<Vec<AnimalPosting>> {
    let mut postings = Vec::with_capacity(rows.len());
    for row in rows {
        postings.push(AnimalPosting::try_from(row)?);
    }
    Ok(postings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Substring,
}

/// Columns a posting can be searched by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Color,
    Description,
    Gender,
    Species,
    Status,
}

impl SearchField {
    pub fn column(&self) -> &'static str {
        match self {
            SearchField::Color => animal::COLOR.field,
            SearchField::Description => animal::DESCRIPTION.field,
            SearchField::Gender => animal::GENDER,
            SearchField::Species => animal::SPECIES,
            SearchField::Status => animal::STATUS,
        }
    }

    /// Gender is matched exactly: as a substring "male" would also hit "Female"
    /// under any case-insensitive collation.
    pub fn match_mode(&self) -> MatchMode {
        match self {
            SearchField::Gender => MatchMode::Exact,
            _ => MatchMode::Substring,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search field: {0}")]
pub struct UnknownSearchField(pub String);

impl FromStr for SearchField {
    type Err = UnknownSearchField;

    /// Accepts the column name (`animalStatus`) or its short form (`status`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animalColor" | "color" => Ok(SearchField::Color),
            "animalDescription" | "description" => Ok(SearchField::Description),
            "animalGender" | "gender" => Ok(SearchField::Gender),
            "animalSpecies" | "species" => Ok(SearchField::Species),
            "animalStatus" | "status" => Ok(SearchField::Status),
            _ => Err(UnknownSearchField(s.to_string())),
        }
    }
}

/// Escapes LIKE metacharacters so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn insert(db: &PgPool, posting: &AnimalPosting) -> RepoResult<()> {
    sqlx::query(
        r#"
        INSERT INTO animal (
            "animalId", "animalProfileId", "animalColor", "animalDate", "animalDescription",
            "animalGender", "animalImageUrl", "animalLocation", "animalName", "animalSpecies",
            "animalStatus"
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(posting.id())
    .bind(posting.profile_id())
    .bind(posting.color())
    .bind(posting.observed_at())
    .bind(posting.description())
    .bind(posting.gender().as_str())
    .bind(posting.image_url())
    .bind(posting.location())
    .bind(posting.name())
    .bind(posting.species().as_str())
    .bind(posting.status().as_str())
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(())
}

/// Overwrites every column of the row with the posting's id.
/// Returns `false` when no row has that id.
pub async fn update(db: &PgPool, posting: &AnimalPosting) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE animal
        SET
            "animalProfileId" = $2,
            "animalColor" = $3,
            "animalDate" = $4,
            "animalDescription" = $5,
            "animalGender" = $6,
            "animalImageUrl" = $7,
            "animalLocation" = $8,
            "animalName" = $9,
            "animalSpecies" = $10,
            "animalStatus" = $11
        WHERE "animalId" = $1
        "#,
    )
    .bind(posting.id())
    .bind(posting.profile_id())
    .bind(posting.color())
    .bind(posting.observed_at())
    .bind(posting.description())
    .bind(posting.gender().as_str())
    .bind(posting.image_url())
    .bind(posting.location())
    .bind(posting.name())
    .bind(posting.species().as_str())
    .bind(posting.status().as_str())
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

/// Writes `revised` only if the row still holds exactly `current`.
/// Returns `false` when the row was changed or removed since `current` was read.
pub async fn update_if_unchanged(
    db: &PgPool,
    current: &AnimalPosting,
    revised: &AnimalPosting,
) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE animal
        SET
            "animalProfileId" = $2,
            "animalColor" = $3,
            "animalDate" = $4,
            "animalDescription" = $5,
            "animalGender" = $6,
            "animalImageUrl" = $7,
            "animalLocation" = $8,
            "animalName" = $9,
            "animalSpecies" = $10,
            "animalStatus" = $11
        WHERE "animalId" = $1
          AND "animalProfileId" = $12
          AND "animalColor" = $13
          AND "animalDate" = $14
          AND "animalDescription" = $15
          AND "animalGender" = $16
          AND "animalImageUrl" = $17
          AND "animalLocation" = $18
          AND "animalName" = $19
          AND "animalSpecies" = $20
          AND "animalStatus" = $21
        "#,
    )
    .bind(current.id())
    .bind(revised.profile_id())
    .bind(revised.color())
    .bind(revised.observed_at())
    .bind(revised.description())
    .bind(revised.gender().as_str())
    .bind(revised.image_url())
    .bind(revised.location())
    .bind(revised.name())
    .bind(revised.species().as_str())
    .bind(revised.status().as_str())
    .bind(current.profile_id())
    .bind(current.color())
    .bind(current.observed_at())
    .bind(current.description())
    .bind(current.gender().as_str())
    .bind(current.image_url())
    .bind(current.location())
    .bind(current.name())
    .bind(current.species().as_str())
    .bind(current.status().as_str())
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, animal_id: Uuid) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM animal
        WHERE "animalId" = $1
        "#,
    )
    .bind(animal_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn find_by_id(db: &PgPool, animal_id: Uuid) -> RepoResult<Option<AnimalPosting>> {
    let row = sqlx::query_as::<_, AnimalRow>(
        r#"
        SELECT
            "animalId", "animalProfileId", "animalColor", "animalDate", "animalDescription",
            "animalGender", "animalImageUrl", "animalLocation", "animalName", "animalSpecies",
            "animalStatus"
        FROM animal
        WHERE "animalId" = $1
        "#,
    )
    .bind(animal_id)
    .fetch_optional(db)
    .await?;

    row.map(AnimalPosting::try_from).transpose()
}

pub async fn find_by_profile_id(db: &PgPool, profile_id: Uuid) -> RepoResult<Vec<AnimalPosting>> {
    let rows = sqlx::query_as::<_, AnimalRow>(
        r#"
        SELECT
            "animalId", "animalProfileId", "animalColor", "animalDate", "animalDescription",
            "animalGender", "animalImageUrl", "animalLocation", "animalName", "animalSpecies",
            "animalStatus"
        FROM animal
        WHERE "animalProfileId" = $1
        "#,
    )
    .bind(profile_id)
    .fetch_all(db)
    .await?;

    into_postings(rows)
}

/// Searches one column. The term is normalized like a text field first; an
/// empty result of that is rejected before any query runs.
pub async fn find_by_field(
    db: &PgPool,
    field: SearchField,
    term: &str,
) -> RepoResult<Vec<AnimalPosting>> {
    let term = normalize::search_term(field.column(), term).map_err(RepoError::InvalidTerm)?;

    let (operator, pattern) = match field.match_mode() {
        MatchMode::Exact => ("=", term),
        MatchMode::Substring => ("LIKE", format!("%{}%", escape_like(&term))),
    };
    let escape = match field.match_mode() {
        MatchMode::Exact => "",
        MatchMode::Substring => r" ESCAPE '\'",
    };

    // column and operator come from closed enums, never from input
    let sql = format!(
        r#"
        SELECT
            "animalId", "animalProfileId", "animalColor", "animalDate", "animalDescription",
            "animalGender", "animalImageUrl", "animalLocation", "animalName", "animalSpecies",
            "animalStatus"
        FROM animal
        WHERE "{column}" {operator} $1{escape}
        "#,
        column = field.column(),
    );

    let rows = sqlx::query_as::<_, AnimalRow>(&sql)
        .bind(pattern)
        .fetch_all(db)
        .await?;

    into_postings(rows)
}

pub async fn find_by_color(db: &PgPool, color: &str) -> RepoResult<Vec<AnimalPosting>> {
    find_by_field(db, SearchField::Color, color).await
}

pub async fn find_by_description(db: &PgPool, description: &str) -> RepoResult<Vec<AnimalPosting>> {
    find_by_field(db, SearchField::Description, description).await
}

pub async fn find_by_gender(db: &PgPool, gender: &str) -> RepoResult<Vec<AnimalPosting>> {
    find_by_field(db, SearchField::Gender, gender).await
}

pub async fn find_by_species(db: &PgPool, species: &str) -> RepoResult<Vec<AnimalPosting>> {
    find_by_field(db, SearchField::Species, species).await
}

pub async fn find_by_status(db: &PgPool, status: &str) -> RepoResult<Vec<AnimalPosting>> {
    find_by_field(db, SearchField::Status, status).await
}

/// Every posting that is not `Reunited`. Stored statuses are always canonical,
/// so the comparison is a plain case-sensitive one.
pub async fn find_all_active(db: &PgPool) -> RepoResult<Vec<AnimalPosting>> {
    let rows = sqlx::query_as::<_, AnimalRow>(
        r#"
        SELECT
            "animalId", "animalProfileId", "animalColor", "animalDate", "animalDescription",
            "animalGender", "animalImageUrl", "animalLocation", "animalName", "animalSpecies",
            "animalStatus"
        FROM animal
        WHERE "animalStatus" <> $1
        "#,
    )
    .bind(Status::Reunited.as_str())
    .fetch_all(db)
    .await?;

    into_postings(rows)
}
