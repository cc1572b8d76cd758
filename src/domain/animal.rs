/*
 * Responsibility
 * - AnimalPosting: 検証済みで不変な投稿 1 件
 * - AnimalInput (新規) / AnimalChanges (部分更新) の生入力を受けて検証・正規化する
 * - フロント向けの JSON 形 (animalXxx キー, animalDate は epoch ミリ秒)
 */
use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::{
    error::ValidationError,
    normalize::{self, TextRule},
};

pub const ID: &str = "animalId";
pub const PROFILE_ID: &str = "animalProfileId";
pub const DATE: &str = "animalDate";
pub const GENDER: &str = "animalGender";
pub const SPECIES: &str = "animalSpecies";
pub const STATUS: &str = "animalStatus";

pub const COLOR: TextRule = TextRule::text("animalColor", 25);
pub const DESCRIPTION: TextRule = TextRule::text("animalDescription", 250);
pub const IMAGE_URL: TextRule = TextRule::url("animalImageUrl", 500);
pub const LOCATION: TextRule = TextRule::text("animalLocation", 200);
pub const NAME: TextRule = TextRule::text("animalName", 100);

pub const DEFAULT_NAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
    Unknown,
}

impl Gender {
    pub const ALLOWED: &'static str = "Female, Male, Unknown";

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Unknown => "Unknown",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Female" => Ok(Gender::Female),
            "Male" => Ok(Gender::Male),
            "Unknown" => Ok(Gender::Unknown),
            _ => Err(ValidationError::invalid(GENDER, format!("must be one of {}", Self::ALLOWED))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    pub const ALLOWED: &'static str = "Dog, Cat";

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
        }
    }
}

impl FromStr for Species {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dog" => Ok(Species::Dog),
            "Cat" => Ok(Species::Cat),
            _ => Err(ValidationError::invalid(SPECIES, format!("must be one of {}", Self::ALLOWED))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Lost,
    Found,
    Reunited,
}

impl Status {
    pub const ALLOWED: &'static str = "Lost, Found, Reunited";

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Lost => "Lost",
            Status::Found => "Found",
            Status::Reunited => "Reunited",
        }
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lost" => Ok(Status::Lost),
            "Found" => Ok(Status::Found),
            "Reunited" => Ok(Status::Reunited),
            _ => Err(ValidationError::invalid(STATUS, format!("must be one of {}", Self::ALLOWED))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw values for a new posting, as submitted.
#[derive(Debug, Clone, Default)]
pub struct AnimalInput {
    pub id: Option<String>,
    pub profile_id: String,
    pub color: String,
    pub observed_at: Option<String>,
    pub description: String,
    pub gender: String,
    pub image_url: String,
    pub location: String,
    pub name: Option<String>,
    pub species: String,
    pub status: String,
}

/// Fields to replace on an existing posting. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct AnimalChanges {
    pub profile_id: Option<String>,
    pub color: Option<String>,
    pub observed_at: Option<String>,
    pub description: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub status: Option<String>,
}

impl AnimalChanges {
    pub fn is_empty(&self) -> bool {
        self.profile_id.is_none()
            && self.color.is_none()
            && self.observed_at.is_none()
            && self.description.is_none()
            && self.gender.is_none()
            && self.image_url.is_none()
            && self.location.is_none()
            && self.name.is_none()
            && self.species.is_none()
            && self.status.is_none()
    }
}

/// Text-typed columns of a posting, borrowed from wherever they came from
/// (a request body or a stored row).
#[derive(Debug, Clone, Copy)]
pub struct TextFields<'a> {
    pub color: &'a str,
    pub description: &'a str,
    pub gender: &'a str,
    pub image_url: &'a str,
    pub location: &'a str,
    pub name: Option<&'a str>,
    pub species: &'a str,
    pub status: &'a str,
}

/// One lost/found report. Every field already satisfies its constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimalPosting {
    #[serde(rename = "animalId")]
    id: Uuid,
    #[serde(rename = "animalProfileId")]
    profile_id: Uuid,
    #[serde(rename = "animalColor")]
    color: String,
    #[serde(rename = "animalDate", serialize_with = "epoch_millis")]
    observed_at: DateTime<Utc>,
    #[serde(rename = "animalDescription")]
    description: String,
    #[serde(rename = "animalGender")]
    gender: Gender,
    #[serde(rename = "animalImageUrl")]
    image_url: String,
    #[serde(rename = "animalLocation")]
    location: String,
    #[serde(rename = "animalName")]
    name: String,
    #[serde(rename = "animalSpecies")]
    species: Species,
    #[serde(rename = "animalStatus")]
    status: Status,
}

impl AnimalPosting {
    /// Validates a submission. A missing id gets a fresh v4 uuid.
    pub fn new(input: AnimalInput) -> Result<Self, ValidationError> {
        let id = match input.id.as_deref() {
            Some(raw) => normalize::identifier(ID, raw)?,
            None => Uuid::new_v4(),
        };
        let profile_id = normalize::identifier(PROFILE_ID, &input.profile_id)?;
        let observed_at = normalize::timestamp(DATE, input.observed_at.as_deref())?;

        Self::restore(
            id,
            profile_id,
            observed_at,
            TextFields {
                color: &input.color,
                description: &input.description,
                gender: &input.gender,
                image_url: &input.image_url,
                location: &input.location,
                name: input.name.as_deref(),
                species: &input.species,
                status: &input.status,
            },
        )
    }

    /// Builds a posting from already-typed identifiers and time, running the
    /// text columns through the same normalizers as [`AnimalPosting::new`].
    pub fn restore(
        id: Uuid,
        profile_id: Uuid,
        observed_at: DateTime<Utc>,
        text: TextFields<'_>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            profile_id,
            color: normalize::bounded_text(text.color, COLOR)?,
            observed_at: normalize::stored_precision(observed_at),
            description: normalize::bounded_text(text.description, DESCRIPTION)?,
            gender: normalize::one_of(GENDER, text.gender, Gender::ALLOWED)?,
            image_url: normalize::bounded_text(text.image_url, IMAGE_URL)?,
            location: normalize::bounded_text(text.location, LOCATION)?,
            name: normalize::title_cased(text.name.unwrap_or(DEFAULT_NAME), NAME)?,
            species: normalize::one_of(SPECIES, text.species, Species::ALLOWED)?,
            status: normalize::one_of(STATUS, text.status, Status::ALLOWED)?,
        })
    }

    /// Returns a new posting with `changes` applied; the id never changes.
    pub fn revise(&self, changes: AnimalChanges) -> Result<Self, ValidationError> {
        let profile_id = match changes.profile_id.as_deref() {
            Some(raw) => normalize::identifier(PROFILE_ID, raw)?,
            None => self.profile_id,
        };
        let observed_at = match changes.observed_at.as_deref() {
            Some(raw) => normalize::timestamp(DATE, Some(raw))?,
            None => self.observed_at,
        };

        Self::restore(
            self.id,
            profile_id,
            observed_at,
            TextFields {
                color: changes.color.as_deref().unwrap_or(&self.color),
                description: changes.description.as_deref().unwrap_or(&self.description),
                gender: changes.gender.as_deref().unwrap_or(self.gender.as_str()),
                image_url: changes.image_url.as_deref().unwrap_or(&self.image_url),
                location: changes.location.as_deref().unwrap_or(&self.location),
                name: Some(changes.name.as_deref().unwrap_or(&self.name)),
                species: changes.species.as_deref().unwrap_or(self.species.as_str()),
                status: changes.status.as_deref().unwrap_or(self.status.as_str()),
            },
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile_id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status != Status::Reunited
    }
}

/// Newest observation first.
pub fn by_observed_at_desc(a: &AnimalPosting, b: &AnimalPosting) -> Ordering {
    b.observed_at.cmp(&a.observed_at)
}

fn epoch_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    let millis = (ts.timestamp_micros() as f64 / 1000.0).round() as i64;
    serializer.serialize_i64(millis)
}
