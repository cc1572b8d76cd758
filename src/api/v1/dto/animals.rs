/*
 * Responsibility
 * - Animals の request DTO (キーはフロントと同じ animalXxx)
 * - 形式チェックはしない。検証・正規化は domain::AnimalPosting に一本化する
 * - response は AnimalPosting の Serialize をそのまま使う
 */
use serde::Deserialize;

use crate::domain::{AnimalChanges, AnimalInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalRequest {
    pub animal_id: Option<String>,
    pub animal_profile_id: String,
    pub animal_color: String,
    pub animal_date: Option<String>,
    pub animal_description: String,
    pub animal_gender: String,
    pub animal_image_url: String,
    pub animal_location: String,
    pub animal_name: Option<String>,
    pub animal_species: String,
    pub animal_status: String,
}

impl From<CreateAnimalRequest> for AnimalInput {
    fn from(req: CreateAnimalRequest) -> Self {
        AnimalInput {
            id: req.animal_id,
            profile_id: req.animal_profile_id,
            color: req.animal_color,
            observed_at: req.animal_date,
            description: req.animal_description,
            gender: req.animal_gender,
            image_url: req.animal_image_url,
            location: req.animal_location,
            name: req.animal_name,
            species: req.animal_species,
            status: req.animal_status,
        }
    }
}

/// Wholesale replacement. Same shape as create, minus the id, which comes
/// from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAnimalRequest {
    pub animal_profile_id: String,
    pub animal_color: String,
    pub animal_date: Option<String>,
    pub animal_description: String,
    pub animal_gender: String,
    pub animal_image_url: String,
    pub animal_location: String,
    pub animal_name: Option<String>,
    pub animal_species: String,
    pub animal_status: String,
}

impl ReplaceAnimalRequest {
    pub fn into_input(self, animal_id: uuid::Uuid) -> AnimalInput {
        AnimalInput {
            id: Some(animal_id.to_string()),
            profile_id: self.animal_profile_id,
            color: self.animal_color,
            observed_at: self.animal_date,
            description: self.animal_description,
            gender: self.animal_gender,
            image_url: self.animal_image_url,
            location: self.animal_location,
            name: self.animal_name,
            species: self.animal_species,
            status: self.animal_status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchAnimalRequest {
    pub animal_profile_id: Option<String>,
    pub animal_color: Option<String>,
    pub animal_date: Option<String>,
    pub animal_description: Option<String>,
    pub animal_gender: Option<String>,
    pub animal_image_url: Option<String>,
    pub animal_location: Option<String>,
    pub animal_name: Option<String>,
    pub animal_species: Option<String>,
    pub animal_status: Option<String>,
}

impl From<PatchAnimalRequest> for AnimalChanges {
    fn from(req: PatchAnimalRequest) -> Self {
        AnimalChanges {
            profile_id: req.animal_profile_id,
            color: req.animal_color,
            observed_at: req.animal_date,
            description: req.animal_description,
            gender: req.animal_gender,
            image_url: req.animal_image_url,
            location: req.animal_location,
            name: req.animal_name,
            species: req.animal_species,
            status: req.animal_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_uses_front_end_keys() {
        let req: CreateAnimalRequest = serde_json::from_value(serde_json::json!({
            "animalProfileId": "9a7f6a4e-3b55-4c5e-9a0e-6f2c1b7c0d11",
            "animalColor": "Grey",
            "animalDescription": "Tabby with white paws",
            "animalGender": "Male",
            "animalImageUrl": "https://img.example.com/tabby.png",
            "animalLocation": "Nob Hill",
            "animalSpecies": "Cat",
            "animalStatus": "Found"
        }))
        .unwrap();

        let input = AnimalInput::from(req);
        assert_eq!(input.color, "Grey");
        assert!(input.id.is_none());
        assert!(input.name.is_none());
        assert!(input.observed_at.is_none());
    }

    #[test]
    fn patch_request_maps_only_present_fields() {
        let req: PatchAnimalRequest =
            serde_json::from_value(serde_json::json!({ "animalStatus": "Reunited" })).unwrap();
        let changes = AnimalChanges::from(req);
        assert_eq!(changes.status.as_deref(), Some("Reunited"));
        assert!(changes.color.is_none());
        assert!(!changes.is_empty());
    }
}
