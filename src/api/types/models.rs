//! OpenAI-compatible model types

use serde::{Deserialize, Serialize};

use crate::domain::CanonicalModel;

/// Model information (OpenAI format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

impl Model {
    pub fn from_canonical(model: CanonicalModel, owned_by: &str) -> Self {
        Self {
            id: model.as_str().to_string(),
            object: "model".to_string(),
            owned_by: owned_by.to_string(),
        }
    }
}

/// List models response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<Model>,
}

impl ModelsResponse {
    pub fn new(models: Vec<Model>) -> Self {
        Self {
            object: "list".to_string(),
            data: models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_response() {
        let response = ModelsResponse::new(
            CanonicalModel::ALL
                .iter()
                .map(|m| Model::from_canonical(*m, "azure"))
                .collect(),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["object"], "list");
        assert_eq!(json["data"][0]["id"], "base");
        assert_eq!(json["data"][1]["id"], "large");
        assert_eq!(json["data"][1]["owned_by"], "azure");
    }
}
