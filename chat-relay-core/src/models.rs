//! Model catalog - the fixed list of models clients may select

use serde::{Deserialize, Serialize};

use crate::config::schema::GeminiConfig;

/// Creation timestamp reported for every catalog entry
pub const MODEL_CREATED: i64 = 1677610602;

/// Owner reported for every catalog entry
pub const MODEL_OWNER: &str = "google";

/// One selectable model, shaped like an OpenAI `/models` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

impl ModelDescriptor {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object: "model".to_string(),
            created: MODEL_CREATED,
            owned_by: MODEL_OWNER.to_string(),
        }
    }
}

/// Read-only catalog of supported models, in configured order
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
    default_model: String,
}

impl ModelCatalog {
    /// Build a catalog from explicit ids.
    ///
    /// An empty `default_model` falls back to the first id.
    pub fn new<I, S>(ids: I, default_model: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models: Vec<ModelDescriptor> = ids.into_iter().map(ModelDescriptor::new).collect();
        let mut default_model = default_model.into();
        if default_model.is_empty() {
            if let Some(first) = models.first() {
                default_model = first.id.clone();
            }
        }
        Self {
            models,
            default_model,
        }
    }

    /// Build the catalog from the Gemini provider section
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(config.models.iter().cloned(), config.default_model.clone())
    }

    /// All descriptors, in configured order
    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// All model ids, in configured order
    pub fn ids(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.iter().any(|m| m.id == id)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Pick the model to use for a request.
    ///
    /// Absent or unsupported ids resolve to the default model instead of
    /// being rejected.
    pub fn resolve<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(id) if self.contains(id) => id,
            _ => &self.default_model,
        }
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::from_config(&GeminiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = ModelCatalog::default();
        assert_eq!(
            catalog.ids(),
            vec!["gemini-1.5-flash", "gemini-pro", "gemini-pro-vision"]
        );
        assert_eq!(catalog.default_model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_descriptor_metadata_is_fixed() {
        let catalog = ModelCatalog::default();
        for descriptor in catalog.descriptors() {
            assert_eq!(descriptor.object, "model");
            assert_eq!(descriptor.created, 1677610602);
            assert_eq!(descriptor.owned_by, "google");
        }
    }

    #[test]
    fn test_resolve_substitutes_unknown_models() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.resolve(Some("gemini-pro")), "gemini-pro");
        assert_eq!(catalog.resolve(Some("gpt-4")), "gemini-1.5-flash");
        assert_eq!(catalog.resolve(Some("")), "gemini-1.5-flash");
        assert_eq!(catalog.resolve(None), "gemini-1.5-flash");
    }

    #[test]
    fn test_empty_default_falls_back_to_first() {
        let catalog = ModelCatalog::new(["b-model", "a-model"], "");
        assert_eq!(catalog.default_model(), "b-model");
    }
}
