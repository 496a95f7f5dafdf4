//! The recipe entity shared by every layer.

use serde::{Deserialize, Serialize};

/// Recipe identifier as issued by the remote source (e.g. `"52772"`).
pub type RecipeId = String;

/// One `{name, measure}` line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measure: measure.into(),
        }
    }
}

/// A recipe as served by the remote source and stored by the cache tiers.
///
/// Search endpoints may return summary-only records. Those have empty
/// `instructions` and are reported by [`Recipe::is_partial`]; detail views
/// must refetch them before use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub image_url: String,
    /// Ingredients in source order.
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Create a recipe with only an id and a name set.
    pub fn new(id: impl Into<RecipeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_ingredient(mut self, name: impl Into<String>, measure: impl Into<String>) -> Self {
        self.ingredients.push(Ingredient::new(name, measure));
        self
    }

    /// True when the record carries no instructions and needs a full fetch.
    pub fn is_partial(&self) -> bool {
        self.instructions.trim().is_empty()
    }

    /// True when the record is complete enough for a detail view.
    pub fn is_complete(&self) -> bool {
        !self.is_partial()
    }

    /// True when the record has a usable id.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_instructions_is_partial() {
        let summary = Recipe::new("52772", "Teriyaki Chicken Casserole");
        assert!(summary.is_partial());
        assert!(!summary.is_complete());

        let blank = summary.clone().with_instructions("   \n");
        assert!(blank.is_partial());

        let full = summary.with_instructions("Preheat oven to 350° F.");
        assert!(full.is_complete());
    }

    #[test]
    fn test_has_id() {
        assert!(Recipe::new("52772", "x").has_id());
        assert!(!Recipe::new("", "x").has_id());
        assert!(!Recipe::new("  ", "x").has_id());
    }

    #[test]
    fn test_serializes_camel_case() {
        let recipe = Recipe::new("1", "Soup")
            .with_image_url("https://img/1.jpg")
            .with_ingredient("Salt", "1 tsp");
        let json = serde_json::to_value(&recipe).unwrap();

        assert_eq!(json["imageUrl"], "https://img/1.jpg");
        assert_eq!(json["ingredients"][0]["name"], "Salt");
        assert_eq!(json["ingredients"][0]["measure"], "1 tsp");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let recipe: Recipe = serde_json::from_str(r#"{"id":"7","name":"Stew"}"#).unwrap();
        assert_eq!(recipe.id, "7");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.is_partial());
    }
}
