//! TheMealDB response types

use larder_core::{Ingredient, Recipe};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Number of numbered ingredient/measure field pairs in a meal record.
pub const INGREDIENT_SLOTS: usize = 20;

/// Upstream placeholder for an unused slot, compared case-insensitively.
const NULL_SENTINEL: &str = "null";

// ============================================================================
// ENVELOPE
// ============================================================================

/// Top-level response of every endpoint: `{"meals": [...]}`.
///
/// `meals` is JSON `null` when nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealEnvelope {
    #[serde(default, alias = "Meals", alias = "MEALS")]
    pub meals: Option<Vec<WireMeal>>,
}

impl MealEnvelope {
    /// Convert every meal in the envelope.
    pub fn into_recipes(self) -> Vec<Recipe> {
        self.meals
            .unwrap_or_default()
            .iter()
            .map(WireMeal::to_recipe)
            .collect()
    }

    /// Convert the first meal, if any.
    pub fn into_first(self) -> Option<Recipe> {
        self.meals
            .and_then(|meals| meals.into_iter().next())
            .map(|meal| meal.to_recipe())
    }
}

// ============================================================================
// MEAL RECORD
// ============================================================================

/// One flat meal record.
///
/// Kept as a raw JSON object so field names can be matched without regard
/// to case and so the numbered ingredient slots can be walked by index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct WireMeal(Map<String, Value>);

impl WireMeal {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Text value of a field, matched case-insensitively.
    ///
    /// Numbers are rendered as text; `null` and other JSON types are absent.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = self.0.get(name).or_else(|| {
            self.0
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })?;

        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn text(&self, name: &str) -> String {
        self.field(name).unwrap_or_default()
    }

    /// Ingredients from the numbered slots `strIngredient1..=20`.
    ///
    /// A slot counts only when its trimmed ingredient is non-blank and not
    /// the literal `null`. Measures are trimmed; a missing measure is empty.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        let mut ingredients = Vec::new();
        for slot in 1..=INGREDIENT_SLOTS {
            let name = match self.field(&format!("strIngredient{}", slot)) {
                Some(name) => name.trim().to_string(),
                None => continue,
            };
            if name.is_empty() || name.eq_ignore_ascii_case(NULL_SENTINEL) {
                continue;
            }
            let measure = self
                .field(&format!("strMeasure{}", slot))
                .map(|m| m.trim().to_string())
                .unwrap_or_default();
            ingredients.push(Ingredient { name, measure });
        }
        ingredients
    }

    pub fn to_recipe(&self) -> Recipe {
        Recipe {
            id: self.text("idMeal").trim().to_string(),
            name: self.text("strMeal"),
            category: self.text("strCategory"),
            area: self.text("strArea"),
            instructions: self.text("strInstructions"),
            image_url: self.text("strMealThumb"),
            ingredients: self.ingredients(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(json: &str) -> WireMeal {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lookup_envelope_converts_full_record() {
        let body = r#"{"meals":[{
            "idMeal":"52772",
            "strMeal":"Teriyaki Chicken Casserole",
            "strCategory":"Chicken",
            "strArea":"Japanese",
            "strInstructions":"Preheat oven to 350° F.",
            "strMealThumb":"https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
            "strIngredient1":"soy sauce","strMeasure1":"3/4 cup",
            "strIngredient2":"water","strMeasure2":"1/2 cup",
            "strIngredient3":"","strMeasure3":"",
            "strIngredient4":null,"strMeasure4":null
        }]}"#;
        let envelope: MealEnvelope = serde_json::from_str(body).unwrap();
        let recipe = envelope.into_first().unwrap();

        assert_eq!(recipe.id, "52772");
        assert_eq!(recipe.name, "Teriyaki Chicken Casserole");
        assert_eq!(recipe.category, "Chicken");
        assert_eq!(recipe.area, "Japanese");
        assert!(recipe.is_complete());
        assert_eq!(
            recipe.ingredients,
            vec![
                Ingredient::new("soy sauce", "3/4 cup"),
                Ingredient::new("water", "1/2 cup"),
            ]
        );
    }

    #[test]
    fn test_null_meals_is_empty() {
        let envelope: MealEnvelope = serde_json::from_str(r#"{"meals":null}"#).unwrap();
        assert!(envelope.clone().into_first().is_none());
        assert!(envelope.into_recipes().is_empty());
    }

    #[test]
    fn test_null_sentinel_filtered_case_insensitively() {
        let m = meal(
            r#"{"strIngredient1":"NULL","strMeasure1":"1",
                "strIngredient2":" null ","strMeasure2":"2",
                "strIngredient3":"Nullo","strMeasure3":"3"}"#,
        );
        assert_eq!(m.ingredients(), vec![Ingredient::new("Nullo", "3")]);
    }

    #[test]
    fn test_slots_are_one_indexed_and_capped_at_twenty() {
        let mut fields = Map::new();
        for slot in 0..=21 {
            fields.insert(format!("strIngredient{}", slot), Value::from(format!("ing{}", slot)));
            fields.insert(format!("strMeasure{}", slot), Value::from(format!(" m{} ", slot)));
        }
        let ingredients = WireMeal::from_map(fields).ingredients();

        assert_eq!(ingredients.len(), INGREDIENT_SLOTS);
        assert_eq!(ingredients[0], Ingredient::new("ing1", "m1"));
        assert_eq!(ingredients[19], Ingredient::new("ing20", "m20"));
    }

    #[test]
    fn test_gaps_keep_source_order_and_missing_measure_is_empty() {
        let m = meal(
            r#"{"strIngredient2":"Eggs",
                "strIngredient7":"Flour","strMeasure7":"200g",
                "strIngredient20":"Salt","strMeasure20":null}"#,
        );
        assert_eq!(
            m.ingredients(),
            vec![
                Ingredient::new("Eggs", ""),
                Ingredient::new("Flour", "200g"),
                Ingredient::new("Salt", ""),
            ]
        );
    }

    #[test]
    fn test_field_names_match_case_insensitively() {
        let m = meal(r#"{"IDMEAL":52771,"strmeal":"Arrabiata","STRINGREDIENT1":"penne"}"#);
        let recipe = m.to_recipe();
        assert_eq!(recipe.id, "52771");
        assert_eq!(recipe.name, "Arrabiata");
        assert_eq!(recipe.ingredients, vec![Ingredient::new("penne", "")]);
        assert!(recipe.is_partial());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_slot_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                Just(Value::from("")),
                Just(Value::from("null")),
                Just(Value::from(" NULL ")),
                "[ a-z]{0,10}".prop_map(Value::from),
            ]
        }

        proptest! {
            #[test]
            fn prop_ingredients_are_trimmed_and_never_placeholders(
                slots in prop::collection::vec((arb_slot_value(), arb_slot_value()), 0..=25)
            ) {
                let mut fields = Map::new();
                for (index, (name, measure)) in slots.into_iter().enumerate() {
                    fields.insert(format!("strIngredient{}", index + 1), name);
                    fields.insert(format!("strMeasure{}", index + 1), measure);
                }
                let ingredients = WireMeal::from_map(fields).ingredients();

                prop_assert!(ingredients.len() <= INGREDIENT_SLOTS);
                for ingredient in &ingredients {
                    prop_assert!(!ingredient.name.is_empty());
                    prop_assert_eq!(ingredient.name.trim(), ingredient.name.as_str());
                    prop_assert!(!ingredient.name.eq_ignore_ascii_case(NULL_SENTINEL));
                    prop_assert_eq!(ingredient.measure.trim(), ingredient.measure.as_str());
                }
            }
        }
    }
}
