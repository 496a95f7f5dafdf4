//! Week plans and shopping list aggregation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::recipe::Recipe;

/// Day names of a standard plan, in display order.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Meal slot within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        };
        f.pad(name)
    }
}

impl FromStr for MealSlot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            other => Err(ValidationError::InvalidInput {
                field: "slot".to_string(),
                reason: format!("unknown meal slot '{}'", other),
            }),
        }
    }
}

/// The three meals planned for one day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayMeal {
    pub day: String,
    pub breakfast: Option<Recipe>,
    pub lunch: Option<Recipe>,
    pub dinner: Option<Recipe>,
}

impl DayMeal {
    pub fn new(day: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            ..Default::default()
        }
    }

    pub fn slot(&self, slot: MealSlot) -> Option<&Recipe> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: MealSlot) -> &mut Option<Recipe> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Filled slots in breakfast, lunch, dinner order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        [&self.breakfast, &self.lunch, &self.dinner]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}

/// A seven-day meal plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekPlan {
    pub days: Vec<DayMeal>,
}

impl WeekPlan {
    /// Monday through Sunday, every slot empty.
    pub fn standard() -> Self {
        Self {
            days: WEEKDAYS.iter().map(|day| DayMeal::new(*day)).collect(),
        }
    }

    /// Look up a day by name, ignoring case.
    pub fn day(&self, day: &str) -> Option<&DayMeal> {
        self.days
            .iter()
            .find(|d| d.day.eq_ignore_ascii_case(day.trim()))
    }

    fn day_mut(&mut self, day: &str) -> Option<&mut DayMeal> {
        self.days
            .iter_mut()
            .find(|d| d.day.eq_ignore_ascii_case(day.trim()))
    }

    /// Place a recipe into a slot. Returns `false` when the day is not in the plan.
    pub fn assign(&mut self, day: &str, slot: MealSlot, recipe: Recipe) -> bool {
        match self.day_mut(day) {
            Some(entry) => {
                *entry.slot_mut(slot) = Some(recipe);
                true
            }
            None => false,
        }
    }

    /// Empty a slot, returning the recipe that was there.
    pub fn clear_slot(&mut self, day: &str, slot: MealSlot) -> Option<Recipe> {
        self.day_mut(day).and_then(|entry| entry.slot_mut(slot).take())
    }

    /// Every planned recipe in day order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.days.iter().flat_map(|d| d.recipes())
    }

    /// Aggregated shopping list for every planned recipe.
    pub fn shopping_list(&self) -> Vec<ShoppingItem> {
        aggregate_ingredients(self.recipes())
    }
}

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShoppingItem {
    pub name: String,
    pub measure: String,
    pub is_checked: bool,
}

impl ShoppingItem {
    pub fn new(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measure: measure.into(),
            is_checked: false,
        }
    }
}

/// Group the ingredients of `recipes` into a shopping list.
///
/// Names are trimmed and grouped case-insensitively; a group keeps the
/// spelling of its first occurrence and groups appear in first-seen order.
/// Non-blank measures are de-duplicated and joined with `" + "`.
pub fn aggregate_ingredients<'a, I>(recipes: I) -> Vec<ShoppingItem>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    let mut groups: Vec<(String, String, Vec<String>)> = Vec::new();

    for ingredient in recipes.into_iter().flat_map(|r| r.ingredients.iter()) {
        let name = ingredient.name.trim();
        if name.is_empty() {
            continue;
        }
        let folded = name.to_lowercase();
        let index = match groups.iter().position(|(key, _, _)| *key == folded) {
            Some(index) => index,
            None => {
                groups.push((folded, name.to_string(), Vec::new()));
                groups.len() - 1
            }
        };

        let measure = ingredient.measure.trim();
        let measures = &mut groups[index].2;
        if !measure.is_empty() && !measures.iter().any(|m| m == measure) {
            measures.push(measure.to_string());
        }
    }

    groups
        .into_iter()
        .map(|(_, name, measures)| ShoppingItem::new(name, measures.join(" + ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: &str, ingredients: &[(&str, &str)]) -> Recipe {
        ingredients
            .iter()
            .fold(Recipe::new(id, id), |r, (name, measure)| {
                r.with_ingredient(*name, *measure)
            })
    }

    #[test]
    fn test_standard_week_has_seven_empty_days() {
        let plan = WeekPlan::standard();
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].day, "Monday");
        assert_eq!(plan.days[6].day, "Sunday");
        assert_eq!(plan.recipes().count(), 0);
    }

    #[test]
    fn test_assign_and_clear_slot() {
        let mut plan = WeekPlan::standard();
        assert!(plan.assign("tuesday", MealSlot::Dinner, Recipe::new("1", "Stew")));
        assert!(!plan.assign("Funday", MealSlot::Lunch, Recipe::new("2", "Soup")));

        let tuesday = plan.day("Tuesday").unwrap();
        assert_eq!(tuesday.slot(MealSlot::Dinner).unwrap().id, "1");
        assert!(tuesday.slot(MealSlot::Lunch).is_none());

        let removed = plan.clear_slot("Tuesday", MealSlot::Dinner);
        assert_eq!(removed.unwrap().id, "1");
        assert_eq!(plan.recipes().count(), 0);
    }

    #[test]
    fn test_meal_slot_parse() {
        assert_eq!("Breakfast".parse::<MealSlot>().unwrap(), MealSlot::Breakfast);
        assert_eq!(" DINNER ".parse::<MealSlot>().unwrap(), MealSlot::Dinner);
        assert!("brunch".parse::<MealSlot>().is_err());
    }

    #[test]
    fn test_aggregate_groups_case_insensitively() {
        let a = recipe("a", &[("Chicken", "2 breasts"), ("soy sauce", "3/4 cup")]);
        let b = recipe("b", &[("chicken ", "500g"), ("Rice", "")]);
        let c = recipe("c", &[("CHICKEN", "2 breasts"), ("  ", "1 tbsp")]);

        let items = aggregate_ingredients([&a, &b, &c]);
        assert_eq!(
            items,
            vec![
                ShoppingItem::new("Chicken", "2 breasts + 500g"),
                ShoppingItem::new("soy sauce", "3/4 cup"),
                ShoppingItem::new("Rice", ""),
            ]
        );
    }

    #[test]
    fn test_week_plan_shopping_list_walks_days_in_order() {
        let mut plan = WeekPlan::standard();
        plan.assign("Sunday", MealSlot::Lunch, recipe("s", &[("Eggs", "2")]));
        plan.assign("Monday", MealSlot::Breakfast, recipe("m", &[("Milk", "1 cup")]));

        let names: Vec<_> = plan.shopping_list().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Milk", "Eggs"]);
    }

    #[test]
    fn test_shopping_item_serializes_is_checked() {
        let json = serde_json::to_value(ShoppingItem::new("Salt", "1 tsp")).unwrap();
        assert_eq!(json["isChecked"], false);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Aggregation never yields two items whose names differ only by case.
        #[test]
        fn prop_aggregated_names_unique_ignoring_case(
            names in prop::collection::vec("[a-cA-C ]{0,4}", 0..20)
        ) {
            let recipe = names
                .iter()
                .fold(Recipe::new("p", "p"), |r, n| r.with_ingredient(n.clone(), "1"));
            let items = aggregate_ingredients([&recipe]);

            let mut seen = std::collections::HashSet::new();
            for item in &items {
                prop_assert!(!item.name.is_empty());
                prop_assert!(seen.insert(item.name.to_lowercase()));
            }
        }
    }
}
