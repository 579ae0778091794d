use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::{Ingredient, Meal, MealCategory};

/// TheMealDB returns up to this many numbered ingredient/measure pairs.
const MAX_INGREDIENTS: usize = 20;

/// Envelope for search, lookup, filter and random endpoints. `meals` is
/// `null` when nothing matched.
#[derive(Debug, Deserialize)]
pub struct MealsResponse {
    pub meals: Option<Vec<MealData>>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Option<Vec<CategoryData>>,
}

#[derive(Debug, Deserialize)]
pub struct AreasResponse {
    pub meals: Option<Vec<AreaData>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealData {
    pub id_meal: Option<String>,
    pub str_meal: Option<String>,
    pub str_category: Option<String>,
    pub str_area: Option<String>,
    pub str_meal_thumb: Option<String>,
    pub str_instructions: Option<String>,
    pub str_tags: Option<String>,
    pub str_youtube: Option<String>,
    /// Numbered `strIngredientN` / `strMeasureN` fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryData {
    pub id_category: Option<String>,
    pub str_category: Option<String>,
    pub str_category_thumb: Option<String>,
    pub str_category_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaData {
    pub str_area: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn extra_str(extra: &HashMap<String, serde_json::Value>, key: &str) -> Option<String> {
    extra
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// Convert a raw record. Records without an id or a name are dropped.
#[must_use]
pub fn meal_from_data(m: MealData) -> Option<Meal> {
    let id = non_blank(m.id_meal)?;
    let name = non_blank(m.str_meal)?;

    let ingredients = (1..=MAX_INGREDIENTS)
        .filter_map(|i| {
            let ingredient = non_blank(extra_str(&m.extra, &format!("strIngredient{i}")))?;
            let measure = non_blank(extra_str(&m.extra, &format!("strMeasure{i}")));
            Some(Ingredient {
                name: ingredient,
                measure,
            })
        })
        .collect();

    let tags = m
        .str_tags
        .as_deref()
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Meal {
        id,
        name,
        category: non_blank(m.str_category),
        area: non_blank(m.str_area),
        thumbnail: non_blank(m.str_meal_thumb),
        instructions: non_blank(m.str_instructions),
        tags,
        youtube: non_blank(m.str_youtube),
        ingredients,
    })
}

#[must_use]
pub fn meals_from_response(resp: MealsResponse) -> Vec<Meal> {
    resp.meals
        .unwrap_or_default()
        .into_iter()
        .filter_map(meal_from_data)
        .collect()
}

#[must_use]
pub fn categories_from_response(resp: CategoriesResponse) -> Vec<MealCategory> {
    resp.categories
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| {
            Some(MealCategory {
                name: non_blank(c.str_category)?,
                id: c.id_category.unwrap_or_default(),
                thumbnail: non_blank(c.str_category_thumb),
                description: non_blank(c.str_category_description),
            })
        })
        .collect()
}

#[must_use]
pub fn areas_from_response(resp: AreasResponse) -> Vec<String> {
    resp.meals
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| non_blank(a.str_area))
        .collect()
}

/// The filter endpoints omit category and area; stamp the label that was
/// filtered on so local filtering still sees it.
#[must_use]
pub fn with_category(mut meals: Vec<Meal>, category: &str) -> Vec<Meal> {
    for meal in &mut meals {
        meal.category.get_or_insert_with(|| category.to_string());
    }
    meals
}

#[must_use]
pub fn with_area(mut meals: Vec<Meal>, area: &str) -> Vec<Meal> {
    for meal in &mut meals {
        meal.area.get_or_insert_with(|| area.to_string());
    }
    meals
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP: &str = r#"{"meals":[{
        "idMeal":"52772",
        "strMeal":"Teriyaki Chicken Casserole",
        "strCategory":"Chicken",
        "strArea":"Japanese",
        "strInstructions":"Preheat oven to 350 F.",
        "strMealThumb":"https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
        "strTags":"Meat,Casserole",
        "strYoutube":"https://www.youtube.com/watch?v=4aZr5hZXP_s",
        "strIngredient1":"soy sauce","strMeasure1":"3/4 cup",
        "strIngredient2":"water","strMeasure2":"1/2 cup",
        "strIngredient3":"","strMeasure3":"",
        "strIngredient4":"brown sugar","strMeasure4":" ",
        "strIngredient5":null,"strMeasure5":null,
        "strSource":null
    }]}"#;

    #[test]
    fn test_meal_lookup_parses() {
        let resp: MealsResponse = serde_json::from_str(LOOKUP).unwrap();
        let meals = meals_from_response(resp);
        assert_eq!(meals.len(), 1);
        let meal = &meals[0];
        assert_eq!(meal.id, "52772");
        assert_eq!(meal.name, "Teriyaki Chicken Casserole");
        assert_eq!(meal.category.as_deref(), Some("Chicken"));
        assert_eq!(meal.area.as_deref(), Some("Japanese"));
        assert_eq!(meal.tags, vec!["Meat", "Casserole"]);
        assert_eq!(meal.ingredients.len(), 3);
        assert_eq!(meal.ingredients[0].name, "soy sauce");
        assert_eq!(meal.ingredients[0].measure.as_deref(), Some("3/4 cup"));
        assert_eq!(meal.ingredients[2].name, "brown sugar");
        assert!(meal.ingredients[2].measure.is_none());
    }

    #[test]
    fn test_null_meals_is_empty() {
        let resp: MealsResponse = serde_json::from_str(r#"{"meals":null}"#).unwrap();
        assert!(meals_from_response(resp).is_empty());
    }

    #[test]
    fn test_filter_records_get_label_stamped() {
        let raw = r#"{"meals":[
            {"strMeal":"Beef Wellington","strMealThumb":"https://x/y.jpg","idMeal":"52803"},
            {"strMeal":"","idMeal":"1"}
        ]}"#;
        let resp: MealsResponse = serde_json::from_str(raw).unwrap();
        let meals = with_category(meals_from_response(resp), "Beef");
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].category.as_deref(), Some("Beef"));
        assert!(meals[0].area.is_none());

        let meals = with_area(meals, "British");
        assert_eq!(meals[0].area.as_deref(), Some("British"));
    }

    #[test]
    fn test_categories_parse() {
        let raw = r#"{"categories":[
            {"idCategory":"1","strCategory":"Beef","strCategoryThumb":"https://x/beef.png","strCategoryDescription":"Beef is the culinary name for meat from cattle."},
            {"idCategory":"2","strCategory":"Chicken","strCategoryThumb":null,"strCategoryDescription":""}
        ]}"#;
        let resp: CategoriesResponse = serde_json::from_str(raw).unwrap();
        let cats = categories_from_response(resp);
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].name, "Beef");
        assert_eq!(cats[1].id, "2");
        assert!(cats[1].description.is_none());
    }

    #[test]
    fn test_areas_parse() {
        let raw = r#"{"meals":[{"strArea":"American"},{"strArea":"British"},{"strArea":null}]}"#;
        let resp: AreasResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(areas_from_response(resp), vec!["American", "British"]);
    }
}
