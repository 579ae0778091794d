use anyhow::Result;
use serde::Serialize;

/// Common shape of a record from either external catalog.
pub trait CatalogRecord {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn category(&self) -> Option<&str>;
    fn area(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
}

/// A recipe from the meal catalog. Records returned by the filter
/// endpoints only carry id, name and thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<Ingredient>,
}

impl CatalogRecord for Meal {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealCategory {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Per-100 g nutrition values reported for a packaged product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
#[allow(clippy::struct_field_names)]
pub struct ProductNutrition {
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
    pub fiber_per_100g: Option<f64>,
    pub sugar_per_100g: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub nutri_score: Option<String>,
    /// First entry of the catalog's comma-separated category list.
    pub category: Option<String>,
    /// First entry of the catalog's comma-separated country list.
    pub country: Option<String>,
    pub nutrition: ProductNutrition,
}

impl CatalogRecord for Product {
    fn id(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn area(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

/// Recipe catalog capability.
///
/// The CLI implements this over HTTP; tests use in-memory fakes. Calls are
/// synchronous and are never retried by the caller.
pub trait MealCatalog {
    fn categories(&self) -> Result<Vec<MealCategory>>;
    fn search_meals(&self, query: &str) -> Result<Vec<Meal>>;
    fn meal_by_id(&self, id: &str) -> Result<Option<Meal>>;
    fn filter_by_category(&self, category: &str) -> Result<Vec<Meal>>;
    fn filter_by_area(&self, area: &str) -> Result<Vec<Meal>>;
    fn random_meal(&self) -> Result<Option<Meal>>;
    fn areas(&self) -> Result<Vec<String>>;

    /// `count` random meals; empty responses are skipped, so fewer may come back.
    fn random_meals(&self, count: usize) -> Result<Vec<Meal>> {
        let mut meals = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(meal) = self.random_meal()? {
                meals.push(meal);
            }
        }
        Ok(meals)
    }
}

/// Packaged-food catalog capability.
pub trait ProductCatalog {
    fn search_products(&self, query: &str) -> Result<Vec<Product>>;
    fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>>;
}
