use serde::Deserialize;

use crate::catalog::{Product, ProductNutrition};
use crate::models::lenient_optional_number;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub status: i32,
    pub product: Option<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub code: Option<String>,
    pub image_url: Option<String>,
    pub image_front_url: Option<String>,
    pub nutriscore_grade: Option<String>,
    pub categories: Option<String>,
    pub countries: Option<String>,
    pub nutriments: Option<Nutriments>,
}

#[derive(Debug, Deserialize, Default)]
#[allow(clippy::struct_field_names)]
pub struct Nutriments {
    #[serde(
        rename = "energy-kcal_100g",
        default,
        deserialize_with = "lenient_optional_number"
    )]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub proteins_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub fat_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub fiber_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub sugars_100g: Option<f64>,
}

fn first_of_list(list: Option<String>) -> Option<String> {
    list?
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convert a raw product. Products without a name are dropped; missing
/// nutriments are kept as unknown rather than rejecting the product.
#[must_use]
pub fn product_from_data(p: ProductData) -> Option<Product> {
    let name = p.product_name.filter(|n| !n.trim().is_empty())?;
    let nutriments = p.nutriments.unwrap_or_default();

    Some(Product {
        code: p.code.unwrap_or_default(),
        name,
        brand: p.brands.filter(|b| !b.is_empty()),
        image: p.image_url.or(p.image_front_url).filter(|u| !u.is_empty()),
        nutri_score: p.nutriscore_grade.filter(|g| !g.is_empty()),
        category: first_of_list(p.categories),
        country: first_of_list(p.countries),
        nutrition: ProductNutrition {
            calories_per_100g: nutriments.energy_kcal_100g,
            protein_per_100g: nutriments.proteins_100g,
            carbs_per_100g: nutriments.carbohydrates_100g,
            fat_per_100g: nutriments.fat_100g,
            fiber_per_100g: nutriments.fiber_100g,
            sugar_per_100g: nutriments.sugars_100g,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_product() -> ProductData {
        ProductData {
            product_name: Some("Nutella".to_string()),
            brands: Some("Ferrero".to_string()),
            code: Some("3017620422003".to_string()),
            image_url: None,
            image_front_url: Some("https://images.openfoodfacts.org/nutella.jpg".to_string()),
            nutriscore_grade: Some("e".to_string()),
            categories: Some("Spreads, Sweet spreads, Cocoa and hazelnuts spreads".to_string()),
            countries: Some("France,Germany".to_string()),
            nutriments: Some(Nutriments {
                energy_kcal_100g: Some(539.0),
                proteins_100g: Some(6.3),
                carbohydrates_100g: Some(57.5),
                fat_100g: Some(30.9),
                fiber_100g: None,
                sugars_100g: Some(56.3),
            }),
        }
    }

    #[test]
    fn test_product_from_data_complete() {
        let product = product_from_data(full_product()).unwrap();
        assert_eq!(product.name, "Nutella");
        assert_eq!(product.brand.as_deref(), Some("Ferrero"));
        assert_eq!(product.code, "3017620422003");
        assert_eq!(
            product.image.as_deref(),
            Some("https://images.openfoodfacts.org/nutella.jpg")
        );
        assert_eq!(product.nutri_score.as_deref(), Some("e"));
        assert_eq!(product.category.as_deref(), Some("Spreads"));
        assert_eq!(product.country.as_deref(), Some("France"));
        assert_eq!(product.nutrition.calories_per_100g, Some(539.0));
        assert_eq!(product.nutrition.protein_per_100g, Some(6.3));
        assert_eq!(product.nutrition.carbs_per_100g, Some(57.5));
        assert_eq!(product.nutrition.fat_per_100g, Some(30.9));
        assert_eq!(product.nutrition.sugar_per_100g, Some(56.3));
        assert!(product.nutrition.fiber_per_100g.is_none());
    }

    #[test]
    fn test_product_from_data_missing_name() {
        let mut p = full_product();
        p.product_name = None;
        assert!(product_from_data(p).is_none());

        // Blank name should also be dropped
        let mut p2 = full_product();
        p2.product_name = Some("  ".to_string());
        assert!(product_from_data(p2).is_none());
    }

    #[test]
    fn test_product_from_data_without_nutriments() {
        let mut p = full_product();
        p.nutriments = None;
        let product = product_from_data(p).unwrap();
        assert_eq!(product.nutrition, ProductNutrition::default());
    }

    #[test]
    fn test_product_response_parses() {
        let raw = r#"{
            "status": 1,
            "product": {
                "code": "5449000000996",
                "product_name": "Coca-Cola",
                "image_url": "https://images.openfoodfacts.org/coke.jpg",
                "nutriscore_grade": "e",
                "nutriments": {"energy-kcal_100g": 42, "sugars_100g": "10.6", "fat_100g": ""}
            }
        }"#;
        let resp: ProductResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.status, 1);
        let product = product_from_data(resp.product.unwrap()).unwrap();
        assert_eq!(product.nutrition.calories_per_100g, Some(42.0));
        assert_eq!(product.nutrition.sugar_per_100g, Some(10.6));
        assert!(product.nutrition.fat_per_100g.is_none());
        assert!(product.brand.is_none());
        assert!(product.category.is_none());
    }

    #[test]
    fn test_search_response_without_products() {
        let resp: SearchResponse = serde_json::from_str(r#"{"count":0}"#).unwrap();
        assert!(resp.products.is_empty());
    }
}
