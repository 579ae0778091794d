use anyhow::{Context, Result};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tracing::debug;

use nutriplan_core::catalog::{Meal, MealCatalog, MealCategory};
use nutriplan_core::mealdb::{
    AreasResponse, CategoriesResponse, MealsResponse, areas_from_response,
    categories_from_response, meals_from_response, with_area, with_category,
};

use crate::openfoodfacts::http_client;

const BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

pub struct MealDbClient {
    client: reqwest::Client,
    rt: Handle,
}

impl MealDbClient {
    pub fn new(rt: Handle) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            rt,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .client
            .get(format!("{BASE_URL}/{endpoint}"))
            .query(query)
            .send()
            .await
            .context("Failed to reach TheMealDB API")?
            .error_for_status()
            .with_context(|| format!("TheMealDB request to {endpoint} failed"))?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse TheMealDB {endpoint} response"))
    }

    pub async fn categories_async(&self) -> Result<Vec<MealCategory>> {
        let data: CategoriesResponse = self.fetch("categories.php", &[]).await?;
        Ok(categories_from_response(data))
    }

    pub async fn search_async(&self, query: &str) -> Result<Vec<Meal>> {
        let data: MealsResponse = self.fetch("search.php", &[("s", query)]).await?;
        Ok(meals_from_response(data))
    }

    pub async fn lookup_async(&self, id: &str) -> Result<Option<Meal>> {
        let data: MealsResponse = self.fetch("lookup.php", &[("i", id)]).await?;
        Ok(meals_from_response(data).into_iter().next())
    }

    pub async fn filter_by_category_async(&self, category: &str) -> Result<Vec<Meal>> {
        let data: MealsResponse = self.fetch("filter.php", &[("c", category)]).await?;
        Ok(with_category(meals_from_response(data), category))
    }

    pub async fn filter_by_area_async(&self, area: &str) -> Result<Vec<Meal>> {
        let data: MealsResponse = self.fetch("filter.php", &[("a", area)]).await?;
        Ok(with_area(meals_from_response(data), area))
    }

    pub async fn random_async(&self) -> Result<Option<Meal>> {
        let data: MealsResponse = self.fetch("random.php", &[]).await?;
        Ok(meals_from_response(data).into_iter().next())
    }

    /// Issue `count` random requests concurrently. One failed request fails
    /// the whole batch; empty responses are skipped.
    pub async fn random_many_async(&self, count: usize) -> Result<Vec<Meal>> {
        let results = try_join_all((0..count).map(|_| self.random_async())).await?;
        let meals: Vec<Meal> = results.into_iter().flatten().collect();
        debug!(requested = count, received = meals.len(), "Fetched random meals");
        Ok(meals)
    }

    pub async fn areas_async(&self) -> Result<Vec<String>> {
        let data: AreasResponse = self.fetch("list.php", &[("a", "list")]).await?;
        Ok(areas_from_response(data))
    }
}

impl MealCatalog for MealDbClient {
    fn categories(&self) -> Result<Vec<MealCategory>> {
        self.rt.block_on(self.categories_async())
    }

    fn search_meals(&self, query: &str) -> Result<Vec<Meal>> {
        self.rt.block_on(self.search_async(query))
    }

    fn meal_by_id(&self, id: &str) -> Result<Option<Meal>> {
        self.rt.block_on(self.lookup_async(id))
    }

    fn filter_by_category(&self, category: &str) -> Result<Vec<Meal>> {
        self.rt.block_on(self.filter_by_category_async(category))
    }

    fn filter_by_area(&self, area: &str) -> Result<Vec<Meal>> {
        self.rt.block_on(self.filter_by_area_async(area))
    }

    fn random_meal(&self) -> Result<Option<Meal>> {
        self.rt.block_on(self.random_async())
    }

    fn random_meals(&self, count: usize) -> Result<Vec<Meal>> {
        self.rt.block_on(self.random_many_async(count))
    }

    fn areas(&self) -> Result<Vec<String>> {
        self.rt.block_on(self.areas_async())
    }
}
