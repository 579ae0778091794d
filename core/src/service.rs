use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::catalog::{Meal, MealCatalog, MealCategory, Product, ProductCatalog};
use crate::models::FoodLogEntry;
use crate::state::StateContext;
use crate::storage::{KeyValueStore, SqliteStore};

/// Number of random meals shown when no category or area is selected.
pub const DEFAULT_MEAL_COUNT: usize = 25;

/// Application flows that combine catalog calls with state updates.
///
/// Providers are passed per call. A provider error is returned as-is and the
/// state is left as it was before the call.
pub struct NutriPlanService<S: KeyValueStore> {
    state: StateContext<S>,
}

impl NutriPlanService<SqliteStore> {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(SqliteStore::open(db_path)?))
    }
}

impl<S: KeyValueStore> NutriPlanService<S> {
    pub fn new(store: S) -> Self {
        Self {
            state: StateContext::new(store),
        }
    }

    #[must_use]
    pub fn state(&self) -> &StateContext<S> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateContext<S> {
        &mut self.state
    }

    // --- Meals ---

    /// Categories, areas and `count` random meals. Nothing is stored unless
    /// every call succeeds.
    pub fn load_initial_data(&mut self, catalog: &dyn MealCatalog, count: usize) -> Result<()> {
        let categories = catalog.categories()?;
        let areas = catalog.areas()?;
        let meals = catalog.random_meals(count)?;
        info!(
            categories = categories.len(),
            areas = areas.len(),
            meals = meals.len(),
            "Loaded initial catalog"
        );

        self.state.set_categories(categories);
        self.state.set_areas(areas);
        self.state.set_meals(meals);
        Ok(())
    }

    /// Replace the catalog with `count` random meals, leaving categories and
    /// areas as they are.
    pub fn load_random_meals(&mut self, catalog: &dyn MealCatalog, count: usize) -> Result<&[Meal]> {
        let meals = catalog.random_meals(count)?;
        info!(count = meals.len(), "Loaded random meals");
        self.state.set_meals(meals);
        Ok(self.state.meals())
    }

    pub fn load_categories(&mut self, catalog: &dyn MealCatalog) -> Result<&[MealCategory]> {
        let categories = catalog.categories()?;
        self.state.set_categories(categories);
        Ok(self.state.categories())
    }

    pub fn load_areas(&mut self, catalog: &dyn MealCatalog) -> Result<&[String]> {
        let areas = catalog.areas()?;
        self.state.set_areas(areas);
        Ok(self.state.areas())
    }

    /// Replace the catalog with the provider's search results.
    pub fn search_meals(&mut self, catalog: &dyn MealCatalog, query: &str) -> Result<&[Meal]> {
        let meals = catalog.search_meals(query.trim())?;
        self.state.set_meals(meals);
        Ok(self.state.meals())
    }

    /// Replace the catalog with one category. An empty label loads random meals.
    pub fn browse_category(&mut self, catalog: &dyn MealCatalog, category: &str) -> Result<&[Meal]> {
        let meals = if category.is_empty() {
            catalog.random_meals(DEFAULT_MEAL_COUNT)?
        } else {
            catalog.filter_by_category(category)?
        };
        self.state.set_meals(meals);
        Ok(self.state.meals())
    }

    /// Replace the catalog with one area. An empty label loads random meals.
    pub fn browse_area(&mut self, catalog: &dyn MealCatalog, area: &str) -> Result<&[Meal]> {
        let meals = if area.is_empty() {
            catalog.random_meals(DEFAULT_MEAL_COUNT)?
        } else {
            catalog.filter_by_area(area)?
        };
        info!(area, count = meals.len(), "Loaded meals by area");
        self.state.set_meals(meals);
        Ok(self.state.meals())
    }

    /// Fetch full details for a meal and make it the selected one.
    pub fn select_meal(&mut self, catalog: &dyn MealCatalog, id: &str) -> Result<Option<&Meal>> {
        let Some(meal) = catalog.meal_by_id(id)? else {
            return Ok(None);
        };
        self.state.set_selected_meal(Some(meal));
        Ok(self.state.selected_meal())
    }

    /// Look a meal up by id and log one estimated serving of it.
    pub fn quick_log_meal(
        &mut self,
        catalog: &dyn MealCatalog,
        id: &str,
    ) -> Result<Option<FoodLogEntry>> {
        match catalog.meal_by_id(id)? {
            Some(meal) => self.state.log_meal(&meal).map(Some),
            None => Ok(None),
        }
    }

    pub fn log_selected_meal(&mut self) -> Result<Option<FoodLogEntry>> {
        let Some(meal) = self.state.selected_meal().cloned() else {
            return Ok(None);
        };
        self.state.log_meal(&meal).map(Some)
    }

    // --- Products ---

    /// Replace the product list with search results. A blank query is ignored.
    pub fn search_products(
        &mut self,
        catalog: &dyn ProductCatalog,
        query: &str,
    ) -> Result<&[Product]> {
        let query = query.trim();
        if !query.is_empty() {
            let products = catalog.search_products(query)?;
            self.state.set_products(products);
        }
        Ok(self.state.products())
    }

    /// Single product lookup; the product list is left alone.
    pub fn lookup_barcode(
        &self,
        catalog: &dyn ProductCatalog,
        code: &str,
    ) -> Result<Option<Product>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        catalog.product_by_barcode(code)
    }

    pub fn log_product_by_barcode(
        &mut self,
        catalog: &dyn ProductCatalog,
        code: &str,
        servings: f64,
    ) -> Result<Option<FoodLogEntry>> {
        match self.lookup_barcode(catalog, code)? {
            Some(product) => self.state.log_product(&product, servings).map(Some),
            None => Ok(None),
        }
    }

    // --- Food log ---

    pub fn delete_log_entry(&mut self, timestamp: i64) -> Result<bool> {
        self.state.delete_log_entry(timestamp)
    }

    pub fn clear_food_log(&mut self) -> Result<()> {
        self.state.clear_food_log()
    }
}
