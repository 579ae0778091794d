use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::aggregate::{self, WEEK_WINDOW};
use crate::catalog::{Meal, MealCategory, Product};
use crate::estimator;
use crate::filter::{FilterCriteria, FilterEngine};
use crate::food_log::FoodLogStore;
use crate::models::{
    DailyGoals, DailyTotals, EntryKind, FoodLogEntry, GoalProgress, NewLogEntry, Page, WeeklyPoint,
};
use crate::storage::KeyValueStore;

/// Notification sent to subscribers after a mutation has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    CatalogReplaced { count: usize },
    FilterApplied(FilterCriteria),
    SelectionChanged(Option<String>),
    ProductsReplaced { count: usize },
    FoodLogChanged { entries: usize },
    PageChanged(Page),
    CategoriesLoaded { count: usize },
    AreasLoaded { count: usize },
}

type Listener = Box<dyn FnMut(&StateEvent)>;

/// Application state owned by the front end and passed by reference.
///
/// Mutations go through methods on this type; each one notifies the
/// registered listeners once it has been applied.
pub struct StateContext<S: KeyValueStore> {
    page: Page,
    categories: Vec<MealCategory>,
    areas: Vec<String>,
    selected_meal: Option<Meal>,
    meals: FilterEngine<Meal>,
    products: Vec<Product>,
    food_log: FoodLogStore<S>,
    goals: DailyGoals,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> StateContext<S> {
    pub fn new(store: S) -> Self {
        Self {
            page: Page::default(),
            categories: Vec::new(),
            areas: Vec::new(),
            selected_meal: None,
            meals: FilterEngine::new(),
            products: Vec::new(),
            food_log: FoodLogStore::load(store),
            goals: DailyGoals::default(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StateEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: &StateEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    // --- Navigation ---

    #[must_use]
    pub fn current_page(&self) -> Page {
        self.page
    }

    pub fn set_current_page(&mut self, page: Page) {
        self.page = page;
        self.notify(&StateEvent::PageChanged(page));
    }

    // --- Meal catalog ---

    pub fn set_meals(&mut self, meals: Vec<Meal>) {
        let count = meals.len();
        self.meals.set_catalog(meals);
        self.notify(&StateEvent::CatalogReplaced { count });
    }

    #[must_use]
    pub fn meals(&self) -> &[Meal] {
        self.meals.records()
    }

    pub fn filter_by_category(&mut self, label: &str) {
        self.meals.by_category(label);
        self.notify_filter();
    }

    pub fn filter_by_area(&mut self, label: &str) {
        self.meals.by_area(label);
        self.notify_filter();
    }

    pub fn filter_by_search_text(&mut self, text: &str) {
        self.meals.by_search_text(text);
        self.notify_filter();
    }

    fn notify_filter(&mut self) {
        let criteria = self.meals.criteria().clone();
        self.notify(&StateEvent::FilterApplied(criteria));
    }

    #[must_use]
    pub fn active_filter(&self) -> &FilterCriteria {
        self.meals.criteria()
    }

    pub fn current_view(&self) -> impl ExactSizeIterator<Item = &Meal> {
        self.meals.current_view()
    }

    pub fn set_categories(&mut self, categories: Vec<MealCategory>) {
        let count = categories.len();
        self.categories = categories;
        self.notify(&StateEvent::CategoriesLoaded { count });
    }

    #[must_use]
    pub fn categories(&self) -> &[MealCategory] {
        &self.categories
    }

    pub fn set_areas(&mut self, areas: Vec<String>) {
        let count = areas.len();
        self.areas = areas;
        self.notify(&StateEvent::AreasLoaded { count });
    }

    #[must_use]
    pub fn areas(&self) -> &[String] {
        &self.areas
    }

    pub fn set_selected_meal(&mut self, meal: Option<Meal>) {
        let id = meal.as_ref().map(|m| m.id.clone());
        self.selected_meal = meal;
        self.notify(&StateEvent::SelectionChanged(id));
    }

    #[must_use]
    pub fn selected_meal(&self) -> Option<&Meal> {
        self.selected_meal.as_ref()
    }

    // --- Products ---

    pub fn set_products(&mut self, products: Vec<Product>) {
        let count = products.len();
        self.products = products;
        self.notify(&StateEvent::ProductsReplaced { count });
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products with this Nutri-Score grade, compared case-insensitively.
    /// An empty grade returns every product.
    pub fn products_by_nutri_score<'a>(&'a self, grade: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products.iter().filter(move |p| {
            grade.is_empty()
                || p.nutri_score
                    .as_deref()
                    .is_some_and(|g| g.eq_ignore_ascii_case(grade))
        })
    }

    // --- Food log ---

    /// Log one serving of `meal` using the estimated profile for its category.
    pub fn log_meal(&mut self, meal: &Meal) -> Result<FoodLogEntry> {
        let profile = estimator::estimate(meal.category.as_deref());
        let entry = NewLogEntry {
            id: meal.id.clone(),
            name: meal.name.clone(),
            image: meal.thumbnail.clone(),
            kind: EntryKind::Meal,
            calories: profile.calories,
            protein: profile.protein,
            carbs: profile.carbs,
            fat: profile.fat,
            fiber: Some(profile.fiber),
            sugar: Some(profile.sugar),
        };
        self.append(entry)
    }

    /// Log `servings` portions of a product's per-100 g values. A serving
    /// count that is not a positive number counts as one.
    pub fn log_product(&mut self, product: &Product, servings: f64) -> Result<FoodLogEntry> {
        let servings = if servings.is_finite() && servings > 0.0 {
            servings
        } else {
            1.0
        };
        let n = &product.nutrition;
        let scaled = |v: Option<f64>| v.unwrap_or(0.0) * servings;
        let entry = NewLogEntry {
            id: product.code.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            kind: EntryKind::Product,
            calories: scaled(n.calories_per_100g),
            protein: scaled(n.protein_per_100g),
            carbs: scaled(n.carbs_per_100g),
            fat: scaled(n.fat_per_100g),
            fiber: None,
            sugar: None,
        };
        self.append(entry)
    }

    fn append(&mut self, entry: NewLogEntry) -> Result<FoodLogEntry> {
        let stamped = self.food_log.append(entry)?;
        self.notify_food_log();
        Ok(stamped)
    }

    pub fn delete_log_entry(&mut self, timestamp: i64) -> Result<bool> {
        let removed = self.food_log.delete(timestamp)?;
        self.notify_food_log();
        Ok(removed)
    }

    pub fn clear_food_log(&mut self) -> Result<()> {
        self.food_log.clear()?;
        self.notify_food_log();
        Ok(())
    }

    fn notify_food_log(&mut self) {
        let entries = self.food_log.len();
        self.notify(&StateEvent::FoodLogChanged { entries });
    }

    #[must_use]
    pub fn food_log(&self) -> &[FoodLogEntry] {
        self.food_log.entries()
    }

    pub fn entries_for_date(&self, date: NaiveDate) -> impl Iterator<Item = &FoodLogEntry> {
        self.food_log.entries_for_date(date)
    }

    pub fn today_entries(&self) -> impl Iterator<Item = &FoodLogEntry> {
        self.food_log.entries_for_date(today())
    }

    #[must_use]
    pub fn daily_totals(&self, date: NaiveDate) -> DailyTotals {
        aggregate::daily_totals(self.food_log.entries(), date)
    }

    /// Calories for the last seven days ending today, oldest first.
    #[must_use]
    pub fn weekly_series(&self) -> Vec<WeeklyPoint> {
        aggregate::weekly_series(self.food_log.entries(), today(), WEEK_WINDOW)
    }

    #[must_use]
    pub fn daily_goals(&self) -> &DailyGoals {
        &self.goals
    }

    #[must_use]
    pub fn goal_progress(&self, totals: &DailyTotals) -> GoalProgress {
        GoalProgress::of(totals, &self.goals)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
