pub mod aggregate;
pub mod catalog;
pub mod estimator;
pub mod filter;
pub mod food_log;
pub mod mealdb;
pub mod models;
pub mod openfoodfacts;
pub mod service;
pub mod state;
pub mod storage;
