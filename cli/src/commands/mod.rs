mod food_log;
mod helpers;
mod meals;
mod products;

use nutriplan_core::service::NutriPlanService;
use nutriplan_core::storage::SqliteStore;

pub(crate) type Service = NutriPlanService<SqliteStore>;

pub(crate) use food_log::{cmd_clear, cmd_delete, cmd_today, cmd_week};
pub(crate) use meals::{
    BrowseLabel, LocalFilter, cmd_areas, cmd_browse, cmd_categories, cmd_log, cmd_meals, cmd_search, cmd_show,
};
pub(crate) use products::{cmd_barcode, cmd_products};
