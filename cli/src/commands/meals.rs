use anyhow::Result;
use serde::Serialize;

use nutriplan_core::catalog::{Meal, MealCatalog};
use nutriplan_core::estimator;
use nutriplan_core::models::MacroProfile;

use super::Service;
use super::helpers::{exit_not_found, print_json, print_meal_table, truncate};

/// At most one local filter; clap enforces exclusivity.
pub(crate) enum LocalFilter {
    None,
    Search(String),
    Category(String),
    Area(String),
}

/// Exactly one browse label; clap makes one of the two required.
pub(crate) enum BrowseLabel<'a> {
    Category(&'a str),
    Area(&'a str),
}

pub(crate) fn cmd_meals(
    svc: &mut Service,
    catalog: &dyn MealCatalog,
    count: usize,
    filter: LocalFilter,
    json: bool,
) -> Result<()> {
    svc.load_random_meals(catalog, count)?;

    let state = svc.state_mut();
    match &filter {
        LocalFilter::None => {}
        LocalFilter::Search(text) => state.filter_by_search_text(text),
        LocalFilter::Category(label) => state.filter_by_category(label),
        LocalFilter::Area(label) => state.filter_by_area(label),
    }

    let view: Vec<&Meal> = svc.state().current_view().collect();
    if view.is_empty() {
        exit_not_found("No recipes found", json);
    }
    if json {
        return print_json(&view);
    }

    print_meal_table(view.iter().copied());
    println!("Showing {} of {} recipes", view.len(), svc.state().meals().len());
    Ok(())
}

pub(crate) fn cmd_search(
    svc: &mut Service,
    catalog: &dyn MealCatalog,
    text: &str,
    json: bool,
) -> Result<()> {
    let meals = svc.search_meals(catalog, text)?;
    print_meals(meals, &format!("No recipes found for '{text}'"), json)
}

pub(crate) fn cmd_browse(
    svc: &mut Service,
    catalog: &dyn MealCatalog,
    label: BrowseLabel<'_>,
    json: bool,
) -> Result<()> {
    let (meals, label) = match label {
        BrowseLabel::Category(category) => (svc.browse_category(catalog, category)?, category),
        BrowseLabel::Area(area) => (svc.browse_area(catalog, area)?, area),
    };
    print_meals(meals, &format!("No {label} recipes found"), json)
}

fn print_meals(meals: &[Meal], empty_message: &str, json: bool) -> Result<()> {
    if meals.is_empty() {
        exit_not_found(empty_message, json);
    }
    if json {
        return print_json(meals);
    }
    print_meal_table(meals);
    println!("Showing {} recipes", meals.len());
    Ok(())
}

pub(crate) fn cmd_categories(svc: &mut Service, catalog: &dyn MealCatalog, json: bool) -> Result<()> {
    let categories = svc.load_categories(catalog)?;
    if json {
        return print_json(categories);
    }
    for c in categories {
        let description = c
            .description
            .as_deref()
            .map(|d| format!(" - {}", truncate(d, 60)))
            .unwrap_or_default();
        println!("{}{description}", c.name);
    }
    Ok(())
}

pub(crate) fn cmd_areas(svc: &mut Service, catalog: &dyn MealCatalog, json: bool) -> Result<()> {
    let areas = svc.load_areas(catalog)?;
    if json {
        return print_json(areas);
    }
    for area in areas {
        println!("{area}");
    }
    Ok(())
}

pub(crate) fn cmd_show(
    svc: &mut Service,
    catalog: &dyn MealCatalog,
    id: &str,
    json: bool,
) -> Result<()> {
    #[derive(Serialize)]
    struct MealDetail<'a> {
        meal: &'a Meal,
        nutrition: MacroProfile,
    }

    let Some(meal) = svc.select_meal(catalog, id)? else {
        exit_not_found(&format!("No recipe with id '{id}'"), json);
    };
    let nutrition = estimator::estimate(meal.category.as_deref());

    if json {
        return print_json(&MealDetail { meal, nutrition });
    }

    println!("=== {} ===", meal.name);
    let category = meal.category.as_deref().unwrap_or("-");
    let area = meal.area.as_deref().unwrap_or("-");
    println!("  {category} | {area}");
    if !meal.tags.is_empty() {
        println!("  Tags: {}", meal.tags.join(", "));
    }

    if !meal.ingredients.is_empty() {
        println!("\n  INGREDIENTS");
        for i in &meal.ingredients {
            match &i.measure {
                Some(measure) => println!("    {measure} {}", i.name),
                None => println!("    {}", i.name),
            }
        }
    }

    let MacroProfile {
        calories,
        protein,
        carbs,
        fat,
        fiber,
        sugar,
    } = nutrition;
    println!("\n  ESTIMATED PER SERVING");
    println!(
        "    {calories:.0} kcal | P:{protein:.0}g C:{carbs:.0}g F:{fat:.0}g | fiber {fiber:.0}g sugar {sugar:.0}g"
    );

    if let Some(instructions) = &meal.instructions {
        println!("\n  INSTRUCTIONS");
        for line in instructions.lines().map(str::trim).filter(|l| !l.is_empty()) {
            println!("    {line}");
        }
    }
    if let Some(video) = &meal.youtube {
        println!("\n  Video: {video}");
    }

    Ok(())
}

pub(crate) fn cmd_log(
    svc: &mut Service,
    catalog: &dyn MealCatalog,
    id: &str,
    json: bool,
) -> Result<()> {
    let Some(entry) = svc.quick_log_meal(catalog, id)? else {
        exit_not_found(&format!("No recipe with id '{id}'"), json);
    };

    if json {
        return print_json(&entry);
    }
    let name = &entry.name;
    let cal = entry.calories;
    let ts = entry.timestamp;
    println!("Logged: {name} ({cal:.0} kcal) [{ts}]");
    Ok(())
}
