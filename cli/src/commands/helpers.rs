use chrono::{DateTime, Local};
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nutriplan_core::catalog::{Meal, Product};
use nutriplan_core::models::FoodLogEntry;

/// Report an empty result and exit with status 2.
pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_meal_table<'a>(meals: impl IntoIterator<Item = &'a Meal>) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Area")]
        area: String,
    }

    let rows: Vec<MealRow> = meals
        .into_iter()
        .enumerate()
        .map(|(i, m)| MealRow {
            idx: i + 1,
            id: m.id.clone(),
            name: truncate(&m.name, 40),
            category: m.category.clone().unwrap_or_else(|| "-".into()),
            area: m.area.clone().unwrap_or_else(|| "-".into()),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_product_table(products: &[&Product]) {
    #[derive(Tabled)]
    struct ProductRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Code")]
        code: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Brand")]
        brand: String,
        #[tabled(rename = "Score")]
        score: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "F/100g")]
        fat: String,
    }

    let rows: Vec<ProductRow> = products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = &p.nutrition;
            ProductRow {
                idx: i + 1,
                code: p.code.clone(),
                name: truncate(&p.name, 35),
                brand: p
                    .brand
                    .as_deref()
                    .map(|b| truncate(b, 20))
                    .unwrap_or_default(),
                score: nutri_score_label(p),
                calories: n.calories_per_100g.map_or("-".into(), |v| format!("{v:.0}")),
                protein: n.protein_per_100g.map_or("-".into(), |v| format!("{v:.1}")),
                carbs: n.carbs_per_100g.map_or("-".into(), |v| format!("{v:.1}")),
                fat: n.fat_per_100g.map_or("-".into(), |v| format!("{v:.1}")),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..9)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_entry_table<'a>(entries: impl IntoIterator<Item = &'a FoodLogEntry>) {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "Timestamp")]
        timestamp: i64,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let rows: Vec<EntryRow> = entries
        .into_iter()
        .map(|e| EntryRow {
            timestamp: e.timestamp,
            time: local_time(e.timestamp),
            kind: e.kind.to_string(),
            name: truncate(&e.name, 35),
            calories: format!("{:.0}", no_neg_zero(e.calories)),
            protein: format!("{:.1}g", no_neg_zero(e.protein)),
            carbs: format!("{:.1}g", no_neg_zero(e.carbs)),
            fat: format!("{:.1}g", no_neg_zero(e.fat)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn nutri_score_label(product: &Product) -> String {
    product
        .nutri_score
        .as_deref()
        .map_or_else(|| "N/A".to_string(), str::to_uppercase)
}

fn local_time(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Text progress bar for a 0-100 percentage.
pub(crate) fn progress_bar(percent: f64, width: usize) -> String {
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème brûlée tart", 10), "Crème b...");
        assert_eq!(truncate("Pierogi", 10), "Pierogi");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 10), "[..........]");
        assert_eq!(progress_bar(50.0, 10), "[#####.....]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }

    #[test]
    fn test_nutri_score_label() {
        let mut p = Product {
            nutri_score: Some("b".to_string()),
            ..Product::default()
        };
        assert_eq!(nutri_score_label(&p), "B");
        p.nutri_score = None;
        assert_eq!(nutri_score_label(&p), "N/A");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("No meal 'x'"), r#"{"error":"No meal 'x'"}"#);
    }
}
