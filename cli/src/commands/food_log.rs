use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nutriplan_core::models::{DailyGoals, DailyTotals, FoodLogEntry, GoalProgress};

use super::Service;
use super::helpers::{json_error, no_neg_zero, print_entry_table, print_json, progress_bar};

pub(crate) fn cmd_today(svc: &Service, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct TodayReport<'a> {
        date: NaiveDate,
        entries: Vec<&'a FoodLogEntry>,
        totals: DailyTotals,
        goals: &'a DailyGoals,
        progress: GoalProgress,
    }

    let state = svc.state();
    let date = Local::now().date_naive();
    let totals = state.daily_totals(date);
    let report = TodayReport {
        date,
        entries: state.entries_for_date(date).collect(),
        totals,
        goals: state.daily_goals(),
        progress: state.goal_progress(&totals),
    };

    if json {
        return print_json(&report);
    }

    println!("=== {date} ===\n");
    if report.entries.is_empty() {
        println!("  No food logged today\n");
    } else {
        print_entry_table(report.entries.iter().copied());
        println!();
    }

    let goals = report.goals;
    let progress = &report.progress;
    let rows = [
        ("Calories", totals.calories, goals.calories, progress.calories, "kcal"),
        ("Protein", totals.protein, goals.protein, progress.protein, "g"),
        ("Carbs", totals.carbs, goals.carbs, progress.carbs, "g"),
        ("Fat", totals.fat, goals.fat, progress.fat, "g"),
    ];
    for (label, current, goal, percent, unit) in rows {
        let current = no_neg_zero(current);
        println!(
            "  {label:<9}{bar} {current}/{goal:.0} {unit} ({percent:.0}%)",
            bar = progress_bar(percent, 20)
        );
    }
    println!("\n  {} items logged", report.entries.len());

    Ok(())
}

pub(crate) fn cmd_week(svc: &Service, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct WeekRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let series = svc.state().weekly_series();

    if json {
        return print_json(&series);
    }

    let rows: Vec<WeekRow> = series
        .iter()
        .map(|p| WeekRow {
            day: p.day_label.clone(),
            date: p.date.to_string(),
            calories: format!("{:.0}", no_neg_zero(p.calories)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let total: f64 = series.iter().map(|p| p.calories).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = total / series.len() as f64;
    println!("  Average: {:.0} kcal/day", no_neg_zero(average));

    Ok(())
}

pub(crate) fn cmd_delete(svc: &mut Service, timestamp: i64, json: bool) -> Result<()> {
    let removed = svc.delete_log_entry(timestamp)?;
    if !removed {
        if json {
            println!(
                "{}",
                json_error(&format!("Entry {timestamp} not found"))
            );
        } else {
            eprintln!("Entry {timestamp} not found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": timestamp }));
    } else {
        println!("Deleted entry {timestamp}");
    }
    Ok(())
}

pub(crate) fn cmd_clear(svc: &mut Service, json: bool) -> Result<()> {
    let count = svc.state().food_log().len();
    svc.clear_food_log()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": count }));
    } else {
        println!("Cleared {count} entries");
    }
    Ok(())
}
