use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Key under which the serialized food log lives in the key-value store.
pub const FOOD_LOG_KEY: &str = "foodLog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Meal,
    Product,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Meal => f.write_str("meal"),
            EntryKind::Product => f.write_str("product"),
        }
    }
}

/// A consumption event as persisted in the food log.
///
/// `timestamp` (epoch milliseconds) is the identity of the entry; `date` is
/// the local calendar day the entry was created on and is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat: f64,
    #[serde(
        default,
        deserialize_with = "lenient_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub fiber: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sugar: Option<f64>,
    pub date: NaiveDate,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: i64,
}

/// Caller-supplied part of a log entry; the store stamps `date` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewLogEntry {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub kind: EntryKind,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
}

impl NewLogEntry {
    #[must_use]
    pub fn stamp(self, date: NaiveDate, timestamp: i64) -> FoodLogEntry {
        FoodLogEntry {
            id: self.id,
            name: self.name,
            image: self.image,
            kind: self.kind,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            date,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl DailyTotals {
    /// Calories to the nearest integer, macros to one decimal place.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: round_tenth(self.protein),
            carbs: round_tenth(self.carbs),
            fat: round_tenth(self.fat),
        }
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPoint {
    pub date: NaiveDate,
    #[serde(rename = "day")]
    pub day_label: String,
    pub calories: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 50.0,
            carbs: 250.0,
            fat: 65.0,
        }
    }
}

/// Share of each daily goal reached, in percent, capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl GoalProgress {
    #[must_use]
    pub fn of(totals: &DailyTotals, goals: &DailyGoals) -> Self {
        Self {
            calories: percent_of(totals.calories, goals.calories),
            protein: percent_of(totals.protein, goals.protein),
            carbs: percent_of(totals.carbs, goals.carbs),
            fat: percent_of(totals.fat, goals.fat),
        }
    }
}

fn percent_of(current: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (current / goal * 100.0).min(100.0)
}

/// Estimated nutrition for one serving of a meal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProfile {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Meals,
    Products,
    FoodLog,
}

pub const PAGES: &[&str] = &["meals", "products", "foodlog"];

impl FromStr for Page {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "meals" => Ok(Page::Meals),
            "products" => Ok(Page::Products),
            "foodlog" => Ok(Page::FoodLog),
            _ => bail!("Invalid page '{s}'. Must be one of: {}", PAGES.join(", ")),
        }
    }
}

/// Numbers in persisted entries may have been written by older clients as
/// strings, nulls, or garbage. Anything that does not parse counts as zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).unwrap_or(0.0))
}

pub(crate) fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

/// Leading-number parse of a JSON value. Non-finite and negative results
/// are rejected; no tracked quantity can be below zero.
#[must_use]
pub fn coerce_number(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => parse_leading_float(s)?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

/// Entry identity: an integer, or a number or numeric string that converts
/// to one. Anything else makes the entry unreadable.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    coerce_timestamp(&value)
        .ok_or_else(|| <D::Error as serde::de::Error>::custom(format!("invalid timestamp {value}")))
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_timestamp(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| parse_leading_float(s).map(|f| f as i64)),
        _ => None,
    }
}

fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            d if d.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}
