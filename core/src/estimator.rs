use crate::models::MacroProfile;

const fn profile(
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    sugar: f64,
) -> MacroProfile {
    MacroProfile {
        calories,
        protein,
        carbs,
        fat,
        fiber,
        sugar,
    }
}

/// Profile used for any category without its own row.
pub const DEFAULT_PROFILE: MacroProfile = profile(400.0, 25.0, 50.0, 12.0, 4.0, 10.0);

/// Per-serving estimates keyed by catalog category label (exact match).
pub const CATEGORY_PROFILES: &[(&str, MacroProfile)] = &[
    ("Chicken", profile(485.0, 42.0, 52.0, 8.0, 4.0, 12.0)),
    ("Beef", profile(520.0, 38.0, 45.0, 18.0, 3.0, 8.0)),
    ("Seafood", profile(380.0, 35.0, 48.0, 6.0, 2.0, 10.0)),
    ("Pasta", profile(450.0, 15.0, 75.0, 10.0, 5.0, 6.0)),
    ("Vegetarian", profile(320.0, 12.0, 58.0, 8.0, 8.0, 12.0)),
];

/// Coarse nutrition estimate for a meal, derived only from its category.
///
/// Unknown and absent categories resolve to [`DEFAULT_PROFILE`].
#[must_use]
pub fn estimate(category: Option<&str>) -> MacroProfile {
    category
        .and_then(|label| {
            CATEGORY_PROFILES
                .iter()
                .find(|(name, _)| *name == label)
                .map(|(_, p)| *p)
        })
        .unwrap_or(DEFAULT_PROFILE)
}
