//! Nutrient aggregate math.
//!
//! Pure functions over ingredient compositions: averages across a set of
//! ingredients, feed-recipe contribution tables, and the ingredient scoring
//! behind the chat formulation handler. No I/O here; callers load the
//! compositions from the catalog.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single nutrient measurement, as a percentage of the ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientValue {
    pub nutrient: String,
    pub value: Decimal,
}

/// Average of one nutrient across a set of ingredients.
///
/// `samples` counts the ingredients that declare the nutrient; ingredients
/// without it do not drag the average down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NutrientAverage {
    pub nutrient: String,
    pub average: Decimal,
    pub samples: usize,
}

/// Average each nutrient across the given compositions.
///
/// Nutrient names are matched case-insensitively and reported in the casing
/// of their first occurrence. Output is sorted by nutrient name.
#[must_use]
pub fn average_composition(compositions: &[&[NutrientValue]]) -> Vec<NutrientAverage> {
    let mut sums: BTreeMap<String, (String, Decimal, usize)> = BTreeMap::new();

    for composition in compositions {
        for nutrient in *composition {
            let key = nutrient.nutrient.to_lowercase();
            let entry = sums
                .entry(key)
                .or_insert_with(|| (nutrient.nutrient.clone(), Decimal::ZERO, 0));
            entry.1 += nutrient.value;
            entry.2 += 1;
        }
    }

    sums.into_values()
        .map(|(nutrient, sum, samples)| NutrientAverage {
            nutrient,
            average: sum / Decimal::from(samples),
            samples,
        })
        .collect()
}

/// One ingredient line of a feed recipe, as entered in the admin calculator.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeLine {
    pub ingredient: String,
    /// Inclusion rate as a percentage of the total mix.
    pub inclusion_rate: Decimal,
    /// Cost per weight unit of this ingredient.
    pub cost_per_unit: Decimal,
    pub composition: Vec<NutrientValue>,
}

/// Contribution of one recipe line to the final mix.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeLineContribution {
    pub ingredient: String,
    /// Weight of this ingredient in the batch.
    pub quantity: Decimal,
    pub cost: Decimal,
    /// Nutrient contributions weighted by inclusion rate.
    pub nutrients: Vec<NutrientValue>,
}

/// Full contribution table for a recipe.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeBreakdown {
    pub lines: Vec<RecipeLineContribution>,
    pub total_cost: Decimal,
    /// Nutrient profile of the finished mix.
    pub nutrient_totals: Vec<NutrientValue>,
}

/// Compute the contribution table for a recipe at a given batch weight.
///
/// Each line contributes `batch_weight * inclusion_rate / 100` of its
/// ingredient; nutrient contributions are the composition values weighted
/// by the inclusion rate, so the totals describe the finished mix on the
/// same percentage scale as the inputs.
#[must_use]
pub fn recipe_breakdown(lines: &[RecipeLine], batch_weight: Decimal) -> RecipeBreakdown {
    let hundred = Decimal::from(100);
    let mut totals: BTreeMap<String, (String, Decimal)> = BTreeMap::new();
    let mut total_cost = Decimal::ZERO;

    let contributions = lines
        .iter()
        .map(|line| {
            let fraction = line.inclusion_rate / hundred;
            let quantity = batch_weight * fraction;
            let cost = quantity * line.cost_per_unit;
            total_cost += cost;

            let nutrients: Vec<NutrientValue> = line
                .composition
                .iter()
                .map(|n| {
                    let weighted = n.value * fraction;
                    let entry = totals
                        .entry(n.nutrient.to_lowercase())
                        .or_insert_with(|| (n.nutrient.clone(), Decimal::ZERO));
                    entry.1 += weighted;
                    NutrientValue {
                        nutrient: n.nutrient.clone(),
                        value: weighted,
                    }
                })
                .collect();

            RecipeLineContribution {
                ingredient: line.ingredient.clone(),
                quantity,
                cost,
                nutrients,
            }
        })
        .collect();

    RecipeBreakdown {
        lines: contributions,
        total_cost,
        nutrient_totals: totals
            .into_values()
            .map(|(nutrient, value)| NutrientValue { nutrient, value })
            .collect(),
    }
}

/// A nutrient requirement used for recommendation scoring.
#[derive(Debug, Clone)]
pub struct NutrientTarget {
    pub nutrient: &'static str,
    /// Minimum desirable percentage in a candidate ingredient.
    pub minimum: Decimal,
    /// Relative importance of this nutrient for the animal type.
    pub weight: Decimal,
}

/// An ingredient with its composition, as a scoring candidate.
#[derive(Debug, Clone)]
pub struct IngredientProfile {
    pub name: String,
    pub composition: Vec<NutrientValue>,
}

/// A scored recommendation for one ingredient.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientScore {
    pub ingredient: String,
    /// Weighted match score in `[0, 1]`.
    pub score: Decimal,
    /// Target nutrients the ingredient fully satisfies.
    pub matched: Vec<String>,
}

fn target(nutrient: &'static str, minimum: &str, weight: &str) -> NutrientTarget {
    NutrientTarget {
        nutrient,
        minimum: minimum.parse().unwrap_or(Decimal::ONE),
        weight: weight.parse().unwrap_or(Decimal::ONE),
    }
}

/// Nutrient requirements for an animal type.
///
/// Animal types are matched loosely on common names; anything unrecognized
/// gets a general-purpose profile, so the formulation handler always has
/// something to score against.
#[must_use]
pub fn target_profile(animal_type: &str) -> Vec<NutrientTarget> {
    let normalized = animal_type.to_lowercase();
    let is = |names: &[&str]| names.iter().any(|n| normalized.contains(n));

    if is(&["poultry", "chicken", "broiler", "layer"]) {
        vec![
            target("crude protein", "18", "0.5"),
            target("calcium", "1", "0.2"),
            target("lysine", "0.9", "0.2"),
            target("crude fat", "3", "0.1"),
        ]
    } else if is(&["cattle", "cow", "dairy", "ruminant"]) {
        vec![
            target("crude protein", "14", "0.4"),
            target("crude fiber", "15", "0.4"),
            target("calcium", "0.6", "0.2"),
        ]
    } else if is(&["pig", "swine", "hog"]) {
        vec![
            target("crude protein", "16", "0.5"),
            target("lysine", "0.8", "0.3"),
            target("crude fat", "3", "0.2"),
        ]
    } else if is(&["fish", "tilapia", "catfish", "aqua"]) {
        vec![
            target("crude protein", "30", "0.7"),
            target("crude fat", "5", "0.3"),
        ]
    } else {
        vec![
            target("crude protein", "16", "0.6"),
            target("crude fiber", "8", "0.2"),
            target("calcium", "0.5", "0.2"),
        ]
    }
}

/// Score candidate ingredients against an animal type's requirements.
///
/// Each target contributes `weight * min(value / minimum, 1)`; weights in a
/// profile sum to 1, so a perfect candidate scores 1. Returns candidates in
/// descending score order.
#[must_use]
pub fn recommend_ingredients(
    animal_type: &str,
    candidates: &[IngredientProfile],
) -> Vec<IngredientScore> {
    let targets = target_profile(animal_type);

    let mut scored: Vec<IngredientScore> = candidates
        .iter()
        .map(|candidate| {
            let mut score = Decimal::ZERO;
            let mut matched = Vec::new();

            for t in &targets {
                let value = candidate
                    .composition
                    .iter()
                    .find(|n| n.nutrient.eq_ignore_ascii_case(t.nutrient))
                    .map_or(Decimal::ZERO, |n| n.value);

                if t.minimum > Decimal::ZERO {
                    let ratio = (value / t.minimum).min(Decimal::ONE);
                    score += t.weight * ratio;
                    if ratio == Decimal::ONE {
                        matched.push(t.nutrient.to_owned());
                    }
                }
            }

            IngredientScore {
                ingredient: candidate.name.clone(),
                score,
                matched,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.ingredient.cmp(&b.ingredient)));
    scored
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn nv(nutrient: &str, value: &str) -> NutrientValue {
        NutrientValue {
            nutrient: nutrient.to_owned(),
            value: dec(value),
        }
    }

    #[test]
    fn test_average_composition() {
        let a = vec![nv("Crude Protein", "44"), nv("Crude Fat", "1.5")];
        let b = vec![nv("crude protein", "8.5")];
        let averages = average_composition(&[&a, &b]);

        let protein = averages
            .iter()
            .find(|avg| avg.nutrient.eq_ignore_ascii_case("crude protein"))
            .unwrap();
        assert_eq!(protein.average, dec("26.25"));
        assert_eq!(protein.samples, 2);

        let fat = averages
            .iter()
            .find(|avg| avg.nutrient == "Crude Fat")
            .unwrap();
        assert_eq!(fat.average, dec("1.5"));
        assert_eq!(fat.samples, 1);
    }

    #[test]
    fn test_average_composition_empty() {
        assert!(average_composition(&[]).is_empty());
    }

    #[test]
    fn test_recipe_breakdown_quantities_and_cost() {
        let lines = vec![
            RecipeLine {
                ingredient: "Maize".into(),
                inclusion_rate: dec("60"),
                cost_per_unit: dec("0.30"),
                composition: vec![nv("Crude Protein", "8.5")],
            },
            RecipeLine {
                ingredient: "Soybean Meal".into(),
                inclusion_rate: dec("40"),
                cost_per_unit: dec("0.55"),
                composition: vec![nv("Crude Protein", "44")],
            },
        ];

        let breakdown = recipe_breakdown(&lines, dec("100"));

        assert_eq!(breakdown.lines.len(), 2);
        assert_eq!(breakdown.lines[0].quantity, dec("60.00"));
        assert_eq!(breakdown.lines[0].cost, dec("18.0000"));
        assert_eq!(breakdown.lines[1].quantity, dec("40.00"));
        assert_eq!(breakdown.lines[1].cost, dec("22.0000"));
        assert_eq!(breakdown.total_cost, dec("40.0000"));

        // 0.6 * 8.5 + 0.4 * 44 = 22.7 percent protein in the mix
        let protein = breakdown
            .nutrient_totals
            .iter()
            .find(|n| n.nutrient == "Crude Protein")
            .unwrap();
        assert_eq!(protein.value, dec("22.70"));
    }

    #[test]
    fn test_target_profile_fallback() {
        let profile = target_profile("ostrich");
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_recommend_orders_by_score() {
        let candidates = vec![
            IngredientProfile {
                name: "Wheat Bran".into(),
                composition: vec![nv("Crude Protein", "15"), nv("Crude Fiber", "10")],
            },
            IngredientProfile {
                name: "Fishmeal".into(),
                composition: vec![
                    nv("Crude Protein", "60"),
                    nv("Calcium", "4"),
                    nv("Lysine", "4.5"),
                    nv("Crude Fat", "8"),
                ],
            },
        ];

        let ranked = recommend_ingredients("broiler chicken", &candidates);
        assert_eq!(ranked[0].ingredient, "Fishmeal");
        assert_eq!(ranked[0].score, Decimal::ONE);
        assert!(ranked[0].matched.iter().any(|m| m == "crude protein"));
        assert!(ranked[1].score < ranked[0].score);
    }

    #[test]
    fn test_recommend_missing_nutrient_scores_zero_for_it() {
        let candidates = vec![IngredientProfile {
            name: "Limestone".into(),
            composition: vec![nv("Calcium", "38")],
        }];

        let ranked = recommend_ingredients("layer", &candidates);
        // Only the calcium target (weight 0.2) is satisfied
        assert_eq!(ranked[0].score, dec("0.2"));
    }
}
