//! Nutrition aggregate calculations as the admin calculator and the chat
//! formulation handler consume them.

use rust_decimal::Decimal;

use harvestline_core::nutrition::{
    IngredientProfile, NutrientValue, RecipeLine, average_composition, recipe_breakdown,
    recommend_ingredients,
};

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

fn nv(nutrient: &str, value: &str) -> NutrientValue {
    NutrientValue {
        nutrient: nutrient.to_owned(),
        value: dec(value),
    }
}

// =============================================================================
// Averages
// =============================================================================

#[test]
fn test_averages_merge_case_insensitively() {
    let soybean = vec![nv("Crude Protein", "46"), nv("Crude Fat", "1.5")];
    let maize = vec![nv("crude protein", "8.5"), nv("Crude Fiber", "2.2")];

    let averages = average_composition(&[&soybean, &maize]);

    let protein = averages
        .iter()
        .find(|a| a.nutrient.eq_ignore_ascii_case("crude protein"))
        .expect("protein averaged");
    assert_eq!(protein.average, dec("27.25"));
    assert_eq!(protein.samples, 2);

    // Nutrients declared by only one ingredient keep a sample count of 1
    let fiber = averages
        .iter()
        .find(|a| a.nutrient == "Crude Fiber")
        .expect("fiber averaged");
    assert_eq!(fiber.average, dec("2.2"));
    assert_eq!(fiber.samples, 1);
}

#[test]
fn test_averages_output_is_sorted() {
    let composition = vec![nv("zinc", "0.1"), nv("calcium", "1"), nv("lysine", "0.9")];
    let averages = average_composition(&[&composition]);
    let names: Vec<_> = averages.iter().map(|a| a.nutrient.as_str()).collect();
    assert_eq!(names, ["calcium", "lysine", "zinc"]);
}

// =============================================================================
// Recipe breakdown
// =============================================================================

#[test]
fn test_recipe_conserves_weight_and_cost() {
    let lines = vec![
        RecipeLine {
            ingredient: "Maize".into(),
            inclusion_rate: dec("55"),
            cost_per_unit: dec("0.25"),
            composition: vec![nv("Crude Protein", "8.5")],
        },
        RecipeLine {
            ingredient: "Soybean Meal".into(),
            inclusion_rate: dec("35"),
            cost_per_unit: dec("0.57"),
            composition: vec![nv("Crude Protein", "46")],
        },
        RecipeLine {
            ingredient: "Limestone".into(),
            inclusion_rate: dec("10"),
            cost_per_unit: dec("0.08"),
            composition: vec![nv("Calcium", "38")],
        },
    ];

    let breakdown = recipe_breakdown(&lines, dec("1000"));

    let total_weight: Decimal = breakdown.lines.iter().map(|l| l.quantity).sum();
    assert_eq!(total_weight, dec("1000.00"));

    let summed_cost: Decimal = breakdown.lines.iter().map(|l| l.cost).sum();
    assert_eq!(breakdown.total_cost, summed_cost);

    let protein = breakdown
        .nutrient_totals
        .iter()
        .find(|n| n.nutrient == "Crude Protein")
        .expect("protein total");
    // 0.55 * 8.5 + 0.35 * 46 = 20.775 percent in the finished mix
    assert_eq!(protein.value, dec("20.775"));
}

#[test]
fn test_recipe_line_nutrients_scale_with_inclusion() {
    let lines = vec![RecipeLine {
        ingredient: "Fish Meal".into(),
        inclusion_rate: dec("20"),
        cost_per_unit: dec("1.10"),
        composition: vec![nv("Crude Protein", "65")],
    }];

    let breakdown = recipe_breakdown(&lines, dec("500"));
    assert_eq!(breakdown.lines[0].quantity, dec("100.0"));
    assert_eq!(breakdown.lines[0].nutrients[0].value, dec("13.0"));
}

// =============================================================================
// Recommendations
// =============================================================================

#[test]
fn test_recommendations_rank_protein_sources_for_fish() {
    let candidates = vec![
        IngredientProfile {
            name: "Maize".into(),
            composition: vec![nv("Crude Protein", "8.5"), nv("Crude Fat", "3.8")],
        },
        IngredientProfile {
            name: "Fish Meal".into(),
            composition: vec![nv("Crude Protein", "65"), nv("Crude Fat", "9")],
        },
    ];

    let ranked = recommend_ingredients("tilapia", &candidates);
    assert_eq!(ranked[0].ingredient, "Fish Meal");
    assert_eq!(ranked[0].score, Decimal::ONE);
    assert!(ranked[1].score < Decimal::ONE);
}

#[test]
fn test_unknown_animal_still_gets_a_ranking() {
    let candidates = vec![IngredientProfile {
        name: "Soybean Meal".into(),
        composition: vec![nv("Crude Protein", "46")],
    }];

    let ranked = recommend_ingredients("camel", &candidates);
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].score > Decimal::ZERO);
}

#[test]
fn test_ties_break_alphabetically() {
    let candidates = vec![
        IngredientProfile {
            name: "Blend B".into(),
            composition: vec![nv("Crude Protein", "30")],
        },
        IngredientProfile {
            name: "Blend A".into(),
            composition: vec![nv("Crude Protein", "30")],
        },
    ];

    let ranked = recommend_ingredients("poultry", &candidates);
    assert_eq!(ranked[0].ingredient, "Blend A");
    assert_eq!(ranked[0].score, ranked[1].score);
}
