// Availability guard rails exercised through the public API.

use std::collections::HashSet;

use anyhow::Result;
use barkeep::models::{InventorySnapshot, RawId, Substitute};
use barkeep::{
    AvailabilityOptions, Cocktail, CocktailIngredient, Ingredient, IngredientId, create_ingredient_lookup,
    is_recipe_ingredient_available, summarise_cocktail_availability,
};

fn owned(ids: &[IngredientId]) -> HashSet<IngredientId> {
    ids.iter().copied().collect()
}

fn brand_catalog() -> Vec<Ingredient> {
    vec![Ingredient::new(10, "Rum"), Ingredient::new(1, "Brand A").with_base(10)]
}

#[test]
fn optional_lines_ignore_stock() {
    let lookup = create_ingredient_lookup(&brand_catalog());
    let line = CocktailIngredient {
        optional: true,
        ..CocktailIngredient::of(10)
    };

    let stocks: [&[IngredientId]; 4] = [&[], &[1], &[10], &[99]];
    for stock in stocks {
        assert!(is_recipe_ingredient_available(
            &line,
            &owned(stock),
            &lookup,
            AvailabilityOptions::default()
        ));
    }
}

#[test]
fn garnish_lines_ignore_stock_by_default() {
    let lookup = create_ingredient_lookup(&brand_catalog());
    let line = CocktailIngredient {
        garnish: true,
        ..CocktailIngredient::of(10)
    };

    assert!(is_recipe_ingredient_available(
        &line,
        &owned(&[]),
        &lookup,
        AvailabilityOptions::default()
    ));
}

#[test]
fn brand_satisfies_base_request() {
    let lookup = create_ingredient_lookup(&brand_catalog());
    let line = CocktailIngredient {
        allow_brand_substitution: true,
        ..CocktailIngredient::of(10)
    };

    assert!(is_recipe_ingredient_available(
        &line,
        &owned(&[1]),
        &lookup,
        AvailabilityOptions::default()
    ));
}

#[test]
fn base_satisfies_brand_request() {
    let lookup = create_ingredient_lookup(&brand_catalog());
    let line = CocktailIngredient {
        allow_base_substitution: true,
        ..CocktailIngredient::of(1)
    };

    assert!(is_recipe_ingredient_available(
        &line,
        &owned(&[10]),
        &lookup,
        AvailabilityOptions::default()
    ));
}

#[test]
fn explicit_substitute_without_relation() {
    let lookup = create_ingredient_lookup(&brand_catalog());
    let line = CocktailIngredient {
        substitutes: vec![Substitute {
            id: Some(RawId::Int(7)),
            ..Substitute::default()
        }],
        ..CocktailIngredient::of(10)
    };

    assert!(is_recipe_ingredient_available(
        &line,
        &owned(&[7]),
        &lookup,
        AvailabilityOptions::default()
    ));
}

#[test]
fn fractional_line_id_is_not_truncated() -> Result<()> {
    let lookup = create_ingredient_lookup(&[Ingredient::new(2, "Gin")]);
    let cocktail: Cocktail = serde_json::from_str(
        r#"{"name": "Gin Neat", "ingredients": [
            {"ingredientId": 2.5, "name": "Gin"},
            {"ingredientId": 9, "name": "Ice", "substitutes": [{"ingredientId": 2.5}]}
        ]}"#,
    )?;

    for line in &cocktail.ingredients {
        assert!(!is_recipe_ingredient_available(
            line,
            &owned(&[2]),
            &lookup,
            AvailabilityOptions::default()
        ));
    }
    Ok(())
}

#[test]
fn lookup_tolerates_malformed_catalog_json() -> Result<()> {
    let snapshot: InventorySnapshot = serde_json::from_str(
        r#"{"ingredients": [
            {"id": -4, "name": "Negative"},
            {"id": "lime", "name": "Word"},
            {"id": 2.5, "name": "First"},
            {"id": 2, "name": "Second"}
        ]}"#,
    )?;

    let lookup = create_ingredient_lookup(&snapshot.ingredients);
    assert_eq!(lookup.ingredient_by_id.len(), 1);
    assert_eq!(lookup.name_of(2), Some("Second"));
    Ok(())
}

#[test]
fn empty_recipe_is_not_ready() {
    let cocktail = Cocktail {
        name: "Water".to_string(),
        ..Cocktail::default()
    };
    let summary =
        summarise_cocktail_availability(&cocktail, &owned(&[1]), None, None, AvailabilityOptions::default());

    assert!(!summary.is_ready);
    assert!(summary.ingredient_line.is_empty());
}

#[test]
fn missing_lines_format() {
    let catalog: Vec<_> = (1..=4).map(|id| Ingredient::new(id, format!("Item {}", id))).collect();
    let lookup = create_ingredient_lookup(&catalog);
    let cocktail = |ids: &[IngredientId]| Cocktail {
        name: "Test".to_string(),
        ingredients: ids.iter().map(|id| CocktailIngredient::of(*id).named(format!("Item {}", id))).collect(),
        ..Cocktail::default()
    };

    let one_missing = summarise_cocktail_availability(
        &cocktail(&[1, 2]),
        &owned(&[1]),
        Some(&lookup),
        None,
        AvailabilityOptions::default(),
    );
    assert_eq!(one_missing.ingredient_line, "Missing: Item 2");

    let three_missing = summarise_cocktail_availability(
        &cocktail(&[1, 2, 3, 4]),
        &owned(&[1]),
        Some(&lookup),
        None,
        AvailabilityOptions::default(),
    );
    assert_eq!(three_missing.missing_count, 3);
    assert_eq!(three_missing.ingredient_line, "Missing: 3 ingredients");
}

#[test]
fn unnamed_missing_line_reports_plural_count() {
    let cocktail = Cocktail {
        name: "Mystery".to_string(),
        ingredients: vec![CocktailIngredient::of(404)],
        ..Cocktail::default()
    };
    let summary =
        summarise_cocktail_availability(&cocktail, &owned(&[]), None, None, AvailabilityOptions::default());

    assert_eq!(summary.missing_count, 1);
    assert_eq!(summary.ingredient_line, "Missing: 1 ingredients");
}
