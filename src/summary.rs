//! Cocktail-level availability: summaries, readiness and purchase planning

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::availability::{
    self, IngredientResolution, base_candidates, brand_candidates, declared_candidates,
    is_exempt, resolve_ingredient_availability,
};
use crate::lookup::IngredientLookup;
use crate::models::{AvailabilityOptions, Cocktail, CocktailIngredient, Ingredient, IngredientId};

/// More missing lines than this and names are replaced by a count
const MAX_NAMED_MISSING: usize = 2;

/// Availability of one cocktail against the owned ingredients
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CocktailSummary {
    pub missing_count: usize,
    pub missing_names: Vec<String>,
    /// Every named line of the recipe, in recipe order
    pub recipe_names: Vec<String>,
    /// Names of the ingredients that satisfied the required lines
    pub resolved_names: Vec<String>,
    pub is_ready: bool,
    pub ingredient_line: String,
}

impl fmt::Display for CocktailSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ingredient_line)
    }
}

pub fn required_lines(
    cocktail: &Cocktail,
    options: AvailabilityOptions,
) -> impl Iterator<Item = &CocktailIngredient> {
    cocktail
        .ingredients
        .iter()
        .filter(move |line| !is_exempt(line, options))
}

/// Summarise how close a cocktail is to being mixable
///
/// When no lookup is given one is built from `ingredients`. A recipe with no
/// required lines is never ready.
pub fn summarise_cocktail_availability(
    cocktail: &Cocktail,
    available_ids: &HashSet<IngredientId>,
    lookup: Option<&IngredientLookup>,
    ingredients: Option<&[Ingredient]>,
    options: AvailabilityOptions,
) -> CocktailSummary {
    let lookup = match lookup {
        Some(lookup) => Cow::Borrowed(lookup),
        None => Cow::Owned(IngredientLookup::new(ingredients.unwrap_or_default())),
    };

    let required: Vec<_> = required_lines(cocktail, options).collect();
    if required.is_empty() {
        return CocktailSummary::default();
    }

    let recipe_names = cocktail
        .ingredients
        .iter()
        .filter_map(CocktailIngredient::display_name)
        .map(str::to_string)
        .collect();

    let mut missing_count = 0;
    let mut missing_names = Vec::new();
    let mut resolved_names = Vec::new();

    for line in required {
        if availability::is_recipe_ingredient_available(line, available_ids, &lookup, options) {
            let resolution = resolve_ingredient_availability(line, available_ids, &lookup, options);
            if !resolution.resolved_name.is_empty() {
                resolved_names.push(resolution.resolved_name);
            }
            continue;
        }

        missing_count += 1;
        let name = line
            .display_name()
            .or_else(|| line.requested_id().and_then(|id| lookup.name_of(id)));
        if let Some(name) = name {
            missing_names.push(name.to_string());
        }
    }

    let ingredient_line = format_ingredient_line(missing_count, &missing_names, &resolved_names);

    CocktailSummary {
        missing_count,
        missing_names,
        recipe_names,
        resolved_names,
        is_ready: missing_count == 0,
        ingredient_line,
    }
}

pub fn is_cocktail_ready(
    cocktail: &Cocktail,
    available_ids: &HashSet<IngredientId>,
    lookup: Option<&IngredientLookup>,
    ingredients: Option<&[Ingredient]>,
    options: AvailabilityOptions,
) -> bool {
    summarise_cocktail_availability(cocktail, available_ids, lookup, ingredients, options).is_ready
}

/// Human readable status line for list rows
pub fn format_ingredient_line(
    missing_count: usize,
    missing_names: &[String],
    resolved_names: &[String],
) -> String {
    if missing_count == 0 {
        return resolved_names.join(", ");
    }

    let names_known = missing_names.len() == missing_count;
    if missing_count > MAX_NAMED_MISSING || !names_known {
        return format!("Missing: {} ingredients", missing_count);
    }

    format!("Missing: {}", missing_names.join(", "))
}

/// Per-line resolution details for one cocktail, in recipe order
pub fn check_cocktail(
    cocktail: &Cocktail,
    available_ids: &HashSet<IngredientId>,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> Vec<(CocktailIngredient, IngredientResolution)> {
    cocktail
        .ingredients
        .iter()
        .map(|line| {
            let resolution = resolve_ingredient_availability(line, available_ids, lookup, options);
            (line.clone(), resolution)
        })
        .collect()
}

/// Format a cocktail check as a readable report
pub fn format_cocktail_check(
    cocktail: &Cocktail,
    lines: &[(CocktailIngredient, IngredientResolution)],
) -> String {
    let mut output = format!("{}\n", cocktail.name);

    for (line, resolution) in lines {
        let marker = if resolution.is_available {
            "+"
        } else if resolution.is_considered_available {
            "~"
        } else {
            "-"
        };

        let mut flags = Vec::new();
        if line.optional {
            flags.push("optional");
        }
        if line.garnish {
            flags.push("garnish");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        let amount = line
            .amount
            .as_deref()
            .map(|amount| format!("{} ", amount.trim()))
            .unwrap_or_default();
        let requested = resolution
            .substitute_for
            .as_deref()
            .unwrap_or(&resolution.resolved_name);

        output.push_str(&format!("  {} {}{}{}", marker, amount, requested, flags));

        if let (Some(source), Some(_)) = (resolution.source, &resolution.substitute_for) {
            output.push_str(&format!(" -> {} ({})", resolution.resolved_name, source));
        }
        output.push('\n');

        if !resolution.is_considered_available {
            let options: Vec<&str> = resolution
                .substitutes
                .base
                .iter()
                .chain(&resolution.substitutes.branded)
                .chain(&resolution.substitutes.declared)
                .map(|option| option.name.as_str())
                .collect();
            if !options.is_empty() {
                output.push_str(&format!("      could use: {}\n", options.join(", ")));
            }
        }
    }

    output
}

/// An ingredient that would complete one or more cocktails
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseGroup {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub is_branded: bool,
    pub cocktails: Vec<String>,
}

/// Group cocktails that miss exactly one required line by what would fix them
///
/// Every catalog-known candidate of the missing line forms a group. Groups
/// unlocking more cocktails come first, ties broken by name.
pub fn plan_purchases(
    cocktails: &[Cocktail],
    available_ids: &HashSet<IngredientId>,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> Vec<PurchaseGroup> {
    let mut groups: HashMap<IngredientId, PurchaseGroup> = HashMap::new();

    for cocktail in cocktails {
        let missing: Vec<_> = required_lines(cocktail, options)
            .filter(|line| {
                !availability::is_recipe_ingredient_available(*line, available_ids, lookup, options)
            })
            .collect();

        let [line] = missing.as_slice() else {
            continue;
        };

        let candidates = line
            .requested_id()
            .into_iter()
            .chain(base_candidates(line, lookup, options))
            .chain(brand_candidates(line, lookup, options))
            .chain(declared_candidates(line));

        let mut seen = HashSet::new();
        for id in candidates.filter(|id| seen.insert(*id)) {
            let Some(record) = lookup.get(id) else {
                continue;
            };

            let group = groups.entry(id).or_insert_with(|| PurchaseGroup {
                ingredient_id: id,
                name: record.name.trim().to_string(),
                is_branded: record.is_branded(),
                cocktails: Vec::new(),
            });
            if !group.cocktails.contains(&cocktail.name) {
                group.cocktails.push(cocktail.name.clone());
            }
        }
    }

    let mut planned: Vec<_> = groups.into_values().collect();
    planned.sort_by(|a, b| {
        b.cocktails
            .len()
            .cmp(&a.cocktails.len())
            .then_with(|| a.name.cmp(&b.name))
    });
    planned
}
