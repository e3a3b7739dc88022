//! Ingredient availability resolution
//!
//! Decides whether a recipe line can be satisfied from the ingredients a user
//! owns. Candidates come from independent tiers:
//!
//! - requested: the line's own ingredient
//! - base: the generic ingredient behind a requested brand
//! - brand: sibling brands of the requested brand's base, plus any brands
//!   registered under the requested ingredient itself
//! - declared: the line's explicit substitutes
//!
//! A line is available when any candidate is owned.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use crate::lookup::IngredientLookup;
use crate::models::{AvailabilityOptions, CocktailIngredient, IngredientId};

const UNKNOWN_INGREDIENT: &str = "Unknown ingredient";

/// Which tier produced the ingredient that satisfied a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Requested,
    Base,
    Brand,
    Declared,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionSource::Requested => "requested",
            ResolutionSource::Base => "base",
            ResolutionSource::Brand => "brand",
            ResolutionSource::Declared => "declared",
        };
        f.write_str(label)
    }
}

/// Line flags after `allow_all_substitutes` is folded in
#[derive(Debug, Clone, Copy)]
struct Permissions {
    allow_base: bool,
    allow_brand: bool,
}

impl Permissions {
    fn for_line(line: &CocktailIngredient, options: AvailabilityOptions) -> Self {
        Self {
            allow_base: line.allow_base_substitution || options.allow_all_substitutes,
            allow_brand: line.allow_brand_substitution || options.allow_all_substitutes,
        }
    }
}

/// Optional lines, and garnishes when garnishes are ignored, never block a recipe
pub fn is_exempt(line: &CocktailIngredient, options: AvailabilityOptions) -> bool {
    line.optional || (options.ignore_garnish && line.garnish)
}

pub fn base_candidates(
    line: &CocktailIngredient,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> Vec<IngredientId> {
    let permissions = Permissions::for_line(line, options);
    line.requested_id()
        .and_then(|id| lookup.base_of(id))
        .filter(|_| permissions.allow_base)
        .into_iter()
        .collect()
}

/// Sibling brands (flag-gated) followed by brands of the requested id (always)
pub fn brand_candidates(
    line: &CocktailIngredient,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> Vec<IngredientId> {
    let Some(requested) = line.requested_id() else {
        return Vec::new();
    };
    let permissions = Permissions::for_line(line, options);

    let siblings = lookup
        .base_of(requested)
        .filter(|_| permissions.allow_brand)
        .map(|base_id| lookup.brands_of(base_id))
        .unwrap_or_default();

    let mut seen = HashSet::new();
    siblings
        .iter()
        .chain(lookup.brands_of(requested))
        .copied()
        .filter(|id| *id != requested && seen.insert(*id))
        .collect()
}

pub fn declared_candidates(line: &CocktailIngredient) -> Vec<IngredientId> {
    let mut seen = HashSet::new();
    line.substitutes
        .iter()
        .filter_map(|substitute| substitute.target_id())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Every ingredient id that would satisfy the line
pub fn candidate_ids(
    line: &CocktailIngredient,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> HashSet<IngredientId> {
    let mut candidates: HashSet<IngredientId> = line.requested_id().into_iter().collect();
    candidates.extend(base_candidates(line, lookup, options));
    candidates.extend(brand_candidates(line, lookup, options));
    candidates.extend(declared_candidates(line));
    candidates
}

/// Whether a recipe line is satisfied by the owned ingredients
///
/// Absent and exempt lines count as available. Unknown ids simply fail to
/// widen the candidate set.
pub fn is_recipe_ingredient_available<'a>(
    line: impl Into<Option<&'a CocktailIngredient>>,
    available_ids: &HashSet<IngredientId>,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> bool {
    let Some(line) = line.into() else {
        return true;
    };
    if is_exempt(line, options) {
        return true;
    }

    let candidates = candidate_ids(line, lookup, options);
    trace!(requested = ?line.requested_id(), candidates = candidates.len(), "resolving line");
    candidates.iter().any(|id| available_ids.contains(id))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstituteOption {
    pub id: Option<IngredientId>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstituteLists {
    pub base: Vec<SubstituteOption>,
    pub branded: Vec<SubstituteOption>,
    pub declared: Vec<SubstituteOption>,
}

impl SubstituteLists {
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.branded.is_empty() && self.declared.is_empty()
    }

    fn without(mut self, id: IngredientId) -> Self {
        for list in [&mut self.base, &mut self.branded, &mut self.declared] {
            list.retain(|option| option.id != Some(id));
        }
        self
    }
}

/// Detailed outcome for one recipe line
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientResolution {
    pub resolved_id: Option<IngredientId>,
    pub resolved_name: String,
    pub source: Option<ResolutionSource>,
    /// Requested name when a substitute stands in for it
    pub substitute_for: Option<String>,
    pub is_available: bool,
    pub is_considered_available: bool,
    pub missing_name: Option<String>,
    pub substitutes: SubstituteLists,
}

/// Resolve a line to the ingredient that satisfies it, if any
///
/// Tiers are tried in order requested, base, brand, declared; within a tier
/// catalog order wins. `is_available` agrees with
/// [`is_recipe_ingredient_available`] for non-exempt lines.
pub fn resolve_ingredient_availability(
    line: &CocktailIngredient,
    available_ids: &HashSet<IngredientId>,
    lookup: &IngredientLookup,
    options: AvailabilityOptions,
) -> IngredientResolution {
    let requested_id = line.requested_id();
    let requested_name = requested_id
        .and_then(|id| lookup.name_of(id))
        .or_else(|| line.display_name())
        .unwrap_or_default()
        .to_string();

    let base_ids = base_candidates(line, lookup, options);
    let brand_ids = brand_candidates(line, lookup, options);
    let declared_ids = declared_candidates(line);

    let order = requested_id
        .map(|id| (id, ResolutionSource::Requested))
        .into_iter()
        .chain(base_ids.iter().map(|id| (*id, ResolutionSource::Base)))
        .chain(brand_ids.iter().map(|id| (*id, ResolutionSource::Brand)))
        .chain(declared_ids.iter().map(|id| (*id, ResolutionSource::Declared)));

    let resolved = order
        .into_iter()
        .find(|(id, _)| available_ids.contains(id));

    let option_for = |id: IngredientId, fallback: Option<&str>| SubstituteOption {
        id: Some(id),
        name: lookup
            .name_of(id)
            .or(fallback)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_INGREDIENT)
            .to_string(),
    };

    let substitutes = SubstituteLists {
        base: base_ids
            .iter()
            .map(|id| option_for(*id, Some(requested_name.as_str())))
            .collect(),
        branded: brand_ids.iter().map(|id| option_for(*id, None)).collect(),
        declared: line
            .substitutes
            .iter()
            .map(|substitute| {
                let fallback = substitute
                    .name
                    .as_deref()
                    .map(str::trim)
                    .or(Some(requested_name.as_str()));
                match substitute.target_id() {
                    Some(id) => option_for(id, fallback),
                    None => SubstituteOption {
                        id: None,
                        name: fallback
                            .filter(|name| !name.is_empty())
                            .unwrap_or(UNKNOWN_INGREDIENT)
                            .to_string(),
                    },
                }
            })
            .collect(),
    };

    let is_available = resolved.is_some();
    let is_considered_available = is_available || is_exempt(line, options);
    let missing_name = (!is_considered_available && !requested_name.is_empty())
        .then(|| requested_name.clone());

    match resolved {
        Some((id, ResolutionSource::Requested)) => IngredientResolution {
            resolved_id: Some(id),
            resolved_name: requested_name,
            source: Some(ResolutionSource::Requested),
            substitute_for: None,
            is_available,
            is_considered_available,
            missing_name,
            substitutes: SubstituteLists::default(),
        },
        Some((id, source)) => IngredientResolution {
            resolved_id: Some(id),
            resolved_name: lookup
                .name_of(id)
                .map(str::to_string)
                .unwrap_or_else(|| requested_name.clone()),
            source: Some(source),
            substitute_for: Some(requested_name),
            is_available,
            is_considered_available,
            missing_name,
            substitutes: substitutes.without(id),
        },
        None => IngredientResolution {
            resolved_id: None,
            resolved_name: requested_name,
            source: None,
            substitute_for: None,
            is_available,
            is_considered_available,
            missing_name,
            substitutes,
        },
    }
}
