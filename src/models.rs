//! Data models for the bar catalog, recipes and inventory snapshots

use serde::{Deserialize, Serialize};

use crate::tags::{TagId, normalize_tag_ids};

pub type IngredientId = i64;

/// Identifier as it appears in catalog data.
///
/// Catalog files are hand-edited and exported from older app versions, so ids
/// show up as integers, floats or strings. Catalog records use
/// [`RawId::normalize`] (any form, truncated); recipe lines and substitutes use
/// the stricter [`RawId::numeric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    /// Truncated non-negative id, or `None` for negative, non-finite or non-numeric values
    pub fn normalize(&self) -> Option<IngredientId> {
        match self {
            RawId::Int(value) => (*value >= 0).then_some(*value),
            RawId::Float(value) => normalize_float(*value),
            RawId::Text(text) => text.trim().parse::<f64>().ok().and_then(normalize_float),
        }
    }

    /// Exact id given as a JSON number; text and fractional values never match
    pub fn numeric(&self) -> Option<IngredientId> {
        match self {
            RawId::Int(value) => (*value >= 0).then_some(*value),
            RawId::Float(value) if value.fract() == 0.0 => normalize_float(*value),
            RawId::Float(_) | RawId::Text(_) => None,
        }
    }
}

fn normalize_float(value: f64) -> Option<IngredientId> {
    if !value.is_finite() || value < 0.0 || value > i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as IngredientId)
}

pub fn normalize_id(raw: Option<&RawId>) -> Option<IngredientId> {
    raw.and_then(RawId::normalize)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ingredient_id: Option<RawId>, // Generic ingredient this one is a brand of
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RawId>, // Built-in ingredient tag ids
}

impl Ingredient {
    pub fn new(id: IngredientId, name: impl Into<String>) -> Self {
        Self {
            id: Some(RawId::Int(id)),
            name: name.into(),
            description: None,
            base_ingredient_id: None,
            synonyms: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_base(mut self, base_id: IngredientId) -> Self {
        self.base_ingredient_id = Some(RawId::Int(base_id));
        self
    }

    pub fn normalized_id(&self) -> Option<IngredientId> {
        normalize_id(self.id.as_ref())
    }

    pub fn base_id(&self) -> Option<IngredientId> {
        normalize_id(self.base_ingredient_id.as_ref())
    }

    pub fn is_branded(&self) -> bool {
        self.base_id().is_some()
    }

    pub fn tag_ids(&self) -> Vec<TagId> {
        normalize_tag_ids(&self.tags)
    }
}

/// An explicit substitute declared on a recipe line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<RawId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Substitute {
    pub fn of(id: IngredientId) -> Self {
        Self {
            ingredient_id: Some(RawId::Int(id)),
            ..Self::default()
        }
    }

    /// `ingredientId` wins over `id` when both are present
    pub fn target_id(&self) -> Option<IngredientId> {
        match &self.ingredient_id {
            Some(raw) => raw.numeric(),
            None => self.id.as_ref().and_then(RawId::numeric),
        }
    }
}

/// One row of a cocktail's ingredient list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CocktailIngredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<RawId>, // None for free-text lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub optional: bool,
    pub garnish: bool,
    pub allow_base_substitution: bool,
    pub allow_brand_substitution: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub substitutes: Vec<Substitute>,
}

impl CocktailIngredient {
    pub fn of(id: IngredientId) -> Self {
        Self {
            ingredient_id: Some(RawId::Int(id)),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn requested_id(&self) -> Option<IngredientId> {
        self.ingredient_id.as_ref().and_then(RawId::numeric)
    }

    /// Trimmed line name, `None` when blank
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cocktail {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RawId>, // Built-in cocktail tag ids
    #[serde(default)]
    pub ingredients: Vec<CocktailIngredient>,
}

impl Cocktail {
    pub fn normalized_id(&self) -> Option<IngredientId> {
        normalize_id(self.id.as_ref())
    }

    pub fn tag_ids(&self) -> Vec<TagId> {
        normalize_tag_ids(&self.tags)
    }
}

/// Knobs that change how recipe lines are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityOptions {
    pub ignore_garnish: bool,
    pub allow_all_substitutes: bool,
}

impl Default for AvailabilityOptions {
    fn default() -> Self {
        Self {
            ignore_garnish: true,
            allow_all_substitutes: false,
        }
    }
}

/// Import/export document: the whole catalog in one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub cocktails: Vec<Cocktail>,
}
