//! Ingredient lookup index
//!
//! A derived view over the catalog, rebuilt whenever the catalog changes.
//! Resolution code treats it as an immutable snapshot.

use std::collections::HashMap;

use tracing::trace;

use crate::models::{Ingredient, IngredientId};

#[derive(Debug, Clone, Default)]
pub struct IngredientLookup {
    pub ingredient_by_id: HashMap<IngredientId, Ingredient>,
    /// Base id -> ids of the ingredients declaring it as their base, in catalog order
    pub brands_by_base_id: HashMap<IngredientId, Vec<IngredientId>>,
}

impl IngredientLookup {
    /// Build the index in a single pass over the catalog
    ///
    /// Records without a valid id are skipped. A repeated id replaces the
    /// earlier record but its brand registration stays.
    pub fn new(ingredients: &[Ingredient]) -> Self {
        let mut lookup = Self::default();

        for item in ingredients {
            let Some(id) = item.normalized_id() else {
                trace!(name = %item.name, "skipping ingredient without a valid id");
                continue;
            };

            lookup.ingredient_by_id.insert(id, item.clone());

            if let Some(base_id) = item.base_id() {
                lookup.brands_by_base_id.entry(base_id).or_default().push(id);
            }
        }

        lookup
    }

    pub fn get(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredient_by_id.get(&id)
    }

    pub fn brands_of(&self, base_id: IngredientId) -> &[IngredientId] {
        self.brands_by_base_id
            .get(&base_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Base id of a catalog record, if the record exists and declares one
    pub fn base_of(&self, id: IngredientId) -> Option<IngredientId> {
        self.get(id).and_then(Ingredient::base_id)
    }

    /// Trimmed catalog name, `None` for unknown ids or blank names
    pub fn name_of(&self, id: IngredientId) -> Option<&str> {
        self.get(id)
            .map(|item| item.name.trim())
            .filter(|name| !name.is_empty())
    }
}

pub fn create_ingredient_lookup(ingredients: &[Ingredient]) -> IngredientLookup {
    IngredientLookup::new(ingredients)
}
