//! barkeep
//!
//! Home bar inventory and cocktail availability planner: decides which
//! cocktails can be mixed from the ingredients on hand, allowing for base,
//! brand and declared substitutes.

pub mod availability;
pub mod db;
pub mod import;
pub mod lookup;
pub mod models;
pub mod search;
pub mod summary;
pub mod tags;

pub use availability::{is_recipe_ingredient_available, resolve_ingredient_availability};
pub use lookup::{IngredientLookup, create_ingredient_lookup};
pub use models::{AvailabilityOptions, Cocktail, CocktailIngredient, Ingredient, IngredientId};
pub use summary::{CocktailSummary, is_cocktail_ready, summarise_cocktail_availability};
