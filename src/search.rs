//! Name search over the catalog
//!
//! Ingredients and cocktails match on their name and any synonyms.

use std::collections::HashSet;
use std::iter;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Cocktail, Ingredient};

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("separator pattern is valid"));

/// Lowercase and collapse punctuation/whitespace runs to single spaces
pub fn normalize_search_text(text: &str) -> String {
    SEPARATORS
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Trimmed, non-empty synonyms with case-insensitive duplicates removed
pub fn normalize_synonyms(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty() && seen.insert(value.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Distinct normalized tokens across a name and its synonyms, in first-seen order
pub fn search_tokens<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for name in names {
        for token in normalize_search_text(name).split(' ') {
            if !token.is_empty() && seen.insert(token.to_string()) {
                tokens.push(token.to_string());
            }
        }
    }
    tokens
}

/// True when every query token is a prefix of some token of any of the names
pub fn matches_any<'a>(names: impl IntoIterator<Item = &'a str>, query: &str) -> bool {
    let query = normalize_search_text(query);
    if query.is_empty() {
        return true;
    }

    let tokens = search_tokens(names);
    query
        .split(' ')
        .all(|needle| tokens.iter().any(|token| token.starts_with(needle)))
}

pub fn matches_search(name: &str, query: &str) -> bool {
    matches_any(iter::once(name), query)
}

pub fn ingredient_matches(ingredient: &Ingredient, query: &str) -> bool {
    let names = iter::once(ingredient.name.as_str()).chain(ingredient.synonyms.iter().map(String::as_str));
    matches_any(names, query)
}

pub fn cocktail_matches(cocktail: &Cocktail, query: &str) -> bool {
    let names = iter::once(cocktail.name.as_str()).chain(cocktail.synonyms.iter().map(String::as_str));
    matches_any(names, query)
}
