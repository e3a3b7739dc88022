//! Database schema and operations

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{
    AvailabilityOptions, Cocktail, CocktailIngredient, Ingredient, IngredientId, RawId, Substitute,
};
use crate::search::normalize_synonyms;
use crate::tags::TagId;

/// Highest star rating a cocktail can have
pub const MAX_RATING: u8 = 5;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Ingredient catalog
        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            base_ingredient_id INTEGER
        );

        CREATE TABLE IF NOT EXISTS cocktails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            instructions TEXT
        );

        -- Recipe lines, ordered by position within a cocktail
        CREATE TABLE IF NOT EXISTS cocktail_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cocktail_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            ingredient_id INTEGER,
            name TEXT,
            amount TEXT,
            optional INTEGER NOT NULL DEFAULT 0,
            garnish INTEGER NOT NULL DEFAULT 0,
            allow_base_substitution INTEGER NOT NULL DEFAULT 0,
            allow_brand_substitution INTEGER NOT NULL DEFAULT 0
        );

        -- Explicit substitutes declared on a recipe line
        CREATE TABLE IF NOT EXISTS cocktail_substitutes (
            line_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            ingredient_id INTEGER,
            name TEXT,
            PRIMARY KEY (line_id, position)
        );

        -- Alternative names and built-in tag ids
        CREATE TABLE IF NOT EXISTS ingredient_synonyms (
            ingredient_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            synonym TEXT NOT NULL,
            PRIMARY KEY (ingredient_id, position)
        );

        CREATE TABLE IF NOT EXISTS cocktail_synonyms (
            cocktail_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            synonym TEXT NOT NULL,
            PRIMARY KEY (cocktail_id, position)
        );

        CREATE TABLE IF NOT EXISTS ingredient_tags (
            ingredient_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (ingredient_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS cocktail_tags (
            cocktail_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (cocktail_id, tag_id)
        );

        -- User inventory state
        CREATE TABLE IF NOT EXISTS owned_ingredients (
            ingredient_id INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS shopping_ingredients (
            ingredient_id INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS cocktail_ratings (
            cocktail_id INTEGER PRIMARY KEY,
            rating INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_ingredients_base ON ingredients(base_ingredient_id);
        CREATE INDEX IF NOT EXISTS idx_cocktail_ingredients_cocktail ON cocktail_ingredients(cocktail_id);
        "#,
    )?;
    Ok(())
}

/// Insert or replace a catalog ingredient; returns false when its id is unusable
pub fn upsert_ingredient(conn: &Connection, ingredient: &Ingredient) -> Result<bool> {
    let Some(id) = ingredient.normalized_id() else {
        return Ok(false);
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR REPLACE INTO ingredients (id, name, description, base_ingredient_id)
         VALUES (?1, ?2, ?3, ?4)",
        (
            id,
            ingredient.name.trim(),
            &ingredient.description,
            ingredient.base_id(),
        ),
    )?;
    replace_labels(&tx, Owner::Ingredient, id, &ingredient.synonyms, &ingredient.tag_ids())?;
    tx.commit()?;
    Ok(true)
}

/// Records that carry synonyms and tags
#[derive(Debug, Clone, Copy)]
enum Owner {
    Ingredient,
    Cocktail,
}

impl Owner {
    /// (synonym table, tag table, owner column)
    fn tables(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Owner::Ingredient => ("ingredient_synonyms", "ingredient_tags", "ingredient_id"),
            Owner::Cocktail => ("cocktail_synonyms", "cocktail_tags", "cocktail_id"),
        }
    }
}

fn replace_labels(
    conn: &Connection,
    owner: Owner,
    id: IngredientId,
    synonyms: &[String],
    tags: &[TagId],
) -> Result<()> {
    let (synonym_table, tag_table, column) = owner.tables();
    conn.execute(&format!("DELETE FROM {} WHERE {} = ?1", synonym_table, column), [id])?;
    conn.execute(&format!("DELETE FROM {} WHERE {} = ?1", tag_table, column), [id])?;

    let mut insert_synonym = conn.prepare(&format!(
        "INSERT INTO {} ({}, position, synonym) VALUES (?1, ?2, ?3)",
        synonym_table, column
    ))?;
    for (position, synonym) in normalize_synonyms(synonyms).iter().enumerate() {
        insert_synonym.execute((id, position as i64, synonym))?;
    }

    let mut insert_tag = conn.prepare(&format!(
        "INSERT OR IGNORE INTO {} ({}, tag_id) VALUES (?1, ?2)",
        tag_table, column
    ))?;
    for tag_id in tags {
        insert_tag.execute((id, tag_id))?;
    }
    Ok(())
}

fn load_synonyms(conn: &Connection, owner: Owner, id: IngredientId) -> Result<Vec<String>> {
    let (synonym_table, _, column) = owner.tables();
    let mut stmt = conn.prepare(&format!(
        "SELECT synonym FROM {} WHERE {} = ?1 ORDER BY position",
        synonym_table, column
    ))?;

    let rows = stmt.query_map([id], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn load_tags(conn: &Connection, owner: Owner, id: IngredientId) -> Result<Vec<RawId>> {
    let (_, tag_table, column) = owner.tables();
    let mut stmt = conn.prepare(&format!(
        "SELECT tag_id FROM {} WHERE {} = ?1 ORDER BY tag_id",
        tag_table, column
    ))?;

    let rows = stmt.query_map([id], |row| row.get::<_, TagId>(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(RawId::Int(row?));
    }
    Ok(results)
}

/// Insert a cocktail with its lines, substitutes, synonyms and tags
///
/// A cocktail carrying a valid id replaces the stored one; otherwise a fresh
/// id is assigned. Returns the stored id. Nothing is written if any part fails.
pub fn insert_cocktail(conn: &Connection, cocktail: &Cocktail) -> Result<IngredientId> {
    let tx = conn.unchecked_transaction()?;
    let conn: &Connection = &tx;

    let id = match cocktail.normalized_id() {
        Some(id) => {
            delete_cocktail_lines(conn, id)?;
            conn.execute(
                "INSERT OR REPLACE INTO cocktails (id, name, instructions) VALUES (?1, ?2, ?3)",
                (id, cocktail.name.trim(), &cocktail.instructions),
            )?;
            id
        }
        None => {
            conn.execute(
                "INSERT INTO cocktails (name, instructions) VALUES (?1, ?2)",
                (cocktail.name.trim(), &cocktail.instructions),
            )?;
            conn.last_insert_rowid()
        }
    };

    for (position, line) in cocktail.ingredients.iter().enumerate() {
        conn.execute(
            "INSERT INTO cocktail_ingredients (
                cocktail_id, position, ingredient_id, name, amount,
                optional, garnish, allow_base_substitution, allow_brand_substitution
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            (
                id,
                position as i64,
                line.requested_id(),
                &line.name,
                &line.amount,
                line.optional,
                line.garnish,
                line.allow_base_substitution,
                line.allow_brand_substitution,
            ),
        )?;
        let line_id = conn.last_insert_rowid();

        for (sub_position, substitute) in line.substitutes.iter().enumerate() {
            conn.execute(
                "INSERT INTO cocktail_substitutes (line_id, position, ingredient_id, name)
                 VALUES (?1, ?2, ?3, ?4)",
                (line_id, sub_position as i64, substitute.target_id(), &substitute.name),
            )?;
        }
    }

    replace_labels(conn, Owner::Cocktail, id, &cocktail.synonyms, &cocktail.tag_ids())?;
    tx.commit()?;

    debug!(id, name = %cocktail.name, lines = cocktail.ingredients.len(), "stored cocktail");
    Ok(id)
}

fn delete_cocktail_lines(conn: &Connection, cocktail_id: IngredientId) -> Result<()> {
    conn.execute(
        "DELETE FROM cocktail_substitutes WHERE line_id IN
            (SELECT id FROM cocktail_ingredients WHERE cocktail_id = ?1)",
        [cocktail_id],
    )?;
    conn.execute(
        "DELETE FROM cocktail_ingredients WHERE cocktail_id = ?1",
        [cocktail_id],
    )?;
    Ok(())
}

/// Clear the catalog (for re-import); inventory state, ratings and settings are kept
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM cocktail_substitutes;
        DELETE FROM cocktail_ingredients;
        DELETE FROM cocktail_synonyms;
        DELETE FROM cocktail_tags;
        DELETE FROM cocktails;
        DELETE FROM ingredient_synonyms;
        DELETE FROM ingredient_tags;
        DELETE FROM ingredients;
        "#,
    )?;
    Ok(())
}

fn ingredient_from_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: Some(RawId::Int(row.get(0)?)),
        name: row.get(1)?,
        description: row.get(2)?,
        base_ingredient_id: row.get::<_, Option<IngredientId>>(3)?.map(RawId::Int),
        synonyms: Vec::new(),
        tags: Vec::new(),
    })
}

/// List the ingredient catalog in id order
pub fn list_ingredients(conn: &Connection) -> Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, base_ingredient_id FROM ingredients ORDER BY id",
    )?;

    let rows = stmt.query_map([], ingredient_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        let mut ingredient = row?;
        if let Some(id) = ingredient.normalized_id() {
            ingredient.synonyms = load_synonyms(conn, Owner::Ingredient, id)?;
            ingredient.tags = load_tags(conn, Owner::Ingredient, id)?;
        }
        results.push(ingredient);
    }
    Ok(results)
}

/// List all cocktails with their recipes, ordered by name
pub fn list_cocktails(conn: &Connection) -> Result<Vec<Cocktail>> {
    let mut stmt = conn.prepare("SELECT id, name, instructions FROM cocktails ORDER BY name, id")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, IngredientId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, name, instructions) = row?;
        results.push(Cocktail {
            id: Some(RawId::Int(id)),
            name,
            instructions,
            synonyms: load_synonyms(conn, Owner::Cocktail, id)?,
            tags: load_tags(conn, Owner::Cocktail, id)?,
            ingredients: get_cocktail_lines(conn, id)?,
        });
    }
    Ok(results)
}

pub fn get_cocktail(conn: &Connection, id: IngredientId) -> Result<Option<Cocktail>> {
    let header = conn
        .query_row(
            "SELECT name, instructions FROM cocktails WHERE id = ?1",
            [id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()?;

    let Some((name, instructions)) = header else {
        return Ok(None);
    };

    Ok(Some(Cocktail {
        id: Some(RawId::Int(id)),
        name,
        instructions,
        synonyms: load_synonyms(conn, Owner::Cocktail, id)?,
        tags: load_tags(conn, Owner::Cocktail, id)?,
        ingredients: get_cocktail_lines(conn, id)?,
    }))
}

/// Get the recipe lines of a cocktail in recipe order
fn get_cocktail_lines(conn: &Connection, cocktail_id: IngredientId) -> Result<Vec<CocktailIngredient>> {
    let mut stmt = conn.prepare(
        "SELECT id, ingredient_id, name, amount, optional, garnish,
                allow_base_substitution, allow_brand_substitution
         FROM cocktail_ingredients
         WHERE cocktail_id = ?1
         ORDER BY position",
    )?;

    let rows = stmt.query_map([cocktail_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            CocktailIngredient {
                ingredient_id: row.get::<_, Option<IngredientId>>(1)?.map(RawId::Int),
                name: row.get(2)?,
                amount: row.get(3)?,
                optional: row.get(4)?,
                garnish: row.get(5)?,
                allow_base_substitution: row.get(6)?,
                allow_brand_substitution: row.get(7)?,
                substitutes: Vec::new(),
            },
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (line_id, mut line) = row?;
        line.substitutes = get_line_substitutes(conn, line_id)?;
        results.push(line);
    }
    Ok(results)
}

fn get_line_substitutes(conn: &Connection, line_id: i64) -> Result<Vec<Substitute>> {
    let mut stmt = conn.prepare(
        "SELECT ingredient_id, name FROM cocktail_substitutes WHERE line_id = ?1 ORDER BY position",
    )?;

    let rows = stmt.query_map([line_id], |row| {
        Ok(Substitute {
            ingredient_id: row.get::<_, Option<IngredientId>>(0)?.map(RawId::Int),
            id: None,
            name: row.get(1)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Id sets kept alongside the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSet {
    Owned,
    Shopping,
}

impl IdSet {
    fn table(self) -> &'static str {
        match self {
            IdSet::Owned => "owned_ingredients",
            IdSet::Shopping => "shopping_ingredients",
        }
    }
}

/// Add ids to a set; returns how many were new
pub fn add_ids(conn: &Connection, set: IdSet, ids: &[IngredientId]) -> Result<usize> {
    let sql = format!("INSERT OR IGNORE INTO {} (ingredient_id) VALUES (?1)", set.table());
    let mut stmt = conn.prepare(&sql)?;

    let mut added = 0;
    for id in ids {
        added += stmt.execute([id])?;
    }
    debug!(?set, added, "added ingredient ids");
    Ok(added)
}

/// Remove ids from a set; returns how many were present
pub fn remove_ids(conn: &Connection, set: IdSet, ids: &[IngredientId]) -> Result<usize> {
    let sql = format!("DELETE FROM {} WHERE ingredient_id = ?1", set.table());
    let mut stmt = conn.prepare(&sql)?;

    let mut removed = 0;
    for id in ids {
        removed += stmt.execute([id])?;
    }
    debug!(?set, removed, "removed ingredient ids");
    Ok(removed)
}

pub fn list_ids(conn: &Connection, set: IdSet) -> Result<HashSet<IngredientId>> {
    let sql = format!("SELECT ingredient_id FROM {}", set.table());
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut results = HashSet::new();
    for row in rows {
        results.insert(row?);
    }
    Ok(results)
}

/// Rate a cocktail; ratings above the maximum are clamped and 0 clears it
pub fn set_rating(conn: &Connection, cocktail_id: IngredientId, rating: u8) -> Result<u8> {
    let rating = rating.min(MAX_RATING);
    if rating == 0 {
        conn.execute("DELETE FROM cocktail_ratings WHERE cocktail_id = ?1", [cocktail_id])?;
    } else {
        conn.execute(
            "INSERT OR REPLACE INTO cocktail_ratings (cocktail_id, rating) VALUES (?1, ?2)",
            (cocktail_id, rating),
        )?;
    }
    debug!(cocktail_id, rating, "rated cocktail");
    Ok(rating)
}

pub fn list_ratings(conn: &Connection) -> Result<HashMap<IngredientId, u8>> {
    let mut stmt = conn.prepare("SELECT cocktail_id, rating FROM cocktail_ratings")?;

    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, IngredientId>(0)?, row.get::<_, u8>(1)?))
    })?;

    let mut results = HashMap::new();
    for row in rows {
        let (cocktail_id, rating) = row?;
        results.insert(cocktail_id, rating);
    }
    Ok(results)
}

const IGNORE_GARNISH_KEY: &str = "ignore_garnish";
const ALLOW_ALL_SUBSTITUTES_KEY: &str = "allow_all_substitutes";

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn get_flag(conn: &Connection, key: &str, default: bool) -> Result<bool> {
    match get_setting(conn, key)? {
        Some(value) => value
            .parse()
            .with_context(|| format!("setting {} has non-boolean value {:?}", key, value)),
        None => Ok(default),
    }
}

/// Load stored availability options, falling back to defaults
pub fn load_options(conn: &Connection) -> Result<AvailabilityOptions> {
    let defaults = AvailabilityOptions::default();
    Ok(AvailabilityOptions {
        ignore_garnish: get_flag(conn, IGNORE_GARNISH_KEY, defaults.ignore_garnish)?,
        allow_all_substitutes: get_flag(
            conn,
            ALLOW_ALL_SUBSTITUTES_KEY,
            defaults.allow_all_substitutes,
        )?,
    })
}

pub fn save_options(conn: &Connection, options: &AvailabilityOptions) -> Result<()> {
    for (key, value) in [
        (IGNORE_GARNISH_KEY, options.ignore_garnish),
        (ALLOW_ALL_SUBSTITUTES_KEY, options.allow_all_substitutes),
    ] {
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value.to_string()),
        )?;
    }
    Ok(())
}

/// Apply the given changes to the stored options and return the result
pub fn update_options(
    conn: &Connection,
    ignore_garnish: Option<bool>,
    allow_all_substitutes: Option<bool>,
) -> Result<AvailabilityOptions> {
    let mut options = load_options(conn)?;
    if let Some(value) = ignore_garnish {
        options.ignore_garnish = value;
    }
    if let Some(value) = allow_all_substitutes {
        options.allow_all_substitutes = value;
    }

    if ignore_garnish.is_some() || allow_all_substitutes.is_some() {
        save_options(conn, &options)?;
        debug!(?options, "saved settings");
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn sour() -> Cocktail {
        Cocktail {
            id: Some(RawId::Int(42)),
            name: "Whiskey Sour".to_string(),
            instructions: Some("Shake hard.".to_string()),
            ingredients: vec![
                CocktailIngredient {
                    amount: Some("50 ml".to_string()),
                    allow_brand_substitution: true,
                    ..CocktailIngredient::of(1).named("Bourbon")
                },
                CocktailIngredient {
                    substitutes: vec![Substitute::of(3), Substitute {
                        name: Some("Any citrus".to_string()),
                        ..Substitute::default()
                    }],
                    ..CocktailIngredient::of(2).named("Lemon juice")
                },
                CocktailIngredient {
                    garnish: true,
                    ..CocktailIngredient::default().named("Cherry")
                },
            ],
            ..Cocktail::default()
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = open();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn test_ingredient_roundtrip() {
        let conn = open();
        assert!(upsert_ingredient(&conn, &Ingredient::new(10, " Rum ")).unwrap());
        assert!(upsert_ingredient(&conn, &Ingredient::new(1, "Havana Club").with_base(10)).unwrap());
        assert!(!upsert_ingredient(&conn, &Ingredient {
            id: Some(RawId::Int(-5)),
            ..Ingredient::new(0, "Broken")
        })
        .unwrap());

        let stored = list_ingredients(&conn).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].normalized_id(), Some(1));
        assert_eq!(stored[0].base_id(), Some(10));
        assert_eq!(stored[1].name, "Rum");
    }

    #[test]
    fn test_cocktail_roundtrip_keeps_order_and_flags() {
        let conn = open();
        let id = insert_cocktail(&conn, &sour()).unwrap();
        assert_eq!(id, 42);

        let stored = get_cocktail(&conn, 42).unwrap().unwrap();
        assert_eq!(stored.name, "Whiskey Sour");
        assert_eq!(stored.ingredients.len(), 3);

        let bourbon = &stored.ingredients[0];
        assert_eq!(bourbon.requested_id(), Some(1));
        assert_eq!(bourbon.amount.as_deref(), Some("50 ml"));
        assert!(bourbon.allow_brand_substitution);
        assert!(!bourbon.allow_base_substitution);

        let lemon = &stored.ingredients[1];
        assert_eq!(lemon.substitutes.len(), 2);
        assert_eq!(lemon.substitutes[0].target_id(), Some(3));
        assert_eq!(lemon.substitutes[1].target_id(), None);
        assert_eq!(lemon.substitutes[1].name.as_deref(), Some("Any citrus"));

        let cherry = &stored.ingredients[2];
        assert!(cherry.garnish);
        assert_eq!(cherry.requested_id(), None);
    }

    #[test]
    fn test_reinsert_replaces_lines() {
        let conn = open();
        insert_cocktail(&conn, &sour()).unwrap();

        let mut trimmed = sour();
        trimmed.ingredients.truncate(1);
        insert_cocktail(&conn, &trimmed).unwrap();

        let all = list_cocktails(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].ingredients.len(), 1);
    }

    #[test]
    fn test_cocktail_without_id_gets_one() {
        let conn = open();
        let mut anonymous = sour();
        anonymous.id = None;

        let first = insert_cocktail(&conn, &anonymous).unwrap();
        let second = insert_cocktail(&conn, &anonymous).unwrap();
        assert_ne!(first, second);
        assert_eq!(list_cocktails(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_cocktail() {
        let conn = open();
        assert!(get_cocktail(&conn, 7).unwrap().is_none());
    }

    #[test]
    fn test_id_sets() {
        let conn = open();
        assert_eq!(add_ids(&conn, IdSet::Owned, &[1, 2, 2]).unwrap(), 2);
        assert_eq!(add_ids(&conn, IdSet::Shopping, &[9]).unwrap(), 1);
        assert_eq!(remove_ids(&conn, IdSet::Owned, &[2, 5]).unwrap(), 1);

        assert_eq!(list_ids(&conn, IdSet::Owned).unwrap(), HashSet::from([1]));
        assert_eq!(list_ids(&conn, IdSet::Shopping).unwrap(), HashSet::from([9]));
    }

    #[test]
    fn test_clear_catalog_keeps_inventory() {
        let conn = open();
        upsert_ingredient(&conn, &Ingredient::new(1, "Gin")).unwrap();
        insert_cocktail(&conn, &sour()).unwrap();
        add_ids(&conn, IdSet::Owned, &[1]).unwrap();

        clear_catalog(&conn).unwrap();
        assert!(list_ingredients(&conn).unwrap().is_empty());
        assert!(list_cocktails(&conn).unwrap().is_empty());
        assert_eq!(list_ids(&conn, IdSet::Owned).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_cocktail_write_keeps_previous() {
        let conn = open();
        insert_cocktail(&conn, &sour()).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_substitutes BEFORE INSERT ON cocktail_substitutes
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let mut renamed = sour();
        renamed.name = "Amaretto Sour".to_string();
        assert!(insert_cocktail(&conn, &renamed).is_err());

        let stored = get_cocktail(&conn, 42).unwrap().unwrap();
        assert_eq!(stored.name, "Whiskey Sour");
        assert_eq!(stored.ingredients.len(), 3);
        assert_eq!(stored.ingredients[1].substitutes.len(), 2);
    }

    #[test]
    fn test_synonyms_and_tags_roundtrip() {
        let conn = open();
        let mut rum = Ingredient::new(10, "Rum");
        rum.synonyms = vec!["Ron".to_string(), " ron ".to_string(), "Rhum".to_string()];
        rum.tags = vec![RawId::Int(1), RawId::Float(1.0), RawId::Int(-3)];
        upsert_ingredient(&conn, &rum).unwrap();

        let mut cocktail = sour();
        cocktail.synonyms = vec!["Boston Sour".to_string()];
        cocktail.tags = vec![RawId::Int(5), RawId::Text("1".to_string())];
        insert_cocktail(&conn, &cocktail).unwrap();

        let stored = list_ingredients(&conn).unwrap();
        assert_eq!(stored[0].synonyms, vec!["Ron", "Rhum"]);
        assert_eq!(stored[0].tags, vec![RawId::Int(1)]);

        let stored = get_cocktail(&conn, 42).unwrap().unwrap();
        assert_eq!(stored.synonyms, vec!["Boston Sour"]);
        assert_eq!(stored.tags, vec![RawId::Int(1), RawId::Int(5)]);

        // Upserting again replaces rather than appends.
        rum.synonyms.clear();
        rum.tags = vec![RawId::Int(7)];
        upsert_ingredient(&conn, &rum).unwrap();
        let stored = list_ingredients(&conn).unwrap();
        assert!(stored[0].synonyms.is_empty());
        assert_eq!(stored[0].tag_ids(), vec![7]);
    }

    #[test]
    fn test_ratings() {
        let conn = open();
        assert_eq!(set_rating(&conn, 1, 4).unwrap(), 4);
        assert_eq!(set_rating(&conn, 2, 9).unwrap(), MAX_RATING);
        assert_eq!(set_rating(&conn, 3, 2).unwrap(), 2);
        assert_eq!(set_rating(&conn, 3, 0).unwrap(), 0);

        let ratings = list_ratings(&conn).unwrap();
        assert_eq!(ratings, HashMap::from([(1, 4), (2, MAX_RATING)]));

        clear_catalog(&conn).unwrap();
        assert_eq!(list_ratings(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_update_options_stores_changes() {
        let conn = open();

        let unchanged = update_options(&conn, None, None).unwrap();
        assert_eq!(unchanged, AvailabilityOptions::default());
        assert!(get_setting(&conn, IGNORE_GARNISH_KEY).unwrap().is_none());

        let updated = update_options(&conn, Some(false), None).unwrap();
        assert!(!updated.ignore_garnish);
        assert!(!updated.allow_all_substitutes);
        assert_eq!(load_options(&conn).unwrap(), updated);

        let updated = update_options(&conn, None, Some(true)).unwrap();
        assert!(!updated.ignore_garnish);
        assert!(updated.allow_all_substitutes);
    }

    #[test]
    fn test_options_default_and_persist() {
        let conn = open();
        assert_eq!(load_options(&conn).unwrap(), AvailabilityOptions::default());

        let options = AvailabilityOptions {
            ignore_garnish: false,
            allow_all_substitutes: true,
        };
        save_options(&conn, &options).unwrap();
        assert_eq!(load_options(&conn).unwrap(), options);
    }
}
