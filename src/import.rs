//! Catalog import and export
//!
//! Reads inventory snapshots (the JSON document the app bundles and exports)
//! into the database, either a single file or every `*.json` file under a
//! directory. Bad files are reported and skipped so one broken export does not
//! block the rest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::db;
use crate::models::InventorySnapshot;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid inventory snapshot")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Find all snapshot files under a path, sorted so imports are repeatable
pub fn find_snapshot_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();

    files.sort();
    files
}

pub fn read_snapshot(path: &Path) -> Result<InventorySnapshot, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Store one snapshot, adding its counts to `stats`
pub fn import_snapshot(
    conn: &Connection,
    snapshot: &InventorySnapshot,
    stats: &mut ImportStats,
) -> Result<()> {
    for ingredient in &snapshot.ingredients {
        if db::upsert_ingredient(conn, ingredient)? {
            stats.ingredients += 1;
        } else {
            trace!(name = %ingredient.name, "skipping ingredient without a valid id");
            stats.skipped += 1;
        }
    }

    for cocktail in &snapshot.cocktails {
        db::insert_cocktail(conn, cocktail)?;
        stats.cocktails += 1;
        stats.lines += cocktail.ingredients.len();
    }

    Ok(())
}

/// Import every snapshot found at `path` into the database
pub fn import_path(conn: &Connection, path: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    println!("Scanning {} for inventory snapshots...", path.display());
    let files = find_snapshot_files(path);
    println!("Found {} snapshot files", files.len());

    for file in &files {
        match read_snapshot(file) {
            Ok(snapshot) => {
                import_snapshot(conn, &snapshot, &mut stats)
                    .with_context(|| format!("storing {}", file.display()))?;
                stats.files += 1;

                println!(
                    "  Imported: {} (ingredients: {}, cocktails: {})",
                    file.display(),
                    snapshot.ingredients.len(),
                    snapshot.cocktails.len()
                );
            }
            Err(e) => {
                warn!(error = ?e, "skipping snapshot");
                eprintln!("  Error importing {}: {}", file.display(), e);
                stats.errors += 1;
            }
        }
    }

    debug!(?stats, "import finished");
    Ok(stats)
}

/// Write the stored catalog as a pretty-printed snapshot
pub fn export_snapshot(conn: &Connection, path: &Path) -> Result<InventorySnapshot> {
    let snapshot = InventorySnapshot {
        ingredients: db::list_ingredients(conn)?,
        cocktails: db::list_cocktails(conn)?,
    };

    let contents = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;

    debug!(
        path = %path.display(),
        ingredients = snapshot.ingredients.len(),
        cocktails = snapshot.cocktails.len(),
        "exported snapshot"
    );
    Ok(snapshot)
}

const SAMPLE_SNAPSHOT: &str = r#"{
  "ingredients": [
    { "id": 1, "name": "Gin", "tags": [1] },
    { "id": 2, "name": "Tanqueray London Dry", "baseIngredientId": 1 },
    { "id": 3, "name": "Beefeater", "baseIngredientId": 1 },
    { "id": 4, "name": "White Rum", "synonyms": ["Light rum", "Silver rum"], "tags": [1] },
    { "id": 5, "name": "Havana Club 3", "baseIngredientId": 4 },
    { "id": 6, "name": "Campari", "tags": [2] },
    { "id": 7, "name": "Sweet Vermouth", "synonyms": ["Rosso vermouth"], "tags": [2] },
    { "id": 8, "name": "Dry Vermouth", "tags": [2] },
    { "id": 9, "name": "Lime Juice", "tags": [5] },
    { "id": 10, "name": "Lemon Juice", "tags": [5] },
    { "id": 11, "name": "Sugar Syrup", "synonyms": ["Simple syrup"], "tags": [4] },
    { "id": 12, "name": "Tonic Water", "tags": [3] },
    { "id": 13, "name": "Soda Water", "synonyms": ["Club soda"], "tags": [3] },
    { "id": 14, "name": "Orange Peel", "tags": [6] },
    { "id": 15, "name": "Mint", "tags": [7] },
    { "id": 16, "name": "Olive", "tags": [10] }
  ],
  "cocktails": [
    {
      "id": 1,
      "name": "Negroni",
      "tags": [1, 2, 3],
      "ingredients": [
        { "ingredientId": 1, "name": "Gin", "amount": "30 ml", "allowBrandSubstitution": true },
        { "ingredientId": 6, "name": "Campari", "amount": "30 ml" },
        { "ingredientId": 7, "name": "Sweet Vermouth", "amount": "30 ml" },
        { "ingredientId": 14, "name": "Orange Peel", "garnish": true }
      ]
    },
    {
      "id": 2,
      "name": "Gin & Tonic",
      "synonyms": ["G&T", "Gin and Tonic"],
      "tags": [8],
      "ingredients": [
        { "ingredientId": 2, "name": "Tanqueray London Dry", "amount": "50 ml",
          "allowBaseSubstitution": true, "allowBrandSubstitution": true },
        { "ingredientId": 12, "name": "Tonic Water", "amount": "150 ml" },
        { "ingredientId": 9, "name": "Lime Juice", "optional": true }
      ]
    },
    {
      "id": 3,
      "name": "Daiquiri",
      "tags": [1],
      "ingredients": [
        { "ingredientId": 4, "name": "White Rum", "amount": "60 ml" },
        { "ingredientId": 9, "name": "Lime Juice", "amount": "25 ml",
          "substitutes": [{ "ingredientId": 10, "name": "Lemon Juice" }] },
        { "ingredientId": 11, "name": "Sugar Syrup", "amount": "15 ml" }
      ]
    },
    {
      "id": 4,
      "name": "Mojito",
      "tags": [1, 8],
      "ingredients": [
        { "ingredientId": 5, "name": "Havana Club 3", "amount": "50 ml", "allowBaseSubstitution": true },
        { "ingredientId": 9, "name": "Lime Juice", "amount": "25 ml" },
        { "ingredientId": 11, "name": "Sugar Syrup", "amount": "15 ml" },
        { "ingredientId": 15, "name": "Mint", "amount": "8 leaves" },
        { "ingredientId": 13, "name": "Soda Water", "amount": "top" }
      ]
    },
    {
      "id": 5,
      "name": "Martini",
      "synonyms": ["Dry Martini"],
      "tags": [1, 5],
      "ingredients": [
        { "ingredientId": 1, "name": "Gin", "amount": "60 ml" },
        { "ingredientId": 8, "name": "Dry Vermouth", "amount": "10 ml" },
        { "ingredientId": 16, "name": "Olive", "garnish": true }
      ]
    }
  ]
}"#;

/// Replace the catalog with a small built-in bar for trying things out
pub fn load_sample(conn: &Connection) -> Result<ImportStats> {
    let snapshot: InventorySnapshot =
        serde_json::from_str(SAMPLE_SNAPSHOT).context("parsing built-in sample catalog")?;

    db::clear_catalog(conn)?;
    let mut stats = ImportStats::default();
    import_snapshot(conn, &snapshot, &mut stats)?;
    stats.files = 1;
    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub files: usize,
    pub ingredients: usize,
    pub cocktails: usize,
    pub lines: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} files: {} ingredients, {} cocktails ({} recipe lines). Skipped: {}, Errors: {}",
            self.files, self.ingredients, self.cocktails, self.lines, self.skipped, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{search, tags};
    use tempfile::tempdir;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_import_directory_skips_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"ingredients": [{"id": 1, "name": "Gin"}, {"id": -1, "name": "Bad"}, {"name": "No id"}]}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested").join("b.json"),
            r#"{"cocktails": [{"name": "Gin Neat", "ingredients": [{"ingredientId": 1}]}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let conn = open();
        let stats = import_path(&conn, dir.path()).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.ingredients, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.cocktails, 1);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(db::list_cocktails(&conn).unwrap()[0].name, "Gin Neat");
    }

    #[test]
    fn test_read_errors_are_typed() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(read_snapshot(&missing), Err(ImportError::Read { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "42").unwrap();
        assert!(matches!(read_snapshot(&broken), Err(ImportError::Parse { .. })));
    }

    #[test]
    fn test_single_file_import() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bar.txt");
        fs::write(&file, r#"{"ingredients": [{"id": "3", "name": "Rum"}]}"#).unwrap();

        assert_eq!(find_snapshot_files(&file), vec![file.clone()]);

        let conn = open();
        let stats = import_path(&conn, &file).unwrap();
        assert_eq!(stats.ingredients, 1);
        assert_eq!(db::list_ingredients(&conn).unwrap()[0].normalized_id(), Some(3));
    }

    #[test]
    fn test_export_then_import_matches_store() {
        let dir = tempdir().unwrap();
        let conn = open();
        load_sample(&conn).unwrap();

        let path = dir.path().join("export.json");
        let exported = export_snapshot(&conn, &path).unwrap();

        let other = open();
        import_path(&other, &path).unwrap();
        assert_eq!(db::list_ingredients(&other).unwrap(), exported.ingredients);
        assert_eq!(db::list_cocktails(&other).unwrap(), exported.cocktails);
    }

    #[test]
    fn test_sample_loads() {
        let conn = open();
        let stats = load_sample(&conn).unwrap();

        assert_eq!(stats.ingredients, 16);
        assert_eq!(stats.cocktails, 5);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_sample_carries_synonyms_and_tags() {
        let conn = open();
        load_sample(&conn).unwrap();

        let ingredients = db::list_ingredients(&conn).unwrap();
        let syrup = ingredients.iter().find(|item| item.name == "Sugar Syrup").unwrap();
        assert!(search::ingredient_matches(syrup, "simple"));
        assert_eq!(tags::tag_names(&syrup.tag_ids(), tags::INGREDIENT_TAGS), vec!["syrup"]);

        let martini = db::get_cocktail(&conn, 5).unwrap().unwrap();
        assert!(search::cocktail_matches(&martini, "dry mart"));
        assert_eq!(
            tags::tag_names(&martini.tag_ids(), tags::COCKTAIL_TAGS),
            vec!["IBA official", "strong"]
        );
    }

    #[test]
    fn test_export_writes_labels() {
        let dir = tempdir().unwrap();
        let conn = open();
        load_sample(&conn).unwrap();

        let path = dir.path().join("export.json");
        export_snapshot(&conn, &path).unwrap();
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        let tonic = written["cocktails"]
            .as_array()
            .unwrap()
            .iter()
            .find(|cocktail| cocktail["name"] == "Gin & Tonic")
            .unwrap();
        assert_eq!(tonic["synonyms"], serde_json::json!(["G&T", "Gin and Tonic"]));
        assert_eq!(tonic["tags"], serde_json::json!([8]));
    }
}
