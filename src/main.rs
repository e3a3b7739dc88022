//! barkeep command line interface

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use rusqlite::Connection;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use barkeep::db::{self, IdSet};
use barkeep::tags::{self, COCKTAIL_TAGS, INGREDIENT_TAGS, Tag};
use barkeep::{AvailabilityOptions, IngredientId, IngredientLookup, import, search, summary};

#[derive(Parser)]
#[command(name = "barkeep")]
#[command(about = "Home bar inventory and cocktail availability planner")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, env = "BARKEEP_DB", default_value = "barkeep.db")]
    database: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Override the stored ignore-garnish setting for this run (before the command)
    #[arg(long)]
    ignore_garnish: Option<bool>,

    /// Override the stored allow-all-substitutes setting for this run (before the command)
    #[arg(long)]
    allow_all_substitutes: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load a small sample bar (replaces the catalog)
    LoadSample,

    /// Import inventory snapshots from a JSON file or a directory of them
    Import {
        path: PathBuf,

        /// Clear the existing catalog before importing
        #[arg(long)]
        clear: bool,
    },

    /// Export the catalog as a JSON snapshot
    Export { path: PathBuf },

    /// List catalog ingredients
    Ingredients {
        /// Only show ingredients whose name or synonyms match
        #[arg(short, long)]
        search: Option<String>,

        /// Only show ingredients with this tag (id or name)
        #[arg(short, long)]
        tag: Option<String>,

        /// Only show owned ingredients
        #[arg(long)]
        owned: bool,
    },

    /// List cocktails with their availability
    Cocktails {
        /// Only show cocktails whose name or synonyms match
        #[arg(short, long)]
        search: Option<String>,

        /// Only show cocktails with this tag (id or name)
        #[arg(short, long)]
        tag: Option<String>,

        /// Only show cocktails rated at least this many stars
        #[arg(long)]
        min_rating: Option<u8>,

        /// Only show cocktails that can be made now
        #[arg(long)]
        ready: bool,
    },

    /// List the built-in ingredient and cocktail tags
    Tags,

    /// Rate a cocktail from 1 to 5 stars (0 clears the rating)
    Rate { id: IngredientId, rating: u8 },

    /// Show line-by-line availability for one cocktail
    Check { id: IngredientId },

    /// Mark ingredients as owned
    Own {
        #[arg(required = true)]
        ids: Vec<IngredientId>,
    },

    /// Mark ingredients as no longer owned
    Disown {
        #[arg(required = true)]
        ids: Vec<IngredientId>,
    },

    /// Manage the shopping list
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },

    /// Suggest purchases that complete cocktails missing one ingredient
    Plan,

    /// Show or store availability settings
    Settings {
        /// Store whether garnish lines are ignored
        #[arg(long)]
        ignore_garnish: Option<bool>,

        /// Store whether every line accepts base and brand substitutes
        #[arg(long)]
        allow_all_substitutes: Option<bool>,
    },
}

#[derive(Subcommand)]
enum ShopAction {
    Add {
        #[arg(required = true)]
        ids: Vec<IngredientId>,
    },
    Remove {
        #[arg(required = true)]
        ids: Vec<IngredientId>,
    },
    List,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn lookup_tag(query: Option<&str>, known: &'static [Tag]) -> Result<Option<&'static Tag>> {
    query
        .map(|query| tags::find_tag(query, known).with_context(|| format!("Unknown tag {:?}", query)))
        .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;
    debug!(database = %cli.database.display(), "opened database");

    let mut options = db::load_options(&conn)?;
    if let Some(value) = cli.ignore_garnish {
        options.ignore_garnish = value;
    }
    if let Some(value) = cli.allow_all_substitutes {
        options.allow_all_substitutes = value;
    }

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let stats = import::load_sample(&conn)?;
            println!("Sample bar loaded: {}", stats);
        }

        Commands::Import { path, clear } => {
            if clear {
                println!("Clearing existing catalog...");
                db::clear_catalog(&conn)?;
            }

            let stats = import::import_path(&conn, &path)?;
            println!("\n{}", stats);
        }

        Commands::Export { path } => {
            let snapshot = import::export_snapshot(&conn, &path)?;
            println!(
                "Exported {} ingredients and {} cocktails to {}",
                snapshot.ingredients.len(),
                snapshot.cocktails.len(),
                path.display()
            );
        }

        Commands::Ingredients {
            search: query,
            tag,
            owned,
        } => {
            let tag = lookup_tag(tag.as_deref(), INGREDIENT_TAGS)?;
            let owned_ids = db::list_ids(&conn, IdSet::Owned)?;
            let query = query.unwrap_or_default();
            let catalog = db::list_ingredients(&conn)?;
            let ingredients: Vec<_> = catalog
                .iter()
                .filter(|item| search::ingredient_matches(item, &query))
                .filter(|item| tag.is_none_or(|tag| item.tag_ids().contains(&tag.id)))
                .filter(|item| !owned || item.normalized_id().is_some_and(|id| owned_ids.contains(&id)))
                .collect();

            if ingredients.is_empty() {
                println!("No matching ingredients. Run 'import' or 'load-sample' first.");
            } else {
                let lookup = IngredientLookup::new(&catalog);
                println!("{:>6}  {:<5} {:<30} {:<20} {}", "ID", "Owned", "Ingredient", "Base", "Tags");
                println!("{}", "-".repeat(80));
                for item in ingredients {
                    let id = item.normalized_id().unwrap_or_default();
                    let mark = if owned_ids.contains(&id) { "yes" } else { "" };
                    let base = item
                        .base_id()
                        .map(|base_id| {
                            lookup
                                .name_of(base_id)
                                .map(str::to_string)
                                .unwrap_or_else(|| format!("#{}", base_id))
                        })
                        .unwrap_or_default();
                    let labels = tags::tag_names(&item.tag_ids(), INGREDIENT_TAGS).join(", ");
                    println!("{:>6}  {:<5} {:<30} {:<20} {}", id, mark, item.name, base, labels);
                }
            }
        }

        Commands::Cocktails {
            search: query,
            tag,
            min_rating,
            ready,
        } => {
            let tag = lookup_tag(tag.as_deref(), COCKTAIL_TAGS)?;
            let lookup = IngredientLookup::new(&db::list_ingredients(&conn)?);
            let owned_ids = db::list_ids(&conn, IdSet::Owned)?;
            let ratings = db::list_ratings(&conn)?;
            let query = query.unwrap_or_default();

            let mut shown = 0;
            for cocktail in db::list_cocktails(&conn)? {
                if !search::cocktail_matches(&cocktail, &query) {
                    continue;
                }
                if tag.is_some_and(|tag| !cocktail.tag_ids().contains(&tag.id)) {
                    continue;
                }

                let id = cocktail.normalized_id().unwrap_or_default();
                let rating = ratings.get(&id).copied().unwrap_or_default();
                if min_rating.is_some_and(|min| rating < min) {
                    continue;
                }

                let availability = summary::summarise_cocktail_availability(
                    &cocktail,
                    &owned_ids,
                    Some(&lookup),
                    None,
                    options,
                );
                if ready && !availability.is_ready {
                    continue;
                }

                let mark = if availability.is_ready { "*" } else { " " };
                let stars = "*".repeat(rating.into());
                println!("{} {:>4}  {:<24} {:<5} {}", mark, id, cocktail.name, stars, availability);
                shown += 1;
            }

            if shown == 0 {
                println!("No matching cocktails.");
            }
        }

        Commands::Check { id } => {
            let Some(cocktail) = db::get_cocktail(&conn, id)? else {
                bail!("Cocktail {} not found", id);
            };
            let lookup = IngredientLookup::new(&db::list_ingredients(&conn)?);
            let owned_ids = db::list_ids(&conn, IdSet::Owned)?;

            let lines = summary::check_cocktail(&cocktail, &owned_ids, &lookup, options);
            print!("{}", summary::format_cocktail_check(&cocktail, &lines));

            let result =
                summary::summarise_cocktail_availability(&cocktail, &owned_ids, Some(&lookup), None, options);
            let status = if result.is_ready { "Ready" } else { "Not ready" };
            println!("\n{}: {}", status, result);
        }

        Commands::Tags => {
            for (title, known) in [("Ingredient tags", INGREDIENT_TAGS), ("Cocktail tags", COCKTAIL_TAGS)] {
                println!("{}:", title);
                for tag in known {
                    println!("  {:>3}  {:<16} {}", tag.id, tag.name, tag.color);
                }
            }
        }

        Commands::Rate { id, rating } => {
            if db::get_cocktail(&conn, id)?.is_none() {
                bail!("Cocktail {} not found", id);
            }
            match db::set_rating(&conn, id, rating)? {
                0 => println!("Cleared rating for cocktail {}", id),
                stored => println!("Rated cocktail {} {}/{}", id, stored, db::MAX_RATING),
            }
        }

        Commands::Own { ids } => {
            let added = db::add_ids(&conn, IdSet::Owned, &ids)?;
            println!("Marked {} ingredients as owned", added);
        }

        Commands::Disown { ids } => {
            let removed = db::remove_ids(&conn, IdSet::Owned, &ids)?;
            println!("Removed {} ingredients from the bar", removed);
        }

        Commands::Shop { action } => match action {
            ShopAction::Add { ids } => {
                let added = db::add_ids(&conn, IdSet::Shopping, &ids)?;
                println!("Added {} ingredients to the shopping list", added);
            }
            ShopAction::Remove { ids } => {
                let removed = db::remove_ids(&conn, IdSet::Shopping, &ids)?;
                println!("Removed {} ingredients from the shopping list", removed);
            }
            ShopAction::List => {
                let lookup = IngredientLookup::new(&db::list_ingredients(&conn)?);
                let mut ids: Vec<_> = db::list_ids(&conn, IdSet::Shopping)?.into_iter().collect();
                ids.sort_unstable();

                if ids.is_empty() {
                    println!("Shopping list is empty.");
                } else {
                    println!("Shopping list:");
                    for id in ids {
                        println!("  {:>4}  {}", id, lookup.name_of(id).unwrap_or("(unknown)"));
                    }
                }
            }
        },

        Commands::Plan => {
            let lookup = IngredientLookup::new(&db::list_ingredients(&conn)?);
            let owned_ids = db::list_ids(&conn, IdSet::Owned)?;
            let cocktails = db::list_cocktails(&conn)?;

            let plan = summary::plan_purchases(&cocktails, &owned_ids, &lookup, options);
            if plan.is_empty() {
                println!("No cocktails are exactly one ingredient away.");
            } else {
                println!("Buying one of these completes a cocktail:\n");
                for group in plan {
                    let kind = if group.is_branded { " (brand)" } else { "" };
                    println!(
                        "  {:>4}  {}{} -> {}",
                        group.ingredient_id,
                        group.name,
                        kind,
                        group.cocktails.join(", ")
                    );
                }
            }
        }

        Commands::Settings {
            ignore_garnish,
            allow_all_substitutes,
        } => {
            let stored = db::update_options(&conn, ignore_garnish, allow_all_substitutes)?;
            print_options(&stored);
        }
    }

    Ok(())
}

fn print_options(options: &AvailabilityOptions) {
    println!("Settings:");
    println!("  ignore garnish:        {}", options.ignore_garnish);
    println!("  allow all substitutes: {}", options.allow_all_substitutes);
}
