/// Catalog Linter — validates an enemy catalog and, optionally, an encounter log against it.
///
/// Usage: catalog_linter <catalog.ron | --default> [--log <log.ron>]

use chest_predictor::core::catalog::EnemyCatalog;
use chest_predictor::core::history::EncounterLog;
use chest_predictor::schema::enemy::{Element, Rarity};
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chest_predictor=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: catalog_linter <catalog.ron | --default> [--log <log.ron>]");
        process::exit(0);
    }

    let catalog_arg = &args[1];
    let mut log_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--log" && i + 1 < args.len() {
            i += 1;
            log_path = Some(args[i].clone());
        } else {
            eprintln!("Unknown argument: {}", args[i]);
            process::exit(1);
        }
        i += 1;
    }

    let catalog = if catalog_arg == "--default" {
        EnemyCatalog::default()
    } else {
        match EnemyCatalog::load_from_ron(Path::new(catalog_arg)) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("ERROR: Failed to load catalog '{}': {}", catalog_arg, e);
                process::exit(1);
            }
        }
    };

    println!("Loaded {} enemies", catalog.len());

    let (mut errors, mut warnings) = lint_catalog(&catalog);

    if let Some(ref path) = log_path {
        match EncounterLog::load_from_ron(Path::new(path)) {
            Ok(log) => {
                println!("Loaded {} encounters from '{}'", log.len(), path);
                let (log_errors, log_warnings) = lint_log(&log, &catalog);
                errors.extend(log_errors);
                warnings.extend(log_warnings);
            }
            Err(e) => errors.push(format!("failed to load log '{}': {}", path, e)),
        }
    }

    println!("\n=== Catalog Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_catalog(catalog: &EnemyCatalog) -> (Vec<String>, Vec<String>) {
    let errors = Vec::new();
    let mut warnings = Vec::new();

    for rarity in Rarity::ALL {
        if !catalog.iter().any(|e| e.rarity == rarity) {
            warnings.push(format!("no {} enemies in catalog", rarity));
        }
    }

    for element in Element::ALL {
        if !catalog.iter().any(|e| e.element == element) {
            warnings.push(format!("no {} element enemies in catalog", element));
        }
    }

    let mut names = FxHashSet::default();
    for enemy in catalog {
        if !names.insert(enemy.name.as_str()) {
            warnings.push(format!("duplicate display name '{}'", enemy.name));
        }
        if enemy.name.trim().is_empty() {
            warnings.push(format!("enemy {} has an empty name", enemy.id));
        }
        if enemy.weakness.trim().is_empty() {
            warnings.push(format!("enemy {} has no weakness", enemy.id));
        }
        if enemy.description.trim().is_empty() {
            warnings.push(format!("enemy {} has no description", enemy.id));
        }
    }

    (errors, warnings)
}

fn lint_log(log: &EncounterLog, catalog: &EnemyCatalog) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for record in log.dangling(catalog) {
        errors.push(format!(
            "encounter {} (chest {}) references unknown enemy '{}'",
            record.id, record.chest_number, record.enemy_id
        ));
    }

    for pair in log.encounters().windows(2) {
        if pair[1].chest_number <= pair[0].chest_number {
            warnings.push(format!(
                "chest number {} after {} is not increasing (encounter {})",
                pair[1].chest_number, pair[0].chest_number, pair[1].id
            ));
        }
        if pair[1].timestamp < pair[0].timestamp {
            warnings.push(format!(
                "encounter {} is timestamped before the one preceding it",
                pair[1].id
            ));
        }
    }

    (errors, warnings)
}
