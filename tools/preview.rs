/// Preview — prints predictions, insights, and statistics for an encounter log.
///
/// Usage: preview [--log <log.ron>] [--catalog <catalog.ron>] [--config <config.ron>]
///                [--simulate <n>] [--seed <n>] [--top <k>] [--save <log.ron>]
///
/// Without --log, a synthetic history of --simulate encounters (default 20)
/// is generated from the rarity priors with the given seed.

use chest_predictor::core::catalog::EnemyCatalog;
use chest_predictor::core::config::PredictorConfig;
use chest_predictor::core::history::EncounterLog;
use chest_predictor::core::predictor::Predictor;
use chest_predictor::core::stats::EncounterStats;
use chest_predictor::schema::encounter::{NewEncounter, Outcome};
use chrono::{Duration, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOCATIONS: &[&str] = &["Whispering Woods", "Crystal Caves", "Sunken Temple", "Ash Dunes"];

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chest_predictor=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut log_path = None;
    let mut catalog_path = None;
    let mut config_path = None;
    let mut save_path = None;
    let mut simulate = 20u32;
    let mut seed: u64 = 42;
    let mut top = 5usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--log" if i + 1 < args.len() => {
                i += 1;
                log_path = Some(args[i].clone());
            }
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                catalog_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--save" if i + 1 < args.len() => {
                i += 1;
                save_path = Some(args[i].clone());
            }
            "--simulate" if i + 1 < args.len() => {
                i += 1;
                simulate = parse_simulate_count(&args[i]).unwrap_or_else(|e| {
                    eprintln!("Invalid --simulate value '{}': {}", args[i], e);
                    print_usage();
                    process::exit(1);
                });
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--top" if i + 1 < args.len() => {
                i += 1;
                top = args[i].parse().unwrap_or(5);
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let catalog = match catalog_path {
        Some(ref path) => EnemyCatalog::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error loading catalog '{}': {}", path, e);
            process::exit(1);
        }),
        None => EnemyCatalog::default(),
    };

    let mut builder = Predictor::builder().catalog(&catalog);
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    let predictor = builder.build().unwrap_or_else(|e| {
        eprintln!("Error building predictor: {}", e);
        process::exit(1);
    });

    let mut rng = StdRng::seed_from_u64(seed);
    let log = match log_path {
        Some(ref path) => EncounterLog::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error loading log '{}': {}", path, e);
            process::exit(1);
        }),
        None => simulate_log(&catalog, predictor.config(), simulate, &mut rng),
    };

    if let Some(ref path) = save_path {
        if let Err(e) = log.save_to_ron(Path::new(path)) {
            eprintln!("Error saving log to '{}': {}", path, e);
            process::exit(1);
        }
        println!("Log saved to '{}'", path);
    }

    let history = log.encounters();
    println!("=== {} ({} encounters) ===\n", log.name, history.len());

    if let Some(last) = history.last() {
        let name = catalog
            .get(&last.enemy_id)
            .map(|e| e.name.as_str())
            .unwrap_or(last.enemy_id.as_str());
        println!("Last chest #{}: {} at {} ({})\n", last.chest_number, name, last.location, last.outcome);
    }

    println!("--- Next enemy ---");
    for (rank, prediction) in predictor.predict_next_enemy(history).iter().take(top).enumerate() {
        println!(
            "{:>2}. {} {:<18} p={:>5.1}%  conf={:>5.1}%  {}",
            rank + 1,
            prediction.enemy.icon,
            prediction.enemy.name,
            prediction.probability * 100.0,
            prediction.confidence * 100.0,
            prediction.reasoning
        );
    }

    println!("\n--- Insights ---");
    for message in predictor.insight_messages(history) {
        println!("  * {}", message);
    }

    let stats = EncounterStats::compute(history, &catalog);
    println!("\n--- Statistics ---");
    println!("  Total encounters: {}", stats.total);
    println!("  Win rate:         {:.1}%", stats.win_rate);
    println!("  Last chest:       {}", stats.last_chest.unwrap_or(0));
    println!("  Elements:");
    for share in &stats.elements {
        println!("    {:<6} {:>3} ({:.1}%)", share.key, share.count, share.percentage);
    }
    println!("  Rarities:");
    for share in &stats.rarities {
        println!("    {:<9} {:>3} ({:.1}%)", share.key, share.count, share.percentage);
    }
    println!("  Outcomes:");
    for share in &stats.outcomes {
        println!("    {:<7} {:>3} ({:.1}%)", share.key, share.count, share.percentage);
    }
}

/// Number of encounters to simulate; must fit a chest number.
fn parse_simulate_count(arg: &str) -> Result<u32, String> {
    let count: u64 = arg.parse().map_err(|e| format!("{e}"))?;
    u32::try_from(count).map_err(|_| format!("at most {} encounters can be simulated", u32::MAX))
}

/// Build a synthetic log by drawing enemies with rarity-prior weights.
fn simulate_log(
    catalog: &EnemyCatalog,
    config: &PredictorConfig,
    count: u32,
    rng: &mut StdRng,
) -> EncounterLog {
    let mut log = EncounterLog::new("Simulated run");
    let weights: Vec<f64> = catalog
        .iter()
        .map(|e| config.rarity_priors.weight(e.rarity))
        .collect();
    let dist = WeightedIndex::new(&weights).unwrap_or_else(|e| {
        eprintln!("Error: cannot sample from rarity priors: {}", e);
        process::exit(1);
    });

    let start = Utc::now() - Duration::minutes(i64::from(count) * 3);
    for chest in 1..=count {
        let enemy = &catalog.enemies()[dist.sample(rng)];
        let outcome = match rng.gen_range(0..10) {
            0..=6 => Outcome::Victory,
            7..=8 => Outcome::Defeat,
            _ => Outcome::Fled,
        };
        let encounter = NewEncounter {
            chest_number: chest,
            enemy_id: enemy.id.clone(),
            timestamp: start + Duration::minutes(i64::from(chest - 1) * 3),
            location: LOCATIONS[rng.gen_range(0..LOCATIONS.len())].to_string(),
            outcome,
        };
        if let Err(e) = log.add(encounter, catalog, rng) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
    log
}

fn print_usage() {
    println!("Preview — predictions, insights, and statistics for an encounter log");
    println!();
    println!("Usage: preview [--log <log.ron>] [--catalog <catalog.ron>] [--config <config.ron>]");
    println!("               [--simulate <n>] [--seed <n>] [--top <k>] [--save <log.ron>]");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_count_parses() {
        assert_eq!(parse_simulate_count("20"), Ok(20));
        assert_eq!(parse_simulate_count("0"), Ok(0));
        assert_eq!(parse_simulate_count(&u32::MAX.to_string()), Ok(u32::MAX));
    }

    #[test]
    fn simulate_count_rejects_oversized_values() {
        assert!(parse_simulate_count("4294967296").is_err());
        assert!(parse_simulate_count("18446744073709551615").is_err());
        assert!(parse_simulate_count("99999999999999999999999").is_err());
    }

    #[test]
    fn simulate_count_rejects_garbage() {
        assert!(parse_simulate_count("many").is_err());
        assert!(parse_simulate_count("-3").is_err());
    }

    #[test]
    fn simulated_log_numbers_chests_from_one() {
        let catalog = EnemyCatalog::default();
        let mut rng = StdRng::seed_from_u64(5);
        let log = simulate_log(&catalog, &PredictorConfig::default(), 4, &mut rng);
        let chests: Vec<u32> = log.encounters().iter().map(|r| r.chest_number).collect();
        assert_eq!(chests, vec![1, 2, 3, 4]);
        assert!(log.encounters().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
