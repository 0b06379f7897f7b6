use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roll_data::{MUNICIPALITIES_FILE, PROPERTIES_FILE, SeedLoader};
use roll_db_sqlite::SqliteRepository;

/// Load municipality and property seed data from CSV files into the database.
///
/// The seed directory must contain:
/// - municipalities.csv: munid, name_municipal_w_type, municipal_rate, education_rate
/// - properties.csv: assessment_roll_number, assessment_value, municipal_id
///
/// Each file loads in one transaction; a malformed field or a duplicate
/// primary key aborts that file with nothing inserted.
#[derive(Parser, Debug)]
#[command(name = "roll-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the two seed CSV files
    #[arg(short, long, default_value = "data")]
    seed_dir: PathBuf,

    /// SQLite database URL or path (created if missing)
    #[arg(short, long, default_value = "property_records.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    let municipalities_path = args.seed_dir.join(MUNICIPALITIES_FILE);
    println!("Loading municipalities from: {}", municipalities_path.display());

    let file = File::open(&municipalities_path)
        .with_context(|| format!("Failed to open: {}", municipalities_path.display()))?;
    let records = SeedLoader::parse_municipalities(file)
        .with_context(|| format!("Failed to parse CSV: {}", municipalities_path.display()))?;
    println!("Parsed {} municipality records from CSV", records.len());

    let inserted = SeedLoader::load_municipalities(&repo, records)
        .await
        .context("Failed to load municipalities into database")?;
    println!("Loaded {} municipalities.", inserted);

    let properties_path = args.seed_dir.join(PROPERTIES_FILE);
    println!("Loading properties from: {}", properties_path.display());

    let file = File::open(&properties_path)
        .with_context(|| format!("Failed to open: {}", properties_path.display()))?;
    let records = SeedLoader::parse_properties(file)
        .with_context(|| format!("Failed to parse CSV: {}", properties_path.display()))?;
    println!("Parsed {} property records from CSV", records.len());

    let inserted = SeedLoader::load_properties(&repo, records)
        .await
        .context("Failed to load properties into database")?;
    println!("Loaded {} properties.", inserted);

    Ok(())
}
