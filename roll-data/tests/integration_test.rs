//! Integration tests for seed loading using the actual SQLite backend.

use pretty_assertions::assert_eq;
use roll_core::RollRepository;
use roll_data::{SeedLoader, SeedLoaderError};
use roll_db_sqlite::SqliteRepository;
use rust_decimal_macros::dec;

const TEST_MUNICIPALITIES_CSV: &str = include_str!("../test-data/municipalities.csv");
const TEST_PROPERTIES_CSV: &str = include_str!("../test-data/properties.csv");

async fn setup_test_db() -> SqliteRepository {
    let repo = SqliteRepository::new(":memory:")
        .await
        .expect("Failed to create in-memory database");
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

#[tokio::test]
async fn test_load_all_municipalities() {
    let repo = setup_test_db().await;

    let records = SeedLoader::parse_municipalities(TEST_MUNICIPALITIES_CSV.as_bytes())
        .expect("Failed to parse CSV");
    let inserted = SeedLoader::load_municipalities(&repo, records)
        .await
        .expect("Failed to load municipalities");

    assert_eq!(inserted, 4);

    let springfield = repo
        .get_municipality(1)
        .await
        .expect("Municipality 1 should exist");
    assert_eq!(springfield.municipal_name, "Springfield City");
    assert_eq!(springfield.municipal_rate, dec!(0.01));
    assert_eq!(springfield.education_rate, dec!(0.005));
}

#[tokio::test]
async fn test_load_all_properties() {
    let repo = setup_test_db().await;

    let municipalities = SeedLoader::parse_municipalities(TEST_MUNICIPALITIES_CSV.as_bytes())
        .expect("Failed to parse municipalities CSV");
    SeedLoader::load_municipalities(&repo, municipalities)
        .await
        .expect("Failed to load municipalities");

    let records = SeedLoader::parse_properties(TEST_PROPERTIES_CSV.as_bytes())
        .expect("Failed to parse properties CSV");
    let inserted = SeedLoader::load_properties(&repo, records)
        .await
        .expect("Failed to load properties");

    assert_eq!(inserted, 5);

    let property = repo.get_property(101).await.expect("Roll 101 should exist");
    assert_eq!(property.assessment_value, dec!(52500.50));
    assert_eq!(property.municipal_id, 1);
}

#[tokio::test]
async fn test_reload_into_non_empty_table_aborts() {
    let repo = setup_test_db().await;

    let records = SeedLoader::parse_municipalities(TEST_MUNICIPALITIES_CSV.as_bytes())
        .expect("Failed to parse CSV");
    SeedLoader::load_municipalities(&repo, records.clone())
        .await
        .expect("First load should succeed");

    // No dedup: the second load collides on the first row and the whole
    // batch rolls back, leaving exactly the original rows.
    let result = SeedLoader::load_municipalities(&repo, records).await;

    assert!(matches!(
        result,
        Err(SeedLoaderError::Repository(
            roll_core::RepositoryError::Conflict(_)
        ))
    ));
    assert_eq!(repo.list_municipalities().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_malformed_field_aborts_file() {
    let repo = setup_test_db().await;

    let csv = "munid,name_municipal_w_type,municipal_rate,education_rate\n\
               1,Springfield City,0.01,0.005\n\
               2,Shelbyville Township,abc,0.004\n";

    let result = SeedLoader::parse_municipalities(csv.as_bytes());
    assert!(matches!(result, Err(SeedLoaderError::CsvParse(_))));

    // Nothing was ever queued, so the table stays empty.
    assert_eq!(repo.list_municipalities().await.unwrap().len(), 0);
}
