use std::str::FromStr;

use async_trait::async_trait;
use roll_core::{
    Municipality, MunicipalityPatch, Property, PropertyPatch, RepositoryError, RollRepository,
};
use rust_decimal::Decimal;
use sqlx::{
    FromRow,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (or create) the database at `database_url`.
    ///
    /// Accepts a bare path (`property_records.db`), a sqlx-style URL
    /// (`sqlite:property_records.db`), or `:memory:`.  The file is created
    /// if it does not exist.  The foreign_keys pragma stays off: the
    /// property→municipality reference is declared but never enforced.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Connection(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(false);

        // A pooled in-memory database is a separate database per connection;
        // cap the pool at one and keep that connection alive.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePool::connect_with(options).await
        }
        .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(FromRow)]
struct MunicipalityRow {
    municipal_id: i64,
    municipal_name: String,
    municipal_rate: String,
    education_rate: String,
}

impl TryFrom<MunicipalityRow> for Municipality {
    type Error = RepositoryError;

    fn try_from(row: MunicipalityRow) -> Result<Self, Self::Error> {
        Ok(Municipality {
            municipal_id: row.municipal_id,
            municipal_name: row.municipal_name,
            municipal_rate: parse_decimal(&row.municipal_rate)?,
            education_rate: parse_decimal(&row.education_rate)?,
        })
    }
}

#[derive(FromRow)]
struct PropertyRow {
    assessment_roll_number: i64,
    assessment_value: String,
    municipal_id: i64,
}

impl TryFrom<PropertyRow> for Property {
    type Error = RepositoryError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        Ok(Property {
            assessment_roll_number: row.assessment_roll_number,
            assessment_value: parse_decimal(&row.assessment_value)?,
            municipal_id: row.municipal_id,
        })
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{}': {}", s, e)))
}

/// Map an insert failure, turning a unique-constraint violation into
/// [`RepositoryError::Conflict`] that names the offending key.
fn insert_error(e: sqlx::Error, entity: &str, key: i64) -> RepositoryError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("{} {} already exists", entity, key))
        }
        _ => RepositoryError::Database(e.to_string()),
    }
}

#[async_trait]
impl RollRepository for SqliteRepository {
    async fn list_municipalities(&self) -> Result<Vec<Municipality>, RepositoryError> {
        let rows: Vec<MunicipalityRow> = sqlx::query_as(
            "SELECT municipal_id, municipal_name, municipal_rate, education_rate
             FROM municipalities",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_municipality(&self, municipal_id: i64) -> Result<Municipality, RepositoryError> {
        let row: MunicipalityRow = sqlx::query_as(
            "SELECT municipal_id, municipal_name, municipal_rate, education_rate
             FROM municipalities WHERE municipal_id = ?",
        )
        .bind(municipal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn create_municipality(
        &self,
        municipality: &Municipality,
    ) -> Result<Municipality, RepositoryError> {
        sqlx::query(
            "INSERT INTO municipalities (municipal_id, municipal_name, municipal_rate, education_rate)
             VALUES (?, ?, ?, ?)",
        )
        .bind(municipality.municipal_id)
        .bind(&municipality.municipal_name)
        .bind(municipality.municipal_rate.to_string())
        .bind(municipality.education_rate.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "municipality", municipality.municipal_id))?;

        self.get_municipality(municipality.municipal_id).await
    }

    async fn update_municipality(
        &self,
        municipal_id: i64,
        patch: MunicipalityPatch,
    ) -> Result<Municipality, RepositoryError> {
        let mut municipality = self.get_municipality(municipal_id).await?;
        patch.apply(&mut municipality);

        let result = sqlx::query(
            "UPDATE municipalities
             SET municipal_name = ?, municipal_rate = ?, education_rate = ?
             WHERE municipal_id = ?",
        )
        .bind(&municipality.municipal_name)
        .bind(municipality.municipal_rate.to_string())
        .bind(municipality.education_rate.to_string())
        .bind(municipal_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(municipality)
    }

    async fn delete_municipality(&self, municipal_id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM municipalities WHERE municipal_id = ?")
            .bind(municipal_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn insert_municipalities(
        &self,
        municipalities: &[Municipality],
    ) -> Result<usize, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        for municipality in municipalities {
            sqlx::query(
                "INSERT INTO municipalities (municipal_id, municipal_name, municipal_rate, education_rate)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(municipality.municipal_id)
            .bind(&municipality.municipal_name)
            .bind(municipality.municipal_rate.to_string())
            .bind(municipality.education_rate.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, "municipality", municipality.municipal_id))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(municipalities.len())
    }

    async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError> {
        let rows: Vec<PropertyRow> = sqlx::query_as(
            "SELECT assessment_roll_number, assessment_value, municipal_id
             FROM properties",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_property(
        &self,
        assessment_roll_number: i64,
    ) -> Result<Property, RepositoryError> {
        let row: PropertyRow = sqlx::query_as(
            "SELECT assessment_roll_number, assessment_value, municipal_id
             FROM properties WHERE assessment_roll_number = ?",
        )
        .bind(assessment_roll_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn create_property(&self, property: &Property) -> Result<Property, RepositoryError> {
        sqlx::query(
            "INSERT INTO properties (assessment_roll_number, assessment_value, municipal_id)
             VALUES (?, ?, ?)",
        )
        .bind(property.assessment_roll_number)
        .bind(property.assessment_value.to_string())
        .bind(property.municipal_id)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "property", property.assessment_roll_number))?;

        self.get_property(property.assessment_roll_number).await
    }

    async fn update_property(
        &self,
        assessment_roll_number: i64,
        patch: PropertyPatch,
    ) -> Result<Property, RepositoryError> {
        let mut property = self.get_property(assessment_roll_number).await?;
        patch.apply(&mut property);

        let result = sqlx::query(
            "UPDATE properties SET assessment_value = ?, municipal_id = ?
             WHERE assessment_roll_number = ?",
        )
        .bind(property.assessment_value.to_string())
        .bind(property.municipal_id)
        .bind(assessment_roll_number)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(property)
    }

    async fn delete_property(&self, assessment_roll_number: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM properties WHERE assessment_roll_number = ?")
            .bind(assessment_roll_number)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn insert_properties(&self, properties: &[Property]) -> Result<usize, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        for property in properties {
            sqlx::query(
                "INSERT INTO properties (assessment_roll_number, assessment_value, municipal_id)
                 VALUES (?, ?, ?)",
            )
            .bind(property.assessment_roll_number)
            .bind(property.assessment_value.to_string())
            .bind(property.municipal_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, "property", property.assessment_roll_number))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(properties.len())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::new(":memory:")
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn springfield() -> Municipality {
        Municipality {
            municipal_id: 1,
            municipal_name: "Springfield".to_string(),
            municipal_rate: dec!(0.01),
            education_rate: dec!(0.005),
        }
    }

    fn shelbyville() -> Municipality {
        Municipality {
            municipal_id: 2,
            municipal_name: "Shelbyville".to_string(),
            municipal_rate: dec!(0.015),
            education_rate: dec!(0.004),
        }
    }

    fn sample_property() -> Property {
        Property {
            assessment_roll_number: 100,
            assessment_value: dec!(40000),
            municipal_id: 1,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_municipality() {
        let repo = setup_test_db().await;

        let created = repo
            .create_municipality(&springfield())
            .await
            .expect("Should create municipality");
        assert_eq!(created, springfield());

        let fetched = repo
            .get_municipality(1)
            .await
            .expect("Should fetch municipality");
        assert_eq!(fetched, springfield());
    }

    #[tokio::test]
    async fn test_get_municipality_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_municipality(999).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_municipalities() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();
        repo.create_municipality(&shelbyville()).await.unwrap();

        let all = repo
            .list_municipalities()
            .await
            .expect("Should list municipalities");

        assert_eq!(all.len(), 2);
        assert!(all.contains(&springfield()));
        assert!(all.contains(&shelbyville()));
    }

    #[tokio::test]
    async fn test_duplicate_municipality_is_conflict() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();

        let mut duplicate = springfield();
        duplicate.municipal_name = "Springfield Township".to_string();
        let result = repo.create_municipality(&duplicate).await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        // The first record is unchanged.
        let fetched = repo.get_municipality(1).await.unwrap();
        assert_eq!(fetched, springfield());
    }

    #[tokio::test]
    async fn test_update_municipality_partial() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();

        let patch = MunicipalityPatch {
            municipal_rate: Some(dec!(0.02)),
            ..Default::default()
        };
        let updated = repo
            .update_municipality(1, patch)
            .await
            .expect("Should update municipality");

        assert_eq!(updated.municipal_name, "Springfield");
        assert_eq!(updated.municipal_rate, dec!(0.02));
        assert_eq!(updated.education_rate, dec!(0.005));

        let fetched = repo.get_municipality(1).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_update_municipality_empty_patch_is_noop() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();

        let updated = repo
            .update_municipality(1, MunicipalityPatch::default())
            .await
            .expect("Empty patch should still succeed");

        assert_eq!(updated, springfield());
        assert_eq!(repo.get_municipality(1).await.unwrap(), springfield());
    }

    #[tokio::test]
    async fn test_update_municipality_not_found() {
        let repo = setup_test_db().await;

        let result = repo
            .update_municipality(999, MunicipalityPatch::default())
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_municipality() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();
        repo.delete_municipality(1)
            .await
            .expect("Should delete municipality");

        let result = repo.get_municipality(1).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_municipality_not_found() {
        let repo = setup_test_db().await;

        let result = repo.delete_municipality(999).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_insert_municipalities_batch() {
        let repo = setup_test_db().await;

        let inserted = repo
            .insert_municipalities(&[springfield(), shelbyville()])
            .await
            .expect("Should insert batch");

        assert_eq!(inserted, 2);
        assert_eq!(repo.list_municipalities().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_municipalities_batch_is_atomic() {
        let repo = setup_test_db().await;

        // Third row collides with the first; nothing may land.
        let batch = vec![springfield(), shelbyville(), springfield()];
        let result = repo.insert_municipalities(&batch).await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(repo.list_municipalities().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_and_get_property() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();

        let created = repo
            .create_property(&sample_property())
            .await
            .expect("Should create property");
        assert_eq!(created, sample_property());

        let fetched = repo.get_property(100).await.expect("Should fetch property");
        assert_eq!(fetched, sample_property());
    }

    #[tokio::test]
    async fn test_update_property_keeps_absent_fields() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();
        repo.create_property(&sample_property()).await.unwrap();

        let patch = PropertyPatch {
            assessment_value: Some(dec!(50000)),
            municipal_id: None,
        };
        let updated = repo
            .update_property(100, patch)
            .await
            .expect("Should update property");

        assert_eq!(updated.assessment_roll_number, 100);
        assert_eq!(updated.assessment_value, dec!(50000));
        assert_eq!(updated.municipal_id, 1);
    }

    #[tokio::test]
    async fn test_delete_property_then_get_is_not_found() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();
        repo.create_property(&sample_property()).await.unwrap();

        repo.delete_property(100).await.expect("Should delete");
        let result = repo.get_property(100).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_insert_properties_batch_is_atomic() {
        let repo = setup_test_db().await;

        let batch = vec![sample_property(), sample_property()];
        let result = repo.insert_properties(&batch).await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(repo.list_properties().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_referenced_municipality_leaves_dangling_reference() {
        let repo = setup_test_db().await;

        repo.create_municipality(&springfield()).await.unwrap();
        repo.create_property(&sample_property()).await.unwrap();

        // No cascade, no guard.
        repo.delete_municipality(1)
            .await
            .expect("Delete should succeed even while referenced");

        let property = repo.get_property(100).await.unwrap();
        assert_eq!(property.municipal_id, 1);
        assert!(matches!(
            repo.get_municipality(1).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_property_may_reference_missing_municipality() {
        let repo = setup_test_db().await;

        // municipal_id 42 does not exist; the insert still succeeds.
        let orphan = Property {
            assessment_roll_number: 7,
            assessment_value: dec!(12500.50),
            municipal_id: 42,
        };
        let created = repo.create_property(&orphan).await.unwrap();
        assert_eq!(created, orphan);
    }
}
