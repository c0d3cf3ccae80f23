//! `SQLite` implementation of `CarStore`.

use async_trait::async_trait;
use carlens_core::{Car, CarStore, NewCar, QueryPlan, SqlValue, StoreError, StoreStats};
use chrono::NaiveDate;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::schema::{
    ADD_LAUNCH_DATE_COLUMN, CREATE_CARS_TABLE, DATE_FORMAT, INSERT_CAR, STATS, TABLE_COLUMNS,
};

const MAX_CONNECTIONS: u32 = 4;

/// Row as read from the cars table.
#[derive(Debug, FromRow)]
struct CarRow {
    id: i64,
    brand: String,
    model: String,
    price: f64,
    rating: f64,
    launch_date: Option<String>,
}

impl CarRow {
    /// Convert to a [`Car`]. Launch dates that do not parse are dropped.
    fn into_car(self) -> Car {
        let launch_date = self.launch_date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .inspect_err(|e| warn!("Car {} has unreadable launch date {:?}: {}", self.id, raw, e))
                .ok()
        });

        Car {
            id: self.id,
            brand: self.brand,
            model: self.model,
            price: self.price,
            rating: self.rating,
            launch_date,
        }
    }
}

/// SQLite-backed car store.
pub struct SqliteStore {
    /// Path to the database file
    db_path: PathBuf,
    /// Connection pool (lazy initialized)
    pool: RwLock<Option<SqlitePool>>,
}

impl SqliteStore {
    /// Create a new `SqliteStore`. Nothing is opened until first use.
    #[must_use]
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            pool: RwLock::new(None),
        }
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get or open the pool.
    async fn get_pool(&self) -> Result<SqlitePool, StoreError> {
        {
            let pool = self.pool.read().await;
            if let Some(ref p) = *pool {
                return Ok(p.clone());
            }
        }

        let mut guard = self.pool.write().await;
        if let Some(ref p) = *guard {
            return Ok(p.clone());
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Init(format!("Failed to open {:?}: {e}", self.db_path)))?;

        *guard = Some(pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl CarStore for SqliteStore {
    async fn init(&self) -> Result<(), StoreError> {
        info!("Initializing SQLite store at {:?}", self.db_path);

        // Ensure directory exists
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Init(format!("Failed to create db directory: {e}")))?;
        }

        let pool = self.get_pool().await?;

        sqlx::query(CREATE_CARS_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Schema(format!("Failed to create cars table: {e}")))?;

        let columns: Vec<String> = sqlx::query_scalar(TABLE_COLUMNS)
            .fetch_all(&pool)
            .await
            .map_err(|e| StoreError::Schema(format!("Failed to read table info: {e}")))?;

        if !columns.iter().any(|c| c == "launch_date") {
            info!("Adding launch_date column to existing cars table");
            sqlx::query(ADD_LAUNCH_DATE_COLUMN)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::Schema(format!("Failed to add launch_date: {e}")))?;
        }

        info!("SQLite store initialized successfully");
        Ok(())
    }

    async fn insert(&self, car: &NewCar) -> Result<i64, StoreError> {
        let pool = self.get_pool().await?;

        let result = sqlx::query(INSERT_CAR)
            .bind(&car.brand)
            .bind(&car.model)
            .bind(car.price)
            .bind(car.rating)
            .bind(car.launch_date.map(|d| d.format(DATE_FORMAT).to_string()))
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Insert(format!("Failed to insert car: {e}")))?;

        let id = result.last_insert_rowid();
        debug!("Inserted car {}", id);
        Ok(id)
    }

    async fn query(&self, plan: &QueryPlan) -> Result<Vec<Car>, StoreError> {
        let pool = self.get_pool().await?;
        let statement = plan.to_sql();
        debug!("Running {} with {} params", statement.text, statement.params.len());

        let mut query = sqlx::query_as::<_, CarRow>(&statement.text);
        for param in &statement.params {
            query = match param {
                SqlValue::Text(s) => query.bind(s.as_str()),
                SqlValue::Real(r) => query.bind(*r),
                SqlValue::Integer(i) => query.bind(*i),
            };
        }

        let rows = query
            .fetch_all(&pool)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to query cars: {e}")))?;

        debug!("Query matched {} cars", rows.len());
        Ok(rows.into_iter().map(CarRow::into_car).collect())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let pool = self.get_pool().await?;

        let (total, brands, last_id): (i64, i64, Option<i64>) = sqlx::query_as(STATS)
            .fetch_one(&pool)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read stats: {e}")))?;

        Ok(StoreStats {
            total_cars: u64::try_from(total).unwrap_or_default(),
            brands: u64::try_from(brands).unwrap_or_default(),
            last_inserted_id: last_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carlens_core::{Ordering, Predicate};
    use tempfile::tempdir;

    fn create_test_car(brand: &str, rating: f64, launch: Option<NaiveDate>) -> NewCar {
        NewCar {
            brand: brand.to_string(),
            model: "Frontier".to_string(),
            price: 120_000.0,
            rating,
            launch_date: launch,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn open(dir: &Path) -> SqliteStore {
        let store = SqliteStore::new(dir.join("cars.db"));
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_init_creates_database_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cars.db");
        let store = SqliteStore::new(path.clone());

        store.init().await.unwrap();
        store.init().await.unwrap();

        assert!(path.exists());
        assert_eq!(store.db_path(), path.as_path());
    }

    #[tokio::test]
    async fn test_insert_and_query_round_trip() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;

        let car = create_test_car("Nissan", 4.5, Some(ymd(2021, 8, 15)));
        let id = store.insert(&car).await.unwrap();
        assert_eq!(id, 1);

        let cars = store.query(&QueryPlan::all()).await.unwrap();
        assert_eq!(cars, vec![car.with_id(1)]);
    }

    #[tokio::test]
    async fn test_rating_order_with_id_tie_break() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        for rating in [4.0, 5.0, 4.0, 3.0] {
            store.insert(&create_test_car("Nissan", rating, None)).await.unwrap();
        }

        let plan = QueryPlan::all().ordered_by(Ordering::RatingDesc).limited_to(3);
        let cars = store.query(&plan).await.unwrap();

        let ids: Vec<i64> = cars.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_date_range_skips_unknown_dates() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        store
            .insert(&create_test_car("Nissan", 4.0, Some(ymd(2009, 12, 31))))
            .await
            .unwrap();
        store
            .insert(&create_test_car("Nissan", 4.0, Some(ymd(2010, 1, 1))))
            .await
            .unwrap();
        store.insert(&create_test_car("Nissan", 4.0, None)).await.unwrap();
        store
            .insert(&create_test_car("Nissan", 4.0, Some(ymd(2020, 12, 31))))
            .await
            .unwrap();

        let plan = QueryPlan::all()
            .with_predicate(Predicate::LaunchedOnOrAfter(ymd(2010, 1, 1)))
            .with_predicate(Predicate::LaunchedOnOrBefore(ymd(2020, 12, 31)));
        let cars = store.query(&plan).await.unwrap();

        let ids: Vec<i64> = cars.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_hostile_brand_is_data() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        let hostile = "Nissan'; DROP TABLE cars; --";
        store.insert(&create_test_car(hostile, 4.0, None)).await.unwrap();
        store.insert(&create_test_car("Honda", 4.0, None)).await.unwrap();

        let plan = QueryPlan::all().with_predicate(Predicate::BrandEq(hostile.to_string()));
        let cars = store.query(&plan).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].brand, hostile);

        assert_eq!(store.stats().await.unwrap().total_cars, 2);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = open(dir.path()).await;
            store.insert(&create_test_car("Kia", 3.5, None)).await.unwrap();
        }

        let store = open(dir.path()).await;
        let cars = store.query(&QueryPlan::all()).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].brand, "Kia");
        assert_eq!(store.insert(&create_test_car("Kia", 3.5, None)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_init_migrates_table_without_launch_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let legacy = SqlitePool::connect_with(options).await.unwrap();
        sqlx::query(
            "CREATE TABLE cars (id INTEGER PRIMARY KEY AUTOINCREMENT, brand TEXT NOT NULL, \
             model TEXT NOT NULL, price REAL NOT NULL, rating REAL NOT NULL)",
        )
        .execute(&legacy)
        .await
        .unwrap();
        sqlx::query("INSERT INTO cars (brand, model, price, rating) VALUES ('Fiat', 'Uno', 30000.0, 3.0)")
            .execute(&legacy)
            .await
            .unwrap();
        legacy.close().await;

        let store = SqliteStore::new(path);
        store.init().await.unwrap();

        let cars = store.query(&QueryPlan::all()).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].brand, "Fiat");
        assert!(cars[0].launch_date.is_none());

        let id = store
            .insert(&create_test_car("Fiat", 4.0, Some(ymd(2022, 2, 2))))
            .await
            .unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn test_unreadable_launch_date_is_dropped() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        let pool = store.get_pool().await.unwrap();
        sqlx::query(
            "INSERT INTO cars (brand, model, price, rating, launch_date) \
             VALUES ('Ford', 'Ka', 40000.0, 3.0, 'sometime in spring')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let cars = store.query(&QueryPlan::all()).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert!(cars[0].launch_date.is_none());
    }

    #[tokio::test]
    async fn test_stats() {
        let dir = tempdir().unwrap();
        let store = open(dir.path()).await;
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());

        store.insert(&create_test_car("Kia", 3.5, None)).await.unwrap();
        store.insert(&create_test_car("Kia", 4.5, None)).await.unwrap();
        store.insert(&create_test_car("Fiat", 4.0, None)).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_cars, 3);
        assert_eq!(stats.brands, 2);
        assert_eq!(stats.last_inserted_id, Some(3));
    }
}
