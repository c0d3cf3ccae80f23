//! `SQLite` schema for the cars table.
//!
//! Launch dates are stored as ISO-8601 `TEXT` (`YYYY-MM-DD`) so that
//! lexical comparison in SQL agrees with date order.

/// Create the cars table if it does not exist.
pub const CREATE_CARS_TABLE: &str = "CREATE TABLE IF NOT EXISTS cars (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    brand TEXT NOT NULL,
    model TEXT NOT NULL,
    price REAL NOT NULL,
    rating REAL NOT NULL,
    launch_date TEXT
)";

/// Add the launch date column to tables created before it existed.
pub const ADD_LAUNCH_DATE_COLUMN: &str = "ALTER TABLE cars ADD COLUMN launch_date TEXT";

/// Column names of the cars table.
pub const TABLE_COLUMNS: &str = "SELECT name FROM pragma_table_info('cars')";

pub const INSERT_CAR: &str =
    "INSERT INTO cars (brand, model, price, rating, launch_date) VALUES (?, ?, ?, ?, ?)";

/// Row count, distinct brands and highest id in one pass.
pub const STATS: &str = "SELECT COUNT(*), COUNT(DISTINCT brand), MAX(id) FROM cars";

/// Format used for the `launch_date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
