/// Database connection and schema creation
pub mod database;

/// Application settings and the default category seed list
pub mod settings;

pub use settings::{AppConfig, CategorySeed, load_app_configuration};
