//! gobe-core: settings, tracing and utilities shared by the gobe crates.

pub mod config;
pub mod tracing_setup;
pub mod util;

pub use config::{
    Connector, DbDriver, Format, MongoConfig, OrmOptions, RedisConfig, Settings, SqlConfig,
};
pub use util::{random_code, random_code_string, to_json};
