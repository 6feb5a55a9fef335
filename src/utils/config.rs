use std::env;

/// One batch-write-item call accepts at most 25 put requests, so a scan
/// page must never be larger than that.
pub const MAX_BATCH_ITEMS: i32 = 25;

/// Runtime configuration, resolved from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Skip schema replication and only copy items (`SKIP_CREATION`).
    pub skip_creation: bool,
    /// Target DynamoDB Local instead of the hosted service (`USE_LOCAL`).
    pub use_local: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    /// Number of copy workers; each owns one scan segment.
    pub parallelism: usize,
    /// Items per scan page, and therefore per batch write.
    pub page_size: i32,
    /// Read capacity units for the destination table and its GSIs.
    pub read_capacity: i64,
    /// Write capacity units for the destination table and its GSIs.
    pub write_capacity: i64,
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            skip_creation: flag(env::var("SKIP_CREATION").ok()),
            use_local: flag(env::var("USE_LOCAL").ok()),
            access_key_id: env::var("ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("SECRET_ACCESS_KEY").ok(),
            region: env::var("REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            parallelism: parse_or(env::var("PARALLELISM").ok(), 4).max(1),
            page_size: clamp_page_size(parse_or(env::var("PAGE_SIZE").ok(), 25)),
            read_capacity: parse_or(env::var("READ_CAPACITY").ok(), 3),
            write_capacity: parse_or(env::var("WRITE_CAPACITY").ok(), 1200),
        }
    }
}

/// Treat any set, non-empty value except "0"/"false" as true.
fn flag(value: Option<String>) -> bool {
    match value {
        Some(v) => !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"),
        None => false,
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn clamp_page_size(page_size: i32) -> i32 {
    page_size.clamp(1, MAX_BATCH_ITEMS)
}
