use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "rxtrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info")
}

/// Get the application data directory (~/rxtrack/)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(APP_NAME)
}

/// Get the local database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("rxtrack.db")
}
