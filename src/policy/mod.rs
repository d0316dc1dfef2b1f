pub mod config;
pub mod matcher;

// Re-export main types
pub use config::{load_allow_list, AllowList};
pub use matcher::has_valid_license;
