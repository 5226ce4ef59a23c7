//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; missing sections fall back to the defaults in `types`.
//!
//! # Example
//!
//! ```no_run
//! use weibo_comment_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Cool-down every {} records", config.crawler.cooldown_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
