//! # Graphmill Configuration
//!
//! Type-safe configuration for the graphmill loader: which graph database to
//! talk to, how to authenticate, and how ingestion is chunked.
//!
//! Values are resolved in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. A `.env` file in the working directory (absent is fine)
//! 4. Process environment (`NEO4J_URL`, `NEO4J_USER`, `NEO4J_PASSWORD`, ...)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphmill_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load(None)?;
//!     println!("loading into {}", config.database.url);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::*;
pub use loader::*;
