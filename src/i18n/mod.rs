//! Language names and codes offered to the host.
//!
//! # Architecture
//!
//! - `registry`: the immutable catalog mapping display names to backend-neutral codes
//!
//! # Example
//!
//! ```rust
//! use text_translator_node::i18n::{LanguageCatalog, AUTO};
//!
//! let catalog = LanguageCatalog::get();
//! assert_eq!(catalog.resolve("Spanish").unwrap(), "es");
//! assert_eq!(catalog.resolve("auto").unwrap(), AUTO);
//! assert!(catalog.resolve("Klingon").is_err());
//! ```

mod registry;

pub use registry::{CatalogError, LanguageCatalog, LanguageEntry, AUTO};
