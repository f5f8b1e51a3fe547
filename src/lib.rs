//! Text translation node: one operation, translate a block of text, served by
//! one of many interchangeable translation backends.
//!
//! - `i18n`: language display names and their backend-neutral codes
//! - `backend`: backend ids, the handler trait, built-in HTTP handlers, the registry
//! - `dispatcher`: request validation, warm-up, timeout, tagged result
//! - `node`: the host-facing adapter that always returns a single string

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod i18n;
pub mod logging;
pub mod node;

pub use dispatcher::{DispatchError, ErrorKind, TranslationDispatcher, TranslationRequest};
pub use node::{NodeInputs, TranslatorNode};
