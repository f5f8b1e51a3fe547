//! Host boundary for the translator node.
//!
//! The graph runtime that hosts this node discovers it by class name, reads
//! its declared inputs, calls `translate`, and expects exactly one string back.
//! This is the only place the tagged dispatch result is flattened into that
//! string: failures become `"[ERROR] Translation error: <message>"`.

use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tracing::error;

use crate::backend::{BackendId, BackendRegistry};
use crate::config::Config;
use crate::dispatcher::{
    DispatchError, TranslationDispatcher, TranslationRequest, DEFAULT_TIMEOUT_SECS,
    MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
use crate::i18n::LanguageCatalog;

pub const NODE_CLASS_NAME: &str = "TranslatorNode";
pub const NODE_DISPLAY_NAME: &str = "Text Translator";
pub const RETURN_TYPES: [&str; 1] = ["STRING"];
pub const RETURN_NAMES: [&str; 1] = ["translated_text"];
pub const FUNCTION: &str = "translate";
pub const CATEGORY: &str = "text/translation";

/// Prefix marking an output string as a failure report.
pub const ERROR_PREFIX: &str = "[ERROR] ";

const DEFAULT_TEXT: &str = "Hello, world!";
const DEFAULT_TRANSLATOR: &str = "bing";
const DEFAULT_FROM_LANGUAGE: &str = "auto";
const DEFAULT_TO_LANGUAGE: &str = "English";
const TIMEOUT_STEP: f64 = 0.5;

/// Named inputs as the host passes them. Missing optional inputs take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInputs {
    pub text: String,
    pub translator: String,
    pub from_language: String,
    pub to_language: String,
    pub if_use_preacceleration: bool,
    pub timeout: f64,
}

impl Default for NodeInputs {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            translator: DEFAULT_TRANSLATOR.to_string(),
            from_language: DEFAULT_FROM_LANGUAGE.to_string(),
            to_language: DEFAULT_TO_LANGUAGE.to_string(),
            if_use_preacceleration: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<NodeInputs> for TranslationRequest {
    fn from(inputs: NodeInputs) -> Self {
        TranslationRequest::new(
            inputs.text,
            inputs.translator,
            inputs.from_language,
            inputs.to_language,
        )
        .with_warmup(inputs.if_use_preacceleration)
        .with_timeout(inputs.timeout)
    }
}

/// Input schema declared to the host ahead of any invocation.
pub fn input_types() -> Value {
    let languages = LanguageCatalog::get().list_display_names();
    json!({
        "required": {
            "text": ["STRING", {"multiline": true, "default": DEFAULT_TEXT}],
            "translator": [BackendId::names(), {"default": DEFAULT_TRANSLATOR}],
            "from_language": [languages, {"default": DEFAULT_FROM_LANGUAGE}],
            "to_language": [languages, {"default": DEFAULT_TO_LANGUAGE}],
        },
        "optional": {
            "if_use_preacceleration": ["BOOLEAN", {"default": false}],
            "timeout": ["FLOAT", {
                "default": DEFAULT_TIMEOUT_SECS,
                "min": MIN_TIMEOUT_SECS,
                "max": MAX_TIMEOUT_SECS,
                "step": TIMEOUT_STEP,
            }],
        }
    })
}

/// Class name to display name pairing used for host discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRegistration {
    pub class_name: &'static str,
    pub display_name: &'static str,
}

pub fn node_registrations() -> Vec<NodeRegistration> {
    vec![NodeRegistration {
        class_name: NODE_CLASS_NAME,
        display_name: NODE_DISPLAY_NAME,
    }]
}

fn error_output(message: impl Display) -> String {
    let error_msg = format!("Translation error: {}", message);
    error!("{}", error_msg);
    format!("{}{}", ERROR_PREFIX, error_msg)
}

/// Collapse a dispatch result into the single output string.
pub fn flatten(result: Result<String, DispatchError>) -> String {
    match result {
        Ok(translated) => translated,
        Err(e) => error_output(e),
    }
}

pub struct TranslatorNode {
    dispatcher: TranslationDispatcher,
}

impl TranslatorNode {
    pub fn new(dispatcher: TranslationDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Node backed by the built-in handlers that `config` enables.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = BackendRegistry::from_config(config)?;
        Ok(Self::new(TranslationDispatcher::new(Arc::new(registry))))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    pub fn dispatcher(&self) -> &TranslationDispatcher {
        &self.dispatcher
    }

    /// Run one translation. Always yields exactly one string.
    pub async fn translate(&self, inputs: NodeInputs) -> (String,) {
        let request = TranslationRequest::from(inputs);
        // A host-registered handler may panic; that still has to come back as a string
        let outcome = AssertUnwindSafe(self.dispatcher.translate(&request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(result) => (flatten(result),),
            Err(_) => (error_output(format!("{} backend panicked", request.backend_id)),),
        }
    }

    /// `translate` for hosts that call in synchronously.
    ///
    /// Outside a runtime a private current-thread runtime is started. Inside a
    /// multi-threaded runtime the worker is handed over with `block_in_place`.
    /// A current-thread runtime cannot be blocked on, so that case reports an
    /// error string instead.
    pub fn translate_blocking(&self, inputs: NodeInputs) -> (String,) {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.translate(inputs)))
            }
            Ok(_) => (error_output(
                "translate_blocking called on a current-thread runtime; await translate instead",
            ),),
            Err(_) => match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(self.translate(inputs)),
                Err(e) => (error_output(format!("failed to start runtime: {}", e)),),
            },
        }
    }
}
