//! Bundled UI strings in Spanish and English

mod speech;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

pub use speech::*;

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Es, Language::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// Locale used for speech when no voice matches
    pub fn locale(&self) -> &'static str {
        match self {
            Language::Es => "es-ES",
            Language::En => "en-US",
        }
    }

    fn catalog(&self) -> &'static Value {
        static ES: OnceLock<Value> = OnceLock::new();
        static EN: OnceLock<Value> = OnceLock::new();
        match self {
            Language::Es => ES.get_or_init(|| load(self, include_str!("es.json"))),
            Language::En => EN.get_or_init(|| load(self, include_str!("en.json"))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(Error::validation("language", format!("unsupported language {}", other))),
        }
    }
}

fn load(language: &Language, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        error!("catalog for {} is not valid JSON: {}", language, err);
        Value::Null
    })
}

fn lookup<'a>(catalog: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(catalog, |node, segment| node.get(segment))
        .and_then(Value::as_str)
}

/// Look `key` up in `language`, then in Spanish, then give back `fallback`
/// or the key itself.
pub fn translate(language: Language, key: &str, fallback: Option<&str>) -> String {
    if key.is_empty() {
        return fallback.unwrap_or("").to_string();
    }
    lookup(language.catalog(), key)
        .or_else(|| lookup(Language::default().catalog(), key))
        .or(fallback)
        .unwrap_or(key)
        .to_string()
}

/// `translate` followed by `{name}` placeholder substitution
pub fn translate_with(language: Language, key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(translate(language, key, None), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}
