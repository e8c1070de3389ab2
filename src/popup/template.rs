//! `{key}` placeholder substitution
//!
//! Keys are literal text. The matcher is compiled from escaped keys, so a key
//! such as `a.b` or `price ($)` only ever matches itself. Substitution is a
//! single left-to-right pass: replacement values are never rescanned, and a
//! placeholder without a key is left exactly as written.

use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Substitution table for popup content.
///
/// From JSON, values may be strings, numbers or booleans; numbers and
/// booleans are inserted in their JSON spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, serde_json::Value>")]
pub struct TemplateKeys {
    values: BTreeMap<String, String>,
}

impl TemplateKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a substitution, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `{key}` in `template` with its value
    pub fn render<'a>(&self, template: &'a str) -> Result<Cow<'a, str>, regex::Error> {
        if self.values.is_empty() || !template.contains('{') {
            return Ok(Cow::Borrowed(template));
        }

        let matcher = self.matcher()?;
        Ok(matcher.replace_all(template, |caps: &regex::Captures<'_>| {
            self.values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        }))
    }

    /// Build `\{(k1|k2|...)\}` with longer keys first so that, when two keys
    /// match at the same position, the longest one wins.
    fn matcher(&self) -> Result<Regex, regex::Error> {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");

        Regex::new(&format!(r"\{{({alternation})\}}"))
    }
}

impl From<BTreeMap<String, String>> for TemplateKeys {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for TemplateKeys {
    type Error = String;

    fn try_from(raw: BTreeMap<String, serde_json::Value>) -> Result<Self, Self::Error> {
        use serde_json::Value;

        let values = raw
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => Ok((key, text)),
                Value::Number(number) => Ok((key, number.to_string())),
                Value::Bool(flag) => Ok((key, flag.to_string())),
                other => Err(format!(
                    "template key '{key}' must be a string, number or boolean, got {other}"
                )),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { values })
    }
}

impl From<std::collections::HashMap<String, String>> for TemplateKeys {
    fn from(values: std::collections::HashMap<String, String>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for TemplateKeys
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateKeys
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
