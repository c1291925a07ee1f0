//! Wire types for the archive's search and metadata endpoints.
//!
//! The archive is loose about field shapes: `creator` or `subject` may be a
//! string or a list, `year` may be a string or a number. Scalar fields are
//! normalised to `Option<String>` on the way in, keeping the first entry of a
//! list and dropping empty strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `advancedsearch` response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub response: Option<SearchResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default, rename = "numFound")]
    pub num_found: Option<u64>,

    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// Lightweight search hit, before hydration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchDoc {
    pub identifier: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub creator: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub year: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub subject: Option<String>,
}

impl SearchDoc {
    /// Release year: `year`, else the leading four characters of `date`
    pub fn release_year(&self) -> Option<String> {
        release_year(self.year.as_deref(), self.date.as_deref())
    }
}

/// `metadata/{identifier}` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub metadata: ItemInfo,

    #[serde(default)]
    pub files: Vec<ArchiveFile>,
}

/// Descriptive metadata block of an item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemInfo {
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub creator: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub year: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub subject: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub description: Option<String>,
}

impl ItemInfo {
    pub fn release_year(&self) -> Option<String> {
        release_year(self.year.as_deref(), self.date.as_deref())
    }
}

/// One file inside an archive item
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArchiveFile {
    pub name: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub format: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub track: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub length: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub size: Option<String>,

    #[serde(default, deserialize_with = "loose_text")]
    pub source: Option<String>,
}

impl ArchiveFile {
    /// Convenience constructor for a file known only by name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn release_year(year: Option<&str>, date: Option<&str>) -> Option<String> {
    year.map(str::to_string)
        .or_else(|| date.map(|d| d.chars().take(4).collect()))
}

fn loose_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_of))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(text_of),
        _ => None,
    }
}
