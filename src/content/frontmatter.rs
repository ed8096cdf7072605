//! Front-matter parsing and schema validation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::error::ContentError;

/// Keys computed by the compiler; authors may not set them
const DERIVED_KEYS: &[&str] = &["slug", "url", "readTime", "read_time"];

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Errors splitting the front-matter block from the body
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontmatterError {
    #[error("document does not start with a --- front-matter block")]
    Missing,

    #[error("unclosed front-matter block, missing closing ---")]
    Unclosed,

    #[error("invalid YAML: {0}")]
    InvalidYaml(String),
}

/// Raw front-matter as authored; every field is optional at this stage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub published: bool,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub featured: bool,

    /// Keys outside the schema, checked and then dropped
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            date: None,
            published: true,
            tags: Vec::new(),
            image: None,
            featured: false,
            extra: BTreeMap::new(),
        }
    }
}

/// Front-matter after validation: every required field present and typed
#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub published: bool,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub featured: bool,
}

impl FrontMatter {
    /// Split a document into front-matter and body
    pub fn parse(content: &str) -> Result<(Self, &str), FrontmatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();
        let Some(rest) = content.strip_prefix("---") else {
            return Err(FrontmatterError::Missing);
        };
        let rest = rest.trim_start_matches([' ', '\t']);
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .ok_or(FrontmatterError::Missing)?;

        // The block may be empty, in which case the closing fence starts the remainder
        let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else {
            let end_pos = rest.find("\n---").ok_or(FrontmatterError::Unclosed)?;
            (&rest[..end_pos], &rest[end_pos + 4..])
        };
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;
        Ok((fm, remaining))
    }

    /// Check the schema and coerce into a fixed-shape record.
    ///
    /// All problems with the document are reported, not only the first.
    pub fn into_meta(self, path: &Path) -> Result<PostMeta, Vec<ContentError>> {
        let mut errors = Vec::new();

        for key in self.extra.keys() {
            if DERIVED_KEYS.contains(&key.as_str()) {
                errors.push(ContentError::DerivedField {
                    path: path.to_path_buf(),
                    field: key.clone(),
                });
            } else {
                tracing::warn!("{:?}: ignoring unknown front-matter key `{}`", path, key);
            }
        }

        let title = required(self.title, "title", path, &mut errors);
        let description = required(self.description, "description", path, &mut errors);
        let date = match required(self.date, "date", path, &mut errors) {
            Some(raw) => match parse_date_string(&raw) {
                Some(date) => Some(date),
                None => {
                    errors.push(ContentError::InvalidDate {
                        path: path.to_path_buf(),
                        value: raw,
                    });
                    None
                }
            },
            None => None,
        };

        match (title, description, date) {
            (Some(title), Some(description), Some(date)) if errors.is_empty() => Ok(PostMeta {
                title,
                description,
                date,
                published: self.published,
                tags: self.tags,
                image: self.image.filter(|s| !s.trim().is_empty()),
                featured: self.featured,
            }),
            _ => Err(errors),
        }
    }
}

fn required(
    value: Option<String>,
    field: &'static str,
    path: &Path,
    errors: &mut Vec<ContentError>,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(ContentError::MissingField {
                path: path.to_path_buf(),
                field,
            });
            None
        }
    }
}

/// Parse a date string in various formats, interpreting naive values as UTC
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}
