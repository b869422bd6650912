//! Serde helpers that normalize request fields before validation runs.

use serde::{Deserialize, Deserializer};

use crate::utils::html::clean_html;

pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()))
}

/// Runs user text through the HTML sanitizer, so length rules apply to what
/// actually gets stored.
pub fn sanitized<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| sanitize(&s))
}

pub fn sanitized_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| sanitize(&s)))
}

pub fn sanitize(raw: &str) -> String {
    clean_html(raw).trim().to_string()
}

/// Emails are stored trimmed and lowercased so uniqueness is case-insensitive.
pub fn email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| normalize_email(&s))
}

pub fn email_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| normalize_email(&s)))
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
