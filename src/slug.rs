//! URL-safe slugs derived from titles.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lower-case `input`, keep only `[a-z0-9]`, whitespace and `-`, turn
/// whitespace runs into a single `-` and collapse repeated `-`.
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            continue;
        }
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    slug
}

/// Slug for a new or retitled document: `<slugified title>-<unix millis>`.
///
/// The timestamp keeps identical titles from colliding. A title with nothing
/// slug-worthy in it gets a random UUID instead.
pub fn unique_slug(title: &str, at: DateTime<Utc>) -> String {
    let base = slugify(title);
    if base.is_empty() {
        return Uuid::new_v4().to_string();
    }
    format!("{}-{}", base, at.timestamp_millis())
}
