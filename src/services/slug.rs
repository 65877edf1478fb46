//! URL-safe slugs for ingredient and menu names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ServiceError;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9-]+").expect("slug character class is valid"));
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new("-+").expect("dash pattern is valid"));

/// Lowercases `name`, turns spaces into `-`, drops anything outside
/// `[a-z0-9-]`, collapses runs of `-` and trims them from both ends.
///
/// Only the space character becomes a dash; tabs and newlines are dropped.
pub fn slugify(name: &str) -> String {
    let dashed = name.to_lowercase().replace(' ', "-");
    let kept = DISALLOWED.replace_all(&dashed, "");
    DASH_RUNS.replace_all(&kept, "-").trim_matches('-').to_string()
}

/// Like [`slugify`] but rejects names that leave nothing behind.
pub fn slug_for(name: &str) -> Result<String, ServiceError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "name '{}' must contain at least one letter or digit",
            name
        )));
    }
    Ok(slug)
}
