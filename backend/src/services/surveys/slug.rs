use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase ASCII words of `title` joined by `-`, or `survey` when nothing is left.
/// Uniqueness is settled when the survey is inserted.
pub(crate) fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = SEPARATORS.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "survey".to_string()
    } else {
        slug.to_string()
    }
}
