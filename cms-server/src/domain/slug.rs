use super::error::DomainError;

/// Derives a URL-safe slug: lowercase, alphanumeric runs joined by single
/// hyphens, everything else dropped. "Hello, World!" -> "hello-world".
pub(crate) fn slugify(field: &'static str, source: &str) -> Result<String, DomainError> {
    let mut slug = String::with_capacity(source.len());

    for ch in source.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must contain at least one alphanumeric character",
        });
    }
    Ok(slug)
}
