//! URL slug generation for content records.

/// Convert a title into a URL-safe slug.
///
/// Lowercases ASCII-alphanumeric characters and collapses every run of
/// other characters into a single `-`, trimming leading and trailing
/// separators. Matches the slugs stored by earlier deployments, so
/// existing content URLs keep resolving.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(slugify("A -- strange   title!"), "a-strange-title");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(slugify("  ...Leading and trailing?! "), "leading-and-trailing");
    }

    #[test]
    fn test_numbers_survive() {
        assert_eq!(slugify("Top 10 links of 2025"), "top-10-links-of-2025");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
