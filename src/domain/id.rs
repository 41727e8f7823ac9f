//! Workflow ID generation
//!
//! All IDs use the format: `{6-char-hex}-wf-{slug}`
//! Example: `019430-wf-invoice-notifier`

/// Generate a workflow ID from a display name
pub fn generate_id(name: &str) -> String {
    let uuid = uuid::Uuid::now_v7();
    let hex_prefix = &uuid.to_string()[..6];
    let slug = slugify(name);
    format!("{}-wf-{}", hex_prefix, slug)
}

/// Slugify a name for use in IDs
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        // Strip apostrophes entirely, replace other non-alphanumeric with hyphens
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect()
}

/// Check if a workflow ID matches a partial reference
///
/// Matches on exact ID, hex prefix, or slug substring.
pub fn id_matches(id: &str, reference: &str) -> bool {
    if id == reference {
        return true;
    }

    if id.starts_with(reference) {
        return true;
    }

    if let Some(slug_start) = id.find('-') {
        let slug_part = &id[slug_start + 1..];
        if slug_part.contains(reference) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id = generate_id("Invoice Notifier");
        assert!(id.len() > 10);
        assert!(id.contains("-wf-"));
        assert!(id.ends_with("invoice-notifier"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Notify on Invoices!"), "notify-on-invoices");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        // Apostrophes should be stripped, not converted to hyphens
        assert_eq!(slugify("here's a test"), "heres-a-test");
        assert_eq!(slugify("don't stop"), "dont-stop");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(100);
        assert_eq!(slugify(&long).len(), 50);
    }

    #[test]
    fn test_id_matches_exact() {
        assert!(id_matches("019430-wf-invoice-notifier", "019430-wf-invoice-notifier"));
    }

    #[test]
    fn test_id_matches_hex_prefix() {
        assert!(id_matches("019430-wf-invoice-notifier", "019430"));
        assert!(!id_matches("019430-wf-invoice-notifier", "999999"));
    }

    #[test]
    fn test_id_matches_slug() {
        assert!(id_matches("019430-wf-invoice-notifier", "invoice"));
        assert!(!id_matches("019430-wf-invoice-notifier", "payroll"));
    }
}
