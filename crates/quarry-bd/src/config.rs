//! Store-level configuration keys shared by every backend.

/// Root of the identifier namespace. Must be set before any issue is created.
pub const ISSUE_PREFIX_KEY: &str = "issue_prefix";

/// Comma-separated custom status names.
pub const CUSTOM_STATUSES_KEY: &str = "status.custom";

/// Comma-separated custom issue type names.
pub const CUSTOM_TYPES_KEY: &str = "types.custom";

/// Parse a comma-separated config value into trimmed, non-empty names.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`parse_name_list`].
pub fn format_name_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_list_skips_blanks_and_trims() {
        assert_eq!(
            parse_name_list(" review, qa ,,"),
            vec!["review".to_string(), "qa".to_string()]
        );
        assert!(parse_name_list("").is_empty());
        assert_eq!(format_name_list(&[" review", "", "qa"]), "review,qa");
    }
}
