//! Space-delimited OAuth scope strings and the subset checks used throughout
//! C7/C8.

use std::collections::BTreeSet;

pub fn parse(scope: Option<&str>) -> Vec<String> {
    scope
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn join(scopes: &[String]) -> String {
    scopes.join(" ")
}

/// `requested ⊆ allowed`.
pub fn is_subset(requested: &[String], allowed: &[String]) -> bool {
    let allowed: BTreeSet<&str> = allowed.iter().map(String::as_str).collect();
    requested.iter().all(|s| allowed.contains(s.as_str()))
}

/// `requested ∩ allowed`, preserving `requested`'s order.
pub fn intersect(requested: &[String], allowed: &[String]) -> Vec<String> {
    let allowed: BTreeSet<&str> = allowed.iter().map(String::as_str).collect();
    requested
        .iter()
        .filter(|s| allowed.contains(s.as_str()))
        .cloned()
        .collect()
}

pub fn contains(scopes: &[String], scope: &str) -> bool {
    scopes.iter().any(|s| s == scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_whitespace() {
        assert_eq!(parse(Some("openid  profile email")), vec!["openid", "profile", "email"]);
        assert_eq!(parse(None), Vec::<String>::new());
    }

    #[test]
    fn subset_check() {
        let allowed = vec!["openid".to_string(), "profile".to_string()];
        assert!(is_subset(&["openid".to_string()], &allowed));
        assert!(!is_subset(&["admin".to_string()], &allowed));
    }
}
