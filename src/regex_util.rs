//! Lazily-compiled static regex patterns.

/// Declare a module-private function returning `&'static regex::Regex`, compiled
/// once on first access. The calling module must have `use regex::Regex;` in scope.
///
/// Patterns are literals checked by the unit tests of each module that declares
/// them, so compilation failure is a programming error.
macro_rules! static_regex {
    (fn $fname:ident, $pattern:expr) => {
        fn $fname() -> &'static Regex {
            static STORE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
            STORE.get_or_init(|| {
                Regex::new($pattern).expect(concat!("BUG: invalid static regex: ", $pattern))
            })
        }
    };
}
pub(crate) use static_regex;

#[cfg(test)]
mod tests {
    use regex::Regex;

    static_regex!(fn agent_type_pattern, r"^[a-z_]+$");

    #[test]
    fn test_static_regex_is_cached() {
        let first = agent_type_pattern() as *const Regex;
        let second = agent_type_pattern() as *const Regex;
        assert_eq!(first, second);
        assert!(agent_type_pattern().is_match("coder"));
        assert!(!agent_type_pattern().is_match("Coder"));
    }
}
