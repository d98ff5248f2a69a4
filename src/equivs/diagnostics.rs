// src/equivs/diagnostics.rs

//! Extraction of unresolvable dependencies from apt/dpkg output
//!
//! apt exposes no structured result over its CLI, so the repair step's log
//! text is the only source of truth for *which* declared dependency could
//! not be satisfied. The extraction is kept behind this one function with an
//! explicit pattern contract:
//!
//! ```text
//! <meta-package> depends on <dependency>; however
//! ```
//!
//! dpkg prints one such line per unsatisfied dependency while configuring
//! the force-installed meta-package, and apt repeats them when the repair
//! attempt fails. `<dependency>` is captured verbatim (it may carry a
//! version clause such as `bar (>= 2.0)`).

use regex::Regex;

/// Extract the set of problem dependencies for `package` from `log`.
///
/// Order of first appearance is preserved; duplicates are dropped.
pub fn extract_unresolved(log: &str, package: &str) -> Vec<String> {
    let pattern = format!(r"{} depends on ([^;]+); however", regex::escape(package));
    // The package name is escaped, so the pattern always compiles
    let re = Regex::new(&pattern).unwrap();

    let mut seen = Vec::new();
    for caps in re.captures_iter(log) {
        let dep = caps[1].trim().to_string();
        if !dep.is_empty() && !seen.contains(&dep) {
            seen.push(dep);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dependency_extracted() {
        let log = "foo-deps depends on bar; however:\n  Package bar is not installed.";
        assert_eq!(extract_unresolved(log, "foo-deps"), vec!["bar"]);
    }

    #[test]
    fn test_versioned_dependency_extracted_verbatim() {
        let log = "myapp-deps depends on libfoo (>= 2.0); however:\n\
                   Package libfoo is not configured yet.";
        assert_eq!(extract_unresolved(log, "myapp-deps"), vec!["libfoo (>= 2.0)"]);
    }

    #[test]
    fn test_multiple_dependencies_deduplicated_in_order() {
        let log = "\
dpkg: dependency problems prevent configuration of app-deps:
 app-deps depends on bar; however:
  Package bar is not installed.
 app-deps depends on baz; however:
  Package baz is not installed.
 app-deps depends on bar; however:
  Package bar is not installed.
";
        assert_eq!(extract_unresolved(log, "app-deps"), vec!["bar", "baz"]);
    }

    #[test]
    fn test_other_packages_lines_ignored() {
        let log = "\
 other-pkg depends on qux; however:
 app-deps depends on bar; however:
";
        assert_eq!(extract_unresolved(log, "app-deps"), vec!["bar"]);
    }

    #[test]
    fn test_regex_metacharacters_in_package_name() {
        let log = "my.app+deps depends on bar; however:";
        assert_eq!(extract_unresolved(log, "my.app+deps"), vec!["bar"]);
        assert!(extract_unresolved(log, "myXapp+deps").is_empty());
    }

    #[test]
    fn test_no_match_yields_empty_set() {
        assert!(extract_unresolved("E: Unable to correct problems", "app-deps").is_empty());
    }
}
