// src/depspec/mod.rs

//! Dependency specification parsing and normalization
//!
//! Application packagers write dependencies loosely: whitespace-separated
//! package tokens, alternatives joined by `|`, and version comparisons
//! concatenated directly to the name (`dep3>=2.0`). apt wants the formal
//! relationship grammar: `dep1, dep2, dep3 (>= 2.0)` with alternatives as
//! `dep4 | dep5`.
//!
//! Parsing accepts both forms, so normalizing an already-normalized string
//! is a no-op. A token that already carries a parenthesized constraint is
//! never wrapped a second time.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Version relation operators in the order they must be matched
/// (two-character operators before their one-character prefixes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    StrictlyEarlier,
    EarlierEqual,
    Exactly,
    LaterEqual,
    StrictlyLater,
    Earlier,
    Later,
}

impl RelOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelOp::StrictlyEarlier => "<<",
            RelOp::EarlierEqual => "<=",
            RelOp::Exactly => "=",
            RelOp::LaterEqual => ">=",
            RelOp::StrictlyLater => ">>",
            RelOp::Earlier => "<",
            RelOp::Later => ">",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "<<" => Some(RelOp::StrictlyEarlier),
            "<=" => Some(RelOp::EarlierEqual),
            "=" => Some(RelOp::Exactly),
            ">=" => Some(RelOp::LaterEqual),
            ">>" => Some(RelOp::StrictlyLater),
            "<" => Some(RelOp::Earlier),
            ">" => Some(RelOp::Later),
            _ => None,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A version comparison attached to a package reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pub op: RelOp,
    pub version: String,
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.op, self.version)
    }
}

/// A package name with an optional version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    pub name: String,
    pub constraint: Option<VersionConstraint>,
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{} {}", self.name, c),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An ordered set of alternatives; any one satisfies the requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup(pub Vec<PackageRef>);

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", rendered.join(" | "))
    }
}

/// A full dependency specification: a list of requirement groups
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencySpec(pub Vec<DependencyGroup>);

/// Matches one package atom with an optional parenthesized constraint.
/// Atoms are delimited by whitespace, commas, and pipes; a `(...)` suffix
/// belongs to the preceding atom.
fn atom_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\s,|()]+(?:\s*\([^)]+\))?").unwrap())
}

/// Splits a concatenated `name OP version` token
fn constraint_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^<>=]+)(<<|>>|<=|>=|<|>|=)(.+)$").unwrap())
}

impl DependencySpec {
    /// Parse a loosely formatted dependency string.
    ///
    /// Tokens are separated by whitespace or `, `; alternatives within a
    /// token by `|` (with or without surrounding spaces). Each atom is
    /// either `name`, `nameOPversion`, or the already-normalized
    /// `name (OP version)`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut groups: Vec<DependencyGroup> = Vec::new();
        let mut last_end = 0;

        for m in atom_pattern().find_iter(input) {
            let separator = &input[last_end..m.start()];
            last_end = m.end();

            let atom = PackageRef::parse(m.as_str())?;
            let alternative = separator.contains('|') && !groups.is_empty();
            if alternative {
                groups.last_mut().unwrap().0.push(atom);
            } else {
                groups.push(DependencyGroup(vec![atom]));
            }
        }

        Ok(DependencySpec(groups))
    }

    /// Render in the formal relationship grammar
    pub fn normalize(&self) -> String {
        self.to_string()
    }

    /// Append the groups of another specification
    pub fn merge(&mut self, other: DependencySpec) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|g| g.to_string()).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

impl PackageRef {
    /// Parse one atom: `name`, `nameOPversion`, or `name (OP version)`
    fn parse(atom: &str) -> Result<Self> {
        let atom = atom.trim();

        if let Some(open) = atom.find('(') {
            // Already-normalized form; re-parse rather than double-wrap
            let name = atom[..open].trim();
            let inner = atom[open + 1..]
                .trim_end_matches(')')
                .trim();
            let mut parts = inner.splitn(2, char::is_whitespace);
            let op = parts.next().unwrap_or_default();
            let version = parts.next().unwrap_or_default().trim();

            let op = RelOp::parse(op).ok_or_else(|| {
                Error::ParseError(format!("invalid version relation in '{atom}'"))
            })?;
            if name.is_empty() || version.is_empty() {
                return Err(Error::ParseError(format!(
                    "malformed constrained dependency '{atom}'"
                )));
            }

            return Ok(PackageRef {
                name: name.to_string(),
                constraint: Some(VersionConstraint {
                    op,
                    version: version.to_string(),
                }),
            });
        }

        if let Some(caps) = constraint_pattern().captures(atom) {
            let op = RelOp::parse(&caps[2]).ok_or_else(|| {
                Error::ParseError(format!("invalid version relation in '{atom}'"))
            })?;
            return Ok(PackageRef {
                name: caps[1].to_string(),
                constraint: Some(VersionConstraint {
                    op,
                    version: caps[3].to_string(),
                }),
            });
        }

        Ok(PackageRef {
            name: atom.to_string(),
            constraint: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(input: &str) -> String {
        DependencySpec::parse(input).unwrap().normalize()
    }

    #[test]
    fn test_plain_names_only_change_separators() {
        assert_eq!(normalize("dep1 dep2 dep3"), "dep1, dep2, dep3");
    }

    #[test]
    fn test_version_constraint_is_parenthesized() {
        assert_eq!(normalize("dep1 dep2 dep3>=2.0"), "dep1, dep2, dep3 (>= 2.0)");
    }

    #[test]
    fn test_alternatives() {
        assert_eq!(normalize("dep1 dep4|dep5"), "dep1, dep4 | dep5");
    }

    #[test]
    fn test_all_operators() {
        assert_eq!(normalize("a<1"), "a (< 1)");
        assert_eq!(normalize("a<=1"), "a (<= 1)");
        assert_eq!(normalize("a=1"), "a (= 1)");
        assert_eq!(normalize("a>=1"), "a (>= 1)");
        assert_eq!(normalize("a>1"), "a (> 1)");
        assert_eq!(normalize("a<<1"), "a (<< 1)");
        assert_eq!(normalize("a>>1"), "a (>> 1)");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "dep1 dep2 dep3>=2.0",
            "dep1 dep4|dep5",
            "php-fpm>=8.2 redis-server|valkey postgresql",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "re-normalizing '{once}'");
        }
    }

    #[test]
    fn test_parenthesized_token_not_double_wrapped() {
        assert_eq!(normalize("dep3 (>= 2.0)"), "dep3 (>= 2.0)");
    }

    #[test]
    fn test_alternatives_with_constraints() {
        assert_eq!(
            normalize("php7.4-fpm|php8.2-fpm>=8.2.1 curl"),
            "php7.4-fpm | php8.2-fpm (>= 8.2.1), curl"
        );
    }

    #[test]
    fn test_normalized_alternatives_reparse() {
        assert_eq!(normalize("dep4 | dep5"), "dep4 | dep5");
    }

    #[test]
    fn test_empty_input() {
        let spec = DependencySpec::parse("").unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec.normalize(), "");
    }

    #[test]
    fn test_merge() {
        let mut spec = DependencySpec::parse("dep1 dep2").unwrap();
        spec.merge(DependencySpec::parse("dep3>=2.0").unwrap());
        assert_eq!(spec.normalize(), "dep1, dep2, dep3 (>= 2.0)");
    }

    #[test]
    fn test_versions_with_tilde_and_epoch() {
        assert_eq!(normalize("a>=1:2.0~beta1"), "a (>= 1:2.0~beta1)");
    }

    #[test]
    fn test_malformed_parenthesized_constraint() {
        assert!(DependencySpec::parse("dep (~> 2.0)").is_err());
    }
}
