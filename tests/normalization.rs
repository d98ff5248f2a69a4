// tests/normalization.rs

//! Integration tests for dependency specification normalization
//!
//! These exercise the public API end to end: loose packager input in,
//! formal Debian relationship syntax out.

use aptglue::DependencySpec;

fn normalize(input: &str) -> String {
    DependencySpec::parse(input).unwrap().normalize()
}

#[test]
fn test_plain_list() {
    assert_eq!(normalize("dep1 dep2 dep3"), "dep1, dep2, dep3");
}

#[test]
fn test_versioned_list() {
    assert_eq!(normalize("dep1 dep2 dep3>=2.0"), "dep1, dep2, dep3 (>= 2.0)");
}

#[test]
fn test_alternatives() {
    assert_eq!(normalize("dep1 dep4|dep5"), "dep1, dep4 | dep5");
}

#[test]
fn test_realistic_application_dependencies() {
    assert_eq!(
        normalize("postgresql postgresql-contrib redis-server|valkey php8.2-fpm>=8.2 curl"),
        "postgresql, postgresql-contrib, redis-server | valkey, php8.2-fpm (>= 8.2), curl"
    );
}

#[test]
fn test_idempotence_over_public_api() {
    let inputs = [
        "dep1 dep2 dep3>=2.0",
        "dep1 dep4|dep5",
        "postgresql redis-server|valkey php8.2-fpm>=8.2",
    ];
    for input in inputs {
        let once = normalize(input);
        let twice = normalize(&once);
        assert_eq!(once, twice, "normalization of '{input}' is not idempotent");
    }
}

#[test]
fn test_constraints_survive_a_merge_roundtrip() {
    // add-dependencies merges the installed Depends field (already
    // normalized) with fresh packager input
    let mut spec = DependencySpec::parse("curl, jq (>= 1.6)").unwrap();
    spec.merge(DependencySpec::parse("redis-server|valkey").unwrap());
    assert_eq!(spec.normalize(), "curl, jq (>= 1.6), redis-server | valkey");
}
