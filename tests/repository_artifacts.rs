// tests/repository_artifacts.rs

//! Integration tests for the three-artifact repository layout
//!
//! Exercises the source-list, pin-preference, and removal paths against an
//! apt layout rooted in a temporary directory. Key installation is not
//! covered here since it requires the network and an external gpg.

use aptglue::repository::sources::{
    pin_origin, remove_artifacts, write_pin, write_source,
};
use aptglue::{AptEtc, ExtraRepository};
use std::fs;
use tempfile::TempDir;

fn sample_repo(name: &str) -> ExtraRepository {
    ExtraRepository::new("https://packages.example.org/debian", "bookworm", "main", name)
        .with_pin_priority(600)
}

#[test]
fn test_install_then_remove_leaves_nothing() {
    let temp = TempDir::new().unwrap();
    let etc = AptEtc::under(temp.path());
    let repo = sample_repo("myapp");

    write_source(&etc, &repo).unwrap();
    let origin = pin_origin(&repo.uri).unwrap();
    write_pin(
        &etc,
        &repo.name,
        "*",
        &format!("origin {origin}"),
        repo.pin_priority.unwrap(),
        false,
    )
    .unwrap();
    fs::create_dir_all(&etc.trusted_keys_dir).unwrap();
    fs::write(etc.trusted_key_path(&repo.name, "gpg"), b"binary key").unwrap();

    assert!(etc.source_path("myapp").exists());
    assert!(etc.preference_path("myapp").exists());
    assert!(etc.trusted_key_path("myapp", "gpg").exists());

    remove_artifacts(&etc, "myapp").unwrap();

    assert!(!etc.source_path("myapp").exists());
    assert!(!etc.preference_path("myapp").exists());
    assert!(!etc.trusted_key_path("myapp", "gpg").exists());
    assert!(!etc.trusted_key_path("myapp", "asc").exists());
}

#[test]
fn test_reinstall_after_remove_leaves_exactly_the_expected_artifacts() {
    let temp = TempDir::new().unwrap();
    let etc = AptEtc::under(temp.path());
    let repo = sample_repo("myapp");

    // First round, then a full removal
    write_source(&etc, &repo).unwrap();
    write_pin(&etc, &repo.name, "*", "origin packages.example.org", 600, false).unwrap();
    remove_artifacts(&etc, "myapp").unwrap();

    // Second round must not inherit anything stale
    write_source(&etc, &repo).unwrap();
    write_pin(&etc, &repo.name, "*", "origin packages.example.org", 600, false).unwrap();

    let source = fs::read_to_string(etc.source_path("myapp")).unwrap();
    assert_eq!(source.lines().count(), 1);

    let preference = fs::read_to_string(etc.preference_path("myapp")).unwrap();
    assert_eq!(
        preference,
        "Package: *\nPin: origin packages.example.org\nPin-Priority: 600\n"
    );
}

#[test]
fn test_pin_targets_the_host_not_the_full_uri() {
    let origin = pin_origin("https://packages.sury.org/php/").unwrap();
    assert_eq!(origin, "packages.sury.org");
    assert!(!origin.contains("https"));
    assert!(!origin.contains("/php"));
}

#[test]
fn test_artifacts_of_different_repositories_do_not_collide() {
    let temp = TempDir::new().unwrap();
    let etc = AptEtc::under(temp.path());

    write_source(&etc, &sample_repo("first")).unwrap();
    write_source(&etc, &sample_repo("second")).unwrap();
    remove_artifacts(&etc, "first").unwrap();

    assert!(!etc.source_path("first").exists());
    assert!(etc.source_path("second").exists());
}
