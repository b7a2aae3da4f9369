//! Tests for project root discovery from the working directory
//!
//! These change the process working directory, so they run serially.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use taskwarden::paths;

/// Run `f` with the working directory set to `dir`, restoring it afterwards
fn in_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir).unwrap();
    let out = f();
    env::set_current_dir(previous).unwrap();
    out
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

#[test]
#[serial]
fn test_project_root_found_from_nested_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(paths::CONFIG_FILE), "").unwrap();
    let nested = temp.path().join("src/handlers");
    fs::create_dir_all(&nested).unwrap();

    let root = in_dir(&nested, paths::project_root);
    assert_eq!(canonical(&root), canonical(temp.path()));
    assert_eq!(paths::state_file(&root), root.join(paths::STATE_FILE));
}

#[test]
#[serial]
fn test_project_root_defaults_to_working_directory() {
    let temp = TempDir::new().unwrap();
    let root = in_dir(temp.path(), paths::project_root);
    assert_eq!(canonical(&root), canonical(temp.path()));
}

#[test]
#[serial]
fn test_nearest_marker_wins() {
    let outer = TempDir::new().unwrap();
    fs::write(outer.path().join(paths::STATE_FILE), "{}").unwrap();
    let inner = outer.path().join("services/billing");
    fs::create_dir_all(&inner).unwrap();
    fs::write(inner.join(paths::CONFIG_FILE), "").unwrap();

    let root = in_dir(&inner.join("."), paths::project_root);
    assert_eq!(canonical(&root), canonical(&inner));
}
