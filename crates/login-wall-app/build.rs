//! Embeds the workspace `VERSION` file as `LOGIN_WALL_VERSION`.

use std::fs;
use std::path::{Path, PathBuf};

fn workspace_version_file() -> PathBuf {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    manifest_dir
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root")
        .join("VERSION")
}

fn read_version(path: &Path) -> String {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("read {}: {error}", path.display()));
    let version = raw.trim().to_string();
    assert!(
        !version.is_empty() && version.chars().all(|ch| ch.is_ascii_alphanumeric() || ".-+".contains(ch)),
        "VERSION must hold a single non-empty version string, got {version:?}"
    );
    version
}

fn main() {
    let path = workspace_version_file();
    println!("cargo:rerun-if-changed={}", path.display());
    println!("cargo:rustc-env=LOGIN_WALL_VERSION={}", read_version(&path));
}
