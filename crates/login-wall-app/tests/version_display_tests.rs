//! Integration tests for the version shown on the login wall.

use login_wall_app::{APP_VERSION, app_version};

#[test]
fn version_display_tests_tracks_workspace_version_file() {
    let version_file = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let expected = std::fs::read_to_string(version_file).expect("VERSION should be readable");

    assert_eq!(app_version(), expected.trim());
    assert_eq!(APP_VERSION, app_version());
}

#[test]
fn version_display_tests_is_dotted_numeric() {
    let parts: Vec<&str> = app_version().split('.').collect();
    assert_eq!(parts.len(), 3, "version should have three segments");
    assert!(
        parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
    );
}
