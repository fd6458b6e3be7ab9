//! Shared fixtures for the integration tests
//!
//! Loads the federal-acquisition registry fixture and installs a test
//! tracing subscriber so registry warnings show up in failing test output.

#![allow(dead_code)]

use field_registry::{RegistryConfig, RegistryDocument, RegistrySnapshot};
use std::path::PathBuf;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness's captured writer.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The registry fixture as a parsed document.
pub fn registry_document() -> RegistryDocument {
    RegistryDocument::from_path(fixture_path("registry.yaml")).expect("fixture should parse")
}

/// A strictly validated snapshot of the fixture.
pub fn registry_snapshot() -> RegistrySnapshot {
    init_tracing();
    RegistrySnapshot::build(&registry_document(), &RegistryConfig::strict())
        .expect("fixture should validate")
}
