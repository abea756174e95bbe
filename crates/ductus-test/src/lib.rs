//! ductus-test - Regression test framework for ductus
//!
//! This crate provides a regression test framework supporting three
//! modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! # Usage
//!
//! ```ignore
//! use ductus_test::{RegParams, RegTestMode};
//!
//! let mut rp = RegParams::new("recognize");
//! rp.compare_values(100.0, rating as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Load a test profile from the test data directory
///
/// # Arguments
///
/// * `name` - Profile filename (e.g., "latin.profile")
///
/// # Returns
///
/// The profile text, or an error if loading fails.
pub fn load_test_profile(name: &str) -> TestResult<String> {
    let path = test_data_path(name);
    std::fs::read_to_string(&path).map_err(|e| TestError::ProfileLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // ductus-test is at crates/ductus-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/profiles/{}", workspace_root(), name)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
