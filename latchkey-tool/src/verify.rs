//! Post-condition checks run after every mutating tool call.
//!
//! A tool reporting success is not trusted on its own — the executor
//! re-checks the filesystem state the tool claims to have produced. A
//! verification failure always surfaces as an error, never a silent
//! downgrade to success.

use latchkey_core::Verification;
use std::path::Path;

/// Confirm `path` exists after an operation that should have created it.
pub async fn expect_exists(path: &Path) -> Verification {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        Verification::ok()
    } else {
        Verification::failed(format!("expected '{}' to exist, but it does not", path.display()))
    }
}

/// Confirm `path` is absent after an operation that should have removed it.
pub async fn expect_absent(path: &Path) -> Verification {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        Verification::failed(format!("expected '{}' to be gone, but it still exists", path.display()))
    } else {
        Verification::ok()
    }
}

/// Confirm a write produced the exact bytes requested.
pub async fn expect_contents(path: &Path, expected: &[u8]) -> Verification {
    match tokio::fs::read(path).await {
        Ok(actual) if actual == expected => Verification::ok(),
        Ok(_) => Verification::failed(format!("'{}' contents do not match what was written", path.display())),
        Err(e) => Verification::failed(format!("could not re-read '{}': {e}", path.display())),
    }
}
