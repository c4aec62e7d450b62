//! Stamps `txrecon --version` with the commit and target triple.

use std::process::Command;

/// Commit to report when building outside a git checkout (source tarballs).
const COMMIT_OVERRIDE: &str = "TXRECON_BUILD_COMMIT";

fn main() {
    // The workspace root, two levels up, owns .git
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");
    println!("cargo:rerun-if-env-changed={COMMIT_OVERRIDE}");

    let commit = std::env::var(COMMIT_OVERRIDE)
        .ok()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .or_else(git_short_hash)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=TXRECON_COMMIT={commit}");

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TXRECON_TARGET={target}");
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}
