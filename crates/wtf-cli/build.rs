//! Build script to derive version and commit from git
//!
//! `wtf version` reports these, so releases don't need the Cargo.toml
//! version kept in sync with tags.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    // Rerun if git HEAD changes
    println!("cargo:rerun-if-changed=../../.git/HEAD");

    let version = git(&["describe", "--tags", "--always", "--dirty=-dev"])
        .map(|s| s.trim_start_matches('v').to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let commit = match git(&["rev-parse", "--short", "HEAD"]) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain"]).is_some();
            format!("{hash} ({})", if dirty { "dirty" } else { "clean" })
        }
        None => "unknown".to_string(),
    };

    println!("cargo:rustc-env=WTF_VERSION={version}");
    println!("cargo:rustc-env=WTF_COMMIT={commit}");
}
