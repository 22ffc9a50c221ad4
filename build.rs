//! Stamps `mpdctl --version` with a release version and a short commit id.
//!
//! CI sets `MPDCTL_VERSION` / `MPDCTL_GIT_SHA` (or `GITHUB_SHA`); local builds
//! fall back to the package version and `git rev-parse`.

use std::env;
use std::process::Command;

const SHORT_SHA_LEN: usize = 7;

fn main() {
    for var in ["MPDCTL_VERSION", "MPDCTL_GIT_SHA", "GITHUB_SHA"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    let version = env::var("MPDCTL_VERSION")
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    let sha = env::var("MPDCTL_GIT_SHA")
        .ok()
        .or_else(|| env::var("GITHUB_SHA").ok())
        .or_else(local_head)
        .map(|sha| sha.chars().take(SHORT_SHA_LEN).collect::<String>())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=MPDCTL_VERSION={}", version);
    println!("cargo:rustc-env=MPDCTL_GIT_SHA={}", sha);
}

fn local_head() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let sha = String::from_utf8(output.stdout).ok()?;
    Some(sha.trim().to_string()).filter(|s| !s.is_empty())
}
