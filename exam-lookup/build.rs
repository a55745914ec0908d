//! Stamps the binary with the source revision and build date reported by
//! `/health` and the startup log

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    // Re-stamp when HEAD moves
    println!("cargo:rerun-if-changed=build.rs");
    if let Some(head) = git(&["rev-parse", "--git-path", "HEAD"]) {
        println!("cargo:rerun-if-changed={}", head);
    }

    let revision = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unversioned".to_string());
    let built_on = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=EXAM_LOOKUP_REVISION={}", revision);
    println!("cargo:rustc-env=EXAM_LOOKUP_BUILT_ON={}", built_on);
    println!("cargo:rustc-env=EXAM_LOOKUP_PROFILE={}", profile);
}
