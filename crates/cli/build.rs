use std::env;
use std::process::Command;

// `meterbill --version` reports the commit it was built from. Source archives
// have no .git, so packagers can pass METERBILL_COMMIT instead.
fn commit() -> String {
    if let Ok(commit) = env::var("METERBILL_COMMIT") {
        if !commit.trim().is_empty() {
            return commit.trim().to_string();
        }
    }
    Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=9"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".into())
}

fn main() {
    println!("cargo:rerun-if-env-changed=METERBILL_COMMIT");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");

    println!("cargo:rustc-env=METERBILL_COMMIT={}", commit());
    println!(
        "cargo:rustc-env=METERBILL_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".into())
    );
}
