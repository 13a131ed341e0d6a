use std::path::Path;
use std::process::Command;

fn git(root: &str, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (out.status.success() && !s.is_empty()).then_some(s)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    let sha = git(&manifest_dir, &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=BURNDOWN_BUILD_SHA={sha}");

    println!("cargo:rerun-if-changed=build.rs");
    // Only watch HEAD when building from a checkout; a missing path would rerun every build.
    if let Some(head) = git(&manifest_dir, &["rev-parse", "--absolute-git-dir"])
        .map(|dir| Path::new(&dir).join("HEAD"))
        .filter(|p| p.exists())
    {
        println!("cargo:rerun-if-changed={}", head.display());
    }
}
