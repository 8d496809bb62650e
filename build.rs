//! Build script for the pin-link firmware
//!
//! Handles:
//! - Memory layout configuration
//! - Linker scripts for the embedded binary
//! - Sentinel sections around the statics (canary.x)

fn main() {
    // Tell Cargo to re-run this if the linker script changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=canary.x");
    println!("cargo:rerun-if-changed=build.rs");

    // Link memory.x from project directory
    println!("cargo:rustc-link-search={}", std::env::var("CARGO_MANIFEST_DIR").unwrap());

    // Host test builds link against std and need none of the cortex-m scripts
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
        println!("cargo:rustc-link-arg-bins=-Tcanary.x");
    }
}
