//! Build script for hand-envoy.

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rustc-check-cfg=cfg(rust_analyzer)");

    // Host builds (tests, docs) need no linker setup.
    if env::var_os("CARGO_FEATURE_ARM").is_none() {
        return;
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let target = env::var("TARGET").unwrap();

    // Copy the board's memory layout to OUT_DIR as memory.x
    let source = if target.starts_with("thumbv8m") {
        "memory-pico2.x"
    } else {
        "memory-pico1.x"
    };
    let memory_x = fs::read_to_string(source).unwrap_or_else(|_| panic!("Failed to read {source}"));
    fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed={source}");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if target.starts_with("thumbv6m") {
        println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    }
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
