//! Build script for the registry crate.
//!
//! Embeds `registry.json` into the library so validation works out of the box
//! when no project registry is found at runtime.
//!
//! Resolution order:
//!   1. `../../shared/registry.json`: workspace-level shared copy (freshest during dev)
//!   2. `data/registry.json`: committed in-crate copy (works from a crates.io tarball)
//!
//! If neither exists the crate is built without an embedded registry and the
//! loader's embedded fallback reports itself as unavailable.

use std::path::Path;

fn main() {
    println!("cargo::rustc-check-cfg=cfg(has_embedded_registry)");

    let workspace = Path::new("../../shared/registry.json");
    let in_crate = Path::new("data/registry.json");

    println!("cargo:rerun-if-changed=../../shared/registry.json");
    println!("cargo:rerun-if-changed=data/registry.json");

    let registry_path = if workspace.exists() {
        workspace
    } else if in_crate.exists() {
        in_crate
    } else {
        return;
    };

    println!("cargo:rustc-cfg=has_embedded_registry");

    // Copy into OUT_DIR so include_str! has a stable, absolute path.
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest = Path::new(&out_dir).join("registry.json");
    std::fs::copy(registry_path, &dest).expect("failed to copy registry.json to OUT_DIR");
}
