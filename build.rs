//! Build script for the OCR shell Tauri app.
//!
//! The OCR engine is an external binary driven at runtime, so this only
//! runs the Tauri code generation.

fn main() {
    println!("cargo:rerun-if-changed=tauri.conf.json");
    println!("cargo:rerun-if-changed=capabilities");

    tauri_build::build();
}
