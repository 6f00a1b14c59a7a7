use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let package_name = env::var("CARGO_PKG_NAME").unwrap();

    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    // Output to include/dictation.h (where host UIs pick it up)
    let output_file = crate_dir
        .join("include")
        .join(format!("{}.h", package_name));

    let config = match cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")) {
        Ok(config) => config,
        Err(e) => {
            println!("cargo:warning=Invalid cbindgen.toml: {}", e);
            return;
        }
    };

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=C header generation skipped: {}", e);
            return;
        }
    };

    if let Some(parent) = output_file.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        println!("cargo:warning=Failed to create include directory: {}", e);
        return;
    }

    if bindings.write_to_file(&output_file) {
        println!("cargo:warning=Generated C header: {}", output_file.display());
    }
}
