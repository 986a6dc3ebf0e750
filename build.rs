use std::error::Error;
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn Error>> {
    // Builds outside a git checkout still get a version string
    if EmitBuilder::builder()
        .fail_on_error()
        .git_describe(true, true, None)
        .emit()
        .is_err()
    {
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
    }
    println!("cargo:rerun-if-changed=src");
    Ok(())
}
