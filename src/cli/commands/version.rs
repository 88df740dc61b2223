//! Version command implementation

use crate::cli::Output;
use crate::{PKG_DESCRIPTION, PKG_NAME, VERSION};
use anyhow::Result;

/// Execute the version command
pub async fn execute(output: &Output) -> Result<()> {
    println!("{} {}", PKG_NAME, VERSION);

    if output.is_verbose() {
        output.key_value("Description:", PKG_DESCRIPTION, false);
        output.key_value("License:", env!("CARGO_PKG_LICENSE"), false);
        output.key_value("Rust edition:", "2024", false);
        output.key_value("Target:", std::env::consts::ARCH, false);
        output.key_value("Profile:", if cfg!(debug_assertions) { "debug" } else { "release" }, false);
    }

    Ok(())
}
