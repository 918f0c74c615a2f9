//! # Voxel Realms Entry Point
//!
//! Runs a headless world session, optionally configured from a JSON file.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- world.json
//! ```

use std::path::PathBuf;

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(err) = voxel_realms::run(config_path.as_deref()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
