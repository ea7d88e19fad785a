//! Batch Background Removal CLI Tool
//!
//! Command-line interface that removes the background of every image in a
//! directory using the rembg-batch library.

#[cfg(feature = "cli")]
use rembg_batch::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
