use anyhow::Result;
use clap::Parser;

use voice_panel::cli::{self, Cli};

fn main() -> Result<()> {
    cli::run(Cli::parse())
}
