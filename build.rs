//! Renders the `linewire(1)` manual page from the CLI definition into
//! `OUT_DIR/man`.

use std::{env, fs, path::PathBuf};

use clap::CommandFactory;

#[path = "src/cli.rs"]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let man_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR not set")?).join("man");
    fs::create_dir_all(&man_dir)?;

    let mut page = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut page)?;
    fs::write(man_dir.join("linewire.1"), page)?;

    Ok(())
}
