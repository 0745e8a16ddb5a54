//! A simple cat-like program using `argf`. Unlike regular cat, this cat
//! supports `data:` URLs and gzip. Meow!

use clap::Parser;
use std::ffi::OsString;
use std::io::{copy, stdout};

/// Concatenate inputs to standard output
#[derive(Parser)]
#[command(name = "cat")]
struct Opt {
    /// Input sources, stdin if none
    inputs: Vec<OsString>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let mut input = argf::from_names(&opt.inputs)?;
    let stdout = stdout();
    let mut output = stdout.lock();
    copy(&mut input, &mut output)?;

    Ok(())
}
