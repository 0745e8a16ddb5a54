//! A simple grep-like program using `argf`, which reads all of its inputs
//! as one stream and labels matches with the input they came from. Perg!

use clap::Parser;
use regex::Regex;
use std::ffi::OsString;
use std::io::{stdout, BufRead, BufReader, Write};

/// Print lines matching a pattern
#[derive(Parser)]
#[command(name = "grep")]
struct Opt {
    /// Print the input name for each match; the default when there is more
    /// than one input
    #[arg(short = 'H', long)]
    with_filename: bool,

    /// The regex to search for
    pattern: Regex,

    /// Input sources, stdin if none
    inputs: Vec<OsString>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let print_inputs = opt.with_filename || opt.inputs.len() > 1;
    let mut reader = BufReader::new(argf::from_names(&opt.inputs)?);

    let stdout = stdout();
    let mut output = stdout.lock();
    let mut line = String::new();
    while reader.read_line(&mut line)? != 0 {
        if opt.pattern.is_match(line.trim_end_matches('\n')) {
            if print_inputs {
                // The line just read came from the current input.
                write!(output, "{}:", reader.get_ref().name())?;
            }
            output.write_all(line.as_bytes())?;
        }
        line.clear();
    }

    log::debug!("reached {}", reader.get_ref().name());
    Ok(())
}
