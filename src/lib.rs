//! Read all of a program's input files as one stream, like Ruby's `ARGF`.
//!
//! [`argf`] opens every file named on the command line and concatenates
//! them into a single [`Source`] which implements `Read`. When no files are
//! named, it reads standard input instead, and "-" names standard input
//! wherever it appears.
//!
//! ```rust,no_run
//! use std::io::{BufRead, BufReader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut reader = BufReader::new(argf::argf()?);
//!     let mut line = String::new();
//!     while reader.read_line(&mut line)? != 0 {
//!         // Ask after reading, so the name belongs to the line just read.
//!         print!("{}: {}", reader.get_ref().name(), line);
//!         line.clear();
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Names
//!
//! A [`Source`] can report the name of whichever input it's currently
//! reading from: the name a file was opened under, [`STDIN_NAME`] for
//! standard input, or [`EOF_NAME`] once everything has been read.
//!
//! Besides plain paths, [`open_input`] accepts `file:` and `data:` URLs,
//! decompresses files ending in ".gz", and on Unix-family platforms runs
//! `$(command)` and reads its output.
//!
//! # Composition
//!
//! [`Concat`] can be built directly from any sources, including other
//! `Concat`s. Nested concatenations are flattened as they're read, so
//! building up a stream by repeated composition stays cheap.

#![deny(missing_docs)]

pub use layered_io::{Bufferable, ReadLayered, Status};

mod concat;
mod open_input;
mod source;

pub use concat::Concat;
pub use open_input::{from_names, open_input};
pub use source::{name, Source, EOF_NAME, STDIN_NAME};

/// Open the inputs named by the process' command-line arguments, skipping
/// argv\[0\].
///
/// This is [`from_names`] applied to [`std::env::args_os`], so with no
/// arguments it reads standard input.
pub fn argf() -> anyhow::Result<Source> {
    from_names(std::env::args_os().skip(1))
}
