use crate::Concat;
use std::{
    any::type_name,
    fmt::{self, Debug, Formatter},
    fs::File,
    io::{self, stdin, IoSliceMut, Read, Stdin},
};

/// The name reported for the process' standard input.
pub const STDIN_NAME: &str = ":stdin:";

/// The name reported for a concatenation with no sources left.
pub const EOF_NAME: &str = ":EOF:";

/// One input in a concatenation.
///
/// `Source` implements `Read`, so any source can be read on its own, but
/// it's typically collected into a [`Concat`] (or produced by
/// [`from_names`]) and read through that.
///
/// [`from_names`]: crate::from_names
pub enum Source {
    /// Standard input.
    Stdin(Stdin),

    /// A file, with the name it was opened under.
    File {
        /// The name as given when the file was opened.
        name: String,
        /// The open file.
        file: File,
    },

    /// Any other reader opened from a name, such as a decompressed file, a
    /// `data:` URL payload, or the output of a child process.
    Named {
        /// The name as given when the input was opened.
        name: String,
        /// The reader producing the input's bytes.
        reader: Box<dyn Read + Send>,
    },

    /// A nested concatenation.
    Concat(Concat),

    /// A reader we know nothing about, labeled by its type.
    Opaque {
        /// The Rust type name of the reader.
        type_name: &'static str,
        /// The reader.
        reader: Box<dyn Read + Send>,
    },
}

impl Source {
    /// Standard input.
    #[inline]
    pub fn stdin() -> Self {
        Self::Stdin(stdin())
    }

    /// A file which was opened as `name`.
    #[inline]
    pub fn file<S: Into<String>>(name: S, file: File) -> Self {
        Self::File {
            name: name.into(),
            file,
        }
    }

    /// An arbitrary reader which should be reported as `name`.
    #[inline]
    pub fn named<S, R>(name: S, reader: R) -> Self
    where
        S: Into<String>,
        R: Read + Send + 'static,
    {
        Self::Named {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// An arbitrary reader with no name. Its reported name is derived from
    /// its type and isn't meant to be stable.
    #[inline]
    pub fn opaque<R: Read + Send + 'static>(reader: R) -> Self {
        Self::Opaque {
            type_name: type_name::<R>(),
            reader: Box::new(reader),
        }
    }

    /// Return the name of whichever input is currently first in line.
    ///
    /// For a file or other named input, this is the name it was opened
    /// under. Standard input is [`STDIN_NAME`]. A concatenation reports its
    /// front source, or [`EOF_NAME`] once all of its sources are consumed.
    ///
    /// The name changes as reads advance past exhausted inputs; an input
    /// stays current until a read observes its end, so when reading line by
    /// line, ask for the name after each line is read.
    pub fn name(&self) -> &str {
        let mut current = self;
        loop {
            match current {
                Self::Stdin(_) => return STDIN_NAME,
                Self::File { name, .. } | Self::Named { name, .. } => return name,
                Self::Opaque { type_name, .. } => return type_name,
                Self::Concat(concat) => match concat.front() {
                    Some(front) => current = front,
                    None => return EOF_NAME,
                },
            }
        }
    }
}

/// Return the name of whichever input `source` is currently reading from.
///
/// This is the same as [`Source::name`].
#[inline]
pub fn name(source: &Source) -> &str {
    source.name()
}

impl From<Concat> for Source {
    #[inline]
    fn from(concat: Concat) -> Self {
        Self::Concat(concat)
    }
}

impl From<Stdin> for Source {
    #[inline]
    fn from(stdin: Stdin) -> Self {
        Self::Stdin(stdin)
    }
}

impl Read for Source {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stdin(stdin) => stdin.read(buf),
            Self::File { file, .. } => file.read(buf),
            Self::Named { reader, .. } | Self::Opaque { reader, .. } => reader.read(buf),
            Self::Concat(concat) => concat.read(buf),
        }
    }

    #[inline]
    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        match self {
            Self::Stdin(stdin) => stdin.read_vectored(bufs),
            Self::File { file, .. } => file.read_vectored(bufs),
            Self::Named { reader, .. } | Self::Opaque { reader, .. } => reader.read_vectored(bufs),
            Self::Concat(concat) => concat.read_vectored(bufs),
        }
    }
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin(_) => f.write_str("Stdin"),
            Self::File { name, .. } => f.debug_struct("File").field("name", name).finish(),
            Self::Named { name, .. } => f.debug_struct("Named").field("name", name).finish(),
            Self::Concat(concat) => Debug::fmt(concat, f),
            Self::Opaque { type_name, .. } => f
                .debug_struct("Opaque")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{empty, Cursor};

    fn text(name: &str, contents: &'static str) -> Source {
        Source::named(name, contents.as_bytes())
    }

    #[test_log::test]
    fn stdin_is_always_stdin() {
        assert_eq!(Source::stdin().name(), STDIN_NAME);

        let concat = Concat::new(vec![Source::stdin(), text("later", "x")]);
        assert_eq!(concat.name(), STDIN_NAME);
    }

    #[test_log::test]
    fn named_sources_keep_their_names() {
        assert_eq!(text("1.txt", "").name(), "1.txt");
        assert_eq!(text("some/dir/2.txt", "").name(), "some/dir/2.txt");
    }

    #[test_log::test]
    fn empty_concat_is_eof() {
        assert_eq!(Source::from(Concat::default()).name(), EOF_NAME);
        assert_eq!(name(&Concat::new(Vec::new()).into()), EOF_NAME);
    }

    #[test_log::test]
    fn nested_concat_reports_innermost_front() {
        let inner = Concat::new(vec![text("b", "B"), text("c", "C")]);
        let middle = Concat::new(vec![Source::from(inner), text("d", "D")]);
        let outer = Source::from(Concat::new(vec![Source::from(middle)]));
        assert_eq!(outer.name(), "b");
    }

    #[test_log::test]
    fn nested_empty_concat_is_eof() {
        let outer = Concat::new(vec![Source::from(Concat::default()), text("x", "X")]);
        // The empty inner concatenation is still first in line.
        assert_eq!(outer.name(), EOF_NAME);
    }

    #[test_log::test]
    fn opaque_names_are_nonempty() {
        let source = Source::opaque(Cursor::new(vec![1, 2, 3]));
        assert!(!source.name().is_empty());
        assert!(!Source::opaque(empty()).name().is_empty());
    }

    #[test_log::test]
    fn resolving_does_not_consume() {
        let mut source = text("a", "abc");
        assert_eq!(source.name(), "a");
        assert_eq!(source.name(), "a");
        let mut s = String::new();
        source.read_to_string(&mut s).unwrap();
        assert_eq!(s, "abc");
    }

    #[test_log::test]
    fn debug_shows_structure() {
        let source = Source::from(Concat::new(vec![text("a", ""), Source::stdin()]));
        let debug = format!("{:?}", source);
        assert!(debug.contains("\"a\""));
        assert!(debug.contains("Stdin"));
    }
}
