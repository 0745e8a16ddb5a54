//! Define `Concat`, a reader which reads a sequence of sources one after
//! another.

use crate::Source;
use layered_io::{Bufferable, ReadLayered, Status};
use std::{
    collections::VecDeque,
    fmt::{self, Debug, Formatter},
    io::{self, Read},
    iter::FromIterator,
};

/// A reader which reads each of its sources to the end, in order, as if
/// they were one stream.
///
/// The end of each source is hidden; a `Concat` reports end-of-stream only
/// once, after the last byte of its last source. Sources are dropped as
/// soon as a read observes their end, and a `Concat` whose last remaining
/// source is itself a `Concat` takes over that source's sequence, so
/// repeatedly composing concatenations doesn't stack up layers of
/// indirection.
///
/// A read error from a source is returned to the caller, and every later
/// read fails the same way; sources after the failing one are never read.
/// `ErrorKind::Interrupted` is the exception, and may be retried.
#[derive(Default)]
pub struct Concat {
    sources: VecDeque<Source>,
    failure: Option<Failure>,
}

/// A latched read error, replayed on every read after the first failure.
struct Failure {
    kind: io::ErrorKind,
    message: String,
}

impl Failure {
    fn to_error(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }
}

impl Concat {
    /// Construct a new `Concat` which reads `sources` in order. An empty
    /// sequence produces a stream that is already at its end.
    pub fn new<I: IntoIterator<Item = Source>>(sources: I) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            failure: None,
        }
    }

    /// Return the number of sources which haven't yet been read to their
    /// end. A nested `Concat` counts as one.
    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Test whether every source has been read to its end.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Return the source which the next read will start from.
    #[inline]
    pub fn front(&self) -> Option<&Source> {
        self.sources.front()
    }

    /// Return the name of the source currently being read. See
    /// [`Source::name`].
    pub fn name(&self) -> &str {
        match self.sources.front() {
            Some(front) => front.name(),
            None => crate::EOF_NAME,
        }
    }

    /// While our only remaining source is a `Concat`, adopt its sources.
    fn flatten(&mut self) {
        while self.sources.len() == 1 {
            match self.sources.pop_front() {
                Some(Source::Concat(inner)) => {
                    log::trace!("splicing in {} nested sources", inner.sources.len());
                    self.sources = inner.sources;
                    if self.failure.is_none() {
                        self.failure = inner.failure;
                    }
                }
                Some(other) => {
                    self.sources.push_front(other);
                    break;
                }
                None => break,
            }
        }
    }
}

impl FromIterator<Source> for Concat {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Source>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl ReadLayered for Concat {
    fn read_with_status(&mut self, buf: &mut [u8]) -> io::Result<(usize, Status)> {
        // A zero-length read says nothing about whether a source has ended.
        if buf.is_empty() {
            return Ok((0, Status::active()));
        }
        loop {
            self.flatten();
            if let Some(failure) = &self.failure {
                return Err(failure.to_error());
            }

            let front = match self.sources.front_mut() {
                Some(front) => front,
                None => return Ok((0, Status::End)),
            };

            match front.read(buf) {
                Ok(0) => {
                    if let Some(done) = self.sources.pop_front() {
                        log::trace!("finished reading {}", done.name());
                    }
                }
                Ok(size) => return Ok((size, Status::active())),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => return Err(err),
                Err(err) => {
                    log::debug!("read from {} failed: {}", front.name(), err);
                    self.failure = Some(Failure {
                        kind: err.kind(),
                        message: err.to_string(),
                    });
                    return Err(err);
                }
            }
        }
    }
}

impl Read for Concat {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_with_status(buf).map(|(size, _status)| size)
    }
}

impl Bufferable for Concat {
    /// Discard all remaining sources, and any latched failure. Subsequent
    /// reads report the end of the stream.
    fn abandon(&mut self) {
        self.sources.clear();
        self.failure = None;
    }
}

impl Debug for Concat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut b = f.debug_struct("Concat");
        b.field("sources", &self.sources);
        b.field("failed", &self.failure.is_some());
        b.finish()
    }
}
