use crate::{Concat, Source};
use anyhow::{anyhow, Context};
use data_url::DataUrl;
use flate2::read::GzDecoder;
use std::{
    ffi::OsStr,
    fs::File,
    io::{self, Cursor, Read},
    path::Path,
};
#[cfg(not(windows))]
use std::process::{Child, ChildStdout};
use url::Url;

/// Open each of `names` and concatenate them, in order.
///
/// If `names` is empty, the result is standard input rather than an empty
/// stream. See [`open_input`] for how names are interpreted. The first name
/// which can't be opened stops construction, and the error names it; when
/// the failure came from the OS, the `std::io::Error` is in the error's
/// chain.
pub fn from_names<I>(names: I) -> anyhow::Result<Source>
where
    I: IntoIterator,
    I::Item: AsRef<OsStr>,
{
    let sources = names
        .into_iter()
        .map(|name| open_input(name.as_ref()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if sources.is_empty() {
        log::debug!("no inputs named; reading stdin");
        return Ok(Source::stdin());
    }

    Ok(Source::Concat(Concat::new(sources)))
}

/// Open the input named by the string `os`.
///
/// Currently supported syntaxes include:
///  - "-" is interpreted as standard input.
///  - Names starting with `file:` are interpreted as local filesystem
///    URLs providing paths to files to open.
///  - Names starting with `data:` are interpreted as data URLs providing
///    the data in their payload.
///  - "$(...)" runs a command with a pipe from the child process' stdout,
///    on platforms which support it.
///  - Anything else is interpreted as a plain local filesystem path,
///    including names like "notes:v1.txt" which merely look like URLs.
///    Files ending in ".gz" are decompressed.
///
/// The resulting source reports `os` as its name, as given. If the input
/// can't be opened, the error says "could not open" followed by the name.
pub fn open_input(os: &OsStr) -> anyhow::Result<Source> {
    open_unnamed(os).with_context(|| format!("could not open {}", os.to_string_lossy()))
}

fn open_unnamed(os: &OsStr) -> anyhow::Result<Source> {
    // Special-case "-" to mean stdin.
    if os == OsStr::new("-") {
        log::debug!("opening stdin");
        return Ok(Source::stdin());
    }

    if let Some(s) = os.to_str() {
        // Only the URL schemes we handle are URLs; other names with a
        // colon may still be paths.
        if let Ok(url) = Url::parse(s) {
            match url.scheme() {
                "data" => return open_data_url_str(s),
                "file" => return open_file_url(s, &url),
                _ => (),
            }
        }

        // Strings beginning with "$(" are commands.
        #[cfg(not(windows))]
        if s.starts_with("$(") {
            return spawn_child(s);
        }
    }

    // Otherwise try opening it as a path in the filesystem namespace.
    open_path(&os.to_string_lossy(), Path::new(os))
}

fn open_file_url(name: &str, url: &Url) -> anyhow::Result<Source> {
    if !url.username().is_empty()
        || url.password().is_some()
        || url.has_host()
        || url.port().is_some()
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(anyhow!("file URL should only contain a path"));
    }
    let path = url
        .to_file_path()
        .map_err(|()| anyhow!("file URL has no local path"))?;
    open_path(name, &path)
}

fn open_data_url_str(data_url_str: &str) -> anyhow::Result<Source> {
    // `DataUrl`'s errors don't implement `std::error::Error`.
    let data_url =
        DataUrl::process(data_url_str).map_err(|e| anyhow!("invalid data URL syntax: {:?}", e))?;
    let (body, fragment) = data_url
        .decode_to_vec()
        .map_err(|_| anyhow!("invalid base64 encoding"))?;

    if fragment.is_some() {
        return Err(anyhow!("data urls with fragments are unsupported"));
    }

    log::debug!("opening data URL with {} bytes", body.len());
    Ok(Source::named(data_url_str, Cursor::new(body)))
}

fn open_path(name: &str, path: &Path) -> anyhow::Result<Source> {
    let file = File::open(path)?;

    if path.extension() == Some(OsStr::new("gz")) {
        log::debug!("opening {} as gzip", name);
        Ok(Source::named(name, GzDecoder::new(file)))
    } else {
        log::debug!("opening {}", name);
        Ok(Source::file(name, file))
    }
}

#[cfg(not(windows))]
fn spawn_child(s: &str) -> anyhow::Result<Source> {
    use std::process::{Command, Stdio};
    debug_assert!(s.starts_with("$("));
    if !s.ends_with(')') {
        return Err(anyhow!("child string must end in ')'"));
    }
    let words = shell_words::split(&s[2..s.len() - 1])?;
    let (first, rest) = words
        .split_first()
        .ok_or_else(|| anyhow!("child stream specified with '(...)' must contain a command"))?;
    log::debug!("spawning {}", first);
    let child = Command::new(first)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()?;
    Ok(Source::named(s, ChildReader::new(child)?))
}

/// The stdout of a child process, which reaps the child once its output
/// ends.
#[cfg(not(windows))]
struct ChildReader {
    child: Child,
    stdout: ChildStdout,
    reaped: bool,
}

#[cfg(not(windows))]
impl ChildReader {
    fn new(mut child: Child) -> io::Result<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child has no stdout"))?;
        Ok(Self {
            child,
            stdout,
            reaped: false,
        })
    }
}

#[cfg(not(windows))]
impl Read for ChildReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let size = self.stdout.read(buf)?;
        if size == 0 && !buf.is_empty() && !self.reaped {
            let status = self.child.wait()?;
            self.reaped = true;
            // A failing exit status isn't a read error; the output is
            // whatever the child wrote.
            if status.success() {
                log::debug!("child exited");
            } else {
                log::warn!("child exited with {}", status);
            }
        }
        Ok(size)
    }
}

#[cfg(not(windows))]
impl Drop for ChildReader {
    fn drop(&mut self) {
        if !self.reaped {
            // Don't block on a child that's still writing.
            if let Ok(Some(status)) = self.child.try_wait() {
                log::debug!("child exited with {}", status);
            }
        }
    }
}

#[cfg(test)]
fn read_name(name: &str) -> String {
    let mut s = String::new();
    open_input(name.as_ref())
        .unwrap()
        .read_to_string(&mut s)
        .unwrap();
    s
}

#[test]
fn data_url_plain() {
    assert_eq!(read_name("data:,Hello%2C%20World!"), "Hello, World!");
}

#[test]
fn data_url_base64() {
    assert_eq!(
        read_name("data:text/plain;base64,SGVsbG8sIFdvcmxkIQ=="),
        "Hello, World!"
    );
}

#[test]
fn data_url_name_is_the_url() {
    let source = open_input("data:,abc".as_ref()).unwrap();
    assert_eq!(source.name(), "data:,abc");
}

#[test]
fn dash_is_stdin() {
    let source = open_input("-".as_ref()).unwrap();
    assert!(matches!(source, Source::Stdin(_)));
    assert_eq!(source.name(), crate::STDIN_NAME);
}

#[test]
fn no_names_is_stdin() {
    let source = from_names(Vec::<&str>::new()).unwrap();
    assert_eq!(source.name(), crate::STDIN_NAME);
}

#[test]
fn other_schemes_are_paths() {
    let err = open_input("gopher://example.com/".as_ref()).unwrap_err();
    assert_eq!(err.to_string(), "could not open gopher://example.com/");
    let io = err.downcast_ref::<io::Error>().unwrap();
    assert_eq!(io.kind(), io::ErrorKind::NotFound);
}

#[test]
fn file_url_with_host() {
    assert!(open_input("file://example.com/etc/hosts".as_ref()).is_err());
}

#[test]
fn missing_file() {
    let err = from_names(&["data:,ok", "no/such/argf-input.txt"]).unwrap_err();
    assert!(err.to_string().contains("no/such/argf-input.txt"));
    let io = err.downcast_ref::<io::Error>().unwrap();
    assert_eq!(io.kind(), io::ErrorKind::NotFound);
}

#[cfg(not(windows))]
#[test]
fn child_stdout() {
    let mut source = open_input("$(echo hello)".as_ref()).unwrap();
    assert_eq!(source.name(), "$(echo hello)");
    let mut s = String::new();
    source.read_to_string(&mut s).unwrap();
    assert_eq!(s, "hello\n");
}

#[cfg(not(windows))]
#[test]
fn child_is_reaped_at_end() {
    use std::process::{Command, Stdio};
    let child = Command::new("echo")
        .arg("bye")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut reader = ChildReader::new(child).unwrap();
    let mut s = String::new();
    reader.read_to_string(&mut s).unwrap();
    assert_eq!(s, "bye\n");
    assert!(reader.reaped);
}

#[cfg(not(windows))]
#[test]
fn failing_child_is_not_a_read_error() {
    let mut s = String::new();
    open_input("$(false)".as_ref())
        .unwrap()
        .read_to_string(&mut s)
        .unwrap();
    assert_eq!(s, "");
}

#[cfg(not(windows))]
#[test]
fn child_needs_a_command() {
    assert!(open_input("$()".as_ref()).is_err());
    let err = open_input("$(echo".as_ref()).unwrap_err();
    assert_eq!(err.to_string(), "could not open $(echo");
}

#[test]
fn failures_name_their_input() {
    for bad in &[
        "file://example.com/etc/hosts",
        "data:;base64,!!!!",
        "data:,abc#frag",
    ] {
        let err = from_names(&["data:,ok", bad]).unwrap_err();
        assert_eq!(err.to_string(), format!("could not open {}", bad));
    }
}
