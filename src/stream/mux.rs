//! Pipe-backed line multiplexer.
//!
//! A [`StreamMux`] owns one OS pipe. The write end is handed to the owning
//! step (as text writes) and to any child process it launches (as raw
//! stdio). A dedicated reader thread owns the read end, applies a
//! [`LineTransform`] to every complete line and forwards the result to a
//! shared [`Sink`].
//!
//! Closing the write end alone does not tell the caller when the reader has
//! caught up, and a child process may still hold a duplicate of it. So
//! [`StreamMux::close`] writes a unique sentinel line and waits on a
//! one-shot channel until the reader has consumed it. After `close`
//! returns, everything written earlier has reached the sink.

use std::io::{self, BufRead, BufReader, PipeReader, PipeWriter, Write};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::debug;

/// Shared output target that reader threads forward into.
pub type Sink = Arc<Mutex<dyn Write + Send>>;

/// Predicate deciding whether a line is forwarded by a filter.
pub type LinePredicate = Box<dyn Fn(&str) -> bool + Send>;

/// Sink writing to the process stdout.
pub fn stdout_sink() -> Sink {
    Arc::new(Mutex::new(io::stdout()))
}

/// Sink that drops everything.
pub fn discard_sink() -> Sink {
    Arc::new(Mutex::new(io::sink()))
}

static NEXT_SENTINEL: AtomicU64 = AtomicU64::new(0);

fn next_sentinel() -> String {
    format!(
        "\u{1}threedmake-stream-end-{}-{}",
        std::process::id(),
        NEXT_SENTINEL.fetch_add(1, Ordering::Relaxed)
    )
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Text captured by a store-and-forward stream.
///
/// The reader thread appends while the owner may read once the producing
/// process has exited.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<String>>);

impl CapturedOutput {
    fn push(&self, line: &str) {
        lock(&*self.0).push_str(line);
    }

    /// Snapshot of everything captured so far.
    pub fn text(&self) -> String {
        lock(&*self.0).clone()
    }

    /// First captured line matching `pred`, without its line ending.
    pub fn find_line(&self, pred: impl Fn(&str) -> bool) -> Option<String> {
        lock(&*self.0)
            .lines()
            .find(|line| pred(line))
            .map(str::to_string)
    }
}

/// What the reader thread does with each complete line.
pub enum LineTransform {
    /// Prefix every line with `width` spaces.
    Indent { width: usize },

    /// Forward only lines accepted by `predicate`, optionally padded with
    /// spaces to `pad_to` columns.
    Filter {
        predicate: LinePredicate,
        pad_to: Option<usize>,
    },

    /// Record every raw line and forward it unchanged.
    StoreAndForward { captured: CapturedOutput },
}

impl LineTransform {
    /// Text to forward for `line` (which carries its trailing newline).
    fn apply(&self, line: &str) -> Option<String> {
        match self {
            LineTransform::Indent { width } => Some(format!("{:w$}{}", "", line, w = *width)),
            LineTransform::Filter { predicate, pad_to } => {
                if !predicate(line) {
                    return None;
                }
                match pad_to {
                    Some(width) => {
                        let body = line.trim_end_matches(['\r', '\n']);
                        Some(format!("{:<w$}\n", body, w = *width))
                    }
                    None => Some(line.to_string()),
                }
            }
            LineTransform::StoreAndForward { captured } => {
                captured.push(line);
                Some(line.to_string())
            }
        }
    }
}

impl std::fmt::Debug for LineTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineTransform::Indent { width } => f.debug_struct("Indent").field("width", width).finish(),
            LineTransform::Filter { pad_to, .. } => {
                f.debug_struct("Filter").field("pad_to", pad_to).finish()
            }
            LineTransform::StoreAndForward { .. } => f.write_str("StoreAndForward"),
        }
    }
}

/// One pipe, one reader thread, one transform.
pub struct StreamMux {
    writer: Mutex<Option<PipeWriter>>,
    stop: Arc<AtomicBool>,
    sentinel: String,
    done: Mutex<Option<Receiver<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl StreamMux {
    /// Create a stream forwarding transformed lines into `sink`.
    pub fn new(sink: Sink, transform: LineTransform) -> io::Result<Self> {
        let (read_end, write_end) = io::pipe()?;
        let stop = Arc::new(AtomicBool::new(false));
        let sentinel = next_sentinel();
        let (done_tx, done_rx) = mpsc::sync_channel(1);

        debug!("Opening {:?} stream", transform);

        let handle = thread::Builder::new().name("stream-mux".into()).spawn({
            let stop = Arc::clone(&stop);
            let sentinel = sentinel.clone();
            move || {
                pump(read_end, &sink, &transform, &stop, &sentinel);
                let _ = done_tx.send(());
            }
        })?;

        Ok(Self {
            writer: Mutex::new(Some(write_end)),
            stop,
            sentinel,
            done: Mutex::new(Some(done_rx)),
            reader: Mutex::new(Some(handle)),
        })
    }

    /// Indent every line by `width` spaces.
    pub fn indent(sink: Sink, width: usize) -> io::Result<Self> {
        Self::new(sink, LineTransform::Indent { width })
    }

    /// Forward only the lines accepted by `predicate`.
    pub fn filter(
        sink: Sink,
        predicate: impl Fn(&str) -> bool + Send + 'static,
        pad_to: Option<usize>,
    ) -> io::Result<Self> {
        Self::new(
            sink,
            LineTransform::Filter {
                predicate: Box::new(predicate),
                pad_to,
            },
        )
    }

    /// Forward every line and keep a copy of it.
    pub fn store_and_forward(sink: Sink) -> io::Result<(Self, CapturedOutput)> {
        let captured = CapturedOutput::default();
        let mux = Self::new(
            sink,
            LineTransform::StoreAndForward {
                captured: captured.clone(),
            },
        )?;
        Ok((mux, captured))
    }

    /// Write text into the pipe.
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        let mut guard = lock(&self.writer);
        let writer = guard.as_mut().ok_or_else(closed_error)?;
        writer.write_all(text.as_bytes())
    }

    /// A duplicate of the write end, for a child process's stdout or stderr.
    pub fn stdio(&self) -> io::Result<Stdio> {
        let guard = lock(&self.writer);
        let writer = guard.as_ref().ok_or_else(closed_error)?;
        Ok(Stdio::from(writer.try_clone()?))
    }

    /// A duplicate of the write end, usable as another stream's sink.
    pub fn as_sink(&self) -> io::Result<Sink> {
        let guard = lock(&self.writer);
        let writer = guard.as_ref().ok_or_else(closed_error)?;
        Ok(Arc::new(Mutex::new(writer.try_clone()?)))
    }

    /// Whether [`close`](Self::close) has already run.
    pub fn is_closed(&self) -> bool {
        lock(&self.writer).is_none()
    }

    /// Flush everything written so far to the sink and stop the reader.
    ///
    /// Blocks until the reader thread has seen the sentinel. Calling it
    /// again is a no-op.
    pub fn close(&self) {
        let Some(mut writer) = lock(&self.writer).take() else {
            return;
        };

        self.stop.store(true, Ordering::SeqCst);
        if let Err(e) = writer.write_all(format!("{}\n", self.sentinel).as_bytes()) {
            debug!("Failed to write stream sentinel: {}", e);
        }
        drop(writer);

        if let Some(done) = lock(&self.done).take() {
            // Err means the reader already exited and dropped its sender.
            let _ = done.recv();
        }
        if let Some(handle) = lock(&self.reader).take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StreamMux {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for StreamMux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamMux")
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "stream already closed")
}

fn pump(read_end: PipeReader, sink: &Sink, transform: &LineTransform, stop: &AtomicBool, sentinel: &str) {
    let mut reader = BufReader::new(read_end);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Stream read failed: {}", e);
                break;
            }
        }

        let mut line = String::from_utf8_lossy(&buf).into_owned();
        if !line.ends_with('\n') {
            line.push('\n');
        }

        if stop.load(Ordering::SeqCst) {
            let body = line.trim_end_matches('\n');
            if let Some(partial) = body.strip_suffix(sentinel) {
                // Output written without a final newline lands in front of the sentinel.
                if !partial.is_empty() {
                    forward(sink, transform, &format!("{}\n", partial));
                }
                return;
            }
        }

        forward(sink, transform, &line);
    }
}

fn forward(sink: &Sink, transform: &LineTransform, line: &str) {
    let Some(text) = transform.apply(line) else {
        return;
    };

    let mut out = lock(&**sink);
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        debug!("Dropping stream output, sink write failed: {}", e);
    }
}
