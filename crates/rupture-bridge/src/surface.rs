//! Where outbound scripts go.
//!
//! The bridge only needs one primitive from the presentation layer: run this
//! script. [`WriterSurface`] prints scripts line by line (the headless CLI
//! writes them to stdout); [`MemorySurface`] records them for inspection.

use crate::error::SurfaceError;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A presentation layer that can evaluate scripts.
pub trait PresentationSurface: Send {
    /// Evaluate one script. Errors are reported to the caller, never panicked.
    fn evaluate(&mut self, script: &str) -> Result<(), SurfaceError>;
}

impl<S: PresentationSurface + ?Sized> PresentationSurface for Box<S> {
    fn evaluate(&mut self, script: &str) -> Result<(), SurfaceError> {
        (**self).evaluate(script)
    }
}

/// Writes each script as one line to an [`io::Write`](std::io::Write) sink.
#[derive(Debug)]
pub struct WriterSurface<W> {
    writer: W,
}

impl<W: Write + Send> WriterSurface<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PresentationSurface for WriterSurface<W> {
    fn evaluate(&mut self, script: &str) -> Result<(), SurfaceError> {
        match writeln!(self.writer, "{script}").and_then(|()| self.writer.flush()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(SurfaceError::Closed),
            Err(e) => Err(SurfaceError::Io(e)),
        }
    }
}

/// Records scripts in memory. Clones share the same log.
///
/// Can be switched into a failing mode to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    scripts: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl MemorySurface {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every script evaluated so far.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    /// Remove and return every script evaluated so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.scripts.lock())
    }

    /// Number of scripts evaluated so far.
    pub fn len(&self) -> usize {
        self.scripts.lock().len()
    }

    /// Whether nothing has been evaluated.
    pub fn is_empty(&self) -> bool {
        self.scripts.lock().is_empty()
    }

    /// Make subsequent evaluations fail (and not be recorded).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl PresentationSurface for MemorySurface {
    fn evaluate(&mut self, script: &str) -> Result<(), SurfaceError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(SurfaceError::Evaluate(format!("rejected: {script}")));
        }
        self.scripts.lock().push(script.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_surface_emits_one_line_per_script() {
        let mut surface = WriterSurface::new(Vec::new());
        surface.evaluate("window.a()").unwrap();
        surface.evaluate("window.b()").unwrap();
        assert_eq!(surface.into_inner(), b"window.a()\nwindow.b()\n");
    }

    #[test]
    fn memory_surface_clones_share_log() {
        let surface = MemorySurface::new();
        let mut writer = surface.clone();
        writer.evaluate("x").unwrap();
        assert_eq!(surface.scripts(), vec!["x".to_owned()]);
        assert_eq!(surface.take().len(), 1);
        assert!(surface.is_empty());
    }

    #[test]
    fn failing_mode_rejects_without_recording() {
        let mut surface = MemorySurface::new();
        surface.set_failing(true);
        assert!(matches!(surface.evaluate("x"), Err(SurfaceError::Evaluate(_))));
        assert!(surface.is_empty());
        surface.set_failing(false);
        assert!(surface.evaluate("y").is_ok());
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn boxed_surface_delegates() {
        let log = MemorySurface::new();
        let mut boxed: Box<dyn PresentationSurface> = Box::new(log.clone());
        boxed.evaluate("z").unwrap();
        assert_eq!(log.scripts(), vec!["z".to_owned()]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_pipe_reports_closed() {
        let mut surface = WriterSurface::new(BrokenPipe);
        assert!(matches!(surface.evaluate("x"), Err(SurfaceError::Closed)));
    }
}
