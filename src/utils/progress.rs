use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Spinner shown while an upload is processed station by station
pub struct ProgressReporter {
    spinner: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Spinner drawn through `bars`, so log lines written with a
    /// [`ProgressAwareWriter`] over the same bars never land mid-frame
    pub fn new_spinner_in(bars: &MultiProgress, message: &str, silent: bool) -> Self {
        if silent {
            return Self { spinner: None };
        }

        let pb = bars.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { spinner: Some(pb) }
    }

    pub fn station_started(&self, station_id: &str, index: usize, total: usize) {
        self.set_message(&format!(
            "Processing station {} ({}/{})...",
            station_id,
            index + 1,
            total
        ));
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.spinner {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.spinner {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.spinner {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Log writer that clears the live progress bars while a line is written,
/// then redraws them underneath
pub struct ProgressAwareWriter<M> {
    bars: MultiProgress,
    inner: M,
}

impl<M> ProgressAwareWriter<M> {
    pub fn new(bars: MultiProgress, inner: M) -> Self {
        Self { bars, inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<'a, M: MakeWriter<'a> + 'a> MakeWriter<'a> for ProgressAwareWriter<M> {
    type Writer = SuspendedWrite<'a, M>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedWrite {
            bars: &self.bars,
            inner: &self.inner,
            buffer: Vec::new(),
        }
    }
}

/// One formatted event, buffered until flush or drop
pub struct SuspendedWrite<'a, M: MakeWriter<'a>> {
    bars: &'a MultiProgress,
    inner: &'a M,
    buffer: Vec<u8>,
}

impl<'a, M: MakeWriter<'a>> Write for SuspendedWrite<'a, M> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let buffer = std::mem::take(&mut self.buffer);
        let inner = self.inner;
        self.bars.suspend(|| {
            let mut writer = inner.make_writer();
            writer.write_all(&buffer)?;
            writer.flush()
        })
    }
}

impl<'a, M: MakeWriter<'a>> Drop for SuspendedWrite<'a, M> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
