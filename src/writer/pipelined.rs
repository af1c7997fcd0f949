//! Background serialization for OrthoXML output.
//!
//! ```text
//! ┌─────────────┐     bounded channel      ┌─────────────────┐
//! │  Transducer │ ───DocumentItem────────▶ │ Background      │
//! │  (caller)   │      (moved, in order)   │ Writer Thread   │
//! │             │ ◀────error slot──────    │ (XML + I/O)     │
//! └─────────────┘   Arc<Mutex<Option>>     └─────────────────┘
//! ```
//!
//! Items travel through a single FIFO channel and are serialized by a single
//! thread, so the output is byte-identical to a sequential run. The channel
//! capacity bounds how many items (and thus rootHOGs) are in flight.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};

use super::{DocumentSink, OrthoXmlWriter, WriterError};
use crate::model::DocumentItem;

/// Default capacity of the channel between parser and writer thread
pub const DEFAULT_PIPELINE_CAPACITY: usize = 16;

type ErrorSlot = Arc<Mutex<Option<String>>>;

/// [`OrthoXmlWriter`] running on a dedicated background thread.
///
/// # Backpressure
///
/// When the channel is full, [`write_item`](DocumentSink::write_item) blocks
/// until the writer thread catches up.
///
/// # Error Handling
///
/// Errors in the background thread are reported on the next `write_item`
/// call or on [`finish`](Self::finish).
///
/// # Drop Safety
///
/// Dropping the writer without calling `finish` waits for the background
/// thread and logs a warning; the output may be incomplete.
pub struct PipelinedWriter<W: Write + Send + 'static> {
    /// Channel sender (None after finish() is called)
    sender: Option<Sender<DocumentItem>>,
    /// Background thread handle (None after finish() is called)
    handle: Option<JoinHandle<Result<W, String>>>,
    /// First error encountered by background thread
    first_error: ErrorSlot,
}

impl<W: Write + Send + 'static> PipelinedWriter<W> {
    /// Move `writer` onto a background thread named `orthoxml-writer`.
    ///
    /// A `capacity` of 0 makes every hand-over a rendezvous.
    pub fn new(writer: OrthoXmlWriter<W>, capacity: usize) -> Result<Self, WriterError> {
        let (sender, receiver) = bounded::<DocumentItem>(capacity);
        let first_error: ErrorSlot = Arc::new(Mutex::new(None));
        let thread_error = Arc::clone(&first_error);

        let handle = thread::Builder::new()
            .name("orthoxml-writer".to_string())
            .spawn(move || {
                let mut writer = writer;
                for item in receiver {
                    if let Err(e) = writer.write_item(item) {
                        return Err(record_error(&thread_error, e));
                    }
                }
                writer.finish().map_err(|e| record_error(&thread_error, e))
            })
            .map_err(|e| {
                WriterError::BackgroundWriterError(format!("Failed to spawn writer thread: {}", e))
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            first_error,
        })
    }

    /// Check whether the background writer has failed
    pub fn check_error(&self) -> Result<(), WriterError> {
        match read_error(&self.first_error) {
            Some(err) => Err(WriterError::BackgroundWriterError(err)),
            None => Ok(()),
        }
    }

    /// Close the channel, wait for the writer thread and return the destination
    pub fn finish(mut self) -> Result<W, WriterError> {
        self.sender.take();

        let handle = self.handle.take().ok_or_else(|| {
            WriterError::BackgroundWriterError("finish() called twice".to_string())
        })?;

        match handle.join() {
            Ok(Ok(inner)) => Ok(inner),
            Ok(Err(err_str)) => Err(WriterError::BackgroundWriterError(err_str)),
            Err(_panic) => Err(WriterError::ThreadPanicked),
        }
    }
}

impl<W: Write + Send + 'static> DocumentSink for PipelinedWriter<W> {
    fn write_item(&mut self, item: DocumentItem) -> Result<(), WriterError> {
        self.check_error()?;

        let sender = self.sender.as_ref().ok_or_else(|| {
            WriterError::BackgroundWriterError("Writer already finished".to_string())
        })?;

        sender.send(item).map_err(|_| {
            WriterError::BackgroundWriterError(read_error(&self.first_error).unwrap_or_else(|| {
                "Background writer thread exited unexpectedly".to_string()
            }))
        })
    }
}

impl<W: Write + Send + 'static> Drop for PipelinedWriter<W> {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            log::warn!("PipelinedWriter dropped without calling finish(); output may be incomplete");
            let _ = handle.join();
        }
    }
}

fn record_error(slot: &ErrorSlot, err: WriterError) -> String {
    let message = err.to_string();
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_none() {
        *guard = Some(message.clone());
    }
    message
}

fn read_error(slot: &ErrorSlot) -> Option<String> {
    slot.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}
