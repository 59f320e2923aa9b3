//! Shared buffer between the recognition engine and the capture loop.
//!
//! The recognizer appends complete lines; the capture loop periodically
//! drains everything accumulated so far. Both sides go through one mutex,
//! and the writer only ever appends whole lines while holding it, so a
//! drain can never observe a line cut in half.

use std::sync::Mutex;

use crate::error::{RespeakError, Result};

/// Line-oriented append buffer with destructive reads.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    inner: Mutex<String>,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line, adding the trailing newline.
    ///
    /// Called from the recognition side. A poisoned lock means the draining
    /// side already panicked and the run is coming down; the line is dropped
    /// rather than propagating a panic into the engine callback.
    pub fn push_line(&self, line: &str) {
        if let Ok(mut buf) = self.inner.lock() {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    /// Take the full current contents, leaving the buffer empty.
    pub fn drain(&self) -> Result<String> {
        let mut buf = self.inner.lock().map_err(|e| RespeakError::Capture {
            message: format!("Failed to lock transcript buffer: {}", e),
        })?;
        Ok(std::mem::take(&mut *buf))
    }

    /// Put a drained snapshot back in front of anything written since.
    ///
    /// Used when persisting a drained delta failed, so the next drain sees
    /// the same lines again in their original order.
    pub fn requeue(&self, snapshot: &str) -> Result<()> {
        let mut buf = self.inner.lock().map_err(|e| RespeakError::Capture {
            message: format!("Failed to lock transcript buffer: {}", e),
        })?;
        buf.insert_str(0, snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn drain_returns_contents_and_empties() {
        let buffer = TranscriptBuffer::new();
        buffer.push_line("[00:00.000 --> 00:02.000] first");
        buffer.push_line("[00:02.000 --> 00:04.000] second");

        let snapshot = buffer.drain().unwrap();
        assert_eq!(
            snapshot,
            "[00:00.000 --> 00:02.000] first\n[00:02.000 --> 00:04.000] second\n"
        );
        assert_eq!(buffer.drain().unwrap(), "");
    }

    #[test]
    fn drain_on_empty_buffer_returns_empty_string() {
        let buffer = TranscriptBuffer::new();
        assert_eq!(buffer.drain().unwrap(), "");
    }

    #[test]
    fn requeue_prepends_before_later_writes() {
        let buffer = TranscriptBuffer::new();
        buffer.push_line("second");
        buffer.requeue("first\n").unwrap();
        assert_eq!(buffer.drain().unwrap(), "first\nsecond\n");
    }

    #[test]
    fn interleaved_pushes_and_drains_lose_nothing() {
        let buffer = Arc::new(TranscriptBuffer::new());
        let writer_buffer = Arc::clone(&buffer);

        let writer = thread::spawn(move || {
            for i in 0..200 {
                writer_buffer.push_line(&format!("line {}", i));
                if i % 50 == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        });

        let mut collected = String::new();
        while !writer.is_finished() {
            collected.push_str(&buffer.drain().unwrap());
        }
        writer.join().unwrap();
        collected.push_str(&buffer.drain().unwrap());

        let expected: String = (0..200).map(|i| format!("line {}\n", i)).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn drained_snapshots_contain_only_complete_lines() {
        let buffer = Arc::new(TranscriptBuffer::new());
        let writer_buffer = Arc::clone(&buffer);

        let writer = thread::spawn(move || {
            for i in 0..100 {
                writer_buffer.push_line(&format!("segment number {}", i));
            }
        });

        let mut snapshots = Vec::new();
        while !writer.is_finished() {
            let snapshot = buffer.drain().unwrap();
            if !snapshot.is_empty() {
                snapshots.push(snapshot);
            }
        }
        writer.join().unwrap();
        snapshots.push(buffer.drain().unwrap());

        for snapshot in &snapshots {
            if !snapshot.is_empty() {
                assert!(snapshot.ends_with('\n'));
            }
        }
    }
}
