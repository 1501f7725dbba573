//! Multi-file worker pool.
//!
//! Processes a list of files on a fixed number of worker threads while
//! preserving input order in the results: each outcome is written to the
//! slot matching its input index, regardless of completion order.
//! Cancellation is cooperative: once the deadline passes, in-flight work
//! finishes its current file but nothing new is dispatched.

use crate::error::KeelError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

/// The outcome of processing one file.
#[derive(Debug)]
pub struct FileResult<T> {
    pub filename: String,
    pub result: Result<T, KeelError>,
}

/// Fixed-size worker pool over a list of filenames.
pub struct Processor {
    workers: usize,
    deadline: Option<Instant>,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            deadline: None,
        }
    }
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, n: usize) -> Self {
        if n > 0 {
            self.workers = n;
        }
        self
    }

    /// Stop dispatching new files once this instant passes. Files not
    /// dispatched in time complete with a cancellation error.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run `process` over every file; results come back in input order.
    pub fn process<T, F>(&self, files: &[String], process: F) -> Vec<FileResult<T>>
    where
        T: Send,
        F: Fn(&str) -> Result<T, KeelError> + Send + Sync,
    {
        if files.is_empty() {
            return Vec::new();
        }

        let workers = self.workers.min(files.len());
        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<FileResult<T>>>> =
            Mutex::new((0..files.len()).map(|_| None).collect());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let idx = next.fetch_add(1, Ordering::Relaxed);
                    if idx >= files.len() {
                        break;
                    }
                    let filename = &files[idx];

                    let cancelled = self.deadline.map_or(false, |d| Instant::now() >= d);
                    let result = if cancelled {
                        Err(KeelError::Cancelled)
                    } else {
                        process(filename)
                    };

                    slots.lock()[idx] = Some(FileResult {
                        filename: filename.clone(),
                        result,
                    });
                });
            }
        });

        slots
            .into_inner()
            .into_iter()
            .map(|slot| slot.expect("every slot filled by a worker"))
            .collect()
    }
}

/// Count of failed results.
pub fn error_count<T>(results: &[FileResult<T>]) -> usize {
    results.iter().filter(|r| r.result.is_err()).count()
}
