// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

/*!
Progress reporting and cooperative cancellation.

Loaders and analysis kernels receive a [`TaskControl`] explicitly. They call
[`TaskControl::checkpoint`] between sections and [`TaskControl::report`] from
their inner loops; nothing here is global.
*/

use crate::error::{MorphologyError, MorphologyResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Progress callback taking `(processed, total)`.
///
/// The lifetime lets callbacks borrow the caller's state.
pub type ProgressFn<'a> = dyn Fn(u64, u64) + Sync + 'a;

/// Progress sink and abort flag handed to long-running operations.
///
/// # Examples
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use vessmorph_structures::{MorphologyError, TaskControl};
///
/// let abort = AtomicBool::new(false);
/// let control = TaskControl::none().with_abort_flag(&abort);
/// assert!(control.checkpoint().is_ok());
///
/// abort.store(true, Ordering::Relaxed);
/// assert!(matches!(control.checkpoint(), Err(MorphologyError::Cancelled)));
/// ```
#[derive(Default)]
pub struct TaskControl<'a> {
    progress: Option<&'a ProgressFn<'a>>,
    abort: Option<&'a AtomicBool>,
    last_reported: AtomicU64,
}

impl<'a> TaskControl<'a> {
    /// No progress sink, never cancelled.
    pub fn none() -> Self {
        TaskControl::default()
    }

    pub fn with_progress(mut self, progress: &'a ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_abort_flag(mut self, abort: &'a AtomicBool) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Returns [`MorphologyError::Cancelled`] once the abort flag is raised.
    pub fn checkpoint(&self) -> MorphologyResult<()> {
        if self.is_cancelled() {
            Err(MorphologyError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Forwards `(processed, total)` to the callback.
    ///
    /// `processed` values lower than one already reported are raised to the
    /// previous value so observers only ever see a non-decreasing sequence.
    pub fn report(&self, processed: u64, total: u64) {
        if let Some(progress) = self.progress {
            let previous = self.last_reported.fetch_max(processed, Ordering::Relaxed);
            progress(processed.max(previous), total);
        }
    }
}

impl std::fmt::Debug for TaskControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskControl")
            .field("has_progress", &self.progress.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_report_is_monotonic() {
        let seen = Mutex::new(Vec::new());
        {
            let sink = |done: u64, total: u64| seen.lock().unwrap().push((done, total));
            let control = TaskControl::none().with_progress(&sink);

            control.report(1, 10);
            control.report(5, 10);
            control.report(3, 10);
            control.report(10, 10);
        }

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![(1, 10), (5, 10), (5, 10), (10, 10)]);
    }

    #[test]
    fn test_progress_callback_can_raise_local_abort_flag() {
        let abort = AtomicBool::new(false);
        let sink = |done: u64, _total: u64| {
            if done >= 2 {
                abort.store(true, Ordering::Relaxed);
            }
        };
        let control = TaskControl::none()
            .with_progress(&sink)
            .with_abort_flag(&abort);

        control.report(1, 4);
        assert!(control.checkpoint().is_ok());
        control.report(2, 4);
        assert!(matches!(control.checkpoint(), Err(MorphologyError::Cancelled)));
    }

    #[test]
    fn test_none_is_never_cancelled() {
        let control = TaskControl::none();
        assert!(!control.is_cancelled());
        assert!(control.checkpoint().is_ok());
        control.report(1, 1);
    }
}
