//! Progress reporting for cleanup runs.
//!
//! This module provides a simple progress callback mechanism that the
//! pipeline uses to report stage transitions to callers.
//!
//! # Example
//!
//! ```ignore
//! use swarf::clean::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! // Pass to the pipeline
//! let report = cleanup_with_progress(&mut mesh, &options, &progress)?;
//! ```

/// A progress callback that receives updates during a cleanup run.
///
/// The callback receives:
/// - `current`: Current stage (0-based)
/// - `total`: Total number of stages
/// - `message`: Description of the stage about to run
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
