//! Reporter trait for dependency injection
//!
//! This trait allows core logic to report progress and status without
//! being coupled to a specific console implementation.

pub trait Reporter: Send + Sync {
    /// Updates the progress of the download.
    fn downloading(&self, received: u64, total: Option<u64>);

    /// Indicates that extraction of the named archive has started.
    fn extracting(&self, filename: &str);

    /// Indicates that the named binary is being placed on disk.
    fn installing(&self, binary: &str, version: &str);

    /// Indicates that the named binary is being removed.
    fn removing(&self, binary: &str);

    /// Marks the operation as successfully completed.
    fn done(&self, detail: &str);

    /// Marks the operation as failed with a specific reason.
    fn failed(&self, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn downloading(&self, received: u64, total: Option<u64>) {
        (**self).downloading(received, total)
    }
    fn extracting(&self, filename: &str) {
        (**self).extracting(filename)
    }
    fn installing(&self, binary: &str, version: &str) {
        (**self).installing(binary, version)
    }
    fn removing(&self, binary: &str) {
        (**self).removing(binary)
    }
    fn done(&self, detail: &str) {
        (**self).done(detail)
    }
    fn failed(&self, reason: &str) {
        (**self).failed(reason)
    }
    fn info(&self, msg: &str) {
        (**self).info(msg)
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg)
    }
}

/// A no-op reporter for silent operations (e.g., verification, testing).
#[derive(Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn downloading(&self, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &str) {}
    fn installing(&self, _: &str, _: &str) {}
    fn removing(&self, _: &str) {}
    fn done(&self, _: &str) {}
    fn failed(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
