/// Observer of a single scene load. An implementation is passed into each
/// load call and only lives as long as that call.
pub trait LoadProgress: Send + Sync {
    /// Called once before anything is read.
    fn on_start(&self, _file: &str) {}

    /// Called after each loaded item: the scene document first, then every
    /// binary buffer.
    fn on_progress(&self, _file: &str, _items_loaded: usize, _items_total: usize) {}

    fn on_complete(&self, _file: &str) {}

    fn on_error(&self, _file: &str, _error: &dyn std::error::Error) {}
}

/// Reports loading through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl LoadProgress for LogProgress {
    fn on_start(&self, file: &str) {
        log::info!("Loading {}", file);
    }

    fn on_progress(&self, file: &str, items_loaded: usize, items_total: usize) {
        let ratio = if items_total == 0 { 1.0 } else { items_loaded as f64 / items_total as f64 };
        log::debug!("{}: loaded {:.1}%", file, ratio * 100.0);
    }

    fn on_complete(&self, file: &str) {
        log::info!("Loaded {}", file);
    }

    fn on_error(&self, file: &str, error: &dyn std::error::Error) {
        log::error!("Failed to load {}: {}", file, error);
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl LoadProgress for NoProgress {}
