use std::time::{Duration, Instant};

/// Logs the time spent in `l_step` since the previous checkpoint and returns the new checkpoint.
pub(crate) fn trace(l_type: &str, l_step: &str, detect: Instant, prev_elapsed: Duration) -> Duration {
    let elapsed = detect.elapsed();
    log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, elapsed, l_step, elapsed.saturating_sub(prev_elapsed));
    elapsed
}
