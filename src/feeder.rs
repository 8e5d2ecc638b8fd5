//! Task feeder: pushes every frame path once, then one sentinel per worker.

use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, info, warn};

use crate::frame::FrameTask;
use crate::shutdown::ShutdownFlag;

/// What the feeder managed to enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedReport {
    /// Frame tasks accepted by the channel
    pub queued: usize,
    /// Frame tasks abandoned after a send timeout
    pub dropped: usize,
    /// Sentinels accepted by the channel
    pub sentinels: usize,
}

/// Enqueue `(index, path)` for every path in order, then `num_workers` sentinels.
///
/// Stops early (remaining paths never queued) once `shutdown` is set. Each
/// send waits at most `timeout`; a timed-out send is logged and abandoned.
/// Under shutdown the first timed-out sentinel ends the sentinel loop, since
/// workers are leaving through the flag anyway.
pub fn run_feeder(
    paths: Vec<PathBuf>,
    tasks: Sender<FrameTask>,
    shutdown: ShutdownFlag,
    num_workers: usize,
    timeout: Duration,
) -> FeedReport {
    let total = paths.len();
    let mut report = FeedReport::default();

    for (index, path) in paths.into_iter().enumerate() {
        if shutdown.is_set() {
            info!("Feeder stopped early at frame {}/{}", index, total);
            break;
        }
        match tasks.send_timeout(FrameTask::Frame { index, path }, timeout) {
            Ok(()) => report.queued += 1,
            Err(e) => {
                warn!("Failed to enqueue frame {}: {}", index, e);
                report.dropped += 1;
            }
        }
    }

    for _ in 0..num_workers {
        match tasks.send_timeout(FrameTask::Sentinel, timeout) {
            Ok(()) => report.sentinels += 1,
            Err(e) => {
                warn!("Failed to enqueue sentinel: {}", e);
                if shutdown.is_set() {
                    break;
                }
            }
        }
    }

    debug!(
        "Feeder done: queued {}, dropped {}, sentinels {}/{}",
        report.queued, report.dropped, report.sentinels, num_workers
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(20);

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{:04}.png", i))).collect()
    }

    /// Test: Normal completion
    /// Validates: dense indices in order, exactly num_workers sentinels at the end
    #[test]
    fn test_feeder_order_and_sentinels() {
        let (tx, rx) = bounded(16);
        let report = run_feeder(paths(3), tx, ShutdownFlag::new(), 4, SHORT);

        assert_eq!(report, FeedReport { queued: 3, dropped: 0, sentinels: 4 });

        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(sent.len(), 7);
        for (i, task) in sent.iter().take(3).enumerate() {
            assert_eq!(task, &FrameTask::Frame { index: i, path: PathBuf::from(format!("{:04}.png", i)) });
        }
        assert!(sent[3..].iter().all(|t| *t == FrameTask::Sentinel));
    }

    /// Test: Backpressure from bounded queue
    /// Validates: feeder blocks on a full queue and completes as consumer drains
    #[test]
    fn test_feeder_backpressure() {
        let (tx, rx) = bounded(2);
        let consumer = thread::spawn(move || rx.iter().take(12).count());

        let report = run_feeder(paths(10), tx, ShutdownFlag::new(), 2, Duration::from_secs(5));

        assert_eq!(report.queued, 10);
        assert_eq!(report.sentinels, 2);
        assert_eq!(consumer.join().unwrap(), 12);
    }

    /// Test: Shutdown before start
    /// Validates: no frame task enqueued once the flag is set
    #[test]
    fn test_feeder_stops_on_shutdown() {
        let (tx, rx) = bounded(16);
        let shutdown = ShutdownFlag::new();
        shutdown.trigger();

        let report = run_feeder(paths(5), tx, shutdown, 2, SHORT);

        assert_eq!(report.queued, 0);
        assert_eq!(report.sentinels, 2);
        assert!(rx.try_iter().all(|t| t == FrameTask::Sentinel));
    }

    /// Test: Send timeout on a full queue
    /// Validates: task abandoned and logged, no panic
    #[test]
    fn test_feeder_timeout_drops() {
        let (tx, rx) = bounded(1);
        let report = run_feeder(paths(2), tx, ShutdownFlag::new(), 1, SHORT);

        assert_eq!(report.queued, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.sentinels, 0);
        assert_eq!(rx.len(), 1);
    }
}
