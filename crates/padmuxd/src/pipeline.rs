use std::time::Duration;

use colored::Colorize;
use crossbeam_channel::{select, tick, Receiver};
use padmux_capture::{QueuedSnapshot, Subscription};
use padmux_engine::{MappingEngine, OutputSink, OutputState};

use crate::{print_debug, print_error};

/// How often rolling pipeline figures are written to the log.
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Dequeue-latency window, reset after every log line.
#[derive(Debug, Default)]
struct PipelineStats {
    processed: u64,
    window: u64,
    sum_us: u128,
    min_us: u128,
    max_us: u128,
}

impl PipelineStats {
    fn record(&mut self, age: Duration) {
        let us = age.as_micros();
        self.processed += 1;
        if self.window == 0 || us < self.min_us {
            self.min_us = us;
        }
        if us > self.max_us {
            self.max_us = us;
        }
        self.sum_us += us;
        self.window += 1;
    }

    /// One log line for the current window, None when it is empty.
    fn drain_line(&mut self, dropped: u64) -> Option<String> {
        if self.window == 0 {
            return None;
        }
        let line = format!(
            "pipeline: {} frames, dequeue latency {}/{}/{} us, {} dropped total",
            self.window,
            self.min_us,
            self.sum_us / u128::from(self.window),
            self.max_us,
            dropped
        );
        self.window = 0;
        self.sum_us = 0;
        self.min_us = 0;
        self.max_us = 0;
        Some(line)
    }
}

/// Consumer half of the capture-to-sink pipeline.
///
/// Applies every snapshot to the engine and forwards the built frame
/// to the sink. A sink failure drops that frame and keeps going; a
/// disconnect neutralizes the sink. Returns the number of frames
/// emitted once the stop channel fires or the capture streams close.
pub(crate) fn run_pipeline<S: OutputSink>(
    snapshots: &Subscription<QueuedSnapshot>,
    connection: &Subscription<bool>,
    stop: &Receiver<()>,
    engine: &mut MappingEngine,
    sink: &mut S,
) -> u64 {
    let mut stats = PipelineStats::default();
    let ticker = tick(STATS_INTERVAL);
    loop {
        select! {
            recv(stop) -> _ => {
                neutralize(engine, sink);
                break;
            }
            recv(connection.receiver()) -> msg => match msg {
                Ok(true) => {
                    print_debug!("device ready, mapping live");
                }
                Ok(false) => {
                    neutralize(engine, sink);
                }
                Err(_) => break,
            },
            recv(snapshots.receiver()) -> msg => match msg {
                Ok(queued) => {
                    stats.record(queued.age());
                    let output = engine.build_output(&queued.snapshot);
                    if let Err(e) = sink.apply(&output) {
                        print_error!("failed to apply output: {e}");
                    }
                }
                Err(_) => break,
            },
            recv(ticker) -> _ => {
                if let Some(line) = stats.drain_line(snapshots.dropped()) {
                    print_debug!("{line}");
                }
            }
        }
    }
    stats.processed
}

/// Forget held physical state and park the virtual pad at rest.
fn neutralize<S: OutputSink>(engine: &mut MappingEngine, sink: &mut S) {
    engine.reset();
    if let Err(e) = sink.apply(&OutputState::default()) {
        print_error!("failed to neutralize sink: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_min_avg_max_over_a_window() {
        let mut stats = PipelineStats::default();
        stats.record(Duration::from_micros(30));
        stats.record(Duration::from_micros(10));
        stats.record(Duration::from_micros(50));
        let line = stats.drain_line(2).expect("window has frames");
        assert!(line.contains("3 frames"), "{line}");
        assert!(line.contains("10/30/50 us"), "{line}");
        assert!(line.contains("2 dropped"), "{line}");
        assert_eq!(stats.processed, 3);
    }

    #[test]
    fn drained_window_starts_fresh() {
        let mut stats = PipelineStats::default();
        stats.record(Duration::from_micros(500));
        stats.drain_line(0);
        assert!(stats.drain_line(0).is_none());

        stats.record(Duration::from_micros(7));
        let line = stats.drain_line(0).expect("new window");
        assert!(line.contains("7/7/7 us"), "{line}");
        assert_eq!(stats.processed, 2);
    }

    #[test]
    fn empty_window_logs_nothing() {
        let mut stats = PipelineStats::default();
        assert!(stats.drain_line(5).is_none());
    }
}
