use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use log::warn;

use crate::backend::HostBackend;
use crate::events::Subscription;
use crate::runtime::{run_poll_loop, Shared};
use crate::types::{
    CaptureConfig, DeviceDescriptor, PhysicalInput, QueuedSnapshot, Signal,
    Snapshot,
};
use crate::{CaptureError, Result};

/// How long `stop` waits for the poll thread before detaching it. A
/// loop wedged inside a native hardware read cannot be interrupted.
const SHUTDOWN_WAIT: Duration = Duration::from_millis(250);

const BUTTON_ON: f64 = 0.5;
const TRIGGER_ON: f64 = 0.5;
const AXIS_ON: f64 = 0.6;

/// Capture front end. Owns the poll thread and hands out event
/// subscriptions to any number of consumers.
pub struct CaptureService {
    shared: Arc<Shared>,
    runtime: Option<RuntimeHandle>,
}

struct RuntimeHandle {
    thread: thread::JoinHandle<()>,
    done_rx: Receiver<()>,
}

impl CaptureService {
    /// Start the poll loop. `init` constructs the hardware backend on
    /// the new thread, since backends typically must live entirely on
    /// the thread that drives them. A backend that fails to initialize
    /// aborts the start.
    pub fn start<B, F>(config: CaptureConfig, init: F) -> Result<Self>
    where
        B: HostBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let loop_shared = shared.clone();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = bounded(1);

        let thread = thread::Builder::new()
            .name("padmux-capture".into())
            .spawn(move || {
                let backend = match init() {
                    Ok(backend) => backend,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                run_poll_loop(backend, &config, &loop_shared);
                let _ = done_tx.send(());
            })
            .map_err(|e| CaptureError::BackendInit(e.to_string()))?;

        match ready_rx.recv_timeout(Duration::from_secs(1)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                return Err(CaptureError::BackendInit(
                    "runtime thread did not report ready".into(),
                ));
            }
        }

        Ok(Self {
            shared,
            runtime: Some(RuntimeHandle { thread, done_rx }),
        })
    }

    /// Subscribe to change-batched snapshots. The subscription buffers
    /// up to `capacity` items, dropping the oldest under overload.
    pub fn subscribe_snapshots(
        &self,
        capacity: usize,
    ) -> Subscription<QueuedSnapshot> {
        self.shared.snapshots.subscribe(capacity)
    }

    /// Subscribe to connectivity transitions.
    pub fn subscribe_connection(&self, capacity: usize) -> Subscription<bool> {
        self.shared.connection.subscribe(capacity)
    }

    /// Subscribe to selected-device identity changes. `None` means no
    /// device is currently selected.
    pub fn subscribe_device(
        &self,
        capacity: usize,
    ) -> Subscription<Option<DeviceDescriptor>> {
        self.shared.device.subscribe(capacity)
    }

    /// Wait for the next clearly activated physical input: a button
    /// press first, then a trigger pull, then a stick pushed past the
    /// detection threshold. Resolves to None on timeout or when the
    /// service stops. The listener is released on return.
    pub fn capture_next(&self, timeout: Duration) -> Option<PhysicalInput> {
        let sub = self.subscribe_snapshots(8);
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let queued = sub.recv_timeout(deadline - now)?;
            if let Some(input) = detect_input(&queued.snapshot) {
                return Some(input);
            }
        }
    }

    /// Signal the poll loop to exit and wait for it briefly. Safe to
    /// call more than once.
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        if runtime.done_rx.recv_timeout(SHUTDOWN_WAIT).is_ok() {
            let _ = runtime.thread.join();
        } else {
            warn!("capture loop did not stop in time, detaching");
        }
    }
}

impl Drop for CaptureService {
    fn drop(&mut self) {
        self.stop();
    }
}

const BUTTON_SCAN: [(Signal, PhysicalInput); 14] = [
    (Signal::A, PhysicalInput::ButtonSouth),
    (Signal::B, PhysicalInput::ButtonEast),
    (Signal::X, PhysicalInput::ButtonWest),
    (Signal::Y, PhysicalInput::ButtonNorth),
    (Signal::LeftBumper, PhysicalInput::LeftBumper),
    (Signal::RightBumper, PhysicalInput::RightBumper),
    (Signal::View, PhysicalInput::Back),
    (Signal::Menu, PhysicalInput::Start),
    (Signal::LeftThumb, PhysicalInput::LeftStickClick),
    (Signal::RightThumb, PhysicalInput::RightStickClick),
    (Signal::DPadUp, PhysicalInput::DPadUp),
    (Signal::DPadDown, PhysicalInput::DPadDown),
    (Signal::DPadLeft, PhysicalInput::DPadLeft),
    (Signal::DPadRight, PhysicalInput::DPadRight),
];

const TRIGGER_SCAN: [(Signal, PhysicalInput); 2] = [
    (Signal::LeftTrigger, PhysicalInput::LeftTrigger),
    (Signal::RightTrigger, PhysicalInput::RightTrigger),
];

const AXIS_SCAN: [(Signal, PhysicalInput, PhysicalInput); 4] = [
    (
        Signal::LeftX,
        PhysicalInput::LeftStickXPos,
        PhysicalInput::LeftStickXNeg,
    ),
    (
        Signal::LeftY,
        PhysicalInput::LeftStickYPos,
        PhysicalInput::LeftStickYNeg,
    ),
    (
        Signal::RightX,
        PhysicalInput::RightStickXPos,
        PhysicalInput::RightStickXNeg,
    ),
    (
        Signal::RightY,
        PhysicalInput::RightStickYPos,
        PhysicalInput::RightStickYNeg,
    ),
];

/// Find the first activated input in a snapshot, buttons before
/// triggers before stick axes.
fn detect_input(snapshot: &Snapshot) -> Option<PhysicalInput> {
    for (signal, input) in BUTTON_SCAN {
        if snapshot.get(&signal).is_some_and(|v| *v >= BUTTON_ON) {
            return Some(input);
        }
    }
    for (signal, input) in TRIGGER_SCAN {
        if snapshot.get(&signal).is_some_and(|v| *v >= TRIGGER_ON) {
            return Some(input);
        }
    }
    for (signal, positive, negative) in AXIS_SCAN {
        if let Some(v) = snapshot.get(&signal) {
            if *v >= AXIS_ON {
                return Some(positive);
            }
            if *v <= -AXIS_ON {
                return Some(negative);
            }
        }
    }
    None
}
