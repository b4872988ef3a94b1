use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use smallvec::SmallVec;

use padmux_shape::{
    normalize_signed, normalize_unsigned, shape_signed, shape_unsigned,
    CHANGE_EPSILON, RESPONSE_GAMMA, STICK_DEADZONE, TRIGGER_DEADZONE,
};

use crate::backend::{DeviceHandle, HostBackend, PadAxis, PadButton};
use crate::events::Broadcast;
use crate::rank;
use crate::types::{
    CaptureConfig, DeviceDescriptor, QueuedSnapshot, Signal, Snapshot,
};

/// Target poll period, ~60 Hz.
pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Minimum spacing between snapshot flushes, capping the batch rate at
/// ~250 Hz. Changes staged while a flush is skipped keep accumulating.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(4);

/// State shared between the service front end and the poll thread.
pub(crate) struct Shared {
    pub(crate) snapshots: Broadcast<QueuedSnapshot>,
    pub(crate) connection: Broadcast<bool>,
    pub(crate) device: Broadcast<Option<DeviceDescriptor>>,
    pub(crate) stop: AtomicBool,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            snapshots: Broadcast::new(),
            connection: Broadcast::new(),
            device: Broadcast::new(),
            stop: AtomicBool::new(false),
        }
    }
}

struct ActiveDevice<D> {
    handle: D,
    is_gamepad: bool,
}

/// Fixed-rate poll loop. Runs on a dedicated thread until the stop
/// flag is observed, then tears down the backend and closes all event
/// streams.
pub(crate) fn run_poll_loop<B: HostBackend>(
    mut backend: B,
    config: &CaptureConfig,
    shared: &Shared,
) {
    let mut active: Option<ActiveDevice<B::Device>> = None;
    let mut last: [Option<f64>; Signal::COUNT] = [None; Signal::COUNT];
    let mut frame = Snapshot::default();
    let mut last_flush: Option<Instant> = None;

    select_device(&mut backend, &mut active, shared);

    while !shared.stop.load(Ordering::Relaxed) {
        if backend.pump_events() {
            select_device(&mut backend, &mut active, shared);
        }
        backend.refresh();

        if let Some(device) = active.as_ref() {
            for (signal, value) in
                read_signals(&device.handle, device.is_gamepad, config)
            {
                if config.buttons_edge_only && signal.is_button() {
                    stage_edge(signal, value, &mut last, &mut frame);
                } else {
                    stage_changed(signal, value, &mut last, &mut frame);
                }
            }
            flush(&mut frame, &mut last_flush, shared);
        }

        thread::sleep(POLL_INTERVAL);
    }

    // Handles must be released before the backend that produced them.
    drop(active);
    drop(backend);

    shared.connection.send(&false);
    shared.snapshots.close();
    shared.connection.close();
    shared.device.close();
}

/// Pick the best enumerated device, gamepads first, raw joysticks as
/// fallback. Any selection change publishes identity before
/// connectivity: old identity cleared, new identity after open, then
/// the connection flag.
fn select_device<B: HostBackend>(
    backend: &mut B,
    active: &mut Option<ActiveDevice<B::Device>>,
    shared: &Shared,
) {
    // Close the previous handle and clear the published identity
    // before opening candidates.
    *active = None;
    shared.device.send(&None);

    let mut best: Option<(u8, B::Device)> = None;
    for id in backend.gamepad_ids() {
        let handle = match backend.open_gamepad(id) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("skipping gamepad {id}: {e}");
                continue;
            }
        };
        if rank::is_likely_virtual(
            &handle.name(),
            handle.path().as_deref(),
            handle.vendor_id(),
            handle.product_id(),
        ) {
            continue;
        }
        let score = rank::rank_gamepad(
            &handle.name(),
            handle.kind(),
            handle.vendor_id(),
            handle.product_id(),
        );
        // Strict comparison: ties keep the first candidate seen.
        if best.as_ref().map_or(true, |(b, _)| score < *b) {
            best = Some((score, handle));
        }
    }

    let is_gamepad = best.is_some();
    if best.is_none() {
        for id in backend.joystick_ids() {
            let handle = match backend.open_joystick(id) {
                Ok(handle) => handle,
                Err(e) => {
                    warn!("skipping joystick {id}: {e}");
                    continue;
                }
            };
            if rank::is_likely_virtual(
                &handle.name(),
                handle.path().as_deref(),
                handle.vendor_id(),
                handle.product_id(),
            ) {
                continue;
            }
            let score = rank::rank_joystick(
                &handle.name(),
                handle.vendor_id(),
                handle.product_id(),
            );
            if best.as_ref().map_or(true, |(b, _)| score < *b) {
                best = Some((score, handle));
            }
        }
    }

    match best {
        Some((_, handle)) => {
            let descriptor = DeviceDescriptor {
                name: handle.name(),
                path: handle.path(),
                vendor_id: handle.vendor_id(),
                product_id: handle.product_id(),
                is_gamepad,
                likely_virtual: false,
            };
            info!(
                "selected {} ({:04X}:{:04X}, {})",
                descriptor.name,
                descriptor.vendor_id,
                descriptor.product_id,
                if is_gamepad { "gamepad" } else { "joystick" }
            );
            *active = Some(ActiveDevice { handle, is_gamepad });
            shared.device.send(&Some(descriptor));
            shared.connection.send(&true);
        }
        None => {
            info!("no physical device available");
            shared.connection.send(&false);
        }
    }
}

type SignalReads = SmallVec<[(Signal, f64); Signal::COUNT]>;

const GAMEPAD_BUTTONS: [(Signal, PadButton); 14] = [
    (Signal::A, PadButton::South),
    (Signal::B, PadButton::East),
    (Signal::X, PadButton::West),
    (Signal::Y, PadButton::North),
    (Signal::LeftBumper, PadButton::LeftShoulder),
    (Signal::RightBumper, PadButton::RightShoulder),
    (Signal::View, PadButton::Back),
    (Signal::Menu, PadButton::Start),
    (Signal::LeftThumb, PadButton::LeftStick),
    (Signal::RightThumb, PadButton::RightStick),
    (Signal::DPadUp, PadButton::DPadUp),
    (Signal::DPadDown, PadButton::DPadDown),
    (Signal::DPadLeft, PadButton::DPadLeft),
    (Signal::DPadRight, PadButton::DPadRight),
];

/// Sample and shape every logical signal from the active device.
fn read_signals<D: DeviceHandle>(
    handle: &D,
    is_gamepad: bool,
    config: &CaptureConfig,
) -> SignalReads {
    let mut reads = SignalReads::new();
    if is_gamepad {
        read_gamepad(handle, config, &mut reads);
    } else {
        read_joystick(handle, config, &mut reads);
    }
    reads
}

fn read_gamepad<D: DeviceHandle>(
    handle: &D,
    config: &CaptureConfig,
    reads: &mut SignalReads,
) {
    let (lx, ly) = tune_stick(
        shape_axis(handle.axis(PadAxis::LeftX)),
        shape_axis(handle.axis(PadAxis::LeftY)),
        config.invert_left_y,
        config.sensitivity_left,
    );
    let (rx, ry) = tune_stick(
        shape_axis(handle.axis(PadAxis::RightX)),
        shape_axis(handle.axis(PadAxis::RightY)),
        config.invert_right_y,
        config.sensitivity_right,
    );
    reads.push((Signal::LeftX, lx));
    reads.push((Signal::LeftY, ly));
    reads.push((Signal::RightX, rx));
    reads.push((Signal::RightY, ry));
    reads.push((
        Signal::LeftTrigger,
        shape_trigger(handle.axis(PadAxis::LeftTrigger)),
    ));
    reads.push((
        Signal::RightTrigger,
        shape_trigger(handle.axis(PadAxis::RightTrigger)),
    ));

    for (signal, button) in GAMEPAD_BUTTONS {
        reads.push((signal, digital(handle.button(button))));
    }
}

/// Raw fallback for devices without a gamepad mapping: the first four
/// axes are taken as the two sticks and the first fourteen buttons
/// follow the standard layout. Triggers are not readable on this path
/// and report 0.
fn read_joystick<D: DeviceHandle>(
    handle: &D,
    config: &CaptureConfig,
    reads: &mut SignalReads,
) {
    const JOYSTICK_BUTTONS: [Signal; 14] = [
        Signal::A,
        Signal::B,
        Signal::X,
        Signal::Y,
        Signal::LeftBumper,
        Signal::RightBumper,
        Signal::View,
        Signal::Menu,
        Signal::LeftThumb,
        Signal::RightThumb,
        Signal::DPadUp,
        Signal::DPadDown,
        Signal::DPadLeft,
        Signal::DPadRight,
    ];

    let (lx, ly) = tune_stick(
        shape_axis(handle.joystick_axis(0)),
        shape_axis(handle.joystick_axis(1)),
        config.invert_left_y,
        config.sensitivity_left,
    );
    let (rx, ry) = tune_stick(
        shape_axis(handle.joystick_axis(2)),
        shape_axis(handle.joystick_axis(3)),
        config.invert_right_y,
        config.sensitivity_right,
    );
    reads.push((Signal::LeftX, lx));
    reads.push((Signal::LeftY, ly));
    reads.push((Signal::RightX, rx));
    reads.push((Signal::RightY, ry));
    reads.push((Signal::LeftTrigger, 0.0));
    reads.push((Signal::RightTrigger, 0.0));

    for (index, signal) in JOYSTICK_BUTTONS.iter().enumerate() {
        reads.push((*signal, digital(handle.joystick_button(index as u32))));
    }
}

#[inline]
fn shape_axis(raw: i16) -> f64 {
    shape_signed(normalize_signed(raw), STICK_DEADZONE, RESPONSE_GAMMA)
}

#[inline]
fn shape_trigger(raw: i16) -> f64 {
    shape_unsigned(normalize_unsigned(raw), TRIGGER_DEADZONE, RESPONSE_GAMMA)
}

#[inline]
fn digital(pressed: bool) -> f64 {
    if pressed {
        1.0
    } else {
        0.0
    }
}

/// Apply invert and sensitivity to one stick pair.
fn tune_stick(
    x: f64,
    y: f64,
    invert_y: bool,
    sensitivity: f64,
) -> (f64, f64) {
    let y = if invert_y { -y } else { y };
    (
        (x * sensitivity).clamp(-1.0, 1.0),
        (y * sensitivity).clamp(-1.0, 1.0),
    )
}

/// Stage `value` into the pending frame when it moved at least the
/// change epsilon since the last staged value. The first sample of a
/// signal always stages, which makes the initial frame a full state.
fn stage_changed(
    signal: Signal,
    value: f64,
    last: &mut [Option<f64>; Signal::COUNT],
    frame: &mut Snapshot,
) {
    if let Some(prev) = last[signal.index()] {
        if (prev - value).abs() < CHANGE_EPSILON {
            return;
        }
    }
    last[signal.index()] = Some(value);
    frame.insert(signal, value);
}

/// Stage a button only when its digital state flips.
fn stage_edge(
    signal: Signal,
    value: f64,
    last: &mut [Option<f64>; Signal::COUNT],
    frame: &mut Snapshot,
) {
    let pressed = value >= 0.5;
    let prev = last[signal.index()].unwrap_or(0.0);
    if (prev < 0.5 && pressed) || (prev > 0.5 && !pressed) {
        last[signal.index()] = Some(value);
        frame.insert(signal, value);
    }
}

/// Emit the pending frame as one snapshot if it is non-empty and the
/// batch rate cap allows it.
fn flush(
    frame: &mut Snapshot,
    last_flush: &mut Option<Instant>,
    shared: &Shared,
) {
    if frame.is_empty() {
        return;
    }
    if let Some(prev) = *last_flush {
        if prev.elapsed() < MIN_FLUSH_INTERVAL {
            return;
        }
    }
    *last_flush = Some(Instant::now());
    let snapshot = std::mem::take(frame);
    shared.snapshots.send(&QueuedSnapshot::new(snapshot));
}
