mod cli;
mod hide;
mod logging;
mod pipeline;
mod sink;

use std::process::ExitCode;
use std::thread;

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::{select, unbounded};

use padmux_capture::{CaptureConfig, CaptureService, NullBackend};
use padmux_engine::MappingEngine;
use padmux_profile::ProfileStore;

use crate::cli::Cli;
use crate::hide::{Cloak, NullCloak};
use crate::sink::TraceSink;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);

    if !cli.headless {
        print_error!(
            "the configuration front end ships separately; run with --headless"
        );
        return ExitCode::FAILURE;
    }

    let store = match ProfileStore::new() {
        Ok(store) => store,
        Err(e) => {
            print_error!("cannot open the profile store: {e}");
            return ExitCode::FAILURE;
        }
    };
    let bindings = store.load(cli.profile.as_deref());
    let mut engine = MappingEngine::new();
    engine.load(&bindings);
    print_info!(
        "profile '{}' loaded, {} bindings",
        cli.profile.as_deref().unwrap_or("mapping"),
        bindings.len()
    );

    let mut service =
        match CaptureService::start(CaptureConfig::default(), || {
            Ok(NullBackend::new())
        }) {
            Ok(service) => service,
            Err(e) => {
                print_error!("capture failed to start: {e}");
                return ExitCode::FAILURE;
            }
        };

    let snapshots = service.subscribe_snapshots(8);
    let connection = service.subscribe_connection(8);
    let devices = service.subscribe_device(8);

    // Handle Ctrl+C to exit cleanly
    let (stop_main_tx, stop_main_rx) = unbounded::<()>();
    let (stop_pipe_tx, stop_pipe_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_main_tx.send(());
        let _ = stop_pipe_tx.send(());
    })
    .expect("failed to set Ctrl+C handler");

    let consumer = thread::Builder::new()
        .name("padmux-pipeline".into())
        .spawn(move || {
            let mut sink = TraceSink::new();
            pipeline::run_pipeline(
                &snapshots,
                &connection,
                &stop_pipe_rx,
                &mut engine,
                &mut sink,
            )
        })
        .expect("failed to spawn pipeline thread");

    let mut cloak = Cloak::new(NullCloak);
    match cloak.enable() {
        Ok(true) => {
            print_info!("device hiding enabled");
        }
        Ok(false) => {
            print_debug!("no hiding driver installed, devices stay visible");
        }
        Err(e) => {
            print_error!("device hiding unavailable: {e}");
        }
    }

    print_info!("padmuxd started. Listening for controller events.");
    loop {
        select! {
            recv(stop_main_rx) -> _ => break,
            recv(devices.receiver()) -> msg => match msg {
                Ok(Some(descriptor)) => {
                    print_info!(
                        "using {} [{:04X}:{:04X}]",
                        descriptor.name,
                        descriptor.vendor_id,
                        descriptor.product_id
                    );
                    if let Some(path) = &descriptor.path {
                        if let Err(e) = cloak.hide_device(path) {
                            print_warning!("could not hide {path}: {e}");
                        }
                    }
                }
                Ok(None) => {
                    print_debug!("no device selected");
                }
                Err(_) => break,
            },
        }
    }

    if let Err(e) = cloak.disable() {
        print_warning!("could not unhide devices: {e}");
    }
    service.stop();
    match consumer.join() {
        Ok(frames) => {
            print_info!("stopped after {frames} output frames");
        }
        Err(_) => {
            print_error!("pipeline thread panicked");
        }
    }
    ExitCode::SUCCESS
}
