use clap::Parser;

/// Routes one physical gamepad through a binding profile into a
/// virtual controller.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Run the capture-map-emit pipeline without the configuration UI
    #[arg(long)]
    pub headless: bool,

    /// The profile to load
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
