use std::{
    error::Error,
    io::{self, IsTerminal},
    path::PathBuf,
    thread,
};

use duoclock::{
    clock::{TimeControl, TimeFormat},
    console,
    control::{self, Handle},
    error::PrefsError,
    prefs::{ConfigurationProvider, JsonFileRepository},
    settings::Settings,
    sound::LogNotifier,
};

use clap::Parser;
use log::info;
use tokio::{runtime::Builder as RtBuilder, sync::watch};

/// A two-player clock for the console.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Time control as MINUTES[:SECONDS]+INCREMENT, e.g. 5+3 or 2:30+1.
    /// Defaults to the last one selected.
    time_control: Option<TimeControl>,
    /// Preferences file [default: <config dir>/duoclock/prefs.json]
    #[arg(long, value_name = "PATH")]
    prefs: Option<PathBuf>,
}

/// Returns the preferences file, preferring an explicit path.
fn prefs_path(
    explicit: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, PrefsError> {
    match explicit {
        Some(path) => Ok(path),
        None => config_dir
            .map(|dir| dir.join("duoclock").join("prefs.json"))
            .ok_or(PrefsError::NoConfigDir),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let path = prefs_path(args.prefs, dirs::config_dir())?;
    info!("preferences at {}", path.display());
    let mut provider = ConfigurationProvider::load(JsonFileRepository::new(path))?;
    let tc = match args.time_control {
        Some(tc) => provider.select(TimeFormat::classify(tc))?,
        None => provider.format().time_control(),
    };
    let (prefs_tx, prefs_rx) = watch::channel(provider.prefs().clone());
    let settings = Settings::default();

    let builder = control::Builder::with_time_control(tc).settings(settings);
    // The bell would garble redirected output.
    let builder = if io::stdout().is_terminal() {
        builder.notifier(console::Bell)
    } else {
        builder.notifier(LogNotifier)
    };
    let Handle {
        event_rx,
        cmd_tx,
        state_rx,
        ctrl,
    } = builder.build();

    let rt = RtBuilder::new_current_thread().enable_all().build()?;
    let ctrl_thread = thread::spawn(move || rt.block_on(ctrl.start()));
    let log_thread = thread::spawn(move || console::log_events(event_rx, prefs_rx));

    console::run(cmd_tx, state_rx, prefs_tx, provider, settings)?;

    let res = ctrl_thread.join().and_then(|_| log_thread.join());
    if res.is_err() {
        return Err("clock thread panicked".into());
    }
    Ok(())
}
