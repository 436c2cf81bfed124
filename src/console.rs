use std::io::{self, BufRead, Write};

use crate::clock::*;
use crate::control::*;
use crate::engine::*;
use crate::error::{ClockError, PrefsError};
use crate::input::*;
use crate::prefs::*;
use crate::settings::Settings;
use crate::sound::*;

use log::warn;
use tokio::sync::{mpsc, watch};

/// A line typed into the console.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// A command for the clock.
    Command(Command),
    /// Sets the time control.
    TimeControl(TimeControl),
    /// Lists the presets.
    Presets,
    /// Selects a preset by its index, counting from zero.
    Preset(usize),
    /// Toggles mute.
    Mute,
    /// Sets the volume.
    Volume(f32),
    /// Sets the low time threshold in seconds.
    Threshold(u64),
    /// Renames a player.
    Name(Side, String),
    /// Sets the theme.
    Theme(Theme),
    /// Sets the accent color.
    Accent(String),
    /// Prints the clocks.
    Status,
    /// Prints the help.
    Help,
    /// Quits.
    Quit,
}

/// The console help text.
pub const HELP: &str = "\
<enter>   end the turn of the running clock
1 | 2     tap the clock of player 1 or 2
s         start
p         pause
r         reset
t <tc>    set the time control, e.g. `t 5+3` or `t 2:30+1`
l         list the presets
c <n>     choose preset n
m         toggle mute
v <0-1>   set the volume
w <secs>  set the low time threshold
n <1|2> <name>  rename a player
k <dark|light>  set the theme
a <color> set the accent color, e.g. `a #E74C3C`
?         print the clocks
h         print this help
q         quit";

/// Parses a console line.
pub fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let arg = |name: &str| {
        if rest.is_empty() {
            Err(format!("missing {}", name))
        } else {
            Ok(rest)
        }
    };

    let line = match head {
        "" => Line::Command(Command::Input(Input::Key(Key::Space))),
        "1" | "2" => {
            let side = Side::from_number(head.as_bytes()[0] - b'0').ok_or("no such player")?;
            Line::Command(Command::Input(Input::Pointer(side)))
        }
        "s" => Line::Command(Command::Start),
        "p" => Line::Command(Command::Stop),
        "r" => Line::Command(Command::Reset),
        "t" => {
            let tc = arg("time control")?
                .parse::<TimeControl>()
                .map_err(|e| format!("{}", e))?;
            Line::TimeControl(tc)
        }
        "l" => Line::Presets,
        "c" => {
            let n = arg("preset")?
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=PRESETS.len()).contains(n))
                .ok_or_else(|| format!("preset must be 1 to {}", PRESETS.len()))?;
            Line::Preset(n - 1)
        }
        "m" => Line::Mute,
        "v" => Line::Volume(
            arg("volume")?
                .parse()
                .map_err(|_| "volume must be a number".to_string())?,
        ),
        "w" => Line::Threshold(
            arg("threshold")?
                .parse()
                .map_err(|_| "threshold must be whole seconds".to_string())?,
        ),
        "n" => {
            let (n, name) = arg("player")?
                .split_once(char::is_whitespace)
                .ok_or("missing name")?;
            let side = n
                .parse()
                .ok()
                .and_then(Side::from_number)
                .ok_or("player must be 1 or 2")?;
            Line::Name(side, name.trim().to_owned())
        }
        "k" => match arg("theme")? {
            "dark" => Line::Theme(Theme::Dark),
            "light" => Line::Theme(Theme::Light),
            _ => return Err("theme must be dark or light".into()),
        },
        "a" => Line::Accent(arg("color")?.to_owned()),
        "?" => Line::Status,
        "h" => Line::Help,
        "q" => Line::Quit,
        _ => return Err(format!("unknown command: {}", head)),
    };
    Ok(line)
}

/// Describes an event, naming players by their display names.
pub fn describe(e: &Event, prefs: &Preferences) -> String {
    match e {
        Event::Configured(tc) => format!("Time control set to {}", tc),
        Event::Started => format!("----- GAME STARTED ----- {} to move", prefs.name(Side::First)),
        Event::TurnSwitch(side) => format!(
            "{} ended the turn, {} to move",
            prefs.name(*side),
            prefs.name(side.opposite())
        ),
        Event::Expired(side) => format!("{} has no time left", prefs.name(*side)),
        Event::LowTime(side) => format!("{} is low on time", prefs.name(*side)),
        Event::Stopped(StopReason::Manual) => "Paused".into(),
        Event::Stopped(StopReason::Expired(side)) => format!(
            "----- GAME ENDED ----- {} ran out of time, {} wins",
            prefs.name(*side),
            prefs.name(side.opposite())
        ),
        Event::Reset => "Clocks reset".into(),
        Event::Error(e) => format!("[Error] {}", e),
    }
}

/// Renders both clocks on one line, marking the running one.
pub fn status(state: &GameState, prefs: &Preferences, threshold_ms: u64) -> String {
    let render = |side: Side| {
        let clock = state.clock(side);
        format!(
            "{}{} {}{}",
            if clock.is_running() { "> " } else { "  " },
            prefs.name(side),
            Millis(clock.remaining_ms()),
            if clock.is_low_time(threshold_ms) { " !" } else { "" },
        )
    };
    format!("{}  |  {}", render(Side::First), render(Side::Second))
}

/// A notifier ringing the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bell;

impl SoundNotifier for Bell {
    fn play(&mut self, cue: Cue, volume: f32) {
        if volume <= 0.0 {
            return;
        }
        // Time up rings twice.
        let bell = if cue == Cue::TimeUp { "\x07\x07" } else { "\x07" };
        let mut stdout = io::stdout();
        let res = stdout.write_all(bell.as_bytes()).and_then(|_| stdout.flush());
        drop(res);
    }
}

/// Prints events until the control loop ends.
pub fn log_events(mut event_rx: mpsc::UnboundedReceiver<Event>, prefs_rx: watch::Receiver<Preferences>) {
    while let Some(e) = event_rx.blocking_recv() {
        println!("{}", describe(&e, &prefs_rx.borrow()));
    }
}

/// Lists the presets numbered from one, marking the selected one.
pub fn list_presets(presets: &[TimeControl], selected: TimeFormat) -> String {
    presets
        .iter()
        .enumerate()
        .map(|(i, &tc)| {
            let mark = if selected == TimeFormat::Preset(tc) { "*" } else { " " };
            format!("{}{}. {}", mark, i + 1, tc)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn saved(res: Result<(), PrefsError>) {
    if let Err(e) = res {
        warn!("failed to save preferences: {}", e);
    }
}

/// Remembers a time format and configures the clock with it.
fn select<R: PrefsRepository>(
    cmd_tx: &CommandSender,
    provider: &mut ConfigurationProvider<R>,
    format: TimeFormat,
) -> Result<(), ClockError> {
    let tc = match provider.select(format) {
        Ok(tc) => tc,
        Err(e) => {
            warn!("failed to save preferences: {}", e);
            format.time_control()
        }
    };
    cmd_tx.configure(tc)
}

/// Runs the console, reading lines from stdin until quit or end of input.
pub fn run<R: PrefsRepository>(
    cmd_tx: CommandSender,
    state_rx: watch::Receiver<GameState>,
    prefs_tx: watch::Sender<Preferences>,
    mut provider: ConfigurationProvider<R>,
    mut settings: Settings,
) -> Result<(), PrefsError> {
    println!("Duoclock Console");
    println!("{}", HELP);

    for line in io::stdin().lock().lines() {
        let line = match parse_line(&line?) {
            Ok(line) => line,
            Err(msg) => {
                eprintln!("[Error] {}", msg);
                continue;
            }
        };
        let sent = match line {
            Line::Command(cmd) => cmd_tx.send(cmd),
            Line::TimeControl(tc) => select(&cmd_tx, &mut provider, TimeFormat::classify(tc)),
            Line::Presets => {
                println!("{}", list_presets(provider.presets(), provider.format()));
                Ok(())
            }
            Line::Preset(i) => match provider.presets().get(i) {
                Some(&tc) => select(&cmd_tx, &mut provider, TimeFormat::Preset(tc)),
                None => Ok(()),
            },
            Line::Mute => {
                settings.toggle_mute();
                println!("Muted: {}", settings.muted);
                cmd_tx.settings(settings)
            }
            Line::Volume(v) => {
                settings.set_volume(v);
                println!("Volume: {:.2}", settings.volume());
                cmd_tx.settings(settings)
            }
            Line::Threshold(secs) => {
                settings.set_low_time_threshold(secs * 1000);
                cmd_tx.settings(settings)
            }
            Line::Name(side, name) => {
                saved(provider.set_name(side, name));
                prefs_tx.send_replace(provider.prefs().clone());
                Ok(())
            }
            Line::Theme(theme) => {
                saved(provider.set_theme(theme));
                prefs_tx.send_replace(provider.prefs().clone());
                Ok(())
            }
            Line::Accent(color) => {
                saved(provider.set_accent_color(color));
                prefs_tx.send_replace(provider.prefs().clone());
                Ok(())
            }
            Line::Status => {
                let state = *state_rx.borrow();
                println!(
                    "{}",
                    status(&state, provider.prefs(), settings.low_time_threshold_ms)
                );
                Ok(())
            }
            Line::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Line::Quit => break,
        };
        if sent.is_err() {
            break;
        }
    }
    let res = cmd_tx.shutdown();
    drop(res);
    Ok(())
}
