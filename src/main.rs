// Copyright (c) 2026 rezky_nightky

mod bolt;
mod cell;
mod cloud;
mod config;
mod event;
mod frame;
mod geometry;
mod glyphs;
mod palette;
mod render;
mod runtime;
mod storm;
mod terminal;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::sync::Mutex;
use std::time::Instant;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{
    color_enabled_stdout, color_mode_from_flag, color_mode_label, Args, Settings, TermEnv,
    DEFAULT_PARAMS_USAGE,
};
use crate::event::{classify_key, Control, StormEvent};
use crate::frame::Frame;
use crate::glyphs::Glyphs;
use crate::palette::Palette;
use crate::render::Renderer;
use crate::storm::Storm;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const LOG_ENV: &str = "STORMCELL_LOG";

fn build_info() -> &'static str {
    env!("STORMCELL_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

/// Routes tracing output to `path`. Without a path nothing is installed, so the
/// terminal being drawn on never receives log lines.
fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("failed to install logger: {}", e);
    }
    Ok(())
}

fn print_bitcolor(args: &Args, env: &TermEnv) {
    let unset = |v: &str| -> String {
        if v.is_empty() {
            "(unset)".to_string()
        } else {
            v.to_string()
        }
    };
    let auto = env.detect_color_mode();
    println!("BITCOLOR CHECK:");
    println!("  COLORTERM: {}", unset(&env.colorterm));
    println!("  TERM: {}", unset(&env.term));
    println!("  auto_detected: {}", color_mode_label(auto));
    let effective = match args.colormode.map(color_mode_from_flag) {
        Some(Ok(forced)) => {
            println!("  forced: {}", color_mode_label(forced));
            forced
        }
        Some(Err(e)) => {
            println!("  forced: {}", e);
            auto
        }
        None => auto,
    };
    println!("  effective: {}", color_mode_label(effective));
}

fn main() -> io::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        restore_terminal_best_effort();
        error!(%panic_info, "panic");
        eprintln!("{}", panic_info);
    }));

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(DEFAULT_PARAMS_USAGE);
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let env = TermEnv::from_process();

    if args.check_bitcolor {
        print_bitcolor(&args, &env);
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let settings = match Settings::from_args(&args, &env) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(settings.log_file.as_deref()) {
        eprintln!("failed to open --log-file: {}", e);
        std::process::exit(1);
    }
    info!(
        seed = settings.seed,
        tick_ms = settings.tick.as_millis() as u64,
        color = color_mode_label(settings.color_mode),
        glyphs = ?settings.glyph_mode,
        "starting"
    );

    run(&settings)
}

fn run(settings: &Settings) -> io::Result<()> {
    let (tx, rx) = event::channel();
    event::install_shutdown_handler(tx.clone());

    let mut term = Terminal::new()?;
    event::spawn_input_thread(tx)?;

    let (w, h) = term.size()?;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let palette = Palette::new(
        settings.color_mode,
        settings.grayscale,
        settings.default_background,
    );
    let bg = palette.bg;
    let renderer = Renderer::new(palette, Glyphs::new(settings.glyph_mode));
    let mut storm = Storm::new(&mut rng, w, h, settings.max_clouds, settings.max_bolts);
    let mut frame = Frame::new(w, h, bg);

    let start = Instant::now();
    let end_time = settings.duration.map(|d| start + d);
    let mut next_tick = start;
    let mut state = LoopState::default();
    let mut ticks: u64 = 0;

    'run: loop {
        // Wait for the next tick, waking early for input.
        loop {
            let now = Instant::now();
            if end_time.is_some_and(|end| now >= end) {
                info!("duration elapsed");
                break 'run;
            }
            if now >= next_tick {
                break;
            }
            let mut timeout = next_tick - now;
            if let Some(end) = end_time {
                timeout = timeout.min(end - now);
            }
            match rx.recv_timeout(timeout) {
                Ok(ev) => {
                    if apply(ev, settings, &mut rng, &mut storm, &mut frame, &mut state)
                        == Control::Quit
                    {
                        break 'run;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("event queue closed");
                    std::thread::sleep(timeout);
                }
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => {
                    if apply(ev, settings, &mut rng, &mut storm, &mut frame, &mut state)
                        == Control::Quit
                    {
                        break 'run;
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        if !state.paused {
            storm.tick(&mut rng, settings.tick);
            ticks += 1;
        }
        if !state.paused || state.stale {
            renderer.draw(&mut rng, &storm, &mut frame);
            term.draw(&frame)?;
            state.stale = false;
        }

        next_tick += settings.tick;
        let now = Instant::now();
        if now > next_tick {
            next_tick = now;
        }
    }

    drop(term);
    info!(
        ticks,
        elapsed_s = start.elapsed().as_secs_f64(),
        "stopped"
    );
    Ok(())
}

/// Loop flags that events can change between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LoopState {
    paused: bool,
    /// The storm or grid changed while paused and must be presented once.
    stale: bool,
}

fn apply(
    ev: StormEvent,
    settings: &Settings,
    rng: &mut StdRng,
    storm: &mut Storm,
    frame: &mut Frame,
    state: &mut LoopState,
) -> Control {
    match ev {
        StormEvent::Shutdown => Control::Quit,
        StormEvent::Resize(w, h) => {
            storm.resize(w, h);
            *frame = Frame::new(w, h, frame.bg());
            state.stale = true;
            Control::Continue
        }
        StormEvent::Key(key) => {
            let control = classify_key(&key, settings.screensaver);
            match control {
                Control::Reset => {
                    info!("storm reset");
                    storm.reset(rng);
                    state.stale = true;
                }
                Control::TogglePause => {
                    state.paused = !state.paused;
                    info!(paused = state.paused, "pause toggled");
                }
                Control::Quit | Control::Continue => {}
            }
            control
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    struct Harness {
        settings: Settings,
        rng: StdRng,
        storm: Storm,
        frame: Frame,
        state: LoopState,
    }

    impl Harness {
        fn new(screensaver: bool) -> Self {
            let mut argv = vec!["stormcell", "--seed", "11"];
            if screensaver {
                argv.push("-s");
            }
            let args = Args::try_parse_from(argv).expect("valid args");
            let settings = Settings::from_args(&args, &TermEnv::default()).expect("valid settings");
            let mut rng = StdRng::seed_from_u64(settings.seed);
            let storm = Storm::new(&mut rng, 100, 30, 3, 2);
            Self {
                settings,
                rng,
                storm,
                frame: Frame::new(100, 30, None),
                state: LoopState::default(),
            }
        }

        fn apply(&mut self, ev: StormEvent) -> Control {
            apply(
                ev,
                &self.settings,
                &mut self.rng,
                &mut self.storm,
                &mut self.frame,
                &mut self.state,
            )
        }

        fn press(&mut self, c: char) -> Control {
            self.apply(StormEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
        }

        /// Ticks until a bolt is on screen.
        fn run_until_bolt(&mut self) {
            for _ in 0..400 {
                self.storm.tick(&mut self.rng, TICK);
                if !self.storm.bolts().is_empty() {
                    return;
                }
            }
            panic!("no bolt struck");
        }
    }

    #[test]
    fn resize_rebuilds_frame_and_culls_before_next_render() {
        let mut h = Harness::new(false);
        h.run_until_bolt();

        assert_eq!(h.apply(StormEvent::Resize(40, 20)), Control::Continue);
        assert_eq!((h.frame.width, h.frame.height), (40, 20));
        assert_eq!((h.storm.width, h.storm.height), (40, 20));
        assert!(h.storm.bolts().is_empty());
        assert!(h.storm.clouds().iter().all(|c| c.fits(40, 20)));
        assert!(h.state.stale);
    }

    #[test]
    fn shutdown_quits() {
        let mut h = Harness::new(false);
        assert_eq!(h.apply(StormEvent::Shutdown), Control::Quit);
        assert_eq!(h.press('q'), Control::Quit);
    }

    #[test]
    fn p_toggles_pause() {
        let mut h = Harness::new(false);
        assert_eq!(h.press('p'), Control::TogglePause);
        assert!(h.state.paused);
        assert!(!h.state.stale);
        h.press('p');
        assert!(!h.state.paused);
    }

    #[test]
    fn space_empties_the_storm() {
        let mut h = Harness::new(false);
        h.run_until_bolt();
        assert!(!h.storm.clouds().is_empty());

        assert_eq!(h.press(' '), Control::Reset);
        assert!(h.storm.clouds().is_empty());
        assert!(h.storm.bolts().is_empty());
        assert!(h.state.stale);
    }

    #[test]
    fn screensaver_quits_on_any_key() {
        let mut h = Harness::new(true);
        assert_eq!(h.press('p'), Control::Quit);
        assert!(!h.state.paused);
    }
}
