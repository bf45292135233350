// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;

use crate::glyphs::glyph_mode_from_str;
use crate::runtime::{ColorMode, GlyphMode};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  stormcell --tick-ms 100 --max-clouds 3 --max-bolts 2 --charset auto --color-bg black";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "stormcell",
    version,
    disable_version_flag = true,
    about = "Drifting storm clouds and fractal lightning for the terminal"
)]
pub struct Args {
    #[arg(
        short = 't',
        long = "tick-ms",
        default_value_t = 100,
        help_heading = "TIMING",
        help = "Milliseconds per simulation tick (min 10 max 1000)"
    )]
    pub tick_ms: u64,

    #[arg(
        long = "duration",
        help_heading = "TIMING",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "TIMING",
        help = "Random seed (default: derived from the clock)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "max-clouds",
        default_value_t = 3,
        help_heading = "STORM",
        help = "Max clouds on screen at once (min 1 max 8)"
    )]
    pub max_clouds: usize,

    #[arg(
        long = "max-bolts",
        default_value_t = 2,
        help_heading = "STORM",
        help = "Max bolts on screen at once (min 1 max 8)"
    )]
    pub max_bolts: usize,

    #[arg(
        short = 'g',
        long = "grayscale",
        help_heading = "APPEARANCE",
        help = "Use grayscale instead of colors"
    )]
    pub grayscale: bool,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Glyph set: auto, unicode, ascii"
    )]
    pub charset: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Write diagnostics to PATH (filter with STORMCELL_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub tick: Duration,
    pub duration: Option<Duration>,
    pub seed: u64,
    pub max_clouds: usize,
    pub max_bolts: usize,
    pub grayscale: bool,
    pub glyph_mode: GlyphMode,
    pub color_mode: ColorMode,
    pub default_background: bool,
    pub screensaver: bool,
    pub log_file: Option<PathBuf>,
}

/// What the environment says about the terminal.
#[derive(Clone, Debug, Default)]
pub struct TermEnv {
    pub lang: String,
    pub colorterm: String,
    pub term: String,
}

impl TermEnv {
    pub fn from_process() -> Self {
        let var = |k: &str| std::env::var(k).unwrap_or_default();
        Self {
            lang: var("LANG"),
            colorterm: var("COLORTERM"),
            term: var("TERM"),
        }
    }

    pub fn default_to_ascii(&self) -> bool {
        !self.lang.to_ascii_uppercase().contains("UTF")
    }

    pub fn detect_color_mode(&self) -> ColorMode {
        let colorterm = self.colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorMode::TrueColor;
        }
        let term = self.term.to_ascii_lowercase();
        if term == "dumb" {
            return ColorMode::Mono;
        }
        ColorMode::Color256
    }
}

fn require_range<T: PartialOrd + std::fmt::Display>(
    name: &str,
    v: T,
    min: T,
    max: T,
) -> Result<T, String> {
    if v < min || v > max {
        return Err(format!(
            "failed to apply {} {} (min {} max {})",
            name, v, min, max
        ));
    }
    Ok(v)
}

fn require_finite(name: &str, v: f64) -> Result<f64, String> {
    if !v.is_finite() {
        return Err(format!(
            "failed to apply {} {} (must be a finite number)",
            name, v
        ));
    }
    Ok(v)
}

pub fn color_mode_from_flag(v: u16) -> Result<ColorMode, String> {
    match v {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        _ => Err(format!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            v
        )),
    }
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

impl Settings {
    pub fn from_args(args: &Args, env: &TermEnv) -> Result<Self, String> {
        let tick_ms = require_range("--tick-ms", args.tick_ms, 10, 1000)?;
        let duration = match args.duration {
            Some(s) => {
                let s = require_finite("--duration", s)?;
                if s > 0.0 {
                    let s = require_range("--duration", s, 0.1, 86400.0)?;
                    Some(Duration::from_secs_f64(s))
                } else {
                    None
                }
            }
            None => None,
        };

        let color_mode = match args.colormode {
            Some(v) => color_mode_from_flag(v)?,
            None => env.detect_color_mode(),
        };

        Ok(Self {
            tick: Duration::from_millis(tick_ms),
            duration,
            seed: args.seed.unwrap_or_else(clock_seed),
            max_clouds: require_range("--max-clouds", args.max_clouds, 1, 8)?,
            max_bolts: require_range("--max-bolts", args.max_bolts, 1, 8)?,
            grayscale: args.grayscale,
            glyph_mode: glyph_mode_from_str(&args.charset, env.default_to_ascii())?,
            color_mode,
            default_background: matches!(
                args.color_bg,
                ColorBg::DefaultBackground | ColorBg::Transparent
            ),
            screensaver: args.screensaver,
            log_file: args.log_file.clone(),
        })
    }
}
