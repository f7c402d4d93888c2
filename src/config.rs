use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_STEPS: u64 = 100_000;

const ROM_DIR: &str = "roms";
const ROM_EXT: &str = "nes";

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| parse_number(&v))
}

pub fn trace() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("NES_CPU_TRACE", false))
}

pub fn quiet() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("QUIET", false))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingValue(&'static str),
    InvalidNumber { flag: &'static str, value: String },
    InvalidDump(String),
    UnknownFlag(String),
    MissingRom,
    RomNotFound(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingValue(flag) => write!(f, "{} needs a value", flag),
            ConfigError::InvalidNumber { flag, value } => {
                write!(f, "{}: '{}' is not a number", flag, value)
            }
            ConfigError::InvalidDump(value) => {
                write!(f, "--dump: '{}' is not START:LEN", value)
            }
            ConfigError::UnknownFlag(flag) => write!(f, "unknown flag '{}'", flag),
            ConfigError::MissingRom => write!(f, "no ROM given"),
            ConfigError::RomNotFound(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one run of the host driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub rom: Option<String>,
    pub trace: bool,
    pub steps: u64,
    pub start_pc: Option<u16>,
    pub nmi_every: Option<u64>,
    pub irq_every: Option<u64>,
    pub breakpoints: Vec<u16>,
    pub dump: Option<(u16, usize)>,
    pub save_state: Option<PathBuf>,
    pub load_state: Option<PathBuf>,
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            rom: None,
            trace: false,
            steps: DEFAULT_STEPS,
            start_pc: None,
            nmi_every: None,
            irq_every: None,
            breakpoints: Vec::new(),
            dump: None,
            save_state: None,
            load_state: None,
            quiet: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunConfig),
    Help,
}

impl RunConfig {
    /// Defaults overlaid with NES_CPU_TRACE, NES_CPU_STEPS,
    /// NES_CPU_NMI_PERIOD and QUIET.
    pub fn from_env() -> Self {
        RunConfig {
            trace: trace(),
            steps: env_u64("NES_CPU_STEPS").unwrap_or(DEFAULT_STEPS),
            nmi_every: env_u64("NES_CPU_NMI_PERIOD").filter(|&n| n > 0),
            quiet: quiet(),
            ..RunConfig::default()
        }
    }
}

pub const USAGE: &str = "\
Usage: nes-cpu [options] <rom>

Options:
  --trace              log every instruction (target nes_cpu::trace)
  --steps N            stop after N instructions
  --start-pc ADDR      start here instead of the reset vector
  --nmi-every N        raise NMI every N cycles
  --irq-every N        raise IRQ every N cycles
  --break ADDR         stop when pc reaches ADDR (repeatable)
  --dump START:LEN     print memory after the run
  --save-state PATH    write a snapshot after the run
  --load-state PATH    resume from a snapshot instead of resetting
  --quiet              only print errors
  --help               show this text

Numbers are decimal, or hex with a 0x or $ prefix.";

/// Parses command-line arguments (without the program name) on top of
/// `base`.
pub fn parse_args<I, S>(args: I, base: RunConfig) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config = base;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        match arg {
            "--help" | "-h" => return Ok(Command::Help),
            "--trace" => config.trace = true,
            "--quiet" => config.quiet = true,
            "--steps" => config.steps = number(&mut args, "--steps")?,
            "--start-pc" => config.start_pc = Some(address(&mut args, "--start-pc")?),
            "--nmi-every" => config.nmi_every = period(number(&mut args, "--nmi-every")?),
            "--irq-every" => config.irq_every = period(number(&mut args, "--irq-every")?),
            "--break" => config.breakpoints.push(address(&mut args, "--break")?),
            "--dump" => {
                let value = value(&mut args, "--dump")?;
                config.dump = Some(parse_range(&value)?);
            }
            "--save-state" => {
                config.save_state = Some(PathBuf::from(value(&mut args, "--save-state")?))
            }
            "--load-state" => {
                config.load_state = Some(PathBuf::from(value(&mut args, "--load-state")?))
            }
            flag if flag.starts_with("--") => return Err(ConfigError::UnknownFlag(flag.to_string())),
            rom => config.rom = Some(rom.to_string()),
        }
    }

    if config.rom.is_none() && config.load_state.is_none() {
        return Err(ConfigError::MissingRom);
    }
    Ok(Command::Run(config))
}

fn value<I, S>(args: &mut I, flag: &'static str) -> Result<String, ConfigError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    args.next()
        .map(|s| s.as_ref().to_string())
        .ok_or(ConfigError::MissingValue(flag))
}

fn number<I, S>(args: &mut I, flag: &'static str) -> Result<u64, ConfigError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let value = value(args, flag)?;
    parse_number(&value).ok_or(ConfigError::InvalidNumber { flag, value })
}

fn address<I, S>(args: &mut I, flag: &'static str) -> Result<u16, ConfigError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let value = value(args, flag)?;
    parse_address(&value).ok_or(ConfigError::InvalidNumber { flag, value })
}

// Zero turns a periodic interrupt off.
fn period(n: u64) -> Option<u64> {
    (n > 0).then_some(n)
}

/// Decimal, or hex with a `0x`/`$` prefix.
pub fn parse_number(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

pub fn parse_address(s: &str) -> Option<u16> {
    parse_number(s).and_then(|n| u16::try_from(n).ok())
}

/// `START:LEN`, clamped so the range stays inside the address space.
pub fn parse_range(s: &str) -> Result<(u16, usize), ConfigError> {
    let (start, len) = s
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidDump(s.to_string()))?;
    let start = parse_address(start).ok_or_else(|| ConfigError::InvalidDump(s.to_string()))?;
    let len = parse_number(len).ok_or_else(|| ConfigError::InvalidDump(s.to_string()))? as usize;
    let len = len.min(0x10000 - start as usize);
    Ok((start, len))
}

fn is_rom(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(ROM_EXT))
            .unwrap_or(false)
}

fn with_ext(base: &Path) -> Option<PathBuf> {
    if base.extension().is_some() {
        return None;
    }
    let p = base.with_extension(ROM_EXT);
    p.exists().then_some(p)
}

fn list_paths<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> String {
    paths
        .map(|p| format!("- {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Finds a ROM by direct path, under `roms/`, with the `.nes` extension
/// added, or by case-insensitive stem match under `roms/`.
pub fn resolve_rom_path(arg: &str) -> Result<PathBuf, ConfigError> {
    resolve_rom_path_in(arg, Path::new(ROM_DIR))
}

pub fn resolve_rom_path_in(arg: &str, rom_dir: &Path) -> Result<PathBuf, ConfigError> {
    let direct = PathBuf::from(arg);
    if direct.exists() {
        return Ok(direct);
    }

    let in_roms = rom_dir.join(arg);
    if in_roms.exists() {
        return Ok(in_roms);
    }
    if let Some(p) = with_ext(&in_roms) {
        return Ok(p);
    }
    if let Some(p) = with_ext(&direct) {
        return Ok(p);
    }

    let candidates: Vec<PathBuf> = std::fs::read_dir(rom_dir)
        .into_iter()
        .flat_map(|it| it.flatten())
        .map(|e| e.path())
        .filter(|p| is_rom(p))
        .collect();

    let query = arg.to_lowercase();
    let mut matches: Vec<&PathBuf> = candidates
        .iter()
        .filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_lowercase() == query)
                .unwrap_or(false)
        })
        .collect();

    if matches.len() == 1 {
        return Ok(matches.remove(0).clone());
    }

    if matches.len() > 1 {
        return Err(ConfigError::RomNotFound(format!(
            "Multiple ROMs matched '{}'. Please specify one:\n{}",
            arg,
            list_paths(matches.into_iter())
        )));
    }

    Err(ConfigError::RomNotFound(if candidates.is_empty() {
        format!(
            "ROM '{}' not found. Place *.nes files under ./{} or provide a valid path.",
            arg,
            rom_dir.display()
        )
    } else {
        format!(
            "ROM '{}' not found. Available ROMs under ./{}:\n{}",
            arg,
            rom_dir.display(),
            list_paths(candidates.iter())
        )
    }))
}
