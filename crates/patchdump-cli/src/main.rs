use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;

use patchdump_core::devices::{jp8080, ms2000};
use patchdump_core::{Bank, FieldValue};

#[derive(Parser, Debug)]
#[command(name = "patchdump")]
#[command(version)]
#[command(
    about = "Offline codec for synthesizer SysEx patch dumps (Korg MS2000 / Roland JP-8080).",
    long_about = None,
    after_help = "Examples:\n  patchdump decode FactoryBanks.syx --device ms2000 -o bank.json\n  patchdump encode bank.json --device ms2000 -o bank.syx\n  patchdump list dump.syx --device jp8080"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Device {
    Ms2000,
    Jp8080,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a SysEx dump file into a JSON patch bank.
    #[command(
        after_help = "Examples:\n  patchdump decode dump.syx --device ms2000 -o bank.json\n  patchdump decode 'dumps/*.syx' --device jp8080 --stdout --pretty"
    )]
    Decode {
        /// Path to a .syx dump file (glob patterns accepted)
        input: PathBuf,

        /// Source device
        #[arg(long, value_enum)]
        device: Device,

        /// Output bank path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write JSON bank to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },

    /// Encode a JSON patch bank back into a SysEx dump file.
    #[command(
        after_help = "Examples:\n  patchdump encode bank.json --device ms2000 -o bank.syx\n  patchdump encode bank.json --device jp8080 --split -o dump.syx"
    )]
    Encode {
        /// Path to a JSON bank file (glob patterns accepted)
        input: PathBuf,

        /// Target device
        #[arg(long, value_enum)]
        device: Device,

        /// Output dump path (.syx)
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Global MIDI channel for Korg headers
        #[arg(long, default_value_t = 0)]
        channel: u8,

        /// Device id byte for Roland headers
        #[arg(long, default_value_t = jp8080::DEFAULT_DEVICE_ID)]
        device_id: u8,

        /// Split each Roland patch into main + tail messages, as the
        /// hardware dumps it
        #[arg(long)]
        split: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },

    /// List the patches in a SysEx dump file.
    List {
        /// Path to a .syx dump file (glob patterns accepted)
        input: PathBuf,

        /// Source device
        #[arg(long, value_enum)]
        device: Device,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            device,
            output,
            stdout,
            pretty,
            compact,
            quiet,
        } => cmd_decode(input, device, output, stdout, pretty, compact, quiet),
        Commands::Encode {
            input,
            device,
            output,
            channel,
            device_id,
            split,
            quiet,
        } => cmd_encode(input, device, output, channel, device_id, split, quiet),
        Commands::List { input, device } => cmd_list(input, device),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

impl Device {
    fn name(self) -> &'static str {
        match self {
            Device::Ms2000 => "ms2000",
            Device::Jp8080 => "jp8080",
        }
    }
}

fn cmd_decode(
    input: PathBuf,
    device: Device,
    output: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let input = resolve_input_path(&input, "syx")?;
    let bank = load_bank(&input, device)?;
    let json = serialize_bank(&bank, pretty, compact)?;

    if stdout {
        print!("{}", json);
        return Ok(());
    }

    let output = output.ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--output or --stdout".to_string()),
        )
    })?;
    write_output(&output, json.as_bytes())?;
    if !quiet {
        eprintln!(
            "OK: {} patches decoded -> {}",
            bank.patches.len(),
            output.display()
        );
    }
    Ok(())
}

fn cmd_encode(
    input: PathBuf,
    device: Device,
    output: PathBuf,
    channel: u8,
    device_id: u8,
    split: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let input = resolve_input_path(&input, "json")?;
    let text = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let bank: Bank = serde_json::from_str(&text)
        .with_context(|| format!("Invalid bank JSON: {}", input.display()))?;
    if bank.device != device.name() {
        return Err(CliError::new(
            format!(
                "bank is for device '{}', not '{}'",
                bank.device,
                device.name()
            ),
            Some("pass the matching --device".to_string()),
        ));
    }

    let stream = match device {
        Device::Ms2000 => ms2000::encode_bank(&bank, channel)
            .context("MS2000 bank encoding failed")?,
        Device::Jp8080 => {
            let mut stream = Vec::new();
            for (slot, patch) in bank.patches.iter().enumerate() {
                let address = jp8080::user_patch_address(slot);
                if split {
                    for message in jp8080::encode_patch_split(patch, device_id, address)
                        .context("JP-8080 patch encoding failed")?
                    {
                        stream.extend(message);
                    }
                } else {
                    stream.extend(
                        jp8080::encode_patch(patch, device_id, address)
                            .context("JP-8080 patch encoding failed")?,
                    );
                }
            }
            stream
        }
    };

    write_output(&output, &stream)?;
    if !quiet {
        eprintln!(
            "OK: {} patches encoded -> {}",
            bank.patches.len(),
            output.display()
        );
    }
    Ok(())
}

fn cmd_list(input: PathBuf, device: Device) -> Result<(), CliError> {
    let input = resolve_input_path(&input, "syx")?;
    let bank = load_bank(&input, device)?;
    for (index, patch) in bank.patches.iter().enumerate() {
        let slot = match device {
            Device::Ms2000 => ms2000::slot_name(index + 1),
            Device::Jp8080 => jp8080::slot_name(index + 1),
        }
        .unwrap_or_else(|| format!("#{}", index + 1));
        let name = patch.name().unwrap_or("");
        match device {
            Device::Ms2000 => {
                let mode = match patch.get("voice", "mode") {
                    Some(FieldValue::Int(mode)) => ms2000::voice_mode_name(*mode),
                    _ => "Unknown",
                };
                println!("{slot}  {name:<12}  {mode}");
            }
            Device::Jp8080 => println!("{slot}  {name}"),
        }
    }
    Ok(())
}

fn load_bank(input: &PathBuf, device: Device) -> Result<Bank, CliError> {
    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let bank = match device {
        Device::Ms2000 => ms2000::decode_sysex(&bytes).context("MS2000 dump decoding failed")?,
        Device::Jp8080 => jp8080::decode_sysex(&bytes).context("JP-8080 dump decoding failed")?,
    };
    if bank.patches.is_empty() {
        return Err(CliError::new(
            format!("no patches found in {}", input.display()),
            Some("check the file is a SysEx dump for the selected device".to_string()),
        ));
    }
    Ok(bank)
}

fn serialize_bank(bank: &Bank, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(bank)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(bank)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn write_output(output: &PathBuf, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(output, bytes)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    Ok(())
}

fn resolve_input_path(input: &PathBuf, expected_ext: &str) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    let resolved = if is_glob_pattern(&pattern) {
        resolve_glob(&pattern)?
    } else {
        input.clone()
    };

    if !resolved.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", resolved.display()),
            Some(format!("use a .{expected_ext} file")),
        ));
    }
    if !resolved.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", resolved.display()),
            Some(format!("use a .{expected_ext} file")),
        ));
    }
    let ext = resolved
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != expected_ext {
        return Err(CliError::new(
            format!("unsupported input format '{}'", resolved.display()),
            Some(format!("expected a .{expected_ext} file")),
        ));
    }
    Ok(resolved)
}

fn resolve_glob(pattern: &str) -> Result<PathBuf, CliError> {
    let mut matches = Vec::new();
    let paths = glob(pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches); matches: {}",
            pattern,
            matches.len(),
            listed
        );
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(
            message,
            Some("pass a single dump file, or run once per file".to_string()),
        ));
    }
    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
