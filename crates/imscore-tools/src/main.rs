use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use imscore::transcode::{TranscodeOptions, transcode};

mod input;
use input::read_vgm_as_vec;

/// Convert a YM3812 (OPL2) VGM log into an IMS song plus a BNK instrument bank.
#[derive(Parser)]
#[command(name = "vgm-to-ims", version, about, long_about = None)]
struct Cli {
    /// Input file (.vgm or .vgz; use '-' for stdin)
    #[arg(value_name = "input.vgm")]
    input: PathBuf,

    /// Output IMS path (default: input with its extension replaced by .ims)
    #[arg(short = 'o', long = "output", value_name = "path")]
    output: Option<PathBuf>,

    /// Playback tempo in BPM
    #[arg(long, value_name = "1..255", default_value_t = 120,
          value_parser = clap::value_parser!(u16).range(1..=255))]
    tempo: u16,

    /// Song name stored in the IMS header (default: input file stem)
    #[arg(long, value_name = "string")]
    name: Option<String>,
}

fn main() -> ExitCode {
    // Argument errors must exit with code 1; help and version are not
    // errors.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("vgm-to-ims: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let bytes = read_vgm_as_vec(&cli.input)?;

    let ims_path = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.input));
    let bnk_path = bnk_path_for(&ims_path);
    let song_name = cli.name.unwrap_or_else(|| song_stem(&cli.input));

    let options = TranscodeOptions {
        song_name,
        tempo: cli.tempo,
    };
    let output = transcode(&bytes, &options)
        .with_context(|| format!("failed to convert {}", cli.input.display()))?;

    for warning in &output.warnings {
        eprintln!("vgm-to-ims: warning: {}", warning);
    }

    std::fs::write(&ims_path, &output.ims)
        .with_context(|| format!("failed to write {}", ims_path.display()))?;
    std::fs::write(&bnk_path, &output.bnk)
        .with_context(|| format!("failed to write {}", bnk_path.display()))?;

    println!("wrote {} and {}", ims_path.display(), bnk_path.display());
    println!("instruments: {}", output.instrument_count);
    println!("events: {}", output.event_count);

    Ok(())
}

/// File name of `input` without a trailing `.vgm`/`.vgz` extension.
fn input_base(input: &Path) -> &str {
    let name = match input.file_name().and_then(|s| s.to_str()) {
        Some("-") | None => return "out",
        Some(name) => name,
    };
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".vgm") || lower.ends_with(".vgz") {
        &name[..name.len() - 4]
    } else {
        name
    }
}

/// Default IMS path: input directory + input basename + `.ims`.
fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}.ims", input_base(input)))
}

/// BNK path: the IMS path with a trailing `.ims` replaced by `.bnk`.
fn bnk_path_for(ims_path: &Path) -> PathBuf {
    let name = ims_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("out.ims");
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".ims") {
        ims_path.with_file_name(format!("{}.bnk", &name[..name.len() - 4]))
    } else {
        ims_path.with_file_name(format!("{}.bnk", name))
    }
}

/// Default song name: the input file stem.
fn song_stem(input: &Path) -> String {
    input_base(input).to_string()
}
