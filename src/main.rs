//! boleto – command-line payment slip renderer.
//!
//! Usage:
//!   boleto <slips.json> [-o out.pdf] [-f pdf|png|jpg|json] [-r 150] [-t template.png]
//!   boleto --sample [--batch]
//!
//! A JSON object renders one slip; a JSON array renders a batch, one slip per
//! page. If `-o` is omitted the output is written next to the input file with
//! the format's extension.

use std::{fs, path::PathBuf, process};

use clap::Parser;

use boleto_forge::config::{RenderConfig, RenderOptions};
use boleto_forge::format::Format;
use boleto_forge::pipeline::Composer;
use boleto_forge::samples::{sample_batch, sample_slip};
use boleto_forge::slip::SlipRecord;

#[derive(Parser, Debug)]
#[command(name = "boleto", version, about = "Render bank payment slips to PDF or images")]
struct Cli {
    /// Slip JSON file (object = one slip, array = batch)
    #[arg(required_unless_present = "sample")]
    input: Option<PathBuf>,

    /// Output path (default: input stem with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: pdf, png, jpg or json
    #[arg(short, long)]
    format: Option<String>,

    /// Raster resolution in dpi
    #[arg(short, long)]
    resolution: Option<u32>,

    /// Template artwork (PNG or JPEG); defaults to the bundled form
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Treat the input as a batch even if it holds a single slip
    #[arg(long)]
    batch: bool,

    /// Render the bundled sample slip instead of reading input
    #[arg(long)]
    sample: bool,
}

enum Input {
    Single(SlipRecord),
    Batch(Vec<SlipRecord>),
}

fn read_input(cli: &Cli) -> Result<Input, String> {
    if cli.sample {
        return Ok(if cli.batch {
            Input::Batch(sample_batch(3))
        } else {
            Input::Single(sample_slip())
        });
    }

    let path = cli.input.as_ref().ok_or("no input file specified")?;
    let json = fs::read_to_string(path)
        .map_err(|e| format!("reading '{}': {e}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| format!("parsing '{}': {e}", path.display()))?;

    let input = if value.is_array() {
        Input::Batch(serde_json::from_value(value).map_err(|e| e.to_string())?)
    } else {
        let slip: SlipRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
        if cli.batch {
            Input::Batch(vec![slip])
        } else {
            Input::Single(slip)
        }
    };
    Ok(input)
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut config = RenderConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(template) = &cli.template {
        config = config.with_template(template.clone());
    }

    let options = RenderOptions {
        format: cli.format.clone(),
        resolution: cli.resolution,
    };
    let format: Format = match &options.format {
        Some(id) => id.parse().map_err(|e: boleto_forge::RenderError| e.to_string())?,
        None => config.format,
    };

    let output = cli.output.clone().unwrap_or_else(|| {
        let mut o = cli
            .input
            .clone()
            .unwrap_or_else(|| PathBuf::from("boleto"));
        o.set_extension(format.identifier());
        o
    });

    let composer = Composer::new(config);
    let (bytes, pages) = match read_input(cli)? {
        Input::Single(slip) => (composer.render(&slip, &options), 1),
        Input::Batch(slips) => {
            let n = slips.len();
            (composer.render_batch(&slips, &options), n)
        }
    };
    let bytes = bytes.map_err(|e| e.to_string())?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("creating output directory: {e}"))?;
        }
    }
    fs::write(&output, &bytes).map_err(|e| format!("writing '{}': {e}", output.display()))?;

    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        output.display(),
        bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
