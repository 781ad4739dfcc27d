use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use bidifix_config::{BidiConfig, ConfigUpdate, FixMode};
use bidifix_dom::Document;
use bidifix_engine::{BidiEngine, PumpOutcome};

const USAGE: &str = "\
Usage: bidifix [OPTIONS] <input.html>

Decides the dominant direction of each content block, styles it, and wraps
minority-script runs in <bdi> islands. The corrected markup goes to stdout.

Options:
  --fragment       treat the input as a body fragment, not a full document
  --mode=<MODE>    auto | dir-only | wrap-latin (overrides the config file)
  --disabled       parse and serialize without correcting anything
  --config=<FILE>  read configuration from FILE instead of bidifix.toml
  --out=<FILE>     write the corrected markup to FILE instead of stdout
  -h, --help       print this help
";

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let mut input: Option<PathBuf> = None;
    let mut fragment = false;
    let mut config_path: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut update = ConfigUpdate::default();

    for arg in std::env::args().skip(1) {
        if arg == "-h" || arg == "--help" {
            print!("{USAGE}");
            return Ok(());
        } else if arg == "--fragment" {
            fragment = true;
        } else if arg == "--disabled" {
            update.enabled = Some(false);
        } else if let Some(mode) = arg.strip_prefix("--mode=") {
            update.mode = Some(mode.parse::<FixMode>().map_err(anyhow::Error::msg)?);
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--out=") {
            out = Some(PathBuf::from(path));
        } else if arg.starts_with('-') {
            bail!("unknown option {arg:?}\n\n{USAGE}");
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            bail!("more than one input file given\n\n{USAGE}");
        }
    }
    let Some(input) = input else {
        bail!("no input file given\n\n{USAGE}");
    };

    let mut config = match &config_path {
        Some(path) => BidiConfig::load_from_file(path).map_err(anyhow::Error::msg)?,
        None => BidiConfig::load(),
    };
    config.apply_update(&update);
    log::info!("enabled={} mode={}", config.enabled, config.mode);

    let html = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut doc = if fragment {
        Document::parse_fragment(&html)
    } else {
        Document::parse(&html)
    };

    // One-shot run: zero debounce makes the first pump sweep immediately.
    let mut engine = BidiEngine::new(config)?.with_debounce(Duration::ZERO);
    let now = Instant::now();
    engine.bootstrap(now);
    match engine.pump(&mut doc, now) {
        PumpOutcome::Swept(stats) => {
            log::info!(
                "swept {} blocks: {} annotated, {} skipped, {} without text, {} islands",
                stats.blocks,
                stats.processed,
                stats.skipped,
                stats.no_text,
                stats.wraps
            );
        }
        PumpOutcome::Disabled => {
            log::info!("correction disabled; passing markup through");
        }
        outcome => bail!("sweep did not run: {outcome:?}"),
    }

    let rendered = doc.to_html();
    match out {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
