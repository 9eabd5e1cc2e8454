use annotation_tags::{ConverterConfigBuilder, LabelSequenceConverter, Scheme};
use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use serde_jsonlines::json_lines;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Deserialize)]
struct Example {
    tags: Vec<String>,
}

fn read_sequences<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let examples = json_lines::<Example, _>(path)
        .with_context(|| format!("could not open {}", path.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("could not parse {}", path.display()))?;
    Ok(examples.into_iter().map(|ex| ex.tags).collect())
}

#[derive(Debug, Parser)]
struct Args {
    /// JSON lines file where every line is `{"tags": [...]}`
    #[arg(short, long, default_value = "./data/datasets/big_dataset.jsonl")]
    path: PathBuf,
    /// Scheme of the input. Auto-detected when missing
    #[arg(short, long, value_parser = Scheme::from_str)]
    source: Option<Scheme>,
    #[arg(short, long, value_parser = Scheme::from_str, default_value = "bilou")]
    target: Scheme,
    #[arg(short, long, default_value_t = 1)]
    n_samples: u32,
    #[arg(long, default_value_t = false)]
    parallel: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let mut builder = ConverterConfigBuilder::default()
        .target(args.target)
        .parallel(args.parallel);
    if let Some(source) = args.source {
        builder = builder.source(source);
    }
    let config = builder.build();
    log::info!("{}", config);
    let converter = LabelSequenceConverter::new(config);

    let sequences = read_sequences(&args.path)?;
    log::info!(
        "loaded {} sequences from {}",
        sequences.len(),
        args.path.display()
    );
    let mut total_duration = Duration::ZERO;
    for _ in 0..args.n_samples {
        let now = Instant::now();
        converter.convert_batch(&sequences)?;
        total_duration += now.elapsed();
    }
    println!(
        "Total duration: {} with {} samples",
        total_duration.as_secs_f64(),
        args.n_samples
    );
    Ok(())
}
