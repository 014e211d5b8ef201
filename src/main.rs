//! Firehose CLI binary entry point.
//! Delegates to the library for loading, conversion, fix-up and rendering.

use anyhow::{bail, Context};
use clap::Parser;
use firehose::cli::{Cli, Commands};
use firehose::config::{self, Overrides};
use firehose::document::{self, Format};
use firehose::report;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

fn note_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", error_prefix(), e);
            // document errors are failures; anything else is a usage problem
            let code = if e.downcast_ref::<firehose::Error>().is_some() {
                1
            } else {
                2
            };
            std::process::exit(code);
        }
    }
}

fn parse_format(raw: Option<&str>) -> anyhow::Result<Option<Format>> {
    match raw {
        Some(s) => match s.parse::<Format>() {
            Ok(f) => Ok(Some(f)),
            Err(_) => bail!("--to must be xml or json, got '{}'", s),
        },
        None => Ok(None),
    }
}

/// Expand paths and glob patterns into a sorted, de-duplicated list.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = BTreeSet::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern '{}'", pattern))? {
            match entry {
                Ok(path) if path.is_file() => {
                    matched = true;
                    out.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "skipping unreadable path"),
            }
        }
        if !matched {
            warn!(pattern = %pattern, "no input files matched");
        }
    }
    if out.is_empty() {
        bail!("no input files found");
    }
    Ok(out.into_iter().collect())
}

fn converted_name(input: &Path, out_dir: &Path, format: Format) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analysis".to_string());
    out_dir.join(format!("{}.{}", stem, format.extension()))
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let root = cli.root.as_deref().map(Path::new);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Convert {
            inputs,
            to,
            out_dir,
            compact,
        } => {
            let eff = config::resolve_effective(&Overrides {
                root,
                output: parse_format(to.as_deref())?,
                pretty: if compact { Some(false) } else { None },
                ..Default::default()
            });
            if config::load_config(&eff.root).is_none() {
                debug!("no firehose config found; using defaults");
            }
            let paths = expand_inputs(&inputs)?;
            let out_dir = out_dir.map(PathBuf::from);
            if let Some(dir) = &out_dir {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("cannot create {}", dir.display()))?;
            }

            let outcomes: Vec<(PathBuf, firehose::Result<String>)> = paths
                .par_iter()
                .map(|path| {
                    let rendered = document::load_analysis(path)
                        .and_then(|(a, _)| document::render(&a, eff.output, eff.pretty));
                    (path.clone(), rendered)
                })
                .collect();

            let mut failed = 0;
            for (path, outcome) in outcomes {
                match outcome {
                    Ok(text) => match &out_dir {
                        Some(dir) => {
                            let target = converted_name(&path, dir, eff.output);
                            std::fs::write(&target, format!("{}\n", text.trim_end()))
                                .with_context(|| format!("cannot write {}", target.display()))?;
                            println!("converted: {} -> {}", path.display(), target.display());
                        }
                        None => println!("{}", text),
                    },
                    Err(e) => {
                        failed += 1;
                        eprintln!("{} {}: {}", error_prefix(), path.display(), e);
                    }
                }
            }
            Ok(if failed > 0 { 1 } else { 0 })
        }
        Commands::Fixup {
            input,
            base_dir,
            hash_alg,
            to,
            write,
        } => {
            let eff = config::resolve_effective(&Overrides {
                root,
                base_dir: base_dir.as_deref().map(Path::new),
                hash_alg: hash_alg.as_deref(),
                ..Default::default()
            });
            let to = parse_format(to.as_deref())?;
            let path = PathBuf::from(&input);
            let (analysis, input_format) = document::load_analysis(&path)?;
            if eff.base_dir.is_none() && eff.hash_alg.is_none() {
                eprintln!(
                    "{} nothing to do: pass --base-dir or --hash-alg (or configure [fixup])",
                    note_prefix()
                );
            }
            let fixed = analysis.fixup_files(eff.base_dir.as_deref(), eff.hash_alg.as_deref())?;
            let format = to.unwrap_or(input_format);
            if write {
                document::save_analysis(&path, &fixed, format, eff.pretty)?;
                println!("fixed: {}", path.display());
            } else {
                println!("{}", document::render(&fixed, format, eff.pretty)?);
            }
            Ok(0)
        }
        Commands::Gcc {
            inputs,
            test_id,
            color,
        } => {
            let eff = config::resolve_effective(&Overrides {
                root,
                color: if color { Some(true) } else { None },
                ..Default::default()
            });
            let filter = match test_id.as_deref() {
                Some(re) => Some(
                    Regex::new(re).with_context(|| format!("invalid --test-id regex '{}'", re))?,
                ),
                None => None,
            };
            let color = report::use_colors(eff.color);
            let mut failed = 0;
            for path in expand_inputs(&inputs)? {
                match document::load_analysis(&path) {
                    Ok((analysis, _)) => {
                        print!("{}", report::analysis_to_gcc(&analysis, filter.as_ref(), color))
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("{} {}: {}", error_prefix(), path.display(), e);
                    }
                }
            }
            Ok(if failed > 0 { 1 } else { 0 })
        }
        Commands::Files { input } => {
            let (analysis, _) = document::load_analysis(Path::new(&input))?;
            for file in analysis.files() {
                let hash = file
                    .hash
                    .as_ref()
                    .map(|h| format!("{}:{}", h.alg, h.hexdigest))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}\t{}\t{}",
                    file.givenpath,
                    file.abspath.as_deref().unwrap_or("-"),
                    hash
                );
            }
            Ok(0)
        }
    }
}
