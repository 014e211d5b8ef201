//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "firehose",
    version,
    about = "Firehose: a common format for static analysis results",
    long_about = "Firehose reads, converts and post-processes static analysis reports in the Firehose XML and JSON formats.\n\nConfiguration precedence: CLI > firehose.toml > defaults.",
    after_help = "Examples:\n  firehose convert reports/*.xml --to json --out-dir out\n  firehose fixup report.xml --base-dir /build/src --hash-alg sha1 --write\n  firehose gcc report.json --test-id '^refcount'\n  firehose files report.xml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, global = true, help = "Project root for config discovery (default: current dir)")]
    pub root: Option<String>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current firehose version.")]
    Version,
    /// Convert documents between XML and JSON
    #[command(
        about = "Convert between XML and JSON",
        long_about = "Parse each input (path or glob) and re-serialize it in the target format. Inputs are processed in parallel and reported in sorted order.",
        after_help = "Examples:\n  firehose convert report.xml --to json\n  firehose convert 'reports/**/*.json' --to xml --out-dir converted"
    )]
    Convert {
        #[arg(required = true, help = "Input paths or glob patterns")]
        inputs: Vec<String>,
        #[arg(long, help = "Target format: xml|json (default: from config, else xml)")]
        to: Option<String>,
        #[arg(long, help = "Write each converted document into this directory")]
        out_dir: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Emit compact JSON")]
        compact: bool,
    },
    /// Resolve file paths and hashes
    #[command(
        about = "Resolve absolute paths and content hashes",
        long_about = "Set the absolute path of every referenced file relative to --base-dir and, with --hash-alg, record a digest of each file's content.",
        after_help = "Examples:\n  firehose fixup report.xml --base-dir /build/src\n  firehose fixup report.json --hash-alg sha256 --write"
    )]
    Fixup {
        #[arg(help = "Input document")]
        input: String,
        #[arg(long, help = "Directory that given paths are relative to")]
        base_dir: Option<String>,
        #[arg(long, help = "Hash algorithm: md5|sha1|sha224|sha256|sha384|sha512")]
        hash_alg: Option<String>,
        #[arg(long, help = "Output format: xml|json (default: input format)")]
        to: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Overwrite the input instead of printing")]
        write: bool,
    },
    /// Print issues as GCC-style diagnostics
    #[command(
        about = "Print issues as GCC diagnostics",
        long_about = "Render every issue in the inputs as compiler-style warnings with notes for each trace state.",
        after_help = "Examples:\n  firehose gcc report.xml\n  firehose gcc 'reports/*.json' --test-id 'refcount' --color"
    )]
    Gcc {
        #[arg(required = true, help = "Input paths or glob patterns")]
        inputs: Vec<String>,
        #[arg(long, help = "Only show issues whose test id matches this regex")]
        test_id: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Colorize output (ignored when NO_COLOR is set)")]
        color: bool,
    },
    /// List every file referenced by a document
    #[command(
        about = "List referenced files",
        long_about = "Print the given path, absolute path and hash of every file reachable from the document, in traversal order."
    )]
    Files {
        #[arg(help = "Input document")]
        input: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from(["firehose", "convert", "a.xml", "b/*.xml", "--to", "json"]);
        match cli.cmd {
            Commands::Convert {
                inputs, to, compact, ..
            } => {
                assert_eq!(inputs, ["a.xml", "b/*.xml"]);
                assert_eq!(to.as_deref(), Some("json"));
                assert!(!compact);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_parse_fixup_with_global_root() {
        let cli = Cli::parse_from([
            "firehose", "fixup", "r.xml", "--hash-alg", "sha1", "--write", "--root", "/tmp",
        ]);
        assert_eq!(cli.root.as_deref(), Some("/tmp"));
        assert!(matches!(
            cli.cmd,
            Commands::Fixup { write: true, hash_alg: Some(ref h), .. } if h == "sha1"
        ));
    }
}
