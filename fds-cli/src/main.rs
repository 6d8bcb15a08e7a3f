use clap::{CommandFactory, Parser};
use colored::Colorize;
use fds::{
    collect_files, replace_in_file, replace_in_files, resolve_args, validate, CliOverrides,
    ConfirmAnswer, ConsolePrompt, FdsConfig, FdsError, FdsResult, ReplaceFlags, Replacement,
    Subject,
};
use std::io::{self, IsTerminal, Read, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// fds is a modern and opinionated find/replace CLI program
///
/// Reads the subject from STDIN when no path is given:
///
///     echo subject | fds [OPTIONS] <SEARCH> <REPLACE>
///     fds [OPTIONS] <SEARCH> <REPLACE> ./file
///     fds [OPTIONS] <SEARCH> <REPLACE> ~/directory
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pattern to search for (regular expression unless --literal)
    search: String,

    /// Replacement, may refer to capture groups as $1 or ${name}
    replace: String,

    /// File or directory to replace in; STDIN is used when omitted
    path: Option<PathBuf>,

    /// Treat pattern as a regular string instead of as Regular Expression
    #[arg(short, long)]
    literal: bool,

    /// Ignore case on search
    #[arg(short, long)]
    insensitive: bool,

    /// Confirm each substitution
    #[arg(short, long)]
    confirm: bool,

    /// Print debug information
    #[arg(short, long)]
    verbose: bool,

    /// Ignore glob patterns, comma-separated. Ex. --ignore-globs "vendor/**,node_modules/lib/**.js"
    #[arg(long = "ignore-globs", value_delimiter = ',')]
    ignore_globs: Vec<String>,

    /// Number of workers created to process the substitutions (default: 4)
    #[arg(long)]
    workers: Option<NonZeroUsize>,

    /// Number of bytes of context shown around each match when confirming (default: 50)
    #[arg(long)]
    context_bytes: Option<usize>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            flags: ReplaceFlags {
                literal: self.literal,
                insensitive: self.insensitive,
                confirm: self.confirm,
                verbose: self.verbose,
            },
            workers: self.workers,
            context_bytes: self.context_bytes,
            ignore_globs: self.ignore_globs.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        report(&e);
        process::exit(e.code());
    }
}

fn run(cli: Cli) -> FdsResult<()> {
    let config = FdsConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli.overrides());
    init_logging(&config);

    // An interactive terminal has no subject to offer; leave it blank for validation
    let stdin: Box<dyn Read> = if cli.path.is_none() && !io::stdin().is_terminal() {
        Box::new(io::stdin())
    } else {
        Box::new(io::empty())
    };

    let args = resolve_args(&cli.search, &cli.replace, cli.path.as_deref(), stdin)?;
    validate(&args, &config.flags)?;

    let replacement = Replacement::compile(&args.search, &args.replace, &config.flags)?;
    let mut answer = ConfirmAnswer::default();

    match &args.subject {
        Subject::Text(text) => {
            let (replaced, _) = replacement.replace_all(text);
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&replaced)
                .and_then(|_| stdout.flush())
                .map_err(|e| FdsError::file_write("<stdout>", e))?;
        }
        Subject::File(path) => {
            let mut prompt = ConsolePrompt::stdio();
            let changed = replace_in_file(path, &replacement, &config, &mut prompt, &mut answer)?;
            debug!("File {} changed: {}", path.display(), changed);
        }
        Subject::Directory(root) => {
            let files = collect_files(root, &config.ignore_globs)?;
            let prompt = Mutex::new(ConsolePrompt::stdio());
            let report = replace_in_files(&files, &replacement, &config, &prompt, &mut answer)?;

            for error in &report.errors {
                report_error(error);
            }
            if let Some(first) = report.errors.into_iter().next() {
                process::exit(first.code());
            }
        }
    }

    Ok(())
}

fn init_logging(config: &FdsConfig) {
    // RUST_LOG wins over --verbose and the configured level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn report_error(e: &FdsError) {
    eprintln!("{} {}", "error:".red().bold(), e);
}

fn report(e: &FdsError) {
    report_error(e);
    if e.is_usage() {
        eprintln!("\n{}", Cli::command().render_usage());
    }
}
