use std::io;
use std::path::PathBuf;

use afsdir::{Config, DirReader, Mode};
use anyhow::Context;
use clap::{Parser, Subcommand};
use slog::Logger;
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::{Format, Severity};
use sloggers::Build;

/// Decode and analyze AFS directory objects
#[derive(Parser)]
#[command(name = "dirobj")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log every page read to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Character printed in place of unprintable bytes
    #[arg(long, global = true, default_value_t = '.')]
    placeholder: char,

    /// Do not count the pages the directory could still grow into as free capacity
    #[arg(long, global = true)]
    no_projection: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace every page header, the directory header and every slot
    Dump {
        /// Directory object to read, standard input if omitted or `-`
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Print `<vnode>.<uniquifier> <name>` for every entry
    List {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Report capacity and fragmentation
    #[command(alias = "stats")]
    Stat {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Print the version
    Version,
}

fn main() {
    std::process::exit(real_main());
}

fn real_main() -> i32 {
    let cli = Cli::parse();

    let mut builder = TerminalLoggerBuilder::new();
    builder.level(if cli.verbose {
        Severity::Debug
    } else {
        Severity::Warning
    });
    builder.destination(Destination::Stderr);
    builder.format(Format::Compact);
    let logger = match builder.build() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("dirobj: unable to set up logging: {}", e);
            return 1;
        }
    };

    let config = Config {
        placeholder: cli.placeholder,
        project_unused_pages: !cli.no_projection,
    };
    match run(cli.command, &config, &logger) {
        Ok(()) => 0,
        Err(e) => {
            slog::crit!(logger, "{:#}", e);
            1
        }
    }
}

fn run(command: Command, config: &Config, logger: &Logger) -> anyhow::Result<()> {
    let (mode, file) = match command.into_mode() {
        Some(parts) => parts,
        None => {
            println!("dirobj {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    let stdout = io::stdout();
    let out = io::BufWriter::new(stdout.lock());

    match input_path(file) {
        Some(path) => {
            let reader = DirReader::open_with_logger(&path, logger.clone())
                .with_context(|| format!("unable to open {}", path.display()))?;
            mode.run(reader, out, config)
                .with_context(|| path.display().to_string())?;
        }
        None => {
            let stdin = io::stdin();
            let reader =
                DirReader::with_logger(stdin.lock(), logger.new(slog::o!("file" => "<stdin>")));
            mode.run(reader, out, config).context("<stdin>")?;
        }
    }
    Ok(())
}

/// The file to read, `None` for standard input
fn input_path(file: Option<PathBuf>) -> Option<PathBuf> {
    file.filter(|path| path.as_os_str() != "-")
}

impl Command {
    /// The mode to run and the file it reads, `None` for `version`
    fn into_mode(self) -> Option<(Mode, Option<PathBuf>)> {
        match self {
            Command::Dump { file } => Some((Mode::Dump, file)),
            Command::List { file } => Some((Mode::List, file)),
            Command::Stat { file } => Some((Mode::Stats, file)),
            Command::Version => None,
        }
    }
}
