mod commands;

use clap::Parser;
use xspectra_core::domain::XsError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match run_parsed(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

/// Runs the CLI against an explicit argument list (without the program
/// name). Used by tests and by [`run_from_env`].
pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("xspectra-gen".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    run_parsed(full_args)
}

fn run_parsed(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => match cli.command {
            CliCommand::Generate(args) => commands::run_generate(args),
            CliCommand::Pack(args) => commands::run_pack(args),
        },
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "xspectra-gen", about = "XSpectra input-deck generation engine")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Generate the input-deck tree for a structure and its absorption sites
    Generate(commands::GenerateArgs),
    /// Pack a pseudopotential directory into a compressed JSON archive
    Pack(commands::PackArgs),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Core(#[from] XsError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Core(_) => 3,
        }
    }
}
