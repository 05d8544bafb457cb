use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "keepsake",
    about = "Inspect and check Keepsake save files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Count envelope tags and report legacy and malformed ones
    Inspect(InspectArgs),
    /// Fail if the save holds tags that would not load
    Check(CheckArgs),
    /// Re-emit a save as indented JSON
    Pretty(PrettyArgs),
    /// List the save slots in a directory
    Slots(SlotsArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
    /// Tags registered by the program that wrote the save
    #[arg(long = "known", value_name = "TAG")]
    pub known: Vec<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    pub file: PathBuf,
    /// Tags registered by the program that will load the save
    #[arg(long = "known", value_name = "TAG")]
    pub known: Vec<String>,
}

#[derive(Args)]
pub struct PrettyArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SlotsArgs {
    pub dir: PathBuf,
    #[arg(long, default_value = "json")]
    pub extension: String,
}
