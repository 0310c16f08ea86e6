use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// a front end for the Scilla smart contract language.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
#[command(propagate_version = true)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(visible_alias = "c")]
    Check(Options),
}

#[derive(Debug, Args)]
pub struct Options {
    #[arg(required = true)]
    pub path: PathBuf,
}
