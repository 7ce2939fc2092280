pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "geez-corpus")]
#[command(about = "Collect and clean a parallel English/Ge'ez corpus", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/geez-corpus/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Append logs to this file as well as stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headful: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape one chapter into a JSON file
    Scrape {
        /// Chapter URL
        url: String,

        /// Output file (default: <output dir>/<last URL segment>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Scrape every chapter listed in a manifest, one at a time
    Batch {
        /// File with one `URL [OUTPUT]` per line; `#` starts a comment
        manifest: PathBuf,
    },
    /// Merge chapter JSON files into an English,Geez CSV
    Merge {
        /// Directory holding chapter JSON files
        dir: PathBuf,

        /// CSV file to write
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Clean an English,Geez CSV for training
    Clean {
        /// CSV file to read
        input: PathBuf,

        /// CSV file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}
