use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspects tagged runtime words, object headers and heap dumps.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Logs at debug level, regardless of RUST_LOG.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classifies and decodes words. Decimal, or hex with 0x, or binary with 0b.
    Classify {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Builds a header word.
    Header {
        #[arg(short, long)]
        uid: u32,

        #[arg(short, long, default_value_t = 0)]
        nfields: usize,

        /// Sets the collector's mark bit.
        #[arg(short, long)]
        marked: bool,
    },

    /// Decodes a heap dump of whitespace separated words. Reads stdin without a file.
    Dump {
        file: Option<PathBuf>,

        /// Only prints the summary.
        #[arg(short, long)]
        summary: bool,
    },

    /// Starts a repl session that classifies every word typed in.
    Repl,
}
