use std::io::Read;

use clap::Parser;
use log::{debug, info};
use miette::IntoDiagnostic;

use tagword_runtime::{Header, ObjectLayout, Word};

use crate::cli::{Command, Options};

mod cli;
mod dump;
mod parse;
mod repl;

/// One line describing a word: raw bits, both tag granularities, and the decoded value.
pub fn describe(word: Word) -> String {
    format!(
        "{:#018x}  {:<13}  kind3={}  {}",
        word.raw(),
        word.classify(),
        word.kind3(),
        word
    )
}

fn init_logger(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn header(uid: u32, nfields: usize, marked: bool) -> miette::Result<()> {
    let mut header = Header::try_new(uid, nfields).into_diagnostic()?;
    if marked {
        header = header.marked();
    }

    println!("{}", describe(header.to_word()));
    println!("layout: {}", ObjectLayout::of(header));
    Ok(())
}

fn dump(file: Option<std::path::PathBuf>, summary_only: bool) -> miette::Result<()> {
    let text = match &file {
        Some(path) => {
            info!("reading dump from {}", path.display());
            std::fs::read_to_string(path).into_diagnostic()?
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()?;
            text
        }
    };

    let words = parse::parse_dump(&text)?;
    debug!("parsed {} words", words.len());

    if !summary_only {
        for line in dump::lines(&words) {
            println!("{line}");
        }
        println!();
    }

    let summary: dump::Summary = words.iter().copied().collect();
    print!("{summary}");
    Ok(())
}

fn main() -> miette::Result<()> {
    // Install the panic handler.
    bupropion::install(bupropion::BupropionHandlerOpts::new).into_diagnostic()?;

    // Parse the command line arguments.
    let options = Options::parse();
    init_logger(options.verbose);

    match options.command {
        Command::Classify { words } => {
            for input in words {
                let word = parse::parse_word(&input)?;
                println!("{}", describe(word));
            }
            Ok(())
        }
        Command::Header {
            uid,
            nfields,
            marked,
        } => header(uid, nfields, marked),
        Command::Dump { file, summary } => dump(file, summary),
        Command::Repl => repl::run(),
    }
}
