use std::path::PathBuf;

use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::describe;
use crate::parse::parse_word;

fn get_history_path() -> Option<PathBuf> {
    let home_env = std::env::var("HOME").ok()?;
    Some(PathBuf::from(format!("{home_env}/.tagword.history")))
}

fn add_history(rl: &mut DefaultEditor, line: &str) {
    if let Err(err) = rl.add_history_entry(line) {
        debug!("cannot add '{line}' to the history: {err}");
    }
}

pub fn run() -> miette::Result<()> {
    let mut rl = DefaultEditor::new().map_err(|err| miette::miette!("cannot create a repl: {err}"))?;
    let path = get_history_path();

    if let Some(path) = &path {
        if rl.load_history(path).is_err() {
            debug!("no previous history at {}", path.display());
        }
    }

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                add_history(&mut rl, &line);

                for token in line.split_whitespace() {
                    match parse_word(token) {
                        Ok(word) => println!("{}", describe(word)),
                        Err(err) => println!("error: {err}"),
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }

    if let Some(path) = path {
        if let Err(err) = rl.append_history(&path) {
            debug!("cannot save history to {}: {err}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::History;

    #[test]
    fn history() {
        let mut rl = DefaultEditor::new().unwrap();

        add_history(&mut rl, "0x12000056");
        add_history(&mut rl, "42");

        assert_eq!(rl.history().len(), 2);
    }
}
