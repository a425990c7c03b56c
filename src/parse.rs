use miette::Diagnostic;
use thiserror::Error;

use tagword_runtime::Word;

#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid word '{0}'")]
    #[diagnostic(
        code(tagword::word),
        help("words are decimal, or hex with a 0x prefix, or binary with a 0b prefix")
    )]
    InvalidWord(String),

    #[error("invalid word '{word}' on line {line}")]
    #[diagnostic(code(tagword::dump))]
    InvalidDumpWord { word: String, line: usize },
}

pub fn parse_word(input: &str) -> Result<Word, ParseError> {
    let input = input.trim();
    let cleaned = input.replace('_', "");

    let parsed = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        usize::from_str_radix(hex, 16)
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        usize::from_str_radix(bin, 2)
    } else {
        cleaned.parse::<usize>()
    };

    parsed
        .map(Word::from_raw)
        .map_err(|_| ParseError::InvalidWord(input.to_string()))
}

/// Parses a heap dump. Words are separated by whitespace and `#` starts a comment.
pub fn parse_dump(text: &str) -> Result<Vec<Word>, ParseError> {
    let mut words = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line.split_whitespace() {
            let word = parse_word(token).map_err(|_| ParseError::InvalidDumpWord {
                word: token.to_string(),
                line: index + 1,
            })?;
            words.push(word);
        }
    }

    Ok(words)
}
