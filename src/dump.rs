use std::fmt::Display;

use fxhash::FxHashMap;
use log::debug;

use tagword_runtime::{FatWord, Kind, Word};

/// One line of decoded output.
pub struct Line {
    pub index: usize,
    pub word: Word,
}

impl Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>6}  {:#018x}  {:<13}  {}",
            self.index,
            self.word.raw(),
            self.word.classify(),
            self.word
        )
    }
}

/// Word counts per kind, and header counts per UID.
#[derive(Default, Debug)]
pub struct Summary {
    pub words: usize,
    pub kinds: FxHashMap<Kind, usize>,
    pub uids: FxHashMap<u32, usize>,
    pub corrupt: usize,
}

impl Summary {
    pub fn add(&mut self, word: Word) {
        self.words += 1;
        *self.kinds.entry(word.classify()).or_default() += 1;

        match word.decode() {
            FatWord::Header(header) => *self.uids.entry(header.uid()).or_default() += 1,
            FatWord::Corrupt(_) => self.corrupt += 1,
            _ => {}
        }
    }
}

impl FromIterator<Word> for Summary {
    fn from_iter<T: IntoIterator<Item = Word>>(iter: T) -> Self {
        let mut summary = Summary::default();
        for word in iter {
            summary.add(word);
        }
        debug!("summarized {} words", summary.words);
        summary
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} words", self.words)?;

        let mut kinds = self.kinds.iter().collect::<Vec<_>>();
        kinds.sort();
        for (kind, count) in kinds {
            writeln!(f, "  {kind:<13}  {count}")?;
        }

        if self.corrupt > 0 {
            writeln!(f, "  {:<13}  {}", "corrupt", self.corrupt)?;
        }

        let mut uids = self.uids.iter().collect::<Vec<_>>();
        uids.sort();
        for (uid, count) in uids {
            writeln!(f, "  uid {uid:<9}  {count}")?;
        }

        Ok(())
    }
}

pub fn lines(words: &[Word]) -> impl Iterator<Item = Line> + '_ {
    words
        .iter()
        .enumerate()
        .map(|(index, &word)| Line { index, word })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagword_runtime::{make_header, make_unboxed};

    #[test]
    fn summary() {
        let words = [
            make_header(5, 2),
            make_unboxed(1),
            make_unboxed(2),
            make_header(5, 0),
            make_header(UID, 1),
            Word::from_raw(0x1000),
        ];
        let summary: Summary = words.iter().copied().collect();

        assert_eq!(summary.words, 6);
        assert_eq!(summary.kinds[&Kind::Header], 3);
        assert_eq!(summary.kinds[&Kind::Unboxed], 2);
        assert_eq!(summary.kinds[&Kind::Pointer], 1);
        assert_eq!(summary.uids[&5], 2);
        assert_eq!(summary.uids[&UID], 1);
        assert_eq!(summary.corrupt, 0);
    }

    const UID: u32 = 300;

    #[test]
    fn render() {
        let summary: Summary = [make_unboxed(3), make_header(7, 0)].into_iter().collect();
        assert_eq!(
            summary.to_string(),
            "2 words\n  unboxed        1\n  header         1\n  uid 7          1\n"
        );
    }

    #[test]
    fn line() {
        let line = lines(&[make_unboxed(21)]).next().unwrap();
        assert_eq!(
            line.to_string(),
            format!("     0  {:#018x}  unboxed        21", 43)
        );
    }
}
