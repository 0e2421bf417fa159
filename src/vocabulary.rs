use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

pub const WORD_LEN: usize = 5;

/// On-disk layout of the word file.
#[derive(Debug, Serialize, Deserialize)]
struct WordFile {
    answers: Vec<String>,
    valid_guesses: Vec<String>,
}

/// Answer pool and accepted-guess dictionary, loaded once and shared.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    answers: Vec<String>,
    valid_guesses: HashSet<String>,
}

impl Vocabulary {
    /// Build from in-memory lists. Every answer is also accepted as a guess.
    pub fn new<A, G>(answers: A, valid_guesses: G) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        let answers: Vec<String> = answers
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        if answers.is_empty() {
            bail!("answer list is empty");
        }

        if let Some(bad) = answers.iter().find(|w| !is_well_formed(w)) {
            bail!("answer {bad:?} is not {WORD_LEN} ascii letters");
        }

        let mut valid_guesses: HashSet<String> = valid_guesses
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| is_well_formed(w))
            .collect();
        valid_guesses.extend(answers.iter().cloned());

        Ok(Self {
            answers,
            valid_guesses,
        })
    }

    /// Load a `{"answers": [...], "valid_guesses": [...]}` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read word file {}", path.display()))?;
        let file: WordFile = serde_json::from_str(&text)
            .with_context(|| format!("malformed word file {}", path.display()))?;

        let vocab = Self::new(file.answers, file.valid_guesses)?;
        tracing::info!(
            answers = vocab.answers.len(),
            valid_guesses = vocab.valid_guesses.len(),
            "Loaded vocabulary from {}",
            path.display()
        );
        Ok(vocab)
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Case-insensitive dictionary membership.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.valid_guesses.contains(&word.to_lowercase())
    }
}

fn is_well_formed(word: &str) -> bool {
    word.len() == WORD_LEN && word.chars().all(|c| c.is_ascii_alphabetic())
}

/// Turn a newline-separated word list into a word file: keep five-letter
/// alphabetic words, lowercase, dedupe and sort. The same list serves as both
/// answers and accepted guesses.
pub fn build_word_file(raw: &str) -> Result<String> {
    let words: BTreeSet<String> = raw
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|w| is_well_formed(w))
        .collect();

    if words.is_empty() {
        bail!("no {WORD_LEN}-letter words in source list");
    }

    let words: Vec<String> = words.into_iter().collect();
    let file = WordFile {
        answers: words.clone(),
        valid_guesses: words,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Download a plain word list and write it out as a word file.
pub async fn fetch_word_file(url: &str, out: impl AsRef<Path>) -> Result<usize> {
    let out = out.as_ref();
    tracing::info!("Downloading word list from {}", url);

    let text = reqwest::get(url)
        .await
        .context("failed to download word list")?
        .error_for_status()?
        .text()
        .await?;

    let json = build_word_file(&text)?;
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, &json).with_context(|| format!("failed to write {}", out.display()))?;

    let count = Vocabulary::load(out)?.answers().len();
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validity_is_case_insensitive() {
        let vocab = Vocabulary::new(["about"], ["crane", "slate"]).unwrap();
        assert!(vocab.is_valid_word("crane"));
        assert!(vocab.is_valid_word("CRANE"));
        assert!(!vocab.is_valid_word("zzzzz"));
    }

    #[test]
    fn test_answers_are_always_guessable() {
        let vocab = Vocabulary::new(["About"], Vec::<String>::new()).unwrap();
        assert_eq!(vocab.answers(), ["about"]);
        assert!(vocab.is_valid_word("about"));
    }

    #[test]
    fn test_rejects_empty_or_malformed_answers() {
        assert!(Vocabulary::new(Vec::<String>::new(), ["crane"]).is_err());
        assert!(Vocabulary::new(["toolong"], ["crane"]).is_err());
        assert!(Vocabulary::new(["ab1de"], ["crane"]).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"answers": ["SPADE", "crane"], "valid_guesses": ["speed", "bad!!"]}}"#
        )
        .unwrap();

        let vocab = Vocabulary::load(file.path()).unwrap();
        assert_eq!(vocab.answers(), ["spade", "crane"]);
        assert!(vocab.is_valid_word("speed"));
        assert!(!vocab.is_valid_word("bad!!"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Vocabulary::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_build_word_file_filters_and_sorts() {
        let raw = "Crane\nslate\napple\nab\ncrane\nhyphen-ed\nzebra\n";
        let json = build_word_file(raw).unwrap();
        let parsed: WordFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.answers, ["apple", "crane", "slate", "zebra"]);
        assert_eq!(parsed.answers, parsed.valid_guesses);
    }

    #[test]
    fn test_build_word_file_rejects_empty_result() {
        assert!(build_word_file("a\nbb\n").is_err());
    }

    #[test]
    fn test_bundled_word_file_loads() {
        let vocab = Vocabulary::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/words.json")).unwrap();
        assert!(vocab.answers().len() > 100);
        assert!(vocab.is_valid_word("crane"));
        assert!(vocab.is_valid_word("eerie"));
    }
}
