//! Skill Vocabulary: the fixed, ordered list of canonical skill phrases the extractor
//! looks for. Built once at startup and shared read-only as `Arc<SkillVocabulary>`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::extraction::normalizer::tokenize;

/// Built-in skill list used when no `SKILLS_FILE` is configured.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "c++",
    "javascript",
    "sql",
    "machine learning",
    "data analysis",
    "project management",
    "communication",
    "leadership",
];

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read skill list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skill list {path} contains no usable phrases")]
    Empty { path: PathBuf },
}

/// A vocabulary entry: the canonical spelling plus its match tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillPhrase {
    pub canonical: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    phrases: Vec<SkillPhrase>,
    /// first token → indices into `phrases`, in vocabulary order
    by_first_token: HashMap<String, Vec<usize>>,
}

impl SkillVocabulary {
    /// Builds a vocabulary from phrases in order. Phrases are compared case-insensitively on
    /// their tokens; the first spelling seen is the canonical one and later duplicates are
    /// dropped. Blank and punctuation-only phrases are skipped.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut by_first_token: HashMap<String, Vec<usize>> = HashMap::new();

        for phrase in phrases {
            let canonical = phrase.as_ref().trim();
            let tokens = tokenize(canonical);
            let has_word = tokens
                .iter()
                .any(|token| token.chars().any(char::is_alphanumeric));
            if !has_word || !seen.insert(tokens.join(" ")) {
                continue;
            }
            by_first_token
                .entry(tokens[0].clone())
                .or_default()
                .push(entries.len());
            entries.push(SkillPhrase {
                canonical: canonical.to_string(),
                tokens,
            });
        }

        Self {
            phrases: entries,
            by_first_token,
        }
    }

    /// Parses the flat list format: one phrase per line, blank lines and `#` comments ignored.
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Loads a flat skill list from disk. An existing file without any phrase is an error,
    /// since every extraction against it would come back empty.
    pub fn from_file(path: &Path) -> Result<Self, VocabularyError> {
        let content = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let vocabulary = Self::parse(&content);
        if vocabulary.is_empty() {
            return Err(VocabularyError::Empty {
                path: path.to_path_buf(),
            });
        }
        info!(
            "Loaded {} skill phrases from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillPhrase> {
        self.phrases.iter()
    }

    /// Phrases whose first token is `token`, in vocabulary order.
    pub(crate) fn starting_with<'a>(
        &'a self,
        token: &str,
    ) -> impl Iterator<Item = &'a SkillPhrase> + 'a {
        self.by_first_token
            .get(token)
            .into_iter()
            .flatten()
            .map(move |&index| &self.phrases[index])
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn names(vocab: &SkillVocabulary) -> Vec<&str> {
        vocab.iter().map(|p| p.canonical.as_str()).collect()
    }

    #[test]
    fn test_default_vocabulary_has_builtin_skills() {
        let vocab = SkillVocabulary::default();
        assert_eq!(vocab.len(), DEFAULT_SKILLS.len());
        assert_eq!(names(&vocab), DEFAULT_SKILLS.to_vec());

        let cpp: Vec<&SkillPhrase> = vocab.starting_with("c++").collect();
        assert_eq!(cpp.len(), 1);
        assert_eq!(cpp[0].tokens, vec!["c++"]);
        assert_eq!(vocab.starting_with("machine").count(), 1);
        assert_eq!(vocab.starting_with("rust").count(), 0);
    }

    #[test]
    fn test_duplicates_are_case_insensitive_and_first_wins() {
        let vocab = SkillVocabulary::new(["SQL", "sql", "Python", "  PYTHON  "]);
        assert_eq!(names(&vocab), vec!["SQL", "Python"]);
    }

    #[test]
    fn test_blank_and_symbol_only_phrases_skipped() {
        let vocab = SkillVocabulary::new(["", "   ", "--", "go"]);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let vocab = SkillVocabulary::new(["rust", "go", "machine learning"]);
        assert_eq!(names(&vocab), vec!["rust", "go", "machine learning"]);
    }

    #[test]
    fn test_parse_ignores_comments_and_blank_lines() {
        let vocab = SkillVocabulary::parse("# languages\nrust\n\n  go  \n# soft\nleadership\n");
        assert_eq!(names(&vocab), vec!["rust", "go", "leadership"]);
    }

    #[test]
    fn test_from_file_loads_flat_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Rust\nKubernetes\nmachine learning").unwrap();

        let vocab = SkillVocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(
            names(&vocab),
            vec!["Rust", "Kubernetes", "machine learning"]
        );
    }

    #[test]
    fn test_from_file_rejects_empty_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here\n\n").unwrap();

        let err = SkillVocabulary::from_file(file.path()).unwrap_err();
        assert!(matches!(err, VocabularyError::Empty { .. }));
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let err = SkillVocabulary::from_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, VocabularyError::Io { .. }));
    }
}
