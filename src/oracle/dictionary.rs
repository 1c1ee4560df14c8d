use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::Deserialize;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::oracle::{Mode, WordOracle};

#[derive(Deserialize)]
struct DictionaryFile {
    #[serde(default, alias = "synonymes")]
    synonyms: BTreeMap<String, Vec<String>>,
    #[serde(default, alias = "antonymes")]
    antonyms: BTreeMap<String, Vec<String>>,
}

/// In-memory synonym/antonym relations, every entry trimmed and lower-cased.
#[derive(Debug, Default)]
pub struct Dictionary {
    synonyms: Relations,
    antonyms: Relations,
}

#[derive(Debug, Default)]
struct Relations {
    // Kept sorted so that random picks only depend on the rng
    prompts: Vec<String>,
    answers: HashMap<String, HashSet<String>>,
}

impl Relations {
    fn from_entries(entries: BTreeMap<String, Vec<String>>) -> Self {
        let mut answers: HashMap<String, HashSet<String>> = HashMap::new();
        for (prompt, words) in entries {
            let prompt = normalize(&prompt);
            if prompt.is_empty() {
                continue;
            }
            answers.entry(prompt).or_default().extend(
                words
                    .iter()
                    .map(|word| normalize(word))
                    .filter(|word| !word.is_empty()),
            );
        }
        let mut prompts: Vec<String> = answers.keys().cloned().collect();
        prompts.sort();
        Relations { prompts, answers }
    }
}

pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

impl Dictionary {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|error| {
            Error::Configuration(format!(
                "Could not read the dictionary. File: '{}', Error: '{error}'.",
                path.display()
            ))
        })?;
        let dictionary = Dictionary::from_json(&content)?;
        log::info!(
            "Dictionary loaded. File: '{}', Synonyms: '{}', Antonyms: '{}'.",
            path.display(),
            dictionary.synonyms.prompts.len(),
            dictionary.antonyms.prompts.len()
        );
        Ok(dictionary)
    }

    pub fn from_json(content: &str) -> Result<Self, Error> {
        let file: DictionaryFile = serde_json::from_str(content).map_err(|error| {
            Error::Configuration(format!("Could not parse the dictionary. Error: '{error}'."))
        })?;
        Ok(Dictionary {
            synonyms: Relations::from_entries(file.synonyms),
            antonyms: Relations::from_entries(file.antonyms),
        })
    }

    pub fn prompts(&self, mode: Mode) -> &[String] {
        &self.relations(mode).prompts
    }

    fn relations(&self, mode: Mode) -> &Relations {
        match mode {
            Mode::Synonym => &self.synonyms,
            Mode::Antonym => &self.antonyms,
        }
    }
}

impl WordOracle for Dictionary {
    fn get_prompt(&self, mode: Mode, excluded: &HashSet<String>) -> Result<String, Error> {
        let prompts = &self.relations(mode).prompts;
        let candidates: Vec<&String> = prompts
            .iter()
            .filter(|prompt| !excluded.contains(*prompt))
            .collect();

        let mut rng = thread_rng();
        let prompt = if candidates.is_empty() {
            if !prompts.is_empty() {
                log::info!(
                    "Every prompt has been used, recycling the vocabulary. Mode: '{mode}', Prompts: '{}'.",
                    prompts.len()
                );
            }
            prompts.choose(&mut rng)
        } else {
            candidates.choose(&mut rng).copied()
        };

        prompt
            .cloned()
            .ok_or(Error::Domain(DomainError::VocabularyExhausted(mode)))
    }

    fn get_valid_answers(&self, mode: Mode, prompt: &str) -> HashSet<String> {
        self.relations(mode)
            .answers
            .get(&normalize(prompt))
            .cloned()
            .unwrap_or_default()
    }
}
