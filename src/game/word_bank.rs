use super::rng::RandomSource;
use std::sync::Arc;

/// Built-in catalog used when no override is configured
pub const DEFAULT_WORDS: &[&str] = &[
    "PIZZA",
    "ELEPHANT",
    "MOUNTAIN",
    "GUITAR",
    "OCEAN",
    "RAINBOW",
    "CASTLE",
    "ROCKET",
    "BUTTERFLY",
    "TREASURE",
    "DRAGON",
    "GALAXY",
    "VOLCANO",
    "PYRAMID",
    "LIGHTHOUSE",
    "TELESCOPE",
    "ADVENTURE",
    "MYSTERY",
    "JOURNEY",
    "DISCOVERY",
];

/// Immutable word catalog shared by every session.
///
/// The bank itself holds no per-session state: callers pass in the words
/// they have already used and record the returned pick themselves.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Arc<[String]>,
}

impl WordBank {
    /// Build a catalog from raw entries: trimmed, upper-cased, blanks and
    /// duplicates dropped. Returns `None` if nothing usable remains.
    pub fn new<I, S>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = Vec::new();
        for entry in entries {
            let word = entry.as_ref().trim().to_uppercase();
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }
        if words.is_empty() {
            None
        } else {
            Some(Self {
                words: words.into(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn words(&self) -> &[String] {
        &self.words
    }

    /// Pick a word not in `used`. When every word has been used the full
    /// catalog is eligible again and the caller should reset its used list.
    ///
    /// With a one-word catalog this necessarily repeats.
    pub fn pick(&self, used: &[String], rng: &mut dyn RandomSource) -> String {
        let available: Vec<&String> = self.words.iter().filter(|w| !used.contains(w)).collect();
        if available.is_empty() {
            self.words[rng.pick_index(self.words.len())].clone()
        } else {
            available[rng.pick_index(available.len())].clone()
        }
    }

    /// True once every catalog word appears in `used`
    pub fn is_exhausted(&self, used: &[String]) -> bool {
        self.words.iter().all(|w| used.contains(w))
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::{SequenceRandom, ThreadRandom};

    #[test]
    fn test_new_normalizes_entries() {
        let bank = WordBank::new([" pizza ", "", "PIZZA", "Ocean"]).unwrap();
        assert_eq!(bank.words(), &["PIZZA".to_string(), "OCEAN".to_string()]);
        assert!(WordBank::new(["  ", ""]).is_none());
    }

    #[test]
    fn test_default_catalog() {
        let bank = WordBank::default();
        assert_eq!(bank.len(), 20);
        assert!(bank.words().contains(&"LIGHTHOUSE".to_string()));
    }

    #[test]
    fn test_pick_skips_used_words() {
        let bank = WordBank::new(["A", "B", "C"]).unwrap();
        let used = vec!["A".to_string(), "C".to_string()];
        let mut rng = ThreadRandom;
        for _ in 0..20 {
            assert_eq!(bank.pick(&used, &mut rng), "B");
        }
    }

    #[test]
    fn test_pick_indexes_into_remaining_words() {
        let bank = WordBank::new(["A", "B", "C", "D"]).unwrap();
        let used = vec!["B".to_string()];
        let mut rng = SequenceRandom::new([1]);
        // Remaining: A, C, D
        assert_eq!(bank.pick(&used, &mut rng), "C");
    }

    #[test]
    fn test_pick_after_exhaustion_uses_full_catalog() {
        let bank = WordBank::new(["A", "B"]).unwrap();
        let used = vec!["A".to_string(), "B".to_string()];
        assert!(bank.is_exhausted(&used));
        let mut rng = SequenceRandom::new([1]);
        assert_eq!(bank.pick(&used, &mut rng), "B");
    }

    #[test]
    fn test_single_word_catalog_repeats() {
        let bank = WordBank::new(["ONLY"]).unwrap();
        let mut rng = ThreadRandom;
        assert_eq!(bank.pick(&[], &mut rng), "ONLY");
        assert_eq!(bank.pick(&["ONLY".to_string()], &mut rng), "ONLY");
    }

    #[test]
    fn test_draws_are_distinct_until_exhausted() {
        let bank = WordBank::default();
        let mut rng = ThreadRandom;
        let mut used = Vec::new();
        for _ in 0..bank.len() {
            let word = bank.pick(&used, &mut rng);
            assert!(!used.contains(&word));
            used.push(word);
        }
        assert!(bank.is_exhausted(&used));
    }
}
