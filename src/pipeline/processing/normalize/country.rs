use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::warn;

use crate::observability::metrics;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Raw spellings the sources are known to disagree on.
const BUILT_IN_ALIASES: &[(&str, &str)] = &[
    ("United States of America", "USA"),
    ("United States", "USA"),
];

/// Outcome of mapping one raw country name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical {
    Mapped(String),
    /// No vocabulary entry or alias matched; the raw name passes through unchanged.
    Unmapped(String),
}

impl Canonical {
    pub fn name(&self) -> &str {
        match self {
            Canonical::Mapped(name) | Canonical::Unmapped(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Canonical::Mapped(name) | Canonical::Unmapped(name) => name,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, Canonical::Mapped(_))
    }
}

/// Distinct unmapped names seen while canonicalizing one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnmappedReport {
    pub source: String,
    pub names: BTreeSet<String>,
}

impl UnmappedReport {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Maps free-text country names onto one shared vocabulary.
///
/// Aliases are consulted before the vocabulary, so a spelling that is both a
/// vocabulary entry and an alias key resolves to the alias target.
#[derive(Debug, Clone)]
pub struct CountryCanonicalizer {
    vocabulary: HashSet<String>,
    /// lowercase cleaned name -> canonical name
    lookup: HashMap<String, String>,
    /// lowercase cleaned alias -> canonical name
    aliases: HashMap<String, String>,
}

impl CountryCanonicalizer {
    /// Vocabulary plus the built-in aliases.
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonicalizer = Self {
            vocabulary: HashSet::new(),
            lookup: HashMap::new(),
            aliases: HashMap::new(),
        };
        for name in vocabulary {
            canonicalizer.add_canonical(&clean(name.as_ref()));
        }
        for (raw, canonical) in BUILT_IN_ALIASES {
            canonicalizer.add_alias(raw, canonical);
        }
        canonicalizer
    }

    /// Layer extra aliases over the existing table; later entries win.
    pub fn with_aliases(mut self, aliases: &BTreeMap<String, String>) -> Self {
        for (raw, canonical) in aliases {
            self.add_alias(raw, canonical);
        }
        self
    }

    fn add_canonical(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.vocabulary.insert(name.to_string());
        self.lookup
            .entry(name.to_lowercase())
            .or_insert_with(|| name.to_string());
    }

    fn add_alias(&mut self, raw: &str, canonical: &str) {
        let canonical = clean(canonical);
        if canonical.is_empty() {
            return;
        }
        // Alias targets are canonical and never themselves aliased, so
        // re-running stays a fixed point.
        self.add_canonical(&canonical);
        self.aliases.remove(&canonical.to_lowercase());
        self.aliases.insert(clean(raw).to_lowercase(), canonical);
    }

    pub fn canonicalize(&self, raw: &str) -> Canonical {
        let cleaned = clean(raw);
        let key = cleaned.to_lowercase();
        if let Some(canonical) = self.aliases.get(&key) {
            return Canonical::Mapped(canonical.clone());
        }
        if self.vocabulary.contains(&cleaned) {
            return Canonical::Mapped(cleaned);
        }
        match self.lookup.get(&key) {
            Some(canonical) => Canonical::Mapped(canonical.clone()),
            None => Canonical::Unmapped(raw.to_string()),
        }
    }

    /// Same length and order as the input.
    pub fn canonicalize_all<I, S>(&self, names: I) -> Vec<Canonical>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.canonicalize(name.as_ref()))
            .collect()
    }

    /// Rewrite names in place, logging each distinct unmapped name once.
    pub fn canonicalize_in_place<'a, I>(&self, source: &str, names: I) -> UnmappedReport
    where
        I: IntoIterator<Item = &'a mut String>,
    {
        let mut report = UnmappedReport {
            source: source.to_string(),
            names: BTreeSet::new(),
        };
        for name in names {
            match self.canonicalize(name) {
                Canonical::Mapped(canonical) => *name = canonical,
                Canonical::Unmapped(raw) => {
                    if report.names.insert(raw.clone()) {
                        warn!(source, country = %raw, "country name not in canonical vocabulary; joins on it will miss");
                        metrics::normalize::unmapped_name(source);
                    }
                }
            }
        }
        report
    }
}

/// Trim and collapse internal whitespace.
fn clean(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}
