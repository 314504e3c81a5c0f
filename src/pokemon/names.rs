//! Pokémon name validation and Pokesol name rewriting.
//!
//! OCR of the name region is noisy: stray symbols from the type icons and
//! doubled or missing long-vowel marks (ー) are common. Names are cleaned and
//! then looked up by exact match only, so a bad read never turns into a
//! different Pokémon.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::log;

/// Newline-delimited list of every name the card can show.
const BUILTIN_NAMES: &str = include_str!("../../data/pokemon_names_ja.txt");

/// Card spelling → Pokesol spelling, for whole names and for form suffixes.
const POKESOL_VARIANTS: [(&str, &str); 18] = [
    ("(れいじゅう)", "(霊獣)"),
    ("(けしん)", "(化身)"),
    ("(みどり)", ""),
    ("(かまど)", "(炎)"),
    ("(いど)", "(水)"),
    ("(いしずえ)", "(岩)"),
    ("(はくばじょう)", "(白馬)"),
    ("(こくばじょう)", "(黒馬)"),
    ("(アカツキ)", "(赫月)"),
    ("(れんげき)", "(連撃)"),
    ("(いちげき)", "(一撃)"),
    ("ヒートロトム", "ロトム(炎)"),
    ("ウォッシュロトム", "ロトム(水)"),
    ("フロストロトム", "ロトム(氷)"),
    ("スピンロトム", "ロトム(飛)"),
    ("カットロトム", "ロトム(草)"),
    ("カバルドン(オス)", "カバルドン"),
    ("カバルドン(メス)", "カバルドン"),
];

/// Long vowel mark, the character OCR most often doubles or invents.
const ELONGATION_MARK: char = 'ー';

fn pokesol_variant(key: &str) -> Option<&'static str> {
    POKESOL_VARIANTS
        .iter()
        .find(|(card, _)| *card == key)
        .map(|(_, pokesol)| *pokesol)
}

/// Validates OCR'd names against the known name list.
pub struct NameResolver {
    names: HashSet<String>,
    invalid_chars: Regex,
    elongation_runs: Regex,
    form_suffix: Regex,
}

impl NameResolver {
    /// Builds a resolver from a newline-delimited name list.
    pub fn from_list(list: &str) -> Result<Self> {
        let names: HashSet<String> = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            names,
            invalid_chars: Regex::new(r"[^ぁ-んァ-ヶー()]")?,
            elongation_runs: Regex::new(r"ー+")?,
            form_suffix: Regex::new(r"\(.+\)$")?,
        })
    }

    /// Resolver over the name list compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_list(BUILTIN_NAMES)
    }

    /// Resolver over a name list file, replacing the built-in list.
    pub fn from_file(path: &Path) -> Result<Self> {
        let list = fs::read_to_string(path)
            .with_context(|| format!("Failed to read name list {}", path.display()))?;
        let resolver = Self::from_list(&list)?;
        log(&format!(
            "Loaded {} names from {}",
            resolver.len(),
            path.display()
        ));
        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Keeps only kana, the long vowel mark and parentheses, then squeezes
    /// every run of long vowel marks down to one.
    pub fn clean(&self, raw: &str) -> String {
        let kana_only = self.invalid_chars.replace_all(raw, "");
        self.elongation_runs
            .replace_all(&kana_only, ELONGATION_MARK.to_string().as_str())
            .into_owned()
    }

    /// Resolves an OCR'd name to a known name.
    ///
    /// Tries the cleaned text, then the cleaned text minus one trailing ー.
    /// Returns `None` when neither is a known name.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let name = self.clean(raw);

        if self.contains(&name) {
            return Some(name);
        }

        if let Some(stripped) = name.strip_suffix(ELONGATION_MARK) {
            if self.contains(stripped) {
                return Some(stripped.to_string());
            }
        }

        log(&format!("Unknown pokemon name: {:?} (from {:?})", name, raw));
        None
    }

    /// Rewrites a card name into the spelling the Pokesol parser expects.
    ///
    /// Whole-name entries win; otherwise only a trailing form suffix such as
    /// `(はくばじょう)` is rewritten. Unknown names and suffixes pass through.
    pub fn to_pokesol_name(&self, name: &str) -> String {
        if let Some(pokesol) = pokesol_variant(name) {
            return pokesol.to_string();
        }

        self.form_suffix
            .replace(name, |caps: &regex::Captures| {
                let suffix = &caps[0];
                pokesol_variant(suffix).unwrap_or(suffix).to_string()
            })
            .into_owned()
    }
}
