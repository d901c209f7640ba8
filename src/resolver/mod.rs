pub mod aliases;

use std::{
    num::IntErrorKind,
    sync::OnceLock,
};

pub use aliases::AliasTable;
use regex::Regex;
use thiserror::Error;

use crate::{
    catalog::CatalogSource,
    core::{
        LexitherasError,
        TextEntry,
    },
};

const DECK_NAME_PREFIX: &str = "Greek Vocabulary";

fn urn_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^urn:cts:").unwrap())
}

/// Identifiers of this shape are taken as-is, without a catalog lookup.
pub fn is_well_known_urn(identifier: &str) -> bool {
    urn_pattern().is_match(identifier)
}

/// A text ready for extraction. `entry` is `None` when the caller passed
/// a URN directly and the catalog was never consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedText {
    pub urn: String,
    pub entry: Option<TextEntry>,
}

impl ResolvedText {
    pub fn from_urn(urn: &str) -> Self {
        Self { urn: urn.to_string(), entry: None }
    }

    pub fn deck_name(&self) -> String {
        match &self.entry {
            Some(entry) => format!("{} - {}", DECK_NAME_PREFIX, entry.display_name()),
            None => {
                let parts: Vec<&str> = self.urn.split(':').collect();
                if parts.len() >= 4 {
                    format!("{} - {}", DECK_NAME_PREFIX, parts[3])
                } else {
                    format!("{} - {}", DECK_NAME_PREFIX, self.urn)
                }
            }
        }
    }

    /// `<stem>.apkg` where the stem is built from author and title, or from
    /// the raw identifier, with anything non-alphanumeric turned into `_`.
    pub fn default_output(&self) -> String {
        let stem = match &self.entry {
            Some(entry) => format!("{} {}", entry.author, entry.title),
            None => self.urn.clone(),
        };
        format!("{}.apkg", safe_file_stem(&stem))
    }
}

impl From<TextEntry> for ResolvedText {
    fn from(entry: TextEntry) -> Self {
        Self { urn: entry.urn.clone(), entry: Some(entry) }
    }
}

pub fn safe_file_stem(name: &str) -> String {
    name.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedText),
    /// Two or more texts, in catalog order. Pick one with [`parse_selection`].
    Candidates(Vec<TextEntry>),
    NoMatch,
}

impl Resolution {
    fn from_candidates(mut candidates: Vec<TextEntry>) -> Self {
        match candidates.len() {
            0 => Resolution::NoMatch,
            1 => Resolution::Resolved(ResolvedText::from(candidates.remove(0))),
            _ => Resolution::Candidates(candidates),
        }
    }
}

pub struct TextResolver<'a> {
    source: &'a dyn CatalogSource,
    aliases: AliasTable,
}

impl<'a> TextResolver<'a> {
    pub fn new(source: &'a dyn CatalogSource, aliases: AliasTable) -> Self {
        Self { source, aliases }
    }

    pub fn resolve(&self, identifier: &str) -> Result<Resolution, LexitherasError> {
        let identifier = identifier.trim();
        if is_well_known_urn(identifier) {
            return Ok(Resolution::Resolved(ResolvedText::from_urn(identifier)));
        }

        let catalog = self.source.catalog()?;
        Ok(match_texts(&catalog.texts, identifier, &self.aliases))
    }
}

/// Substring search over titles and authors, falling back to the alias
/// table only when nothing matches directly.
pub fn match_texts(texts: &[TextEntry], query: &str, aliases: &AliasTable) -> Resolution {
    let query = query.to_lowercase();

    let exact: Vec<TextEntry> = texts.iter().filter(|t| t.mentions(&query)).cloned().collect();
    if !exact.is_empty() {
        log::debug!("{} exact matches for {:?}", exact.len(), query);
        return Resolution::from_candidates(exact);
    }

    let needles = aliases.needles(&query);
    if needles.is_empty() {
        return Resolution::NoMatch;
    }

    log::debug!("No exact match for {:?}, trying aliases {:?}", query, needles);
    let fuzzy: Vec<TextEntry> =
        texts.iter().filter(|t| needles.iter().any(|n| t.mentions(n))).cloned().collect();
    Resolution::from_candidates(fuzzy)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{choice} is out of range, pick 1-{count}")]
    OutOfRange { choice: String, count: usize },
}

/// Parses a 1-based menu choice and returns the matching 0-based index.
pub fn parse_selection(input: &str, count: usize) -> Result<usize, SelectionError> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Ok(choice - 1),
        Ok(_) => Err(SelectionError::OutOfRange { choice: input.to_string(), count }),
        // Digits that overflow usize are still a number, just too big.
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            Err(SelectionError::OutOfRange { choice: input.to_string(), count })
        }
        Err(_) if input.strip_prefix('-').is_some_and(is_digits) => {
            Err(SelectionError::OutOfRange { choice: input.to_string(), count })
        }
        Err(_) => Err(SelectionError::NotANumber(input.to_string())),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
