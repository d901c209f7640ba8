use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One cataloged work. `urn` is the stable key shared by the catalog and
/// word-list pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub author: String,
    pub title: String,
    pub urn: String,
    pub url: String,
}

impl TextEntry {
    pub fn new(author: Option<&str>, title: &str, urn: &str, url: &str) -> Self {
        let author = author.map(str::trim).filter(|a| !a.is_empty()).unwrap_or(UNKNOWN_AUTHOR);

        TextEntry {
            author: author.to_string(),
            title: title.to_string(),
            urn: urn.to_string(),
            url: url.to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{}: {}", self.author, self.title)
    }

    // Case-insensitive substring test against title and author; `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

/// Texts in source page order, grouped contiguously by author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "timestamp")]
    pub fetched_at: DateTime<Utc>,
    pub texts: Vec<TextEntry>,
}

impl Catalog {
    pub fn new(fetched_at: DateTime<Utc>, texts: Vec<TextEntry>) -> Self {
        Catalog { fetched_at, texts }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Authors sorted alphabetically, each with its texts in catalog order.
    /// Only used for display; `texts` keeps the source order.
    pub fn grouped_by_author(&self) -> Vec<(&str, Vec<&TextEntry>)> {
        let mut groups: Vec<(&str, Vec<&TextEntry>)> = Vec::new();
        for text in &self.texts {
            match groups.iter_mut().find(|(author, _)| *author == text.author) {
                Some((_, texts)) => texts.push(text),
                None => groups.push((text.author.as_str(), vec![text])),
            }
        }
        groups.sort_by(|a, b| a.0.cmp(b.0));
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabItem {
    pub rank: u32,     // 1-based position in the word-list table
    pub word: String,
    pub lemma: String, // same as `word`, the list page has no separate lemma
    pub translation: String,
}

impl VocabItem {
    pub fn new(rank: u32, word: &str, translation: &str) -> Self {
        VocabItem {
            rank,
            word: word.to_string(),
            lemma: word.to_string(),
            translation: translation.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_author_falls_back_to_unknown() {
        let entry = TextEntry::new(Some("   "), "Fragments", "urn:x", "https://x");
        assert_eq!(entry.author, UNKNOWN_AUTHOR);

        let entry = TextEntry::new(None, "Fragments", "urn:x", "https://x");
        assert_eq!(entry.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_grouped_by_author_sorts_only_for_display() {
        let catalog = Catalog::new(
            Utc::now(),
            vec![
                TextEntry::new(Some("Xenophon"), "Anabasis", "urn:a", ""),
                TextEntry::new(Some("Homer"), "Iliad", "urn:b", ""),
                TextEntry::new(Some("Homer"), "Odyssey", "urn:c", ""),
            ],
        );

        let groups = catalog.grouped_by_author();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Homer");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Xenophon");

        assert_eq!(catalog.texts[0].author, "Xenophon");
    }

    #[test]
    fn test_catalog_json_uses_timestamp_key() {
        let catalog = Catalog::new(Utc::now(), Vec::new());
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.get("timestamp").is_some());
        assert!(json.get("texts").is_some());
    }
}
