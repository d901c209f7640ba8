use scraper::{
    ElementRef,
    Html,
    Selector,
};

use crate::core::{
    http::PageSource,
    settings::Settings,
    LexitherasError,
    VocabItem,
};

const WORD_LIST_TABLE: &str = "table.word-list";

fn selector(css: &str) -> Result<Selector, LexitherasError> {
    Selector::parse(css)
        .map_err(|e| LexitherasError::Parse(format!("Invalid selector {}: {:?}", css, e)))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn nearest_table<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.ancestors().filter_map(ElementRef::wrap).find(|e| e.value().name() == "table")
}

// Direct `td` children only; cells of nested tables belong to those tables.
fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children().filter_map(ElementRef::wrap).filter(|e| e.value().name() == "td").collect()
}

pub struct VocabularyExtractor<'a> {
    pages: &'a dyn PageSource,
    settings: &'a Settings,
}

impl<'a> VocabularyExtractor<'a> {
    pub fn new(pages: &'a dyn PageSource, settings: &'a Settings) -> Self {
        Self { pages, settings }
    }

    /// Always asks for every page at once; there is no pagination handling.
    pub fn extract(&self, urn: &str) -> Result<Vec<VocabItem>, LexitherasError> {
        let url = self.settings.word_list_url(urn);
        log::info!("Fetching vocabulary list from {}", url);

        let html = self.pages.get_text(&url)?;
        let items = parse_word_list(&html)?;
        log::info!("Extracted {} vocabulary items for {}", items.len(), urn);
        Ok(items)
    }
}

/// Reads the word-list table: header row skipped, then `word | translation`
/// per row. Rows with fewer than two cells are dropped without using up a rank.
/// Rows of tables nested inside the word list are ignored.
pub fn parse_word_list(html: &str) -> Result<Vec<VocabItem>, LexitherasError> {
    let document = Html::parse_document(html);
    let table_selector = selector(WORD_LIST_TABLE)?;
    let row_selector = selector("tr")?;

    let table = document.select(&table_selector).next().ok_or_else(|| {
        LexitherasError::Parse("Could not find vocabulary table on page".to_string())
    })?;

    let mut items = Vec::new();
    let rows = table
        .select(&row_selector)
        .filter(|row| nearest_table(row).is_some_and(|t| t.id() == table.id()));

    for row in rows.skip(1) {
        let cells = row_cells(&row);
        if cells.len() < 2 {
            continue;
        }

        let rank = items.len() as u32 + 1;
        items.push(VocabItem::new(rank, &cell_text(&cells[0]), &cell_text(&cells[1])));
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::testing::StaticPages;

    const WORD_LIST_PAGE: &str = r#"
        <html><body>
          <table class="table word-list">
            <tr><th>Lemma</th><th>Definition</th><th>Count</th></tr>
            <tr><td> ὁ </td><td>the</td><td>1200</td></tr>
            <tr><td>καί</td><td>and, also</td><td>900</td></tr>
            <tr><td colspan="3">malformed</td></tr>
            <tr><td>δέ</td><td></td><td>500</td></tr>
            <tr><td>καί</td><td>even</td><td>10</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_ranks_are_contiguous_over_valid_rows() {
        let items = parse_word_list(WORD_LIST_PAGE).unwrap();

        let ranks: Vec<u32> = items.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        assert_eq!(items[0], VocabItem::new(1, "ὁ", "the"));
        assert_eq!(items[2].word, "δέ");
        assert_eq!(items[2].translation, "");
        assert_eq!(items[2].lemma, "δέ");
    }

    #[test]
    fn test_duplicate_words_keep_their_own_rank() {
        let items = parse_word_list(WORD_LIST_PAGE).unwrap();
        assert_eq!(items[1].word, "καί");
        assert_eq!(items[3].word, "καί");
        assert_eq!(items[3].rank, 4);
    }

    #[test]
    fn test_header_row_is_skipped_even_with_td_cells() {
        let html = r#"<table class="word-list">
            <tr><td>Word</td><td>Meaning</td></tr>
            <tr><td>λόγος</td><td>word</td></tr>
        </table>"#;
        let items = parse_word_list(html).unwrap();
        assert_eq!(items, vec![VocabItem::new(1, "λόγος", "word")]);
    }

    #[test]
    fn test_nested_table_rows_are_ignored() {
        let html = r#"<table class="word-list">
            <tr><th>Lemma</th><th>Definition</th></tr>
            <tr>
              <td>λέγω</td>
              <td>say
                <table><tr><td>inner</td><td>row</td></tr></table>
              </td>
            </tr>
            <tr><td>ἔχω</td><td>have</td></tr>
        </table>"#;

        let items = parse_word_list(html).unwrap();
        let words: Vec<&str> = items.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["λέγω", "ἔχω"]);
        assert_eq!(items[1].rank, 2);
    }

    #[test]
    fn test_missing_table_is_a_parse_error() {
        let result = parse_word_list("<table class=\"other\"><tr><td>a</td><td>b</td></tr></table>");
        assert!(matches!(result, Err(LexitherasError::Parse(_))));
    }

    #[test]
    fn test_extract_requests_full_list() {
        let settings = Settings::default();
        let urn = "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2";
        let pages =
            StaticPages::default().with_page(&settings.word_list_url(urn), WORD_LIST_PAGE);

        let items = VocabularyExtractor::new(&pages, &settings).extract(urn).unwrap();
        assert_eq!(items.len(), 4);
        assert!(pages.requests.borrow()[0].ends_with("/?page=all"));
    }

    #[test]
    fn test_extract_propagates_transport_errors() {
        let settings = Settings::default();
        let pages = StaticPages::default();
        let result = VocabularyExtractor::new(&pages, &settings).extract("urn:cts:missing");
        assert!(matches!(result, Err(LexitherasError::Transport(_))));
    }
}
