use rand::Rng;

use crate::core::VocabItem;

pub mod package;

pub use package::write_package;

pub const MODEL_NAME: &str = "Greek Vocabulary";
pub const FIELD_NAMES: [&str; 4] = ["Greek", "Translation", "Lemma", "Rank"];

const TEMPLATE_NAME: &str = "Greek to English";
const FRONT: &str = "{{Greek}}<br><small>Rank: {{Rank}}</small>";
const BACK: &str =
    "{{FrontSide}}<hr id=\"answer\">{{Translation}}<br><br><small>Lemma: {{Lemma}}</small>";
const CARD_CSS: &str = ".card {
    font-family: arial;
    font-size: 20px;
    text-align: center;
    color: black;
    background-color: white;
}
";

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub front: String,
    pub back: String,
}

/// Field and card layout shared by every note in the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteModel {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<Template>,
    pub css: String,
}

impl NoteModel {
    pub fn greek_vocabulary(id: i64) -> Self {
        NoteModel {
            id,
            name: MODEL_NAME.to_string(),
            fields: FIELD_NAMES.iter().map(|f| f.to_string()).collect(),
            templates: vec![Template {
                name: TEMPLATE_NAME.to_string(),
                front: FRONT.to_string(),
                back: BACK.to_string(),
            }],
            css: CARD_CSS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub fields: Vec<String>, // in `NoteModel::fields` order
}

impl From<&VocabItem> for Note {
    fn from(item: &VocabItem) -> Self {
        Note {
            fields: vec![
                item.word.clone(),
                item.translation.clone(),
                item.lemma.clone(),
                item.rank.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub model: NoteModel,
    pub notes: Vec<Note>,
}

/// Ids in Anki's customary `[2^30, 2^31)` range. They are fresh on every
/// run, so a rebuilt deck never updates a previously imported one.
pub fn random_id() -> i64 {
    rand::rng().random_range((1i64 << 30)..(1i64 << 31))
}

pub fn build_deck(name: &str, items: &[VocabItem]) -> Deck {
    Deck {
        id: random_id(),
        name: name.to_string(),
        model: NoteModel::greek_vocabulary(random_id()),
        notes: items.iter().map(Note::from).collect(),
    }
}
