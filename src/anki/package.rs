use std::{
    fs,
    io::Write,
    path::Path,
};

use chrono::{
    DateTime,
    Utc,
};
use rusqlite::{
    params,
    Connection,
};
use serde_json::{
    json,
    Value,
};
use sha1::{
    Digest,
    Sha1,
};
use tempfile::NamedTempFile;
use uuid::Uuid;
use zip::{
    write::SimpleFileOptions,
    CompressionMethod,
    ZipWriter,
};

use super::{
    Deck,
    NoteModel,
};
use crate::core::LexitherasError;

const COLLECTION_FILE: &str = "collection.anki2";
const MEDIA_FILE: &str = "media";
const FIELD_SEPARATOR: &str = "\x1f";
const DEFAULT_DECK_ID: i64 = 1;

// Anki collection schema, version 11.
const SCHEMA: &str = "
CREATE TABLE col (
    id      integer primary key,
    crt     integer not null,
    mod     integer not null,
    scm     integer not null,
    ver     integer not null,
    dty     integer not null,
    usn     integer not null,
    ls      integer not null,
    conf    text not null,
    models  text not null,
    decks   text not null,
    dconf   text not null,
    tags    text not null
);
CREATE TABLE notes (
    id      integer primary key,
    guid    text not null,
    mid     integer not null,
    mod     integer not null,
    usn     integer not null,
    tags    text not null,
    flds    text not null,
    sfld    integer not null,
    csum    integer not null,
    flags   integer not null,
    data    text not null
);
CREATE TABLE cards (
    id      integer primary key,
    nid     integer not null,
    did     integer not null,
    ord     integer not null,
    mod     integer not null,
    usn     integer not null,
    type    integer not null,
    queue   integer not null,
    due     integer not null,
    ivl     integer not null,
    factor  integer not null,
    reps    integer not null,
    lapses  integer not null,
    left    integer not null,
    odue    integer not null,
    odid    integer not null,
    flags   integer not null,
    data    text not null
);
CREATE TABLE revlog (
    id      integer primary key,
    cid     integer not null,
    usn     integer not null,
    ease    integer not null,
    ivl     integer not null,
    lastIvl integer not null,
    factor  integer not null,
    time    integer not null,
    type    integer not null
);
CREATE TABLE graves (
    usn     integer not null,
    oid     integer not null,
    type    integer not null
);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
";

const LATEX_PRE: &str = "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n";
const LATEX_POST: &str = "\\end{document}";

/// Writes `deck` as an `.apkg` archive: a SQLite collection plus an empty
/// media manifest, zipped together. The archive is built next to `path` and
/// renamed into place, so a failed write never leaves a partial file there.
pub fn write_package(deck: &Deck, path: &Path) -> Result<(), LexitherasError> {
    let workdir = tempfile::tempdir()?;
    let db_path = workdir.path().join(COLLECTION_FILE);

    let mut conn = Connection::open(&db_path)?;
    write_collection(&mut conn, deck, Utc::now())?;
    conn.close().map_err(|(_, e)| e)?;

    let out_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut archive = NamedTempFile::new_in(out_dir)?;

    let mut zip = ZipWriter::new(archive.as_file_mut());
    zip.start_file(COLLECTION_FILE, file_options())?;
    zip.write_all(&fs::read(&db_path)?)?;
    zip.start_file(MEDIA_FILE, file_options())?;
    zip.write_all(b"{}")?;
    zip.finish()?;

    archive.persist(path).map_err(|e| e.error)?;

    log::info!("Wrote {} notes to {}", deck.notes.len(), path.display());
    Ok(())
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn write_collection(
    conn: &mut Connection,
    deck: &Deck,
    now: DateTime<Utc>,
) -> Result<(), LexitherasError> {
    let now_secs = now.timestamp();
    let now_millis = now.timestamp_millis();

    conn.execute_batch(SCHEMA)?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO col VALUES (1, ?1, ?2, ?2, 11, 0, 0, 0, ?3, ?4, ?5, ?6, '{}')",
        params![
            now_secs,
            now_millis,
            collection_conf().to_string(),
            models_json(&deck.model, deck.id, now_secs).to_string(),
            decks_json(deck, now_secs).to_string(),
            deck_options_json().to_string(),
        ],
    )?;

    for (i, note) in deck.notes.iter().enumerate() {
        let note_id = now_millis + i as i64;
        let sort_field = note.fields.first().map(String::as_str).unwrap_or_default();

        tx.execute(
            "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
            params![
                note_id,
                Uuid::new_v4().simple().to_string(),
                deck.model.id,
                now_secs,
                note.fields.join(FIELD_SEPARATOR),
                sort_field,
                field_checksum(sort_field),
            ],
        )?;

        for ord in 0..deck.model.templates.len() {
            tx.execute(
                "INSERT INTO cards VALUES (?1, ?2, ?3, ?4, ?5, -1, 0, 0, ?6, 0, 0, 0, 0, 0, 0, 0, 0, '')",
                params![
                    note_id * 10 + ord as i64,
                    note_id,
                    deck.id,
                    ord as i64,
                    now_secs,
                    i as i64 + 1,
                ],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

/// First 32 bits of the SHA-1 of the sort field, which Anki uses for
/// duplicate detection.
fn field_checksum(field: &str) -> i64 {
    let digest = Sha1::digest(field.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as i64
}

fn collection_conf() -> Value {
    json!({
        "activeDecks": [DEFAULT_DECK_ID],
        "curDeck": DEFAULT_DECK_ID,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": null,
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true,
    })
}

fn models_json(model: &NoteModel, deck_id: i64, now_secs: i64) -> Value {
    let fields: Vec<Value> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "name": name,
                "ord": ord,
                "sticky": false,
                "rtl": false,
                "font": "Arial",
                "size": 20,
                "media": [],
            })
        })
        .collect();

    let templates: Vec<Value> = model
        .templates
        .iter()
        .enumerate()
        .map(|(ord, template)| {
            json!({
                "name": template.name,
                "ord": ord,
                "qfmt": template.front,
                "afmt": template.back,
                "did": null,
                "bqfmt": "",
                "bafmt": "",
            })
        })
        .collect();

    // Each card only needs its first field to be non-empty.
    let requirements: Vec<Value> =
        (0..model.templates.len()).map(|ord| json!([ord, "all", [0]])).collect();

    let mut models = serde_json::Map::new();
    models.insert(
        model.id.to_string(),
        json!({
            "id": model.id,
            "name": model.name,
            "type": 0,
            "mod": now_secs,
            "usn": -1,
            "sortf": 0,
            "did": deck_id,
            "tmpls": templates,
            "flds": fields,
            "css": model.css,
            "latexPre": LATEX_PRE,
            "latexPost": LATEX_POST,
            "tags": [],
            "vers": [],
            "req": requirements,
        }),
    );
    Value::Object(models)
}

fn deck_json(id: i64, name: &str, now_secs: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "desc": "",
        "mod": now_secs,
        "usn": -1,
        "collapsed": false,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0],
        "conf": 1,
        "dyn": 0,
        "extendNew": 10,
        "extendRev": 50,
    })
}

fn decks_json(deck: &Deck, now_secs: i64) -> Value {
    let mut decks = serde_json::Map::new();
    decks.insert(DEFAULT_DECK_ID.to_string(), deck_json(DEFAULT_DECK_ID, "Default", 0));
    decks.insert(deck.id.to_string(), deck_json(deck.id, &deck.name, now_secs));
    Value::Object(decks)
}

fn deck_options_json() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true,
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0,
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100,
            },
        }
    })
}
