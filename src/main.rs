use std::{
    io::{
        self,
        BufRead,
        Write,
    },
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use lexitheras::{
    anki::{
        build_deck,
        write_package,
    },
    catalog::{
        CachedCatalog,
        CatalogCache,
        CatalogFetcher,
        CatalogSource,
        FileStore,
        SystemClock,
    },
    core::{
        http::HttpPageSource,
        settings::Settings,
        Catalog,
        LexitherasError,
        TextEntry,
    },
    resolver::{
        parse_selection,
        AliasTable,
        Resolution,
        ResolvedText,
        TextResolver,
    },
    vocab::VocabularyExtractor,
};

#[derive(Parser)]
#[command(name = "lexitheras", about = "Create an Anki deck from a Perseus vocabulary list", version)]
struct Cli {
    /// Text URN (e.g. urn:cts:greekLit:tlg0012.tlg001.perseus-grc2) or a search term
    #[arg(required_unless_present = "list_texts")]
    identifier: Option<String>,

    /// Output filename for the Anki deck
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name for the Anki deck
    #[arg(short = 'n', long)]
    deck_name: Option<String>,

    /// List all available texts and exit
    #[arg(short, long)]
    list_texts: bool,

    /// Only search for matching texts, do not build a deck
    #[arg(short, long)]
    search_only: bool,

    /// Ignore the cached catalog and fetch it again
    #[arg(short, long)]
    refresh: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<(), LexitherasError> {
    let settings = Settings::load();
    let pages = HttpPageSource::new(&settings)?;

    let store = FileStore::in_data_dir();
    log::debug!("Catalog cache: {}", store.path().display());
    let cache = CatalogCache::new(
        Box::new(store),
        Box::new(SystemClock),
        settings.cache_ttl(),
    );
    let catalog = CachedCatalog::new(cache, CatalogFetcher::new(&pages, &settings.catalog_url()))
        .refresh(cli.refresh);

    if cli.list_texts {
        print_catalog(&catalog.catalog()?);
        return Ok(());
    }

    let identifier = cli
        .identifier
        .as_deref()
        .ok_or_else(|| LexitherasError::Custom("No text identifier given".to_string()))?;

    let resolver = TextResolver::new(&catalog, AliasTable::load());
    let resolved = match resolver.resolve(identifier)? {
        Resolution::Resolved(resolved) => {
            println!("Found: {}", describe(&resolved));
            resolved
        }
        Resolution::NoMatch => {
            println!("No texts found matching '{}'", identifier);
            println!("Use --list-texts to see every available text.");
            return Ok(());
        }
        Resolution::Candidates(candidates) => {
            println!("Multiple texts match '{}':", identifier);
            print_candidates(&candidates);
            if cli.search_only {
                return Ok(());
            }
            let stdin = io::stdin();
            ResolvedText::from(choose_candidate(candidates, &mut stdin.lock())?)
        }
    };

    if cli.search_only {
        return Ok(());
    }

    let deck_name = cli.deck_name.clone().unwrap_or_else(|| resolved.deck_name());
    let output = cli.output.clone().unwrap_or_else(|| PathBuf::from(resolved.default_output()));

    println!("Scraping vocabulary for {}...", resolved.urn);
    let items = VocabularyExtractor::new(&pages, &settings).extract(&resolved.urn)?;
    println!("Found {} vocabulary items", items.len());

    let deck = build_deck(&deck_name, &items);
    write_package(&deck, &output)?;
    println!("Successfully created Anki deck: {}", output.display());

    Ok(())
}

fn describe(resolved: &ResolvedText) -> String {
    match &resolved.entry {
        Some(entry) => format!("{} ({})", entry.display_name(), entry.urn),
        None => resolved.urn.clone(),
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("Available texts ({}):", catalog.len());
    for (author, texts) in catalog.grouped_by_author() {
        println!("\n{}", author);
        for text in texts {
            println!("  {} - {}", text.title, text.urn);
        }
    }
}

fn print_candidates(candidates: &[TextEntry]) {
    for (i, entry) in candidates.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, entry.display_name(), entry.urn);
    }
}

/// Prompts until a valid 1-based choice is read. End of input aborts.
fn choose_candidate<R: BufRead>(
    mut candidates: Vec<TextEntry>,
    input: &mut R,
) -> Result<TextEntry, LexitherasError> {
    loop {
        print!("Select a text [1-{}]: ", candidates.len());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(LexitherasError::Custom("No text selected".to_string()));
        }

        match parse_selection(&line, candidates.len()) {
            Ok(index) => return Ok(candidates.swap_remove(index)),
            Err(e) => println!("Invalid selection: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn candidates() -> Vec<TextEntry> {
        vec![
            TextEntry::new(Some("Homer"), "Iliad", "urn:iliad", ""),
            TextEntry::new(Some("Homer"), "Odyssey", "urn:odyssey", ""),
        ]
    }

    #[test]
    fn test_choose_candidate_reprompts_on_bad_input() {
        let mut input = Cursor::new("abc\n0\n3\n2\n");
        let chosen = choose_candidate(candidates(), &mut input).unwrap();
        assert_eq!(chosen.title, "Odyssey");
    }

    #[test]
    fn test_choose_candidate_fails_at_end_of_input() {
        let mut input = Cursor::new("9\n");
        assert!(choose_candidate(candidates(), &mut input).is_err());
    }

    #[test]
    fn test_cli_requires_identifier_unless_listing() {
        assert!(Cli::try_parse_from(["lexitheras"]).is_err());
        assert!(Cli::try_parse_from(["lexitheras", "--list-texts"]).is_ok());

        let cli = Cli::try_parse_from(["lexitheras", "iliad", "-o", "out.apkg", "-n", "My deck"])
            .unwrap();
        assert_eq!(cli.identifier.as_deref(), Some("iliad"));
        assert_eq!(cli.output, Some(PathBuf::from("out.apkg")));
        assert_eq!(cli.deck_name.as_deref(), Some("My deck"));
    }
}
