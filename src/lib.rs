// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod util;

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::application::{CardSubmitter, DeckDeduper, GhostFinder, RunMode};
use crate::cli::args::{Args, Command};
use crate::constants::FRONT_PREVIEW_CHARS;
use crate::domain::NoteBuilder;
use crate::infrastructure::card_file;
use crate::infrastructure::config::Config;
use crate::infrastructure::connect::AnkiConnectClient;
use crate::infrastructure::transport::HttpTransport;
use crate::util::process;
use crate::util::text::preview;

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting ankipush with arguments");

    let config = Config::resolve(args.config.as_deref())?;
    debug!(?config, "Resolved configuration");

    match args.command {
        Command::Add {
            file,
            deck,
            allow_duplicates,
        } => run_add(&config, &file, deck, allow_duplicates),
        Command::Ghosts { file, deck, live } => run_ghosts(&config, &file, deck, live),
        Command::Dedup { deck, live } => run_dedup(&config, deck, live),
        Command::Clean { file, output } => run_clean(&file, output.as_deref()),
        Command::Inbox { file } => run_inbox(&file),
        Command::Decks => run_decks(&config),
        Command::Status { launch } => run_status(&config, launch),
    }
}

fn connect_client(config: &Config) -> Result<AnkiConnectClient<HttpTransport>> {
    let transport = HttpTransport::new(&config.connect)?;
    Ok(AnkiConnectClient::new(transport))
}

fn effective_deck(config: &Config, deck: Option<String>) -> String {
    deck.unwrap_or_else(|| config.defaults.deck.clone())
}

fn note_builder(config: &Config, deck: &str, allow_duplicates: bool) -> NoteBuilder {
    NoteBuilder::new(deck, config.defaults.model.as_str())
        .with_fields(
            config.defaults.front_field.as_str(),
            config.defaults.back_field.as_str(),
        )
        .with_allow_duplicate(allow_duplicates || config.defaults.allow_duplicate)
        .with_tags(config.defaults.tags.clone())
}

fn run_add(config: &Config, file: &Path, deck: Option<String>, allow_duplicates: bool) -> Result<()> {
    let loaded = card_file::read_card_file(file)?;
    if loaded.drafts.is_empty() {
        bail!("No usable cards in {}", file.display());
    }

    let deck = effective_deck(config, deck);
    let client = connect_client(config)?;
    if client.ensure_deck(&deck).context("Failed to prepare deck")? {
        println!("Created deck \"{}\"", deck);
    }

    info!(file = %file.display(), deck = %deck, cards = loaded.drafts.len(), "Submitting card file");
    let submitter = CardSubmitter::new(client, note_builder(config, &deck, allow_duplicates));
    let report = submitter.submit_all(&loaded.drafts);

    println!(
        "Added {} of {} cards to \"{}\" ({} skipped as malformed)",
        report.succeeded,
        report.attempted(),
        deck,
        loaded.skipped
    );
    if !report.all_succeeded() {
        bail!("{} of {} cards failed", report.failures.len(), report.attempted());
    }
    if loaded.skipped > 0 {
        bail!("{} card entries were malformed", loaded.skipped);
    }
    Ok(())
}

fn run_ghosts(config: &Config, file: &Path, deck: Option<String>, live: bool) -> Result<()> {
    let loaded = card_file::read_card_file(file)?;
    let deck = effective_deck(config, deck);
    let client = connect_client(config)?;

    let finder = GhostFinder::new(client, deck.as_str(), config.defaults.front_field.as_str());
    let report = finder
        .reconcile(&loaded.drafts, RunMode::from_live_flag(live))
        .context("Ghost reconciliation failed")?;

    for ghost in &report.ghosts {
        println!(
            "ghost {}: {}",
            ghost.note_id,
            preview(&ghost.front, FRONT_PREVIEW_CHARS)
        );
    }
    if live {
        println!(
            "Found {} ghost notes in \"{}\", deleted {}",
            report.ghosts.len(),
            deck,
            report.notes_deleted
        );
    } else {
        println!(
            "Found {} ghost notes in \"{}\" (dry run, pass --live to delete)",
            report.ghosts.len(),
            deck
        );
    }
    Ok(())
}

fn run_dedup(config: &Config, deck: Option<String>, live: bool) -> Result<()> {
    let deck = effective_deck(config, deck);
    let client = connect_client(config)?;

    let deduper = DeckDeduper::new(client, deck.as_str(), config.defaults.front_field.as_str());
    let report = deduper
        .dedup(RunMode::from_live_flag(live))
        .context("Deck deduplication failed")?;

    for group in &report.groups {
        println!(
            "{} copies of: {} (keeping {})",
            group.delete.len() + 1,
            preview(&group.front, FRONT_PREVIEW_CHARS),
            group.keep
        );
    }
    println!(
        "{} notes, {} unique fronts, {} duplicate groups, {} duplicates",
        report.total_notes,
        report.unique_fronts,
        report.groups.len(),
        report.duplicates_found()
    );
    if live {
        println!("Deleted {} notes from \"{}\"", report.notes_deleted, deck);
    } else if report.duplicates_found() > 0 {
        println!("Dry run, pass --live to delete");
    }
    Ok(())
}

fn run_clean(file: &Path, output: Option<&Path>) -> Result<()> {
    let loaded = card_file::read_card_file(file)?;
    let total = loaded.drafts.len();
    let (kept, dropped) = card_file::dedup_drafts(loaded.drafts);

    for draft in &dropped {
        println!("Dropping duplicate: {}", preview(&draft.front, FRONT_PREVIEW_CHARS));
    }

    match output {
        Some(out) => card_file::write_card_file(out, &kept)?,
        None => {
            let backup = card_file::backup_original(file)?;
            println!("Original backed up to {}", backup.display());
            card_file::write_card_file(file, &kept)?;
        }
    }
    println!(
        "Kept {} of {} cards, dropped {} duplicates ({} skipped as malformed)",
        kept.len(),
        total,
        dropped.len(),
        loaded.skipped
    );
    Ok(())
}

fn run_inbox(file: &Path) -> Result<()> {
    let loaded = card_file::read_fact_file(file)?;

    for record in &loaded.records {
        match &record.source {
            Some(source) => println!(
                "{} [{}]",
                preview(&record.fact, FRONT_PREVIEW_CHARS),
                source
            ),
            None => println!("{}", preview(&record.fact, FRONT_PREVIEW_CHARS)),
        }
    }
    println!(
        "{} facts queued, {} records skipped",
        loaded.records.len(),
        loaded.skipped
    );
    Ok(())
}

fn run_decks(config: &Config) -> Result<()> {
    let client = connect_client(config)?;
    let mut decks = client.deck_names().context("Failed to list decks")?;
    decks.sort();

    for deck in &decks {
        println!("{}", deck);
    }
    println!("{} decks", decks.len());
    Ok(())
}

fn run_status(config: &Config, launch: bool) -> Result<()> {
    let client = connect_client(config)?;
    let probe = || client.version().is_ok();

    let up = if launch {
        process::ensure_running(probe, &config.launch)?
    } else {
        probe()
    };
    if !up {
        bail!("AnkiConnect is not reachable at {}", config.connect.endpoint);
    }

    let version = client.version().context("AnkiConnect went away")?;
    println!(
        "AnkiConnect v{} reachable at {}",
        version, config.connect.endpoint
    );
    Ok(())
}

#[cfg(test)]
/// must be public to be used from integration tests
mod tests {
    use crate::util::testing;
    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }
}
