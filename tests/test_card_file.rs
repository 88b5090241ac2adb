mod helpers;

use ankipush::infrastructure::card_file;
use anyhow::Result;
use helpers::{FileFixture, FENCED_CARD_JSON};

#[test]
fn given_fenced_llm_output_when_loading_then_cards_parse_despite_prose() -> Result<()> {
    // Arrange
    let fixture = FileFixture::new()?;
    let path = fixture.write("cards.json", FENCED_CARD_JSON)?;

    // Act
    let loaded = card_file::read_card_file(&path)?;

    // Assert
    assert_eq!(loaded.drafts.len(), 2);
    assert_eq!(loaded.skipped, 0);
    assert_eq!(loaded.drafts[0].front, "What is ownership?");
    assert_eq!(
        loaded.drafts[0].source.as_deref(),
        Some("https://doc.rust-lang.org/book")
    );
    assert!(loaded.drafts[1].source.is_none());
    Ok(())
}

#[test]
fn given_bracket_inside_string_when_loading_then_array_scan_is_not_fooled() -> Result<()> {
    // Arrange
    let fixture = FileFixture::new()?;
    let path = fixture.write(
        "cards.json",
        r#"[{"front": "What does arr[0] mean?", "back": "First element ]"}]"#,
    )?;

    // Act
    let loaded = card_file::read_card_file(&path)?;

    // Assert
    assert_eq!(loaded.drafts.len(), 1);
    assert_eq!(loaded.drafts[0].front, "What does arr[0] mean?");
    Ok(())
}

#[test]
fn given_malformed_entries_when_loading_then_skipped_not_fatal() -> Result<()> {
    // Arrange - second entry has no back field
    let fixture = FileFixture::new()?;
    let path = fixture.write(
        "cards.json",
        r#"[
            {"front": "Q1", "back": "A1"},
            {"front": "Q2"},
            {"front": "Q3", "back": "A3"}
        ]"#,
    )?;

    // Act
    let loaded = card_file::read_card_file(&path)?;

    // Assert
    assert_eq!(loaded.drafts.len(), 2);
    assert_eq!(loaded.skipped, 1);
    Ok(())
}

#[test]
fn given_no_array_when_loading_then_error() -> Result<()> {
    // Arrange
    let fixture = FileFixture::new()?;
    let path = fixture.write("cards.json", "no cards here, sorry")?;

    // Act
    let result = card_file::read_card_file(&path);

    // Assert
    assert!(result.is_err());
    Ok(())
}

#[test]
fn given_inbox_records_when_loading_then_facts_and_sources_split() -> Result<()> {
    // Arrange
    let fixture = FileFixture::new()?;
    let path = fixture.write(
        "facts.txt",
        "The Rhine is 1233 km long | en.wikipedia.org/wiki/Rhine\n\n\
         Rust's borrow checker rejects aliased mutation\n\n\
         short\n",
    )?;

    // Act
    let loaded = card_file::read_fact_file(&path)?;

    // Assert
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.skipped, 1);
    assert_eq!(
        loaded.records[0].normalized_source().as_deref(),
        Some("http://en.wikipedia.org/wiki/Rhine")
    );
    assert!(loaded.records[1].source.is_none());
    Ok(())
}

#[test]
fn given_duplicate_fronts_when_cleaning_then_first_kept_and_backup_written() -> Result<()> {
    // Arrange
    let fixture = FileFixture::new()?;
    let path = fixture.write(
        "cards.json",
        r#"[
            {"front": "Q1", "back": "first"},
            {"front": "  Q1 ", "back": "second"},
            {"front": "Q2", "back": "other"}
        ]"#,
    )?;

    // Act
    let loaded = card_file::read_card_file(&path)?;
    let (kept, dropped) = card_file::dedup_drafts(loaded.drafts);
    let backup = card_file::backup_original(&path)?;
    card_file::write_card_file(&path, &kept)?;

    // Assert
    assert_eq!(kept.len(), 2);
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].back, "second");
    assert!(backup.exists());
    let rewritten = card_file::read_card_file(&path)?;
    assert_eq!(rewritten.drafts.len(), 2);
    assert_eq!(rewritten.drafts[0].back, "first");
    Ok(())
}

#[test]
fn given_clean_rewrite_when_reading_back_then_image_paths_do_not_serialize() -> Result<()> {
    // Arrange
    let fixture = FileFixture::new()?;
    let drafts = vec![ankipush::domain::CardDraft::new("Q", "A").with_image("/tmp/shot.png")];
    let path = fixture.dir.join("out.json");

    // Act
    card_file::write_card_file(&path, &drafts)?;

    // Assert
    let written = fixture.read("out.json")?;
    assert!(!written.contains("shot.png"));
    assert!(!written.contains("image"));
    Ok(())
}
