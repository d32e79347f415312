use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::card::Flashcard;

pub const DEFAULT_EXPORT_DIR: &str = "flashcards";

/// Where one saved batch landed on disk.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Write a batch as both CSV and pretty-printed JSON under `dir`, creating
/// the directory on first use. Filenames derive from the generation time, so
/// saving the same batch twice overwrites in place.
pub fn save_cards(dir: &Path, cards: &[Flashcard], generated_at: DateTime<Local>) -> Result<ExportPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let base = timestamped_basename(generated_at);
    let csv = dir.join(format!("{base}.csv"));
    let json = dir.join(format!("{base}.json"));

    write_csv(&csv, cards)?;
    write_json(&json, cards)?;

    Ok(ExportPaths { csv, json })
}

pub fn timestamped_basename(generated_at: DateTime<Local>) -> String {
    format!("flashcards_{}", generated_at.format("%Y%m%d_%H%M%S"))
}

fn write_csv(path: &Path, cards: &[Flashcard]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["question", "answer"])?;
    for card in cards {
        writer.write_record([card.question.as_str(), card.answer.as_str()])?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn write_json(path: &Path, cards: &[Flashcard]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, cards)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
