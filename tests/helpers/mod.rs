use anyhow::{Context, Result};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture for card and inbox files on disk.
///
/// Owns a temporary directory so every test works on its own copy and
/// nothing leaks between runs.
#[allow(dead_code)]
pub struct FileFixture {
    _temp_dir: TempDir,
    pub dir: PathBuf,
}

#[allow(dead_code)]
impl FileFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let dir = temp_dir.path().to_path_buf();
        Ok(Self {
            _temp_dir: temp_dir,
            dir,
        })
    }

    /// Write `content` under `name` and return the full path.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        std::fs::write(&path, content).context("Failed to write fixture file")?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        std::fs::read_to_string(self.dir.join(name)).context("Failed to read fixture file")
    }
}

/// A small card file as an LLM would emit it: fenced, with prose around it.
#[allow(dead_code)]
pub const FENCED_CARD_JSON: &str = r#"Here are your flashcards:

```json
[
  {"front": "What is ownership?", "back": "A set of rules", "source": "https://doc.rust-lang.org/book"},
  {"front": "What is borrowing?", "back": "Temporary access"}
]
```

Let me know if you want more."#;
