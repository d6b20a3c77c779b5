use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::record::{ScoreRecord, ScoreSelection};
use crate::error::{Result, ResultExt};

/// Destination for flushed score history.
pub trait ScoreSink: Debug + Send {
    /// Writes one buffered batch of records.
    fn write(&mut self, records: &[ScoreRecord], selection: ScoreSelection) -> Result<()>;
}

/// Writes score history to a file as tab-separated rows.
///
/// A batch whose first record is generation 0 starts a new run and truncates
/// the file; any other batch is appended.
#[derive(Debug, Clone)]
pub struct FileScoreSink {
    path: PathBuf,
}

impl FileScoreSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreSink for FileScoreSink {
    fn write(&mut self, records: &[ScoreRecord], selection: ScoreSelection) -> Result<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        let mut options = OpenOptions::new();
        if first.generation == 0 {
            options.write(true).create(true).truncate(true);
        } else {
            options.append(true).create(true);
        }
        let file = options
            .open(&self.path)
            .context(format!("opening score file {}", self.path.display()))?;

        let mut out = BufWriter::new(file);
        for record in records {
            writeln!(out, "{}", record.to_row(selection))?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::record::ScoreSummary;

    fn records(from: usize, to: usize) -> Vec<ScoreRecord> {
        (from..to)
            .map(|g| {
                ScoreRecord::new(
                    g,
                    ScoreSummary {
                        mean: g as f64,
                        max: g as f64,
                        ..ScoreSummary::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_truncate_then_append() {
        let path = std::env::temp_dir().join(format!("evopop-sink-{}.dat", std::process::id()));
        let mut sink = FileScoreSink::new(&path);

        sink.write(&records(0, 2), ScoreSelection::MAX).unwrap();
        sink.write(&records(2, 4), ScoreSelection::MAX).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "0\t0\n1\t1\n2\t2\n3\t3\n");

        // a new run starts over
        sink.write(&records(0, 1), ScoreSelection::MAX).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "0\t0\n");

        std::fs::remove_file(&path).unwrap();
    }
}
