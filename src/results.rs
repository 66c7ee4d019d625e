//! Trial tables on disk.
//!
//! One trial per line as `total_players,iteration,best_player`, without a header.

use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, TournamentError};
use crate::experiment::TrialRecord;

/// Timestamped name for a freshly simulated table, e.g. `tournaments_2024-03-09-17-05-44.csv`.
pub fn default_table_file_name(now: NaiveDateTime) -> String {
    format!("tournaments_{}.csv", now.format("%Y-%m-%d-%H-%M-%S"))
}

/// Appends trials to a table file.
pub struct TrialWriter {
    writer: BufWriter<File>,
    written: usize,
}

impl TrialWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!("writing trials to {}", path.display());
        Ok(TrialWriter {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn append(&mut self, records: &[TrialRecord]) -> Result<()> {
        for record in records {
            writeln!(
                self.writer,
                "{},{},{}",
                record.total_players, record.iteration, record.best_player
            )?;
        }
        self.written += records.len();
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered rows; the writer must be finished for the table to be complete.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        info!("wrote {} trials", self.written);
        Ok(self.written)
    }
}

/// Streams trials back out of a table file.
pub struct TrialReader {
    lines: Lines<BufReader<File>>,
    line: usize,
}

impl TrialReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!("reading trials from {}", path.display());
        Ok(TrialReader {
            lines: BufReader::new(file).lines(),
            line: 0,
        })
    }
}

impl Iterator for TrialReader {
    type Item = Result<TrialRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(parse_record(line, self.line));
        }
    }
}

fn parse_record(line: &str, line_number: usize) -> Result<TrialRecord> {
    let parse_error = |reason: String| TournamentError::Parse {
        line: line_number,
        reason,
    };

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(parse_error(format!("expected 3 fields, got {}", parts.len())));
    }

    let total_players = parts[0]
        .parse()
        .map_err(|e| parse_error(format!("invalid player count '{}': {}", parts[0], e)))?;
    let iteration = parts[1]
        .parse()
        .map_err(|e| parse_error(format!("invalid iteration '{}': {}", parts[1], e)))?;
    let best_player = parts[2]
        .parse()
        .map_err(|e| parse_error(format!("invalid best player '{}': {}", parts[2], e)))?;

    Ok(TrialRecord {
        total_players,
        iteration,
        best_player,
    })
}

pub fn write_trials(path: impl AsRef<Path>, records: &[TrialRecord]) -> Result<()> {
    let mut writer = TrialWriter::create(path)?;
    writer.append(records)?;
    writer.finish()?;
    Ok(())
}

pub fn read_trials(path: impl AsRef<Path>) -> Result<Vec<TrialRecord>> {
    TrialReader::open(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn sample() -> Vec<TrialRecord> {
        vec![
            TrialRecord { total_players: 2, iteration: 0, best_player: 1 },
            TrialRecord { total_players: 2, iteration: 1, best_player: 0 },
            TrialRecord { total_players: 3, iteration: 0, best_player: -1 },
        ]
    }

    #[test]
    fn test_default_table_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(17, 5, 44)
            .unwrap();
        assert_eq!(default_table_file_name(now), "tournaments_2024-03-09-17-05-44.csv");
    }

    #[test]
    fn test_written_table_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trials.csv");
        write_trials(&path, &sample()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "2,0,1\n2,1,0\n3,0,-1\n");
        assert_eq!(read_trials(&path).unwrap(), sample());
    }

    #[test]
    fn test_blank_lines_and_whitespace_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trials.csv");
        fs::write(&path, "\n 5, 7 ,4\n\n6,0,-1\n").unwrap();
        let records = read_trials(&path).unwrap();
        assert_eq!(
            records,
            vec![
                TrialRecord { total_players: 5, iteration: 7, best_player: 4 },
                TrialRecord { total_players: 6, iteration: 0, best_player: -1 },
            ]
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trials.csv");
        fs::write(&path, "2,0,1\n\n2,1\n").unwrap();
        match read_trials(&path) {
            Err(TournamentError::Parse { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("expected 3 fields"), "{}", reason);
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        fs::write(&path, "2,zero,1\n").unwrap();
        assert!(matches!(read_trials(&path), Err(TournamentError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_trials(dir.path().join("absent.csv")),
            Err(TournamentError::Io(_))
        ));
    }

    #[test]
    fn test_writer_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = TrialWriter::create(dir.path().join("trials.csv")).unwrap();
        writer.append(&sample()).unwrap();
        writer.append(&sample()[..1]).unwrap();
        assert_eq!(writer.written(), 4);
        assert_eq!(writer.finish().unwrap(), 4);
    }
}
