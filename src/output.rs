//! Relation record serialisation and run statistics.

use clap::ValueEnum;
use std::io::Write;
use std::time::Duration;

use crate::error::Result;
use crate::extract::RelationRecord;

/// Line format for emitted relation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `<lang>:<title>\trel:<kind>\t<lang>:<word>`
    #[default]
    Tsv,
    /// One JSON object per line
    Jsonl,
}

pub fn write_record<W: Write>(writer: &mut W, record: &RelationRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Tsv => writeln!(writer, "{}", record)?,
        OutputFormat::Jsonl => {
            serde_json::to_writer(&mut *writer, record)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct Stats {
    pub pages_processed: usize,
    pub pages_with_relations: usize,
    pub records_written: usize,
    pub elapsed: Duration,
}

impl Stats {
    pub fn print(&self, strategy_name: &str) {
        println!();
        println!("============================================================");
        println!("Strategy: {}", strategy_name);
        println!("Pages processed: {}", self.pages_processed);
        println!("Pages with relations: {}", self.pages_with_relations);
        println!("Relations written: {}", self.records_written);
        println!(
            "Avg relations/page: {:.2}",
            self.records_written as f64 / self.pages_with_relations.max(1) as f64
        );
        println!("Time: {}m {}s", self.elapsed.as_secs() / 60, self.elapsed.as_secs() % 60);
        println!(
            "Rate: {:.0} pages/sec",
            self.pages_processed as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
        );
        println!("============================================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{RelationKind, Word};

    fn record() -> RelationRecord {
        RelationRecord {
            source: Word::new("en", "dog"),
            kind: RelationKind::Inherited,
            target: Word::new("enm", "dogge"),
        }
    }

    #[test]
    fn tsv_line() {
        let mut out = Vec::new();
        write_record(&mut out, &record(), OutputFormat::Tsv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "en:dog\trel:inherited\tenm:dogge\n");
    }

    #[test]
    fn jsonl_line_round_trips() {
        let mut out = Vec::new();
        write_record(&mut out, &record(), OutputFormat::Jsonl).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.ends_with('\n'));
        let parsed: RelationRecord = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed, record());
    }
}
