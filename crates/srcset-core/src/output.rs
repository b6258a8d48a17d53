//! Output formatting for generated records.
//!
//! Records can be written as a JSON array, as JSON Lines, or as ready-to-paste
//! HTML attribute strings.

use std::io::{self, Write};

use crate::types::GeneratedRecord;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
    /// `<src>: name="value" ...`, one record per line
    Attributes,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            "attrs" | "attributes" | "html" => Some(Self::Attributes),
            _ => None,
        }
    }
}

/// A writer that serializes records in one of the [`OutputFormat`]s.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single record.
    pub fn write(&mut self, record: &GeneratedRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, record)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Attributes => {
                writeln!(
                    self.writer,
                    "{}: {}",
                    record.src,
                    record.attributes.to_attribute_string()
                )?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple records.
    ///
    /// For JSON format, writes a JSON array; otherwise one record per line.
    pub fn write_all(&mut self, records: &[GeneratedRecord]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, records)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, records).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += records.len();
            }
            OutputFormat::JsonLines | OutputFormat::Attributes => {
                for record in records {
                    self.write(record)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of records written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
