//! JSON adapters for the emission bridge.
//!
//! Findings come in as JSON Lines (one object per line, or any whitespace
//! separated sequence of objects). The report goes out as one JSON document:
//!
//! ```json
//! {"findings":[{...},{...}],"summary":{"tool":"...","total_findings":2,"attributes":[...]}}
//! ```
//!
//! Both sides stream; neither holds more than one finding in memory.

use std::io::{Read, Write};

use serde_json::de::IoRead;

use crate::bridge::{AttributeSummary, BridgeError, Finding, FindingSink, FindingSource};

/// Reads findings from a JSON Lines stream.
pub struct JsonLinesSource<R: Read> {
    inner: serde_json::StreamDeserializer<'static, IoRead<R>, Finding>,
    read: u64,
}

impl<R: Read> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: serde_json::Deserializer::from_reader(reader).into_iter(),
            read: 0,
        }
    }

    /// Findings successfully read so far.
    pub fn read(&self) -> u64 {
        self.read
    }
}

impl<R: Read> FindingSource for JsonLinesSource<R> {
    fn next_finding(&mut self) -> Result<Option<Finding>, BridgeError> {
        match self.inner.next() {
            None => Ok(None),
            Some(Ok(finding)) => {
                self.read += 1;
                Ok(Some(finding))
            }
            Some(Err(error)) => Err(BridgeError::Read {
                index: self.read,
                error,
            }),
        }
    }
}

/// Findings held in memory, yielded in order.
#[derive(Debug, Default)]
pub struct VecSource {
    findings: std::vec::IntoIter<Finding>,
}

impl VecSource {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self {
            findings: findings.into_iter(),
        }
    }
}

impl From<Vec<Finding>> for VecSource {
    fn from(findings: Vec<Finding>) -> Self {
        Self::new(findings)
    }
}

impl FindingSource for VecSource {
    fn next_finding(&mut self) -> Result<Option<Finding>, BridgeError> {
        Ok(self.findings.next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Fresh,
    Findings,
    Summarized,
    Finished,
}

/// Streams the filtered report as a single JSON document.
///
/// In pretty mode each finding sits on its own line and the summary is
/// indented; compact mode writes no whitespace at all.
pub struct JsonReportWriter<W: Write> {
    out: W,
    pretty: bool,
    stage: Stage,
}

impl<W: Write> JsonReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pretty: false,
            stage: Stage::Fresh,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn open(&mut self) -> Result<(), BridgeError> {
        if self.stage == Stage::Fresh {
            let header = if self.pretty {
                "{\n  \"findings\": ["
            } else {
                "{\"findings\":["
            };
            self.out.write_all(header.as_bytes())?;
        }
        Ok(())
    }

    fn close_findings(&mut self) -> Result<(), BridgeError> {
        self.open()?;
        if matches!(self.stage, Stage::Fresh | Stage::Findings) {
            let tail = match (self.pretty, self.stage) {
                (true, Stage::Findings) => "\n  ]",
                _ => "]",
            };
            self.out.write_all(tail.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> FindingSink for JsonReportWriter<W> {
    fn write_finding(&mut self, _index: u64, finding: &Finding) -> Result<(), BridgeError> {
        match self.stage {
            Stage::Fresh => self.open()?,
            Stage::Findings => self.out.write_all(b",")?,
            Stage::Summarized | Stage::Finished => {
                return Err(BridgeError::Io(std::io::Error::other(
                    "finding written after the summary",
                )));
            }
        }
        if self.pretty {
            self.out.write_all(b"\n    ")?;
        }
        serde_json::to_writer(&mut self.out, finding)?;
        self.stage = Stage::Findings;
        Ok(())
    }

    fn write_summary(&mut self, summary: &AttributeSummary) -> Result<(), BridgeError> {
        if matches!(self.stage, Stage::Summarized | Stage::Finished) {
            return Err(BridgeError::Io(std::io::Error::other("summary already written")));
        }
        self.close_findings()?;
        if self.pretty {
            self.out.write_all(b",\n  \"summary\": ")?;
            let text = serde_json::to_string_pretty(summary)?;
            self.out.write_all(text.replace('\n', "\n  ").as_bytes())?;
        } else {
            self.out.write_all(b",\"summary\":")?;
            serde_json::to_writer(&mut self.out, summary)?;
        }
        self.stage = Stage::Summarized;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), BridgeError> {
        if self.stage == Stage::Finished {
            return Ok(());
        }
        self.close_findings()?;
        let tail = if self.pretty { "\n}\n" } else { "}\n" };
        self.out.write_all(tail.as_bytes())?;
        self.out.flush()?;
        self.stage = Stage::Finished;
        Ok(())
    }
}
