// src/readers/crashreader.rs

//! The [`CrashReader`]: one sequential pass over a fatal error log,
//! classify → parse → absorb, yielding a sealed [`CrashModel`].
//!
//! File I/O problems at open are the only user-visible failure of the
//! whole pipeline; every line of the file itself is absorbed, however
//! malformed.
//!
//! [`CrashModel`]: crate::data::model::CrashModel

use std::fs::File;
use std::io::{BufRead, BufReader};

use ::si_trace_print::{defn, defo, defx};

use crate::common::{Count, FPath};
use crate::data::classifier::parse_line;
use crate::data::event::{Event, EventKind};
use crate::data::model::CrashModel;

/// Per-file read statistics, filled during [`CrashReader::process`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadSummary {
    /// Lines read from the file.
    pub lines_read: Count,
    /// Lines classified as some modeled event kind.
    pub events_recognized: Count,
    /// Lines classified [`EventKind::Unknown`].
    pub lines_unidentified: Count,
}

/// Reads one crash log file and assembles the model.
pub struct CrashReader {
    path: FPath,
    summary: ReadSummary,
}

impl CrashReader {
    pub fn new(path: FPath) -> CrashReader {
        CrashReader {
            path,
            summary: ReadSummary::default(),
        }
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub fn summary(&self) -> ReadSummary {
        self.summary
    }

    /// Read the file line by line and absorb every line into a fresh
    /// model. Fails only when the file cannot be opened or read.
    pub fn process(&mut self) -> std::io::Result<CrashModel> {
        defn!("({:?})", self.path);
        let file: File = File::open(self.path.as_str())?;
        let reader: BufReader<File> = BufReader::new(file);
        let mut model: CrashModel = CrashModel::new();
        for line in reader.lines() {
            let line: String = line?;
            self.summary.lines_read += 1;
            let event: Event = parse_line(line.as_str());
            match event.kind() {
                EventKind::Unknown => self.summary.lines_unidentified += 1,
                _ => self.summary.events_recognized += 1,
            }
            model.absorb(event);
        }
        defo!("{:?}", self.summary);
        defx!();
        Ok(model)
    }
}
