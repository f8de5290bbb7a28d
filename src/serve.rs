use std::fmt;
use std::io::{BufRead, Write};
use anyhow::Context;
use crate::common::BvrDetection;
use crate::data::{FrameLine, OutputLine, TimeCalc, CROSS_MARK};
use crate::Result;

/// Anything that can turn one parsed input line into detections.
pub trait FrameDetector {
    fn detect_frame(&mut self, line: &FrameLine) -> Result<Vec<BvrDetection>>;

    /// Accumulated per-stage timings, if the detector keeps them.
    fn timings(&self) -> Option<&TimeCalc> {
        None
    }
}

/// Counters collected over one [`serve`] session.
#[derive(Debug, Default, Clone)]
pub struct ServeStats {
    pub lines_read: usize,
    pub frames_ok: usize,
    pub frame_errors: usize,
    pub line_errors: usize,
    pub blank_lines: usize,
    pub timing: TimeCalc,
}

impl ServeStats {
    /// Frames that got an output line, successful or not.
    pub fn frames_answered(&self) -> usize {
        self.frames_ok + self.frame_errors
    }
}

impl fmt::Display for ServeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lines: {} | Frames: {} ok, {} failed | Malformed lines: {} | Blank lines: {}",
               self.lines_read, self.frames_ok, self.frame_errors, self.line_errors, self.blank_lines)?;
        if self.timing.n() > 0 {
            let stage = |i| self.timing.avg_i(i).unwrap_or_default();
            write!(f, " | Avg preprocess: {:.2?} inference: {:.2?} postprocess: {:.2?}",
                   stage(0), stage(1), stage(2))?;
        }
        Ok(())
    }
}

/// Reads frames line by line from `input` until end of stream and answers each one on `output`.
///
/// Every line that parses gets exactly one output line, either a JSON array of detections or
/// `{"error": ...}`. Blank lines are skipped. Lines that don't parse get an `Error: ...` line on
/// `diagnostics` instead. Only I/O failures on the streams end the loop early.
pub fn serve<D, R, W, E>(detector: &mut D, mut input: R, mut output: W, mut diagnostics: E) -> anyhow::Result<ServeStats>
where
    D: FrameDetector + ?Sized,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut stats = ServeStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = input.read_until(b'\n', &mut buf).context("Failed to read from input stream")?;
        if n == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = String::from_utf8_lossy(&buf);
        let frame = match FrameLine::parse(&line) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                stats.blank_lines += 1;
                continue;
            }
            Err(err) => {
                stats.line_errors += 1;
                log::debug!("Line {} rejected: {}", stats.lines_read, err);
                writeln!(diagnostics, "Error: {err}").context("Failed to write to diagnostic stream")?;
                diagnostics.flush().context("Failed to flush diagnostic stream")?;
                continue;
            }
        };

        let reply = match detector.detect_frame(&frame) {
            Ok(detections) => {
                stats.frames_ok += 1;
                log::debug!("Line {}: {} detections", stats.lines_read, detections.len());
                OutputLine::from(detections)
            }
            Err(err) => {
                stats.frame_errors += 1;
                log::error!("{CROSS_MARK} Line {}: {}", stats.lines_read, err);
                OutputLine::error(err)
            }
        };

        writeln!(output, "{}", reply.to_json()?).context("Failed to write to output stream")?;
        output.flush().context("Failed to flush output stream")?;
    }

    if let Some(timing) = detector.timings() {
        stats.timing = timing.clone();
    }

    Ok(stats)
}
