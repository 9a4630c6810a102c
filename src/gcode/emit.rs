//! G-code text generation

use super::segment::{Row, Segment};
use crate::config::EngraveOptions;

/// Format a coordinate in millimeters, rounded to 3 decimal places.
///
/// Trailing zeros are dropped but one decimal digit is always kept, and
/// -0 prints as 0.0.
pub fn mm(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    let mut s = format!("{:.3}", rounded);
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

/// Ordered list of G-code instructions, one per line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolpathProgram {
    lines: Vec<String>,
}

impl ToolpathProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Serialize with one instruction per line
    pub fn to_gcode(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub(crate) fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub(crate) fn extend<I: IntoIterator<Item = String>>(&mut self, lines: I) {
        self.lines.extend(lines);
    }
}

/// Units, positioning mode, laser off and engraving feed rate
pub fn push_preamble(program: &mut ToolpathProgram, options: &EngraveOptions) {
    program.push("G21 ; Set units to mm");
    program.push("G90 ; Absolute positioning");
    program.push("M5 ; Laser off");
    program.push(format!(
        "G1 F{} ; Set feed rate for engraving",
        options.feed_rate
    ));
}

/// Return home, make sure the laser is off and end the program
pub fn push_footer(program: &mut ToolpathProgram) {
    program.push("G0 X0 Y0 ; Return to origin");
    program.push("M5 ; Ensure laser is off");
    program.push("M30 ; End of program");
}

fn push_segment(program: &mut ToolpathProgram, segment: &Segment, pixel_size: f64) {
    program.push(format!(
        "G1 X{} Y{} S{}",
        mm(segment.end_column as f64 * pixel_size),
        mm(segment.row as f64 * pixel_size),
        segment.power
    ));
}

/// Emit one engraved row: laser on, one move per segment, laser off, then a
/// fast return to column 0 and the engraving feed rate again.
///
/// Blank rows emit nothing. Returns the number of lines written.
pub fn push_row(
    program: &mut ToolpathProgram,
    y: u32,
    row: &Row,
    options: &EngraveOptions,
) -> usize {
    let segments = match row {
        Row::Blank => return 0,
        Row::Engraved(segments) => segments,
    };

    let before = program.len();
    let pixel_size = options.pixel_size_mm();
    let y_mm = mm(y as f64 * pixel_size);

    program.push(format!("; Row {}", y));
    program.push("M03 ; Laser on");
    for segment in segments {
        debug_assert_eq!(segment.row, y);
        push_segment(program, segment, pixel_size);
    }
    program.push("M5 ; Laser off");
    program.push(format!(
        "G1 X0 Y{} F{} ; Fast return",
        y_mm, options.fast_return_rate
    ));
    program.push(format!("G1 F{}", options.feed_rate));

    program.len() - before
}
