//! Human-readable report.
//!
//! ```text
//! photos
//!   /r1/photos  1.5 KB  2024-03-01 10:00:00
//!   /r2/photos  100 B   2024-03-01 10:00:00
//!
//! 1 duplicate pair
//! ```

use std::fmt::Display;
use std::io;

use yansi::{Color, Paint, Style};

use super::{PairRecord, SideRecord};

const NAME_STYLE: Style = Style::new().fg(Color::Cyan).bold();
const SIZE_STYLE: Style = Style::new().fg(Color::Green);
const DIM_STYLE: Style = Style::new().dim();

/// Plain text formatter.
pub struct TextOutput<'a> {
    records: &'a [PairRecord],
}

impl<'a> TextOutput<'a> {
    /// Create a text formatter.
    #[must_use]
    pub fn new(records: &'a [PairRecord]) -> Self {
        Self { records }
    }

    /// Write the report. `colored` enables ANSI styling.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn write_to<W: io::Write>(&self, mut writer: W, colored: bool) -> io::Result<()> {
        let path_width = self
            .records
            .iter()
            .flat_map(|r| [r.first.path.chars().count(), r.second.path.chars().count()])
            .max()
            .unwrap_or(0);
        let size_width = self
            .records
            .iter()
            .flat_map(|r| [r.first.size_display.len(), r.second.size_display.len()])
            .max()
            .unwrap_or(0);

        for record in self.records {
            writeln!(writer, "{}", styled(&record.name, NAME_STYLE, colored))?;
            for side in [&record.first, &record.second] {
                write_side(&mut writer, side, path_width, size_width, colored)?;
            }
            writeln!(writer)?;
        }

        let count = self.records.len();
        let summary = match count {
            0 => "No duplicate directories found".to_string(),
            1 => "1 duplicate pair".to_string(),
            n => format!("{} duplicate pairs", n),
        };
        writeln!(writer, "{}", styled(summary, Style::new().bold(), colored))?;
        writer.flush()
    }

    /// Render the report to a string without colors.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buffer, false);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

fn write_side<W: io::Write>(
    writer: &mut W,
    side: &SideRecord,
    path_width: usize,
    size_width: usize,
    colored: bool,
) -> io::Result<()> {
    let line = format!(
        "  {:<pw$}  {}  {}",
        side.path,
        styled(format!("{:<sw$}", side.size_display, sw = size_width), SIZE_STYLE, colored),
        styled(&side.modified, DIM_STYLE, colored),
        pw = path_width,
    );
    writeln!(writer, "{}", line.trim_end())
}

fn styled<T: Display>(value: T, style: Style, colored: bool) -> String {
    if colored {
        value.paint(style).to_string()
    } else {
        value.to_string()
    }
}
