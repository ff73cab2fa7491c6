// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Pretty printers for reporting information.
use std::{borrow::Cow, sync::Mutex};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNING_PRINTER: Mutex<WarningPrinter> = Mutex::new(WarningPrinter::new());
}

/// Tree-drawing symbol for line `i_line` of block `i_block`.
fn symbol(i_line: usize, num_lines: usize, i_block: usize, num_blocks: usize) -> char {
    match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
        (0, false, _) => VERTICAL_AND_RIGHT,
        (0, _, false) => VERTICAL_AND_RIGHT,
        (0, true, true) => UP_AND_RIGHT,
        _ => VERTICAL,
    }
}

/// A titled block of information, printed at info level.
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Vec<Cow<'static, str>>>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Vec<Cow<'static, str>>) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(self.title).bold());
        let num_blocks = self.blocks.len();
        for (i_block, block) in self.blocks.into_iter().enumerate() {
            let num_lines = block.len();
            for (i_line, line) in block.into_iter().enumerate() {
                log::info!("{} {line}", symbol(i_line, num_lines, i_block, num_blocks));
            }
        }
        log::info!("");
    }
}

struct WarningPrinter {
    blocks: Vec<Vec<Cow<'static, str>>>,
}

impl WarningPrinter {
    fn new() -> Self {
        Self { blocks: vec![] }
    }

    fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    fn display(&mut self) {
        log::debug!("Displaying warnings");
        if self.blocks.is_empty() {
            return;
        }

        log::warn!("{}", console::style("Warnings").bold());
        let num_blocks = self.blocks.len();
        for (i_block, block) in self.blocks.iter().enumerate() {
            let num_lines = block.len();
            for (i_line, line) in block.iter().enumerate() {
                log::warn!("{} {line}", symbol(i_line, num_lines, i_block, num_blocks));
            }
        }
        log::warn!("");
        self.blocks.clear();
    }
}

/// Things that can be queued up as warnings, to be printed together by
/// [`display_warnings`].
pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().push_line(self.into());
    }
}

impl Warn for String {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().push_line(self.into());
    }
}

/// Print out any warnings that have been collected, then forget them.
pub(crate) fn display_warnings() {
    WARNING_PRINTER.lock().unwrap().display();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        // A single line in a single block.
        assert_eq!(symbol(0, 1, 0, 1), UP_AND_RIGHT);
        // The first line of a multi-line block.
        assert_eq!(symbol(0, 3, 0, 1), VERTICAL_AND_RIGHT);
        // Continuation lines.
        assert_eq!(symbol(1, 3, 0, 1), VERTICAL);
        assert_eq!(symbol(2, 3, 0, 1), VERTICAL);
        // A single line that isn't the last block.
        assert_eq!(symbol(0, 1, 0, 2), VERTICAL_AND_RIGHT);
        assert_eq!(symbol(0, 1, 1, 2), UP_AND_RIGHT);
    }

    #[test]
    fn test_warnings_are_cleared_once_displayed() {
        let mut printer = WarningPrinter::new();
        printer.push_line("first".into());
        printer.push_line(format!("second {}", 2).into());
        assert_eq!(printer.blocks.len(), 2);
        printer.display();
        assert!(printer.blocks.is_empty());
    }
}
