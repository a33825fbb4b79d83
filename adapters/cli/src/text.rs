use std::fmt;

use anyhow::{bail, Result};
use glam::Vec2;
use transience_rendering::Presenter;

/// Character grid filled through the rendering contract, one cell per tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TextFrame {
    width: usize,
    cells: Vec<char>,
}

impl TextFrame {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let width = width as usize;
        Self {
            width,
            cells: vec![' '; width * height as usize],
        }
    }

    fn height(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }
}

impl Presenter for TextFrame {
    fn render(&mut self, glyph: char, screen_position: Vec2, center_anchored: bool) -> Result<()> {
        let corner = if center_anchored {
            screen_position - Vec2::splat(0.5)
        } else {
            screen_position
        };
        let cell = corner.round();
        if cell.x < 0.0
            || cell.y < 0.0
            || cell.x as usize >= self.width
            || cell.y as usize >= self.height()
        {
            bail!("glyph {glyph:?} at {screen_position} falls outside the frame");
        }

        let index = cell.y as usize * self.width + cell.x as usize;
        self.cells[index] = glyph;
        Ok(())
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.cells.chunks(self.width) {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
