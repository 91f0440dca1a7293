//! Immediate-mode 2D drawing surface
//!
//! The particle field only needs three primitives, so it draws through the
//! [`Surface`] trait. The browser backs it with a canvas 2D context; tests and
//! the CLI use [`RecordingSurface`], which keeps every command for inspection.

use std::fmt;

/// Point in surface space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 8-bit RGB with a fractional alpha, the way CSS `rgba()` spells it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }
}

/// The drawing operations the renderer issues each frame
pub trait Surface {
    /// Clear the region `[0, width] x [0, height]`
    fn clear(&mut self, width: f64, height: f64);

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
}

/// A single recorded drawing operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        width: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
}

/// Surface that records commands instead of rasterizing them.
/// Cleared commands are dropped, so the buffer always holds one frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued since the last clear (the clear included)
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }
}
