use reverie_engine::coords::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A position or anchor value.
///
/// Whether a value is a pixel count or a fraction is carried by the variant,
/// never inferred from its magnitude.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Position {
    Absolute(f32),
    Fraction(f32),
}

impl Position {
    #[inline]
    pub fn resolve(self, base: f32) -> f32 {
        match self {
            Position::Absolute(v) => v,
            Position::Fraction(f) => base * f,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::Absolute(0.0)
    }
}

/// Where a child goes inside its parent's box.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub xpos: Position,
    pub ypos: Position,
    pub xanchor: Position,
    pub yanchor: Position,
    pub xoffset: f32,
    pub yoffset: f32,
    /// Keep fractional pixel positions instead of truncating.
    pub subpixel: bool,
}

impl Placement {
    pub fn at(xpos: Position, ypos: Position) -> Self {
        Self {
            xpos,
            ypos,
            ..Self::default()
        }
    }

    pub fn anchor(mut self, xanchor: Position, yanchor: Position) -> Self {
        self.xanchor = xanchor;
        self.yanchor = yanchor;
        self
    }

    pub fn offset(mut self, xoffset: f32, yoffset: f32) -> Self {
        self.xoffset = xoffset;
        self.yoffset = yoffset;
        self
    }

    /// Centered both ways, positioned and anchored at the middle.
    pub fn center() -> Self {
        Self::at(Position::Fraction(0.5), Position::Fraction(0.5))
            .anchor(Position::Fraction(0.5), Position::Fraction(0.5))
    }

    /// Top-left corner of a child of `size` placed inside `parent`.
    ///
    /// Positions scale with the parent box, anchors with the child's own
    /// rendered size.
    pub fn place(&self, parent: Rect, size: Vec2) -> Vec2 {
        let x = self.xpos.resolve(parent.size.x) + parent.origin.x + self.xoffset
            - self.xanchor.resolve(size.x);
        let y = self.ypos.resolve(parent.size.y) + parent.origin.y + self.yoffset
            - self.yanchor.resolve(size.y);

        if self.subpixel {
            Vec2::new(x, y)
        } else {
            Vec2::new(x.trunc(), y.trunc())
        }
    }
}
