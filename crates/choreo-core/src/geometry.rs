//! Rectangles, vertical extents and CSS-like root margins
//!
//! All coordinates are in the owning container's content space: `top = 0`
//! is the first row of content, and the viewport is the window
//! `[position, position + viewport_height)` over it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    #[inline]
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Intersection with another rectangle, `None` when they do not touch
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Share of `self` covered by `root`, in [0, 1]
    ///
    /// Zero-area rectangles count as fully covered while they touch the root.
    pub fn intersection_ratio(&self, root: &Rect) -> f64 {
        let Some(overlap) = self.intersection(root) else {
            return 0.0;
        };
        let area = self.area();
        if area <= 0.0 {
            return 1.0;
        }
        (overlap.area() / area).clamp(0.0, 1.0)
    }

    /// Grow (positive) or shrink (negative) each side by the margin
    pub fn expand(&self, margin: &RootMargin) -> Rect {
        let top = margin.top.resolve(self.height);
        let right = margin.right.resolve(self.width);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        Rect::new(
            self.left - left,
            self.top - top,
            (self.width + left + right).max(0.0),
            (self.height + top + bottom).max(0.0),
        )
    }
}

/// Vertical span of a content unit inside its container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub top: f64,
    pub height: f64,
}

impl Extent {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Length of the overlap with another extent (never negative)
    pub fn overlap(&self, other: &Extent) -> f64 {
        (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0)
    }

    /// Lay extents out back to back from `top`, separated by `gap`
    pub fn stack(heights: &[f64], gap: f64) -> Vec<Extent> {
        let mut top = 0.0;
        heights
            .iter()
            .map(|&height| {
                let extent = Extent::new(top, height);
                top += height + gap;
                extent
            })
            .collect()
    }
}

/// One side of a root margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarginValue {
    Px(f64),
    /// Percentage of the root's size along the same axis
    Percent(f64),
}

impl Default for MarginValue {
    fn default() -> Self {
        MarginValue::Px(0.0)
    }
}

impl MarginValue {
    #[inline]
    pub fn resolve(&self, basis: f64) -> f64 {
        match *self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => basis * pct / 100.0,
        }
    }

    fn parse(token: &str) -> Result<Self> {
        let invalid = || Error::InvalidRootMargin(format!("bad length {token:?}"));
        if let Some(number) = token.strip_suffix('%') {
            number.parse().map(MarginValue::Percent).map_err(|_| invalid())
        } else if let Some(number) = token.strip_suffix("px") {
            number.parse().map(MarginValue::Px).map_err(|_| invalid())
        } else if token == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

/// Offsets applied to the root before intersecting, CSS order (t, r, b, l)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    /// Parse "10px", "10px 5%", "0px 0px -20% 0px" etc. with CSS shorthand rules
    pub fn parse(input: &str) -> Result<Self> {
        let values = input
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Result<Vec<_>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => {
                return Err(Error::InvalidRootMargin(format!(
                    "expected 1 to 4 values, got {input:?}"
                )))
            }
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl std::str::FromStr for RootMargin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
