//! Per-unit visibility and opacity inside a scrolled container
//!
//! Recomputed on every scroll or resize of the owning container from the
//! unit extents (content coordinates) and the current viewport.

use crate::config::{VisibilityConfig, VisibilityPolicyKind};
use crate::geometry::Extent;
use crate::{Error, Result};

/// Overlap a unit needs before the distance policy calls it visible
const DISTANCE_VISIBLE_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisibilityPolicy {
    /// Binary: full opacity once `fraction` of the unit is on screen
    Threshold { fraction: f64, dim_opacity: f64 },
    /// Fade with distance from the viewport centre
    Distance { min_opacity: f64, falloff: f64 },
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        VisibilityPolicy::Distance {
            min_opacity: 0.2,
            falloff: 0.8,
        }
    }
}

impl VisibilityPolicy {
    pub fn from_config(config: &VisibilityConfig) -> Result<Self> {
        let policy = match config.policy {
            VisibilityPolicyKind::Threshold => VisibilityPolicy::Threshold {
                fraction: config.visible_fraction,
                dim_opacity: config.dim_opacity,
            },
            VisibilityPolicyKind::Distance => VisibilityPolicy::Distance {
                min_opacity: config.min_opacity,
                falloff: config.falloff,
            },
        };
        policy.validated()
    }

    pub fn validated(self) -> Result<Self> {
        let unit = |name: &'static str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::invalid_option(name, format!("{value} is not in [0, 1]")))
            }
        };
        match self {
            VisibilityPolicy::Threshold {
                fraction,
                dim_opacity,
            } => {
                unit("visible_fraction", fraction)?;
                unit("dim_opacity", dim_opacity)?;
            }
            VisibilityPolicy::Distance {
                min_opacity,
                falloff,
            } => {
                unit("min_opacity", min_opacity)?;
                if !(falloff.is_finite() && falloff >= 0.0) {
                    return Err(Error::invalid_option(
                        "falloff",
                        format!("{falloff} is negative"),
                    ));
                }
            }
        }
        Ok(self)
    }

    fn entry(&self, unit_index: usize, unit: &Extent, viewport: &Extent) -> VisibilityEntry {
        let overlap_fraction = overlap_fraction(unit, viewport);
        match *self {
            VisibilityPolicy::Threshold {
                fraction,
                dim_opacity,
            } => {
                let visible = overlap_fraction > fraction;
                VisibilityEntry {
                    unit_index,
                    overlap_fraction,
                    opacity: if visible { 1.0 } else { dim_opacity },
                    visible,
                }
            }
            VisibilityPolicy::Distance {
                min_opacity,
                falloff,
            } => {
                let half = viewport.height / 2.0;
                let opacity = if half > 0.0 {
                    let distance = (unit.center() - viewport.center()).abs();
                    (1.0 - distance / half * falloff).max(min_opacity).min(1.0)
                } else {
                    min_opacity
                };
                VisibilityEntry {
                    unit_index,
                    overlap_fraction,
                    opacity,
                    visible: overlap_fraction > DISTANCE_VISIBLE_FRACTION,
                }
            }
        }
    }
}

/// Share of `unit` inside `viewport`, in [0, 1]
///
/// A zero-height unit counts as fully visible while it sits inside the
/// viewport.
pub fn overlap_fraction(unit: &Extent, viewport: &Extent) -> f64 {
    if unit.height <= 0.0 {
        let inside = unit.top >= viewport.top && unit.top <= viewport.bottom();
        return if inside && viewport.height > 0.0 { 1.0 } else { 0.0 };
    }
    (unit.overlap(viewport) / unit.height).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub unit_index: usize,
    pub overlap_fraction: f64,
    pub opacity: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityField {
    policy: VisibilityPolicy,
    units: Vec<Extent>,
    entries: Vec<VisibilityEntry>,
}

impl VisibilityField {
    pub fn new(policy: VisibilityPolicy) -> Self {
        Self {
            policy,
            units: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: VisibilityPolicy) {
        self.policy = policy;
    }

    /// Replace the measured units; entries are stale until the next recompute
    pub fn set_units(&mut self, units: Vec<Extent>) {
        self.units = units;
        self.entries.clear();
    }

    pub fn units(&self) -> &[Extent] {
        &self.units
    }

    pub fn entries(&self) -> &[VisibilityEntry] {
        &self.entries
    }

    pub fn recompute(&mut self, viewport: Extent, reduced_motion: bool) -> &[VisibilityEntry] {
        let policy = self.policy;
        self.entries = self
            .units
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                let mut entry = policy.entry(index, unit, &viewport);
                if reduced_motion {
                    entry.opacity = 1.0;
                }
                entry
            })
            .collect();
        &self.entries
    }

    /// Unit with the highest opacity, the first one on ties
    pub fn focused(&self) -> Option<usize> {
        self.entries
            .iter()
            .filter(|entry| entry.visible)
            .fold(None::<&VisibilityEntry>, |best, entry| match best {
                Some(best) if best.opacity >= entry.opacity => Some(best),
                _ => Some(entry),
            })
            .map(|entry| entry.unit_index)
    }
}
