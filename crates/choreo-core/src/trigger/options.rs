use crate::config::TriggerConfig;
use crate::geometry::RootMargin;
use crate::{Error, Result};

/// Per-element observation settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerOptions {
    /// Intersection ratio at or above which the element counts as entered
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            root_margin: RootMargin::default(),
        }
    }
}

impl TriggerOptions {
    pub fn new(threshold: f64, root_margin: &str) -> Result<Self> {
        Self {
            threshold,
            root_margin: RootMargin::parse(root_margin)?,
        }
        .validated()
    }

    pub fn from_config(config: &TriggerConfig) -> Result<Self> {
        Self::new(config.threshold, &config.root_margin)
    }

    /// Reject thresholds outside (0, 1]
    pub fn validated(self) -> Result<Self> {
        if self.threshold > 0.0 && self.threshold <= 1.0 {
            Ok(self)
        } else {
            Err(Error::invalid_option(
                "threshold",
                format!("{} is not in (0, 1]", self.threshold),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MarginValue;

    #[test]
    fn test_from_config() {
        let options = TriggerOptions::from_config(&TriggerConfig::default()).unwrap();
        assert_eq!(options.threshold, 0.3);
        assert_eq!(options.root_margin.bottom, MarginValue::Percent(-20.0));
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(TriggerOptions::new(1.0, "0px").is_ok());
        assert!(TriggerOptions::new(0.0, "0px").is_err());
        assert!(TriggerOptions::new(1.2, "0px").is_err());
        assert!(TriggerOptions::new(f64::NAN, "0px").is_err());
    }
}
