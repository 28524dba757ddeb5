//! Configure the toolkit.
use crate::time::Duration;

/// The settings of a toolkit instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// The scale of logical pixels to device pixels.
    ///
    /// `None` uses the scale reported by the monitor.
    pub scale: Option<f32>,

    /// The maximum delay between two clicks of a multi-click.
    pub double_click_interval: Duration,

    /// How far the pointer may travel, in logical pixels, before a push
    /// stops being a click.
    pub click_tolerance: i32,

    /// The default font size.
    pub font_size: u16,

    /// The text baseline correction.
    ///
    /// `None` uses the default of the selected backend.
    pub baseline: Option<Baseline>,

    /// The menu metrics.
    pub menu: MenuSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: None,
            double_click_interval: Duration::from_millis(500),
            click_tolerance: 5,
            font_size: 14,
            baseline: None,
            menu: MenuSettings::default(),
        }
    }
}

/// Corrects the ascent/descent reported by a font engine.
///
/// Font engines disagree on how they report vertical metrics. Text is
/// placed `ascent * ascent_scale + offset` above its baseline and a line
/// is `ascent * ascent_scale + descent * descent_scale` tall.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Baseline {
    /// Factor applied to the reported ascent.
    pub ascent_scale: f32,
    /// Factor applied to the reported descent.
    pub descent_scale: f32,
    /// Offset in logical pixels added to the corrected ascent.
    pub offset: f32,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            ascent_scale: 1.0,
            descent_scale: 1.0,
            offset: 0.0,
        }
    }
}

/// Metrics of menu popups and menu bars.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MenuSettings {
    /// The height of one popup item.
    pub item_height: i32,
    /// The horizontal padding around a menu bar title.
    pub title_padding: i32,
    /// The height of a divider line.
    pub divider_height: i32,
    /// The minimum width of a popup level.
    pub min_width: i32,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            item_height: 24,
            title_padding: 8,
            divider_height: 1,
            min_width: 80,
        }
    }
}

/// A problem with some [`Settings`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The scale is not a positive finite number.
    #[error("invalid scale factor {0}")]
    InvalidScale(f32),
    /// The baseline correction is not finite or scales the ascent to zero.
    #[error("invalid baseline correction {0:?}")]
    InvalidBaseline(Baseline),
    /// A metric that must be positive is not.
    #[error("invalid {name}: {value}")]
    InvalidMetric {
        /// The name of the metric.
        name: &'static str,
        /// The offending value.
        value: i32,
    },
    /// The settings could not be parsed.
    #[cfg(feature = "serde")]
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl Settings {
    /// Checks that the settings describe a usable configuration.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(scale) = self.scale
            && !(scale.is_finite() && scale > 0.0)
        {
            return Err(Error::InvalidScale(scale));
        }

        if let Some(baseline) = self.baseline {
            let finite = baseline.ascent_scale.is_finite()
                && baseline.descent_scale.is_finite()
                && baseline.offset.is_finite();

            if !finite || baseline.ascent_scale <= 0.0 {
                return Err(Error::InvalidBaseline(baseline));
            }
        }

        for (name, value) in [
            ("click tolerance", self.click_tolerance),
            ("font size", i32::from(self.font_size)),
            ("menu item height", self.menu.item_height),
            ("menu minimum width", self.menu.min_width),
        ] {
            if value <= 0 {
                return Err(Error::InvalidMetric { name, value });
            }
        }

        Ok(())
    }

    /// Parses and validates [`Settings`] written in RON.
    ///
    /// Missing fields keep their default values.
    #[cfg(feature = "serde")]
    pub fn from_ron(source: &str) -> Result<Self, Error> {
        let settings: Settings = ron::from_str(source)?;
        settings.validate()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_scale_and_baseline() {
        let settings = Settings {
            scale: Some(0.0),
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(Error::InvalidScale(0.0)));

        let baseline = Baseline {
            ascent_scale: f32::NAN,
            ..Baseline::default()
        };
        let settings = Settings {
            baseline: Some(baseline),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(Error::InvalidBaseline(_))
        ));
    }

    #[test]
    fn rejects_non_positive_metrics() {
        let mut settings = Settings::default();
        settings.menu.item_height = 0;

        assert_eq!(
            settings.validate(),
            Err(Error::InvalidMetric {
                name: "menu item height",
                value: 0
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_partial_ron() {
        let settings = Settings::from_ron("(click_tolerance: 3, menu: (item_height: 30))")
            .expect("valid settings");

        assert_eq!(settings.click_tolerance, 3);
        assert_eq!(settings.menu.item_height, 30);
        assert_eq!(settings.font_size, 14);
    }
}
