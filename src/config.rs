//! Tunables for the window manager core and the interaction sessions.

use std::time::Duration;

use thiserror::Error;

use crate::constants::*;
use crate::layout::Size;
use crate::viewport::Breakpoints;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("close delay must be greater than zero")]
    ZeroCloseDelay,
    #[error("{field} must be a percentage no greater than 100 (and non-zero for sizes), got {value}")]
    PercentOutOfRange { field: &'static str, value: u16 },
    #[error("{field} must be non-zero")]
    ZeroSize { field: &'static str },
    #[error("tablet breakpoint ({tablet}) must be below the desktop breakpoint ({desktop})")]
    Breakpoints { tablet: u32, desktop: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmConfig {
    pub base_z_index: u64,
    pub spawn_anchor_percent: (u16, u16),
    pub stagger_offset: i32,
    pub min_visible_size: Size,
    pub default_size_percent: u16,
    pub drag_keep_visible: i32,
    pub titlebar_reach: i32,
    pub close_delay: Duration,
    /// Grace period after which closed instances are dropped from the
    /// collection. `None` keeps every instance for the whole session.
    pub closed_retention: Option<Duration>,
    pub min_window_size: Size,
    /// Thickness of the resize handle band around a window's border.
    pub resize_handle_thickness: u32,
    /// Height of the title bar strip that starts a drag.
    pub titlebar_height: u32,
    pub breakpoints: Breakpoints,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            base_z_index: BASE_Z_INDEX,
            spawn_anchor_percent: (SPAWN_ANCHOR_X_PERCENT, SPAWN_ANCHOR_Y_PERCENT),
            stagger_offset: STAGGER_OFFSET,
            min_visible_size: Size::new(MIN_VISIBLE_WIDTH, MIN_VISIBLE_HEIGHT),
            default_size_percent: DEFAULT_SIZE_PERCENT,
            drag_keep_visible: DRAG_KEEP_VISIBLE,
            titlebar_reach: TITLEBAR_REACH,
            close_delay: Duration::from_millis(CLOSE_DELAY_MS),
            closed_retention: None,
            min_window_size: Size::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT),
            resize_handle_thickness: 6,
            titlebar_height: 32,
            breakpoints: Breakpoints::default(),
        }
    }
}

impl WmConfig {
    /// Preset for a terminal grid, where one unit is one character cell.
    pub fn terminal() -> Self {
        Self {
            stagger_offset: 2,
            min_visible_size: Size::new(40, 12),
            drag_keep_visible: 10,
            titlebar_reach: 2,
            min_window_size: Size::new(24, 6),
            resize_handle_thickness: 1,
            titlebar_height: 1,
            breakpoints: Breakpoints {
                tablet: 60,
                desktop: 100,
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.close_delay.is_zero() {
            return Err(ConfigError::ZeroCloseDelay);
        }
        let anchors = [
            ("spawn anchor x", self.spawn_anchor_percent.0),
            ("spawn anchor y", self.spawn_anchor_percent.1),
        ];
        for (field, value) in anchors {
            if value > 100 {
                return Err(ConfigError::PercentOutOfRange { field, value });
            }
        }
        if !(1..=100).contains(&self.default_size_percent) {
            return Err(ConfigError::PercentOutOfRange {
                field: "default size",
                value: self.default_size_percent,
            });
        }
        if self.min_window_size.is_empty() {
            return Err(ConfigError::ZeroSize {
                field: "minimum window size",
            });
        }
        if self.min_visible_size.is_empty() {
            return Err(ConfigError::ZeroSize {
                field: "minimum visible size",
            });
        }
        if self.titlebar_height == 0 {
            return Err(ConfigError::ZeroSize {
                field: "title bar height",
            });
        }
        if self.breakpoints.tablet >= self.breakpoints.desktop {
            return Err(ConfigError::Breakpoints {
                tablet: self.breakpoints.tablet,
                desktop: self.breakpoints.desktop,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_pixel_values() {
        let cfg = WmConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.close_delay, Duration::from_millis(300));
        assert_eq!(cfg.base_z_index, 1000);
        assert_eq!(cfg.min_visible_size, Size::new(400, 300));
    }

    #[test]
    fn terminal_preset_is_valid() {
        assert_eq!(WmConfig::terminal().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_delay_and_bad_percent() {
        let cfg = WmConfig {
            close_delay: Duration::ZERO,
            ..WmConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCloseDelay));

        let cfg = WmConfig {
            default_size_percent: 0,
            ..WmConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PercentOutOfRange { value: 0, .. })
        ));

        let cfg = WmConfig {
            spawn_anchor_percent: (140, 15),
            ..WmConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_breakpoints() {
        let cfg = WmConfig {
            breakpoints: Breakpoints {
                tablet: 1024,
                desktop: 768,
            },
            ..WmConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Breakpoints { .. })
        ));
    }
}
