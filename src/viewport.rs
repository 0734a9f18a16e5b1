//! Viewport size tracking and device classification.

use crate::constants::{DESKTOP_BREAKPOINT, TABLET_BREAKPOINT};
use crate::layout::{FloatRect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    pub tablet: u32,
    pub desktop: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            tablet: TABLET_BREAKPOINT,
            desktop: DESKTOP_BREAKPOINT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub touch: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            touch: false,
        }
    }

    /// Mark the viewport as driven by taps rather than a mouse.
    pub fn with_touch(mut self, touch: bool) -> Self {
        self.touch = touch;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> FloatRect {
        FloatRect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn device_class(&self, breakpoints: &Breakpoints) -> DeviceClass {
        if self.width < breakpoints.tablet {
            DeviceClass::Mobile
        } else if self.width < breakpoints.desktop {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn is_mobile(&self, breakpoints: &Breakpoints) -> bool {
        self.device_class(breakpoints) == DeviceClass::Mobile
    }

    /// Small screens get full-screen windows instead of floating ones.
    pub fn prefers_fullscreen(&self, breakpoints: &Breakpoints) -> bool {
        self.is_mobile(breakpoints)
    }

    pub fn shows_resize_handles(&self, breakpoints: &Breakpoints) -> bool {
        !self.is_mobile(breakpoints)
    }

    /// Window size a hosted app should ask for on this viewport.
    ///
    /// `desktop` is the size used on tablet and desktop classes; on mobile
    /// the window fills the screen minus a small frame.
    pub fn preferred_window_size(&self, breakpoints: &Breakpoints, desktop: Size) -> Size {
        if self.is_mobile(breakpoints) {
            Size::new(
                self.width.saturating_sub(20).max(1),
                self.height.saturating_sub(60).max(1),
            )
        } else {
            desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_width() {
        let bp = Breakpoints::default();
        assert_eq!(Viewport::new(500, 900).device_class(&bp), DeviceClass::Mobile);
        assert_eq!(Viewport::new(768, 900).device_class(&bp), DeviceClass::Tablet);
        assert_eq!(Viewport::new(1023, 700).device_class(&bp), DeviceClass::Tablet);
        assert_eq!(Viewport::new(1024, 700).device_class(&bp), DeviceClass::Desktop);
    }

    #[test]
    fn touch_flag_survives_the_builder() {
        let tablet = Viewport::new(80, 24).with_touch(true);
        assert!(tablet.touch);
        assert_eq!(tablet.size(), Size::new(80, 24));
        assert!(!Viewport::new(80, 24).touch);
    }

    #[test]
    fn mobile_hides_handles_and_fills_screen() {
        let bp = Breakpoints::default();
        let phone = Viewport::new(400, 800);
        assert!(!phone.shows_resize_handles(&bp));
        assert!(phone.prefers_fullscreen(&bp));
        assert_eq!(
            phone.preferred_window_size(&bp, Size::new(800, 600)),
            Size::new(380, 740)
        );
        let desk = Viewport::new(1440, 900);
        assert!(desk.shows_resize_handles(&bp));
        assert_eq!(
            desk.preferred_window_size(&bp, Size::new(800, 600)),
            Size::new(800, 600)
        );
    }
}
