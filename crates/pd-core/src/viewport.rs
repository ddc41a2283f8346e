//! Device profiles and screen ↔ document coordinate mapping.
//!
//! Nodes are stored in a fixed base canvas space. The render surface draws
//! that space into a container whose width depends on the emulated device
//! and the window, so every pointer position and drag delta coming from the
//! surface is divided by a uniform scale factor before it reaches the
//! document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical width × height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

/// The fixed coordinate space nodes are stored in.
pub const BASE_CANVAS: CanvasSize = CanvasSize {
    width: 1200.0,
    height: 800.0,
};

impl Default for CanvasSize {
    fn default() -> Self {
        BASE_CANVAS
    }
}

/// A 2D point. Screen or document space depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle of the observed canvas container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Emulated device profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Mobile, Device::Tablet, Device::Desktop];

    pub fn size(self) -> CanvasSize {
        match self {
            Device::Mobile => CanvasSize {
                width: 375.0,
                height: 667.0,
            },
            Device::Tablet => CanvasSize {
                width: 768.0,
                height: 1024.0,
            },
            Device::Desktop => CanvasSize {
                width: 1200.0,
                height: 800.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Tablet => "tablet",
            Device::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Device::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown device: {s:?}"))
    }
}

/// Maps between screen space and base canvas space.
///
/// `scale = container_width / base.width`. A zero or negative container
/// width (not yet observed) is treated as scale 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapping {
    pub base: CanvasSize,
    pub container: Bounds,
}

impl ViewportMapping {
    pub fn new(base: CanvasSize, container: Bounds) -> Self {
        Self { base, container }
    }

    /// Identity mapping: container at the origin, exactly base-sized.
    pub fn identity(base: CanvasSize) -> Self {
        Self {
            base,
            container: Bounds {
                left: 0.0,
                top: 0.0,
                width: base.width,
                height: base.height,
            },
        }
    }

    pub fn scale(&self) -> f32 {
        if self.container.width > 0.0 && self.base.width > 0.0 {
            self.container.width / self.base.width
        } else {
            1.0
        }
    }

    pub fn screen_to_document(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(
            (p.x - self.container.left) / s,
            (p.y - self.container.top) / s,
        )
    }

    pub fn document_to_screen(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(
            p.x * s + self.container.left,
            p.y * s + self.container.top,
        )
    }

    /// Convert a raw pointer movement to a document-space delta.
    pub fn delta_to_document(&self, dx: f32, dy: f32) -> (f32, f32) {
        let s = self.scale();
        (dx / s, dy / s)
    }

    /// Rendered content height: the taller of the base canvas and the
    /// lowest node extent, scaled into screen units.
    pub fn scaled_content_height(&self, lowest_extent: f32) -> f32 {
        self.base.height.max(lowest_extent) * self.scale()
    }
}
