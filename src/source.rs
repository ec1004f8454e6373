use std::fmt;

use super::error::Result;
use super::image::PixelBuffer;

/// What an icon is used for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IconRole {
    /// The application icon, shown in docks, taskbars and file browsers.
    App,
    /// The small menu-bar or system-tray glyph.
    Tray,
}

impl fmt::Display for IconRole {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IconRole::App => out.write_str("app"),
            IconRole::Tray => out.write_str("tray"),
        }
    }
}

/// Produces square RGBA artwork on demand.
pub trait PixelSource {
    /// Renders the icon for `role` as a `size` by `size` buffer.
    fn render(&self, size: u32, role: IconRole) -> Result<PixelBuffer>;
}

impl<F> PixelSource for F
    where F: Fn(u32, IconRole) -> Result<PixelBuffer>
{
    fn render(&self, size: u32, role: IconRole) -> Result<PixelBuffer> {
        self(size, role)
    }
}

/// Paints every pixel of every icon the same color.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolidColor(pub [u8; 4]);

impl Default for SolidColor {
    fn default() -> SolidColor {
        SolidColor([220, 50, 50, 255])
    }
}

impl PixelSource for SolidColor {
    fn render(&self, size: u32, _role: IconRole) -> Result<PixelBuffer> {
        PixelBuffer::filled(size, size, self.0)
    }
}

const BG_TOP: [f32; 3] = [25.0, 30.0, 85.0];
const BG_BOTTOM: [f32; 3] = [45.0, 90.0, 210.0];
const REC_DOT: [u8; 4] = [255, 59, 48, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const TRAY_INK: [u8; 4] = [0, 0, 0, 220];

// Exponent of the squircle outline:
const SQUIRCLE_EXPONENT: f32 = 5.0;

/// The default artwork: a screen-recorder glyph.  App icons are a
/// gradient squircle with a white monitor outline and a red record dot;
/// tray icons are a dark monitor outline with the red dot on transparency.
#[derive(Clone, Copy, Debug, Default)]
pub struct Glyph;

impl PixelSource for Glyph {
    fn render(&self, size: u32, role: IconRole) -> Result<PixelBuffer> {
        let mut buffer = PixelBuffer::new(size, size)?;
        match role {
            IconRole::App => paint_app(&mut buffer),
            IconRole::Tray => paint_tray(&mut buffer),
        }
        Ok(buffer)
    }
}

fn paint_app(buffer: &mut PixelBuffer) {
    let size = buffer.width() as f32;
    let center = size / 2.0;
    let radius = (center - 1.0).max(0.5);
    for y in 0..buffer.height() {
        let t = y as f32 / (size - 1.0).max(1.0);
        let mut rgb = [0u8; 3];
        for (channel, value) in rgb.iter_mut().enumerate() {
            let top = BG_TOP[channel];
            *value = (top + (BG_BOTTOM[channel] - top) * t) as u8;
        }
        for x in 0..buffer.width() {
            let nx = (x as f32 + 0.5 - center) / radius;
            let ny = (y as f32 + 0.5 - center) / radius;
            let value = nx.abs().powf(SQUIRCLE_EXPONENT) +
                        ny.abs().powf(SQUIRCLE_EXPONENT);
            if value <= 1.0 {
                // Distance to the rim is roughly (1 - value) * radius / n.
                let edge = (1.0 - value) * radius / SQUIRCLE_EXPONENT;
                let alpha = (edge * 255.0).min(255.0) as u8;
                buffer.set_pixel(x, y, [rgb[0], rgb[1], rgb[2], alpha]);
            }
        }
    }

    let screen = Rect::centered(size, 0.52, 0.36, -0.05);
    let bezel = (size * 0.022).max(1.0);
    screen.outline(buffer, bezel, WHITE);
    let neck = Rect {
        left: center - (size * 0.01).max(0.5),
        top: screen.bottom,
        right: center + (size * 0.01).max(0.5),
        bottom: screen.bottom + size * 0.07,
    };
    neck.fill(buffer, WHITE);
    let base = Rect {
        left: center - size * 0.11,
        top: neck.bottom,
        right: center + size * 0.11,
        bottom: neck.bottom + (size * 0.018).max(1.0),
    };
    base.fill(buffer, WHITE);
    disc(buffer, center, screen.middle(), size * 0.065, REC_DOT);
}

fn paint_tray(buffer: &mut PixelBuffer) {
    let size = buffer.width() as f32;
    let center = size / 2.0;
    let screen = Rect::centered(size, 0.6, 0.4, -0.04);
    let line = (size * 0.07).max(1.0);
    screen.outline(buffer, line, TRAY_INK);
    let stand = Rect {
        left: center - size * 0.18,
        top: screen.bottom + size * 0.08,
        right: center + size * 0.18,
        bottom: screen.bottom + size * 0.08 + line,
    };
    stand.fill(buffer, TRAY_INK);
    disc(buffer, center, screen.middle(), (size * 0.1).max(1.0), REC_DOT);
}

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy)]
struct Rect {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Rect {
    /// A rectangle of the given fractions of `size`, centered horizontally
    /// and shifted vertically by `shift * size`.
    fn centered(size: f32, width: f32, height: f32, shift: f32) -> Rect {
        let center = size / 2.0;
        Rect {
            left: center - size * width / 2.0,
            top: center - size * height / 2.0 + size * shift,
            right: center + size * width / 2.0,
            bottom: center + size * height / 2.0 + size * shift,
        }
    }

    fn middle(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    fn fill(&self, buffer: &mut PixelBuffer, rgba: [u8; 4]) {
        self.paint(buffer, rgba, |_, _| true);
    }

    fn outline(&self, buffer: &mut PixelBuffer, thickness: f32, rgba: [u8; 4]) {
        let inner = Rect {
            left: self.left + thickness,
            top: self.top + thickness,
            right: self.right - thickness,
            bottom: self.bottom - thickness,
        };
        self.paint(buffer, rgba, |x, y| !inner.contains(x, y));
    }

    fn paint<F>(&self, buffer: &mut PixelBuffer, rgba: [u8; 4], keep: F)
        where F: Fn(f32, f32) -> bool
    {
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                if self.contains(px, py) && keep(px, py) {
                    blend(buffer, x, y, rgba);
                }
            }
        }
    }
}

fn disc(buffer: &mut PixelBuffer, cx: f32, cy: f32, radius: f32,
        rgba: [u8; 4]) {
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                blend(buffer, x, y, rgba);
            }
        }
    }
}

/// Composites `rgba` over the existing pixel ("source over").
fn blend(buffer: &mut PixelBuffer, x: u32, y: u32, rgba: [u8; 4]) {
    let dst = match buffer.pixel(x, y) {
        Some(dst) => dst,
        None => return,
    };
    let src_a = f32::from(rgba[3]) / 255.0;
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let mut out = [0u8; 4];
    for channel in 0..3 {
        let over = f32::from(rgba[channel]) * src_a;
        let under = f32::from(dst[channel]) * dst_a * (1.0 - src_a);
        out[channel] = ((over + under) / out_a).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    buffer.set_pixel(x, y, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_fills_every_pixel() {
        let buffer = SolidColor([1, 2, 3, 4]).render(5, IconRole::Tray)
            .unwrap();
        assert_eq!((buffer.width(), buffer.height()), (5, 5));
        assert!(buffer.data().chunks(4).all(|px| px == [1, 2, 3, 4]));
        assert!(SolidColor::default().render(0, IconRole::App).is_err());
    }

    #[test]
    fn closures_are_sources() {
        let source = |size: u32, _role: IconRole| PixelBuffer::new(size, 1);
        let buffer = source.render(3, IconRole::App).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (3, 1));
    }

    #[test]
    fn glyph_app_icon_is_a_squircle() {
        let buffer = Glyph.render(128, IconRole::App).unwrap();
        // Corners are outside the squircle.
        assert_eq!(buffer.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(buffer.pixel(127, 127).unwrap()[3], 0);
        assert_eq!(buffer.pixel(64, 100).unwrap()[3], 255);
        // The record dot sits in the middle of the screen.
        let dot = buffer.pixel(64, 58).unwrap();
        assert_eq!(&dot[..3], &[255, 59, 48]);
        assert_eq!(dot[3], 255);
        // The top edge of the background is navy, the bottom is blue.
        let top = buffer.pixel(64, 8).unwrap();
        let bottom = buffer.pixel(64, 120).unwrap();
        assert!(bottom[2] > top[2]);
    }

    #[test]
    fn glyph_tray_icon_is_mostly_transparent() {
        let buffer = Glyph.render(22, IconRole::Tray).unwrap();
        assert_eq!(buffer.pixel(0, 0), Some([0, 0, 0, 0]));
        let opaque = buffer.data().chunks(4).filter(|px| px[3] > 0).count();
        assert!(opaque > 0);
        assert!(opaque < 22 * 22 / 2);
    }

    #[test]
    fn glyph_renders_tiny_sizes() {
        for size in 1..8 {
            let buffer = Glyph.render(size, IconRole::App).unwrap();
            assert_eq!(buffer.width(), size);
        }
    }

    #[test]
    fn role_names() {
        assert_eq!(IconRole::App.to_string(), "app");
        assert_eq!(IconRole::Tray.to_string(), "tray");
    }
}
