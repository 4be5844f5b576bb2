use egui::Color32;
use glam::{vec4, Vec4};
use strum_macros::{Display, EnumIter};

/// Colors the user can paint with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, Display)]
pub enum PaletteColor {
    White,
    Black,
    Blue,
    Green,
    Pink,
    Cyan,
    Gray,
}

impl PaletteColor {
    pub fn rgba(self) -> Vec4 {
        match self {
            PaletteColor::White => vec4(1.0, 1.0, 1.0, 1.0),
            PaletteColor::Black => vec4(0.0, 0.0, 0.0, 1.0),
            PaletteColor::Blue => vec4(0.0, 0.0, 1.0, 1.0),
            PaletteColor::Green => vec4(0.0, 1.0, 0.0, 1.0),
            PaletteColor::Pink => vec4(1.0, 0.0, 1.0, 1.0),
            PaletteColor::Cyan => vec4(0.0, 1.0, 1.0, 1.0),
            PaletteColor::Gray => vec4(0.5, 0.5, 0.5, 1.0),
        }
    }

    /// The palette color with its alpha replaced, as stored in the color
    /// buffer.
    pub fn stroke_color(self, alpha: f32) -> Vec4 {
        let mut color = self.rgba();
        color.set_alpha(alpha);
        color
    }
}

/// RGBA accessors for colors stored as `Vec4`.
pub trait ColorExt {
    fn red(&self) -> f32;
    fn green(&self) -> f32;
    fn blue(&self) -> f32;
    fn alpha(&self) -> f32;
    fn set_alpha(&mut self, alpha: f32);
    fn from_color32(color: Color32) -> Self;
    fn to_color32(&self) -> Color32;
}

impl ColorExt for Vec4 {
    fn red(&self) -> f32 {
        self.x
    }

    fn green(&self) -> f32 {
        self.y
    }

    fn blue(&self) -> f32 {
        self.z
    }

    fn alpha(&self) -> f32 {
        self.w
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.w = alpha;
    }

    fn from_color32(color: Color32) -> Self {
        vec4(
            color.r() as f32 / 255.0,
            color.g() as f32 / 255.0,
            color.b() as f32 / 255.0,
            color.a() as f32 / 255.0,
        )
    }

    fn to_color32(&self) -> Color32 {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(
            channel(self.red()),
            channel(self.green()),
            channel(self.blue()),
            channel(self.alpha()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn palette_values() {
        let palette = PaletteColor::iter()
            .map(|color| (color, color.rgba()))
            .collect::<Vec<_>>();
        assert_eq!(
            palette,
            vec![
                (PaletteColor::White, vec4(1.0, 1.0, 1.0, 1.0)),
                (PaletteColor::Black, vec4(0.0, 0.0, 0.0, 1.0)),
                (PaletteColor::Blue, vec4(0.0, 0.0, 1.0, 1.0)),
                (PaletteColor::Green, vec4(0.0, 1.0, 0.0, 1.0)),
                (PaletteColor::Pink, vec4(1.0, 0.0, 1.0, 1.0)),
                (PaletteColor::Cyan, vec4(0.0, 1.0, 1.0, 1.0)),
                (PaletteColor::Gray, vec4(0.5, 0.5, 0.5, 1.0)),
            ]
        );
    }

    #[test]
    fn stroke_color_keeps_rgb() {
        let color = PaletteColor::Pink.stroke_color(0.5);
        assert_eq!(color, vec4(1.0, 0.0, 1.0, 0.5));
    }

    #[test]
    fn channel_accessors() {
        let color = vec4(0.1, 0.2, 0.3, 0.4);
        assert_eq!(
            (color.red(), color.green(), color.blue(), color.alpha()),
            (0.1, 0.2, 0.3, 0.4)
        );
    }

    #[test]
    fn opaque_color32_conversion() {
        let color = PaletteColor::Gray.rgba();
        let color32 = color.to_color32();
        assert_eq!(color32, Color32::from_rgb(128, 128, 128));
        assert_eq!(Vec4::from_color32(Color32::from_rgb(255, 0, 255)), PaletteColor::Pink.rgba());
    }
}
