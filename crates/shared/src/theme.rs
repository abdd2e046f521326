/// An sRGB color as 0-255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Channels scaled to 0.0-1.0 for PDF operators.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

// Dark navy palette shared by the HTML and PDF renderings
pub const BACKGROUND: Rgb = Rgb(0x0D, 0x1B, 0x2A);
pub const TITLE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
pub const BODY: Rgb = Rgb(0xD0, 0xE4, 0xFF);
pub const ACCENT: Rgb = Rgb(0x4F, 0xB3, 0xBF);
pub const SOURCE: Rgb = Rgb(0x80, 0xA0, 0xC0);

pub const FOOTER_TEXT: &str = "Space Business Weekly Report  |  Powered by Gemini API";
pub const MAX_FOOTER_SOURCES: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(BACKGROUND.hex(), "#0D1B2A");
        assert_eq!(ACCENT.hex(), "#4FB3BF");
    }

    #[test]
    fn test_unit_range() {
        assert_eq!(TITLE.unit(), (1.0, 1.0, 1.0));
        let (r, _, _) = BACKGROUND.unit();
        assert!(r > 0.0 && r < 0.1);
    }
}
