// File: crates/chart-core/src/theme.rs
// Summary: Colors, chart theme, and the ordinal palette that assigns each county a stable color.

use indexmap::IndexMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn from_rgb(rgb: u32) -> Self {
        Self::from_argb(255, (rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// `#rrggbb`; alpha is dropped.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Tableau 10 categorical palette.
pub const TABLEAU10: [Color; 10] = [
    Color::from_rgb(0x4e79a7),
    Color::from_rgb(0xf28e2c),
    Color::from_rgb(0xe15759),
    Color::from_rgb(0x76b7b2),
    Color::from_rgb(0x59a14f),
    Color::from_rgb(0xedc949),
    Color::from_rgb(0xaf7aa1),
    Color::from_rgb(0xff9da7),
    Color::from_rgb(0x9c755f),
    Color::from_rgb(0xbab0ab),
];

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub grid: Color,
    pub axis_line: Color,
    pub axis_label: Color,
    pub crosshair: Color,
    pub legend_text: Color,
    pub spinner: Color,
    pub spinner_error: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::from_argb(255, 255, 255, 255),
            grid: Color::from_argb(255, 230, 230, 235),
            axis_line: Color::from_argb(255, 60, 60, 70),
            axis_label: Color::from_argb(255, 20, 20, 30),
            crosshair: Color::from_argb(255, 120, 120, 130),
            legend_text: Color::from_argb(255, 20, 20, 30),
            spinner: Color::from_argb(255, 60, 60, 70),
            spinner_error: Color::from_argb(255, 255, 0, 0),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::from_argb(255, 18, 18, 20),
            grid: Color::from_argb(255, 40, 40, 45),
            axis_line: Color::from_argb(255, 180, 180, 190),
            axis_label: Color::from_argb(255, 235, 235, 245),
            crosshair: Color::from_argb(255, 255, 230, 70),
            legend_text: Color::from_argb(255, 235, 235, 245),
            spinner: Color::from_argb(255, 180, 180, 190),
            spinner_error: Color::from_argb(255, 255, 0, 0),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

/// Built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::light(), Theme::dark()]
}

/// Find a theme by its `name`, falling back to light.
pub fn find(name: &str) -> Theme {
    presets()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_default()
}

/// Ordinal color scale with an implicit, growing domain: a key keeps the slot
/// it was first given for as long as the scale lives.
#[derive(Clone, Debug)]
pub struct ColorScale {
    palette: Vec<Color>,
    assigned: IndexMap<String, Color>,
}

impl ColorScale {
    pub fn new(palette: &[Color]) -> Self {
        let palette = if palette.is_empty() { TABLEAU10.to_vec() } else { palette.to_vec() };
        Self { palette, assigned: IndexMap::new() }
    }

    pub fn color(&mut self, key: &str) -> Color {
        if let Some(c) = self.assigned.get(key) {
            return *c;
        }
        let c = self.palette[self.assigned.len() % self.palette.len()];
        self.assigned.insert(key.to_string(), c);
        c
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(&TABLEAU10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formatting() {
        assert_eq!(TABLEAU10[0].hex(), "#4e79a7");
        assert_eq!(Color::from_argb(0, 255, 0, 0).hex(), "#ff0000");
        assert_eq!(Color::from_rgb(0x0a0b0c), Color::from_argb(255, 10, 11, 12));
    }

    #[test]
    fn keys_keep_their_first_color() {
        let mut scale = ColorScale::default();
        let a = scale.color("Marin");
        let b = scale.color("Napa");
        assert_ne!(a, b);
        assert_eq!(scale.color("Marin"), a);
        assert_eq!(scale.color("Napa"), b);
    }

    #[test]
    fn palette_cycles() {
        let mut scale = ColorScale::new(&TABLEAU10[..2]);
        let first = scale.color("a");
        scale.color("b");
        assert_eq!(scale.color("c"), first);
    }

    #[test]
    fn unknown_theme_falls_back_to_light() {
        assert_eq!(find("DARK").name, "dark");
        assert_eq!(find("neon").name, "light");
    }
}
