//! Flavor to view-state mapping, shared by list cells and the detail view.

use crate::flavor::{Flavor, Rgb};

/// Scoop colors used when a flavor carries none (plain vanilla).
pub const DEFAULT_TOP: Rgb = Rgb::new(0xF7, 0xF2, 0xE1);
pub const DEFAULT_BOTTOM: Rgb = Rgb::new(0xE8, 0xDD, 0xB5);

/// Everything a surface needs to draw one scoop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoopView {
    pub label: String,
    pub top: Rgb,
    pub bottom: Rgb,
}

pub fn render(flavor: &Flavor) -> ScoopView {
    ScoopView {
        label: flavor.name().to_string(),
        top: flavor.top_color().unwrap_or(DEFAULT_TOP),
        bottom: flavor.bottom_color().unwrap_or(DEFAULT_BOTTOM),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_flavor_colors_when_present() {
        let top = Rgb::new(0x5D, 0x3A, 0x1A);
        let bottom = Rgb::new(0x3B, 0x24, 0x12);
        let view = render(&Flavor::named("Chocolate").with_colors(top, bottom));
        assert_eq!(
            view,
            ScoopView {
                label: "Chocolate".into(),
                top,
                bottom
            }
        );
    }

    #[test]
    fn falls_back_to_vanilla_colors() {
        let view = render(&Flavor::named("Mystery"));
        assert_eq!(view.top, DEFAULT_TOP);
        assert_eq!(view.bottom, DEFAULT_BOTTOM);
    }
}
