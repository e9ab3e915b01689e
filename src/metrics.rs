//! Entity sizes supplied by a rendering surface.
//!
//! The geometry engine never measures anything itself. A surface implements
//! [`Measure`]; [`MonospaceMetrics`] is a character-cell estimate for
//! surfaces (such as the CLI listing) that have no real text metrics.

use unicode_width::UnicodeWidthStr;

use crate::config::MetricsConfig;
use crate::geometry::Size;
use crate::model::Entity;
use crate::scene::{attribute_row, key_row};

pub trait Measure {
    fn measure(&self, entity: &Entity) -> Size;
}

impl<F> Measure for F
where
    F: Fn(&Entity) -> Size,
{
    fn measure(&self, entity: &Entity) -> Size {
        self(entity)
    }
}

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMetrics {
    config: MetricsConfig,
}

impl MonospaceMetrics {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }
}

impl Measure for MonospaceMetrics {
    fn measure(&self, entity: &Entity) -> Size {
        let rows: Vec<String> = std::iter::once(entity.name.clone())
            .chain(entity.primary_key.iter().map(key_row))
            .chain(entity.attributes.iter().map(attribute_row))
            .collect();
        let widest = rows.iter().map(|r| display_width(r)).max().unwrap_or(0);

        let c = &self.config;
        let width = (widest as f32 * c.char_width + 2.0 * c.padding).max(c.min_width);
        let height = rows.len() as f32 * c.row_height + 2.0 * c.padding;
        Size::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    #[test]
    fn display_width_counts_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("книга"), 5);
        assert_eq!(display_width("本"), 2);
    }

    #[test]
    fn short_entity_gets_min_width() {
        let size = MonospaceMetrics::default().measure(&Entity::new("A"));
        assert_eq!(size, Size::new(120.0, 44.0));
    }

    #[test]
    fn widest_row_drives_width() {
        let mut entity = Entity::new("A");
        entity
            .attributes
            .push(Attribute::new("a_rather_long_attribute", "string").optional());
        // "a_rather_long_attribute (O): string" is 35 cells
        let size = MonospaceMetrics::default().measure(&entity);
        assert_eq!(size, Size::new(35.0 * 8.0 + 24.0, 2.0 * 20.0 + 24.0));
    }

    #[test]
    fn closures_measure_too() {
        let fixed = |_: &Entity| Size::new(10.0, 10.0);
        assert_eq!(fixed.measure(&Entity::new("A")), Size::new(10.0, 10.0));
    }
}
