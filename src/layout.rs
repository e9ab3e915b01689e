use log::debug;

use crate::config::LayoutConfig;
use crate::geometry::Point;
use crate::model::Entity;

/// Places every entity on a row-major grid in declaration order.
///
/// Running it twice over the same entities yields the same positions.
pub fn auto_layout(entities: &mut [Entity], config: &LayoutConfig) {
    let columns = grid_columns(entities.len());
    for (index, entity) in entities.iter_mut().enumerate() {
        entity.position = Some(cell_position(index, columns, config));
    }
    debug!(entities = entities.len(), columns = columns; "Auto layout applied");
}

/// Places only the entities that have no position yet, each in the cell its
/// index would get from [`auto_layout`]. Already placed entities stay put.
pub fn layout_missing(entities: &mut [Entity], config: &LayoutConfig) {
    let columns = grid_columns(entities.len());
    let mut placed = 0;
    for (index, entity) in entities.iter_mut().enumerate() {
        if entity.position.is_none() {
            entity.position = Some(cell_position(index, columns, config));
            placed += 1;
        }
    }
    debug!(placed = placed; "Placed unpositioned entities");
}

/// `ceil(sqrt(count))`, computed without floating point.
pub fn grid_columns(count: usize) -> usize {
    let mut columns = 0;
    while columns * columns < count {
        columns += 1;
    }
    columns
}

pub fn cell_position(index: usize, columns: usize, config: &LayoutConfig) -> Point {
    let columns = columns.max(1);
    let col = (index % columns) as f32;
    let row = (index / columns) as f32;
    Point::new(
        config.padding + col * (config.cell_width + config.padding),
        config.padding + row * (config.cell_height + config.padding),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        (0..n).map(|i| Entity::new(format!("E{i}"))).collect()
    }

    #[test]
    fn columns_round_up() {
        assert_eq!(grid_columns(0), 0);
        assert_eq!(grid_columns(1), 1);
        assert_eq!(grid_columns(4), 2);
        assert_eq!(grid_columns(5), 3);
        assert_eq!(grid_columns(9), 3);
        assert_eq!(grid_columns(10), 4);
    }

    #[test]
    fn fifth_entity_wraps_to_second_row() {
        let mut list = entities(5);
        let config = LayoutConfig::default();
        auto_layout(&mut list, &config);
        // index 3 -> row 1, column 0
        assert_eq!(list[3].position, Some(Point::new(150.0, 500.0)));
        assert_eq!(list[2].position, Some(Point::new(850.0, 150.0)));
    }

    #[test]
    fn layout_is_idempotent() {
        let mut list = entities(7);
        let config = LayoutConfig::default();
        auto_layout(&mut list, &config);
        let first: Vec<_> = list.iter().map(|e| e.position).collect();
        auto_layout(&mut list, &config);
        let second: Vec<_> = list.iter().map(|e| e.position).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn layout_missing_keeps_placed_entities() {
        let mut list = entities(3);
        list[1].position = Some(Point::new(5.0, 5.0));
        layout_missing(&mut list, &LayoutConfig::default());
        assert_eq!(list[0].position, Some(Point::new(150.0, 150.0)));
        assert_eq!(list[1].position, Some(Point::new(5.0, 5.0)));
        assert_eq!(list[2].position, Some(Point::new(150.0, 500.0)));
    }
}
