//! One open document and its view state.
//!
//! The session owns the model. Surfaces feed pointer and zoom events in and
//! call [`Session::redraw`] afterwards; every redraw is computed from scratch.

use log::{debug, info};

use crate::config::LayoutConfig;
use crate::error::{ParseError, SessionError};
use crate::geometry::{Point, Size};
use crate::layout;
use crate::metrics::Measure;
use crate::model::DomainModel;
use crate::parser::parse;
use crate::scene::{Drawing, draw};

pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_SCALE: f32 = 0.3;
pub const MAX_SCALE: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
struct Motion {
    entity: String,
    /// Pointer position relative to the entity's top-left corner.
    grab: Point,
}

#[derive(Debug, Clone)]
pub struct Session {
    model: DomainModel,
    layout: LayoutConfig,
    scale: f32,
    motion: Option<Motion>,
}

impl Session {
    /// Parses `source`, measures every entity and places it on the grid.
    pub fn open(source: &str, layout: LayoutConfig, measure: &impl Measure) -> Result<Self, ParseError> {
        let mut session = Self {
            model: parse(source)?,
            layout,
            scale: 1.0,
            motion: None,
        };
        session.measure_with(measure);
        session.auto_layout();
        info!(
            entities = session.model.entities.len(),
            relationships = session.model.relationships.len();
            "Opened document"
        );
        Ok(session)
    }

    /// Replaces the whole document. On a parse error the current model is
    /// left untouched.
    ///
    /// Entities that survive by name keep their position; new ones are placed
    /// in their grid cell.
    pub fn reload(&mut self, source: &str, measure: &impl Measure) -> Result<(), ParseError> {
        let mut model = parse(source)?;
        for entity in &mut model.entities {
            entity.position = self.model.entity(&entity.name).and_then(|e| e.position);
        }
        self.model = model;
        self.motion = None;
        self.measure_with(measure);
        layout::layout_missing(&mut self.model.entities, &self.layout);
        info!(entities = self.model.entities.len(); "Reloaded document");
        Ok(())
    }

    pub fn model(&self) -> &DomainModel {
        &self.model
    }

    /// Refreshes every entity's bounds, e.g. after a font change.
    pub fn measure_with(&mut self, measure: &impl Measure) {
        for entity in &mut self.model.entities {
            entity.bounds = Some(measure.measure(entity));
        }
    }

    pub fn auto_layout(&mut self) {
        layout::auto_layout(&mut self.model.entities, &self.layout);
    }

    /// Starts dragging `entity`, grabbed at `pointer`.
    pub fn begin_move(&mut self, entity: &str, pointer: Point) -> Result<(), SessionError> {
        if let Some(motion) = &self.motion {
            return Err(SessionError::AlreadyMoving {
                moving: motion.entity.clone(),
            });
        }
        let rect = self
            .model
            .entity(entity)
            .and_then(|e| e.rect())
            .ok_or_else(|| SessionError::UnknownEntity(entity.to_string()))?;

        self.motion = Some(Motion {
            entity: entity.to_string(),
            grab: pointer.sub_point(rect.top_left()),
        });
        debug!(entity = entity; "Begin move");
        Ok(())
    }

    /// Moves the dragged entity so the grab point follows `pointer`, keeping
    /// the whole rectangle inside `area`.
    pub fn move_to(&mut self, pointer: Point, area: Size) -> Result<Point, SessionError> {
        let motion = self.motion.as_ref().ok_or(SessionError::NotMoving)?;
        let entity = self
            .model
            .entity_mut(&motion.entity)
            .ok_or_else(|| SessionError::UnknownEntity(motion.entity.clone()))?;
        let size = entity.bounds.unwrap_or_default();

        let wanted = pointer.sub_point(motion.grab);
        let position = Point::new(
            wanted.x.min(area.width - size.width).max(0.0),
            wanted.y.min(area.height - size.height).max(0.0),
        );
        entity.position = Some(position);
        Ok(position)
    }

    pub fn end_move(&mut self) -> Result<(), SessionError> {
        let motion = self.motion.take().ok_or(SessionError::NotMoving)?;
        debug!(entity = motion.entity; "End move");
        Ok(())
    }

    pub fn moving(&self) -> Option<&str> {
        self.motion.as_ref().map(|m| m.entity.as_str())
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_scale(self.scale * ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_scale(self.scale / ZOOM_STEP)
    }

    pub fn reset_zoom(&mut self) -> f32 {
        self.set_scale(1.0)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    fn set_scale(&mut self, scale: f32) -> f32 {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    pub fn redraw(&self) -> Drawing {
        draw(&self.model)
    }
}
