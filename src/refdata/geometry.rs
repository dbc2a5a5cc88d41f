use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use geo::{BoundingRect, Coord, MultiPolygon, Rect};

use crate::types::GeoLevel;

/// Keyed collection of boundary shapes for one administrative level.
///
/// Ids, owning states and shapes are parallel vectors; `index` maps an id
/// to its position. Collections are read-only once loaded.
#[derive(Debug, Clone)]
pub struct GeometryCollection {
    level: GeoLevel,
    ids: Vec<Arc<str>>,
    states: Vec<Arc<str>>,
    shapes: Vec<MultiPolygon<f64>>,
    index: AHashMap<Arc<str>, usize>,
}

impl GeometryCollection {
    pub fn new(
        level: GeoLevel,
        ids: Vec<Arc<str>>,
        states: Vec<Arc<str>>,
        shapes: Vec<MultiPolygon<f64>>,
    ) -> Self {
        debug_assert_eq!(ids.len(), shapes.len());
        debug_assert_eq!(ids.len(), states.len());
        let index = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
        Self { level, ids, states, shapes, index }
    }

    #[inline]
    pub fn level(&self) -> GeoLevel {
        self.level
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn ids(&self) -> &[Arc<str>] {
        &self.ids
    }

    #[inline]
    pub fn shapes(&self) -> &[MultiPolygon<f64>] {
        &self.shapes
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn shape(&self, id: &str) -> Option<&MultiPolygon<f64>> {
        self.index.get(id).map(|&i| &self.shapes[i])
    }

    /// Restrict to the shapes whose owning state is in `states`,
    /// preserving collection order.
    pub fn restrict_to_states(&self, states: &AHashSet<Arc<str>>) -> Self {
        let mut ids = Vec::new();
        let mut owners = Vec::new();
        let mut shapes = Vec::new();
        for i in 0..self.ids.len() {
            if states.contains(&self.states[i]) {
                ids.push(self.ids[i].clone());
                owners.push(self.states[i].clone());
                shapes.push(self.shapes[i].clone());
            }
        }
        Self::new(self.level, ids, owners, shapes)
    }

    /// Membership filter by an id set, preserving collection order.
    pub fn subset(&self, keep: &AHashSet<Arc<str>>) -> Self {
        let mut ids = Vec::new();
        let mut owners = Vec::new();
        let mut shapes = Vec::new();
        for i in 0..self.ids.len() {
            if keep.contains(&self.ids[i]) {
                ids.push(self.ids[i].clone());
                owners.push(self.states[i].clone());
                shapes.push(self.shapes[i].clone());
            }
        }
        Self::new(self.level, ids, owners, shapes)
    }

    /// Bounding rectangle of every shape in the collection.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }
}
