// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-click room drawing on the ground grid.

use nalgebra::{Isometry3, Point3, Vector3};
use roomplan_core::math::snap;
use roomplan_core::{Material, Params, Ray, RenderBackend};
use roomplan_geometry::{create_room_from_points, BoxShape, Room};

use crate::error::Result;

/// Slab thickness of the preview box.
const PREVIEW_THICKNESS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Inactive,
    AwaitingStart,
    AwaitingEnd { start: Point3<f64> },
}

/// Result of a click while drawing.
#[derive(Debug)]
pub enum ClickOutcome {
    /// The first corner was stored.
    Started(Point3<f64>),
    /// The room was built. The caller hands it to the scene.
    Created(Room),
    /// The rectangle is smaller than the minimum size.
    Rejected { width: f64, depth: f64 },
    /// Drawing is not active or the pointer is off the ground.
    Ignored,
}

/// Room-drawing mode.
#[derive(Debug)]
pub struct RoomCreation {
    stage: Stage,
    preview: Option<BoxShape>,
    grid_size: f64,
    min_size: f64,
}

impl RoomCreation {
    pub fn new(grid_size: f64, min_size: f64) -> Self {
        Self {
            stage: Stage::Inactive,
            preview: None,
            grid_size,
            min_size,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.stage != Stage::Inactive
    }

    /// Start point of the rectangle being drawn.
    pub fn start_point(&self) -> Option<Point3<f64>> {
        match self.stage {
            Stage::AwaitingEnd { start } => Some(start),
            _ => None,
        }
    }

    #[inline]
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Enters drawing mode, discarding any half-drawn rectangle.
    pub fn start(&mut self, backend: &mut dyn RenderBackend) {
        self.drop_preview(backend);
        self.stage = Stage::AwaitingStart;
    }

    /// Leaves drawing mode.
    pub fn cancel(&mut self, backend: &mut dyn RenderBackend) {
        self.drop_preview(backend);
        self.stage = Stage::Inactive;
    }

    fn drop_preview(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(preview) = self.preview.take() {
            preview.release(backend);
        }
    }

    /// Ground point under the pointer, snapped to the grid.
    pub fn grid_point(&self, ray: &Ray) -> Option<Point3<f64>> {
        let hit = ray.intersect_horizontal_plane(0.0)?;
        Some(Point3::new(snap(hit.x, self.grid_size), 0.0, snap(hit.z, self.grid_size)))
    }

    pub fn is_size_valid(&self, width: f64, depth: f64) -> bool {
        width >= self.min_size && depth >= self.min_size
    }

    /// Updates the preview rectangle. Returns whether the current size would
    /// be accepted, or `None` when nothing is being drawn.
    pub fn hover(&mut self, backend: &mut dyn RenderBackend, params: &Params, ray: &Ray) -> Option<bool> {
        let Stage::AwaitingEnd { start } = self.stage else {
            return None;
        };
        let end = self.grid_point(ray)?;
        let width = (end.x - start.x).abs();
        let depth = (end.z - start.z).abs();
        let size = Vector3::new(width, PREVIEW_THICKNESS, depth);
        let center = Isometry3::translation(
            (start.x + end.x) / 2.0,
            PREVIEW_THICKNESS / 2.0,
            (start.z + end.z) / 2.0,
        );

        match self.preview.as_mut() {
            Some(preview) => {
                if preview.size() != size {
                    preview.resize(backend, size);
                }
                preview.set_transform(backend, &center);
            }
            None => {
                let material = Material::standard(
                    params.highlight.preview_color,
                    params.highlight.preview_opacity,
                    1.0,
                    0.0,
                );
                let preview = BoxShape::plain(backend, size, &material);
                backend.attach(None, preview.mesh());
                preview.set_transform(backend, &center);
                self.preview = Some(preview);
            }
        }
        Some(self.is_size_valid(width, depth))
    }

    /// Handles a click on the ground.
    pub fn click(
        &mut self,
        backend: &mut dyn RenderBackend,
        params: &Params,
        ray: &Ray,
        wall_height: f64,
    ) -> Result<ClickOutcome> {
        if self.stage == Stage::Inactive {
            return Ok(ClickOutcome::Ignored);
        }
        let Some(point) = self.grid_point(ray) else {
            return Ok(ClickOutcome::Ignored);
        };

        match self.stage {
            Stage::AwaitingEnd { start } => {
                let width = (point.x - start.x).abs();
                let depth = (point.z - start.z).abs();
                if !self.is_size_valid(width, depth) {
                    tracing::warn!(width, depth, min = self.min_size, "room too small");
                    return Ok(ClickOutcome::Rejected { width, depth });
                }
                let room = create_room_from_points(backend, params, &start, &point, wall_height)?;
                self.cancel(backend);
                tracing::info!(width, depth, "room drawn");
                Ok(ClickOutcome::Created(room))
            }
            _ => {
                self.stage = Stage::AwaitingEnd { start: point };
                Ok(ClickOutcome::Started(point))
            }
        }
    }
}
