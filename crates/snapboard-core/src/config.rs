//! Engine configuration.

use crate::error::EngineResult;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Default distance (workspace units) under which two coordinates snap.
pub const DEFAULT_SNAP_DISTANCE: f64 = 10.0;
/// Minimum element width at rest.
pub const MIN_ELEMENT_WIDTH: f64 = 50.0;
/// Minimum element height at rest.
pub const MIN_ELEMENT_HEIGHT: f64 = 30.0;
/// Side length of a group resize handle.
pub const DEFAULT_HANDLE_SIZE: f64 = 8.0;

/// Tunables for the interaction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Coordinates closer than this (strictly) produce a snap match.
    pub snap_distance: f64,
    /// Whether single-element drags are corrected by the snap engine.
    pub snap_enabled: bool,
    /// Minimum element width after a resize commit.
    pub min_width: f64,
    /// Minimum element height after a resize commit.
    pub min_height: f64,
    /// Side length of group resize handles.
    pub handle_size: f64,
    /// Placement of new and generated elements.
    pub placement: PlacementConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_distance: DEFAULT_SNAP_DISTANCE,
            snap_enabled: true,
            min_width: MIN_ELEMENT_WIDTH,
            min_height: MIN_ELEMENT_HEIGHT,
            handle_size: DEFAULT_HANDLE_SIZE,
            placement: PlacementConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Minimum element size as a `Size`.
    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }
}

/// Where the element store puts elements it creates itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Visible workspace size used to bound default placement.
    pub viewport: Size,
    /// Size given to elements added without one.
    pub default_size: Size,
    /// Gap kept between a default-placed element and the viewport's far edges.
    pub edge_margin: f64,
    /// Range of the random offset used for default placement.
    pub scatter_span: Size,
    /// Row/column pitch of the test-element grid.
    pub cell_pitch: Size,
    /// Offset of the first grid cell from the workspace origin.
    pub grid_margin: f64,
    /// Offset applied to duplicates on both axes.
    pub duplicate_offset: f64,
    /// Fixed RNG seed for reproducible placement.
    pub seed: Option<u64>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1200.0, 800.0),
            default_size: Size::new(120.0, 80.0),
            edge_margin: 50.0,
            scatter_span: Size::new(400.0, 300.0),
            cell_pitch: Size::new(140.0, 100.0),
            grid_margin: 20.0,
            duplicate_offset: 20.0,
            seed: None,
        }
    }
}

impl PlacementConfig {
    /// Largest x/y a default-sized element may be placed at.
    pub fn max_origin(&self) -> (f64, f64) {
        let max_x = (self.viewport.width - self.default_size.width - self.edge_margin).max(0.0);
        let max_y = (self.viewport.height - self.default_size.height - self.edge_margin).max(0.0);
        (max_x, max_y)
    }

    /// Number of cells the test grid offers: columns × rows that fit the viewport.
    pub fn grid_capacity(&self) -> usize {
        let (columns, rows) = self.grid_dimensions();
        columns * rows
    }

    /// Columns and rows of the test grid.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        let columns = cells_along(self.viewport.width, self.cell_pitch.width);
        let rows = cells_along(self.viewport.height, self.cell_pitch.height);
        (columns, rows)
    }
}

fn cells_along(extent: f64, pitch: f64) -> usize {
    if pitch <= 0.0 || !extent.is_finite() || extent <= 0.0 {
        return 0;
    }
    (extent / pitch).floor() as usize
}
