//! Particle-grid sizing decisions.
//!
//! The state surfaces are immutable once allocated, so a change in target
//! particle count means a full reconstruction: dispose both surfaces, reseed,
//! reallocate the color buffer, rebind the pipelines. [`ResizeManager`] owns
//! the decision of when that reconstruction is necessary. Viewport resizes
//! that stay on the same side of the device-class breakpoint only affect the
//! camera aspect and must never tear down particle state.

/// Viewport width at or below which the small grid is used. Narrow viewports
/// get 32x32 (1k particles), everything else 256x256 (65k particles).
pub const SMALL_VIEWPORT_PX: u32 = 768;
const SMALL_GRID: u32 = 32;
const LARGE_GRID: u32 = 256;

/// Dimensions of the particle state grid. Particle count is `width * height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn particle_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Maps viewport changes to particle-grid reconstruction decisions.
#[derive(Debug)]
pub struct ResizeManager {
    grid: GridSize,
}

impl ResizeManager {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            grid: Self::grid_for_viewport(viewport_width),
        }
    }

    /// Target grid for a viewport width, by device class.
    pub fn grid_for_viewport(viewport_width: u32) -> GridSize {
        let side = if viewport_width <= SMALL_VIEWPORT_PX {
            SMALL_GRID
        } else {
            LARGE_GRID
        };
        GridSize {
            width: side,
            height: side,
        }
    }

    /// The grid currently in effect.
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Report a viewport resize. Returns the new grid size only when the
    /// particle grid must be rebuilt; `None` means the caller should update
    /// camera aspect and surface configuration and nothing else.
    pub fn viewport_changed(&mut self, viewport_width: u32) -> Option<GridSize> {
        let target = Self::grid_for_viewport(viewport_width);
        if target == self.grid {
            None
        } else {
            self.grid = target;
            Some(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_grid_selection() {
        assert_eq!(ResizeManager::grid_for_viewport(320).width, SMALL_GRID);
        assert_eq!(ResizeManager::grid_for_viewport(768).width, SMALL_GRID);
        assert_eq!(ResizeManager::grid_for_viewport(769).width, LARGE_GRID);
        assert_eq!(ResizeManager::grid_for_viewport(1920).width, LARGE_GRID);
    }

    #[test]
    fn test_same_class_viewport_resize_keeps_grid() {
        // Viewport-only resizes must not trigger state reconstruction.
        let mut manager = ResizeManager::new(1280);
        assert_eq!(manager.viewport_changed(1920), None);
        assert_eq!(manager.viewport_changed(1000), None);
    }

    #[test]
    fn test_crossing_breakpoint_rebuilds_grid() {
        let mut manager = ResizeManager::new(1280);
        let grid = manager.viewport_changed(500).expect("should rebuild");
        assert_eq!(grid.width, SMALL_GRID);
        assert_eq!(grid.particle_count(), SMALL_GRID * SMALL_GRID);

        // And back up again.
        let grid = manager.viewport_changed(1400).expect("should rebuild");
        assert_eq!(grid.particle_count(), LARGE_GRID * LARGE_GRID);
    }

    #[test]
    fn test_reported_count_matches_dimensions() {
        let grid = GridSize {
            width: 4,
            height: 8,
        };
        assert_eq!(grid.particle_count(), 32);
    }
}
