//! Placement spots and their occupancy flags.

use glam::Vec2;
use grid_defence_core::{colocated, GameConfig, GridCoord, SpotId, SpotSnapshot};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Spot {
    pub(crate) id: SpotId,
    cell: GridCoord,
    pub(crate) centre: Vec2,
    pub(crate) occupied: bool,
}

/// Occupancy map over the configured placement spots.
///
/// This is the single source of truth for whether a tower may be placed on a
/// spot; the world flips flags only together with tower store mutations.
#[derive(Clone, Debug)]
pub(crate) struct SpotGrid {
    spots: Vec<Spot>,
    cell_size: f32,
}

impl SpotGrid {
    pub(crate) fn from_config(config: &GameConfig) -> Self {
        let spots = config
            .spots
            .iter()
            .map(|spot| Spot {
                id: spot.id,
                cell: spot.cell,
                centre: config.grid_to_pixel(spot.cell),
                occupied: false,
            })
            .collect();
        Self {
            spots,
            cell_size: config.grid.cell_size,
        }
    }

    pub(crate) fn get(&self, id: SpotId) -> Option<&Spot> {
        self.spots.iter().find(|spot| spot.id == id)
    }

    /// Finds the spot whose centre lies within half a cell of `position`.
    pub(crate) fn spot_at(&self, position: Vec2) -> Option<&Spot> {
        self.spots
            .iter()
            .find(|spot| colocated(spot.centre, position, self.cell_size))
    }

    pub(crate) fn occupy(&mut self, id: SpotId) {
        self.set_occupied(id, true);
    }

    pub(crate) fn vacate(&mut self, id: SpotId) {
        self.set_occupied(id, false);
    }

    pub(crate) fn vacate_all(&mut self) {
        for spot in &mut self.spots {
            spot.occupied = false;
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<SpotSnapshot> {
        self.spots
            .iter()
            .map(|spot| SpotSnapshot {
                id: spot.id,
                cell: spot.cell,
                centre: spot.centre,
                occupied: spot.occupied,
            })
            .collect()
    }

    fn set_occupied(&mut self, id: SpotId, occupied: bool) {
        if let Some(spot) = self.spots.iter_mut().find(|spot| spot.id == id) {
            spot.occupied = occupied;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpotGrid {
        SpotGrid::from_config(&GameConfig::standard_board())
    }

    #[test]
    fn spots_start_free_at_cell_centres() {
        let grid = grid();
        let spot = grid.get(SpotId::new(0)).expect("spot 0");
        assert!(!spot.occupied);
        assert_eq!(spot.centre, Vec2::new(140.0, 20.0));
    }

    #[test]
    fn occupancy_flags_follow_occupy_and_vacate() {
        let mut grid = grid();
        grid.occupy(SpotId::new(3));
        assert!(grid.get(SpotId::new(3)).is_some_and(|spot| spot.occupied));

        grid.vacate(SpotId::new(3));
        assert!(grid.get(SpotId::new(3)).is_some_and(|spot| !spot.occupied));

        grid.occupy(SpotId::new(1));
        grid.occupy(SpotId::new(2));
        grid.vacate_all();
        assert!(grid.snapshots().iter().all(|spot| !spot.occupied));
    }

    #[test]
    fn spot_lookup_by_position_uses_tolerance() {
        let grid = grid();
        let found = grid.spot_at(Vec2::new(150.0, 12.0)).map(|spot| spot.id);
        assert_eq!(found, Some(SpotId::new(0)));
        assert!(grid.spot_at(Vec2::new(0.0, 0.0)).is_none());
    }
}
