//! Greedy build strategy that lets the headless runner play unattended.

use grid_defence_core::{SpotId, TowerCategory, TowerId, TowerSnapshot};
use grid_defence_engine::Engine;

/// Mutation performed by the autopilot.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Action {
    Placed(TowerSnapshot),
    Merged(TowerSnapshot),
}

/// Spends money as soon as it can: merges identical towers first, then fills
/// the free spot closest to the enemy path with the newest affordable category.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    actions: usize,
}

impl Autopilot {
    /// Performs mutations until nothing is affordable, returning what was done.
    pub(crate) fn act(&mut self, engine: &mut Engine) -> Vec<Action> {
        let mut performed = Vec::new();
        while let Some(action) = self.step(engine) {
            performed.push(action);
        }
        self.actions += performed.len();
        performed
    }

    /// Total number of mutations performed so far.
    pub(crate) fn actions(&self) -> usize {
        self.actions
    }

    fn step(&self, engine: &mut Engine) -> Option<Action> {
        if let Some((keep, absorb)) = merge_candidate(engine) {
            return match engine.merge(keep, absorb) {
                Ok(tower) => Some(Action::Merged(tower)),
                Err(error) => {
                    log::warn!("autopilot merge of {keep:?} and {absorb:?} failed: {error}");
                    None
                }
            };
        }

        let (spot, category) = placement_candidate(engine)?;
        match engine.place(spot, &category) {
            Ok(tower) => Some(Action::Placed(tower)),
            Err(error) => {
                log::warn!("autopilot placement of {category} on {spot:?} failed: {error}");
                None
            }
        }
    }
}

fn merge_candidate(engine: &Engine) -> Option<(TowerId, TowerId)> {
    let money = engine.state().money;
    let towers = engine.towers();
    towers.iter().enumerate().find_map(|(index, keep)| {
        let definition = engine.definition(&keep.category)?;
        let cost = definition.merge_cost(keep.level.next()?)?;
        if cost > money {
            return None;
        }

        towers[index + 1..]
            .iter()
            .find(|other| other.category == keep.category && other.level == keep.level)
            .map(|absorb| (keep.id, absorb.id))
    })
}

fn placement_candidate(engine: &Engine) -> Option<(SpotId, TowerCategory)> {
    let category = engine
        .state()
        .available_categories
        .into_iter()
        .rev()
        .find(|category| engine.can_afford(category))?;

    let path = engine.path();
    let spot = engine
        .spots()
        .into_iter()
        .filter(|spot| !spot.occupied)
        .map(|spot| {
            let distance = path
                .iter()
                .map(|node| node.distance_squared(spot.centre))
                .fold(f32::INFINITY, f32::min);
            (spot.id, distance)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))?;

    Some((spot.0, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::{TowerLevel, WaveStatus};
    use grid_defence_engine::standard_config;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn engine() -> Engine {
        let config = standard_config(&mut ChaCha8Rng::seed_from_u64(5));
        Engine::with_seed(config, 5).expect("standard config validates")
    }

    #[test]
    fn starting_purse_buys_two_towers_and_merges_them() {
        let mut engine = engine();
        let mut autopilot = Autopilot::default();

        let actions = autopilot.act(&mut engine);

        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[2], Action::Merged(_)));
        let towers = engine.towers();
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].level, TowerLevel::FIRST.next().expect("level two"));
        assert_eq!(engine.state().money, 200 - 50 - 50 - 75);
        assert_eq!(autopilot.actions(), 3);
    }

    #[test]
    fn broke_autopilot_does_nothing() {
        let mut engine = engine();
        let mut autopilot = Autopilot::default();
        let _ = autopilot.act(&mut engine);

        assert!(autopilot.act(&mut engine).is_empty());
        assert_eq!(engine.state().status, WaveStatus::Initial);
    }

    #[test]
    fn placements_prefer_spots_near_the_path() {
        let mut engine = engine();
        let (spot, category) = placement_candidate(&engine).expect("candidate");
        assert_eq!(category, TowerCategory::new("simple"));

        let centre = engine.spot(spot).expect("spot").centre;
        let distance = engine
            .path()
            .iter()
            .map(|node| node.distance(centre))
            .fold(f32::INFINITY, f32::min);
        assert!(distance <= engine.config().grid.cell_size * 2.0);
        let _ = engine.place(spot, &category).expect("placement");
    }
}
