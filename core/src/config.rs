//! Read-only game configuration consumed by the world at construction.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    grid_to_pixel, EnemyDefinition, EnemyKind, GridCoord, LevelStats, MainWave, SpecialEffect,
    SpotId, SubWave, TowerCategory, TowerDefinition, TowerLevel, WaveProgress,
};

const STANDARD_ROWS: u32 = 12;
const STANDARD_COLUMNS: u32 = 20;
const STANDARD_CELL_SIZE: f32 = 40.0;
const STANDARD_MAIN_WAVES: u32 = 50;
const STANDARD_SUB_WAVES: u32 = 10;
const STANDARD_MAX_UNLOCKABLE: usize = 4;
const STANDARD_MONEY: u32 = 200;
const STANDARD_HEALTH: u32 = 20;

/// Reasons a configuration is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The grid has no cells or a non-positive cell size.
    #[error("grid must have at least one row and column and a positive cell size")]
    EmptyGrid,
    /// The enemy path has fewer than two nodes.
    #[error("enemy path needs at least two nodes")]
    PathTooShort,
    /// A path node or placement spot lies outside the grid.
    #[error("cell {0:?} lies outside the grid")]
    CellOutOfBounds(GridCoord),
    /// Two placement spots share an identifier.
    #[error("placement spot {0:?} is defined more than once")]
    DuplicateSpot(SpotId),
    /// Two tower definitions share a category.
    #[error("tower category `{0}` is defined more than once")]
    DuplicateCategory(TowerCategory),
    /// Two enemy definitions share a kind.
    #[error("enemy kind `{0}` is defined more than once")]
    DuplicateEnemyKind(EnemyKind),
    /// A tower definition does not provide exactly three levels.
    #[error("tower category `{category}` defines {found} levels instead of 3")]
    LevelCount {
        /// Offending category.
        category: TowerCategory,
        /// Number of levels provided.
        found: usize,
    },
    /// A merge cost is present on level one or missing on a higher level.
    #[error("tower category `{category}` level {level} has a misplaced merge cost")]
    MergeCost {
        /// Offending category.
        category: TowerCategory,
        /// Offending level.
        level: TowerLevel,
    },
    /// A level has a non-positive fire rate, range or projectile speed.
    #[error("tower category `{category}` level {level} has non-positive combat stats")]
    InvalidStats {
        /// Offending category.
        category: TowerCategory,
        /// Offending level.
        level: TowerLevel,
    },
    /// A category is referenced but never defined.
    #[error("tower category `{0}` is referenced but not defined")]
    UnknownCategory(TowerCategory),
    /// An enemy kind is referenced but never defined.
    #[error("enemy kind `{0}` is referenced but not defined")]
    UnknownEnemyKind(EnemyKind),
    /// The wave list does not match the declared counts.
    #[error("expected {expected} main waves of {sub_waves} sub-waves, found {found} main waves")]
    WaveCount {
        /// Declared main-wave count.
        expected: u32,
        /// Declared sub-waves per main wave.
        sub_waves: u32,
        /// Main waves provided.
        found: usize,
    },
    /// A main wave holds the wrong number of sub-waves.
    #[error("main wave {main} holds {found} sub-waves instead of {expected}")]
    SubWaveCount {
        /// One-based main wave number.
        main: usize,
        /// Declared sub-waves per main wave.
        expected: u32,
        /// Sub-waves provided.
        found: usize,
    },
}

/// Dimensions of the board.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of cell rows.
    pub rows: u32,
    /// Number of cell columns.
    pub columns: u32,
    /// Side length of a cell in pixels.
    pub cell_size: f32,
}

impl GridConfig {
    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.row() < self.rows && cell.col() < self.columns
    }
}

/// Placement spot declared by the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotConfig {
    /// Identifier of the spot.
    pub id: SpotId,
    /// Cell the spot covers.
    pub cell: GridCoord,
}

/// Complete read-only description of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Money available when a game starts.
    pub starting_money: u32,
    /// Player health when a game starts.
    pub starting_health: u32,
    /// Number of main waves.
    pub main_wave_count: u32,
    /// Number of sub-waves in every main wave.
    pub sub_waves_per_main: u32,
    /// Category available from the start of every game.
    pub starter_category: TowerCategory,
    /// Categories that unlock as main waves progress, including the starter.
    pub unlockable_categories: Vec<TowerCategory>,
    /// Maximum number of categories available at once.
    pub max_unlockable_towers: usize,
    /// Board dimensions.
    pub grid: GridConfig,
    /// Enemy path as ordered grid cells.
    pub path: Vec<GridCoord>,
    /// Placement spots.
    pub spots: Vec<SpotConfig>,
    /// Tower definitions keyed by category.
    pub towers: Vec<TowerDefinition>,
    /// Enemy definitions keyed by kind.
    pub enemies: Vec<EnemyDefinition>,
    /// Generated wave list.
    #[serde(default)]
    pub waves: Vec<MainWave>,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks every structural invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.rows == 0
            || self.grid.columns == 0
            || !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0)
        {
            return Err(ConfigError::EmptyGrid);
        }

        if self.path.len() < 2 {
            return Err(ConfigError::PathTooShort);
        }

        if let Some(cell) = self
            .path
            .iter()
            .chain(self.spots.iter().map(|spot| &spot.cell))
            .find(|cell| !self.grid.contains(**cell))
        {
            return Err(ConfigError::CellOutOfBounds(*cell));
        }

        let mut spot_ids = HashSet::new();
        for spot in &self.spots {
            if !spot_ids.insert(spot.id) {
                return Err(ConfigError::DuplicateSpot(spot.id));
            }
        }

        let mut categories = HashSet::new();
        for definition in &self.towers {
            if !categories.insert(&definition.category) {
                return Err(ConfigError::DuplicateCategory(definition.category.clone()));
            }
            validate_levels(definition)?;
        }

        let mut kinds = HashSet::new();
        for definition in &self.enemies {
            if !kinds.insert(&definition.kind) {
                return Err(ConfigError::DuplicateEnemyKind(definition.kind.clone()));
            }
        }

        if let Some(category) = std::iter::once(&self.starter_category)
            .chain(self.unlockable_categories.iter())
            .find(|category| !categories.contains(category))
        {
            return Err(ConfigError::UnknownCategory(category.clone()));
        }

        if self.waves.len() != self.main_wave_count as usize || self.sub_waves_per_main == 0 {
            return Err(ConfigError::WaveCount {
                expected: self.main_wave_count,
                sub_waves: self.sub_waves_per_main,
                found: self.waves.len(),
            });
        }

        for (index, main) in self.waves.iter().enumerate() {
            if main.sub_waves.len() != self.sub_waves_per_main as usize {
                return Err(ConfigError::SubWaveCount {
                    main: index + 1,
                    expected: self.sub_waves_per_main,
                    found: main.sub_waves.len(),
                });
            }

            if let Some(spawn) = main
                .sub_waves
                .iter()
                .flat_map(|sub| sub.spawns.iter())
                .find(|spawn| !kinds.contains(&spawn.kind))
            {
                return Err(ConfigError::UnknownEnemyKind(spawn.kind.clone()));
            }
        }

        Ok(())
    }

    /// Looks up the definition of a tower category.
    #[must_use]
    pub fn tower_definition(&self, category: &TowerCategory) -> Option<&TowerDefinition> {
        self.towers
            .iter()
            .find(|definition| &definition.category == category)
    }

    /// Looks up the definition of an enemy kind.
    #[must_use]
    pub fn enemy_definition(&self, kind: &EnemyKind) -> Option<&EnemyDefinition> {
        self.enemies.iter().find(|definition| &definition.kind == kind)
    }

    /// Maps a grid cell onto the pixel coordinates of its centre.
    #[must_use]
    pub fn grid_to_pixel(&self, cell: GridCoord) -> Vec2 {
        grid_to_pixel(cell, self.grid.cell_size)
    }

    /// Enemy path as pixel-space polyline.
    #[must_use]
    pub fn path_pixels(&self) -> Vec<Vec2> {
        self.path
            .iter()
            .map(|cell| self.grid_to_pixel(*cell))
            .collect()
    }

    /// Total number of sub-waves in a game.
    #[must_use]
    pub fn total_sub_waves(&self) -> u32 {
        self.main_wave_count.saturating_mul(self.sub_waves_per_main)
    }

    /// Sub-wave addressed by the progress counters, if configured.
    #[must_use]
    pub fn sub_wave(&self, progress: WaveProgress) -> Option<&SubWave> {
        let main = usize::try_from(progress.main()).ok()?.checked_sub(1)?;
        let sub = usize::try_from(progress.sub()).ok()?.checked_sub(1)?;
        self.waves.get(main)?.sub_waves.get(sub)
    }

    /// Built-in board, tower and enemy tables with an empty wave list.
    ///
    /// The wave list must be filled before the configuration validates.
    #[must_use]
    pub fn standard_board() -> Self {
        let path = [
            (1, 0),
            (1, 5),
            (6, 5),
            (6, 2),
            (10, 2),
            (10, 12),
            (3, 12),
            (3, 17),
            (9, 17),
            (9, 19),
        ]
        .into_iter()
        .map(|(row, col)| GridCoord::new(row, col))
        .collect();

        let spots = [
            (0, 3),
            (2, 3),
            (3, 6),
            (5, 4),
            (7, 3),
            (9, 3),
            (9, 6),
            (11, 8),
            (9, 9),
            (8, 11),
            (5, 11),
            (2, 10),
            (2, 14),
            (4, 16),
            (4, 18),
            (8, 16),
            (10, 18),
            (7, 13),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (row, col))| SpotConfig {
            id: SpotId::new(index as u32),
            cell: GridCoord::new(row, col),
        })
        .collect();

        let unlockable_categories = ["simple", "rapid", "heavy", "sniper", "frost"]
            .into_iter()
            .map(TowerCategory::new)
            .collect();

        Self {
            starting_money: STANDARD_MONEY,
            starting_health: STANDARD_HEALTH,
            main_wave_count: STANDARD_MAIN_WAVES,
            sub_waves_per_main: STANDARD_SUB_WAVES,
            starter_category: TowerCategory::new("simple"),
            unlockable_categories,
            max_unlockable_towers: STANDARD_MAX_UNLOCKABLE,
            grid: GridConfig {
                rows: STANDARD_ROWS,
                columns: STANDARD_COLUMNS,
                cell_size: STANDARD_CELL_SIZE,
            },
            path,
            spots,
            towers: standard_towers(),
            enemies: standard_enemies(),
            waves: Vec::new(),
        }
    }
}

fn validate_levels(definition: &TowerDefinition) -> Result<(), ConfigError> {
    if definition.levels.len() != usize::from(TowerLevel::MAX.get()) {
        return Err(ConfigError::LevelCount {
            category: definition.category.clone(),
            found: definition.levels.len(),
        });
    }

    let mut level = Some(TowerLevel::FIRST);
    for stats in &definition.levels {
        let Some(current) = level else {
            break;
        };

        let expects_merge_cost = current != TowerLevel::FIRST;
        if stats.merge_cost.is_some() != expects_merge_cost {
            return Err(ConfigError::MergeCost {
                category: definition.category.clone(),
                level: current,
            });
        }

        let positive = |value: f32| value.is_finite() && value > 0.0;
        if !positive(stats.fire_rate) || !positive(stats.range) || !positive(stats.projectile_speed)
        {
            return Err(ConfigError::InvalidStats {
                category: definition.category.clone(),
                level: current,
            });
        }

        level = current.next();
    }

    Ok(())
}

fn level(
    damage: u32,
    range: f32,
    fire_rate: f32,
    projectile_speed: f32,
    color: &str,
    merge_cost: Option<u32>,
    effect: Option<SpecialEffect>,
) -> LevelStats {
    LevelStats {
        damage,
        range,
        fire_rate,
        projectile_speed,
        color: color.to_owned(),
        merge_cost,
        effect,
    }
}

fn tower(category: &str, name: &str, cost: u32, levels: [LevelStats; 3]) -> TowerDefinition {
    TowerDefinition {
        category: TowerCategory::new(category),
        name: name.to_owned(),
        cost,
        levels: levels.into(),
    }
}

fn standard_towers() -> Vec<TowerDefinition> {
    let slow = Some(SpecialEffect::Slow);
    let splash = Some(SpecialEffect::Splash);
    vec![
        tower(
            "simple",
            "Simple Tower",
            50,
            [
                level(10, 100.0, 1.0, 300.0, "#4caf50", None, None),
                level(20, 110.0, 1.2, 320.0, "#388e3c", Some(75), None),
                level(35, 125.0, 1.5, 350.0, "#1b5e20", Some(150), None),
            ],
        ),
        tower(
            "rapid",
            "Rapid Tower",
            75,
            [
                level(4, 90.0, 4.0, 420.0, "#ffc107", None, None),
                level(7, 95.0, 5.0, 440.0, "#ffa000", Some(110), None),
                level(12, 105.0, 6.0, 460.0, "#ff6f00", Some(200), None),
            ],
        ),
        tower(
            "heavy",
            "Heavy Tower",
            120,
            [
                level(40, 110.0, 0.5, 200.0, "#795548", None, splash),
                level(75, 120.0, 0.6, 220.0, "#5d4037", Some(180), splash),
                level(130, 130.0, 0.7, 240.0, "#3e2723", Some(320), splash),
            ],
        ),
        tower(
            "sniper",
            "Sniper Tower",
            150,
            [
                level(60, 220.0, 0.4, 600.0, "#9c27b0", None, None),
                level(110, 240.0, 0.45, 650.0, "#7b1fa2", Some(220), None),
                level(190, 260.0, 0.5, 700.0, "#4a148c", Some(400), None),
            ],
        ),
        tower(
            "frost",
            "Frost Tower",
            100,
            [
                level(6, 100.0, 1.5, 280.0, "#03a9f4", None, slow),
                level(10, 110.0, 1.8, 300.0, "#0288d1", Some(150), slow),
                level(16, 120.0, 2.0, 320.0, "#01579b", Some(260), slow),
            ],
        ),
    ]
}

fn enemy(
    kind: &str,
    name: &str,
    health: u32,
    speed: f32,
    bounty: u32,
    size: f32,
    color: &str,
) -> EnemyDefinition {
    EnemyDefinition {
        kind: EnemyKind::new(kind),
        name: name.to_owned(),
        health,
        speed,
        bounty,
        size,
        color: color.to_owned(),
    }
}

fn standard_enemies() -> Vec<EnemyDefinition> {
    vec![
        enemy("grunt", "Grunt", 30, 60.0, 5, 10.0, "#e53935"),
        enemy("runner", "Runner", 18, 100.0, 6, 8.0, "#fdd835"),
        enemy("brute", "Brute", 90, 40.0, 12, 14.0, "#6d4c41"),
        enemy("swarm", "Swarmling", 10, 80.0, 2, 6.0, "#8e24aa"),
        enemy("boss", "Warlord", 600, 35.0, 100, 20.0, "#212121"),
    ]
}
