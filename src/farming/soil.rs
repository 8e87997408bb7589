//! Soil grid: per-tile cultivation flags and the plant arena.
//!
//! Pure data, no ECS. Every operation is keyed by `TileCoord`; coordinates
//! outside the grid are silently ignored.

use bevy::prelude::*;
use crate::shared::*;
use super::CropRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoilCell {
    pub tilled: bool,
    pub watered: bool,
    pub plant: Option<PlantId>,
}

/// Generational handle into the plant arena. A harvested plant's id never
/// resolves again, even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlantId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub species: Species,
    pub tile: TileCoord,
    pub growth_stage: f32,
    pub harvestable: bool,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    plant: Option<Plant>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct SoilGrid {
    cols: i32,
    rows: i32,
    cells: Vec<SoilCell>,
    farmable: Vec<bool>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Today's weather. Freshly tilled soil is watered straight away when set.
    pub raining: bool,
}

impl SoilGrid {
    pub fn new(cols: i32, rows: i32, farmable: impl IntoIterator<Item = TileCoord>) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        let len = (cols * rows) as usize;
        let mut grid = Self {
            cols,
            rows,
            cells: vec![SoilCell::default(); len],
            farmable: vec![false; len],
            ..default()
        };
        for tile in farmable {
            if let Some(i) = grid.index(tile) {
                grid.farmable[i] = true;
            }
        }
        grid
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.cols, self.rows)
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let inside = (0..self.cols).contains(&tile.col) && (0..self.rows).contains(&tile.row);
        inside.then(|| (tile.row * self.cols + tile.col) as usize)
    }

    fn tile_at(&self, index: usize) -> TileCoord {
        let index = index as i32;
        TileCoord::new(index % self.cols, index / self.cols)
    }

    pub fn cell(&self, tile: TileCoord) -> Option<&SoilCell> {
        self.index(tile).map(|i| &self.cells[i])
    }

    pub fn is_farmable(&self, tile: TileCoord) -> bool {
        self.index(tile).is_some_and(|i| self.farmable[i])
    }

    pub fn is_tilled(&self, tile: TileCoord) -> bool {
        self.cell(tile).is_some_and(|c| c.tilled)
    }

    pub fn is_watered(&self, tile: TileCoord) -> bool {
        self.cell(tile).is_some_and(|c| c.watered)
    }

    /// Mark a farmable cell tilled. Returns true only when the cell changed.
    pub fn till(&mut self, tile: TileCoord) -> bool {
        let Some(i) = self.index(tile) else {
            return false;
        };
        if !self.farmable[i] || self.cells[i].tilled {
            return false;
        }
        self.cells[i].tilled = true;
        if self.raining {
            self.cells[i].watered = true;
        }
        true
    }

    /// Water a tilled cell. Returns true only when the cell changed.
    pub fn water(&mut self, tile: TileCoord) -> bool {
        let Some(i) = self.index(tile) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if !cell.tilled || cell.watered {
            return false;
        }
        cell.watered = true;
        true
    }

    pub fn remove_water(&mut self) {
        for cell in &mut self.cells {
            cell.watered = false;
        }
    }

    pub fn water_all(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.tilled) {
            cell.watered = true;
        }
    }

    pub fn can_plant(&self, tile: TileCoord) -> bool {
        self.cell(tile).is_some_and(|c| c.tilled && c.plant.is_none())
    }

    /// Put a stage-0 plant on a tilled, empty cell.
    pub fn plant(&mut self, tile: TileCoord, species: Species) -> Option<PlantId> {
        if !self.can_plant(tile) {
            return None;
        }
        let i = self.index(tile)?;
        let plant = Plant {
            species,
            tile,
            growth_stage: 0.0,
            harvestable: false,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.plant = Some(plant);
                PlantId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    plant: Some(plant),
                });
                PlantId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.cells[i].plant = Some(id);
        Some(id)
    }

    pub fn get_plant(&self, id: PlantId) -> Option<&Plant> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.plant.as_ref())
    }

    pub fn plant_at(&self, tile: TileCoord) -> Option<(PlantId, &Plant)> {
        let id = self.cell(tile)?.plant?;
        self.get_plant(id).map(|plant| (id, plant))
    }

    /// Every living plant, in arena order.
    pub fn plants(&self) -> impl Iterator<Item = (PlantId, &Plant)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.plant.as_ref().map(|plant| {
                (
                    PlantId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    plant,
                )
            })
        })
    }

    /// Grow every plant standing on watered soil by its species' rate.
    /// Returns how many plants grew.
    pub fn update_plants(&mut self, crops: &CropRegistry) -> usize {
        let mut grown = 0;
        for slot in &mut self.slots {
            let Some(plant) = slot.plant.as_mut() else {
                continue;
            };
            let watered = (0..self.cols).contains(&plant.tile.col)
                && (0..self.rows).contains(&plant.tile.row)
                && self.cells[(plant.tile.row * self.cols + plant.tile.col) as usize].watered;
            if !watered {
                continue;
            }
            let def = crops.get(plant.species);
            let max = def.max_stage as f32;
            if plant.growth_stage < max {
                plant.growth_stage = (plant.growth_stage + def.growth_rate).min(max);
                grown += 1;
            }
            plant.harvestable = plant.growth_stage >= max;
        }
        grown
    }

    /// Collect a ripe plant, freeing its cell. Unripe or stale ids change nothing.
    pub fn harvest(&mut self, id: PlantId) -> Option<ItemKind> {
        let plant = self.get_plant(id)?;
        if !plant.harvestable {
            return None;
        }
        let tile = plant.tile;
        let species = plant.species;

        let slot = &mut self.slots[id.index as usize];
        slot.plant = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        if let Some(i) = self.index(tile) {
            self.cells[i].plant = None;
        }
        Some(species.harvest_item())
    }

    pub fn tilled_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.tilled)
            .map(|(i, _)| self.tile_at(i))
    }

    pub fn watered_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.watered)
            .map(|(i, _)| self.tile_at(i))
    }

    /// Which orthogonal neighbours are tilled: up=1, right=2, down=4, left=8.
    pub fn neighbour_mask(&self, tile: TileCoord) -> u8 {
        [(0, -1, 1), (1, 0, 2), (0, 1, 4), (-1, 0, 8)]
            .into_iter()
            .filter(|&(dc, dr, _)| self.is_tilled(tile.offset(dc, dr)))
            .fold(0, |mask, (_, _, bit)| mask | bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SoilGrid {
        SoilGrid::new(
            4,
            4,
            [TileCoord::new(1, 1), TileCoord::new(2, 1), TileCoord::new(1, 2)],
        )
    }

    fn ripe_corn(grid: &mut SoilGrid, tile: TileCoord) -> PlantId {
        let crops = CropRegistry::default();
        grid.till(tile);
        let id = grid.plant(tile, Species::Corn).unwrap();
        for _ in 0..5 {
            grid.water(tile);
            grid.update_plants(&crops);
            grid.remove_water();
        }
        id
    }

    #[test]
    fn till_is_idempotent() {
        let mut once = grid();
        once.till(TileCoord::new(1, 1));
        let mut twice = grid();
        assert!(twice.till(TileCoord::new(1, 1)));
        assert!(!twice.till(TileCoord::new(1, 1)));
        assert_eq!(once.cell(TileCoord::new(1, 1)), twice.cell(TileCoord::new(1, 1)));
    }

    #[test]
    fn till_outside_farmable_area_is_noop() {
        let mut g = grid();
        assert!(!g.till(TileCoord::new(0, 0)));
        assert!(!g.till(TileCoord::new(-3, 9)));
        assert_eq!(g.tilled_tiles().count(), 0);
    }

    #[test]
    fn tilling_in_rain_waters() {
        let mut g = grid();
        g.raining = true;
        g.till(TileCoord::new(2, 1));
        assert!(g.is_watered(TileCoord::new(2, 1)));
    }

    #[test]
    fn water_and_plant_require_tilled_soil() {
        let mut g = grid();
        let tile = TileCoord::new(1, 1);
        assert!(!g.water(tile));
        assert!(g.plant(tile, Species::Corn).is_none());
        g.till(tile);
        assert!(g.water(tile));
        assert!(g.plant(tile, Species::Corn).is_some());
        assert!(g.plant(tile, Species::Tomato).is_none(), "one plant per cell");
    }

    #[test]
    fn unwatered_plants_do_not_grow() {
        let crops = CropRegistry::default();
        let mut g = grid();
        let tile = TileCoord::new(1, 1);
        g.till(tile);
        g.water(tile);
        let id = g.plant(tile, Species::Corn).unwrap();

        g.remove_water();
        assert_eq!(g.update_plants(&crops), 0);
        assert_eq!(g.get_plant(id).unwrap().growth_stage, 0.0);

        g.water(tile);
        g.update_plants(&crops);
        assert_eq!(g.get_plant(id).unwrap().growth_stage, 1.0);
    }

    #[test]
    fn tomato_grows_by_its_rate() {
        let crops = CropRegistry::default();
        let mut g = grid();
        let tile = TileCoord::new(1, 2);
        g.till(tile);
        let id = g.plant(tile, Species::Tomato).unwrap();
        g.water(tile);
        g.update_plants(&crops);
        assert!((g.get_plant(id).unwrap().growth_stage - 0.7).abs() < 1e-6);
    }

    #[test]
    fn rain_waters_every_tilled_cell() {
        let mut g = grid();
        g.till(TileCoord::new(1, 1));
        g.till(TileCoord::new(2, 1));
        g.water(TileCoord::new(1, 1));
        g.remove_water();
        g.water_all();
        assert!(g.is_watered(TileCoord::new(1, 1)));
        assert!(g.is_watered(TileCoord::new(2, 1)));
        assert!(!g.is_watered(TileCoord::new(1, 2)), "untilled stays dry");
    }

    #[test]
    fn growth_is_monotone_and_harvestable_at_max() {
        let crops = CropRegistry::default();
        let mut g = grid();
        let tile = TileCoord::new(1, 1);
        g.till(tile);
        let id = g.plant(tile, Species::Tomato).unwrap();
        let mut last = 0.0;
        for _ in 0..12 {
            g.water(tile);
            g.update_plants(&crops);
            g.remove_water();
            let plant = g.get_plant(id).unwrap();
            assert!(plant.growth_stage >= last);
            assert_eq!(plant.harvestable, plant.growth_stage >= 5.0);
            last = plant.growth_stage;
        }
        assert!(g.get_plant(id).unwrap().harvestable);
    }

    #[test]
    fn harvest_frees_the_cell() {
        let mut g = grid();
        let tile = TileCoord::new(1, 1);
        let id = ripe_corn(&mut g, tile);
        assert_eq!(g.harvest(id), Some(ItemKind::Corn));
        assert!(g.get_plant(id).is_none());
        assert!(g.harvest(id).is_none(), "stale id");
        let again = g.plant(tile, Species::Corn).unwrap();
        assert_ne!(again, id, "reused slot gets a new generation");
    }

    #[test]
    fn unripe_harvest_is_noop() {
        let mut g = grid();
        let tile = TileCoord::new(1, 1);
        g.till(tile);
        let id = g.plant(tile, Species::Corn).unwrap();
        assert!(g.harvest(id).is_none());
        assert!(g.plant_at(tile).is_some());
    }

    #[test]
    fn neighbour_mask_bits() {
        let mut g = grid();
        g.till(TileCoord::new(1, 1));
        g.till(TileCoord::new(2, 1));
        g.till(TileCoord::new(1, 2));
        assert_eq!(g.neighbour_mask(TileCoord::new(1, 1)), 2 | 4);
        assert_eq!(g.neighbour_mask(TileCoord::new(2, 1)), 8);
        assert_eq!(g.neighbour_mask(TileCoord::new(1, 2)), 1);
    }
}
