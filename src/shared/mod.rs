//! Shared components, resources, events, and states for Sproutvale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except through the
//! resources and events declared below. The level orchestrator is the one
//! place allowed to reach into several domains at once.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// `Shop` freezes movement, growth and weather; compositing keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Playing,
    Shop,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: i32 = 64;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

/// How much the player's hitbox is shrunk from the visual frame (width, height).
pub const PLAYER_HITBOX_INSET: IVec2 = IVec2::new(126, 70);

/// Evening sky colour the daylight tint fades toward (0–255 scale).
pub const SKY_END_COLOR: Vec3 = Vec3::new(38.0, 101.0, 189.0);

// ═══════════════════════════════════════════════════════════════════════
// DEPTH LAYERS
// ═══════════════════════════════════════════════════════════════════════

/// Paint-order buckets. Lower layers are painted first; inside a layer the
/// compositor sorts by vertical centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepthLayer {
    Water,
    Ground,
    Soil,
    SoilWater,
    RainFloor,
    HouseBottom,
    GroundPlant,
    Main,
    HouseTop,
    Fruit,
    RainDrops,
}

impl DepthLayer {
    pub const ALL: [DepthLayer; 11] = [
        DepthLayer::Water,
        DepthLayer::Ground,
        DepthLayer::Soil,
        DepthLayer::SoilWater,
        DepthLayer::RainFloor,
        DepthLayer::HouseBottom,
        DepthLayer::GroundPlant,
        DepthLayer::Main,
        DepthLayer::HouseTop,
        DepthLayer::Fruit,
        DepthLayer::RainDrops,
    ];

    pub fn depth(self) -> u8 {
        self as u8
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TILE COORDINATES
// ═══════════════════════════════════════════════════════════════════════

/// Grid address of a tile: world position divided by `TILE_SIZE`, rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

impl TileCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn from_world(pos: Vec2) -> Self {
        let size = TILE_SIZE as f32;
        Self {
            col: (pos.x / size).floor() as i32,
            row: (pos.y / size).floor() as i32,
        }
    }

    pub fn from_point(point: IVec2) -> Self {
        Self {
            col: point.x.div_euclid(TILE_SIZE),
            row: point.y.div_euclid(TILE_SIZE),
        }
    }

    /// The world-space square this tile covers.
    pub fn world_rect(self) -> IRect {
        rect_from_topleft(
            IVec2::new(self.col * TILE_SIZE, self.row * TILE_SIZE),
            IVec2::splat(TILE_SIZE),
        )
    }

    pub fn offset(self, dcol: i32, drow: i32) -> Self {
        Self::new(self.col + dcol, self.row + drow)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RECTANGLES
//
// World space is y-down with integer pixel rects, matching the map data.
// Edges follow half-open semantics: a rect covers [min, max).
// ═══════════════════════════════════════════════════════════════════════

pub fn rect_from_topleft(topleft: IVec2, size: IVec2) -> IRect {
    IRect {
        min: topleft,
        max: topleft + size,
    }
}

pub fn rect_from_center(center: IVec2, size: IVec2) -> IRect {
    rect_from_topleft(center - size / 2, size)
}

pub fn rect_from_midbottom(midbottom: IVec2, size: IVec2) -> IRect {
    rect_from_topleft(
        IVec2::new(midbottom.x - size.x / 2, midbottom.y - size.y),
        size,
    )
}

pub fn rect_center(rect: IRect) -> IVec2 {
    rect.min + rect.size() / 2
}

pub fn rect_midbottom(rect: IRect) -> IVec2 {
    IVec2::new(rect.min.x + rect.width() / 2, rect.max.y)
}

pub fn center_y(rect: IRect) -> i32 {
    rect.min.y + rect.height() / 2
}

/// Move a rect so its centre lands on `center`, keeping its size.
pub fn recenter(rect: IRect, center: IVec2) -> IRect {
    rect_from_center(center, rect.size())
}

/// Grow (or shrink, with negative deltas) a rect around its centre.
pub fn inflate(rect: IRect, dx: i32, dy: i32) -> IRect {
    let min = IVec2::new(rect.min.x - dx / 2, rect.min.y - dy / 2);
    let size = IVec2::new((rect.width() + dx).max(0), (rect.height() + dy).max(0));
    rect_from_topleft(min, size)
}

/// True when the two rects share a non-zero area.
pub fn overlaps(a: IRect, b: IRect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

pub fn contains_point(rect: IRect, point: Vec2) -> bool {
    point.x >= rect.min.x as f32
        && point.x < rect.max.x as f32
        && point.y >= rect.min.y as f32
        && point.y < rect.max.y as f32
}

// ═══════════════════════════════════════════════════════════════════════
// DRAWABLES & COLLISION
// ═══════════════════════════════════════════════════════════════════════

/// One image out of an asset frame sequence, with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Path relative to the asset root.
    pub path: String,
    pub size: IVec2,
}

impl Frame {
    pub fn new(path: impl Into<String>, size: IVec2) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Anything painted into the world: a rect, the current image and a depth layer.
#[derive(Component, Debug, Clone)]
pub struct Drawable {
    pub rect: IRect,
    pub image: Frame,
    pub layer: DepthLayer,
}

impl Drawable {
    pub fn at_topleft(topleft: IVec2, image: Frame, layer: DepthLayer) -> Self {
        Self {
            rect: rect_from_topleft(topleft, image.size),
            image,
            layer,
        }
    }

    pub fn centered(center: IVec2, image: Frame, layer: DepthLayer) -> Self {
        Self {
            rect: rect_from_center(center, image.size),
            image,
            layer,
        }
    }

    pub fn at_midbottom(midbottom: IVec2, image: Frame, layer: DepthLayer) -> Self {
        Self {
            rect: rect_from_midbottom(midbottom, image.size),
            image,
            layer,
        }
    }

    /// Swap the image, keeping the rect's midbottom anchored.
    pub fn set_image_anchored(&mut self, image: Frame) {
        if image.size != self.rect.size() {
            self.rect = rect_from_midbottom(rect_midbottom(self.rect), image.size);
        }
        self.image = image;
    }
}

/// Static solid rectangle the player cannot overlap.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider(pub IRect);

/// The player's collision rectangle, inset from its drawable.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox(pub IRect);

/// Short-lived drawable that despawns itself when the timer runs out.
#[derive(Component, Debug, Clone)]
pub struct Particle {
    pub timer: Timer,
}

impl Particle {
    pub fn lasting(secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Once),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    Bed,
    Trader,
}

/// Invisible area the player can interact with.
#[derive(Component, Debug, Clone, Copy)]
pub struct InteractionZone {
    pub kind: ZoneKind,
    pub rect: IRect,
}

/// Lifetime of harvest / apple flashes.
pub const PARTICLE_SECS: f32 = 0.2;

// ═══════════════════════════════════════════════════════════════════════
// FRAME ORDER
// ═══════════════════════════════════════════════════════════════════════

/// Per-frame phases inside `Update`, chained in this order by the level
/// orchestrator. Drawable sync for spawned/despawned tiles runs in `PostUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Clear the frame buffer and paint every drawable.
    Composite,
    /// Player chain and animated entities. Frozen while the shop is open.
    Simulate,
    /// Tool and seed effects fired by the player's timers this frame.
    Effects,
    /// Player ↔ ripe plant collection.
    Harvest,
    /// Rain overlay and sky tint.
    Weather,
    /// Sleep transition and day-advance.
    Sleep,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER-FACING ENUMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn name(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    /// Offset from the player's centre to the point tools are aimed at.
    pub fn tool_offset(self) -> Vec2 {
        match self {
            Facing::Left => Vec2::new(-50.0, 40.0),
            Facing::Right => Vec2::new(50.0, 40.0),
            Facing::Up => Vec2::new(0.0, -10.0),
            Facing::Down => Vec2::new(0.0, 50.0),
        }
    }
}

/// What the player is doing, combined with `Facing` into the animation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerMode {
    #[default]
    Idle,
    Walking,
    Tool(ToolKind),
}

/// Frame-library key of the character animation for a status, e.g.
/// `character/left_axe`. Walking uses the bare facing name.
pub fn animation_key(facing: Facing, mode: PlayerMode) -> String {
    match mode {
        PlayerMode::Idle => format!("character/{}_idle", facing.name()),
        PlayerMode::Walking => format!("character/{}", facing.name()),
        PlayerMode::Tool(tool) => format!("character/{}_{}", facing.name(), tool.name()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Hoe,
    Axe,
    Water,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Hoe => "hoe",
            ToolKind::Axe => "axe",
            ToolKind::Water => "water",
        }
    }
}

/// The ordered list of tools for cycling.
pub const TOOL_ORDER: [ToolKind; 3] = [ToolKind::Hoe, ToolKind::Axe, ToolKind::Water];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Corn,
    Tomato,
}

impl Species {
    pub fn name(self) -> &'static str {
        match self {
            Species::Corn => "corn",
            Species::Tomato => "tomato",
        }
    }

    pub fn harvest_item(self) -> ItemKind {
        match self {
            Species::Corn => ItemKind::Corn,
            Species::Tomato => ItemKind::Tomato,
        }
    }
}

/// The ordered list of seeds for cycling.
pub const SEED_ORDER: [Species; 2] = [Species::Corn, Species::Tomato];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Wood,
    Apple,
    Corn,
    Tomato,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [ItemKind::Wood, ItemKind::Apple, ItemKind::Corn, ItemKind::Tomato];

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Wood => "wood",
            ItemKind::Apple => "apple",
            ItemKind::Corn => "corn",
            ItemKind::Tomato => "tomato",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

/// Item and seed counts plus money. Counts never go below zero.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Inventory {
    pub items: HashMap<ItemKind, u32>,
    pub seeds: HashMap<Species, u32>,
    pub money: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_starting(200, 5)
    }
}

impl Inventory {
    pub fn with_starting(money: u32, seeds_each: u32) -> Self {
        Self {
            items: ItemKind::ALL.iter().map(|&item| (item, 0)).collect(),
            seeds: SEED_ORDER.iter().map(|&s| (s, seeds_each)).collect(),
            money,
        }
    }

    pub fn count(&self, item: ItemKind) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item: ItemKind, quantity: u32) {
        *self.items.entry(item).or_insert(0) += quantity;
    }

    /// Remove one item. Returns false (and changes nothing) if none are owned.
    pub fn take(&mut self, item: ItemKind) -> bool {
        match self.items.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn seed_count(&self, species: Species) -> u32 {
        self.seeds.get(&species).copied().unwrap_or(0)
    }

    pub fn add_seed(&mut self, species: Species, quantity: u32) {
        *self.seeds.entry(species).or_insert(0) += quantity;
    }

    pub fn take_seed(&mut self, species: Species) -> bool {
        match self.seeds.get_mut(&species) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

/// Marker for the single player entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Selections and the sleep flag. Other domains read this; only the player
/// domain and the day transition write it.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub tool_index: usize,
    pub seed_index: usize,
    /// While true the player ignores all input. Cleared by the day transition.
    pub sleeping: bool,
}

impl PlayerState {
    pub fn selected_tool(&self) -> ToolKind {
        TOOL_ORDER[self.tool_index % TOOL_ORDER.len()]
    }

    pub fn selected_seed(&self) -> Species {
        SEED_ORDER[self.seed_index % SEED_ORDER.len()]
    }

    pub fn cycle_tool(&mut self) {
        self.tool_index = (self.tool_index + 1) % TOOL_ORDER.len();
    }

    pub fn cycle_seed(&mut self) {
        self.seed_index = (self.seed_index + 1) % SEED_ORDER.len();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT — abstract actions, filled once per frame
// ═══════════════════════════════════════════════════════════════════════

/// Held-state action flags. Gameplay systems read only this, never raw keys,
/// so headless tests can drive the player by writing the resource directly.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub use_tool: bool,
    pub next_tool: bool,
    pub use_seed: bool,
    pub next_seed: bool,
    pub interact: bool,
    pub close_menu: bool,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub use_tool: KeyCode,
    pub next_tool: KeyCode,
    pub use_seed: KeyCode,
    pub next_seed: KeyCode,
    pub interact: KeyCode,
    pub close_menu: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::ArrowUp,
            move_down: KeyCode::ArrowDown,
            move_left: KeyCode::ArrowLeft,
            move_right: KeyCode::ArrowRight,
            use_tool: KeyCode::Space,
            next_tool: KeyCode::KeyQ,
            use_seed: KeyCode::ControlLeft,
            next_seed: KeyCode::KeyE,
            interact: KeyCode::Enter,
            close_menu: KeyCode::Escape,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SCREEN TINT
// ═══════════════════════════════════════════════════════════════════════

/// Colour multiplied into the whole composited frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ScreenTint {
    /// Daylight colour on the 0–255 scale, written by the weather domain.
    pub sky: Vec3,
    /// Day-transition brightness in 0..=1, written by the level orchestrator.
    pub brightness: f32,
}

impl Default for ScreenTint {
    fn default() -> Self {
        Self {
            sky: Vec3::splat(255.0),
            brightness: 1.0,
        }
    }
}

impl ScreenTint {
    /// Final multiplier per channel, 0..=1.
    pub fn multiplier(&self) -> Vec3 {
        (self.sky / 255.0 * self.brightness).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RANDOMNESS
// ═══════════════════════════════════════════════════════════════════════

/// The simulation's only random source. Seed it for reproducible runs.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }
}

/// Force a chance into 0..=1 so `Rng::gen_bool` never panics. NaN means never.
pub fn probability(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// A tool swing finished; `target` is the world point captured when it started.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target: Vec2,
}

/// A seed throw finished at the captured target.
#[derive(Event, Debug, Clone)]
pub struct SeedUseEvent {
    pub species: Species,
    pub target: Vec2,
}

/// Day-advance callback. Ignored unless `day` is the current day.
#[derive(Event, Debug, Clone, Copy)]
pub struct DayAdvanceEvent {
    pub day: u32,
}

/// Flip between `GameState::Playing` and `GameState::Shop`.
#[derive(Event, Debug, Clone, Copy)]
pub struct ShopToggleEvent;

/// A shop menu request. Applied only while `GameState::Shop` is active.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeEvent {
    Sell(ItemKind),
    BuySeed(Species),
}

/// A living plant was collected by the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct HarvestEvent {
    pub species: Species,
    pub tile: TileCoord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_coord_floors_negative_positions() {
        assert_eq!(TileCoord::from_world(Vec2::new(63.9, 64.0)), TileCoord::new(0, 1));
        assert_eq!(TileCoord::from_world(Vec2::new(-1.0, -64.0)), TileCoord::new(-1, -1));
        assert_eq!(TileCoord::from_point(IVec2::new(-65, 128)), TileCoord::new(-2, 2));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = rect_from_topleft(IVec2::ZERO, IVec2::splat(10));
        let b = rect_from_topleft(IVec2::new(10, 0), IVec2::splat(10));
        assert!(!overlaps(a, b));
        assert!(overlaps(a, inflate(b, 2, 0)));
    }

    #[test]
    fn inflate_keeps_center_for_even_deltas() {
        let r = rect_from_center(IVec2::new(100, 100), IVec2::splat(192));
        let hitbox = inflate(r, -PLAYER_HITBOX_INSET.x, -PLAYER_HITBOX_INSET.y);
        assert_eq!(hitbox.size(), IVec2::new(66, 122));
        assert_eq!(rect_center(hitbox), IVec2::new(100, 100));
    }

    #[test]
    fn contains_point_is_half_open() {
        let r = rect_from_topleft(IVec2::ZERO, IVec2::splat(64));
        assert!(contains_point(r, Vec2::new(0.0, 63.5)));
        assert!(!contains_point(r, Vec2::new(64.0, 10.0)));
    }

    #[test]
    fn inventory_take_on_empty_is_a_noop() {
        let mut inv = Inventory::with_starting(0, 0);
        let before = inv.clone();
        assert!(!inv.take(ItemKind::Wood));
        assert!(!inv.take_seed(Species::Corn));
        assert_eq!(inv, before);
    }

    #[test]
    fn selections_wrap() {
        let mut state = PlayerState::default();
        for _ in 0..TOOL_ORDER.len() {
            state.cycle_tool();
        }
        assert_eq!(state.selected_tool(), ToolKind::Hoe);
        state.cycle_seed();
        assert_eq!(state.selected_seed(), Species::Tomato);
        state.cycle_seed();
        assert_eq!(state.selected_seed(), Species::Corn);
    }

    #[test]
    fn screen_tint_combines_sky_and_brightness() {
        let tint = ScreenTint {
            sky: Vec3::new(255.0, 0.0, 127.5),
            brightness: 0.5,
        };
        assert_eq!(tint.multiplier(), Vec3::new(0.5, 0.0, 0.25));
    }

    #[test]
    fn probability_is_always_a_valid_chance() {
        assert_eq!(probability(1.5), 1.0);
        assert_eq!(probability(-0.2), 0.0);
        assert_eq!(probability(f64::NAN), 0.0);
        assert_eq!(probability(0.3), 0.3);
    }

    #[test]
    fn depth_layers_are_ascending() {
        for pair in DepthLayer::ALL.windows(2) {
            assert!(pair[0].depth() < pair[1].depth());
        }
    }
}
