//! Economy domain — trader prices and the sell/buy operations on the inventory.
//!
//! The menu that sends `TradeEvent`s lives outside the simulation; trades are
//! applied only while the shop is open.

use bevy::prelude::*;
use std::collections::HashMap;
use crate::shared::*;

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PriceList>()
            .add_systems(Update, handle_trades.run_if(in_state(GameState::Shop)));
    }
}

/// What the trader pays per item and charges per seed.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PriceList {
    pub sell: HashMap<ItemKind, u32>,
    pub seed_cost: HashMap<Species, u32>,
}

impl Default for PriceList {
    fn default() -> Self {
        Self {
            sell: HashMap::from([
                (ItemKind::Wood, 4),
                (ItemKind::Apple, 2),
                (ItemKind::Corn, 10),
                (ItemKind::Tomato, 20),
            ]),
            seed_cost: HashMap::from([(Species::Corn, 4), (Species::Tomato, 5)]),
        }
    }
}

impl PriceList {
    pub fn sell_price(&self, item: ItemKind) -> u32 {
        self.sell.get(&item).copied().unwrap_or(0)
    }

    pub fn seed_price(&self, species: Species) -> Option<u32> {
        self.seed_cost.get(&species).copied()
    }
}

/// Trade one owned item for money. False when none is owned.
pub fn sell(inventory: &mut Inventory, prices: &PriceList, item: ItemKind) -> bool {
    if !inventory.take(item) {
        return false;
    }
    inventory.money = inventory.money.saturating_add(prices.sell_price(item));
    true
}

/// Buy one seed. False when the trader does not stock it or money is short.
pub fn buy_seed(inventory: &mut Inventory, prices: &PriceList, species: Species) -> bool {
    let Some(cost) = prices.seed_price(species) else {
        return false;
    };
    if inventory.money < cost {
        return false;
    }
    inventory.money -= cost;
    inventory.add_seed(species, 1);
    true
}

fn handle_trades(
    mut events: EventReader<TradeEvent>,
    prices: Res<PriceList>,
    mut inventory: ResMut<Inventory>,
) {
    for event in events.read() {
        let applied = match *event {
            TradeEvent::Sell(item) => sell(&mut inventory, &prices, item),
            TradeEvent::BuySeed(species) => buy_seed(&mut inventory, &prices, species),
        };
        if applied {
            debug!("[Economy] {:?} applied. Money: {}", event, inventory.money);
        } else {
            debug!("[Economy] {:?} rejected", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selling_moves_one_item_to_money() {
        let prices = PriceList::default();
        let mut inventory = Inventory::with_starting(0, 0);
        inventory.add(ItemKind::Tomato, 2);

        assert!(sell(&mut inventory, &prices, ItemKind::Tomato));
        assert_eq!(inventory.count(ItemKind::Tomato), 1);
        assert_eq!(inventory.money, 20);
    }

    #[test]
    fn selling_unowned_item_changes_nothing() {
        let prices = PriceList::default();
        let mut inventory = Inventory::with_starting(50, 1);
        let before = inventory.clone();

        assert!(!sell(&mut inventory, &prices, ItemKind::Wood));
        assert_eq!(inventory, before);
    }

    #[test]
    fn buying_needs_enough_money() {
        let prices = PriceList::default();
        let mut inventory = Inventory::with_starting(9, 0);

        assert!(buy_seed(&mut inventory, &prices, Species::Tomato));
        assert!(buy_seed(&mut inventory, &prices, Species::Corn));
        assert_eq!(inventory.money, 0);
        assert!(!buy_seed(&mut inventory, &prices, Species::Corn));
        assert_eq!(inventory.seed_count(Species::Corn), 1);
        assert_eq!(inventory.seed_count(Species::Tomato), 1);
    }
}
