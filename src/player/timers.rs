//! Action timers — one per action class, each gating its own re-trigger.
//!
//! A timer may carry a pending effect captured at activation. The effect is
//! handed back on expiry and the caller dispatches it by tag.

use bevy::prelude::*;
use std::time::Duration;
use crate::config::SimConfig;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedAction {
    ToolUse,
    ToolSwitch,
    SeedUse,
    SeedSwitch,
}

impl TimedAction {
    /// Expiry dispatch order within a single tick.
    pub const ALL: [TimedAction; 4] = [
        TimedAction::ToolUse,
        TimedAction::ToolSwitch,
        TimedAction::SeedUse,
        TimedAction::SeedSwitch,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// What to apply when a use-timer runs out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingEffect {
    Tool { tool: ToolKind, target: Vec2 },
    Seed { species: Species, target: Vec2 },
}

#[derive(Debug, Clone)]
struct ActionTimer {
    timer: Timer,
    active: bool,
    pending: Option<PendingEffect>,
}

impl ActionTimer {
    fn new(secs: f32) -> Self {
        Self {
            timer: Timer::from_seconds(secs, TimerMode::Once),
            active: false,
            pending: None,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct ActionTimers {
    timers: [ActionTimer; 4],
}

impl Default for ActionTimers {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl ActionTimers {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            timers: [
                ActionTimer::new(config.tool_use_secs),
                ActionTimer::new(config.tool_switch_secs),
                ActionTimer::new(config.seed_use_secs),
                ActionTimer::new(config.seed_switch_secs),
            ],
        }
    }

    pub fn is_active(&self, action: TimedAction) -> bool {
        self.timers[action.index()].active
    }

    /// Start `action`'s timer. Ignored (returns false) while it is already running.
    pub fn activate(&mut self, action: TimedAction, pending: Option<PendingEffect>) -> bool {
        let slot = &mut self.timers[action.index()];
        if slot.active {
            return false;
        }
        slot.timer.reset();
        slot.active = true;
        slot.pending = pending;
        true
    }

    /// Advance every running timer. Returns the actions that expired this tick
    /// with their pending effects, in `TimedAction::ALL` order.
    pub fn tick(&mut self, delta: Duration) -> Vec<(TimedAction, Option<PendingEffect>)> {
        let mut expired = Vec::new();
        for action in TimedAction::ALL {
            let slot = &mut self.timers[action.index()];
            if !slot.active {
                continue;
            }
            slot.timer.tick(delta);
            if slot.timer.finished() {
                slot.active = false;
                expired.push((action, slot.pending.take()));
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn retrigger_while_active_is_ignored() {
        let mut timers = ActionTimers::default();
        assert!(timers.activate(TimedAction::ToolSwitch, None));
        assert!(!timers.activate(TimedAction::ToolSwitch, None));
        assert!(timers.tick(ms(199)).is_empty());
        assert_eq!(timers.tick(ms(2)), vec![(TimedAction::ToolSwitch, None)]);
        assert!(timers.activate(TimedAction::ToolSwitch, None));
    }

    #[test]
    fn pending_effect_comes_back_on_expiry() {
        let mut timers = ActionTimers::default();
        let effect = PendingEffect::Tool {
            tool: ToolKind::Hoe,
            target: Vec2::new(10.0, 20.0),
        };
        timers.activate(TimedAction::ToolUse, Some(effect));
        assert!(timers.tick(ms(300)).is_empty());
        assert!(timers.is_active(TimedAction::ToolUse));
        assert_eq!(timers.tick(ms(60)), vec![(TimedAction::ToolUse, Some(effect))]);
        assert!(!timers.is_active(TimedAction::ToolUse));
    }

    #[test]
    fn timers_run_independently() {
        let mut timers = ActionTimers::default();
        timers.activate(TimedAction::SeedUse, None);
        timers.activate(TimedAction::SeedSwitch, None);
        let expired: Vec<TimedAction> = timers.tick(ms(250)).into_iter().map(|(a, _)| a).collect();
        assert_eq!(expired, vec![TimedAction::SeedSwitch]);
        assert!(timers.is_active(TimedAction::SeedUse));
    }
}
