//! One-at-a-time tooltip bookkeeping.
//!
//! Corner-anchored tooltips are mutually exclusive and expire on their own;
//! inline tooltips stay until the pointer leaves them.

use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    BottomLeft,
    BottomRight,
}

impl Placement {
    pub fn is_anchored(&self) -> bool {
        matches!(self, Placement::BottomLeft | Placement::BottomRight)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTooltip {
    pub id: String,
    pub placement: Placement,
    /// Set for anchored tooltips only
    pub hide_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct TooltipCoordinator {
    active: Option<ActiveTooltip>,
    auto_hide: Duration,
}

impl Default for TooltipCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}

impl TooltipCoordinator {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            active: None,
            auto_hide,
        }
    }

    /// Make `id` the visible tooltip, replacing whatever was shown
    pub fn show(&mut self, id: impl Into<String>, placement: Placement, now: Instant) {
        let id = id.into();
        let hide_at = placement.is_anchored().then(|| now + self.auto_hide);
        if let Some(previous) = &self.active {
            if previous.id != id {
                debug!(target: "ui", "Tooltip '{}' replaced by '{}'", previous.id, id);
            }
        }
        self.active = Some(ActiveTooltip {
            id,
            placement,
            hide_at,
        });
    }

    /// Pointer left the trigger. Anchored tooltips ignore this.
    pub fn leave(&mut self, id: &str) {
        let hide = self
            .active
            .as_ref()
            .map(|t| t.id == id && !t.placement.is_anchored())
            .unwrap_or(false);
        if hide {
            self.active = None;
        }
    }

    pub fn hide(&mut self) {
        self.active = None;
    }

    /// Expire an anchored tooltip whose deadline has passed.
    /// Returns true when something was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self
            .active
            .as_ref()
            .and_then(|t| t.hide_at)
            .map(|deadline| now >= deadline)
            .unwrap_or(false);
        if expired {
            self.active = None;
        }
        expired
    }

    pub fn visible(&self) -> Option<&ActiveTooltip> {
        self.active.as_ref()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.active.as_ref().map(|t| t.id == id).unwrap_or(false)
    }
}
