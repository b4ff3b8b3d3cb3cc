//! Notifications the core emits towards the UI (minimap, unit list, title bar).
//!
//! All calls are fire-and-forget. Hosts either implement [`MapObserver`]
//! directly or collect [`Effect`]s with an [`EffectLog`] and apply them later.

use pudedit_protocol::PlayerId;

use crate::index::UnitRef;

pub trait MapObserver {
    /// A single cell changed.
    fn minimap_update(&mut self, _x: u16, _y: u16) {}

    /// A region changed and must be repainted.
    fn minimap_render(&mut self, _x: u16, _y: u16, _w: u16, _h: u16) {}

    fn unit_listed(&mut self, _player: PlayerId, _unit: UnitRef) {}

    fn unit_unlisted(&mut self, _player: PlayerId, _unit: UnitRef) {}

    /// The unit index was rebuilt from the grid (after undo/redo or load).
    fn units_recounted(&mut self, _count: u16) {}

    fn document_changed(&mut self) {}
}

impl<T: MapObserver + ?Sized> MapObserver for &mut T {
    fn minimap_update(&mut self, x: u16, y: u16) {
        (**self).minimap_update(x, y)
    }

    fn minimap_render(&mut self, x: u16, y: u16, w: u16, h: u16) {
        (**self).minimap_render(x, y, w, h)
    }

    fn unit_listed(&mut self, player: PlayerId, unit: UnitRef) {
        (**self).unit_listed(player, unit)
    }

    fn unit_unlisted(&mut self, player: PlayerId, unit: UnitRef) {
        (**self).unit_unlisted(player, unit)
    }

    fn units_recounted(&mut self, count: u16) {
        (**self).units_recounted(count)
    }

    fn document_changed(&mut self) {
        (**self).document_changed()
    }
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl MapObserver for NullObserver {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    MinimapUpdate { x: u16, y: u16 },
    MinimapRender { x: u16, y: u16, w: u16, h: u16 },
    UnitListed { player: PlayerId, unit: UnitRef },
    UnitUnlisted { player: PlayerId, unit: UnitRef },
    UnitsRecounted { count: u16 },
    DocumentChanged,
}

/// Records notifications in emission order.
#[derive(Clone, Debug, Default)]
pub struct EffectLog {
    effects: Vec<Effect>,
}

impl EffectLog {
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

impl MapObserver for EffectLog {
    fn minimap_update(&mut self, x: u16, y: u16) {
        self.effects.push(Effect::MinimapUpdate { x, y });
    }

    fn minimap_render(&mut self, x: u16, y: u16, w: u16, h: u16) {
        self.effects.push(Effect::MinimapRender { x, y, w, h });
    }

    fn unit_listed(&mut self, player: PlayerId, unit: UnitRef) {
        self.effects.push(Effect::UnitListed { player, unit });
    }

    fn unit_unlisted(&mut self, player: PlayerId, unit: UnitRef) {
        self.effects.push(Effect::UnitUnlisted { player, unit });
    }

    fn units_recounted(&mut self, count: u16) {
        self.effects.push(Effect::UnitsRecounted { count });
    }

    fn document_changed(&mut self) {
        self.effects.push(Effect::DocumentChanged);
    }
}
