//! Emitter manager.
//!
//! Owns a set of emitters and gravity wells, steps them together and
//! resolves frame names for configs.

use ember_common::{EmberResult, EmitterId, FrameHandle, WellId};
use serde_json::Value;
use tracing::{debug, info};

use crate::emitter::Emitter;
use crate::frames::{FrameAtlas, FrameRegistry};
use crate::gravity_well::GravityWell;

/// Aggregate pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Number of emitters
    pub emitters: usize,
    /// Number of wells
    pub wells: usize,
    /// Alive particles across all emitters
    pub alive: usize,
    /// Dead particles across all emitters
    pub dead: usize,
}

/// Owns emitters and gravity wells and updates them each frame.
pub struct EmitterManager {
    emitters: Vec<(EmitterId, Emitter)>,
    wells: Vec<(WellId, GravityWell)>,
    next_emitter: u32,
    next_well: u32,
    time_scale: f32,
    active: bool,
    elapsed: f64,
    registry: Box<dyn FrameRegistry + Send + Sync>,
}

impl Default for EmitterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EmitterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterManager")
            .field("emitters", &self.emitters.len())
            .field("wells", &self.wells.len())
            .field("time_scale", &self.time_scale)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl EmitterManager {
    /// Create a manager with an empty frame atlas.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(FrameAtlas::new())
    }

    /// Create a manager resolving frame names through `registry`.
    #[must_use]
    pub fn with_registry(registry: impl FrameRegistry + Send + Sync + 'static) -> Self {
        Self {
            emitters: Vec::new(),
            wells: Vec::new(),
            next_emitter: 0,
            next_well: 0,
            time_scale: 1.0,
            active: true,
            elapsed: 0.0,
            registry: Box::new(registry),
        }
    }

    /// The frame registry.
    #[must_use]
    pub fn registry(&self) -> &dyn FrameRegistry {
        self.registry.as_ref()
    }

    /// Resolves a frame name, falling back to the base frame with a warning.
    #[must_use]
    pub fn frame(&self, name: &str) -> FrameHandle {
        self.registry.frame_or_default(name)
    }

    // Emitters

    /// Takes ownership of an emitter.
    pub fn add_emitter(&mut self, emitter: Emitter) -> EmitterId {
        let id = EmitterId::new(self.next_emitter);
        self.next_emitter += 1;
        debug!(id = id.raw(), name = %emitter.name(), "Emitter added");
        self.emitters.push((id, emitter));
        id
    }

    /// Builds an emitter from a property bag and adds it.
    pub fn create_emitter(&mut self, props: &Value) -> EmitterId {
        let emitter = Emitter::from_config(props, self.registry.as_ref());
        self.add_emitter(emitter)
    }

    /// Parses a JSON property bag and adds the emitter it describes.
    pub fn create_emitter_from_str(&mut self, json: &str) -> EmberResult<EmitterId> {
        let props: Value = serde_json::from_str(json)?;
        Ok(self.create_emitter(&props))
    }

    /// An emitter by id.
    #[must_use]
    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, emitter)| emitter)
    }

    /// Mutable emitter by id.
    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters
            .iter_mut()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, emitter)| emitter)
    }

    /// Removes an emitter and hands it back.
    pub fn remove_emitter(&mut self, id: EmitterId) -> Option<Emitter> {
        let index = self.emitters.iter().position(|(candidate, _)| *candidate == id)?;
        Some(self.emitters.remove(index).1)
    }

    /// All emitters in insertion order.
    pub fn emitters(&self) -> impl Iterator<Item = (EmitterId, &Emitter)> + '_ {
        self.emitters.iter().map(|(id, emitter)| (*id, emitter))
    }

    /// Mutable access to all emitters in insertion order.
    pub fn emitters_mut(&mut self) -> impl Iterator<Item = (EmitterId, &mut Emitter)> + '_ {
        self.emitters.iter_mut().map(|(id, emitter)| (*id, emitter))
    }

    /// Number of emitters.
    #[must_use]
    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    // Wells

    /// Takes ownership of a gravity well.
    pub fn add_well(&mut self, well: GravityWell) -> WellId {
        let id = WellId::new(self.next_well);
        self.next_well += 1;
        debug!(id = id.raw(), power = well.power(), "Gravity well added");
        self.wells.push((id, well));
        id
    }

    /// A well by id.
    #[must_use]
    pub fn well(&self, id: WellId) -> Option<&GravityWell> {
        self.wells
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, well)| well)
    }

    /// Mutable well by id.
    pub fn well_mut(&mut self, id: WellId) -> Option<&mut GravityWell> {
        self.wells
            .iter_mut()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, well)| well)
    }

    /// Removes a well and hands it back.
    pub fn remove_well(&mut self, id: WellId) -> Option<GravityWell> {
        let index = self.wells.iter().position(|(candidate, _)| *candidate == id)?;
        Some(self.wells.remove(index).1)
    }

    /// Number of wells.
    #[must_use]
    pub fn well_count(&self) -> usize {
        self.wells.len()
    }

    // Control

    /// Stops updates until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Resumes updates.
    pub fn resume(&mut self) {
        self.active = true;
    }

    /// Whether updates are paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        !self.active
    }

    /// Scales the delta handed to every emitter.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    /// Manager time scale.
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Timestamp of the last update.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Emits `count` particles (each emitter's quantity when `None`) from
    /// every emitter. Returns the total emitted.
    pub fn emit_particle(&mut self, count: Option<usize>) -> usize {
        self.emitters
            .iter_mut()
            .map(|(_, emitter)| emitter.emit_particle(count))
            .sum()
    }

    /// Emits from every emitter at an explicit point.
    pub fn emit_particle_at(&mut self, count: Option<usize>, x: f32, y: f32) -> usize {
        self.emitters
            .iter_mut()
            .map(|(_, emitter)| emitter.emit_particle_at(count, x, y))
            .sum()
    }

    /// Steps every active emitter by `delta` milliseconds (scaled) at
    /// timestamp `time`. Inactive wells are left out of the tick.
    pub fn update(&mut self, time: f64, delta: f32) {
        if !self.active {
            return;
        }
        self.elapsed = time;
        let delta = delta * self.time_scale;
        let wells: Vec<GravityWell> = self
            .wells
            .iter()
            .filter(|(_, well)| well.active)
            .map(|(_, well)| well.clone())
            .collect();
        for (_, emitter) in &mut self.emitters {
            if emitter.is_active() {
                emitter.update(delta, &wells);
            }
        }
    }

    /// Particle totals.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        self.emitters.iter().fold(
            ManagerStats {
                emitters: self.emitters.len(),
                wells: self.wells.len(),
                ..ManagerStats::default()
            },
            |mut stats, (_, emitter)| {
                stats.alive += emitter.alive_count();
                stats.dead += emitter.dead_count();
                stats
            },
        )
    }

    /// Alive particles across every emitter.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.stats().alive
    }

    /// Tears down every emitter and well.
    pub fn destroy(self) {
        info!(
            emitters = self.emitters.len(),
            wells = self.wells.len(),
            "Emitter manager destroyed"
        );
        for (_, emitter) in self.emitters {
            emitter.destroy();
        }
    }
}
