//! Particle emitters.
//!
//! An [`Emitter`] owns a [`ParticlePool`], one [`EmitterOp`] per particle
//! property and its scheduling state. Each update runs in a fixed order:
//!
//! 1. integrate every alive particle,
//! 2. move the dead ones to the dead list (death callback, then reset),
//! 3. emit new particles according to the schedule.
//!
//! Scheduling has three states. A stopped emitter (`on == false`) lets live
//! particles finish. A flowing emitter (`frequency >= 0`) emits `quantity`
//! particles every `frequency` milliseconds, or every tick when the
//! frequency is zero. An exploded emitter (`frequency == -1`) only emits
//! when asked to.

use std::fmt;
use std::sync::Arc;

use ember_common::{AnimHandle, FrameHandle, Rect, Vec2};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::gravity_well::GravityWell;
use crate::ops::{EmitterOp, EmitterOps, OpConfig, OpKey};
use crate::particle::{FireContext, Particle, ParticleInstance, UpdateContext};
use crate::pool::ParticlePool;
use crate::zone::{Bounds, DeathZone, EdgeFlags, EmitZone};

/// Called for every particle an emitter spawns.
pub type EmitCallback = Arc<dyn Fn(&Particle, &Emitter) + Send + Sync>;

/// Called for every particle that dies.
pub type DeathCallback = Arc<dyn Fn(&Particle) + Send + Sync>;

/// Something an emitter can follow.
pub trait FollowTarget: Send + Sync {
    /// Current position.
    fn position(&self) -> Vec2;

    /// Whether the target is visible. Emitters tracking visibility copy it.
    fn visible(&self) -> bool {
        true
    }
}

#[derive(Debug)]
struct PointState {
    position: Vec2,
    visible: bool,
}

/// A shareable, mutable point to follow.
#[derive(Debug, Clone)]
pub struct SharedPoint(Arc<RwLock<PointState>>);

impl SharedPoint {
    /// Creates a visible point.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self(Arc::new(RwLock::new(PointState {
            position,
            visible: true,
        })))
    }

    /// Moves the point.
    pub fn set_position(&self, position: Vec2) {
        self.0.write().position = position;
    }

    /// Shows or hides the point.
    pub fn set_visible(&self, visible: bool) {
        self.0.write().visible = visible;
    }
}

impl Default for SharedPoint {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl FollowTarget for SharedPoint {
    fn position(&self) -> Vec2 {
        self.0.read().position
    }

    fn visible(&self) -> bool {
        self.0.read().visible
    }
}

/// Blend mode passed through to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source over
    #[default]
    Normal,
    /// Additive
    Add,
    /// Multiply
    Multiply,
    /// Screen
    Screen,
    /// Erase
    Erase,
}

impl BlendMode {
    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Add => "ADD",
            Self::Multiply => "MULTIPLY",
            Self::Screen => "SCREEN",
            Self::Erase => "ERASE",
        }
    }

    /// Parses a name or a numeric mode id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(id) = value.as_u64() {
            return match id {
                0 => Some(Self::Normal),
                1 => Some(Self::Add),
                2 => Some(Self::Multiply),
                3 => Some(Self::Screen),
                17 => Some(Self::Erase),
                _ => None,
            };
        }
        let name = value.as_str()?;
        [Self::Normal, Self::Add, Self::Multiply, Self::Screen, Self::Erase]
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
    }
}

/// Cycles through a list of handles, or picks one at random.
#[derive(Debug, Clone)]
pub struct HandleCycle<T> {
    handles: Vec<T>,
    random: bool,
    quantity: u32,
    index: usize,
    counter: u32,
}

impl<T> Default for HandleCycle<T> {
    fn default() -> Self {
        Self {
            handles: Vec::new(),
            random: true,
            quantity: 1,
            index: 0,
            counter: 0,
        }
    }
}

impl<T: Copy> HandleCycle<T> {
    /// A cycle over `handles`. Sequential cycles hand out each handle
    /// `quantity` times before moving on.
    #[must_use]
    pub fn new(handles: Vec<T>, random: bool, quantity: u32) -> Self {
        Self {
            handles,
            random,
            quantity: quantity.max(1),
            index: 0,
            counter: 0,
        }
    }

    /// Handles in the cycle.
    #[must_use]
    pub fn handles(&self) -> &[T] {
        &self.handles
    }

    /// Whether handles are picked at random.
    #[must_use]
    pub const fn is_random(&self) -> bool {
        self.random
    }

    /// Repeats per handle in sequential mode.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The next handle, or `None` if the cycle is empty.
    pub fn next(&mut self, rng: &mut fastrand::Rng) -> Option<T> {
        match self.handles.len() {
            0 => None,
            1 => Some(self.handles[0]),
            len if self.random => Some(self.handles[rng.usize(..len)]),
            len => {
                let handle = self.handles[self.index];
                self.counter += 1;
                if self.counter >= self.quantity {
                    self.counter = 0;
                    self.index = (self.index + 1) % len;
                }
                Some(handle)
            },
        }
    }
}

/// A particle emitter.
pub struct Emitter {
    pub(crate) ops: EmitterOps,
    pool: ParticlePool,
    rng: fastrand::Rng,
    pub(crate) emit_zone: Option<EmitZone>,
    pub(crate) death_zone: Option<DeathZone>,
    pub(crate) bounds: Option<Rect>,
    pub(crate) collide: EdgeFlags,
    pub(crate) gravity: Vec2,
    pub(crate) frequency: f32,
    flow_counter: f32,
    pub(crate) on: bool,
    pub(crate) active: bool,
    pub(crate) visible: bool,
    pub(crate) radial: bool,
    pub(crate) move_to: bool,
    pub(crate) particle_bring_to_top: bool,
    pub(crate) max_particles: usize,
    pub(crate) max_alive_particles: usize,
    pub(crate) time_scale: f32,
    pub(crate) blend_mode: BlendMode,
    pub(crate) name: String,
    pub(crate) track_visible: bool,
    pub(crate) follow_offset: Vec2,
    follow: Option<Arc<dyn FollowTarget>>,
    pub(crate) frames: HandleCycle<FrameHandle>,
    pub(crate) anims: HandleCycle<AnimHandle>,
    emit_callback: Option<EmitCallback>,
    death_callback: Option<DeathCallback>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("name", &self.name)
            .field("on", &self.on)
            .field("active", &self.active)
            .field("frequency", &self.frequency)
            .field("alive", &self.pool.alive_count())
            .field("dead", &self.pool.dead_count())
            .finish_non_exhaustive()
    }
}

impl Emitter {
    /// A flowing emitter with default ops, seeded from the thread RNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: EmitterOps::new(),
            pool: ParticlePool::new(),
            rng: fastrand::Rng::new(),
            emit_zone: None,
            death_zone: None,
            bounds: None,
            collide: EdgeFlags::ALL,
            gravity: Vec2::ZERO,
            frequency: 0.0,
            flow_counter: 0.0,
            on: true,
            active: true,
            visible: true,
            radial: true,
            move_to: false,
            particle_bring_to_top: true,
            max_particles: 0,
            max_alive_particles: 0,
            time_scale: 1.0,
            blend_mode: BlendMode::Normal,
            name: String::new(),
            track_visible: false,
            follow_offset: Vec2::ZERO,
            follow: None,
            frames: HandleCycle::default(),
            anims: HandleCycle::default(),
            emit_callback: None,
            death_callback: None,
        }
    }

    /// Reseeds the emitter's random source.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
    }

    // Ops

    /// The op driving `key`.
    #[must_use]
    pub fn op(&self, key: OpKey) -> &EmitterOp {
        &self.ops[key]
    }

    /// Mutable access to the op driving `key`.
    pub fn op_mut(&mut self, key: OpKey) -> &mut EmitterOp {
        &mut self.ops[key]
    }

    /// Replaces the configuration of `key` and activates it.
    pub fn set_op(&mut self, key: OpKey, config: OpConfig) -> &mut Self {
        self.ops[key].set(config);
        self
    }

    /// Sets the spawn position.
    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.ops[OpKey::X].set_value(x);
        self.ops[OpKey::Y].set_value(y);
        self
    }

    /// Sets one speed used for both axes.
    pub fn set_speed(&mut self, speed: OpConfig) -> &mut Self {
        self.ops[OpKey::SpeedX].set(speed);
        self.ops[OpKey::SpeedY].set_active(false);
        self
    }

    /// Sets per-axis speeds; switches to point emission.
    pub fn set_speed_xy(&mut self, x: OpConfig, y: OpConfig) -> &mut Self {
        self.ops[OpKey::SpeedX].set(x);
        self.ops[OpKey::SpeedY].set(y);
        self.radial = false;
        self
    }

    /// Sets one scale used for both axes.
    pub fn set_scale(&mut self, scale: OpConfig) -> &mut Self {
        self.ops[OpKey::ScaleX].set(scale);
        self.ops[OpKey::ScaleY].set_active(false);
        self
    }

    /// Sets per-axis scales.
    pub fn set_scale_xy(&mut self, x: OpConfig, y: OpConfig) -> &mut Self {
        self.ops[OpKey::ScaleX].set(x);
        self.ops[OpKey::ScaleY].set(y);
        self
    }

    /// Emitter-wide acceleration added to every particle (px/s²).
    pub fn set_gravity(&mut self, x: f32, y: f32) -> &mut Self {
        self.gravity = Vec2::new(x, y);
        self
    }

    /// Sets the alpha op.
    pub fn set_alpha(&mut self, alpha: OpConfig) -> &mut Self {
        self.set_op(OpKey::Alpha, alpha)
    }

    /// Sets the tint op.
    pub fn set_tint(&mut self, tint: OpConfig) -> &mut Self {
        self.set_op(OpKey::Tint, tint)
    }

    /// Sets the launch angle op (degrees).
    pub fn set_angle(&mut self, angle: OpConfig) -> &mut Self {
        self.set_op(OpKey::Angle, angle)
    }

    /// Sets the rotation op (degrees).
    pub fn set_rotate(&mut self, rotate: OpConfig) -> &mut Self {
        self.set_op(OpKey::Rotate, rotate)
    }

    /// Sets the lifespan op (ms).
    pub fn set_lifespan(&mut self, lifespan: OpConfig) -> &mut Self {
        self.set_op(OpKey::Lifespan, lifespan)
    }

    /// Sets the quantity op.
    pub fn set_quantity(&mut self, quantity: OpConfig) -> &mut Self {
        self.set_op(OpKey::Quantity, quantity)
    }

    /// Sets the emission frequency and, optionally, the quantity op.
    pub fn set_frequency(&mut self, frequency: f32, quantity: Option<OpConfig>) -> &mut Self {
        self.frequency = frequency;
        self.flow_counter = 0.0;
        if let Some(quantity) = quantity {
            self.ops[OpKey::Quantity].set(quantity);
        }
        self
    }

    /// Radial (angle-driven) or point (per-axis speed) emission.
    pub fn set_radial(&mut self, radial: bool) -> &mut Self {
        self.radial = radial;
        self
    }

    /// Whether particles travel to the move-to target instead of flying free.
    pub fn set_move_to(&mut self, move_to: bool) -> &mut Self {
        self.move_to = move_to;
        self
    }

    /// New particles are drawn last (`true`) or first.
    pub fn set_particle_bring_to_top(&mut self, on_top: bool) -> &mut Self {
        self.particle_bring_to_top = on_top;
        self
    }

    /// Total particle cap; 0 is unbounded.
    pub fn set_max_particles(&mut self, max: usize) -> &mut Self {
        self.max_particles = max;
        self
    }

    /// Alive particle cap; 0 is unbounded.
    pub fn set_max_alive_particles(&mut self, max: usize) -> &mut Self {
        self.max_alive_particles = max;
        self
    }

    /// Sets or clears the collision rectangle.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) -> &mut Self {
        self.bounds = bounds;
        self
    }

    /// Chooses which bounds edges collide.
    pub fn set_collide(&mut self, collide: EdgeFlags) -> &mut Self {
        self.collide = collide;
        self
    }

    /// Sets or clears the emit zone.
    pub fn set_emit_zone(&mut self, zone: Option<EmitZone>) -> &mut Self {
        self.emit_zone = zone;
        self
    }

    /// Sets or clears the death zone.
    pub fn set_death_zone(&mut self, zone: Option<DeathZone>) -> &mut Self {
        self.death_zone = zone;
        self
    }

    /// Current emit zone.
    #[must_use]
    pub fn emit_zone(&self) -> Option<&EmitZone> {
        self.emit_zone.as_ref()
    }

    /// Current death zone.
    #[must_use]
    pub fn death_zone(&self) -> Option<&DeathZone> {
        self.death_zone.as_ref()
    }

    /// Current bounds rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Sets the blend mode.
    pub fn set_blend_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.blend_mode = mode;
        self
    }

    /// Blend mode.
    #[must_use]
    pub const fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Shows or hides the emitter.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    /// Whether the emitter is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Scales the delta this emitter sees.
    pub fn set_time_scale(&mut self, time_scale: f32) -> &mut Self {
        self.time_scale = time_scale;
        self
    }

    /// Emitter time scale.
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Emitter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the frames particles are given.
    pub fn set_frames(&mut self, frames: Vec<FrameHandle>, pick_random: bool, quantity: u32) -> &mut Self {
        self.frames = HandleCycle::new(frames, pick_random, quantity);
        self
    }

    /// The frame handles particles are assigned, in cycle order.
    #[must_use]
    pub fn frames(&self) -> &[FrameHandle] {
        self.frames.handles()
    }

    /// Sets the animations particles play.
    pub fn set_anims(&mut self, anims: Vec<AnimHandle>, pick_random: bool, quantity: u32) -> &mut Self {
        self.anims = HandleCycle::new(anims, pick_random, quantity);
        self
    }

    // Callbacks

    /// Registers the emit callback.
    pub fn on_emit<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Particle, &Emitter) + Send + Sync + 'static,
    {
        self.emit_callback = Some(Arc::new(callback));
        self
    }

    /// Registers the death callback.
    pub fn on_death<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Particle) + Send + Sync + 'static,
    {
        self.death_callback = Some(Arc::new(callback));
        self
    }

    /// Installs or removes a shared emit callback.
    pub fn set_emit_callback(&mut self, callback: Option<EmitCallback>) -> &mut Self {
        self.emit_callback = callback;
        self
    }

    /// Installs or removes a shared death callback.
    pub fn set_death_callback(&mut self, callback: Option<DeathCallback>) -> &mut Self {
        self.death_callback = callback;
        self
    }

    // Follow

    /// Spawns particles relative to `target` plus `offset`.
    pub fn start_follow(&mut self, target: Arc<dyn FollowTarget>, offset: Vec2, track_visible: bool) -> &mut Self {
        self.follow = Some(target);
        self.follow_offset = offset;
        self.track_visible = track_visible;
        self
    }

    /// Stops following.
    pub fn stop_follow(&mut self) -> &mut Self {
        self.follow = None;
        self.follow_offset = Vec2::ZERO;
        self.track_visible = false;
        self
    }

    /// Whether a follow target is set.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follow.is_some()
    }

    fn follow_position(&self) -> Option<Vec2> {
        self.follow
            .as_ref()
            .map(|target| target.position() + self.follow_offset)
    }

    // Scheduling

    /// Turns emission on and restarts the flow timer.
    pub fn start(&mut self) -> &mut Self {
        self.on = true;
        self.flow_counter = 0.0;
        self
    }

    /// Turns emission off. Live particles finish their lives.
    pub fn stop(&mut self) -> &mut Self {
        self.on = false;
        self
    }

    /// Freezes the emitter; updates do nothing.
    pub fn pause(&mut self) -> &mut Self {
        self.active = false;
        self
    }

    /// Unfreezes the emitter.
    pub fn resume(&mut self) -> &mut Self {
        self.active = true;
        self
    }

    /// Whether emission is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// Whether the emitter updates.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current frequency in milliseconds (−1 when exploding).
    #[must_use]
    pub const fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Negated time accumulated towards the next flow emission.
    #[must_use]
    pub const fn flow_counter(&self) -> f32 {
        self.flow_counter
    }

    /// Emits `quantity` particles every `frequency` ms and starts.
    pub fn flow(&mut self, frequency: f32, quantity: Option<OpConfig>) -> &mut Self {
        self.set_frequency(frequency.max(0.0), quantity);
        self.start()
    }

    /// Emits `count` particles at once and disables automatic emission.
    /// Returns the number emitted.
    pub fn explode(&mut self, count: usize, x: f32, y: f32) -> usize {
        self.frequency = -1.0;
        self.emit_particle_at(Some(count), x, y)
    }

    /// Whether the emitter has hit one of its particle caps. `max_particles`
    /// counts every particle the pool holds, alive or dead.
    #[must_use]
    pub fn at_limit(&self) -> bool {
        (self.max_particles > 0 && self.pool.total() >= self.max_particles)
            || (self.max_alive_particles > 0 && self.pool.alive_count() >= self.max_alive_particles)
    }

    /// Emits `count` particles (the quantity op when `None`) at the
    /// emitter's position. Returns the number emitted.
    pub fn emit_particle(&mut self, count: Option<usize>) -> usize {
        self.emit(count, None)
    }

    /// Emits `count` particles at an explicit point.
    pub fn emit_particle_at(&mut self, count: Option<usize>, x: f32, y: f32) -> usize {
        self.emit(count, Some(Vec2::new(x, y)))
    }

    fn emit(&mut self, count: Option<usize>, origin: Option<Vec2>) -> usize {
        if self.at_limit() {
            return 0;
        }
        let count = match count {
            Some(count) => count,
            None => {
                let probe = Particle::default();
                self.ops[OpKey::Quantity]
                    .emit_value(&probe, &mut self.rng, 1.0)
                    .max(0.0) as usize
            },
        };
        let follow = self.follow_position();
        let mut emitted = 0;
        for _ in 0..count {
            let grew = self.pool.dead_count() == 0;
            let index = self.pool.acquire(self.particle_bring_to_top);
            if grew {
                debug!(total = self.pool.total(), "Particle pool grew");
            }
            let frame = self.frames.next(&mut self.rng).unwrap_or(FrameHandle::DEFAULT);
            let anim = self.anims.next(&mut self.rng);
            let Some(particle) = self.pool.get_mut(index) else {
                continue;
            };
            particle.fire(&mut FireContext {
                ops: &mut self.ops,
                rng: &mut self.rng,
                emit_zone: self.emit_zone.as_mut(),
                origin,
                follow,
                radial: self.radial,
                move_to: self.move_to,
                frame,
                anim,
            });
            emitted += 1;

            if let Some(callback) = self.emit_callback.clone() {
                if let Some(particle) = self.pool.get(index) {
                    callback(particle, self);
                }
            }
            if self.at_limit() {
                break;
            }
        }
        emitted
    }

    /// Advances the emitter by `delta` milliseconds.
    pub fn update(&mut self, delta: f32, wells: &[GravityWell]) {
        if !self.active {
            return;
        }
        let delta = (delta * self.time_scale).max(0.0);
        let step = delta / 1000.0;

        if let Some(target) = self.follow.as_ref().filter(|_| self.track_visible) {
            self.visible = target.visible();
        }

        let ctx = UpdateContext {
            ops: &self.ops,
            gravity: self.gravity,
            wells,
            bounds: self.bounds.map(|rect| Bounds {
                rect,
                collide: self.collide,
            }),
            death_zone: self.death_zone.as_ref(),
        };
        let death_callback = self.death_callback.as_ref();
        self.pool.retain_alive(|_, particle| {
            let dead = particle.integrate(delta, step, &ctx);
            if dead {
                if let Some(callback) = death_callback {
                    callback(particle);
                }
                particle.reset();
            }
            dead
        });

        if !self.on {
            return;
        }
        if self.frequency == 0.0 {
            self.emit_particle(None);
        } else if self.frequency > 0.0 {
            self.flow_counter -= delta;
            if -self.flow_counter >= self.frequency {
                let due = (-self.flow_counter / self.frequency).floor();
                self.flow_counter += due * self.frequency;
                for _ in 0..due as u64 {
                    if self.at_limit() {
                        break;
                    }
                    self.emit_particle(None);
                }
            }
        }
    }

    // Pool access

    /// Pre-allocates `count` dead particles, never exceeding `max_particles`.
    pub fn reserve(&mut self, count: usize) -> &mut Self {
        let count = if self.max_particles > 0 {
            count.min(self.max_particles.saturating_sub(self.pool.total()))
        } else {
            count
        };
        self.pool.reserve(count);
        self
    }

    /// Kills every alive particle without callbacks.
    pub fn kill_all(&mut self) -> &mut Self {
        self.pool.kill_all();
        self
    }

    /// Stable-sorts alive particles by ascending y.
    pub fn depth_sort(&mut self) -> &mut Self {
        self.pool.sort_alive_by(|particle| particle.position.y);
        self
    }

    /// Calls `f` for every alive particle in render order.
    pub fn for_each_alive<F: FnMut(&Particle)>(&self, f: F) {
        self.pool.alive().for_each(f);
    }

    /// Calls `f` for every dead particle.
    pub fn for_each_dead<F: FnMut(&Particle)>(&self, f: F) {
        self.pool.dead().for_each(f);
    }

    /// Alive particles in render order.
    pub fn alive(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.pool.alive()
    }

    /// Number of alive particles.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.pool.alive_count()
    }

    /// Number of dead particles.
    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.pool.dead_count()
    }

    /// Alive plus dead.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.pool.total()
    }

    /// Render-ready data for alive particles in draw order.
    #[must_use]
    pub fn render_instances(&self) -> Vec<ParticleInstance> {
        self.pool.alive().map(ParticleInstance::from_particle).collect()
    }

    /// Tears the emitter down with every particle it holds.
    pub fn destroy(mut self) {
        debug!(name = %self.name, particles = self.pool.total(), "Emitter destroyed");
        self.pool.clear();
    }
}
