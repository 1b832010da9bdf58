//! A single particle: firing and per-tick integration.

use ember_common::{AnimHandle, FrameHandle, Vec2};

use crate::gravity_well::GravityWell;
use crate::ops::{EmitterOps, OpKey};
use crate::zone::{Bounds, DeathZone, EdgeFlags, EmitZone};

/// A pooled particle.
#[derive(Debug, Clone)]
pub struct Particle {
    /// World position
    pub position: Vec2,
    /// Velocity (px/s)
    pub velocity: Vec2,
    /// Acceleration (px/s²)
    pub acceleration: Vec2,
    /// Per-axis velocity magnitude cap (px/s)
    pub max_velocity: Vec2,
    /// Horizontal and vertical scale
    pub scale: Vec2,
    /// Rotation in degrees
    pub angle: f32,
    /// Rotation in radians, kept in sync with `angle`
    pub rotation: f32,
    /// Opacity
    pub alpha: f32,
    /// Tint color (0xRRGGBB)
    pub tint: u32,
    /// Bounce factor against bounds
    pub bounce: f32,
    /// Total lifespan in milliseconds
    pub lifespan: f32,
    /// Remaining life in milliseconds
    pub life_remaining: f32,
    /// Normalized age in `[0, 1]`
    pub life_t: f32,
    /// Milliseconds left before the particle starts updating
    pub delay_remaining: f32,
    /// Target position when moving to a point instead of flying free
    pub move_to: Option<Vec2>,
    /// Texture frame
    pub frame: FrameHandle,
    /// Animation, if the emitter plays one
    pub anim: Option<AnimHandle>,
    /// Bounds edges touched on the last tick
    pub collided: EdgeFlags,
    op_starts: [f32; OpKey::COUNT],
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_velocity: Vec2::splat(10_000.0),
            scale: Vec2::ONE,
            angle: 0.0,
            rotation: 0.0,
            alpha: 1.0,
            tint: 0x00ff_ffff,
            bounce: 0.0,
            lifespan: 1000.0,
            life_remaining: 0.0,
            life_t: 0.0,
            delay_remaining: 0.0,
            move_to: None,
            frame: FrameHandle::DEFAULT,
            anim: None,
            collided: EdgeFlags::NONE,
            op_starts: [0.0; OpKey::COUNT],
        }
    }
}

/// Emitter state a particle reads while being fired.
pub(crate) struct FireContext<'a> {
    pub ops: &'a mut EmitterOps,
    pub rng: &'a mut fastrand::Rng,
    pub emit_zone: Option<&'a mut EmitZone>,
    /// Explicit spawn point overriding the emitter position.
    pub origin: Option<Vec2>,
    /// Follow target position plus offset.
    pub follow: Option<Vec2>,
    pub radial: bool,
    pub move_to: bool,
    pub frame: FrameHandle,
    pub anim: Option<AnimHandle>,
}

/// Emitter state a particle reads while being updated.
pub(crate) struct UpdateContext<'a> {
    pub ops: &'a EmitterOps,
    pub gravity: Vec2,
    pub wells: &'a [GravityWell],
    pub bounds: Option<Bounds>,
    pub death_zone: Option<&'a DeathZone>,
}

impl Particle {
    /// Whether the particle has life left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life_remaining > 0.0
    }

    /// The value `key` resolved to when this particle was fired.
    #[must_use]
    pub fn op_start(&self, key: OpKey) -> f32 {
        self.op_starts[key.index()]
    }

    /// Overrides the fired value recorded for `key`.
    pub fn set_op_start(&mut self, key: OpKey, value: f32) {
        self.op_starts[key.index()] = value;
    }

    /// Clears all per-life state so the slot can be reused.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn resolve(&mut self, ctx: &mut FireContext<'_>, key: OpKey, fallback: f32) -> f32 {
        let value = ctx.ops[key].emit_value(self, &mut *ctx.rng, fallback);
        self.op_starts[key.index()] = value;
        value
    }

    /// Initializes every property for a new life.
    pub(crate) fn fire(&mut self, ctx: &mut FireContext<'_>) {
        self.reset();
        self.frame = ctx.frame;
        self.anim = ctx.anim;

        let zone_offset = match ctx.emit_zone.as_deref_mut() {
            Some(zone) => zone.next_point(&mut *ctx.rng).unwrap_or(Vec2::ZERO),
            None => Vec2::ZERO,
        };
        let base = match ctx.origin {
            Some(origin) => origin,
            None => {
                let x = self.resolve(ctx, OpKey::X, 0.0);
                let y = self.resolve(ctx, OpKey::Y, 0.0);
                ctx.follow.unwrap_or(Vec2::ZERO) + Vec2::new(x, y)
            },
        };
        self.position = base + zone_offset;

        self.lifespan = self.resolve(ctx, OpKey::Lifespan, 1000.0).max(f32::EPSILON);
        self.life_remaining = self.lifespan;
        self.life_t = 0.0;

        let speed_x = self.resolve(ctx, OpKey::SpeedX, 0.0);
        let speed_y = self.resolve(ctx, OpKey::SpeedY, speed_x);
        if ctx.radial {
            let angle = self.resolve(ctx, OpKey::Angle, 0.0).to_radians();
            self.velocity = Vec2::new(angle.cos() * speed_x.abs(), angle.sin() * speed_y.abs());
        } else if ctx.move_to {
            let target_x = self.resolve(ctx, OpKey::MoveToX, self.position.x);
            let target_y = self.resolve(ctx, OpKey::MoveToY, self.position.y);
            let target = Vec2::new(target_x, target_y);
            let seconds = self.lifespan / 1000.0;
            self.velocity = (target - self.position) / seconds;
            self.move_to = Some(target);
        } else {
            self.velocity = Vec2::new(speed_x, speed_y);
        }

        self.acceleration = Vec2::new(
            self.resolve(ctx, OpKey::AccelerationX, 0.0),
            self.resolve(ctx, OpKey::AccelerationY, 0.0),
        );
        self.max_velocity = Vec2::new(
            self.resolve(ctx, OpKey::MaxVelocityX, 10_000.0),
            self.resolve(ctx, OpKey::MaxVelocityY, 10_000.0),
        );
        self.delay_remaining = self.resolve(ctx, OpKey::Delay, 0.0).max(0.0);

        let scale_x = self.resolve(ctx, OpKey::ScaleX, 1.0);
        let scale_y = self.resolve(ctx, OpKey::ScaleY, scale_x);
        self.scale = Vec2::new(scale_x, scale_y);
        self.angle = self.resolve(ctx, OpKey::Rotate, 0.0);
        self.rotation = self.angle.to_radians();
        self.bounce = self.resolve(ctx, OpKey::Bounce, 0.0);
        self.alpha = self.resolve(ctx, OpKey::Alpha, 1.0);
        self.tint = tint_from_f32(self.resolve(ctx, OpKey::Tint, 0x00ff_ffff as f32));
    }

    /// Advances the particle by `delta` milliseconds (`step` seconds).
    /// Returns `true` once the particle is dead.
    pub(crate) fn integrate(&mut self, delta: f32, step: f32, ctx: &UpdateContext<'_>) -> bool {
        let (delta, step) = if self.delay_remaining > 0.0 {
            self.delay_remaining -= delta;
            if self.delay_remaining > 0.0 {
                return false;
            }
            // The part of the tick past the delay still counts.
            let overflow = -self.delay_remaining;
            self.delay_remaining = 0.0;
            (overflow, overflow / 1000.0)
        } else {
            (delta, step)
        };

        let remaining_before = self.life_remaining;
        self.life_remaining = (self.life_remaining - delta).max(0.0);
        self.life_t = (1.0 - self.life_remaining / self.lifespan).clamp(0.0, 1.0);

        if let Some(target) = self.move_to {
            let fraction = if remaining_before > 0.0 {
                (delta / remaining_before).min(1.0)
            } else {
                1.0
            };
            self.position = self.position.lerp(target, fraction);
        } else {
            let wells: Vec2 = ctx
                .wells
                .iter()
                .map(|well| well.velocity_delta(self.position, delta))
                .sum();
            self.velocity += (self.acceleration + ctx.gravity) * step + wells;
            self.velocity = self.velocity.clamp(-self.max_velocity.abs(), self.max_velocity.abs());
            self.position += self.velocity * step;
        }

        self.collided = match ctx.bounds {
            Some(bounds) => bounds.collide(&mut self.position, &mut self.velocity, self.bounce),
            None => EdgeFlags::NONE,
        };

        self.apply_curves(ctx.ops);

        let killed = ctx
            .death_zone
            .is_some_and(|zone| zone.will_kill(self.position));
        if killed {
            self.life_remaining = 0.0;
        }
        killed || self.life_remaining <= 0.0
    }

    fn apply_curves(&mut self, ops: &EmitterOps) {
        let t = self.life_t;
        self.scale.x = ops[OpKey::ScaleX].update_value(self, t, self.scale.x);
        self.scale.y = if ops[OpKey::ScaleY].is_active() {
            ops[OpKey::ScaleY].update_value(self, t, self.scale.y)
        } else {
            self.scale.x
        };
        self.angle = ops[OpKey::Rotate].update_value(self, t, self.angle);
        self.rotation = self.angle.to_radians();
        self.alpha = ops[OpKey::Alpha].update_value(self, t, self.alpha);
        let tint = ops[OpKey::Tint].update_value(self, t, self.tint as f32);
        self.tint = tint_from_f32(tint);
    }
}

fn tint_from_f32(value: f32) -> u32 {
    value.clamp(0.0, 0x00ff_ffff as f32) as u32
}

/// Render-ready particle data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// Position (x, y).
    pub position: [f32; 2],
    /// Scale (x, y).
    pub scale: [f32; 2],
    /// Rotation in radians.
    pub rotation: f32,
    /// Opacity.
    pub alpha: f32,
    /// Tint color (0xRRGGBB).
    pub tint: u32,
    /// Texture frame.
    pub frame: u32,
}

impl ParticleInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Captures a particle's drawable state.
    #[must_use]
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            scale: particle.scale.to_array(),
            rotation: particle.rotation,
            alpha: particle.alpha,
            tint: particle.tint,
            frame: particle.frame.raw(),
        }
    }
}
