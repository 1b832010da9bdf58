//! Easing curves for start/end value operations.
//!
//! Every curve maps normalized time `t` in `[0, 1]` to an eased factor that
//! starts at `0` and ends at `1`. Back and Elastic curves overshoot in
//! between. Stepped curves are discontinuous, so callers must evaluate the
//! curve every tick rather than caching the result.

use std::f32::consts::PI;
use std::fmt;

/// Curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EaseCurve {
    /// `t^2`
    Quad,
    /// `t^3`
    Cubic,
    /// `t^4`
    Quart,
    /// `t^5`
    Quint,
    /// Quarter sine wave
    Sine,
    /// Exponential
    Expo,
    /// Circular
    Circ,
    /// Overshooting cubic
    Back,
    /// Bouncing ball
    Bounce,
    /// Damped spring
    Elastic,
}

impl EaseCurve {
    const ALL: [Self; 10] = [
        Self::Quad,
        Self::Cubic,
        Self::Quart,
        Self::Quint,
        Self::Sine,
        Self::Expo,
        Self::Circ,
        Self::Back,
        Self::Bounce,
        Self::Elastic,
    ];

    /// Canonical family name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Quad => "Quad",
            Self::Cubic => "Cubic",
            Self::Quart => "Quart",
            Self::Quint => "Quint",
            Self::Sine => "Sine",
            Self::Expo => "Expo",
            Self::Circ => "Circ",
            Self::Back => "Back",
            Self::Bounce => "Bounce",
            Self::Elastic => "Elastic",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|curve| curve.name().eq_ignore_ascii_case(name))
    }

    /// The ease-in form of the curve.
    fn ease_in(self, t: f32) -> f32 {
        match self {
            Self::Quad => t * t,
            Self::Cubic => t * t * t,
            Self::Quart => t * t * t * t,
            Self::Quint => t * t * t * t * t,
            Self::Sine => 1.0 - (t * PI * 0.5).cos(),
            Self::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0)) - 0.001
                }
            },
            Self::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::Back => {
                let s = 1.701_58;
                t * t * ((s + 1.0) * t - s)
            },
            Self::Bounce => 1.0 - bounce_out(1.0 - t),
            Self::Elastic => {
                if t <= 0.0 || t >= 1.0 {
                    return t.clamp(0.0, 1.0);
                }
                let period = 0.3;
                let s = period / 4.0;
                let t = t - 1.0;
                -(2f32.powf(10.0 * t) * ((t - s) * (2.0 * PI) / period).sin())
            },
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984_375
    }
}

/// Which end of the curve the easing is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EaseDirection {
    /// Slow start
    In,
    /// Slow end
    Out,
    /// Slow start and end
    InOut,
}

impl EaseDirection {
    const fn suffix(self) -> &'static str {
        match self {
            Self::In => "easeIn",
            Self::Out => "easeOut",
            Self::InOut => "easeInOut",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "easein" | "in" => Some(Self::In),
            "easeout" | "out" => Some(Self::Out),
            "easeinout" | "inout" => Some(Self::InOut),
            _ => None,
        }
    }
}

/// An easing function over normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ease {
    /// Identity.
    #[default]
    Linear,
    /// A curve family applied in a direction.
    Curve(EaseCurve, EaseDirection),
    /// Jumps in `steps` discrete increments. Reaches 1 before `t` does.
    Stepped(u32),
}

impl Ease {
    /// Evaluates the curve at `t`. Input is clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::Curve(curve, EaseDirection::In) => curve.ease_in(t),
            Self::Curve(curve, EaseDirection::Out) => 1.0 - curve.ease_in(1.0 - t),
            Self::Curve(curve, EaseDirection::InOut) => {
                if t < 0.5 {
                    curve.ease_in(t * 2.0) * 0.5
                } else {
                    1.0 - curve.ease_in((1.0 - t) * 2.0) * 0.5
                }
            },
            Self::Stepped(steps) => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let steps = steps.max(1) as f32;
                    (((steps * t).floor() + 1.0) / steps).min(1.0)
                }
            },
        }
    }

    /// Parses an ease name such as `"Linear"`, `"Quad.easeOut"`, `"Sine"`,
    /// `"Power2"` or `"Stepped"`. A family name without direction eases out.
    /// `params` currently only feeds the step count of `"Stepped"`.
    #[must_use]
    pub fn from_name(name: &str, params: &[f32]) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("linear") || name.eq_ignore_ascii_case("power0") {
            return Some(Self::Linear);
        }
        if name.eq_ignore_ascii_case("stepped") {
            let steps = params.first().map_or(1, |s| s.max(1.0) as u32);
            return Some(Self::Stepped(steps));
        }
        if let Some(power) = name
            .strip_prefix("Power")
            .or_else(|| name.strip_prefix("power"))
        {
            let curve = match power {
                "1" => EaseCurve::Quad,
                "2" => EaseCurve::Cubic,
                "3" => EaseCurve::Quart,
                "4" => EaseCurve::Quint,
                _ => return None,
            };
            return Some(Self::Curve(curve, EaseDirection::Out));
        }

        let (family, direction) = match name.split_once('.') {
            Some((family, suffix)) => (family, EaseDirection::from_suffix(suffix)?),
            None => (name, EaseDirection::Out),
        };
        EaseCurve::from_name(family).map(|curve| Self::Curve(curve, direction))
    }

    /// Ease parameters needed to reproduce this ease with [`Ease::from_name`].
    #[must_use]
    pub fn params(&self) -> Vec<f32> {
        match self {
            Self::Stepped(steps) if *steps != 1 => vec![*steps as f32],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("Linear"),
            Self::Curve(curve, direction) => write!(f, "{}.{}", curve.name(), direction.suffix()),
            Self::Stepped(_) => f.write_str("Stepped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_is_identity() {
        assert_eq!(Ease::Linear.apply(0.25), 0.25);
        assert_eq!(Ease::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn test_all_curves_hit_endpoints() {
        for curve in EaseCurve::ALL {
            for direction in [EaseDirection::In, EaseDirection::Out, EaseDirection::InOut] {
                let ease = Ease::Curve(curve, direction);
                assert!(ease.apply(0.0).abs() < 0.01, "{ease} at 0");
                assert!((ease.apply(1.0) - 1.0).abs() < 0.01, "{ease} at 1");
            }
        }
    }

    #[test]
    fn test_quad_directions() {
        assert!((Ease::Curve(EaseCurve::Quad, EaseDirection::In).apply(0.5) - 0.25).abs() < 1e-6);
        assert!((Ease::Curve(EaseCurve::Quad, EaseDirection::Out).apply(0.5) - 0.75).abs() < 1e-6);
        assert!(
            (Ease::Curve(EaseCurve::Quad, EaseDirection::InOut).apply(0.5) - 0.5).abs() < 1e-6
        );
    }

    #[test]
    fn test_stepped_is_discontinuous() {
        let ease = Ease::Stepped(4);
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(0.1), 0.25);
        assert_eq!(ease.apply(0.3), 0.5);
        assert_eq!(ease.apply(0.99), 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Ease::from_name("Linear", &[]), Some(Ease::Linear));
        assert_eq!(
            Ease::from_name("Quad.easeIn", &[]),
            Some(Ease::Curve(EaseCurve::Quad, EaseDirection::In))
        );
        assert_eq!(
            Ease::from_name("Power2", &[]),
            Some(Ease::Curve(EaseCurve::Cubic, EaseDirection::Out))
        );
        assert_eq!(
            Ease::from_name("sine", &[]),
            Some(Ease::Curve(EaseCurve::Sine, EaseDirection::Out))
        );
        assert_eq!(Ease::from_name("Stepped", &[3.0]), Some(Ease::Stepped(3)));
        assert_eq!(Ease::from_name("Wobble.easeIn", &[]), None);
    }

    #[test]
    fn test_display_round_trips() {
        let ease = Ease::Curve(EaseCurve::Back, EaseDirection::InOut);
        assert_eq!(ease.to_string(), "Back.easeInOut");
        assert_eq!(Ease::from_name(&ease.to_string(), &ease.params()), Some(ease));

        let stepped = Ease::Stepped(5);
        assert_eq!(Ease::from_name(&stepped.to_string(), &stepped.params()), Some(stepped));
    }
}
