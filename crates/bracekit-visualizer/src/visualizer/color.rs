//! Utilization ratio to display color.
//!
//! Ramp: gray at zero, blue to cyan to green to red as the component
//! approaches capacity, solid red at or above capacity.

use bracekit_core::ColorError;
use glam::Vec3;

const LOW: f64 = 0.33;
const HIGH: f64 = 0.67;
const SPAN: f64 = 0.33;

/// Linear RGB color, channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const NEUTRAL: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const OVERSTRESSED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    /// Channel-wise distance, used to compare colors computed in floating point
    pub fn max_channel_delta(self, other: Color) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }
}

fn ramp(value: f64) -> f32 {
    value.clamp(0.0, 1.0) as f32
}

/// Map a utilization ratio to its display color
///
/// Each boundary value takes the rule of the interval it opens
/// (`0.33` is cyan-to-green, `0.67` is green-to-red, `1.0` is red).
pub fn color_for(rate: f64) -> Result<Color, ColorError> {
    if rate.is_nan() || rate < 0.0 {
        return Err(ColorError::InvalidUtilization { rate });
    }

    let color = if rate == 0.0 {
        Color::NEUTRAL
    } else if rate < LOW {
        Color::rgb(0.0, ramp(rate / SPAN), 1.0)
    } else if rate < HIGH {
        Color::rgb(0.0, 1.0, ramp((HIGH - rate) / SPAN))
    } else if rate < 1.0 {
        Color::rgb(ramp((rate - HIGH) / SPAN), 1.0, 0.0)
    } else {
        Color::OVERSTRESSED
    };
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_fixed_points() {
        assert_eq!(color_for(0.0).unwrap(), Color::rgb(0.5, 0.5, 0.5));
        assert_eq!(color_for(1.0).unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(color_for(1.5).unwrap(), Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        assert_eq!(
            color_for(-0.001),
            Err(ColorError::InvalidUtilization { rate: -0.001 })
        );
        assert!(color_for(f64::NAN).is_err());
    }

    #[test]
    fn test_ramps() {
        let c = color_for(0.165).unwrap();
        assert!(c.max_channel_delta(Color::rgb(0.0, 0.5, 1.0)) < EPS);

        let c = color_for(0.4).unwrap();
        assert_eq!(c.r, 0.0);
        assert_eq!(c.g, 1.0);
        assert!((c.b - 0.818).abs() < EPS);

        let c = color_for(0.835).unwrap();
        assert!(c.max_channel_delta(Color::rgb(0.5, 1.0, 0.0)) < EPS);
    }

    #[test]
    fn test_continuous_across_ramp_boundaries() {
        for boundary in [LOW, HIGH] {
            let below = color_for(boundary - 1e-9).unwrap();
            let at = color_for(boundary).unwrap();
            let above = color_for(boundary + 1e-9).unwrap();
            assert!(below.max_channel_delta(at) < EPS, "jump below {}", boundary);
            assert!(above.max_channel_delta(at) < EPS, "jump above {}", boundary);
        }
    }

    #[test]
    fn test_boundaries_take_upper_interval_rule() {
        assert_eq!(color_for(LOW).unwrap(), Color::rgb(0.0, 1.0, 1.0));
        assert_eq!(color_for(HIGH).unwrap(), Color::rgb(0.0, 1.0, 0.0));
        // just above zero is the start of the blue ramp, not gray
        let c = color_for(1e-9).unwrap();
        assert!(c.max_channel_delta(Color::rgb(0.0, 0.0, 1.0)) < EPS);
    }

    proptest! {
        #[test]
        fn prop_channels_in_range(rate in 0.0f64..10.0) {
            let c = color_for(rate).unwrap();
            for channel in [c.r, c.g, c.b] {
                prop_assert!((0.0..=1.0).contains(&channel));
            }
        }

        #[test]
        fn prop_negative_always_fails(rate in -1.0e6f64..-1.0e-12) {
            prop_assert!(color_for(rate).is_err());
        }
    }
}
