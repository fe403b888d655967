use std::fmt::{Display, Formatter};
use std::str::FromStr;

use simple_easing::*;

use crate::errors::{ConfigurationError, UnknownEasingSnafu};

/// Represents the set of built-in easing functions.
///
/// An easing function is a temporal function that takes a time between 0 and 1 (beginning / end)
/// and associate to it a number value according to an ease curve.
///
/// Each variant is known by a canonical name (see [`Easing::name()`]), which is the key used by
/// the default [`EasingRegistry`](crate::animations::EasingRegistry).
///
/// See <https://easings.net> for a representation of easing methods.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Easing {
    /// <https://easings.net/#easeInBack>
    BackIn,
    /// <https://easings.net/#easeInOutBack>
    BackInOut,
    /// <https://easings.net/#easeOutBack>
    BackOut,
    /// <https://easings.net/#easeInBounce>
    BounceIn,
    /// <https://easings.net/#easeInOutBounce>
    BounceInOut,
    /// <https://easings.net/#easeOutBounce>
    BounceOut,
    /// <https://easings.net/#easeInCirc>
    CircIn,
    /// <https://easings.net/#easeInOutCirc>
    CircInOut,
    /// <https://easings.net/#easeOutCirc>
    CircOut,
    /// <https://easings.net/#easeInCubic>
    CubicIn,
    /// <https://easings.net/#easeInOutCubic>
    #[default]
    CubicInOut,
    /// <https://easings.net/#easeOutCubic>
    CubicOut,
    /// <https://easings.net/#easeInElastic>
    ElasticIn,
    /// <https://easings.net/#easeInOutElastic>
    ElasticInOut,
    /// <https://easings.net/#easeOutElastic>
    ElasticOut,
    /// <https://easings.net/#easeInExpo>
    ExpoIn,
    /// <https://easings.net/#easeInOutExpo>
    ExpoInOut,
    /// <https://easings.net/#easeOutExpo>
    ExpoOut,
    // Applies no transformation.
    Linear,
    /// <https://easings.net/#easeInQuad>
    QuadIn,
    /// <https://easings.net/#easeInOutQuad>
    QuadInOut,
    /// <https://easings.net/#easeOutQuad>
    QuadOut,
    /// <https://easings.net/#easeInQuart>
    QuartIn,
    /// <https://easings.net/#easeInOutQuart>
    QuartInOut,
    /// <https://easings.net/#easeOutQuart>
    QuartOut,
    /// <https://easings.net/#easeInQuint>
    QuintIn,
    /// <https://easings.net/#easeInOutQuint>
    QuintInOut,
    /// <https://easings.net/#easeOutQuint>
    QuintOut,
    // A linear easing that goes from 1.0 to 0.0.
    Reverse,
    // A linear easing that goes from 0.0 to 1.0 and back to 0.0. That might be used in combination with other easing functions.
    RoundTrip,
    /// <https://easings.net/#easeInSine>
    SineIn,
    /// <https://easings.net/#easeInOutSine>
    SineInOut,
    /// <https://easings.net/#easeOutSine>
    SineOut,
}

impl Easing {
    /// Every built-in easing, in declaration order.
    pub const ALL: [Easing; 33] = [
        Easing::BackIn,
        Easing::BackInOut,
        Easing::BackOut,
        Easing::BounceIn,
        Easing::BounceInOut,
        Easing::BounceOut,
        Easing::CircIn,
        Easing::CircInOut,
        Easing::CircOut,
        Easing::CubicIn,
        Easing::CubicInOut,
        Easing::CubicOut,
        Easing::ElasticIn,
        Easing::ElasticInOut,
        Easing::ElasticOut,
        Easing::ExpoIn,
        Easing::ExpoInOut,
        Easing::ExpoOut,
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadInOut,
        Easing::QuadOut,
        Easing::QuartIn,
        Easing::QuartInOut,
        Easing::QuartOut,
        Easing::QuintIn,
        Easing::QuintInOut,
        Easing::QuintOut,
        Easing::Reverse,
        Easing::RoundTrip,
        Easing::SineIn,
        Easing::SineInOut,
        Easing::SineOut,
    ];

    /// Call the easing function.
    pub fn call(&self, t: f64) -> f64 {
        let f: fn(f32) -> f32 = match self {
            Easing::Linear => return t,
            Easing::BackIn => back_in,
            Easing::BackInOut => back_in_out,
            Easing::BackOut => back_out,
            Easing::BounceIn => bounce_in,
            Easing::BounceInOut => bounce_in_out,
            Easing::BounceOut => bounce_out,
            Easing::CircIn => circ_in,
            Easing::CircInOut => circ_in_out,
            Easing::CircOut => circ_out,
            Easing::CubicIn => cubic_in,
            Easing::CubicInOut => cubic_in_out,
            Easing::CubicOut => cubic_out,
            Easing::ElasticIn => elastic_in,
            Easing::ElasticInOut => elastic_in_out,
            Easing::ElasticOut => elastic_out,
            Easing::ExpoIn => expo_in,
            Easing::ExpoInOut => expo_in_out,
            Easing::ExpoOut => expo_out,
            Easing::QuadIn => quad_in,
            Easing::QuadInOut => quad_in_out,
            Easing::QuadOut => quad_out,
            Easing::QuartIn => quart_in,
            Easing::QuartInOut => quart_in_out,
            Easing::QuartOut => quart_out,
            Easing::QuintIn => quint_in,
            Easing::QuintInOut => quint_in_out,
            Easing::QuintOut => quint_out,
            Easing::Reverse => reverse,
            Easing::RoundTrip => roundtrip,
            Easing::SineIn => sine_in,
            Easing::SineInOut => sine_in_out,
            Easing::SineOut => sine_out,
        };
        f(t as f32) as f64
    }

    /// Returns the canonical name of the easing (ie: `"easeInOutCubic"`).
    pub fn name(&self) -> &'static str {
        match self {
            Easing::BackIn => "easeInBack",
            Easing::BackInOut => "easeInOutBack",
            Easing::BackOut => "easeOutBack",
            Easing::BounceIn => "easeInBounce",
            Easing::BounceInOut => "easeInOutBounce",
            Easing::BounceOut => "easeOutBounce",
            Easing::CircIn => "easeInCirc",
            Easing::CircInOut => "easeInOutCirc",
            Easing::CircOut => "easeOutCirc",
            Easing::CubicIn => "easeInCubic",
            Easing::CubicInOut => "easeInOutCubic",
            Easing::CubicOut => "easeOutCubic",
            Easing::ElasticIn => "easeInElastic",
            Easing::ElasticInOut => "easeInOutElastic",
            Easing::ElasticOut => "easeOutElastic",
            Easing::ExpoIn => "easeInExpo",
            Easing::ExpoInOut => "easeInOutExpo",
            Easing::ExpoOut => "easeOutExpo",
            Easing::Linear => "linear",
            Easing::QuadIn => "easeInQuad",
            Easing::QuadInOut => "easeInOutQuad",
            Easing::QuadOut => "easeOutQuad",
            Easing::QuartIn => "easeInQuart",
            Easing::QuartInOut => "easeInOutQuart",
            Easing::QuartOut => "easeOutQuart",
            Easing::QuintIn => "easeInQuint",
            Easing::QuintInOut => "easeInOutQuint",
            Easing::QuintOut => "easeOutQuint",
            Easing::Reverse => "reverse",
            Easing::RoundTrip => "roundTrip",
            Easing::SineIn => "easeInSine",
            Easing::SineInOut => "easeInOutSine",
            Easing::SineOut => "easeOutSine",
        }
    }
}

impl FromStr for Easing {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|easing| easing.name() == name)
            .ok_or_else(|| UnknownEasingSnafu { name }.build())
    }
}

impl Display for Easing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
