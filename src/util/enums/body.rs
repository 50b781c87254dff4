use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Selector for a trackable body. The discriminant is the menu number offered to the operator.
#[derive(
    Debug,
    Eq,
    PartialEq,
    Hash,
    Copy,
    Clone,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Body {
    Sun = 0,
    Moon = 1,
    Mars = 2,
    Jupiter = 3,
    Saturn = 4,
    Venus = 5,
}

impl Body {
    pub const ALL: [Body; 6] = [
        Body::Sun,
        Body::Moon,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Venus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Venus => "Venus",
        }
    }

    /// The Sun takes the dedicated solar path, which ignores site elevation
    #[inline]
    pub fn is_sun(&self) -> bool {
        matches!(self, Body::Sun)
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
