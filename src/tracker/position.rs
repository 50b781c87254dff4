use crate::astro_math::*;
use crate::util::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where on Earth positions are computed for
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservingLocation {
    pub latitude: Degrees,
    pub longitude: Degrees,
    /// Metres above sea level
    pub elevation: f64,
}

impl ObservingLocation {
    pub fn validate(&self) -> TrackerResult<()> {
        check_latitude(self.latitude)?;
        check_longitude(self.longitude)?;
        check_elevation(self.elevation)
    }
}

/// Horizontal coordinates as reported by a provider.
/// Azimuth from north through east, altitude above the horizon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RealPosition {
    pub azimuth: Degrees,
    pub altitude: Degrees,
}

impl RealPosition {
    /// Rejects non-finite or impossible values and folds the azimuth into [0, 360)
    pub fn checked(self) -> TrackerResult<Self> {
        check_az(self.azimuth)?;
        check_alt(self.altitude)?;
        Ok(Self {
            azimuth: modulo(self.azimuth, 360.),
            altitude: self.altitude,
        })
    }
}

/// Computes where a body appears in the sky. Implementations must be deterministic.
pub trait PositionProvider: Send + Sync {
    fn position_of(
        &self,
        body: Body,
        location: &ObservingLocation,
        instant: DateTime<Utc>,
    ) -> TrackerResult<RealPosition>;
}

/// Built-in low precision ephemeris, good to a fraction of a servo degree
#[derive(Debug, Copy, Clone, Default)]
pub struct AstroProvider;

impl AstroProvider {
    fn horizontal(
        ra: Hours,
        dec: Degrees,
        location: &ObservingLocation,
        instant: DateTime<Utc>,
    ) -> RealPosition {
        let ha = calculate_hour_angle(instant, location.longitude, ra);
        RealPosition {
            azimuth: calculate_az_from_ha_dec(ha, dec, location.latitude),
            altitude: calculate_alt_from_ha_dec(ha, dec, location.latitude),
        }
    }

    fn apply_refraction(position: RealPosition, location: &ObservingLocation) -> RealPosition {
        let pressure = pressure_at_elevation(location.elevation);
        RealPosition {
            azimuth: position.azimuth,
            altitude: (position.altitude + refraction(position.altitude, pressure)).min(90.),
        }
    }
}

impl PositionProvider for AstroProvider {
    fn position_of(
        &self,
        body: Body,
        location: &ObservingLocation,
        instant: DateTime<Utc>,
    ) -> TrackerResult<RealPosition> {
        location.validate()?;

        let position = match body {
            // geometric solar path, independent of site elevation
            Body::Sun => {
                let (ra, dec) = sun_ra_dec(instant);
                Self::horizontal(ra, dec, location, instant)
            }
            Body::Moon => {
                let (ra, dec, parallax) = moon_ra_dec_parallax(instant);
                let geocentric = Self::horizontal(ra, dec, location, instant);
                let topocentric = RealPosition {
                    azimuth: geocentric.azimuth,
                    altitude: geocentric.altitude
                        - parallax * deg_to_rad(geocentric.altitude).cos(),
                };
                Self::apply_refraction(topocentric, location)
            }
            Body::Mars | Body::Jupiter | Body::Saturn | Body::Venus => {
                let elements = match body {
                    Body::Mars => &MARS,
                    Body::Jupiter => &JUPITER,
                    Body::Saturn => &SATURN,
                    _ => &VENUS,
                };
                let (ra, dec) = planet_ra_dec(elements, instant);
                Self::apply_refraction(Self::horizontal(ra, dec, location, instant), location)
            }
        };

        position.checked()
    }
}
