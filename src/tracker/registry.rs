use crate::astro_math::Degrees;
use crate::tracker::position::ObservingLocation;
use crate::util::*;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type SiteId = u8;

/// Source id stamped on frames the operator entered by hand
pub const MANUAL_SOURCE_ID: u16 = 7;

/// A named observing site. Its id doubles as the frame source id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub latitude: Degrees,
    pub longitude: Degrees,
    /// Metres above sea level
    pub elevation: f64,
    pub timezone: Tz,
}

impl Site {
    fn new(
        id: SiteId,
        name: &str,
        latitude: Degrees,
        longitude: Degrees,
        elevation: f64,
        timezone: Tz,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            latitude,
            longitude,
            elevation,
            timezone,
        }
    }

    pub fn location(&self) -> ObservingLocation {
        ObservingLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
        }
    }

    pub fn source_id(&self) -> u16 {
        self.id as u16
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if self.id == 0 || self.source_id() == MANUAL_SOURCE_ID {
            return Err(TrackerError::configuration(format_args!(
                "Site '{}' cannot use id {}",
                self.name, self.id
            )));
        }
        self.location()
            .validate()
            .map_err(|e| TrackerError::configuration(format_args!("Site '{}': {}", self.name, e)))
    }
}

pub fn default_sites() -> Vec<Site> {
    use chrono_tz::{America, Antarctica, Asia, Australia, Europe};
    vec![
        Site::new(1, "Bogotá", 4.7110, -74.0721, 2640., America::Bogota),
        Site::new(2, "Madrid", 40.4168, -3.7038, 650., Europe::Madrid),
        Site::new(3, "Sídney", -33.8688, 151.2093, 58., Australia::Sydney),
        Site::new(4, "Tokio", 35.6762, 139.6503, 40., Asia::Tokyo),
        Site::new(5, "Alaska", 61.2181, -149.9003, 30., America::Anchorage),
        Site::new(6, "Polo Sur", -90.0, 0.0, 2800., Antarctica::South_Pole),
    ]
}

/// Selectable sites and bodies
#[derive(Debug, Clone)]
pub struct Registry {
    sites: Vec<Site>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            sites: default_sites(),
        }
    }
}

impl Registry {
    pub fn new(sites: Vec<Site>) -> TrackerResult<Self> {
        if sites.is_empty() {
            return Err(TrackerError::configuration("At least one site is required"));
        }
        let mut ids = HashSet::with_capacity(sites.len());
        for site in &sites {
            site.validate()?;
            if !ids.insert(site.id) {
                return Err(TrackerError::configuration(format_args!(
                    "Site id {} is used more than once",
                    site.id
                )));
            }
        }
        Ok(Self { sites })
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> TrackerResult<&Site> {
        self.sites
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| TrackerError::configuration(format_args!("Unknown site {}", id)))
    }

    pub fn bodies(&self) -> &'static [Body] {
        &Body::ALL
    }

    pub fn body(&self, selector: u8) -> TrackerResult<Body> {
        Body::try_from(selector)
            .map_err(|_| TrackerError::configuration(format_args!("Unknown body {}", selector)))
    }
}
