use chrono::{DateTime, Datelike, Timelike, Utc};
use polynomials::poly;
use std::f64::consts::{PI, TAU};

pub type Hours = f64;
pub type Degrees = f64;
pub type Radians = f64;

const J2000: f64 = 2451545.0;
const DAYS_PER_CENTURY: f64 = 36525.;

pub fn deg_to_rad(degrees: Degrees) -> Radians {
    PI * degrees / 180.
}

pub fn rad_to_deg(rad: Radians) -> Degrees {
    180. * rad / PI
}

pub fn hours_to_rad(hours: Hours) -> Radians {
    PI * hours / 12.
}

pub fn rad_to_hours(rad: Radians) -> Hours {
    12. * rad / PI
}

pub fn deg_to_hours(deg: Degrees) -> Hours {
    deg / 15.
}

// Convert hms to hours or dms to degrees
pub fn ms_to_dec(d: u32, minutes: u32, seconds: f64) -> f64 {
    (d as f64) + (minutes as f64) / 60. + seconds / 3600.
}

pub fn modulo(val: f64, base: f64) -> f64 {
    ((val % base) + base) % base
}

/// Calculates the Julian Date of a time
/// see https://scienceworld.wolfram.com/astronomy/JulianDate.html
pub fn calc_jd(time: DateTime<Utc>) -> f64 {
    let y = time.year() as f64;
    let m = time.month() as f64;
    let d = time.day() as f64;

    let mut jd = 367. * y;
    jd -= f64::floor(7. * (y + f64::floor((m + 9.) / 12.)) / 4.);
    jd -= f64::floor(3. * (f64::floor((y + (m - 9.) / 7.) / 100.) + 1.) / 4.);
    jd += f64::floor(275. * m / 9.);
    jd += d;
    jd += 1721028.5;
    let seconds = time.second() as f64 + time.nanosecond() as f64 * 1E-9;
    jd + ms_to_dec(time.hour(), time.minute(), seconds) / 24.
}

/// Julian centuries since J2000
fn centuries_since_j2000(time: DateTime<Utc>) -> f64 {
    (calc_jd(time) - J2000) / DAYS_PER_CENTURY
}

// see https://thecynster.home.blog/2019/11/04/calculating-sidereal-time/
pub fn calculate_greenwich_sidereal_time(time: DateTime<Utc>) -> Hours {
    // Off by the leap seconds accumulated since this total was current
    const LEAP_SECOND_TOTAL: u32 = 27;

    let jd_utc = calc_jd(time);

    let du = jd_utc - J2000;
    let theta = rad_to_hours(modulo(
        TAU * (0.779_057_273_264f64 + 1.002_737_811_911_354_5f64 * du),
        TAU,
    ));

    let poly = poly![
        0.014506,
        4612.156534,
        1.3915817,
        -0.00000044,
        -0.000029956,
        -0.0000000368,
    ];
    let jd_tt = jd_utc + ((LEAP_SECOND_TOTAL as f64 + 32.184) / 3600.) / 24.;
    let t = (jd_tt - J2000) / DAYS_PER_CENTURY;

    // Evaluating a non-empty polynomial always yields a value
    let precession = poly.eval(t).unwrap_or(0.);
    let gmstp = deg_to_hours(modulo(precession / 3600., 360.));

    modulo(theta + gmstp, 24.)
}

/// longitude in degrees
/// returns hours
pub fn calculate_local_sidereal_time(time: DateTime<Utc>, longitude: Degrees) -> Hours {
    let greenwich_sidereal_time = calculate_greenwich_sidereal_time(time);
    modulo(greenwich_sidereal_time + deg_to_hours(longitude), 24.)
}

/// longitude in degrees, ra in hours
/// returns hours
pub fn calculate_hour_angle(time: DateTime<Utc>, longitude: Degrees, ra: Hours) -> Hours {
    modulo(calculate_local_sidereal_time(time, longitude) - ra, 24.)
}

pub fn calculate_alt_from_ha_dec(ha: Hours, dec: Degrees, lat: Degrees) -> Degrees {
    let ha = hours_to_rad(ha);
    let dec = deg_to_rad(dec);
    let lat = deg_to_rad(lat);
    let sin_alt = (dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos()).clamp(-1., 1.);
    rad_to_deg(sin_alt.asin())
}

/// Azimuth measured from north through east, in [0, 360).
/// Stays defined at the poles, where the azimuth reduces to the hour angle.
pub fn calculate_az_from_ha_dec(ha: Hours, dec: Degrees, lat: Degrees) -> Degrees {
    let ha = hours_to_rad(ha);
    let dec = deg_to_rad(dec);
    let lat = deg_to_rad(lat);

    let y = -dec.cos() * ha.sin();
    let x = dec.sin() * lat.cos() - dec.cos() * lat.sin() * ha.cos();
    modulo(rad_to_deg(y.atan2(x)), 360.)
}

/// Mean obliquity of the ecliptic
fn obliquity(t: f64) -> Degrees {
    23.439_291 - 0.013_004_2 * t
}

/// Ecliptic longitude/latitude to right ascension (hours) and declination
pub fn ecliptic_to_equatorial(
    longitude: Degrees,
    latitude: Degrees,
    obliquity: Degrees,
) -> (Hours, Degrees) {
    let l = deg_to_rad(longitude);
    let b = deg_to_rad(latitude);
    let e = deg_to_rad(obliquity);

    let ra = (l.sin() * e.cos() - b.tan() * e.sin()).atan2(l.cos());
    let dec = (b.sin() * e.cos() + b.cos() * e.sin() * l.sin()).clamp(-1., 1.).asin();
    (modulo(rad_to_hours(ra), 24.), rad_to_deg(dec))
}

/// Apparent solar right ascension and declination.
/// Low precision formula from the Astronomical Almanac, good to about 0.01 degrees.
pub fn sun_ra_dec(time: DateTime<Utc>) -> (Hours, Degrees) {
    let n = calc_jd(time) - J2000;
    let mean_longitude = modulo(280.460 + 0.985_647_4 * n, 360.);
    let g = deg_to_rad(modulo(357.528 + 0.985_600_3 * n, 360.));
    let ecliptic_longitude = mean_longitude + 1.915 * g.sin() + 0.020 * (2. * g).sin();
    let obliquity = 23.439 - 0.000_000_4 * n;
    ecliptic_to_equatorial(ecliptic_longitude, 0., obliquity)
}

/// Geocentric lunar right ascension, declination and horizontal parallax (degrees).
/// Truncated series from the Astronomical Almanac, good to a few tenths of a degree.
pub fn moon_ra_dec_parallax(time: DateTime<Utc>) -> (Hours, Degrees, Degrees) {
    let t = centuries_since_j2000(time);
    let sin_d = |a: f64, b: f64| deg_to_rad(a + b * t).sin();
    let cos_d = |a: f64, b: f64| deg_to_rad(a + b * t).cos();

    let longitude = 218.32 + 481_267.881 * t + 6.29 * sin_d(135.0, 477_198.87)
        - 1.27 * sin_d(259.3, -413_335.36)
        + 0.66 * sin_d(235.7, 890_534.22)
        + 0.21 * sin_d(269.9, 954_397.74)
        - 0.19 * sin_d(357.5, 35_999.05)
        - 0.11 * sin_d(186.5, 966_404.03);

    let latitude = 5.13 * sin_d(93.3, 483_202.02) + 0.28 * sin_d(228.2, 960_400.89)
        - 0.28 * sin_d(318.3, 6_003.15)
        - 0.17 * sin_d(217.6, -407_332.21);

    let parallax = 0.9508
        + 0.0518 * cos_d(135.0, 477_198.87)
        + 0.0095 * cos_d(259.3, -413_335.36)
        + 0.0078 * cos_d(235.7, 890_534.22)
        + 0.0028 * cos_d(269.9, 954_397.74);

    let (ra, dec) = ecliptic_to_equatorial(modulo(longitude, 360.), latitude, obliquity(t));
    (ra, dec, parallax)
}

/// Keplerian elements at J2000 and their rates per Julian century.
/// Standish, "Keplerian Elements for Approximate Positions of the Major Planets", 1800-2050.
#[derive(Debug, Copy, Clone)]
pub struct OrbitalElements {
    /// Semi-major axis (au)
    pub a: [f64; 2],
    pub e: [f64; 2],
    /// Inclination
    pub i: [Degrees; 2],
    /// Mean longitude
    pub l: [Degrees; 2],
    /// Longitude of perihelion
    pub peri: [Degrees; 2],
    /// Longitude of the ascending node
    pub node: [Degrees; 2],
}

pub const EARTH_MOON_BARYCENTER: OrbitalElements = OrbitalElements {
    a: [1.000_002_61, 0.000_005_62],
    e: [0.016_711_23, -0.000_043_92],
    i: [-0.000_015_31, -0.012_946_68],
    l: [100.464_571_66, 35_999.372_449_81],
    peri: [102.937_681_93, 0.323_273_64],
    node: [0.0, 0.0],
};

pub const VENUS: OrbitalElements = OrbitalElements {
    a: [0.723_335_66, 0.000_003_90],
    e: [0.006_776_72, -0.000_041_07],
    i: [3.394_676_05, -0.000_788_90],
    l: [181.979_099_50, 58_517.815_387_29],
    peri: [131.602_467_18, 0.002_683_29],
    node: [76.679_842_55, -0.277_694_18],
};

pub const MARS: OrbitalElements = OrbitalElements {
    a: [1.523_710_34, 0.000_018_47],
    e: [0.093_394_10, 0.000_078_82],
    i: [1.849_691_42, -0.008_131_31],
    l: [-4.553_432_05, 19_140.302_684_99],
    peri: [-23.943_629_59, 0.444_410_88],
    node: [49.559_538_91, -0.292_573_43],
};

pub const JUPITER: OrbitalElements = OrbitalElements {
    a: [5.202_887_00, -0.000_116_07],
    e: [0.048_386_24, -0.000_132_53],
    i: [1.304_396_95, -0.001_837_14],
    l: [34.396_440_51, 3_034.746_127_75],
    peri: [14.728_479_83, 0.212_526_68],
    node: [100.473_909_09, 0.204_691_06],
};

pub const SATURN: OrbitalElements = OrbitalElements {
    a: [9.536_675_94, -0.001_250_60],
    e: [0.053_861_79, -0.000_509_91],
    i: [2.485_991_87, 0.001_936_09],
    l: [49.954_244_23, 1_222.493_622_01],
    peri: [92.598_878_31, -0.418_972_16],
    node: [113.662_424_48, -0.288_677_94],
};

/// Solves Kepler's equation M = E - e sin E by Newton iteration
fn solve_kepler(mean_anomaly: Radians, e: f64) -> Radians {
    let m = modulo(mean_anomaly + PI, TAU) - PI;
    let mut ecc_anomaly = if e < 0.8 { m } else { PI };
    for _ in 0..30 {
        let delta = (ecc_anomaly - e * ecc_anomaly.sin() - m) / (1. - e * ecc_anomaly.cos());
        ecc_anomaly -= delta;
        if delta.abs() < 1E-12 {
            break;
        }
    }
    ecc_anomaly
}

impl OrbitalElements {
    /// Heliocentric ecliptic (J2000) rectangular coordinates in au
    pub fn heliocentric_position(&self, t: f64) -> [f64; 3] {
        let at = |el: [f64; 2]| el[0] + el[1] * t;
        let a = at(self.a);
        let e = at(self.e);
        let i = deg_to_rad(at(self.i));
        let l = at(self.l);
        let peri = at(self.peri);
        let node_deg = at(self.node);

        let arg_peri = deg_to_rad(peri - node_deg);
        let node = deg_to_rad(node_deg);
        let ecc_anomaly = solve_kepler(deg_to_rad(l - peri), e);

        let xp = a * (ecc_anomaly.cos() - e);
        let yp = a * (1. - e * e).sqrt() * ecc_anomaly.sin();

        let (sw, cw) = arg_peri.sin_cos();
        let (so, co) = node.sin_cos();
        let (si, ci) = i.sin_cos();

        [
            (cw * co - sw * so * ci) * xp + (-sw * co - cw * so * ci) * yp,
            (cw * so + sw * co * ci) * xp + (-sw * so + cw * co * ci) * yp,
            (sw * si) * xp + (cw * si) * yp,
        ]
    }
}

/// Geocentric right ascension (hours) and declination of a planet
pub fn planet_ra_dec(planet: &OrbitalElements, time: DateTime<Utc>) -> (Hours, Degrees) {
    let t = centuries_since_j2000(time);
    let p = planet.heliocentric_position(t);
    let earth = EARTH_MOON_BARYCENTER.heliocentric_position(t);
    let (x, y, z) = (p[0] - earth[0], p[1] - earth[1], p[2] - earth[2]);

    let e = deg_to_rad(obliquity(0.));
    let (se, ce) = e.sin_cos();
    let x_eq = x;
    let y_eq = y * ce - z * se;
    let z_eq = y * se + z * ce;

    let ra = modulo(rad_to_hours(y_eq.atan2(x_eq)), 24.);
    let dec = rad_to_deg(z_eq.atan2((x_eq * x_eq + y_eq * y_eq).sqrt()));
    (ra, dec)
}

/// Standard-atmosphere pressure (mbar) at a height above sea level (m)
pub fn pressure_at_elevation(elevation: f64) -> f64 {
    1010. * (-elevation / 8434.5).exp()
}

/// Atmospheric refraction (degrees) to add to a true altitude.
/// Saemundsson's formula, scaled for pressure and a 15C atmosphere.
pub fn refraction(true_alt: Degrees, pressure_mbar: f64) -> Degrees {
    if true_alt < -1. {
        return 0.;
    }
    let arg = deg_to_rad(true_alt + 10.3 / (true_alt + 5.11));
    let minutes = 1.02 / arg.tan();
    (minutes / 60.) * (pressure_mbar / 1010.) * (283. / 288.)
}
