use std::{fmt::Display, str::FromStr};

use crate::{constants::{UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH}, ellipsoid::EllipsoidParameters, Error, ThisOrThat};

pub(crate) mod zonespec {
    pub(crate) const MINUTMZONE: i32 = 1;
    pub(crate) const MAXUTMZONE: i32 = 60;
    /// Width of a zone in degrees of longitude
    pub(crate) const WIDTH: f64 = 6.;
}

// 100 km MGRS tile, used as slop around the UTM limits
const TILE: f64 = 100_000.;

// Valid ranges in meters, with the false origin applied, indexed by
// hemisphere (south, north)
const MIN_EASTING: [f64; 2] = [TILE, TILE];
const MAX_EASTING: [f64; 2] = [9. * TILE, 9. * TILE];
const MIN_NORTHING: [f64; 2] = [10. * TILE, -90. * TILE];
const MAX_NORTHING: [f64; 2] = [195. * TILE, 95. * TILE];

/// The hemisphere a UTM coordinate is referenced to. Southern hemisphere
/// northings carry a 10 000 km false northing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Hemisphere of a latitude: south if strictly negative.
    pub fn from_latitude(lat: f64) -> Hemisphere {
        (lat < 0.).ternary(Hemisphere::South, Hemisphere::North)
    }

    #[inline]
    pub fn is_north(self) -> bool {
        self == Hemisphere::North
    }

    /// False northing applied to northings in this hemisphere.
    pub fn false_northing(self) -> f64 {
        self.is_north().ternary(0., UTM_FALSE_NORTHING_SOUTH)
    }

    // index in the range tables
    fn ind(self) -> usize {
        self.is_north().ternary(1, 0)
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    /// Accepts `N`, `S`, `North`, `South`, `Nord` and `Sud`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" | "nord" => Ok(Hemisphere::North),
            "s" | "south" | "sud" => Ok(Hemisphere::South),
            _ => Err(Error::InvalidHemisphere(s.to_string())),
        }
    }
}

impl Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.is_north().ternary("N", "S"))
    }
}

/// Transverse Mercator math for the UTM grid, on a given ellipsoid.
///
/// Eastings and northings include the UTM false origin. Implemented by
/// [`TransverseMercator`](crate::TransverseMercator); another
/// implementation, e.g. a binding to a projection library, can be used in
/// its place as long as it round-trips to 1e-6 degrees.
pub trait UtmProjection {
    /// The ellipsoid the projection is defined on.
    fn ellipsoid(&self) -> &EllipsoidParameters;

    /// Projects `lat`/`lon` (degrees) in `zone` and returns
    /// `(easting, northing)` in meters.
    fn forward(&self, zone: i32, hemisphere: Hemisphere, lat: f64, lon: f64) -> (f64, f64);

    /// Inverse of [`UtmProjection::forward`], returns `(lat, lon)` in degrees.
    fn inverse(&self, zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64) -> (f64, f64);
}

/// Representation of a WGS84
/// [UTM](https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system)
/// point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtmPoint {
    pub(crate) zone: i32,
    pub(crate) hemisphere: Hemisphere,
    pub(crate) easting: f64,
    pub(crate) northing: f64,
}

impl UtmPoint {
    /// Internal-only constructor that doesn't check the coordinate
    pub(crate) fn new(zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64) -> UtmPoint {
        Self {
            zone,
            hemisphere,
            easting,
            northing,
        }
    }

    /// Tries to create a UTM point from its constituent parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZone`] if the zone is outside the range `[1, 60]`.
    /// Returns [`Error::InvalidUtmCoords`] if easting or northing is not
    /// finite or lies outside the area covered by UTM in that hemisphere.
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::{Hemisphere, UtmPoint};
    ///
    /// let coord = UtmPoint::create(31, Hemisphere::North, 348163.320, 4041824.970);
    ///
    /// assert!(coord.is_ok());
    ///
    /// let coord = coord.unwrap();
    ///
    /// assert_eq!(coord.zone(), 31);
    /// assert_eq!(coord.hemisphere(), Hemisphere::North);
    ///
    /// let invalid_zone = UtmPoint::create(0, Hemisphere::North, 348163.320, 4041824.970);
    /// assert!(invalid_zone.is_err());
    ///
    /// let invalid_zone = UtmPoint::create(61, Hemisphere::North, 348163.320, 4041824.970);
    /// assert!(invalid_zone.is_err());
    ///
    /// let invalid_easting = UtmPoint::create(31, Hemisphere::North, 1_200_000.0, 4041824.970);
    /// assert!(invalid_easting.is_err());
    /// ```
    pub fn create(zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64) -> Result<UtmPoint, Error> {
        check_zone(zone)?;
        check_coords(hemisphere, easting, northing)?;

        Ok(UtmPoint::new(zone, hemisphere, easting, northing))
    }

    /// Returns the UTM zone.
    #[inline]
    pub fn zone(&self) -> i32 {
        self.zone
    }

    #[inline]
    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Returns whether the coordinate is in the northern hemisphere.
    #[inline]
    pub fn is_north(&self) -> bool {
        self.hemisphere.is_north()
    }

    /// Returns the UTM easting.
    #[inline]
    pub fn easting(&self) -> f64 {
        self.easting
    }

    /// Returns the UTM northing.
    #[inline]
    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Projects a WGS84 latitude/longitude to UTM.
    ///
    /// The zone is derived from the longitude unless `zone` is given; the
    /// hemisphere is south for negative latitudes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZone`] if `zone` is given and outside `[1, 60]`,
    /// [`Error::InvalidCoord`] if the latitude or longitude is out of range.
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::{Hemisphere, TransverseMercator, UtmPoint};
    ///
    /// let utm = TransverseMercator::wgs84();
    /// let point = UtmPoint::from_geographic(&utm, 40.748333, -73.985278, None).unwrap();
    ///
    /// assert_eq!(point.zone(), 18);
    /// assert_eq!(point.hemisphere(), Hemisphere::North);
    /// // Check if the converted coordinate is accurate to 3 decimals (same as reference)
    /// assert!((point.easting() - 585664.121).abs() < 1e-3);
    /// assert!((point.northing() - 4511315.422).abs() < 1e-3);
    ///
    /// assert!(UtmPoint::from_geographic(&utm, 40.748333, -73.985278, Some(0)).is_err());
    /// ```
    pub fn from_geographic<P: UtmProjection>(projection: &P, lat: f64, lon: f64, zone: Option<i32>) -> Result<UtmPoint, Error> {
        if !(-90_f64..=90_f64).contains(&lat) || !(-180_f64..=180_f64).contains(&lon) {
            return Err(Error::InvalidCoord(format!("Latitude/longitude {lat}, {lon} outside of [-90, 90] x [-180, 180].")));
        }

        let zone = match zone {
            Some(zone) => {
                check_zone(zone)?;
                zone
            }
            None => zone_from_longitude(lon),
        };
        let hemisphere = Hemisphere::from_latitude(lat);

        let (easting, northing) = projection.forward(zone, hemisphere, lat, lon);

        Ok(UtmPoint::new(zone, hemisphere, easting, northing))
    }

    /// Converts back to WGS84, returning `(lat, lon)` in degrees.
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::{Hemisphere, TransverseMercator, UtmPoint};
    ///
    /// let utm = TransverseMercator::wgs84();
    /// let point = UtmPoint::create(18, Hemisphere::North, 585664.121, 4511315.422).unwrap();
    ///
    /// let (lat, lon) = point.to_geographic(&utm);
    ///
    /// // Check if the converted coordinate is accurate to 6 decimals (same as reference)
    /// assert!((lat - 40.748333).abs() < 1e-6);
    /// assert!((lon - -73.985278).abs() < 1e-6);
    /// ```
    pub fn to_geographic<P: UtmProjection>(&self, projection: &P) -> (f64, f64) {
        projection.inverse(self.zone, self.hemisphere, self.easting, self.northing)
    }
}

/// Longitude of the central meridian of `zone`, in degrees.
pub fn central_meridian(zone: i32) -> f64 {
    zonespec::WIDTH * f64::from(zone) - 183.
}

/// The standard 6° UTM zone containing `lon`, without the Norway and
/// Svalbard exceptions. The 180° meridian belongs to zone 60.
///
/// # Usage
///
/// ```
/// use geoscale::utm::zone_from_longitude;
///
/// assert_eq!(zone_from_longitude(1.3), 31);
/// assert_eq!(zone_from_longitude(-179.9), 1);
/// assert_eq!(zone_from_longitude(179.9), 60);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn zone_from_longitude(lon: f64) -> i32 {
    let zone = ((lon + 180.) / zonespec::WIDTH).floor() as i32 + 1;

    zone.clamp(zonespec::MINUTMZONE, zonespec::MAXUTMZONE)
}

pub(crate) fn check_zone(zone: i32) -> Result<(), Error> {
    if (zonespec::MINUTMZONE..=zonespec::MAXUTMZONE).contains(&zone) {
        Ok(())
    } else {
        Err(Error::InvalidZone(zone))
    }
}

pub(crate) fn check_coords(hemisphere: Hemisphere, x: f64, y: f64) -> Result<(), Error> {
    let slop = TILE;

    let ind = hemisphere.ind();
    if !x.is_finite() || x < MIN_EASTING[ind] - slop || x > MAX_EASTING[ind] + slop {
        return Err(Error::InvalidUtmCoords(
            format!(
                "Easting {:.2}km not in UTM range for {} hemisphere [{:.2}km, {:.2}km]",
                x / 1000.0,
                hemisphere,
                (MIN_EASTING[ind] - slop) / 1000.0,
                (MAX_EASTING[ind] + slop) / 1000.0,
            )
        ));
    }

    if !y.is_finite() || y < MIN_NORTHING[ind] - slop || y > MAX_NORTHING[ind] + slop {
        return Err(Error::InvalidUtmCoords(
            format!(
                "Northing {:.2}km not in UTM range for {} hemisphere [{:.2}km, {:.2}km]",
                y / 1000.0,
                hemisphere,
                (MIN_NORTHING[ind] - slop) / 1000.0,
                (MAX_NORTHING[ind] + slop) / 1000.0,
            )
        ));
    }

    Ok(())
}

/// Easting relative to the central meridian, in meters.
pub(crate) fn offset_from_central_meridian(easting: f64) -> f64 {
    easting - UTM_FALSE_EASTING
}

impl Display for UtmPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} {} {}",
            self.zone,
            self.is_north().ternary("n", "s"),
            self.easting,
            self.northing
        )
    }
}
