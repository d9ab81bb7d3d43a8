use std::fmt::Display;

use crate::{utm::{UtmPoint, UtmProjection}, Error};

/// A WGS84 latitude/longitude with an ellipsoidal height. Can be converted
/// to a [`UtmPoint`] through a [`UtmProjection`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeographicPoint {
    #[cfg_attr(feature = "serde", serde(alias = "lat"))]
    pub(crate) latitude: f64,
    #[cfg_attr(feature = "serde", serde(alias = "lon"))]
    pub(crate) longitude: f64,
    #[cfg_attr(feature = "serde", serde(alias = "h"))]
    pub(crate) height: f64,
}

impl GeographicPoint {
    /// Internal-only constructor that doesn't check the bounds of lat/lon
    pub(crate) fn new(lat: f64, lon: f64, height: f64) -> GeographicPoint {
        Self {
            latitude: lat,
            longitude: lon,
            height,
        }
    }

    /// Tries to create a geographic point. First checks if the values are
    /// valid:
    /// * Latitude must be in range [-90,90]
    /// * Longitude must be in range [-180,180]
    /// * Height must be finite
    ///
    /// The height is taken as height above the ellipsoid. Orthometric
    /// heights need their geoid separation added by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if any of the three values is invalid.
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::GeographicPoint;
    ///
    /// let point = GeographicPoint::create(36.509736, 1.304408, 59.595);
    ///
    /// assert!(point.is_ok());
    ///
    /// let point = point.unwrap();
    ///
    /// assert_eq!(point.latitude(), 36.509736);
    /// assert_eq!(point.longitude(), 1.304408);
    /// assert_eq!(point.height(), 59.595);
    ///
    /// assert!(GeographicPoint::create(100.0, 0.0, 0.0).is_err());
    /// assert!(GeographicPoint::create(0.0, -200.0, 0.0).is_err());
    /// assert!(GeographicPoint::create(0.0, 0.0, f64::NAN).is_err());
    /// ```
    pub fn create(lat: f64, lon: f64, height: f64) -> Result<GeographicPoint, Error> {
        if !(-90_f64..=90_f64).contains(&lat) {
            Err(Error::InvalidCoord(format!("Latitude {lat} outside of valid range [-90, 90].")))
        } else if !(-180_f64..=180_f64).contains(&lon) {
            Err(Error::InvalidCoord(format!("Longitude {lon} outside of valid range [-180, 180].")))
        } else if !height.is_finite() {
            Err(Error::InvalidCoord(format!("Height {height} is not a finite number.")))
        } else {
            Ok(GeographicPoint::new(lat, lon, height))
        }
    }

    /// Returns the latitude in decimal degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the ellipsoidal height in meters.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns whether the point is in the northern hemisphere. The equator
    /// counts as north.
    ///
    /// # Example
    ///
    /// ```
    /// use geoscale::GeographicPoint;
    ///
    /// assert!(GeographicPoint::create(0.0, 3.0, 0.0).unwrap().is_north());
    /// assert!(!GeographicPoint::create(-0.5, 3.0, 0.0).unwrap().is_north());
    /// ```
    pub fn is_north(&self) -> bool {
        self.latitude >= 0.
    }

    /// Projects the point to UTM, in its own zone or in `zone` when given.
    ///
    /// # Errors
    ///
    /// See [`UtmPoint::from_geographic`].
    pub fn to_utm<P: UtmProjection>(&self, projection: &P, zone: Option<i32>) -> Result<UtmPoint, Error> {
        UtmPoint::from_geographic(projection, self.latitude, self.longitude, zone)
    }
}

impl Display for GeographicPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        let lat = buf.format(self.latitude);
        let mut buf = ryu::Buffer::new();
        let lon = buf.format(self.longitude);
        let mut buf = ryu::Buffer::new();
        let height = buf.format(self.height);
        write!(
            f,
            "{lat} {lon} {height}",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert!(GeographicPoint::create(90., 180., 0.).is_ok());
        assert!(GeographicPoint::create(-90., -180., 0.).is_ok());
        assert!(GeographicPoint::create(90.000_001, 0., 0.).is_err());
        assert!(GeographicPoint::create(f64::NAN, 0., 0.).is_err());
    }

    #[test]
    fn negative_height_is_valid() {
        let point = GeographicPoint::create(31.5, 35.4, -430.).unwrap();
        assert_eq!(point.height(), -430.);
    }

    #[test]
    fn display_round_trips() {
        let point = GeographicPoint::create(36.509_736_111_111_11, 1.304_408_333_333_333_4, 59.595).unwrap();
        let text = point.to_string();
        let values = text.split(' ').map(|v| v.parse::<f64>().unwrap()).collect::<Vec<_>>();

        assert_eq!(values, [point.latitude(), point.longitude(), point.height()]);
        assert!(text.ends_with(" 59.595"));
    }
}
