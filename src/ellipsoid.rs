//! Reference ellipsoid definition.

use crate::{constants::{WGS84_A, WGS84_F}, utility::sincosd};

/// Defining parameters of a reference ellipsoid. Built once and passed by
/// reference to every computation that needs it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipsoidParameters {
    pub(crate) a: f64,
    pub(crate) f: f64,
    pub(crate) e2: f64,
}

impl EllipsoidParameters {
    /// The WGS84 ellipsoid.
    pub const WGS84: EllipsoidParameters = EllipsoidParameters {
        a: WGS84_A,
        f: WGS84_F,
        e2: WGS84_F * (2. - WGS84_F),
    };

    /// Builds an ellipsoid from its semi-major axis (meters) and flattening.
    /// The first eccentricity squared is derived as `2f - f²`.
    pub fn new(a: f64, f: f64) -> EllipsoidParameters {
        Self {
            a,
            f,
            e2: f * (2. - f),
        }
    }

    /// Semi-major axis in meters.
    #[inline]
    pub fn semi_major_axis(&self) -> f64 {
        self.a
    }

    #[inline]
    pub fn flattening(&self) -> f64 {
        self.f
    }

    /// First eccentricity squared.
    #[inline]
    pub fn eccentricity_squared(&self) -> f64 {
        self.e2
    }

    /// Third flattening `n = f / (2 - f)`, the expansion parameter of the
    /// Transverse Mercator series.
    #[inline]
    pub fn third_flattening(&self) -> f64 {
        self.f / (2. - self.f)
    }

    // 1 - e² sin²φ
    fn w2(&self, lat: f64) -> f64 {
        let (sin_lat, _) = sincosd(lat);
        1. - self.e2 * sin_lat.powi(2)
    }

    /// Radius of curvature in the prime vertical at `lat` (degrees).
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::EllipsoidParameters;
    ///
    /// let wgs84 = EllipsoidParameters::WGS84;
    /// // Equal to the semi-major axis on the equator
    /// assert!((wgs84.prime_vertical_radius(0.) - 6_378_137.).abs() < 1e-6);
    /// ```
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.a / self.w2(lat).sqrt()
    }

    /// Radius of curvature in the meridian at `lat` (degrees).
    pub fn meridian_radius(&self, lat: f64) -> f64 {
        self.a * (1. - self.e2) / self.w2(lat).powf(1.5)
    }
}

impl Default for EllipsoidParameters {
    fn default() -> Self {
        EllipsoidParameters::WGS84
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgs84_derived_values() {
        let wgs84 = EllipsoidParameters::WGS84;
        assert!((wgs84.eccentricity_squared() - 0.006_694_379_990_14).abs() < 1e-14);
        assert!((wgs84.third_flattening() - 0.001_679_220_386_38).abs() < 1e-14);
    }

    #[test]
    fn radii_at_pole_are_equal() {
        let wgs84 = EllipsoidParameters::WGS84;
        let m = wgs84.meridian_radius(90.);
        let n = wgs84.prime_vertical_radius(90.);
        assert!((m - n).abs() < 1e-6);
        // a² / b
        assert!((n - 6_399_593.625_8).abs() < 1e-3);
    }

    #[test]
    fn meridian_radius_on_equator() {
        let wgs84 = EllipsoidParameters::WGS84;
        // a (1 - e²)
        assert!((wgs84.meridian_radius(0.) - 6_335_439.327_1).abs() < 1e-3);
    }
}
