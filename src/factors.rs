use tracing::trace;

use crate::{
    curvature::curvature_and_grid_factor,
    ellipsoid::EllipsoidParameters,
    geographic::GeographicPoint,
    height::height_scale_factor,
    projections::transverse_mercator::TransverseMercator,
    utm::{Hemisphere, UtmPoint, UtmProjection},
    Error,
};

/// Scale factors of one point, with the coordinates they were computed at.
///
/// `combined_scale_factor` is always the product of the grid and height
/// factors.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleFactors {
    pub(crate) position: GeographicPoint,
    pub(crate) utm: UtmPoint,
    pub(crate) mean_radius: f64,
    pub(crate) grid_scale_factor: f64,
    pub(crate) height_scale_factor: f64,
    pub(crate) combined_scale_factor: f64,
}

impl ScaleFactors {
    pub(crate) fn new(position: GeographicPoint, utm: UtmPoint, mean_radius: f64, grid_scale_factor: f64, height_scale_factor: f64) -> ScaleFactors {
        Self {
            position,
            utm,
            mean_radius,
            grid_scale_factor,
            height_scale_factor,
            combined_scale_factor: grid_scale_factor * height_scale_factor,
        }
    }

    /// Geographic position and height of the point.
    pub fn position(&self) -> &GeographicPoint {
        &self.position
    }

    /// UTM coordinates of the point.
    pub fn utm(&self) -> &UtmPoint {
        &self.utm
    }

    pub fn zone(&self) -> i32 {
        self.utm.zone
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.utm.hemisphere
    }

    pub fn easting(&self) -> f64 {
        self.utm.easting
    }

    pub fn northing(&self) -> f64 {
        self.utm.northing
    }

    pub fn latitude(&self) -> f64 {
        self.position.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }

    /// Ellipsoidal height the height factor was computed for.
    pub fn height(&self) -> f64 {
        self.position.height
    }

    /// Geometric mean radius of curvature used by both factors.
    pub fn mean_radius(&self) -> f64 {
        self.mean_radius
    }

    /// Ratio of a grid distance to the corresponding ellipsoid distance.
    pub fn grid_scale_factor(&self) -> f64 {
        self.grid_scale_factor
    }

    /// Ratio of an ellipsoid distance to the corresponding ground distance.
    pub fn height_scale_factor(&self) -> f64 {
        self.height_scale_factor
    }

    /// Ratio of a grid distance to the corresponding ground distance.
    pub fn combined_scale_factor(&self) -> f64 {
        self.combined_scale_factor
    }
}

/// Computes [`ScaleFactors`] for single points.
///
/// Holds the ellipsoid and the projection built from it; both are read only,
/// so one calculator can serve any number of points and threads.
#[derive(Clone, Debug)]
pub struct ScaleFactorCalculator<P = TransverseMercator> {
    projection: P,
}

impl ScaleFactorCalculator<TransverseMercator> {
    /// Calculator for WGS84 / UTM.
    pub fn wgs84() -> ScaleFactorCalculator<TransverseMercator> {
        ScaleFactorCalculator::with_ellipsoid(&EllipsoidParameters::WGS84)
    }

    /// Calculator for UTM on another ellipsoid.
    pub fn with_ellipsoid(ellipsoid: &EllipsoidParameters) -> ScaleFactorCalculator<TransverseMercator> {
        ScaleFactorCalculator::new(TransverseMercator::utm(ellipsoid))
    }
}

impl Default for ScaleFactorCalculator<TransverseMercator> {
    fn default() -> Self {
        ScaleFactorCalculator::wgs84()
    }
}

impl<P: UtmProjection> ScaleFactorCalculator<P> {
    /// Calculator on top of any [`UtmProjection`].
    pub fn new(projection: P) -> ScaleFactorCalculator<P> {
        Self { projection }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn ellipsoid(&self) -> &EllipsoidParameters {
        self.projection.ellipsoid()
    }

    /// Computes the scale factors of a WGS84 point in its own UTM zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] for an out of range latitude,
    /// longitude or a non-finite height, [`Error::Domain`] for a polar
    /// latitude or a height at or below the center of curvature.
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::{Hemisphere, ScaleFactorCalculator};
    ///
    /// let calculator = ScaleFactorCalculator::wgs84();
    /// let factors = calculator.compute(36.50973611, 1.30440833, 59.595).unwrap();
    ///
    /// assert_eq!(factors.zone(), 31);
    /// assert_eq!(factors.hemisphere(), Hemisphere::North);
    /// assert!((factors.grid_scale_factor() - 0.9998838).abs() < 1e-7);
    /// assert!((factors.height_scale_factor() - 0.9999906).abs() < 1e-7);
    /// assert_eq!(
    ///     factors.combined_scale_factor(),
    ///     factors.grid_scale_factor() * factors.height_scale_factor()
    /// );
    /// ```
    pub fn compute(&self, lat: f64, lon: f64, height: f64) -> Result<ScaleFactors, Error> {
        self.compute_point(&GeographicPoint::create(lat, lon, height)?)
    }

    /// Same as [`ScaleFactorCalculator::compute`] for a validated point.
    ///
    /// # Errors
    ///
    /// See [`ScaleFactorCalculator::compute`].
    pub fn compute_point(&self, point: &GeographicPoint) -> Result<ScaleFactors, Error> {
        self.compute_with_zone(point, None)
    }

    /// Computes the scale factors of a WGS84 point projected in `zone`
    /// instead of the zone containing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZone`] for a zone outside `[1, 60]`, otherwise
    /// see [`ScaleFactorCalculator::compute`].
    pub fn compute_in_zone(&self, lat: f64, lon: f64, height: f64, zone: i32) -> Result<ScaleFactors, Error> {
        self.compute_with_zone(&GeographicPoint::create(lat, lon, height)?, Some(zone))
    }

    /// Computes the scale factors of a point given in UTM coordinates.
    ///
    /// The point is converted to latitude/longitude for the radius of
    /// curvature, then projected again in its own zone.
    ///
    /// # Errors
    ///
    /// See [`ScaleFactorCalculator::compute`].
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::{Hemisphere, ScaleFactorCalculator, UtmPoint};
    ///
    /// let calculator = ScaleFactorCalculator::wgs84();
    /// let utm = UtmPoint::create(31, Hemisphere::North, 348163.320, 4041824.970).unwrap();
    ///
    /// let factors = calculator.compute_from_utm(&utm, 59.595).unwrap();
    ///
    /// assert!((factors.latitude() - 36.50973611).abs() < 1e-6);
    /// assert!((factors.longitude() - 1.30440833).abs() < 1e-6);
    /// assert!((factors.easting() - 348163.320).abs() < 1e-6);
    /// assert!((factors.combined_scale_factor() - 0.999874692048).abs() < 1e-6);
    /// ```
    pub fn compute_from_utm(&self, utm: &UtmPoint, height: f64) -> Result<ScaleFactors, Error> {
        let (lat, lon) = utm.to_geographic(&self.projection);

        self.compute_with_zone(&GeographicPoint::create(lat, lon, height)?, Some(utm.zone))
    }

    fn compute_with_zone(&self, point: &GeographicPoint, zone: Option<i32>) -> Result<ScaleFactors, Error> {
        let utm = point.to_utm(&self.projection, zone)?;
        let curvature = curvature_and_grid_factor(self.ellipsoid(), point.latitude, utm.easting)?;
        let hsf = height_scale_factor(point.height, curvature.mean)?;

        let factors = ScaleFactors::new(*point, utm, curvature.mean, curvature.grid_scale_factor, hsf);

        trace!(
            point = %point,
            utm = %utm,
            grid = factors.grid_scale_factor,
            height = factors.height_scale_factor,
            combined = factors.combined_scale_factor,
            "computed scale factors"
        );

        Ok(factors)
    }
}

/// Computes the scale factors of a WGS84 point with a WGS84 calculator.
///
/// Builds the projection on every call; keep a [`ScaleFactorCalculator`]
/// around when computing many points.
///
/// # Errors
///
/// See [`ScaleFactorCalculator::compute`].
pub fn compute_factors(lat: f64, lon: f64, height: f64) -> Result<ScaleFactors, Error> {
    ScaleFactorCalculator::wgs84().compute(lat, lon, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_point() {
        let factors = compute_factors(36.509_736_111, 1.304_408_333, 59.595).unwrap();

        assert_eq!(factors.zone(), 31);
        assert!((factors.easting() - 348_163.32).abs() < 1e-2);
        assert!((factors.northing() - 4_041_824.97).abs() < 1e-2);
        assert!((factors.combined_scale_factor() - 0.999_874_692_048).abs() < 1e-6);
    }

    #[test]
    fn combined_is_exact_product() {
        let calculator = ScaleFactorCalculator::wgs84();
        for (lat, lon, h) in [(-33.8688, 151.2093, 50.), (64.1, -21.9, 1200.), (0., 0., -25.)] {
            let f = calculator.compute(lat, lon, h).unwrap();
            assert_eq!(f.combined_scale_factor(), f.grid_scale_factor() * f.height_scale_factor());
        }
    }

    #[test]
    fn southern_point() {
        let f = ScaleFactorCalculator::wgs84().compute(-33.8688, 151.2093, 50.).unwrap();
        assert_eq!(f.zone(), 56);
        assert_eq!(f.hemisphere(), Hemisphere::South);
        assert!((f.northing() - 6_250_948.345).abs() < 1e-3);
        assert!((f.grid_scale_factor() - 0.999_937_911_6).abs() < 1e-9);
    }

    #[test]
    fn explicit_zone_is_used() {
        let calculator = ScaleFactorCalculator::wgs84();
        let own = calculator.compute(36.5, 1.3, 0.).unwrap();
        let west = calculator.compute_in_zone(36.5, 1.3, 0., 30).unwrap();

        assert_eq!(west.zone(), 30);
        assert!(west.easting() > 500_000.);
        // further from its central meridian, larger distortion
        assert!(west.grid_scale_factor() > own.grid_scale_factor());

        assert_eq!(calculator.compute_in_zone(36.5, 1.3, 0., 61).unwrap_err(), Error::InvalidZone(61));
    }

    #[test]
    fn invalid_inputs_are_reported() {
        let calculator = ScaleFactorCalculator::wgs84();
        assert!(matches!(calculator.compute(91., 0., 0.), Err(Error::InvalidCoord(_))));
        assert!(matches!(calculator.compute(0., 181., 0.), Err(Error::InvalidCoord(_))));
        assert!(matches!(calculator.compute(0., 0., f64::NAN), Err(Error::InvalidCoord(_))));
        assert!(matches!(calculator.compute(90., 0., 0.), Err(Error::Domain(_))));
        assert!(matches!(calculator.compute(0., 0., -7.0e6), Err(Error::Domain(_))));
    }

    #[test]
    fn utm_path_keeps_zone() {
        let calculator = ScaleFactorCalculator::wgs84();
        let utm = UtmPoint::create(56, Hemisphere::South, 334_368.634, 6_250_948.345).unwrap();
        let f = calculator.compute_from_utm(&utm, 50.).unwrap();

        assert_eq!(f.zone(), 56);
        assert_eq!(f.hemisphere(), Hemisphere::South);
        assert!((f.latitude() + 33.8688).abs() < 1e-6);
        assert!((f.northing() - 6_250_948.345).abs() < 1e-6);
    }
}
