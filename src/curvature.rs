//! Radii of curvature and the UTM grid scale factor.

use crate::{constants::UTM_K0, ellipsoid::EllipsoidParameters, utm::offset_from_central_meridian, Error};

/// Local curvature of the ellipsoid at a latitude, with the point grid
/// scale factor derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curvature {
    pub(crate) meridian: f64,
    pub(crate) prime_vertical: f64,
    pub(crate) mean: f64,
    pub(crate) grid_scale_factor: f64,
}

impl Curvature {
    /// Radius of curvature in the meridian `M`, in meters.
    #[inline]
    pub fn meridian(&self) -> f64 {
        self.meridian
    }

    /// Radius of curvature in the prime vertical `N`, in meters.
    #[inline]
    pub fn prime_vertical(&self) -> f64 {
        self.prime_vertical
    }

    /// Geometric mean radius `sqrt(M N)`, in meters.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Grid scale factor at the easting the curvature was computed for.
    #[inline]
    pub fn grid_scale_factor(&self) -> f64 {
        self.grid_scale_factor
    }

    /// Grid scale factor at another easting, using the same mean radius.
    pub fn grid_scale_factor_at(&self, easting: f64) -> f64 {
        grid_scale_factor(easting, self.mean)
    }
}

/// Computes the radii of curvature at `lat` (degrees) and the UTM point scale
/// factor at `easting`.
///
/// The grid scale factor uses the second order approximation
/// `k = k0 (1 + dE² / 2R²)`, with `dE` the distance from the central
/// meridian and `R` the geometric mean radius. It is good to a part per
/// million across a zone.
///
/// # Errors
///
/// Returns [`Error::Domain`] if either input is not finite or the latitude
/// is a pole.
///
/// # Usage
///
/// ```
/// use geoscale::{curvature::curvature_and_grid_factor, EllipsoidParameters};
///
/// let wgs84 = EllipsoidParameters::WGS84;
///
/// // On the central meridian the factor is the central scale factor
/// let curvature = curvature_and_grid_factor(&wgs84, 36.5, 500_000.).unwrap();
/// assert_eq!(curvature.grid_scale_factor(), 0.9996);
///
/// let curvature = curvature_and_grid_factor(&wgs84, 36.509736, 348163.32).unwrap();
/// assert!((curvature.mean() - 6371851.4).abs() < 0.1);
/// assert!((curvature.grid_scale_factor() - 0.9998838).abs() < 1e-7);
///
/// assert!(curvature_and_grid_factor(&wgs84, 90., 500_000.).is_err());
/// ```
pub fn curvature_and_grid_factor(ellipsoid: &EllipsoidParameters, lat: f64, easting: f64) -> Result<Curvature, Error> {
    if !lat.is_finite() || lat.abs() >= 90. {
        return Err(Error::Domain(format!("Latitude {lat} has no usable radius of curvature")));
    }
    if !easting.is_finite() {
        return Err(Error::Domain(format!("Easting {easting} is not finite")));
    }

    let meridian = ellipsoid.meridian_radius(lat);
    let prime_vertical = ellipsoid.prime_vertical_radius(lat);
    let mean = (meridian * prime_vertical).sqrt();

    Ok(Curvature {
        meridian,
        prime_vertical,
        mean,
        grid_scale_factor: grid_scale_factor(easting, mean),
    })
}

/// UTM point scale factor at `easting` for a sphere of radius `mean_radius`.
pub fn grid_scale_factor(easting: f64, mean_radius: f64) -> f64 {
    let de = offset_from_central_meridian(easting);

    UTM_K0 * (1. + de.powi(2) / (2. * mean_radius.powi(2)))
}
