//! Height (elevation) scale factor.

use crate::Error;

/// Reduction factor from a ground distance at `height` above the ellipsoid
/// to the same distance on the ellipsoid, `R / (R + h)`.
///
/// `height` is an ellipsoidal height in meters; points below the ellipsoid
/// give a factor above 1. `mean_radius` is the local radius of curvature,
/// usually [`Curvature::mean`](crate::curvature::Curvature::mean).
///
/// # Errors
///
/// Returns [`Error::Domain`] if an input is not finite or `R + h` is not
/// positive.
///
/// # Usage
///
/// ```
/// use geoscale::height::height_scale_factor;
///
/// assert_eq!(height_scale_factor(0., 6371000.).unwrap(), 1.);
/// assert!(height_scale_factor(1000., 6371000.).unwrap() < 1.);
/// assert!(height_scale_factor(-400., 6371000.).unwrap() > 1.);
/// assert!(height_scale_factor(-6371000., 6371000.).is_err());
/// ```
pub fn height_scale_factor(height: f64, mean_radius: f64) -> Result<f64, Error> {
    if !height.is_finite() || !mean_radius.is_finite() {
        return Err(Error::Domain(format!("Height {height} or radius {mean_radius} is not finite")));
    }

    let denom = mean_radius + height;
    if denom <= 0. {
        return Err(Error::Domain(format!("Height {height} puts the point at or below the center of curvature (R = {mean_radius})")));
    }

    Ok(mean_radius / denom)
}
