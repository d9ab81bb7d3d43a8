// Semi-major axis a
pub(crate) const WGS84_A: f64 = 6_378_137.;
// Flattening
#[allow(clippy::unreadable_literal)]
pub(crate) const WGS84_F: f64 = 1.0 / 298.257223563;

// UTM central scale factor
pub(crate) const UTM_K0: f64 = 9996.0 / 10_000.;
// Offset applied to every easting so the central meridian sits at 500 km
pub(crate) const UTM_FALSE_EASTING: f64 = 500_000.;
// Offset applied to southern hemisphere northings
pub(crate) const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.;
