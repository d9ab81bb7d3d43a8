#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::module_name_repetitions
)]

//! Scale factors for survey points on the WGS84 ellipsoid and the UTM grid.
//!
//! For a point given either as latitude/longitude or as UTM coordinates, the
//! crate computes the grid scale factor (projection distortion), the height
//! scale factor (reduction from ground to ellipsoid) and their product, the
//! combined scale factor, which converts a ground distance to a grid
//! distance.
//!
//! ```
//! use geoscale::{angle::{to_decimal_degrees, Direction}, ScaleFactorCalculator};
//!
//! let lat = to_decimal_degrees(36., 30., 35.05, Direction::North);
//! let lon = to_decimal_degrees(1., 18., 15.87, Direction::East);
//!
//! let factors = ScaleFactorCalculator::wgs84().compute(lat, lon, 59.595).unwrap();
//!
//! assert_eq!(factors.zone(), 31);
//! assert!((factors.combined_scale_factor() - 0.999874692048).abs() < 1e-6);
//! ```

use thiserror::Error;

pub mod angle;
pub mod batch;
pub mod curvature;
pub mod ellipsoid;
pub mod factors;
pub mod geographic;
pub mod height;
pub mod utm;

pub mod projections {
    pub mod transverse_mercator;
}

pub(crate) mod constants;
pub(crate) mod utility;

pub use batch::{BatchOutcome, BatchRecord, BatchReport, BatchRunner, FieldValue, OutputRow, Progress, ProgressSink};
pub use ellipsoid::EllipsoidParameters;
pub use factors::{compute_factors, ScaleFactorCalculator, ScaleFactors};
pub use geographic::GeographicPoint;
pub use projections::transverse_mercator::TransverseMercator;
pub use utm::{Hemisphere, UtmPoint, UtmProjection};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("Coordinate parameters are not valid: {0}")]
    InvalidCoord(String),
    #[error("UTM zone {0} is outside the range [1, 60]")]
    InvalidZone(i32),
    #[error("Hemisphere is not valid: {0:?} (expected N or S)")]
    InvalidHemisphere(String),
    #[error("UTM coords are invalid: {0}")]
    InvalidUtmCoords(String),
    #[error("Field {field} is not a number: {value:?}")]
    InvalidField {
        field: &'static str,
        value: String,
    },
    #[error("Field {0} is empty")]
    MissingField(&'static str),
    #[error("Outside of the computation domain: {0}")]
    Domain(String),
}

impl Error {
    /// Whether the error comes from a malformed or out-of-range input value,
    /// as opposed to a valid input the computation cannot handle.
    pub fn is_input_error(&self) -> bool {
        !self.is_domain_error()
    }

    /// Whether the error is a domain error: a degenerate radius, a polar
    /// latitude or a zone the projection cannot be defined for.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Error::Domain(_) | Error::InvalidZone(_))
    }
}

trait ThisOrThat {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T;
    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T;
}

impl ThisOrThat for bool {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T {
        if *self { r#true } else { r#false }
    }

    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T,
    {
        if *self { r#true() } else { r#false() }
    }
}
