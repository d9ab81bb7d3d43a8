use std::f64::consts::PI;

use num::Complex;

use crate::{
    constants::{UTM_FALSE_EASTING, UTM_K0},
    ellipsoid::EllipsoidParameters,
    utility::{dms, polyval, sincosd, GeoMath},
    utm::{central_meridian, Hemisphere, UtmProjection},
    ThisOrThat,
};

// ================================
// Transverse Mercator Constants
// ================================

// Krüger series to 6th order in the third flattening n
const B1_COEFF: [f64; 5] = [
    // b1*(n+1), polynomial in n2 of order 3
    1., 4., 64., 256., 256.,
];  // count = 5

#[allow(clippy::unreadable_literal)]
const ALP_COEFF: [f64; 27] = [
    // alp[1]/n^1, polynomial in n of order 5
    31564., -66675., 34440., 47250., -100800., 75600., 151200.,
    // alp[2]/n^2, polynomial in n of order 4
    -1983433., 863232., 748608., -1161216., 524160., 1935360.,
    // alp[3]/n^3, polynomial in n of order 3
    670412., 406647., -533952., 184464., 725760.,
    // alp[4]/n^4, polynomial in n of order 2
    6601661., -7732800., 2230245., 7257600.,
    // alp[5]/n^5, polynomial in n of order 1
    -13675556., 3438171., 7983360.,
    // alp[6]/n^6, polynomial in n of order 0
    212378941., 319334400.,
];  // count = 27

#[allow(clippy::unreadable_literal)]
const BET_COEFF: [f64; 27] = [
    // bet[1]/n^1, polynomial in n of order 5
    384796., -382725., -6720., 932400., -1612800., 1209600., 2419200.,
    // bet[2]/n^2, polynomial in n of order 4
    -1118711., 1695744., -1174656., 258048., 80640., 3870720.,
    // bet[3]/n^3, polynomial in n of order 3
    22276., -16929., -15984., 12852., 362880.,
    // bet[4]/n^4, polynomial in n of order 2
    -830251., -158400., 197865., 7257600.,
    // bet[5]/n^5, polynomial in n of order 1
    -435388., 453717., 15966720.,
    // bet[6]/n^6, polynomial in n of order 0
    20648693., 638668800.,
];  // count = 27

const MAXPOW: usize = 6;
const M: usize = MAXPOW / 2;

/// Transverse Mercator projection using the Krüger series, accurate to a
/// few nanometers within 3900 km of the central meridian.
///
/// The series coefficients are computed once per ellipsoid, so build one
/// projection and reuse it for every point.
#[derive(Clone, Debug)]
pub struct TransverseMercator {
    ellipsoid: EllipsoidParameters,
    k0: f64,
    es: f64,
    a1: f64,
    alp: [f64; MAXPOW + 1],
    bet: [f64; MAXPOW + 1],
}

impl TransverseMercator {
    /// Projection with the UTM central scale factor on `ellipsoid`.
    pub fn utm(ellipsoid: &EllipsoidParameters) -> TransverseMercator {
        TransverseMercator::new(ellipsoid, UTM_K0)
    }

    /// UTM projection on the WGS84 ellipsoid.
    pub fn wgs84() -> TransverseMercator {
        TransverseMercator::utm(&EllipsoidParameters::WGS84)
    }

    /// Projection with central scale factor `k0` on `ellipsoid`.
    pub fn new(ellipsoid: &EllipsoidParameters, k0: f64) -> TransverseMercator {
        let f = ellipsoid.flattening();
        let n = ellipsoid.third_flattening();
        let e2 = ellipsoid.eccentricity_squared();

        let es = (f < 0.).ternary(-1., 1.) * e2.abs().sqrt();

        let b1 = polyval(&B1_COEFF[0..=M], n.powi(2)) / (B1_COEFF[M + 1] * (1. + n));
        // a1 is the equivalent radius for computing the circumference of
        // ellipse.
        let a1 = b1 * ellipsoid.semi_major_axis();

        let mut alp = [0_f64; MAXPOW + 1];
        let mut bet = [0_f64; MAXPOW + 1];

        let mut o = 0;
        let mut d = n;

        for l in 1..=MAXPOW {
            let m = MAXPOW - l;
            alp[l] = d * polyval(&ALP_COEFF[o..=o+m], n) / ALP_COEFF[o + m + 1];
            bet[l] = d * polyval(&BET_COEFF[o..=o+m], n) / BET_COEFF[o + m + 1];
            o += m + 2;
            d *= n;
        }

        Self {
            ellipsoid: *ellipsoid,
            k0,
            es,
            a1,
            alp,
            bet,
        }
    }

    /// Central scale factor.
    #[inline]
    pub fn k0(&self) -> f64 {
        self.k0
    }

    /// Projects `lat`/`lon` relative to the central meridian `lon0`. Returns
    /// `(x, y)` in meters without any false origin.
    #[allow(clippy::similar_names, clippy::many_single_char_names)]
    pub fn from_latlon(&self, lon0: f64, lat: f64, lon: f64) -> (f64, f64) {
        let mut lat_sign = lat.is_sign_negative().ternary(-1., 1.);
        let mut lon = lon0.ang_diff(lon);
        let lon_sign = lon.is_sign_negative().ternary(-1., 1.);

        lon *= lon_sign;
        let lat = lat * lat_sign;

        let backside = lon > f64::from(dms::QD);
        if backside {
            if lat.is_zero() {
                lat_sign = -1.;
            }
            lon = f64::from(dms::HD) - lon;
        }

        let (sphi, cphi) = sincosd(lat);
        let (slam, clam) = sincosd(lon);

        let (xip, etap) = if lat.eps_eq(f64::from(dms::QD)) {
            (PI / 2., 0.)
        } else {
            let tau = sphi / cphi;
            let taup = tau.taupf(self.es);

            (taup.atan2(clam), (slam / taup.hypot(clam)).asinh())
        };

        let c0 = (2. * xip).cos();
        let ch0 = (2. * etap).cosh();
        let s0 = (2. * xip).sin();
        let sh0 = (2. * etap).sinh();

        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;

        let mut y0 = Complex::new((n % 2 == 1).ternary(self.alp[n], 0.), 0.);
        let mut y1 = Complex::new(0., 0.);

        if n % 2 == 1 {
            n -= 1;
        }

        while n > 0 {
            y1 = a * y0 - y1 + self.alp[n];
            n -= 1;

            y0 = a * y1 - y0 + self.alp[n];
            n -= 1;
        }

        // Ignoring k and gamma
        let a = Complex::new(s0 * ch0, c0 * sh0);
        let y1 = Complex::new(xip, etap) + a * y0;

        let xi = y1.re;
        let eta = y1.im;

        let y = self.a1 * self.k0 * backside.ternary(PI - xi, xi) * lat_sign;
        let x = self.a1 * self.k0 * eta * lon_sign;

        (x, y)
    }

    /// Inverse of [`TransverseMercator::from_latlon`]. Returns `(lat, lon)`
    /// in degrees.
    #[allow(clippy::similar_names, clippy::many_single_char_names)]
    pub fn to_latlon(&self, lon0: f64, x: f64, y: f64) -> (f64, f64) {
        let mut xi = y / (self.a1 * self.k0);
        let mut eta = x / (self.a1 * self.k0);

        let xi_sign = (!xi.is_sign_positive()).ternary(-1., 1.);
        let eta_sign = (!eta.is_sign_positive()).ternary(-1., 1.);

        xi *= xi_sign;
        eta *= eta_sign;

        let backside = xi > PI/2.;
        if backside {
            xi = PI - xi;
        }

        let c0 = (2. * xi).cos();
        let ch0 = (2. * eta).cosh();
        let s0 = (2. * xi).sin();
        let sh0 = (2. * eta).sinh();

        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;

        let mut y0 = Complex::new((n % 2 == 1).ternary(-self.bet[n], 0.), 0.);
        let mut y1 = Complex::new(0., 0.);

        if n % 2 == 1 {
            n -= 1;
        }

        while n > 0 {
            y1 = a * y0 - y1 - self.bet[n];
            n -= 1;

            y0 = a * y1 - y0 - self.bet[n];
            n -= 1;
        }

        // Ignoring k and gamma
        let a = Complex::new(s0 * ch0, c0 * sh0);
        let y1 = Complex::new(xi, eta) + a * y0;

        let xip = y1.re;
        let etap = y1.im;
        let s = etap.sinh();
        let c = 0_f64.max(xip.cos());
        let r = s.hypot(c);

        let (mut lat, mut lon) = if r.is_zero() {
            (f64::from(dms::QD), 0.)
        } else {
            let lon = s.atan2(c).to_degrees();
            let sxip = xip.sin();
            let tau = (sxip / r).tauf(self.es);

            (tau.atan().to_degrees(), lon)
        };

        lat *= xi_sign;
        if backside {
            lon = f64::from(dms::HD) - lon;
        }
        lon *= eta_sign;
        lon = (lon + lon0).ang_normalize();

        (lat, lon)
    }
}

impl UtmProjection for TransverseMercator {
    fn ellipsoid(&self) -> &EllipsoidParameters {
        &self.ellipsoid
    }

    fn forward(&self, zone: i32, hemisphere: Hemisphere, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = self.from_latlon(central_meridian(zone), lat, lon);

        (x + UTM_FALSE_EASTING, y + hemisphere.false_northing())
    }

    fn inverse(&self, zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64) -> (f64, f64) {
        let x = easting - UTM_FALSE_EASTING;
        let y = northing - hemisphere.false_northing();

        self.to_latlon(central_meridian(zone), x, y)
    }
}

impl Default for TransverseMercator {
    fn default() -> Self {
        TransverseMercator::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_meridian_maps_to_false_easting() {
        let tm = TransverseMercator::wgs84();
        let (easting, northing) = tm.forward(31, Hemisphere::North, 0., 3.);
        assert!((easting - 500_000.).abs() < 1e-9);
        assert!(northing.abs() < 1e-9);
    }

    #[test]
    fn reference_point_new_york() {
        let tm = TransverseMercator::wgs84();
        let (easting, northing) = tm.forward(18, Hemisphere::North, 40.748_333, -73.985_278);
        assert!((easting - 585_664.121).abs() < 1e-3);
        assert!((northing - 4_511_315.422).abs() < 1e-3);
    }

    #[test]
    fn southern_hemisphere_uses_false_northing() {
        let tm = TransverseMercator::wgs84();
        let (easting, northing) = tm.forward(56, Hemisphere::South, -33.8688, 151.2093);
        assert!((easting - 334_368.634).abs() < 1e-3);
        assert!((northing - 6_250_948.345).abs() < 1e-3);

        let (lat, lon) = tm.inverse(56, Hemisphere::South, easting, northing);
        assert!((lat + 33.8688).abs() < 1e-9);
        assert!((lon - 151.2093).abs() < 1e-9);
    }

    #[test]
    fn symmetric_about_central_meridian() {
        let tm = TransverseMercator::wgs84();
        let (xe, ye) = tm.from_latlon(3., 45., 4.5);
        let (xw, yw) = tm.from_latlon(3., 45., 1.5);
        assert!((xe + xw).abs() < 1e-9);
        assert!((ye - yw).abs() < 1e-9);
    }

    #[test]
    fn inverse_of_origin_is_central_meridian() {
        let tm = TransverseMercator::wgs84();
        let (lat, lon) = tm.to_latlon(-177., 0., 0.);
        assert!(lat.abs() < 1e-12);
        assert!((lon + 177.).abs() < 1e-12);
    }

    #[test]
    fn pole_projects_on_meridian() {
        let tm = TransverseMercator::wgs84();
        let (x, y) = tm.from_latlon(3., 90., 10.);
        assert!(x.abs() < 1e-6);
        let (lat, _) = tm.to_latlon(3., x, y);
        assert!((lat - 90.).abs() < 1e-9);
    }
}
