use crate::ThisOrThat;

#[allow(dead_code)]
pub(crate) mod dms {
    /// Degrees per quarter turn
    pub const QD: i32 = 90;
    /// Minutes per degree
    pub const DM: i32 = 60;
    /// Seconds per minute
    pub const MS: i32 = 60;
    /// Degrees per half turn
    pub const HD: i32 = 2 * QD;
    /// Degrees per turn
    pub const TD: i32 = 2 * HD;
    /// Seconds per degree
    pub const DS: i32 = DM * MS;
}

/// Error-free sum: returns `(s, t)` with `s = round(u + v)` and `t` the
/// rounding error.
fn special_sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;

    let up = up - u;
    let vpp = vpp - v;

    let t = s.is_zero().ternary_lazy(|| s, || -(up + vpp));

    (s, t)
}

/// Evaluate a polynomial, coefficients in decreasing powers of `x`
pub(crate) fn polyval(p: &[f64], x: f64) -> f64 {
    p
        .iter()
        .fold(0_f64, |acc, val| acc*x + val)
}

/// Sine and cosine of an angle in degrees. Multiples of 90° give exact
/// results, so points on the equator or on a central meridian stay exactly
/// on it.
pub(crate) fn sincosd(deg: f64) -> (f64, f64) {
    let q = (deg / f64::from(dms::QD)).round();
    let r = (deg - q * f64::from(dms::QD)).to_radians();
    let (s, c) = r.sin_cos();

    // Quadrant index in 0..4, valid for negative q as well
    #[allow(clippy::cast_possible_truncation)]
    let quadrant = (q as i64).rem_euclid(4);
    let (s, c) = match quadrant {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    };

    // Avoid -0.0 for the cosine
    (s, c + 0.)
}

pub(crate) trait GeoMath {
    fn is_zero(&self) -> bool;
    fn eps_eq(&self, other: Self) -> bool;
    fn ang_normalize(&self) -> Self;
    fn ang_diff(&self, other: Self) -> Self;
    fn eatanhe(&self, es: Self) -> Self;
    fn remainder(&self, denom: Self) -> Self;
    fn taupf(&self, es: Self) -> Self;
    fn tauf(&self, es: Self) -> Self;
}

impl GeoMath for f64 {
    fn is_zero(&self) -> bool {
        self.abs() < f64::EPSILON
    }

    fn eps_eq(&self, other: f64) -> bool {
        (*self - other).abs() < f64::EPSILON
    }

    /// Reduce an angle to `[-180, 180]`, keeping the sign of `±180`.
    fn ang_normalize(&self) -> f64 {
        let value = self.remainder(f64::from(dms::TD));
        let hd = f64::from(dms::HD);

        if value.abs().eps_eq(hd) {
            hd.copysign(*self)
        }
        else {
            value
        }
    }

    /// Exact difference `other - self`, reduced to `[-180, 180]`.
    fn ang_diff(&self, other: f64) -> f64 {
        let td = f64::from(dms::TD);
        let (diff, err) = special_sum((-*self).remainder(td), other % td);
        // The second sum only changes diff when |diff| < 128, so no further
        // reduction is needed afterwards.
        let (diff, err) = special_sum(diff.remainder(td), err);

        let hd = f64::from(dms::HD);
        // d = -180, 0 or 180: take the sign from the error term, or from
        // the raw difference when there is none
        if diff.is_zero() || diff.abs().eps_eq(hd) {
            let sign = if err.is_zero() { other - *self } else { -err };
            diff.copysign(sign)
        }
        else {
            diff
        }
    }

    fn eatanhe(&self, es: f64) -> f64 {
        if es.is_sign_positive() {
            es * (es * *self).atanh()
        } else {
            -es * (es * *self).atanh()
        }
    }

    fn remainder(&self, denom: Self) -> Self {
        *self - (*self / denom).round() * denom
    }

    /// Conformal latitude tangent from the geographic latitude tangent.
    fn taupf(&self, es: f64) -> f64 {
        let tau1 = 1.0_f64.hypot(*self);
        let sig = (*self / tau1).eatanhe(es).sinh();

        1.0_f64.hypot(sig) * *self - sig * tau1
    }

    /// Inverse of [`GeoMath::taupf`] by Newton iteration.
    #[allow(clippy::similar_names)]
    fn tauf(&self, es: f64) -> f64 {
        let numit = 5;
        let tol = f64::EPSILON.sqrt() / 10.0;

        let e2m = 1.0 - es.powi(2);
        let mut tau = if self.abs() > 70.0 {
            self * 1_f64.eatanhe(es).exp()
        } else {
            self / e2m
        };

        let stol = tol * self.abs().max(1.0);
        for _ in 0..numit {
            let taupa = tau.taupf(es);
            let dtau = (self - taupa) * (1.0 + e2m * tau.powi(2))
                / (e2m * 1.0_f64.hypot(tau) * 1.0_f64.hypot(taupa));
            tau += dtau;
            if dtau.abs() < stol {
                break;
            }
        }
        tau
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sincosd_is_exact_on_quadrants() {
        assert_eq!(sincosd(0.), (0., 1.));
        assert_eq!(sincosd(90.), (1., 0.));
        assert_eq!(sincosd(-90.), (-1., 0.));
        assert_eq!(sincosd(180.), (0., -1.));
    }

    #[test]
    fn sincosd_matches_std() {
        for deg in [-179.5, -45.0, 1.3044, 36.5097, 89.9, 135.0] {
            let (s, c) = sincosd(deg);
            let (es, ec) = f64::to_radians(deg).sin_cos();
            assert!((s - es).abs() < 1e-14, "{deg}");
            assert!((c - ec).abs() < 1e-14, "{deg}");
        }
    }

    #[test]
    fn ang_diff_wraps_across_antimeridian() {
        assert!((177_f64.ang_diff(-179.9) - 3.1).abs() < 1e-12);
        assert!(((-177_f64).ang_diff(179.9) + 3.1).abs() < 1e-12);
        assert!((3_f64.ang_diff(1.3) + 1.7).abs() < 1e-12);
    }

    #[test]
    fn ang_normalize_keeps_range() {
        assert!((190_f64.ang_normalize() + 170.).abs() < 1e-12);
        assert!(((-190_f64).ang_normalize() - 170.).abs() < 1e-12);
        assert_eq!(180_f64.ang_normalize(), 180.);
        assert_eq!((-180_f64).ang_normalize(), -180.);
    }

    #[test]
    fn tauf_inverts_taupf() {
        let es = (crate::constants::WGS84_F * (2. - crate::constants::WGS84_F)).sqrt();
        for tau in [-3.0, -0.5, 0.0, 0.25, 1.0, 5.0] {
            let taup = f64::taupf(&tau, es);
            assert!((taup.tauf(es) - tau).abs() < 1e-12);
        }
    }

    #[test]
    fn polyval_horner() {
        // 2x^2 + 3x + 4 at x = 2
        assert_eq!(polyval(&[2., 3., 4.], 2.), 18.);
    }
}
