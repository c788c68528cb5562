use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Direct-cell parameters as they appear in structure files.
///
/// Lengths are in Angstroms and angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Unit-cell geometry and the fractional/cartesian coordinate transform.
///
/// The direct basis is stored as a matrix whose rows are the cartesian `a`, `b`
/// and `c` vectors in the standard orientation: `c` along the z axis and `b` in
/// the yz plane. A fractional vector `f` maps to cartesian `Bᵀ·f`.
///
/// A degenerate cell (a zero edge length, or edges that do not span space) is a
/// caller error. Construction never panics; the derived matrices then contain
/// NaN and every conversion yields NaN components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CellParameters", into = "CellParameters")]
pub struct Lattice {
    params: CellParameters,
    base: Matrix3<f64>,
    recbase: Matrix3<f64>,
    metric: Matrix3<f64>,
    volume: f64,
}

impl Lattice {
    /// Creates a lattice from direct-cell parameters.
    ///
    /// # Arguments
    ///
    /// * `a`, `b`, `c` - Edge lengths.
    /// * `alpha`, `beta`, `gamma` - Cell angles in degrees.
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let mut lattice = Self {
            params: CellParameters {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
            },
            base: Matrix3::identity(),
            recbase: Matrix3::identity(),
            metric: Matrix3::identity(),
            volume: 1.0,
        };
        lattice.set_parameters(a, b, c, alpha, beta, gamma);
        lattice
    }

    /// Replaces the cell parameters and recomputes every derived quantity.
    pub fn set_parameters(&mut self, a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) {
        let (ca, cb, cg) = (cosd(alpha), cosd(beta), cosd(gamma));
        let (sa, sb) = (sind(alpha), sind(beta));

        let v_unit = (1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg).sqrt();
        // Negated cosine of the reciprocal gamma angle.
        let ncgr = (cg - ca * cb) / (sa * sb);
        let sgr = (1.0 - ncgr * ncgr).sqrt();

        let base = Matrix3::new(
            a * sb * sgr,
            a * sb * ncgr,
            a * cb,
            0.0,
            b * sa,
            b * ca,
            0.0,
            0.0,
            c,
        );

        self.params = CellParameters {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        };
        self.recbase = base
            .try_inverse()
            .unwrap_or_else(|| Matrix3::from_element(f64::NAN));
        self.metric = base * base.transpose();
        self.volume = a * b * c * v_unit;
        self.base = base;
    }

    /// Returns the cell parameters as `(a, b, c, alpha, beta, gamma)`.
    pub fn abc_abg(&self) -> (f64, f64, f64, f64, f64, f64) {
        let p = &self.params;
        (p.a, p.b, p.c, p.alpha, p.beta, p.gamma)
    }

    pub fn parameters(&self) -> CellParameters {
        self.params
    }

    /// Rows are the cartesian components of the `a`, `b` and `c` edge vectors.
    pub fn base(&self) -> &Matrix3<f64> {
        &self.base
    }

    /// Inverse of [`Lattice::base`]; its columns are the reciprocal vectors.
    pub fn recbase(&self) -> &Matrix3<f64> {
        &self.recbase
    }

    /// Metric tensor `G = B·Bᵀ` of the direct cell.
    pub fn metric(&self) -> &Matrix3<f64> {
        &self.metric
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Converts fractional coordinates to cartesian coordinates.
    pub fn to_cartesian(&self, fractional: &Vector3<f64>) -> Vector3<f64> {
        self.base.transpose() * fractional
    }

    /// Converts cartesian coordinates to fractional coordinates.
    pub fn to_fractional(&self, cartesian: &Vector3<f64>) -> Vector3<f64> {
        self.recbase.transpose() * cartesian
    }

    /// Returns the reciprocal cell as `(a*, b*, c*, alpha*, beta*, gamma*)`.
    ///
    /// Reciprocal lengths carry no factor of 2π.
    pub fn reciprocal_parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let rec_metric = self.recbase.transpose() * self.recbase;
        let ar = rec_metric[(0, 0)].sqrt();
        let br = rec_metric[(1, 1)].sqrt();
        let cr = rec_metric[(2, 2)].sqrt();
        let alphar = acosd(rec_metric[(1, 2)] / (br * cr));
        let betar = acosd(rec_metric[(0, 2)] / (ar * cr));
        let gammar = acosd(rec_metric[(0, 1)] / (ar * br));
        (ar, br, cr, alphar, betar, gammar)
    }

    /// Scalar product of two vectors given in fractional coordinates.
    pub fn dot(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
        u.dot(&(self.metric * v))
    }

    /// Euclidean length of a vector given in fractional coordinates.
    pub fn norm(&self, u: &Vector3<f64>) -> f64 {
        self.dot(u, u).sqrt()
    }

    /// Distance between two points given in fractional coordinates.
    pub fn distance(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
        self.norm(&(u - v))
    }

    /// Angle in degrees between two vectors given in fractional coordinates.
    pub fn angle(&self, u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
        acosd(self.dot(u, v) / (self.norm(u) * self.norm(v)))
    }
}

impl Default for Lattice {
    /// The orthonormal unit cell, used when a structure defines no cell.
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 90.0, 90.0, 90.0)
    }
}

impl From<CellParameters> for Lattice {
    fn from(p: CellParameters) -> Self {
        Self::new(p.a, p.b, p.c, p.alpha, p.beta, p.gamma)
    }
}

impl From<Lattice> for CellParameters {
    fn from(lattice: Lattice) -> Self {
        lattice.params
    }
}

// Exact for multiples of 90 degrees so that orthogonal cells stay exactly diagonal.
fn cosd(degrees: f64) -> f64 {
    if degrees % 90.0 == 0.0 {
        match (degrees / 90.0).rem_euclid(4.0) as u8 {
            0 => 1.0,
            1 | 3 => 0.0,
            _ => -1.0,
        }
    } else {
        degrees.to_radians().cos()
    }
}

fn sind(degrees: f64) -> f64 {
    cosd(90.0 - degrees)
}

fn acosd(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn assert_vec_close(actual: &Vector3<f64>, expected: &Vector3<f64>, tol: f64) {
        assert!(
            (actual - expected).norm() < tol,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn default_lattice_is_orthonormal_unit_cell() {
        let lattice = Lattice::default();
        assert_eq!(lattice.abc_abg(), (1.0, 1.0, 1.0, 90.0, 90.0, 90.0));
        assert_eq!(*lattice.base(), Matrix3::identity());
        assert_eq!(*lattice.recbase(), Matrix3::identity());
        assert_eq!(lattice.volume(), 1.0);
    }

    #[test]
    fn unit_cell_conversion_is_identity() {
        let lattice = Lattice::default();
        let v = Vector3::new(0.25, -1.5, 3.0);
        assert_eq!(lattice.to_cartesian(&v), v);
        assert_eq!(lattice.to_fractional(&v), v);
    }

    #[test]
    fn orthorhombic_cell_scales_each_axis() {
        let lattice = Lattice::new(2.0, 3.0, 4.0, 90.0, 90.0, 90.0);
        let cart = lattice.to_cartesian(&Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(cart, Vector3::new(1.0, 1.5, 2.0));
        assert!((lattice.volume() - 24.0).abs() < TOLERANCE);
    }

    #[test]
    fn conversions_are_mutual_inverses_for_triclinic_cell() {
        let lattice = Lattice::new(5.1, 6.3, 7.7, 81.0, 97.5, 112.25);
        for v in [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.1, 0.2, 0.3),
            Vector3::new(-1.25, 2.5, 0.75),
            Vector3::new(10.0, -3.0, 4.5),
        ] {
            let back = lattice.to_fractional(&lattice.to_cartesian(&v));
            assert_vec_close(&back, &v, 1e-10);
        }
    }

    #[test]
    fn base_vectors_have_the_cell_lengths_and_angles() {
        let lattice = Lattice::new(5.1, 6.3, 7.7, 81.0, 97.5, 112.25);
        let a = lattice.to_cartesian(&Vector3::x());
        let b = lattice.to_cartesian(&Vector3::y());
        let c = lattice.to_cartesian(&Vector3::z());
        assert!((a.norm() - 5.1).abs() < 1e-10);
        assert!((b.norm() - 6.3).abs() < 1e-10);
        assert!((c.norm() - 7.7).abs() < 1e-10);
        assert!((b.angle(&c).to_degrees() - 81.0).abs() < 1e-8);
        assert!((a.angle(&c).to_degrees() - 97.5).abs() < 1e-8);
        assert!((a.angle(&b).to_degrees() - 112.25).abs() < 1e-8);
        // c lies along z
        assert!(c.x.abs() < TOLERANCE && c.y.abs() < TOLERANCE);
    }

    #[test]
    fn metric_operations_agree_with_cartesian_geometry() {
        let lattice = Lattice::new(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let u = Vector3::new(1.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 1.0, 0.0);
        assert!((lattice.norm(&u) - 3.0).abs() < 1e-10);
        assert!((lattice.angle(&u, &v) - 120.0).abs() < 1e-8);
        assert!((lattice.distance(&u, &v) - 3.0 * 3f64.sqrt()).abs() < 1e-10);
        let cart_dot = lattice.to_cartesian(&u).dot(&lattice.to_cartesian(&v));
        assert!((lattice.dot(&u, &v) - cart_dot).abs() < 1e-10);
    }

    #[test]
    fn reciprocal_parameters_of_cubic_cell() {
        let lattice = Lattice::new(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let (ar, br, cr, alphar, betar, gammar) = lattice.reciprocal_parameters();
        assert!((ar - 0.25).abs() < TOLERANCE);
        assert!((br - 0.25).abs() < TOLERANCE);
        assert!((cr - 0.25).abs() < TOLERANCE);
        assert!((alphar - 90.0).abs() < 1e-10);
        assert!((betar - 90.0).abs() < 1e-10);
        assert!((gammar - 90.0).abs() < 1e-10);
    }

    #[test]
    fn reciprocal_gamma_of_hexagonal_cell_is_sixty_degrees() {
        let lattice = Lattice::new(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let (_, _, _, _, _, gammar) = lattice.reciprocal_parameters();
        assert!((gammar - 60.0).abs() < 1e-8);
    }

    #[test]
    fn set_parameters_recomputes_derived_values() {
        let mut lattice = Lattice::default();
        lattice.set_parameters(2.0, 2.0, 2.0, 90.0, 90.0, 90.0);
        assert_eq!(lattice.abc_abg(), (2.0, 2.0, 2.0, 90.0, 90.0, 90.0));
        assert!((lattice.volume() - 8.0).abs() < TOLERANCE);
        let frac = lattice.to_fractional(&Vector3::new(1.0, 1.0, 1.0));
        assert_vec_close(&frac, &Vector3::new(0.5, 0.5, 0.5), TOLERANCE);
    }

    #[test]
    fn degenerate_cell_yields_nan_instead_of_panicking() {
        let lattice = Lattice::new(0.0, 1.0, 1.0, 90.0, 90.0, 90.0);
        let frac = lattice.to_fractional(&Vector3::new(1.0, 1.0, 1.0));
        assert!(frac.iter().any(|x| x.is_nan()));
    }

    #[test]
    fn converts_to_and_from_cell_parameters() {
        let lattice = Lattice::new(3.52, 3.52, 3.52, 90.0, 90.0, 90.0);
        let params: CellParameters = lattice.clone().into();
        assert_eq!(Lattice::from(params), lattice);
    }

    #[test]
    fn serializes_as_cell_parameters_and_rebuilds_matrices() {
        let lattice = Lattice::new(4.0, 5.0, 6.0, 80.0, 95.0, 100.0);
        let text = toml::to_string(&lattice).unwrap();
        assert!(text.contains("gamma = 100.0"));
        assert!(!text.contains("metric"));

        let again: Lattice = toml::from_str(&text).unwrap();
        assert_eq!(again, lattice);
    }
}
