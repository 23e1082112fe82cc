/// The logistic sigmoid, the only activation a network uses.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sigmoid;

impl Sigmoid {
    /// `1 / (1 + e^-z)`, kept strictly inside `(0, 1)` where f64 would round to a bound.
    pub fn f(z: f64) -> f64 {
        (1. / (1. + (-z).exp())).clamp(f64::EPSILON, 1. - f64::EPSILON)
    }

    /// The derivative expressed through an already activated value `a = f(z)`.
    pub fn df_from_output(a: f64) -> f64 {
        a * (1. - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_one_half() {
        assert_eq!(Sigmoid::f(0.), 0.5);
        assert_eq!(Sigmoid::df_from_output(0.5), 0.25);
    }

    #[test]
    fn output_stays_inside_open_unit_interval() {
        for z in [-800., -40., -30., -5., -0.1, 0.1, 5., 30., 40., 800.] {
            let a = Sigmoid::f(z);
            assert!(a > 0. && a < 1., "sigmoid({z}) = {a}");
        }
    }

    #[test]
    fn saturated_units_keep_a_gradient() {
        assert!(Sigmoid::df_from_output(Sigmoid::f(1e4)) > 0.);
        assert!(Sigmoid::df_from_output(Sigmoid::f(-1e4)) > 0.);
    }

    #[test]
    fn derivative_matches_closed_form() {
        for z in [-2.0_f64, -0.5, 0.0, 1.5] {
            let expected = (-z).exp() / (1. + (-z).exp()).powi(2);
            assert!((Sigmoid::df_from_output(Sigmoid::f(z)) - expected).abs() < 1e-12);
        }
    }
}
