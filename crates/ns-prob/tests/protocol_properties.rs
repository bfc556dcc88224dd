//! End-to-end properties of the evaluation protocol and the quadrature
//! built on top of it.

use std::sync::Arc;

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use ns_core::{Distribution, Error};
use ns_prob::approximation::approximate_moment;
use ns_prob::distributions;
use ns_prob::quadrature::clenshaw_curtis::clenshaw_curtis_rule;
use ns_prob::quadrature::fejer::fejer_rule;
use ns_prob::quadrature::stieltjes::recurrence_coefficients;
use ns_prob::{
    Affine, Beta, DistributionExt, Exponential, Gamma, Joint, Kumaraswamy, LejaConfig, LogNormal,
    MomentConfig, Normal, QuadratureConfig, QuadratureKind, RecurrenceAlgorithm, RecurrenceConfig,
    SamplingRule, Uniform, Weibull, combine, generate_quadrature, leja_quadrature,
};

fn zoo() -> Vec<Arc<dyn Distribution>> {
    vec![
        Arc::new(Uniform::new(-1.0, 3.0).unwrap()),
        Arc::new(Normal::new(0.5, 2.0).unwrap()),
        Arc::new(Exponential::new(1.5).unwrap()),
        Arc::new(Gamma::new(2.5, 0.5).unwrap()),
        Arc::new(Beta::new(2.0, 3.0).unwrap()),
        Arc::new(LogNormal::new(0.0, 0.25).unwrap()),
        Arc::new(Weibull::new(1.5, 2.0).unwrap()),
        Arc::new(Kumaraswamy::new(2.0, 3.0).unwrap()),
    ]
}

#[test]
fn test_combine_cross_join() {
    let a = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
    let b = DMatrix::from_row_slice(2, 2, &[4.0, 4.0, 5.0, 6.0]);
    let out = combine(&[a, b]).unwrap();
    let expected =
        DMatrix::from_row_slice(4, 3, &[1.0, 4.0, 4.0, 1.0, 5.0, 6.0, 2.0, 4.0, 4.0, 2.0, 5.0, 6.0]);
    assert_eq!(out, expected);
}

#[test]
fn test_cdf_of_dependent_pair_is_an_error() {
    let x = distributions::normal(0.0, 1.0).unwrap();
    let y = distributions::affine(&x, 1.0, 2.0).unwrap();
    let j = distributions::joint(&[x, y]).unwrap();
    let at = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
    assert!(matches!(j.cdf(&at), Err(Error::Dependency(_))));
}

#[test]
fn test_zeroth_moment_is_one() {
    let k = DMatrix::from_element(1, 1, 0u32);
    for d in zoo() {
        assert_eq!(d.mom(&k).unwrap()[0], 1.0, "{}", d);
    }
}

#[test]
fn test_density_integrates_to_one() {
    for d in zoo() {
        let (lo, up) = d.range().unwrap();
        let (x, w) = fejer_rule(400, lo[0], up[0]);
        let pdf = d.pdf(&DMatrix::from_row_slice(1, x.len(), &x)).unwrap();
        let mass: f64 = w.iter().zip(pdf.iter()).map(|(wi, f)| wi * f).sum();
        assert_relative_eq!(mass, 1.0, epsilon = 1e-4);
    }

    let b = Beta::new(2.0, 3.0).unwrap();
    let (x, w) = clenshaw_curtis_rule(16, 0.0, 1.0);
    let pdf = b.pdf(&DMatrix::from_row_slice(1, x.len(), &x)).unwrap();
    let mass: f64 = w.iter().zip(pdf.iter()).map(|(wi, f)| wi * f).sum();
    assert_relative_eq!(mass, 1.0, epsilon = 1e-12);
}

#[test]
fn test_monte_carlo_moment_converges() {
    let n = Normal::new(1.0, 2.0).unwrap();
    let exact = n.mom(&DMatrix::from_element(1, 1, 2u32)).unwrap()[0];
    let error = |samples: usize| {
        let cfg = MomentConfig { samples, rule: SamplingRule::Halton, ..MomentConfig::default() };
        (approximate_moment(&n, &[2], &cfg).unwrap() - exact).abs()
    };
    let coarse = error(100);
    let fine = error(10_000);
    assert!(fine < coarse, "coarse {} fine {}", coarse, fine);
    assert!(fine < 0.01);
}

#[test]
fn test_discretized_recurrence_reproduces_hermite() {
    let n = Normal::standard();
    let cfg = RecurrenceConfig { accuracy: 300, ..RecurrenceConfig::default() };
    let exact = recurrence_coefficients(&n, 5, RecurrenceAlgorithm::Analytical, &cfg).unwrap();
    let approx = recurrence_coefficients(&n, 5, RecurrenceAlgorithm::Stieltjes, &cfg).unwrap();
    for k in 0..=5 {
        assert_relative_eq!(approx.alpha[k], exact.alpha[k], epsilon = 1e-8);
        assert_relative_eq!(approx.beta[k], exact.beta[k], epsilon = 1e-8);
    }
}

#[test]
fn test_leja_uniform_simpson() {
    let u = Uniform::new(0.0, 1.0).unwrap();
    let rule = leja_quadrature(&[2], &u, &LejaConfig::default()).unwrap();
    let x = rule.nodes();
    for (got, want) in x.iter().zip([0.0, 0.5, 1.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-3);
    }
    for (got, want) in rule.weights.iter().zip([0.167, 0.667, 0.167]) {
        assert_relative_eq!(*got, want, epsilon = 1e-3);
    }
}

#[test]
fn test_leja_nodes_within_bounds() {
    for d in [
        Arc::new(Gamma::new(2.0, 1.0).unwrap()) as Arc<dyn Distribution>,
        Arc::new(Beta::new(2.0, 2.0).unwrap()),
        Arc::new(Kumaraswamy::new(2.0, 2.0).unwrap()),
    ] {
        let (lo, up) = d.range().unwrap();
        let rule = leja_quadrature(&[4], d.as_ref(), &LejaConfig::default()).unwrap();
        let x = rule.nodes();
        assert_eq!(x.len(), 5, "{}", d);
        assert!(x.windows(2).all(|p| p[0] < p[1]), "{}: {:?}", d, x);
        assert!(x.iter().all(|v| *v >= lo[0] && *v <= up[0]));
        assert_relative_eq!(rule.total_weight(), 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_leja_lognormal_is_interpolatory() {
    let d = LogNormal::new(0.0, 1.0).unwrap();
    let rule = leja_quadrature(&[4], &d, &LejaConfig::default()).unwrap();
    assert_eq!(rule.len(), 5);
    assert_relative_eq!(rule.total_weight(), 1.0, max_relative = 1e-6);
    // E[X^k] = exp(k^2 / 2)
    assert_relative_eq!(rule.integrate(|x| x[0]), 0.5f64.exp(), max_relative = 1e-5);
    assert_relative_eq!(rule.integrate(|x| x[0] * x[0]), 2f64.exp(), max_relative = 1e-5);
}

#[test]
fn test_leja_on_a_shifted_joint() {
    let u = distributions::uniform(0.0, 1.0).unwrap();
    let v = distributions::normal(0.0, 1.0).unwrap();
    let shifted: Arc<dyn Distribution> = Arc::new(Affine::new(u, 1.0, 2.0).unwrap());
    let j = Joint::new(vec![shifted, v]).unwrap();
    let rule = leja_quadrature(&[1], &j, &LejaConfig::default()).unwrap();
    assert_eq!(rule.abscissas.shape(), (2, 4));
    // E[X] = 2 for X = 1 + 2U
    assert_relative_eq!(rule.integrate(|x| x[0]), 2.0, epsilon = 1e-8);
}

#[test]
fn test_gaussian_rule_exactness() {
    let g = Gamma::new(3.0, 1.0).unwrap();
    let cfg = QuadratureConfig { rule: QuadratureKind::Gaussian, ..QuadratureConfig::default() };
    let rule = generate_quadrature(&[3], &g, &cfg).unwrap();
    // E[X^7] = 3 * 4 * ... * 9
    let exact: f64 = (3..=9).map(f64::from).product();
    assert_relative_eq!(rule.integrate(|x| x[0].powi(7)), exact, max_relative = 1e-9);
}

#[test]
fn test_display() {
    let n: Arc<dyn Distribution> = Arc::new(Normal::new(1.5, 2.0).unwrap());
    assert_eq!(n.to_string(), "Normal(mu=1.5, sigma=2)");
    let u = Uniform::standard();
    assert_eq!((&u as &dyn Distribution).to_string(), "Uniform(lower=0, upper=1)");
}
