//! Sample generation.
//!
//! Unit-hypercube samples are drawn by rule, optionally mirrored into
//! antithetic variates, and mapped through the inverse transform of the
//! target distribution.

pub mod sequences;

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use ns_core::{Distribution, Error, Result};

use crate::approximation::InverseConfig;
use crate::dependencies::require_independent_dims;
use crate::evaluation::evaluate_inverse;
use crate::quadrature::combine::MAX_COMBINED_CELLS;

/// Rule for generating unit-hypercube samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingRule {
    /// Pseudo-random (`"R"`)
    #[default]
    Random,
    /// Latin hypercube (`"L"`)
    LatinHypercube,
    /// Halton sequence (`"H"`)
    Halton,
    /// Hammersley set (`"M"`)
    Hammersley,
    /// Korobov lattice (`"K"`)
    Korobov,
    /// Chebyshev tensor grid (`"C"`)
    Chebyshev,
    /// Regular tensor grid (`"RG"`)
    RegularGrid,
}

impl SamplingRule {
    /// Short identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            SamplingRule::Random => "R",
            SamplingRule::LatinHypercube => "L",
            SamplingRule::Halton => "H",
            SamplingRule::Hammersley => "M",
            SamplingRule::Korobov => "K",
            SamplingRule::Chebyshev => "C",
            SamplingRule::RegularGrid => "RG",
        }
    }
}

impl fmt::Display for SamplingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" | "RANDOM" => Ok(SamplingRule::Random),
            "L" | "LATIN_HYPERCUBE" => Ok(SamplingRule::LatinHypercube),
            "H" | "HALTON" => Ok(SamplingRule::Halton),
            "M" | "HAMMERSLEY" => Ok(SamplingRule::Hammersley),
            "K" | "KOROBOV" => Ok(SamplingRule::Korobov),
            "C" | "CHEBYSHEV" => Ok(SamplingRule::Chebyshev),
            "RG" | "GRID" | "REGULAR_GRID" => Ok(SamplingRule::RegularGrid),
            other => Err(Error::Validation(format!("unknown sampling rule: {}", other))),
        }
    }
}

/// Sampling configuration.
#[derive(Debug, Clone, Default)]
pub struct SampleConfig {
    /// Unit-hypercube rule.
    pub rule: SamplingRule,
    /// Axes to mirror (`u -> 1 - u`). An empty vector mirrors every axis;
    /// a short vector is padded with `false`.
    pub antithetic: Option<Vec<bool>>,
    /// Seed for the random rules. `None` draws from the OS.
    pub seed: Option<u64>,
}

/// `count` samples from the unit hypercube, shape `(dim, count)`.
pub fn unit_samples(count: usize, dim: usize, config: &SampleConfig) -> Result<DMatrix<f64>> {
    Ok(match config.rule {
        SamplingRule::Random => sequences::random(count, dim, config.seed),
        SamplingRule::LatinHypercube => sequences::latin_hypercube(count, dim, config.seed),
        SamplingRule::Halton => sequences::halton(count, dim),
        SamplingRule::Hammersley => sequences::hammersley(count, dim),
        SamplingRule::Korobov => sequences::korobov(count, dim, sequences::KOROBOV_BASE),
        SamplingRule::Chebyshev => sequences::chebyshev(count, dim)?,
        SamplingRule::RegularGrid => sequences::regular_grid(count, dim)?,
    })
}

/// Indices of the mirrored axes. An empty `axes` selects every axis.
fn mirrored_axes(axes: &[bool], dim: usize) -> Result<Vec<usize>> {
    if axes.len() > dim {
        return Err(Error::Validation(format!(
            "antithetic axes has {} entries for {} dimensions",
            axes.len(),
            dim
        )));
    }
    Ok(if axes.is_empty() {
        (0..dim).collect()
    } else {
        axes.iter().enumerate().filter(|&(_, &m)| m).map(|(i, _)| i).collect()
    })
}

/// First `columns` columns of the mirror blocks of `samples`.
///
/// Column `c` is sample `c % n` of block `c / n`; bit `b` of the block index
/// mirrors axis `mirrored[b]`.
fn mirror_columns(samples: &DMatrix<f64>, mirrored: &[usize], columns: usize) -> DMatrix<f64> {
    let (dim, n) = samples.shape();
    let mut out = DMatrix::zeros(dim, columns);
    for c in 0..columns {
        let (block, j) = (c / n, c % n);
        for i in 0..dim {
            out[(i, c)] = samples[(i, j)];
        }
        for (bit, &axis) in mirrored.iter().enumerate().take(usize::BITS as usize) {
            if (block >> bit) & 1 == 1 {
                out[(axis, c)] = 1.0 - samples[(axis, j)];
            }
        }
    }
    out
}

/// Every mirror combination of `samples` over the selected `axes`.
///
/// The output holds `2^m` blocks of `samples.ncols()` columns (`m` = number
/// of mirrored axes); block 0 is the input itself. Fails with
/// `ResourceExhausted` past [`MAX_COMBINED_CELLS`].
pub fn antithetic_variates(samples: &DMatrix<f64>, axes: &[bool]) -> Result<DMatrix<f64>> {
    let (dim, n) = samples.shape();
    let mirrored = mirrored_axes(axes, dim)?;
    let columns = u32::try_from(mirrored.len())
        .ok()
        .and_then(|m| 1u128.checked_shl(m))
        .and_then(|blocks| blocks.checked_mul(n as u128))
        .filter(|&cols| cols.saturating_mul(dim as u128) <= MAX_COMBINED_CELLS);
    let Some(columns) = columns else {
        return Err(Error::ResourceExhausted(format!(
            "mirroring {} of {} axes over {} samples exceeds {} cells",
            mirrored.len(),
            dim,
            n,
            MAX_COMBINED_CELLS
        )));
    };
    Ok(mirror_columns(samples, &mirrored, columns as usize))
}

/// `count` samples of `dist`, shape `(dim, count)`.
///
/// Multivariate distributions must have independent components. With
/// antithetic axes, `ceil(count / 2^m)` base samples are drawn and only the
/// first `count` mirror columns are built.
pub fn generate<D: Distribution + ?Sized>(count: usize, dist: &D, config: &SampleConfig) -> Result<DMatrix<f64>> {
    require_independent_dims(dist, "sampling")?;
    let dim = dist.dim();
    let unit = match &config.antithetic {
        None => unit_samples(count, dim, config)?,
        Some(axes) => {
            let mirrored = mirrored_axes(axes, dim)?;
            let blocks = u32::try_from(mirrored.len()).ok().and_then(|m| 1usize.checked_shl(m));
            let base_count = blocks.map_or(1, |b| count.div_ceil(b)).min(count);
            let base = unit_samples(base_count, dim, config)?;
            mirror_columns(&base, &mirrored, count)
        }
    };
    evaluate_inverse(dist, &unit, &InverseConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Joint;
    use crate::normal::Normal;
    use crate::transforms::Affine;
    use crate::uniform::Uniform;
    use std::sync::Arc;

    #[test]
    fn test_rule_names_round_trip() {
        for rule in [
            SamplingRule::Random,
            SamplingRule::LatinHypercube,
            SamplingRule::Halton,
            SamplingRule::Hammersley,
            SamplingRule::Korobov,
            SamplingRule::Chebyshev,
            SamplingRule::RegularGrid,
        ] {
            assert_eq!(rule.as_str().parse::<SamplingRule>().unwrap(), rule);
        }
        assert_eq!("halton".parse::<SamplingRule>().unwrap(), SamplingRule::Halton);
        assert!("X".parse::<SamplingRule>().is_err());
    }

    #[test]
    fn test_antithetic_blocks() {
        let s = DMatrix::from_row_slice(2, 1, &[0.2, 0.3]);
        let out = antithetic_variates(&s, &[]).unwrap();
        assert_eq!(out.shape(), (2, 4));
        assert_eq!(out.column(0).as_slice(), &[0.2, 0.3]);
        assert!((out[(0, 1)] - 0.8).abs() < 1e-15 && out[(1, 1)] == 0.3);
        assert!((out[(1, 3)] - 0.7).abs() < 1e-15);

        let only_second = antithetic_variates(&s, &[false, true]).unwrap();
        assert_eq!(only_second.shape(), (2, 2));
        assert_eq!(only_second[(0, 1)], 0.2);
    }

    #[test]
    fn test_generate_shape_and_support() {
        let n = Normal::new(1.0, 0.5).unwrap();
        let cfg = SampleConfig { rule: SamplingRule::Halton, ..SampleConfig::default() };
        let x = generate(100, &n, &cfg).unwrap();
        assert_eq!(x.shape(), (1, 100));
        let mean = x.sum() / 100.0;
        assert!((mean - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_antithetic_sampling_is_symmetric() {
        let u = Uniform::standard();
        let cfg = SampleConfig { antithetic: Some(Vec::new()), seed: Some(3), ..SampleConfig::default() };
        let x = generate(10, &u, &cfg).unwrap();
        assert_eq!(x.shape(), (1, 10));
        assert!((x.sum() / 10.0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_antithetic_over_many_axes() {
        let j = Joint::iid(64, || Ok(Arc::new(Uniform::standard()) as Arc<dyn Distribution>)).unwrap();
        let cfg = SampleConfig { antithetic: Some(Vec::new()), seed: Some(5), ..SampleConfig::default() };
        let x = generate(4, &j, &cfg).unwrap();
        assert_eq!(x.shape(), (64, 4));
        // one base sample, mirrored on the first two axes
        assert!((x[(0, 0)] + x[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((x[(1, 0)] + x[(1, 2)] - 1.0).abs() < 1e-12);
        assert_eq!(x[(5, 0)], x[(5, 3)]);

        let s = DMatrix::from_element(40, 2, 0.25);
        assert!(matches!(antithetic_variates(&s, &[]), Err(Error::ResourceExhausted(_))));
        let s = DMatrix::from_element(130, 1, 0.25);
        assert!(matches!(antithetic_variates(&s, &[]), Err(Error::ResourceExhausted(_))));
    }

    #[test]
    fn test_dependent_joint_cannot_be_sampled() {
        let u: Arc<dyn Distribution> = Arc::new(Uniform::standard());
        let v: Arc<dyn Distribution> = Arc::new(Affine::new(u.clone(), 1.0, 1.0).unwrap());
        let j = Joint::new(vec![u, v]).unwrap();
        assert!(matches!(generate(4, &j, &SampleConfig::default()), Err(Error::Dependency(_))));
    }
}
