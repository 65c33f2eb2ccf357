//! One-dimensional histogramming of event data.
//!
//! Linear edge arrays take a multiply-and-floor fast path; anything
//! else must be sorted ascending and goes through binary search. The
//! same kernel histograms a dense event list and, in
//! [`buckets::histogram`](crate::buckets::histogram), each bin of a
//! binned variable.

use crate::dim::Dim;
use crate::error::{Error, Result};
use crate::units::Unit;
use crate::variable::Variable;

/// A validated edge array with a precomputed lookup strategy.
pub(crate) struct EdgeSpec
{
    edges: Vec<f64>,
    /// `(offset, scale)` when the spacing is constant.
    linear: Option<(f64, f64)>,
    nbin: usize,
}

impl EdgeSpec
{
    pub fn from_variable(edges: &Variable) -> Result<(Dim, EdgeSpec)>
    {
        if edges.dims().ndim() != 1 {
            return Err(Error::Dimension(format!(
                "histogram edges must be one-dimensional, got {}",
                edges.dims()
            )));
        }
        let dim = edges.dims().at(0).0;
        let values: Vec<f64> = edges.array_view::<f64>()?.iter().copied().collect();
        Ok((dim, EdgeSpec::new(values)?))
    }

    pub fn new(edges: Vec<f64>) -> Result<EdgeSpec>
    {
        if edges.len() < 2 {
            return Err(Error::BinEdge(format!(
                "at least two bin edges are required, got {}",
                edges.len()
            )));
        }
        let nbin = edges.len() - 1;
        let step = edges[1] - edges[0];
        let is_linear =
            step > 0.0 && edges.windows(2).all(|pair| pair[1] - pair[0] == step);
        if is_linear {
            return Ok(EdgeSpec { linear: Some((edges[0], 1.0 / step)), edges, nbin });
        }
        if edges.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(Error::BinEdge("bin edges must be sorted ascending".into()));
        }
        Ok(EdgeSpec { edges, linear: None, nbin })
    }

    pub fn nbin(&self) -> usize
    {
        self.nbin
    }

    /// The bin holding `x`, under right-open `[left, right)` intervals.
    #[inline]
    pub fn bin_of(&self, x: f64) -> Option<usize>
    {
        match self.linear {
            Some((offset, scale)) => {
                let bin = ((x - offset) * scale).floor();
                (bin >= 0.0 && (bin as usize) < self.nbin).then(|| bin as usize)
            }
            None => {
                let upper = self.edges.partition_point(|&edge| edge <= x);
                (upper >= 1 && upper <= self.nbin).then(|| upper - 1)
            }
        }
    }
}

pub(crate) fn check_weight_unit(unit: Unit) -> Result<()>
{
    if unit.is_counts() || unit.is_dimensionless() {
        Ok(())
    } else {
        Err(Error::Unit(format!("histogram weights must be counts or dimensionless, got {}", unit)))
    }
}

pub(crate) fn check_coord_unit(coord: Unit, edges: Unit) -> Result<()>
{
    if coord == edges {
        Ok(())
    } else {
        Err(Error::UnitMismatch { left: edges, right: coord })
    }
}

/// Scatter one event list into the output bins. Without an explicit
/// weight list every event counts 1 with variance 1.
pub(crate) fn histogram_slices(
    spec: &EdgeSpec, coords: &[f64], weights: Option<(&[f64], Option<&[f64]>)>,
    values: &mut [f64], mut variances: Option<&mut [f64]>,
)
{
    debug_assert_eq!(values.len(), spec.nbin());
    for (event, &x) in coords.iter().enumerate() {
        let Some(bin) = spec.bin_of(x) else { continue };
        let (weight, weight_variance) = match weights {
            Some((weights, weight_variances)) => (
                weights[event],
                weight_variances.map(|variances| variances[event]).unwrap_or(0.0),
            ),
            None => (1.0, 1.0),
        };
        values[bin] += weight;
        if let Some(variances) = variances.as_deref_mut() {
            variances[bin] += weight_variance;
        }
    }
}

/// Histogram a dense event list.
///
/// `coords` holds the event coordinates and `weights` their weights,
/// over identical dimensions. The output spans the edge variable's
/// dimension with one fewer entry; its variances (present iff the
/// weights have variances) accumulate the weight variance per event.
pub fn histogram(coords: &Variable, weights: &Variable, edges: &Variable) -> Result<Variable>
{
    if coords.dims() != weights.dims() {
        return Err(Error::DimensionMismatch {
            expected: coords.dims().clone(),
            actual: weights.dims().clone(),
        });
    }
    check_weight_unit(weights.unit())?;
    check_coord_unit(coords.unit(), edges.unit())?;
    let (edge_dim, spec) = EdgeSpec::from_variable(edges)?;
    let coord_values: Vec<f64> = coords.array_view::<f64>()?.iter().copied().collect();
    let weight_values: Vec<f64> = weights.array_view::<f64>()?.iter().copied().collect();
    let weight_variances: Option<Vec<f64>> = weights
        .variance_view::<f64>()
        .ok()
        .map(|view| view.iter().copied().collect());
    let out_dims = edges.dims().slice_range(edge_dim, 0..spec.nbin())?;
    let mut values = vec![0.0; spec.nbin()];
    let mut variances = weights.has_variances().then(|| vec![0.0; spec.nbin()]);
    histogram_slices(
        &spec,
        &coord_values,
        Some((&weight_values, weight_variances.as_deref())),
        &mut values,
        variances.as_deref_mut(),
    );
    Ok(Variable::from_parts(out_dims, weights.unit(), values, variances))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::dimensions::Dimensions;

    fn events(values: Vec<f64>) -> Variable
    {
        let dims = Dimensions::from(&[(Dim::Event, values.len())][..]);
        Variable::new(dims, Unit::M, values).unwrap()
    }

    fn edges(values: Vec<f64>) -> Variable
    {
        let dims = Dimensions::from(&[(Dim::X, values.len())][..]);
        Variable::new(dims, Unit::M, values).unwrap()
    }

    #[test]
    fn nonlinear_edges_through_binary_search()
    {
        // Spacings 1, 1, 2: not linear, handled by upper_bound.
        let coords = events(vec![1.0, 2.0, 3.0, 4.0]);
        let weights = Variable::with_variances(
            coords.dims().clone(),
            Unit::COUNTS,
            vec![1.0, 2.0, 3.0, 4.0],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let hist = histogram(&coords, &weights, &edges(vec![0.0, 1.0, 2.0, 4.0])).unwrap();
        assert_eq!(hist.dims(), &Dimensions::from(&[(Dim::X, 3)][..]));
        assert_eq!(hist.values::<f64>().unwrap(), &[0.0, 1.0, 5.0]);
        assert_eq!(hist.variances::<f64>().unwrap(), &[0.0, 1.0, 5.0]);
        assert_eq!(hist.unit(), Unit::COUNTS);
    }

    #[test]
    fn linear_edges_fast_path()
    {
        let spec = EdgeSpec::new(vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(spec.bin_of(0.0), Some(0));
        assert_eq!(spec.bin_of(0.999), Some(0));
        assert_eq!(spec.bin_of(1.0), Some(1));
        assert_eq!(spec.bin_of(2.5), Some(2));
        // Right-open: the last edge is excluded.
        assert_eq!(spec.bin_of(3.0), None);
        assert_eq!(spec.bin_of(-0.1), None);
    }

    #[test]
    fn search_path_matches_linear_semantics()
    {
        let spec = EdgeSpec::new(vec![0.0, 1.0, 2.0, 4.0]).unwrap();
        assert_eq!(spec.bin_of(0.0), Some(0));
        assert_eq!(spec.bin_of(1.0), Some(1));
        assert_eq!(spec.bin_of(3.9), Some(2));
        assert_eq!(spec.bin_of(4.0), None);
        assert_eq!(spec.bin_of(-1.0), None);
    }

    #[test]
    fn unsorted_edges_rejected()
    {
        assert!(matches!(
            EdgeSpec::new(vec![0.0, 2.0, 1.0]),
            Err(Error::BinEdge(_))
        ));
        assert!(matches!(EdgeSpec::new(vec![0.0]), Err(Error::BinEdge(_))));
    }

    #[test]
    fn unit_preconditions()
    {
        let coords = events(vec![1.0]);
        let bad_weights =
            Variable::new(coords.dims().clone(), Unit::M, vec![1.0]).unwrap();
        assert!(matches!(
            histogram(&coords, &bad_weights, &edges(vec![0.0, 2.0])),
            Err(Error::Unit(_))
        ));
        let weights =
            Variable::new(coords.dims().clone(), Unit::COUNTS, vec![1.0]).unwrap();
        let wrong_edge_unit = edges(vec![0.0, 2.0]).with_unit(Unit::S);
        assert!(matches!(
            histogram(&coords, &weights, &wrong_edge_unit),
            Err(Error::UnitMismatch { .. })
        ));
    }

    #[test]
    fn conservation_of_in_range_events()
    {
        let coords = events(vec![-0.5, 0.1, 0.5, 1.5, 2.9, 3.0, 7.0]);
        let weights =
            Variable::new(coords.dims().clone(), Unit::COUNTS, vec![1.0; 7]).unwrap();
        let hist = histogram(&coords, &weights, &edges(vec![0.0, 1.0, 2.0, 3.0])).unwrap();
        // Exactly 0.1, 0.5, 1.5 and 2.9 fall inside [0, 3).
        let total: f64 = hist.values::<f64>().unwrap().iter().sum();
        assert_eq!(total, 4.0);
    }
}
