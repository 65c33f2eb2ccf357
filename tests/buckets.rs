use ndvar::{buckets, DataArray, Dim, Dimensions, Error, IndexPair, Unit, Variable};

fn index_pairs(pairs: Vec<IndexPair>) -> Variable
{
    let dims = Dimensions::from(&[(Dim::Y, pairs.len())][..]);
    Variable::new(dims, Unit::DIMENSIONLESS, pairs).unwrap()
}

fn buffer(values: Vec<f64>, unit: Unit) -> Variable
{
    let dims = Dimensions::from(&[(Dim::Event, values.len())][..]);
    Variable::new(dims, unit, values).unwrap()
}

fn binned(values: Vec<f64>, splits: Vec<(i64, i64)>, unit: Unit) -> Variable
{
    let pairs = splits.into_iter().map(|(b, e)| IndexPair::new(b, e)).collect();
    Variable::make_bins(index_pairs(pairs), Dim::Event, buffer(values, unit)).unwrap()
}

#[test]
fn binned_sum()
{
    let v = binned(vec![1.0, 2.0, 3.0, 4.0], vec![(0, 2), (2, 4)], Unit::M);
    let sums = buckets::sum(&v).unwrap();
    assert_eq!(sums.values::<f64>().unwrap(), &[3.0, 7.0]);
}

#[test]
fn binned_concatenate_packs_per_bin()
{
    let a = binned(vec![1.0, 2.0, 3.0, 4.0], vec![(0, 2), (2, 4)], Unit::M);
    let b = &a * 3.0;
    let joined = buckets::concatenate(&a, &b).unwrap();
    assert_eq!(
        joined.bin_indices().unwrap().values::<IndexPair>().unwrap(),
        &[IndexPair::new(0, 4), IndexPair::new(4, 8)]
    );
    assert_eq!(
        joined.bin_buffer().unwrap().values::<f64>().unwrap(),
        &[1.0, 2.0, 3.0, 6.0, 3.0, 4.0, 9.0, 12.0]
    );
}

#[test]
fn binned_concatenate_broadcasts_the_smaller_operand()
{
    let a = binned(vec![1.0, 2.0, 3.0, 4.0], vec![(0, 2), (2, 4)], Unit::M);
    // A single bin without the outer dimension, broadcast over y.
    let single = Variable::make_bins(
        Variable::scalar(IndexPair::new(0, 1)),
        Dim::Event,
        buffer(vec![9.0], Unit::M),
    )
    .unwrap();
    let joined = buckets::concatenate(&a, &single).unwrap();
    assert_eq!(buckets::bin_sizes(&joined).unwrap().values::<i64>().unwrap(), &[3, 3]);
    assert_eq!(
        joined.bin_buffer().unwrap().values::<f64>().unwrap(),
        &[1.0, 2.0, 9.0, 3.0, 4.0, 9.0]
    );
}

#[test]
fn append_requires_exact_dimensions()
{
    let mut a = binned(vec![1.0, 2.0, 3.0, 4.0], vec![(0, 2), (2, 4)], Unit::M);
    let single = Variable::make_bins(
        Variable::scalar(IndexPair::new(0, 1)),
        Dim::Event,
        buffer(vec![9.0], Unit::M),
    )
    .unwrap();
    assert!(matches!(
        buckets::append(&mut a, &single),
        Err(Error::DimensionMismatch { .. })
    ));
    let b = binned(vec![5.0, 6.0], vec![(0, 1), (1, 2)], Unit::M);
    buckets::append(&mut a, &b).unwrap();
    assert_eq!(buckets::sum(&a).unwrap().values::<f64>().unwrap(), &[8.0, 13.0]);
}

#[test]
fn per_bin_histogram()
{
    let coords = binned(vec![0.5, 1.5, 0.5, 2.5], vec![(0, 2), (2, 4)], Unit::S);
    let edges = Variable::new(
        Dimensions::from(&[(Dim::Time, 4)][..]),
        Unit::S,
        vec![0.0, 1.0, 2.0, 3.0],
    )
    .unwrap();
    let hist = buckets::histogram(&coords, None, &edges).unwrap();
    assert_eq!(hist.dims(), &Dimensions::from(&[(Dim::Y, 2), (Dim::Time, 3)][..]));
    assert_eq!(hist.unit(), Unit::COUNTS);
    assert_eq!(hist.values::<f64>().unwrap(), &[1.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    // Unweighted events count with unit variance.
    assert_eq!(hist.variances::<f64>().unwrap(), hist.values::<f64>().unwrap());
}

#[test]
fn per_bin_histogram_with_weights()
{
    let coords = binned(vec![0.5, 1.5, 0.5, 2.5], vec![(0, 2), (2, 4)], Unit::S);
    let weights = Variable::make_bins(
        index_pairs(vec![IndexPair::new(0, 2), IndexPair::new(2, 4)]),
        Dim::Event,
        buffer(vec![2.0, 3.0, 4.0, 5.0], Unit::COUNTS),
    )
    .unwrap();
    let edges = Variable::new(
        Dimensions::from(&[(Dim::Time, 4)][..]),
        Unit::S,
        vec![0.0, 1.0, 2.0, 3.0],
    )
    .unwrap();
    let hist = buckets::histogram(&coords, Some(&weights), &edges).unwrap();
    assert_eq!(hist.values::<f64>().unwrap(), &[2.0, 3.0, 0.0, 4.0, 0.0, 5.0]);
    assert!(!hist.has_variances());
}

#[test]
fn map_looks_up_event_values()
{
    let coords = binned(vec![0.5, 1.5, 2.5, -1.0], vec![(0, 2), (2, 4)], Unit::S);
    let hist_data = Variable::new(
        Dimensions::from(&[(Dim::Time, 3)][..]),
        Unit::COUNTS,
        vec![10.0, 20.0, 30.0],
    )
    .unwrap();
    let hist_edges = Variable::new(
        Dimensions::from(&[(Dim::Time, 4)][..]),
        Unit::S,
        vec![0.0, 1.0, 2.0, 3.0],
    )
    .unwrap();
    let mask = Variable::new(
        Dimensions::from(&[(Dim::Time, 3)][..]),
        Unit::DIMENSIONLESS,
        vec![false, true, false],
    )
    .unwrap();
    let hist = DataArray::new(hist_data)
        .with_coord(Dim::Time, hist_edges)
        .with_mask("saturated", mask);
    let mapped = buckets::map(&hist, &coords).unwrap();
    let mapped_buffer = mapped.bin_buffer().unwrap();
    // 1.5 lands in the masked bin, -1.0 is out of range: both map to 0.
    assert_eq!(mapped_buffer.values::<f64>().unwrap(), &[10.0, 0.0, 30.0, 0.0]);
    assert_eq!(mapped_buffer.unit(), Unit::COUNTS);
    assert_eq!(mapped.dims(), coords.dims());
}

#[test]
fn binned_equality_is_by_content()
{
    let a = binned(vec![1.0, 2.0, 3.0, 4.0], vec![(0, 2), (2, 4)], Unit::M);
    // Same bin contents, different packing order in the buffer.
    let b = Variable::make_bins(
        index_pairs(vec![IndexPair::new(2, 4), IndexPair::new(0, 2)]),
        Dim::Event,
        buffer(vec![3.0, 4.0, 1.0, 2.0], Unit::M),
    )
    .unwrap();
    assert_eq!(a, b);
    let c = binned(vec![1.0, 2.0, 3.0, 5.0], vec![(0, 2), (2, 4)], Unit::M);
    assert_ne!(a, c);
}
