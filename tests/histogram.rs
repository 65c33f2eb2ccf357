use ndvar::{histogram, Dim, Dimensions, Error, Unit, Variable};

fn events(values: Vec<f64>) -> Variable
{
    let dims = Dimensions::from(&[(Dim::Event, values.len())][..]);
    Variable::new(dims, Unit::S, values).unwrap()
}

fn weights(values: Vec<f64>, variances: Vec<f64>) -> Variable
{
    let dims = Dimensions::from(&[(Dim::Event, values.len())][..]);
    Variable::with_variances(dims, Unit::COUNTS, values, variances).unwrap()
}

fn edges(values: Vec<f64>) -> Variable
{
    let dims = Dimensions::from(&[(Dim::Time, values.len())][..]);
    Variable::new(dims, Unit::S, values).unwrap()
}

#[test]
fn weighted_histogram_with_irregular_edges()
{
    // Spacings 1, 1, 2 force the binary-search path.
    let hist = histogram(
        &events(vec![1.0, 2.0, 3.0, 4.0]),
        &weights(vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]),
        &edges(vec![0.0, 1.0, 2.0, 4.0]),
    )
    .unwrap();
    assert_eq!(hist.dims(), &Dimensions::from(&[(Dim::Time, 3)][..]));
    assert_eq!(hist.values::<f64>().unwrap(), &[0.0, 1.0, 5.0]);
    assert_eq!(hist.variances::<f64>().unwrap(), &[0.0, 1.0, 5.0]);
    assert_eq!(hist.unit(), Unit::COUNTS);
}

#[test]
fn linear_histogram_conserves_in_range_events()
{
    let coords = vec![0.5, 1.5, 1.7, 2.5, 3.9, 4.0, -1.0, 10.0];
    let n_in_range =
        coords.iter().filter(|&&x| (0.0..4.0).contains(&x)).count() as f64;
    let hist = histogram(
        &events(coords.clone()),
        &weights(vec![1.0; coords.len()], vec![1.0; coords.len()]),
        &edges(vec![0.0, 1.0, 2.0, 3.0, 4.0]),
    )
    .unwrap();
    let total: f64 = hist.values::<f64>().unwrap().iter().sum();
    assert_eq!(total, n_in_range);
    // Unit weights with unit variances: per-bin variance equals the count.
    assert_eq!(hist.values::<f64>().unwrap(), hist.variances::<f64>().unwrap());
}

#[test]
fn histogram_without_weight_variances_has_none()
{
    let dims = Dimensions::from(&[(Dim::Event, 2)][..]);
    let plain_weights = Variable::new(dims, Unit::COUNTS, vec![1.0, 1.0]).unwrap();
    let hist = histogram(
        &events(vec![0.5, 1.5]),
        &plain_weights,
        &edges(vec![0.0, 1.0, 2.0]),
    )
    .unwrap();
    assert!(!hist.has_variances());
    assert_eq!(hist.values::<f64>().unwrap(), &[1.0, 1.0]);
}

#[test]
fn histogram_preconditions()
{
    let coords = events(vec![1.0]);
    let w = weights(vec![1.0], vec![1.0]);
    // Descending edges.
    assert!(matches!(
        histogram(&coords, &w, &edges(vec![2.0, 1.0, 0.0])),
        Err(Error::BinEdge(_))
    ));
    // Edge unit must match the event coordinate unit.
    let wrong_unit = edges(vec![0.0, 1.0]).with_unit(Unit::M);
    assert!(matches!(
        histogram(&coords, &w, &wrong_unit),
        Err(Error::UnitMismatch { .. })
    ));
    // Weights must be counts or dimensionless.
    let dims = Dimensions::from(&[(Dim::Event, 1)][..]);
    let metres = Variable::new(dims, Unit::M, vec![1.0]).unwrap();
    assert!(matches!(
        histogram(&coords, &metres, &edges(vec![0.0, 1.0])),
        Err(Error::Unit(_))
    ));
}
