use ndvar::{concatenate, concatenate_data_arrays, DataArray, Dim, Dimensions, Error, Unit, Variable};

fn var_x(values: Vec<f64>, unit: Unit) -> Variable
{
    let dims = Dimensions::from(&[(Dim::X, values.len())][..]);
    Variable::new(dims, unit, values).unwrap()
}

#[test]
fn variables_concatenate_along_a_label()
{
    let joined = concatenate(
        &var_x(vec![1.0, 2.0], Unit::M),
        &var_x(vec![3.0, 4.0, 5.0], Unit::M),
        Dim::X,
    )
    .unwrap();
    assert_eq!(joined.dims(), &Dimensions::from(&[(Dim::X, 5)][..]));
    assert_eq!(joined.values::<f64>().unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn edge_coordinates_join_without_the_seam_duplicate()
{
    let left = DataArray::new(var_x(vec![10.0, 11.0], Unit::COUNTS))
        .with_coord(Dim::X, var_x(vec![0.0, 1.0, 2.0], Unit::M));
    let right = DataArray::new(var_x(vec![12.0, 13.0], Unit::COUNTS))
        .with_coord(Dim::X, var_x(vec![2.0, 3.0, 4.0], Unit::M));
    let joined = concatenate_data_arrays(&left, &right, Dim::X).unwrap();
    assert_eq!(
        joined.coord(Dim::X).unwrap().values::<f64>().unwrap(),
        &[0.0, 1.0, 2.0, 3.0, 4.0]
    );
    assert_eq!(joined.data().values::<f64>().unwrap(), &[10.0, 11.0, 12.0, 13.0]);
    assert!(joined.is_edge_coord(Dim::X));
}

#[test]
fn mismatched_edge_seam_is_a_bin_edge_error()
{
    let left = DataArray::new(var_x(vec![10.0, 11.0], Unit::COUNTS))
        .with_coord(Dim::X, var_x(vec![0.0, 1.0, 2.0], Unit::M));
    let right = DataArray::new(var_x(vec![12.0, 13.0], Unit::COUNTS))
        .with_coord(Dim::X, var_x(vec![2.5, 3.0, 4.0], Unit::M));
    assert!(matches!(
        concatenate_data_arrays(&left, &right, Dim::X),
        Err(Error::BinEdge(_))
    ));
}

#[test]
fn position_coordinates_concatenate_plainly()
{
    let left = DataArray::new(var_x(vec![10.0], Unit::COUNTS))
        .with_coord(Dim::X, var_x(vec![0.5], Unit::M));
    let right = DataArray::new(var_x(vec![11.0], Unit::COUNTS))
        .with_coord(Dim::X, var_x(vec![1.5], Unit::M));
    let joined = concatenate_data_arrays(&left, &right, Dim::X).unwrap();
    assert_eq!(joined.coord(Dim::X).unwrap().values::<f64>().unwrap(), &[0.5, 1.5]);
    assert!(!joined.is_edge_coord(Dim::X));
}

#[test]
fn off_dimension_coordinates_must_agree()
{
    let temperature = |t: f64| Variable::scalar(t).with_unit(Unit::K);
    let left = DataArray::new(var_x(vec![10.0], Unit::COUNTS))
        .with_coord(Dim::Temperature, temperature(4.2));
    let right = DataArray::new(var_x(vec![11.0], Unit::COUNTS))
        .with_coord(Dim::Temperature, temperature(4.2));
    let joined = concatenate_data_arrays(&left, &right, Dim::X).unwrap();
    assert_eq!(joined.coord(Dim::Temperature).unwrap(), &temperature(4.2));

    let colder = DataArray::new(var_x(vec![11.0], Unit::COUNTS))
        .with_coord(Dim::Temperature, temperature(1.5));
    assert!(matches!(
        concatenate_data_arrays(&left, &colder, Dim::X),
        Err(Error::Dimension(_))
    ));
}

#[test]
fn attributes_follow_the_left_operand()
{
    let mut left = DataArray::new(var_x(vec![1.0], Unit::COUNTS));
    left.set_attr("run", Variable::scalar(12i64));
    let mut right = DataArray::new(var_x(vec![2.0], Unit::COUNTS));
    right.set_attr("run", Variable::scalar(13i64));
    let joined = concatenate_data_arrays(&left, &right, Dim::X).unwrap();
    assert_eq!(joined.attrs()["run"], Variable::scalar(12i64));
}

#[test]
fn stacking_creates_an_outer_dimension()
{
    let a = var_x(vec![1.0, 2.0], Unit::M);
    let b = var_x(vec![3.0, 4.0], Unit::M);
    let stacked = concatenate(&a, &b, Dim::Row).unwrap();
    assert_eq!(stacked.dims(), &Dimensions::from(&[(Dim::Row, 2), (Dim::X, 2)][..]));
}
