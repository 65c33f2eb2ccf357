use ndvar::{Dim, Dimensions, Error, Unit, Variable};

fn ramp(len: usize) -> Variable
{
    let dims = Dimensions::from(&[(Dim::X, len)][..]);
    Variable::new(dims, Unit::M, (0..len).map(|i| i as f64).collect()).unwrap()
}

#[test]
fn slice_then_slice_composes()
{
    let v = ramp(10);
    let nested = v
        .slice_range(Dim::X, 2..8)
        .unwrap()
        .slice_range(Dim::X, 1..4)
        .unwrap();
    let direct = v.slice_range(Dim::X, 3..6).unwrap();
    assert_eq!(nested, direct);
    assert_eq!(nested.values::<f64>().unwrap(), &[3.0, 4.0, 5.0]);
}

#[test]
fn single_index_slice_removes_the_dimension()
{
    let dims = Dimensions::from(&[(Dim::Y, 2), (Dim::X, 3)][..]);
    let v = Variable::new(dims, Unit::M, (0..6).map(|i| i as f64).collect()).unwrap();
    let row = v.slice(Dim::Y, 1).unwrap();
    assert_eq!(row.dims(), &Dimensions::from(&[(Dim::X, 3)][..]));
    assert_eq!(row.values::<f64>().unwrap(), &[3.0, 4.0, 5.0]);
    let cell = row.slice(Dim::X, 2).unwrap();
    assert_eq!(cell.dims().ndim(), 0);
    assert_eq!(cell.values::<f64>().unwrap(), &[5.0]);
}

#[test]
fn out_of_range_slices_are_reported()
{
    let v = ramp(4);
    assert!(matches!(v.slice(Dim::X, 4), Err(Error::Slice { .. })));
    assert!(matches!(v.slice_range(Dim::X, 2..6), Err(Error::Slice { .. })));
    assert!(matches!(v.slice(Dim::Y, 0), Err(Error::DimensionNotFound { .. })));
}

#[test]
fn slices_share_storage_and_variances()
{
    let dims = Dimensions::from(&[(Dim::X, 4)][..]);
    let v = Variable::with_variances(
        dims,
        Unit::M,
        vec![1.0, 2.0, 3.0, 4.0],
        vec![0.1, 0.2, 0.3, 0.4],
    )
    .unwrap();
    let mid = v.slice_range(Dim::X, 1..3).unwrap();
    assert!(mid.same_buffer(&v));
    assert_eq!(mid.values::<f64>().unwrap(), &[2.0, 3.0]);
    assert_eq!(mid.variances::<f64>().unwrap(), &[0.2, 0.3]);
}

#[test]
fn inner_slice_is_not_contiguous_but_iterable()
{
    let dims = Dimensions::from(&[(Dim::Y, 2), (Dim::X, 4)][..]);
    let v = Variable::new(dims, Unit::M, (0..8).map(|i| i as f64).collect()).unwrap();
    let inner = v.slice_range(Dim::X, 1..3).unwrap();
    assert!(matches!(inner.values::<f64>(), Err(Error::Dimension(_))));
    let view = inner.array_view::<f64>().unwrap();
    assert_eq!(view.iter().copied().collect::<Vec<_>>(), [1.0, 2.0, 5.0, 6.0]);
    // A deep copy re-compacts.
    assert_eq!(inner.copy().values::<f64>().unwrap(), &[1.0, 2.0, 5.0, 6.0]);
}

#[test]
fn arithmetic_on_slices()
{
    let v = ramp(6);
    let head = v.slice_range(Dim::X, 0..3).unwrap();
    let tail = v.slice_range(Dim::X, 3..6).unwrap();
    let sum = &head + &tail;
    assert_eq!(sum.values::<f64>().unwrap(), &[3.0, 5.0, 7.0]);
}

#[test]
fn rename_keeps_content()
{
    let mut v = ramp(3);
    v.rename(Dim::X, Dim::Time).unwrap();
    assert_eq!(v.dims(), &Dimensions::from(&[(Dim::Time, 3)][..]));
    assert!(matches!(v.rename(Dim::X, Dim::Y), Err(Error::DimensionNotFound { .. })));
}
