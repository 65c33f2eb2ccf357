use approx::assert_abs_diff_eq;
use ndvar::{Dim, Dimensions, Error, Unit, Variable};

fn with_var(values: Vec<f64>, variances: Vec<f64>) -> Variable
{
    let dims = Dimensions::from(&[(Dim::X, values.len())][..]);
    Variable::with_variances(dims, Unit::DIMENSIONLESS, values, variances).unwrap()
}

#[test]
fn addition_and_subtraction_add_variances()
{
    let a = with_var(vec![1.0], vec![0.5]);
    let b = with_var(vec![2.0], vec![0.25]);
    assert_abs_diff_eq!((&a + &b).variances::<f64>().unwrap()[0], 0.75);
    assert_abs_diff_eq!((&a - &b).variances::<f64>().unwrap()[0], 0.75);
}

#[test]
fn additive_with_exact_operand_keeps_variance()
{
    let a = with_var(vec![1.0], vec![0.5]);
    let exact = Variable::new(
        Dimensions::from(&[(Dim::X, 1)][..]),
        Unit::DIMENSIONLESS,
        vec![2.0],
    )
    .unwrap();
    let sum = &a + &exact;
    assert_abs_diff_eq!(sum.values::<f64>().unwrap()[0], 3.0);
    assert_abs_diff_eq!(sum.variances::<f64>().unwrap()[0], 0.5);
}

#[test]
fn multiplicative_with_exact_operand_rejected_both_ways()
{
    let a = with_var(vec![1.0], vec![0.5]);
    let exact = Variable::new(
        Dimensions::from(&[(Dim::X, 1)][..]),
        Unit::DIMENSIONLESS,
        vec![2.0],
    )
    .unwrap();
    assert!(matches!(ndvar::times(&a, &exact), Err(Error::Variances(_))));
    assert!(matches!(ndvar::times(&exact, &a), Err(Error::Variances(_))));
    assert!(matches!(ndvar::divide(&a, &exact), Err(Error::Variances(_))));
}

#[test]
fn reciprocal_variance()
{
    let a = with_var(vec![2.0], vec![0.5]);
    let r = ndvar::reciprocal(&a).unwrap();
    assert_abs_diff_eq!(r.values::<f64>().unwrap()[0], 0.5);
    assert_abs_diff_eq!(r.variances::<f64>().unwrap()[0], 0.5 / 16.0);
}

#[test]
fn log_variance()
{
    let a = with_var(vec![4.0], vec![0.5]);
    let l = ndvar::log(&a).unwrap();
    assert_abs_diff_eq!(l.values::<f64>().unwrap()[0], 4.0f64.ln());
    assert_abs_diff_eq!(l.variances::<f64>().unwrap()[0], 0.5 / 16.0);
}

#[test]
fn pow_variance_follows_the_multiplication_tree()
{
    let a = with_var(vec![1.5], vec![0.25]);
    let cubed = ndvar::pow(&a, 3).unwrap();
    let via_times = {
        let squared = ndvar::times(&a, &a).unwrap();
        ndvar::times(&squared, &a).unwrap()
    };
    assert_abs_diff_eq!(
        cubed.values::<f64>().unwrap()[0],
        via_times.values::<f64>().unwrap()[0],
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        cubed.variances::<f64>().unwrap()[0],
        via_times.variances::<f64>().unwrap()[0],
        epsilon = 1e-12
    );
}

#[test]
fn variances_forbidden_for_integers()
{
    let dims = Dimensions::from(&[(Dim::X, 1)][..]);
    assert!(matches!(
        Variable::with_variances(dims, Unit::M, vec![1i32], vec![1i32]),
        Err(Error::Variances(_))
    ));
}

#[test]
fn set_variances_roundtrip()
{
    let dims = Dimensions::from(&[(Dim::X, 2)][..]);
    let mut a = Variable::new(dims, Unit::M, vec![1.0, 2.0]).unwrap();
    assert!(!a.has_variances());
    a.set_variances(Some(vec![0.1, 0.2])).unwrap();
    assert_eq!(a.variances::<f64>().unwrap(), &[0.1, 0.2]);
    a.set_variances::<f64>(None).unwrap();
    assert!(!a.has_variances());
    assert!(matches!(a.variances::<f64>(), Err(Error::Variances(_))));
}
