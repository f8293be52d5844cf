/// Assert that two `f64` values differ by at most `eps`, which defaults to
/// `f64::EPSILON`.
#[cfg(test)]
macro_rules! assert_f64_eq {
    ($a:expr, $b:expr, $eps:expr) => {{
        let (a, b, eps): (f64, f64, f64) = ($a, $b, $eps);
        let error = (a - b).abs();
        assert!(
            error <= eps,
            "Assertion failed: |{} - {}| = {:e} > {:e}",
            a,
            b,
            error,
            eps
        );
    }};
    ($a:expr, $b:expr) => {
        $crate::macros::assert_f64_eq!($a, $b, f64::EPSILON)
    };
}

#[cfg(test)]
pub(crate) use assert_f64_eq;
