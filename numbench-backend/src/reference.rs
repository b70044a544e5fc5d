//! Trusted In-Process Reference Implementations
//!
//! Every other backend is validated against these before it is timed.

/// Sieve of Eratosthenes: the ordered primes `<= n`. Empty for `n < 2`.
pub fn sieve(n: u64) -> Vec<i64> {
    if n < 2 {
        return Vec::new();
    }
    let n = n as usize;
    let mut is_prime = vec![true; n + 1];
    is_prime[0] = false;
    is_prime[1] = false;
    let limit = (n as f64).sqrt() as usize;
    for i in 2..=limit {
        if is_prime[i] {
            for j in (i * i..=n).step_by(i) {
                is_prime[j] = false;
            }
        }
    }
    (2..=n).filter(|&i| is_prime[i]).map(|i| i as i64).collect()
}

/// Trapezoidal rule for `f(x) = x^2` over `[a, b]` with `n` subintervals.
pub fn trapezoid(a: f64, b: f64, n: u64) -> f64 {
    let h = (b - a) / (n as f64);
    let mut s = 0.5 * (a * a + b * b);
    for i in 1..n {
        let x = a + (i as f64) * h;
        s += x * x;
    }
    s * h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sieve_known_prefixes() {
        assert_eq!(sieve(10), vec![2, 3, 5, 7]);
        assert_eq!(sieve(2), vec![2]);
        assert_eq!(sieve(1), Vec::<i64>::new());
        assert_eq!(sieve(0), Vec::<i64>::new());
    }

    #[test]
    fn sieve_is_ordered_and_bounded() {
        let primes = sieve(10_000);
        assert_eq!(primes.len(), 1229);
        assert!(primes.windows(2).all(|w| w[0] < w[1]));
        assert!(primes.iter().all(|&p| p <= 10_000));
        assert_eq!(*primes.last().unwrap(), 9973);
    }

    #[test]
    fn trapezoid_converges_to_a_third() {
        // Analytical integral of x^2 over [0, 1] is 1/3.
        let approx = trapezoid(0.0, 1.0, 100_000);
        assert!((approx - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn trapezoid_respects_the_bounds() {
        // Integral of x^2 over [1, 2] is 7/3.
        let approx = trapezoid(1.0, 2.0, 1_000_000);
        assert!((approx - 7.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn trapezoid_coarse_grid_is_biased_high() {
        // The trapezoidal rule overestimates convex integrands.
        let coarse = trapezoid(0.0, 1.0, 10);
        assert!(coarse > 1.0 / 3.0);
        assert!((coarse - 1.0 / 3.0) < 1e-2);
    }
}
