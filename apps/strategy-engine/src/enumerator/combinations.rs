//! Lexicographic k-multisets of instrument indices.
//!
//! A combination is a non-decreasing index vector, so one instrument may
//! appear on several legs (a 2x long call, a 1x2 ratio spread).

/// Hard cap on legs per candidate, shared by both enumeration modes.
pub const MAX_LEGS: usize = 10;

/// Advance `c` to the next non-decreasing combination over `0..n`.
///
/// The rightmost index below `n - 1` is incremented and every index to its
/// right takes the same value. Returns `false` (leaving `c` untouched) once
/// `c` is the last combination.
pub fn next_combination(c: &mut [u32], n: u32) -> bool {
    let last = n.saturating_sub(1);
    for i in (0..c.len()).rev() {
        if c[i] < last {
            let v = c[i] + 1;
            c[i..].fill(v);
            return true;
        }
    }
    false
}

/// Binomial coefficient, saturating at `u64::MAX`.
#[must_use]
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    u64::try_from(acc).unwrap_or(u64::MAX)
}

/// Number of size-`k` multisets drawn from `n` values: C(n + k - 1, k).
#[must_use]
pub fn multiset_count(n: u64, k: u64) -> u64 {
    if n == 0 {
        return u64::from(k == 0);
    }
    binomial(n.saturating_add(k) - 1, k)
}

/// Work units for leg count `k`: C(n + k - 1, k) · 2^k, saturating.
#[must_use]
pub fn work_units(n: u64, k: usize) -> u64 {
    multiset_count(n, k as u64).saturating_mul(1u64 << k)
}

/// Write the `rank`-th lexicographic non-decreasing k-combination of `0..n`
/// into `out`.
///
/// `rank` must be below C(n + k - 1, k).
pub fn unrank_combination(mut rank: u64, n: u32, out: &mut [u32]) {
    let k = out.len();
    let mut x = 0u32;
    for (i, slot) in out.iter_mut().enumerate() {
        loop {
            // Completions of the positions right of i once i holds x.
            let count = multiset_count(u64::from(n - x), (k - i - 1) as u64);
            if rank < count || x + 1 >= n {
                *slot = x;
                break;
            }
            rank -= count;
            x += 1;
        }
    }
}
