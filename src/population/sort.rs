//! Partition quicksort over an index permutation.
//!
//! The pivot is the last element of each range and ties are settled by where
//! the partition scan happens to meet, not by original position. The sort is
//! therefore not stable, and two populations holding the same scores in the
//! same storage order always end up in the same order. NaN keys sort as the
//! worst possible value.

/// Sorts `order` (a permutation of indices into `keys`) so that the best key
/// comes first: descending when `descending` is set, ascending otherwise.
pub(crate) fn quicksort(order: &mut [usize], keys: &[f64], descending: bool) {
    if order.len() < 2 {
        return;
    }
    let worst = if descending {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    let key = |i: usize| -> f64 {
        let k = keys[i];
        if k.is_nan() {
            worst
        } else {
            k
        }
    };
    sort_range(order, &key, 0, order.len() as isize - 1, descending);
}

fn sort_range<K>(order: &mut [usize], key: &K, mut l: isize, mut r: isize, descending: bool)
where
    K: Fn(usize) -> f64,
{
    // Recurse into the smaller half and loop on the larger one to bound the
    // stack depth; the visiting order does not change the result.
    while r > l {
        let p = partition(order, key, l, r, descending);
        if p - l < r - p {
            sort_range(order, key, l, p - 1, descending);
            l = p + 1;
        } else {
            sort_range(order, key, p + 1, r, descending);
            r = p - 1;
        }
    }
}

fn partition<K>(order: &mut [usize], key: &K, l: isize, r: isize, descending: bool) -> isize
where
    K: Fn(usize) -> f64,
{
    let before = |a: f64, b: f64| if descending { a > b } else { a < b };
    let at = |order: &[usize], idx: isize| key(order[idx as usize]);

    let v = at(order, r);
    let mut i = l - 1;
    let mut j = r;
    loop {
        // Stops at r at the latest: the pivot is never before itself.
        loop {
            i += 1;
            if !before(at(order, i), v) {
                break;
            }
        }
        loop {
            j -= 1;
            if !(before(v, at(order, j)) && j > 0) {
                break;
            }
        }
        if i >= j {
            break;
        }
        order.swap(i as usize, j as usize);
    }
    order.swap(i as usize, r as usize);
    i
}
