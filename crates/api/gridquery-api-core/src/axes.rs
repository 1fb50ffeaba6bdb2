//! Named axis lookup.
//!
//! Filters are written generically for any rank, so the familiar axis names
//! address components from the *end* of a coordinate: `x` is always the last
//! component, `y` the second-last, and so on. `t` is the first component.
//! A 2-vector therefore has axes `(y, x)`, and a 3-vector `(t, y, x)` — any
//! leading axes (usually time) come before the horizontal ones.

/// Resolve an axis name to a component index for a vector of the given rank.
/// Returns `None` for unknown names or when the rank is too small to hold
/// the axis.
pub fn axis_index(rank: usize, name: &str) -> Option<usize> {
    let from_end = match name {
        "x" => 1,
        "y" => 2,
        "z" => 3,
        "w" => 4,
        "t" | "time" => return if rank >= 1 { Some(0) } else { None },
        _ => return None,
    };
    rank.checked_sub(from_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_addresses_the_last_component() {
        assert_eq!(axis_index(1, "x"), Some(0));
        assert_eq!(axis_index(2, "x"), Some(1));
        assert_eq!(axis_index(4, "x"), Some(3));
    }

    #[test]
    fn t_addresses_the_first_component() {
        assert_eq!(axis_index(3, "t"), Some(0));
        assert_eq!(axis_index(1, "time"), Some(0));
    }

    #[test]
    fn out_of_rank_axes_are_absent() {
        assert_eq!(axis_index(1, "y"), None);
        assert_eq!(axis_index(2, "z"), None);
        assert_eq!(axis_index(3, "quux"), None);
    }
}
