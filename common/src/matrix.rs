use crate::config::{LED_COUNT, MATRIX_SIDE};

/// Convert (row, col) grid coordinates to the linear position in the LED chain.
///
/// The panel is wired as a snake: even rows run left to right, odd rows right
/// to left, and the data line enters at the far end, so (0, 0) is the last
/// LED of the chain and (4, 4) the first.
///
/// Panics if either coordinate is outside the matrix.
pub fn index(row: usize, col: usize) -> usize {
    assert!(
        row < MATRIX_SIDE && col < MATRIX_SIDE,
        "grid coordinate ({row}, {col}) outside {MATRIX_SIDE}x{MATRIX_SIDE} matrix"
    );

    let col = if row % 2 == 0 {
        // even rows go left to right
        col
    } else {
        // odd rows go right to left
        MATRIX_SIDE - 1 - col
    };
    (LED_COUNT - 1) - (row * MATRIX_SIDE + col)
}

/// Iterate over all grid coordinates, row by row.
pub fn coordinates() -> impl Iterator<Item = (usize, usize)> {
    (0..MATRIX_SIDE).flat_map(|row| (0..MATRIX_SIDE).map(move |col| (row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_row_turns() {
        assert_eq!(index(0, 0), 24);
        assert_eq!(index(0, 4), 20);
        assert_eq!(index(4, 0), 4);
        assert_eq!(index(4, 4), 0);
        // row 1 runs backwards
        assert_eq!(index(1, 0), 15);
        assert_eq!(index(1, 4), 19);
    }

    #[test]
    fn every_position_is_hit_exactly_once() {
        let mut seen = [false; LED_COUNT];
        for (row, col) in coordinates() {
            let position = index(row, col);
            assert!(position < LED_COUNT);
            assert!(!seen[position], "({row}, {col}) maps onto {position} twice");
            seen[position] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn neighbours_in_the_chain_are_neighbours_on_the_grid() {
        // walking the chain backwards from the origin never jumps more than one cell
        let mut grid_of = [(0, 0); LED_COUNT];
        for (row, col) in coordinates() {
            grid_of[index(row, col)] = (row, col);
        }
        for pair in grid_of.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let distance = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(distance, 1, "{a:?} -> {b:?}");
        }
    }

    #[test]
    #[should_panic]
    fn row_out_of_range() {
        index(MATRIX_SIDE, 0);
    }
}
