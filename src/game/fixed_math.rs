//! World-space vector type and search heuristics shared by pathfinding.
//!
//! Agent and portal positions are plain `(f32, f32)`, so this module re-exports
//! `glam::Vec2` rather than carrying a bespoke fixed-point vector type. See
//! DESIGN.md for the rationale.

pub use glam::Vec2;

/// Octile distance between two grid cells, scaled by `cell_size`. Shared by the
/// A* heuristic (8-connected) and the HPA* edge-admissibility check (§8).
pub fn octile(dx: i32, dy: i32) -> f32 {
    let dx = dx.unsigned_abs() as f32;
    let dy = dy.unsigned_abs() as f32;
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    const SQRT2_MINUS_1: f32 = std::f32::consts::SQRT_2 - 1.0;
    hi + SQRT2_MINUS_1 * lo
}

/// Manhattan distance between two grid cells. Used as the heuristic when diagonal
/// movement is disabled, matching the "octile reduces to Manhattan" boundary
/// behavior from §8.
pub fn manhattan(dx: i32, dy: i32) -> f32 {
    (dx.unsigned_abs() + dy.unsigned_abs()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octile_matches_manhattan_on_axis() {
        assert_eq!(octile(5, 0), 5.0);
        assert_eq!(octile(0, 5), 5.0);
    }

    #[test]
    fn octile_diagonal_is_cheaper_than_manhattan() {
        let oct = octile(3, 3);
        let man = manhattan(3, 3);
        assert!(oct < man);
        assert!((oct - 3.0 * std::f32::consts::SQRT_2).abs() < 1e-5);
    }
}
