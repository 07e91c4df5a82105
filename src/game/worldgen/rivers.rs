//! D8 flow accumulation and river carving (§4.B step 4).

const DX: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

/// Steepest-descent flow accumulation over a `w*h` row-major heightfield. Every
/// cell starts contributing 1 unit of flow; processing cells in descending height
/// order and pushing each cell's accumulated flow to its lowest neighbor gives each
/// downstream cell the sum of everything that drains through it. Ties in height are
/// broken by ascending row-major index (stable sort), matching the determinism
/// requirement in §4.B.
pub fn compute_flow_accumulation(height: &[f32], w: usize, h: usize) -> Vec<f32> {
    let mut flow = vec![1.0f32; w * h];
    let mut order: Vec<usize> = (0..w * h).collect();
    order.sort_by(|&a, &b| height[b].partial_cmp(&height[a]).unwrap());

    for &i in &order {
        let x = (i % w) as i32;
        let y = (i / w) as i32;
        let mut best = height[i];
        let (mut bx, mut by) = (x, y);
        for k in 0..8 {
            let nx = x + DX[k];
            let ny = y + DY[k];
            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                continue;
            }
            let nh = height[ny as usize * w + nx as usize];
            if nh < best {
                best = nh;
                bx = nx;
                by = ny;
            }
        }
        if bx == x && by == y {
            continue;
        }
        let downstream = by as usize * w + bx as usize;
        flow[downstream] += flow[i];
    }
    flow
}

/// Carves river channels wherever `flow >= flow_thresh`, shallowly lowering the
/// height there and smoothing the carved cells against their 3x3 neighborhood.
/// Returns the river mask. Mutates `height` in place.
pub fn carve_rivers(height: &mut [f32], flow: &[f32], w: usize, h: usize, flow_thresh: f32) -> Vec<bool> {
    let mut river = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if flow[i] >= flow_thresh {
                river[i] = true;
                height[i] -= (0.02 * flow[i].sqrt()).min(2.0);
            }
        }
    }
    if h < 3 || w < 3 {
        return river;
    }
    let snapshot = height.to_vec();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            if !river[i] {
                continue;
            }
            let mut sum = 0.0;
            let mut count = 0.0;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let j = (y as i32 + dy) as usize * w + (x as i32 + dx) as usize;
                    sum += snapshot[j];
                    count += 1.0;
                }
            }
            height[i] = 0.25 * snapshot[i] + 0.75 * (sum / count);
        }
    }
    river
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_field_all_flow_to_one_sink() {
        let height = vec![0.0f32; 9];
        let flow = compute_flow_accumulation(&height, 3, 3);
        assert_eq!(flow.iter().sum::<f32>(), 9.0);
    }

    #[test]
    fn slope_drains_downhill() {
        // height decreases left -> right: everything should drain toward column 2.
        let height = vec![2.0, 1.0, 0.0, 2.0, 1.0, 0.0, 2.0, 1.0, 0.0];
        let flow = compute_flow_accumulation(&height, 3, 3);
        assert!(flow[2] > flow[0]);
        assert!(flow[5] > flow[3]);
    }

    #[test]
    fn carving_lowers_high_flow_cells() {
        let mut height = vec![5.0f32; 25];
        let flow = vec![200.0f32; 25];
        let before = height.clone();
        let river = carve_rivers(&mut height, &flow, 5, 5, 120.0);
        assert!(river.iter().all(|&r| r));
        for i in 0..25 {
            assert!(height[i] <= before[i]);
        }
    }

    #[test]
    fn below_threshold_is_not_a_river() {
        let mut height = vec![5.0f32; 9];
        let flow = vec![1.0f32; 9];
        let river = carve_rivers(&mut height, &flow, 3, 3, 120.0);
        assert!(river.iter().all(|&r| !r));
    }
}
