//! Voxel walking along a line of sight.
//!
//! Implements the grid traversal of Amanatides & Woo ("A Fast Voxel
//! Traversal Algorithm for Ray Tracing", Eurographics '87) with two
//! hardenings over the textbook form:
//!
//! - instead of accumulating `tMax += tDelta` per step, an integer counter
//!   is kept per axis and `tMax` is recomputed as `tMaxStart + mult * tDelta`,
//!   so 0.1 + 0.1 + 0.1 != 3 * 0.1 style drift cannot occur;
//! - when `tMax` lands exactly on a voxel boundary while stepping in the
//!   negative direction, boundary ownership is corrected by shifting the
//!   start voxel down one cell.
//!
//! Ties in `tMax` step several axes in the same iteration. When such a
//! multi-axis step mixes positive and negative directions, the segment
//! grazes one extra voxel at the shared corner; that voxel is reported
//! before the stepped-to voxel.

use crate::core::{floor_mod, voxel_of_point, Point3, Voxel};

struct AxisState {
    step: i64,
    t_delta: f64,
    t_max: f64,
    max_mult: f64,
}

fn axis_setup(
    dir: f64,
    start_pos: f64,
    voxel_size: f64,
    start_v: &mut i64,
    end_v: i64,
    cur_v: &mut i64,
) -> AxisState {
    if dir == 0.0 {
        return AxisState {
            step: 0,
            t_delta: 0.0,
            t_max: f64::INFINITY,
            max_mult: f64::INFINITY,
        };
    }
    let step: i64 = if dir > 0.0 { 1 } else { -1 };
    let t_delta = step as f64 * voxel_size / dir;
    let t_max = t_delta * (1.0 - floor_mod(step as f64 * (start_pos / voxel_size), 1.0));
    let mut max_mult = ((end_v - *start_v) * step) as f64;
    if step == -1 && t_max == t_delta && *start_v != end_v {
        *cur_v -= 1;
        *start_v -= 1;
        max_mult -= 1.0;
    }
    AxisState {
        step,
        t_delta,
        t_max,
        max_mult,
    }
}

/// Enumerate the voxels pierced by the segment from `start` to `end`,
/// calling `visitor` once per voxel. A `false` return from the visitor
/// halts the walk.
///
/// A zero-length segment returns without any visitor call. When start and
/// end share a voxel, that voxel is visited exactly once. The voxel the
/// walk begins in may otherwise be reported twice before the traversal
/// proper starts; callers must tolerate the repeat.
pub fn walk_voxels<F>(start: &Point3, end: &Point3, voxel_size: f64, visitor: &mut F)
where
    F: FnMut(Voxel) -> bool,
{
    let direction = [end.x - start.x, end.y - start.y, end.z - start.z];
    if direction[0] == 0.0 && direction[1] == 0.0 && direction[2] == 0.0 {
        return;
    }
    let start_pos = [start.x, start.y, start.z];
    let first = voxel_of_point(start, voxel_size);
    let end_voxel = voxel_of_point(end, voxel_size);
    let mut start_v = [first.x, first.y, first.z];
    let end_v = [end_voxel.x, end_voxel.y, end_voxel.z];
    let mut cur = start_v;

    visitor(first);
    if start_v == end_v {
        return;
    }

    let mut axes = [0usize, 1, 2].map(|k| {
        axis_setup(
            direction[k],
            start_pos[k],
            voxel_size,
            &mut start_v[k],
            end_v[k],
            &mut cur[k],
        )
    });

    visitor(Voxel::new(cur[0], cur[1], cur[2]));
    if cur == end_v {
        return;
    }

    let mut mult = [0u64; 3];
    let t_max_start = [axes[0].t_max, axes[1].t_max, axes[2].t_max];

    'walk: loop {
        let min_val = axes[0].t_max.min(axes[1].t_max).min(axes[2].t_max);
        let mut stepped = [false; 3];
        for k in 0..3 {
            if axes[k].t_max == min_val {
                mult[k] += 1;
                cur[k] = start_v[k] + mult[k] as i64 * axes[k].step;
                axes[k].t_max = t_max_start[k] + mult[k] as f64 * axes[k].t_delta;
                stepped[k] = true;
            }
        }

        // A multi-axis step with mixed step signs grazes one extra voxel at
        // the shared corner; it is reported before the stepped-to voxel.
        let multi_axis = (stepped[0] && stepped[1])
            || (stepped[1] && stepped[2])
            || (stepped[0] && stepped[2]);
        let has_pos = axes.iter().any(|a| a.step == 1);
        let has_neg = axes.iter().any(|a| a.step == -1);
        if multi_axis && has_pos && has_neg {
            let mut add = cur;
            for k in 0..3 {
                if !stepped[k] {
                    continue;
                }
                if axes[k].step < 0 {
                    if mult[k] as f64 > axes[k].max_mult + 1.0 {
                        break 'walk;
                    }
                    add[k] += 1;
                } else if mult[k] as f64 > axes[k].max_mult {
                    break 'walk;
                }
            }
            if !visitor(Voxel::new(add[0], add[1], add[2])) {
                break 'walk;
            }
        }

        // Safety exit: an inexact traversal could otherwise overshoot the
        // end voxel and never terminate.
        for k in 0..3 {
            if stepped[k] && mult[k] as f64 > axes[k].max_mult {
                break 'walk;
            }
        }

        if !visitor(Voxel::new(cur[0], cur[1], cur[2])) {
            break 'walk;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn collect_walk(start: Point3, end: Point3, voxel_size: f64) -> Vec<Voxel> {
        let mut visited = Vec::new();
        walk_voxels(&start, &end, voxel_size, &mut |v| {
            visited.push(v);
            true
        });
        visited
    }

    #[test]
    fn test_zero_length_ray_makes_no_visit() {
        let p = Point3::new(1.5, 2.5, 3.5);
        assert!(collect_walk(p, p, 1.0).is_empty());
    }

    #[test]
    fn test_same_voxel_visited_once() {
        let visited = collect_walk(Point3::new(0.1, 0.1, 0.1), Point3::new(0.9, 0.9, 0.9), 1.0);
        assert_eq!(visited, vec![Voxel::new(0, 0, 0)]);
    }

    #[test]
    fn test_axis_aligned_walk_is_monotonic() {
        let visited = collect_walk(Point3::ZERO, Point3::new(5.0, 0.0, 0.0), 1.0);
        let xs: Vec<i64> = visited.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![0, 0, 1, 2, 3, 4, 5]);
        assert!(visited.iter().all(|v| v.y == 0 && v.z == 0));
    }

    #[test]
    fn test_visitor_false_halts_walk() {
        let mut count = 0;
        walk_voxels(
            &Point3::ZERO,
            &Point3::new(10.0, 0.0, 0.0),
            1.0,
            &mut |v| {
                count += 1;
                v.x < 3
            },
        );
        // start voxel, its repeat, then cells 1..=3 where the visitor stops
        assert_eq!(count, 5);
    }

    #[test]
    fn test_negative_diagonal_through_origin_corner() {
        let visited = collect_walk(
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(-0.5, -0.5, -0.5),
            1.0,
        );
        let unique: BTreeSet<Voxel> = visited.into_iter().collect();
        // all-negative steps graze no extra corner voxel
        assert_eq!(
            unique.into_iter().collect::<Vec<_>>(),
            vec![Voxel::new(-1, -1, -1), Voxel::new(0, 0, 0)]
        );
    }

    #[test]
    fn test_mixed_sign_tie_reports_grazed_corner() {
        let visited = collect_walk(Point3::new(0.5, 0.5, 0.0), Point3::new(-0.5, 1.5, 0.0), 1.0);
        assert_eq!(
            visited,
            vec![
                Voxel::new(0, 0, 0),
                Voxel::new(0, 0, 0),
                Voxel::new(0, 1, 0),
                Voxel::new(-1, 1, 0),
            ]
        );
    }

    #[test]
    fn test_reversed_walk_covers_same_voxels() {
        let a = Point3::new(0.5, 0.5, 0.0);
        let b = Point3::new(-0.5, 1.5, 0.0);
        let forward: BTreeSet<Voxel> = collect_walk(a, b, 1.0).into_iter().collect();
        let backward: BTreeSet<Voxel> = collect_walk(b, a, 1.0).into_iter().collect();
        assert_eq!(forward, backward);

        let a = Point3::new(0.3, -2.7, 1.1);
        let b = Point3::new(7.9, 4.2, -3.6);
        let forward: BTreeSet<Voxel> = collect_walk(a, b, 1.0).into_iter().collect();
        let backward: BTreeSet<Voxel> = collect_walk(b, a, 1.0).into_iter().collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_walk_ends_at_end_voxel() {
        let visited = collect_walk(Point3::new(0.2, 0.7, 0.4), Point3::new(6.3, 3.1, 2.8), 1.0);
        assert_eq!(visited.last(), Some(&Voxel::new(6, 3, 2)));
    }
}
