/// Workgroup size for `horizons.wgsl#point_horizons`.
pub const HORIZONS_WORKGROUP_SIZE_Y: u32 = 64;

/// Workgroups along `y` per dispatch. Matches the row stride in `horizons.wgsl`.
pub const HORIZONS_DISPATCH_SIZE_Y: u32 = 1024;

/// Invocations covered by one `x` step of the dispatch grid.
pub const HORIZONS_ROW_STRIDE: u64 =
    HORIZONS_DISPATCH_SIZE_Y as u64 * HORIZONS_WORKGROUP_SIZE_Y as u64;

/**
Dispatch size that runs `horizons.wgsl#point_horizons` at least once per point.

A dispatch of `(x, y, z)` workgroups, each of `@workgroup_size(1, 64, 1)`, runs
`x * y * z * 64` invocations. No single dispatch dimension may exceed
[maxComputeWorkgroupsPerDimension](https://www.w3.org/TR/webgpu/#dom-supported-limits-maxcomputeworkgroupsperdimension),
which is 65535 by default, so a 1200x800 image (960000 points) cannot be
dispatched along one axis.

Instead the points are laid out in rows of [`HORIZONS_ROW_STRIDE`] (65536)
invocations: `y` is fixed at 1024 workgroups of 64, and `x` counts the rows.
The shader recovers the point index as
`global_invocation_id.x * 65536 + global_invocation_id.y` and returns early
for indices past the end of the point buffer.

Returns `None` when `total_work` would need more than `max_workgroups` rows.
*/
pub fn horizons_dispatch_size(total_work: usize, max_workgroups: u32) -> Option<(u32, u32, u32)> {
    let rows = (total_work as u64 + HORIZONS_ROW_STRIDE - 1) / HORIZONS_ROW_STRIDE;
    let x: u32 = rows.max(1).try_into().ok()?;
    if x > max_workgroups || HORIZONS_DISPATCH_SIZE_Y > max_workgroups {
        return None;
    }
    Some((x, HORIZONS_DISPATCH_SIZE_Y, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_every_point() {
        assert_eq!(horizons_dispatch_size(1, 65535), Some((1, 1024, 1)));
        assert_eq!(horizons_dispatch_size(65536, 65535), Some((1, 1024, 1)));
        assert_eq!(horizons_dispatch_size(65537, 65535), Some((2, 1024, 1)));
        assert_eq!(horizons_dispatch_size(1200 * 800, 65535), Some((15, 1024, 1)));

        for total_work in [1, 16, 65535, 65536, 65537, 960_000, 8_294_400] {
            let (x, y, z) = horizons_dispatch_size(total_work, 65535).unwrap();
            let invocations = x as u64 * y as u64 * z as u64 * HORIZONS_WORKGROUP_SIZE_Y as u64;
            assert!(invocations >= total_work as u64);
            assert!(invocations - (total_work as u64) < HORIZONS_ROW_STRIDE);
        }
    }

    #[test]
    fn dispatch_respects_workgroup_limit() {
        assert_eq!(horizons_dispatch_size(3 * 65536, 2), None);
        assert_eq!(horizons_dispatch_size(1, 512), None);
    }

    #[test]
    fn shader_row_stride_matches_dispatch_layout() {
        let shader = include_str!("horizons.wgsl");
        let index = format!("global_id.x * {}u + global_id.y", HORIZONS_ROW_STRIDE);
        assert!(shader.contains(&index), "shader does not index with {}", index);
        assert!(shader.contains(&format!(
            "@workgroup_size(1, {}, 1)",
            HORIZONS_WORKGROUP_SIZE_Y
        )));
    }
}
