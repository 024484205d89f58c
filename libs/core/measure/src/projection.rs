use imagec_domain_model::{ImageBuffer, PixelDepth, ZProjection};

/// Collapses a z-stack of same-sized buffers into one 2-D `ImageBuffer`
/// using the declared reducer. `AVG` accumulates in 32-bit float and
/// saturates back into the source depth's representable range; the other
/// reducers never leave that range to begin with.
///
/// `NONE` and `MIDDLE` both pick a single plane rather than reducing — the
/// caller normally never builds a z-stack for `NONE` at all, but the
/// function accepts a single-element slice for completeness.
pub fn reduce_z_stack(planes: &[ImageBuffer], kind: ZProjection) -> Option<ImageBuffer> {
    let first = planes.first()?;
    let (width, height, depth, channels, origin) =
        (first.width, first.height, first.depth, first.channels, first.origin);

    match kind {
        ZProjection::None => Some(first.clone()),
        ZProjection::Middle => planes.get(planes.len() / 2).cloned(),
        ZProjection::Max | ZProjection::Min | ZProjection::Avg => {
            let mut out = ImageBuffer::new(width, height, depth, channels, origin);
            for y in 0..height {
                for x in 0..width {
                    for c in 0..channels {
                        let mut acc = match kind {
                            ZProjection::Max => f32::NEG_INFINITY,
                            ZProjection::Min => f32::INFINITY,
                            _ => 0.0,
                        };
                        for plane in planes {
                            let v = plane.get(x, y, c);
                            acc = match kind {
                                ZProjection::Max => acc.max(v),
                                ZProjection::Min => acc.min(v),
                                ZProjection::Avg => acc + v,
                                _ => unreachable!(),
                            };
                        }
                        if matches!(kind, ZProjection::Avg) {
                            acc /= planes.len() as f32;
                        }
                        out.set(x, y, c, acc.clamp(0.0, depth_max(depth)));
                    }
                }
            }
            Some(out)
        }
    }
}

fn depth_max(depth: PixelDepth) -> f32 {
    match depth {
        PixelDepth::U8 => u8::MAX as f32,
        PixelDepth::U16 => u16::MAX as f32,
        PixelDepth::F32 => f32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(width: u32, height: u32, value: f32) -> ImageBuffer {
        let mut buf = ImageBuffer::new(width, height, PixelDepth::U16, 1, (0, 0));
        for y in 0..height {
            for x in 0..width {
                buf.set(x, y, 0, value);
            }
        }
        buf
    }

    #[test]
    fn max_projection_picks_the_largest_value() {
        let planes = vec![plane(2, 2, 10.0), plane(2, 2, 50.0), plane(2, 2, 30.0)];
        let reduced = reduce_z_stack(&planes, ZProjection::Max).unwrap();
        assert_eq!(reduced.get(0, 0, 0), 50.0);
    }

    #[test]
    fn avg_projection_rounds_within_depth_range() {
        let planes = vec![plane(1, 1, 10.0), plane(1, 1, 20.0)];
        let reduced = reduce_z_stack(&planes, ZProjection::Avg).unwrap();
        assert_eq!(reduced.get(0, 0, 0), 15.0);
    }

    #[test]
    fn middle_projection_picks_the_center_plane() {
        let planes = vec![plane(1, 1, 1.0), plane(1, 1, 2.0), plane(1, 1, 3.0)];
        let reduced = reduce_z_stack(&planes, ZProjection::Middle).unwrap();
        assert_eq!(reduced.get(0, 0, 0), 2.0);
    }

    #[test]
    fn empty_stack_returns_none() {
        assert!(reduce_z_stack(&[], ZProjection::Max).is_none());
    }
}
