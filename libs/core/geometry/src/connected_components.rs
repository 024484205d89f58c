use crate::bounding_box::BoundingBox;
use crate::mask::Mask;

/// Pixel adjacency used when growing a connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Connectivity::Eight => {
                &[(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (-1, 1), (1, -1), (1, 1)]
            }
        }
    }
}

/// One labeled component: its bounding box relative to the source mask and
/// a mask cropped to that bounding box.
pub struct Component {
    pub bounding_box: BoundingBox,
    pub mask: Mask,
}

/// Labels connected components of set pixels in `mask`, in the order their
/// seed pixel is first encountered during a row-major scan — this fixes the
/// order in which the executor assigns monotonically increasing object ids
/// within a tile (§4.3).
pub fn label_components(mask: &Mask, connectivity: Connectivity) -> Vec<Component> {
    let width = mask.width();
    let height = mask.height();
    let mut visited = Mask::empty(width, height);
    let mut components = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) || visited.get(x, y) {
                continue;
            }

            let mut queue = std::collections::VecDeque::new();
            queue.push_back((x, y));
            visited.set(x, y, true);

            let mut pixels = Vec::new();
            let (mut min_x, mut min_y) = (x, y);
            let (mut max_x, mut max_y) = (x, y);

            while let Some((cx, cy)) = queue.pop_front() {
                pixels.push((cx, cy));
                min_x = min_x.min(cx);
                min_y = min_y.min(cy);
                max_x = max_x.max(cx);
                max_y = max_y.max(cy);

                for (dx, dy) in connectivity.offsets() {
                    let nx = cx as i64 + *dx as i64;
                    let ny = cy as i64 + *dy as i64;
                    if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    if mask.get(nx, ny) && !visited.get(nx, ny) {
                        visited.set(nx, ny, true);
                        queue.push_back((nx, ny));
                    }
                }
            }

            let bbox_width = max_x - min_x + 1;
            let bbox_height = max_y - min_y + 1;
            let mut component_mask = Mask::empty(bbox_width, bbox_height);
            for (px, py) in pixels {
                component_mask.set(px - min_x, py - min_y, true);
            }

            components.push(Component {
                bounding_box: BoundingBox::new(
                    i64::from(min_x),
                    i64::from(min_y),
                    bbox_width,
                    bbox_height,
                ),
                mask: component_mask,
            });
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(width: u32, height: u32, rect: (u32, u32, u32, u32)) -> Mask {
        let mut mask = Mask::empty(width, height);
        let (x0, y0, w, h) = rect;
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn single_rectangle_is_one_component() {
        let mask = square_mask(512, 512, (100, 100, 101, 101));
        let components = label_components(&mask, Connectivity::Eight);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].bounding_box, BoundingBox::new(100, 100, 101, 101));
        assert_eq!(components[0].mask.count_set(), 101 * 101);
    }

    #[test]
    fn diagonal_pixels_need_eight_connectivity() {
        let mut mask = Mask::empty(4, 4);
        mask.set(0, 0, true);
        mask.set(1, 1, true);

        assert_eq!(label_components(&mask, Connectivity::Four).len(), 2);
        assert_eq!(label_components(&mask, Connectivity::Eight).len(), 1);
    }

    #[test]
    fn components_are_ordered_by_first_seed_in_row_major_scan() {
        let mut mask = Mask::empty(10, 10);
        mask.set(5, 0, true);
        mask.set(0, 5, true);
        let components = label_components(&mask, Connectivity::Eight);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].bounding_box.x, 5);
        assert_eq!(components[1].bounding_box.x, 0);
    }

    #[test]
    fn empty_mask_has_no_components() {
        let mask = Mask::empty(8, 8);
        assert!(label_components(&mask, Connectivity::Eight).is_empty());
    }
}
