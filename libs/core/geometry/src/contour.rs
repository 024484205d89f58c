use crate::mask::Mask;

/// Traces the outer boundary of the set pixels in `mask` using Moore-neighbor
/// tracing (Suzuki/Moore style, 8-connected), starting from the first set
/// pixel in row-major order. Returns vertices in mask-local coordinates; the
/// caller translates them to full-image coordinates using the object's
/// bounding-box origin.
///
/// Returns an empty vertex list for an empty mask.
pub fn trace_outer_contour(mask: &Mask) -> Vec<(i32, i32)> {
    let Some(start) = mask.iter_set_pixels().next() else {
        return Vec::new();
    };

    // 8-connected neighbor offsets in clockwise order, starting "west" so the
    // first search direction for a freshly-found boundary pixel looks back
    // the way the tracer came from, per the standard Moore-tracing backtrack.
    const NEIGHBORS: [(i32, i32); 8] =
        [(-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1)];

    let is_set = |x: i32, y: i32| -> bool {
        if x < 0 || y < 0 || x >= mask.width() as i32 || y >= mask.height() as i32 {
            false
        } else {
            mask.get(x as u32, y as u32)
        }
    };

    let (start_x, start_y) = (start.0 as i32, start.1 as i32);
    let mut contour = vec![(start_x, start_y)];

    // A single isolated pixel is its own one-vertex contour.
    let has_any_neighbor = NEIGHBORS.iter().any(|(dx, dy)| is_set(start_x + dx, start_y + dy));
    if !has_any_neighbor {
        return contour;
    }

    let mut current = (start_x, start_y);
    // Entered the start pixel as if arriving from the west.
    let mut backtrack_dir: usize = 0;
    loop {
        let mut found = None;
        for step in 0..8 {
            let dir = (backtrack_dir + 1 + step) % 8;
            let (dx, dy) = NEIGHBORS[dir];
            let candidate = (current.0 + dx, current.1 + dy);
            if is_set(candidate.0, candidate.1) {
                found = Some((candidate, dir));
                break;
            }
        }

        let Some((next, dir)) = found else {
            break;
        };

        if next == (start_x, start_y) {
            break;
        }

        contour.push(next);
        // Backtrack direction for the next step looks back the way we came.
        backtrack_dir = (dir + 4) % 8;
        current = next;

        if contour.len() > mask.width() as usize * mask.height() as usize * 8 {
            // Defensive bound: a well-formed mask can never need more steps
            // than a few times its perimeter; this guards against a tracing
            // bug turning into an infinite loop rather than a wrong contour.
            break;
        }
    }

    contour
}
