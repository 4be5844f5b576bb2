use glam::{vec2, Vec2, Vec4};
use shared::VERTICES_PER_QUAD;
use std::ops::Range;

/// One continuous drag of the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Vec4,
    /// Number of vertices this stroke occupies in the vertices buffer.
    pub vertex_count: u32,
    pub positions: Vec<Vec2>,
}

/// Ranges of the GPU mirror that changed since the last upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtyRanges {
    /// Strokes whose color and vertex count must be rewritten.
    pub strokes: Option<Range<usize>>,
    /// Vertices that must be rewritten.
    pub vertices: Option<Range<usize>>,
    /// The whole mirror must be uploaded again (after a clear).
    pub reset: bool,
}

impl DirtyRanges {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_none() && self.vertices.is_none() && !self.reset
    }
}

/// Every stroke drawn so far, plus the flat arrays that are copied into the
/// color, vertex count and vertices buffers.
#[derive(Debug, Default)]
pub struct StrokeCanvas {
    strokes: Vec<Stroke>,
    colors: Vec<Vec4>,
    vertex_counts: Vec<u32>,
    vertices: Vec<Vec2>,
    half_size: f32,
    dirty: DirtyRanges,
}

impl StrokeCanvas {
    pub fn new(half_size: f32) -> Self {
        StrokeCanvas {
            half_size,
            ..Default::default()
        }
    }

    pub fn set_half_size(&mut self, half_size: f32) {
        self.half_size = half_size;
    }

    /// Starts a new stroke at `location` and returns its index.
    pub fn begin_stroke(&mut self, location: Vec2, color: Vec4) -> usize {
        let positions = quad(location, self.half_size);
        let first_vertex = self.vertices.len();

        self.strokes.push(Stroke {
            color,
            vertex_count: VERTICES_PER_QUAD,
            positions: positions.to_vec(),
        });
        self.colors.push(color);
        self.vertex_counts.push(VERTICES_PER_QUAD);
        self.vertices.extend_from_slice(&positions);

        let stroke = self.strokes.len() - 1;
        self.mark_stroke(stroke);
        self.mark_vertices(first_vertex..self.vertices.len());
        stroke
    }

    /// Adds a point to the stroke being drawn. Starts one with `color` if the
    /// canvas is empty.
    pub fn extend_stroke(&mut self, location: Vec2, color: Vec4) {
        if self.strokes.is_empty() {
            self.begin_stroke(location, color);
            return;
        }

        let positions = quad(location, self.half_size);
        let first_vertex = self.vertices.len();
        let stroke = self.strokes.len() - 1;

        let last = &mut self.strokes[stroke];
        last.positions.extend_from_slice(&positions);
        last.vertex_count += VERTICES_PER_QUAD;
        self.vertex_counts[stroke] = last.vertex_count;
        self.vertices.extend_from_slice(&positions);

        self.mark_stroke(stroke);
        self.mark_vertices(first_vertex..self.vertices.len());
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.colors.clear();
        self.vertex_counts.clear();
        self.vertices.clear();
        self.dirty = DirtyRanges {
            reset: true,
            ..Default::default()
        };
    }

    /// Returns what changed since the previous call and forgets it.
    pub fn take_dirty(&mut self) -> DirtyRanges {
        std::mem::take(&mut self.dirty)
    }

    /// Forces the next upload to rewrite everything, e.g. after the GPU
    /// buffers were recreated.
    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyRanges {
            strokes: (!self.strokes.is_empty()).then(|| 0..self.strokes.len()),
            vertices: (!self.vertices.is_empty()).then(|| 0..self.vertices.len()),
            reset: true,
        };
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn vertex_counts(&self) -> &[u32] {
        &self.vertex_counts
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn stroke_count(&self) -> u32 {
        self.strokes.len() as u32
    }

    pub fn total_vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn mark_stroke(&mut self, stroke: usize) {
        self.dirty.strokes = Some(union(self.dirty.strokes.take(), stroke..stroke + 1));
    }

    fn mark_vertices(&mut self, range: Range<usize>) {
        self.dirty.vertices = Some(union(self.dirty.vertices.take(), range));
    }
}

fn union(current: Option<Range<usize>>, range: Range<usize>) -> Range<usize> {
    match current {
        Some(current) => current.start.min(range.start)..current.end.max(range.end),
        None => range,
    }
}

/// The two triangles covering the square centered on `location`.
pub fn quad(location: Vec2, half_size: f32) -> [Vec2; VERTICES_PER_QUAD as usize] {
    let top_left = vec2(location.x - half_size, location.y + half_size);
    let bottom_left = vec2(location.x - half_size, location.y - half_size);
    let top_right = vec2(location.x + half_size, location.y + half_size);
    let bottom_right = vec2(location.x + half_size, location.y - half_size);

    [
        top_left,
        bottom_left,
        bottom_right,
        top_left,
        bottom_right,
        top_right,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec4;
    use pretty_assertions::assert_eq;

    fn red() -> Vec4 {
        vec4(1.0, 0.0, 0.0, 0.5)
    }

    fn blue() -> Vec4 {
        vec4(0.0, 0.0, 1.0, 0.5)
    }

    #[test]
    fn quad_vertex_order() {
        let positions = quad(vec2(10.0, 20.0), 2.0);
        assert_eq!(
            positions,
            [
                vec2(8.0, 22.0),
                vec2(8.0, 18.0),
                vec2(12.0, 18.0),
                vec2(8.0, 22.0),
                vec2(12.0, 18.0),
                vec2(12.0, 22.0),
            ]
        );
    }

    #[test]
    fn begin_stroke_appends_one_quad() {
        let mut canvas = StrokeCanvas::new(1.0);
        let index = canvas.begin_stroke(vec2(5.0, 5.0), red());

        assert_eq!(index, 0);
        assert_eq!(canvas.stroke_count(), 1);
        assert_eq!(canvas.total_vertex_count(), 6);
        assert_eq!(canvas.colors(), &[red()]);
        assert_eq!(canvas.vertex_counts(), &[6]);
        assert_eq!(canvas.vertices(), &quad(vec2(5.0, 5.0), 1.0));
    }

    #[test]
    fn extend_stroke_grows_last_stroke() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(0.0, 0.0), red());
        canvas.begin_stroke(vec2(50.0, 50.0), blue());
        canvas.extend_stroke(vec2(51.0, 50.0), blue());
        canvas.extend_stroke(vec2(52.0, 50.0), blue());

        assert_eq!(canvas.vertex_counts(), &[6, 18]);
        assert_eq!(canvas.colors(), &[red(), blue()]);
        assert_eq!(canvas.strokes()[1].positions.len(), 18);
        assert_eq!(canvas.strokes()[1].vertex_count, 18);
        assert_eq!(canvas.total_vertex_count(), 24);
        assert_eq!(&canvas.vertices()[18..], &quad(vec2(52.0, 50.0), 1.0));
    }

    #[test]
    fn vertex_counts_sum_to_total() {
        let mut canvas = StrokeCanvas::new(1.5);
        for stroke in 0..4 {
            canvas.begin_stroke(vec2(stroke as f32, 0.0), red());
            for point in 0..stroke {
                canvas.extend_stroke(vec2(stroke as f32, point as f32), red());
            }
        }

        let sum: u32 = canvas.vertex_counts().iter().sum();
        assert_eq!(sum, canvas.total_vertex_count());
        assert!(canvas
            .vertex_counts()
            .iter()
            .all(|count| count % VERTICES_PER_QUAD == 0));
    }

    #[test]
    fn flat_vertices_follow_stroke_order() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(0.0, 0.0), red());
        canvas.extend_stroke(vec2(1.0, 0.0), red());
        canvas.begin_stroke(vec2(9.0, 9.0), blue());

        let concatenated: Vec<Vec2> = canvas
            .strokes()
            .iter()
            .flat_map(|stroke| stroke.positions.iter().copied())
            .collect();
        assert_eq!(canvas.vertices(), concatenated.as_slice());

        for vertex in 0..canvas.total_vertex_count() {
            let stroke = shared::stroke_index_for_vertex(
                vertex,
                canvas.stroke_count(),
                canvas.vertex_counts(),
            );
            let expected = if vertex < 12 { 0 } else { 1 };
            assert_eq!(stroke, expected, "vertex {}", vertex);
        }
    }

    #[test]
    fn extend_without_stroke_begins_one() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.extend_stroke(vec2(3.0, 3.0), blue());
        assert_eq!(canvas.stroke_count(), 1);
        assert_eq!(canvas.colors(), &[blue()]);
    }

    #[test]
    fn dirty_ranges_accumulate_until_taken() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(0.0, 0.0), red());
        canvas.extend_stroke(vec2(1.0, 0.0), red());
        canvas.begin_stroke(vec2(5.0, 5.0), blue());

        assert_eq!(
            canvas.take_dirty(),
            DirtyRanges {
                strokes: Some(0..2),
                vertices: Some(0..18),
                reset: false,
            }
        );
        assert!(canvas.take_dirty().is_empty());

        canvas.extend_stroke(vec2(6.0, 5.0), blue());
        assert_eq!(
            canvas.take_dirty(),
            DirtyRanges {
                strokes: Some(1..2),
                vertices: Some(18..24),
                reset: false,
            }
        );
    }

    #[test]
    fn clear_empties_canvas_and_requests_reset() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(0.0, 0.0), vec4(0.0, 1.0, 0.0, 1.0));
        canvas.clear();

        assert_eq!(canvas.stroke_count(), 0);
        assert_eq!(canvas.total_vertex_count(), 0);
        assert!(canvas.take_dirty().reset);
    }

    #[test]
    fn mark_all_dirty_covers_everything() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(0.0, 0.0), red());
        canvas.begin_stroke(vec2(1.0, 0.0), red());
        canvas.take_dirty();

        canvas.mark_all_dirty();
        assert_eq!(
            canvas.take_dirty(),
            DirtyRanges {
                strokes: Some(0..2),
                vertices: Some(0..12),
                reset: true,
            }
        );
    }
}
