//! Data shared between the host application and the shaders.
//!
//! This crate is compiled twice: once for the host, where the vector types
//! come from `glam` and the GPU structs are `bytemuck::Pod`, and once for the
//! `spirv` target, where the same names resolve to `spirv_std::glam`. Both
//! builds see the same buffer binding numbers.

#![cfg_attr(target_arch = "spirv", no_std)]

#[cfg(target_arch = "spirv")]
pub use spirv_std::glam;

#[cfg(not(target_arch = "spirv"))]
pub use glam;

use glam::{vec2, vec4, Vec2, Vec4};

/// Descriptor binding number inside set 0.
pub type BufferSlot = u32;

pub const STROKE_COUNT_BUFFER_ID: BufferSlot = 0;
pub const COLOR_BUFFER_ID: BufferSlot = 1;
pub const VERTEX_COUNT_BUFFER_ID: BufferSlot = 2;
pub const VERTICES_BUFFER_ID: BufferSlot = 3;
pub const BRIGHTNESS_BUFFER_ID: BufferSlot = 4;

/// Number of vertices emitted for every sampled point of a stroke.
pub const VERTICES_PER_QUAD: u32 = 6;

#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, Hash))]
#[repr(u32)]
pub enum BufferId {
    StrokeCount = STROKE_COUNT_BUFFER_ID,
    Color = COLOR_BUFFER_ID,
    VertexCount = VERTEX_COUNT_BUFFER_ID,
    Vertices = VERTICES_BUFFER_ID,
    Brightness = BRIGHTNESS_BUFFER_ID,
}

impl BufferId {
    pub const ALL: [BufferId; 5] = [
        BufferId::StrokeCount,
        BufferId::Color,
        BufferId::VertexCount,
        BufferId::Vertices,
        BufferId::Brightness,
    ];

    #[inline]
    pub const fn binding(self) -> BufferSlot {
        self as BufferSlot
    }
}

/// Uniform block holding the number of strokes stored in the color and
/// vertex count buffers.
#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
#[repr(C)]
pub struct StrokeCount {
    pub count: u32,
    // Scalars, not an array: uniform arrays need a 16 byte stride.
    pub _padding0: u32,
    pub _padding1: u32,
    pub _padding2: u32,
}

impl StrokeCount {
    pub fn new(count: u32) -> Self {
        StrokeCount {
            count,
            _padding0: 0,
            _padding1: 0,
            _padding2: 0,
        }
    }
}

/// Uniform block holding how much of a color's brightness is kept when
/// strokes are blended.
#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
#[repr(C)]
pub struct Brightness {
    pub percentage: f32,
    pub _padding0: f32,
    pub _padding1: f32,
    pub _padding2: f32,
}

impl Brightness {
    pub fn new(percentage: f32) -> Self {
        Brightness {
            percentage,
            _padding0: 0.0,
            _padding1: 0.0,
            _padding2: 0.0,
        }
    }
}

#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
#[repr(C)]
pub struct ViewportConstants {
    pub viewport_size: Vec2,
}

#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
#[repr(C)]
pub struct UiConstants {
    pub screen_size: Vec2,
}

#[cfg(not(target_arch = "spirv"))]
mod pod {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    unsafe impl Zeroable for StrokeCount {}
    unsafe impl Pod for StrokeCount {}
    unsafe impl Zeroable for Brightness {}
    unsafe impl Pod for Brightness {}
    unsafe impl Zeroable for ViewportConstants {}
    unsafe impl Pod for ViewportConstants {}
    unsafe impl Zeroable for UiConstants {}
    unsafe impl Pod for UiConstants {}
}

/// Finds the stroke that owns the flat vertex `vertex_index`.
///
/// Strokes are laid out back to back in the vertices buffer, so the owner is
/// the first stroke whose running vertex total passes `vertex_index`. Indices
/// past the end belong to the last stroke.
pub fn stroke_index_for_vertex(vertex_index: u32, stroke_count: u32, vertex_counts: &[u32]) -> u32 {
    let stroke_count = stroke_count.min(vertex_counts.len() as u32);
    let mut first_vertex: u32 = 0;
    let mut stroke = 0;
    while stroke < stroke_count {
        let end = first_vertex.saturating_add(vertex_counts[stroke as usize]);
        if vertex_index < end {
            return stroke;
        }
        first_vertex = end;
        stroke += 1;
    }

    if stroke_count == 0 {
        0
    } else {
        stroke_count - 1
    }
}

/// Maps a pixel position (origin top-left, y down) to clip space.
pub fn pixel_to_clip(position: Vec2, viewport_size: Vec2) -> Vec4 {
    let clip = vec2(
        2.0 * position.x / viewport_size.x - 1.0,
        2.0 * position.y / viewport_size.y - 1.0,
    );
    vec4(clip.x, clip.y, 0.0, 1.0)
}

/// Keeps `brightness` of the color's RGB, leaving alpha alone.
pub fn apply_brightness(color: Vec4, brightness: f32) -> Vec4 {
    let brightness = brightness.clamp(0.0, 1.0);
    vec4(
        color.x * brightness,
        color.y * brightness,
        color.z * brightness,
        color.w,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::mem::size_of;

    #[test]
    fn buffer_ids_have_fixed_values() {
        assert_eq!(STROKE_COUNT_BUFFER_ID, 0);
        assert_eq!(COLOR_BUFFER_ID, 1);
        assert_eq!(VERTEX_COUNT_BUFFER_ID, 2);
        assert_eq!(VERTICES_BUFFER_ID, 3);
        assert_eq!(BRIGHTNESS_BUFFER_ID, 4);
    }

    #[test]
    fn buffer_ids_are_distinct() {
        let bindings: HashSet<_> = BufferId::ALL.iter().map(|id| id.binding()).collect();
        assert_eq!(bindings.len(), BufferId::ALL.len());
    }

    #[test]
    fn enum_matches_constants() {
        assert_eq!(
            BufferId::ALL.map(BufferId::binding),
            [
                STROKE_COUNT_BUFFER_ID,
                COLOR_BUFFER_ID,
                VERTEX_COUNT_BUFFER_ID,
                VERTICES_BUFFER_ID,
                BRIGHTNESS_BUFFER_ID,
            ]
        );
    }

    #[test]
    fn uniform_blocks_are_16_bytes() {
        assert_eq!(size_of::<StrokeCount>(), 16);
        assert_eq!(size_of::<Brightness>(), 16);
        assert_eq!(size_of::<ViewportConstants>(), 8);
        assert_eq!(size_of::<UiConstants>(), 8);
    }

    #[test]
    fn uniform_blocks_zero_their_padding() {
        let count = StrokeCount::new(7);
        let bytes = bytemuck::bytes_of(&count);
        assert_eq!(&bytes[..4], &7u32.to_ne_bytes());
        assert!(bytes[4..].iter().all(|&byte| byte == 0));

        let brightness = Brightness::new(1.0);
        let bytes = bytemuck::bytes_of(&brightness);
        assert_eq!(&bytes[..4], &1.0f32.to_ne_bytes());
        assert!(bytes[4..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn vertex_lookup_tolerates_short_count_buffers() {
        assert_eq!(stroke_index_for_vertex(20, 5, &[6, 6]), 1);
        assert_eq!(stroke_index_for_vertex(3, 4, &[]), 0);
    }

    #[test]
    fn vertex_lookup_saturates_huge_counts() {
        assert_eq!(stroke_index_for_vertex(u32::MAX - 1, 2, &[u32::MAX, 6]), 0);
        assert_eq!(stroke_index_for_vertex(u32::MAX, 2, &[u32::MAX, 6]), 1);
    }

    #[test]
    fn vertex_lookup_walks_stroke_boundaries() {
        let counts = [6, 12, 6];
        assert_eq!(stroke_index_for_vertex(0, 3, &counts), 0);
        assert_eq!(stroke_index_for_vertex(5, 3, &counts), 0);
        assert_eq!(stroke_index_for_vertex(6, 3, &counts), 1);
        assert_eq!(stroke_index_for_vertex(17, 3, &counts), 1);
        assert_eq!(stroke_index_for_vertex(18, 3, &counts), 2);
        assert_eq!(stroke_index_for_vertex(23, 3, &counts), 2);
    }

    #[test]
    fn vertex_lookup_clamps_to_last_stroke() {
        let counts = [6, 6];
        assert_eq!(stroke_index_for_vertex(40, 2, &counts), 1);
        assert_eq!(stroke_index_for_vertex(3, 0, &[]), 0);
    }

    #[test]
    fn vertex_lookup_ignores_counts_past_stroke_count() {
        let counts = [6, 6, 6, 6];
        assert_eq!(stroke_index_for_vertex(13, 2, &counts), 1);
    }

    #[test]
    fn pixel_corners_map_to_clip_corners() {
        let viewport = vec2(800.0, 600.0);
        assert_eq!(pixel_to_clip(vec2(0.0, 0.0), viewport), vec4(-1.0, -1.0, 0.0, 1.0));
        assert_eq!(pixel_to_clip(vec2(800.0, 600.0), viewport), vec4(1.0, 1.0, 0.0, 1.0));
        assert_eq!(pixel_to_clip(vec2(400.0, 300.0), viewport), vec4(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn brightness_scales_rgb_only() {
        let color = vec4(1.0, 0.5, 0.25, 0.5);
        assert_eq!(apply_brightness(color, 0.5), vec4(0.5, 0.25, 0.125, 0.5));
        assert_eq!(apply_brightness(color, 1.0), color);
    }

    #[test]
    fn brightness_is_clamped() {
        let color = vec4(0.2, 0.4, 0.6, 1.0);
        assert_eq!(apply_brightness(color, 3.0), color);
        assert_eq!(apply_brightness(color, -1.0), vec4(0.0, 0.0, 0.0, 1.0));
    }
}
