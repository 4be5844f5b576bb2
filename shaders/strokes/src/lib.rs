#![cfg_attr(
    target_arch = "spirv",
    no_std,
    feature(register_attr),
    register_attr(spirv)
)]

#[cfg(not(target_arch = "spirv"))]
use spirv_std::macros::spirv;

use shared::glam::{Vec2, Vec4};
use shared::{
    apply_brightness, pixel_to_clip, stroke_index_for_vertex, Brightness, StrokeCount,
    ViewportConstants, BRIGHTNESS_BUFFER_ID, COLOR_BUFFER_ID, STROKE_COUNT_BUFFER_ID,
    VERTEX_COUNT_BUFFER_ID, VERTICES_BUFFER_ID,
};

// `#[spirv(binding = ..)]` only takes literals, so check them against the
// shared table at compile time.
const _: () = assert!(STROKE_COUNT_BUFFER_ID == 0);
const _: () = assert!(COLOR_BUFFER_ID == 1);
const _: () = assert!(VERTEX_COUNT_BUFFER_ID == 2);
const _: () = assert!(VERTICES_BUFFER_ID == 3);
const _: () = assert!(BRIGHTNESS_BUFFER_ID == 4);

#[spirv(vertex)]
pub fn main_vs(
    #[spirv(vertex_index)] vert_id: i32,
    #[spirv(position)] out_pos: &mut Vec4,
    #[spirv(push_constant)] viewport: &ViewportConstants,
    #[spirv(uniform, descriptor_set = 0, binding = 0)] stroke_count: &StrokeCount,
    #[spirv(storage_buffer, descriptor_set = 0, binding = 1)] colors: &[Vec4],
    #[spirv(storage_buffer, descriptor_set = 0, binding = 2)] vertex_counts: &[u32],
    #[spirv(storage_buffer, descriptor_set = 0, binding = 3)] vertices: &[Vec2],
    v_color: &mut Vec4,
) {
    let vertex_index = vert_id as u32;
    let stroke = stroke_index_for_vertex(vertex_index, stroke_count.count, vertex_counts);

    *out_pos = pixel_to_clip(vertices[vertex_index as usize], viewport.viewport_size);
    *v_color = colors[stroke as usize];
}

#[spirv(fragment)]
pub fn main_fs(
    output: &mut Vec4,
    #[spirv(uniform, descriptor_set = 0, binding = 4)] brightness: &Brightness,
    v_color: Vec4,
) {
    *output = apply_brightness(v_color, brightness.percentage);
}
