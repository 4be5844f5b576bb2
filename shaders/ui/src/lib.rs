#![cfg_attr(
    target_arch = "spirv",
    no_std,
    feature(register_attr),
    register_attr(spirv)
)]

#[cfg(not(target_arch = "spirv"))]
use spirv_std::macros::spirv;

use shared::glam::{Vec2, Vec4};
use shared::{pixel_to_clip, UiConstants};
use spirv_std::{image::SampledImage, Image};

/// egui vertices arrive in points; `screen_size` is the framebuffer in points.
#[spirv(vertex)]
pub fn main_vs(
    #[spirv(position)] clip_position: &mut Vec4,
    #[spirv(push_constant)] constants: &UiConstants,
    position: Vec2,
    uv: Vec2,
    color: Vec4,
    out_uv: &mut Vec2,
    out_color: &mut Vec4,
) {
    *clip_position = pixel_to_clip(position, constants.screen_size);
    *out_uv = uv;
    *out_color = color;
}

/// Colors and the font atlas are premultiplied.
#[spirv(fragment)]
pub fn main_fs(
    #[spirv(descriptor_set = 0, binding = 0)] texture: &SampledImage<Image!(2D, type=f32, sampled)>,
    uv: Vec2,
    color: Vec4,
    output: &mut Vec4,
) {
    let texel: Vec4 = unsafe { texture.sample(uv) };
    *output = color * texel;
}
