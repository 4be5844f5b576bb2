use crate::color::{ColorExt, PaletteColor};
use egui::epaint::Shadow;
use egui::{Color32, Stroke, Visuals};
use strum::IntoEnumIterator;
use winit::event::WindowEvent;
use winit::window::Window;

/// What the user picked in the palette window.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub color: PaletteColor,
    pub brightness: f32,
    pub clear_requested: bool,
}

impl Settings {
    pub fn new(brightness: f32) -> Self {
        Settings {
            color: PaletteColor::Black,
            brightness,
            clear_requested: false,
        }
    }
}

/// Numbers shown at the bottom of the palette window.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Stats {
    pub strokes: u32,
    pub vertices: u32,
    pub stroke_capacity: usize,
    pub vertex_capacity: usize,
}

pub struct UserInterface {
    egui: egui::Context,
    egui_state: egui_winit::State,
    clipped_meshes: Vec<egui::ClippedMesh>,
    textures_delta: egui::TexturesDelta,
    settings: Settings,
    display_palette: bool,
    display_profiler: bool,
}

impl UserInterface {
    pub fn new(window: &Window, max_texture_side: usize, brightness: f32) -> Self {
        let egui = egui::Context::default();
        let egui_state = egui_winit::State::new(max_texture_side, window);
        let mut visuals = Visuals::light();
        visuals.window_shadow = Shadow {
            extrusion: 0.0,
            color: Default::default(),
        };
        egui.set_visuals(visuals);

        UserInterface {
            egui,
            egui_state,
            clipped_meshes: vec![],
            textures_delta: Default::default(),
            settings: Settings::new(brightness),
            display_palette: true,
            display_profiler: false,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn on_event(&mut self, window_event: &WindowEvent) -> bool {
        self.egui_state.on_event(&self.egui, window_event)
    }

    pub fn update(&mut self, window: &Window, stats: &Stats) {
        puffin::profile_function!();
        self.egui
            .begin_frame(self.egui_state.take_egui_input(window));

        if self.display_profiler {
            self.display_profiler = puffin_egui::profiler_window(&self.egui);
        }
        if self.display_palette {
            draw_palette(&self.egui, &mut self.settings, stats);
        }

        let output = self.egui.end_frame();
        self.egui_state
            .handle_platform_output(window, &self.egui, output.platform_output);
        self.clipped_meshes = self.egui.tessellate(output.shapes);
        self.textures_delta = output.textures_delta;
    }

    pub fn clipped_meshes(&self) -> &[egui::ClippedMesh] {
        &self.clipped_meshes
    }

    pub fn textures_delta(&self) -> &egui::TexturesDelta {
        &self.textures_delta
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the pending "Clear" press and resets it.
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.settings.clear_requested)
    }

    pub fn wants_pointer_input(&self) -> bool {
        self.egui.wants_pointer_input() || self.egui.is_pointer_over_area()
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.egui.pixels_per_point()
    }

    pub fn toggle_palette(&mut self) {
        self.display_palette = !self.display_palette;
    }

    pub fn toggle_profiler(&mut self) {
        self.display_profiler = !self.display_profiler;
        puffin::set_scopes_on(self.display_profiler);
    }
}

pub fn draw_palette(ctx: &egui::Context, settings: &mut Settings, stats: &Stats) {
    egui::Window::new("Palette")
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for color in PaletteColor::iter() {
                    let selected = settings.color == color;
                    let outline = if selected {
                        Stroke::new(2.0, Color32::RED)
                    } else {
                        Stroke::new(1.0, Color32::GRAY)
                    };
                    let button = egui::Button::new("    ")
                        .fill(color.rgba().to_color32())
                        .stroke(outline);
                    if ui.add(button).on_hover_text(color.to_string()).clicked() {
                        log::debug!("Selected {}", color);
                        settings.color = color;
                    }
                }
            });
            ui.separator();
            ui.add(egui::Slider::new(&mut settings.brightness, 0.0..=1.0).text("Brightness"));
            if ui.button("Clear").clicked() {
                settings.clear_requested = true;
            }
            ui.separator();
            ui.label(format!(
                "{} strokes, {} vertices",
                stats.strokes, stats.vertices
            ));
            ui.label(format!(
                "capacity: {} strokes, {} vertices",
                stats.stroke_capacity, stats.vertex_capacity
            ));
            ui.small("F1 palette, F2 profiler");
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn palette_renders_without_touching_settings() {
        let ctx = egui::Context::default();
        let mut settings = Settings::new(0.5);
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            draw_palette(ctx, &mut settings, &Stats::default())
        });

        assert!(!output.shapes.is_empty());
        assert_eq!(settings, Settings::new(0.5));
    }

    #[test]
    fn default_color_is_black() {
        assert_eq!(Settings::new(1.0).color, PaletteColor::Black);
    }
}
