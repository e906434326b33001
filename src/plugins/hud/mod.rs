//! On-screen text.
//! Labels are positioned in "aspect" space, where y spans [-1, 1] bottom to top and x spans [-aspect, aspect].

mod font;

use glam::Vec2;
use crate::{AppBuilder, Color, Plugin};

/// Adds an empty [`Hud`].
pub struct HudPlugin;
impl Plugin for HudPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder.game().init(|_| Hud::default());
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A line of text drawn over the 3D scene.
#[derive(Clone, PartialEq, Debug)]
pub struct TextLabel {
    pub text: String,
    /// Left end of the baseline when left aligned.
    pub position: Vec2,
    /// Height of a line of text.
    pub scale: f32,
    pub color: Color,
    pub align: TextAlign,
}

impl TextLabel {

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: Vec2::ZERO,
            scale: 0.07,
            color: Color::WHITE,
            align: TextAlign::Left,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Width of the text in aspect space.
    pub fn width(&self) -> f32 {
        self.text.chars().count() as f32 * font::CELL_WIDTH as f32 * self.pixel_size()
    }

    fn pixel_size(&self) -> f32 {
        self.scale / font::CELL_HEIGHT as f32
    }

    /// Appends one quad per lit font pixel, in normalized device coordinates.
    pub fn layout(&self, aspect: f32, quads: &mut Vec<HudQuad>) {
        let pixel = self.pixel_size();
        let start_x = match self.align {
            TextAlign::Left => self.position.x,
            TextAlign::Center => self.position.x - self.width() / 2.0,
            TextAlign::Right => self.position.x - self.width(),
        };
        let aspect = aspect.max(f32::EPSILON);
        for (i, c) in self.text.chars().enumerate() {
            let cell_x = start_x + (i as u32 * font::CELL_WIDTH) as f32 * pixel;
            for (col, row) in font::lit_pixels(c) {
                let x = cell_x + col as f32 * pixel;
                let y = self.position.y + (font::GLYPH_HEIGHT - 1 - row) as f32 * pixel;
                quads.push(HudQuad {
                    min: Vec2::new(x / aspect, y),
                    max: Vec2::new((x + pixel) / aspect, y + pixel),
                    color: self.color,
                });
            }
        }
    }
}

/// A solid rectangle in normalized device coordinates.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct HudQuad {
    pub min: Vec2,
    pub max: Vec2,
    pub color: Color,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LabelId(usize);

/// All labels currently on screen.
#[derive(Default)]
pub struct Hud {
    labels: Vec<TextLabel>,
}

impl Hud {

    pub fn add(&mut self, label: TextLabel) -> LabelId {
        self.labels.push(label);
        LabelId(self.labels.len() - 1)
    }

    pub fn label(&self, id: LabelId) -> Option<&TextLabel> {
        self.labels.get(id.0)
    }

    /// Replaces the text of a label. Does nothing if the label does not exist.
    pub fn set_text(&mut self, id: LabelId, text: impl Into<String>) {
        match self.labels.get_mut(id.0) {
            Some(label) => label.text = text.into(),
            None => log::warn!("No such label {id:?}"),
        }
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    /// Quads for every label, for a surface with the aspect ratio specified (width / height).
    pub fn quads(&self, aspect: f32) -> Vec<HudQuad> {
        let mut quads = Vec::new();
        for label in &self.labels {
            label.layout(aspect, &mut quads);
        }
        quads
    }
}
