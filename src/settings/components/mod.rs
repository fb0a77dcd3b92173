pub mod general;
pub mod text_color;
