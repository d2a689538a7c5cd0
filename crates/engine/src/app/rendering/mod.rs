mod renderer;

pub use renderer::Renderer;

/// Internal view resolution. Scenes draw in this space; the surface
/// letterboxes it into whatever size the window currently has.
pub const VIEW_WIDTH: u32 = 800;
pub const VIEW_HEIGHT: u32 = 600;
