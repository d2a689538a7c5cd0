pub(crate) mod atomic_io;
mod library;

pub use library::{AssetError, AssetIndex, SpriteImage, SpriteLibrary};
