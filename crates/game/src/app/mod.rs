mod editor;
mod gameplay;
pub(crate) mod level;

pub(crate) use editor::EditorScene;
pub(crate) use gameplay::PlayScene;
