// Engine modules: renderer, audio

pub mod audio;
pub mod renderer;
