use anyhow::Result;

mod animation;
mod assets;
mod camera;
mod catalog;
mod config;
mod engine;
mod interaction;
mod links;
mod materials;
mod math;
mod modal;
mod orbit;
mod pointer;
mod rendering;
mod scene_graph;
mod tween;
mod viewer;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
