use std::path::Path;

use anyhow::Context as _;

use crate::{
    compile::{FramePlan, compile_frame, compile_winner_banner},
    error::ReplayResult,
    fonts::{FontSet, FontSources},
    model::{Player, Tick},
    raster::rasterize,
};

/// Rendered RGBA8 frame. Frames are fully opaque, so premultiplied and straight alpha agree.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn save_png(&self, path: &Path) -> ReplayResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Turns ticks into frames. Holds the fonts so they are resolved once per run.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    fonts: FontSet,
}

impl FrameRenderer {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    /// Renderer using the preferred fonts, or the default font if they cannot be loaded.
    pub fn with_font_sources(sources: &FontSources) -> Self {
        Self::new(FontSet::load(sources))
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn render_tick(
        &self,
        tick: &Tick,
        roster: &[Player],
        grid_size: u32,
    ) -> ReplayResult<FrameRGBA> {
        rasterize(&compile_frame(tick, roster, grid_size), &self.fonts)
    }

    /// `tick` with a centered banner naming the winner.
    pub fn render_winner_frame(
        &self,
        tick: &Tick,
        roster: &[Player],
        grid_size: u32,
        winner: &str,
    ) -> ReplayResult<FrameRGBA> {
        let mut plan: FramePlan = compile_frame(tick, roster, grid_size);
        compile_winner_banner(&mut plan, winner, self.fonts.sizes.banner);
        rasterize(&plan, &self.fonts)
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::with_font_sources(&FontSources::default())
    }
}
