use alloc::vec::Vec;
use crate::backend::*;
use crate::error::InterpretError;

/// One call into a [`Backend`], with its arguments copied out.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    BeginFrame,
    EndFrame,
    AbortFrame(InterpretError),

    UploadVertices { v0: usize, vertices: Vec<Vertex> },
    DrawTriangle([u8; 3]),
    SetMatrix(Matrix, MatrixParams),
    PopMatrix(u32),
    SetViewport(Viewport),
    SetLight(u8, Light),
    SetLightCount(u32),
    SetFog { multiplier: i16, offset: i16 },
    SetGeometryMode(GeometryMode),
    SetTexture(TextureState),

    SetOtherMode { high: u32, low: u32 },
    SetTextureImage(ImageDesc),
    SetColorImage(ImageDesc),
    SetDepthImage(u32),
    SetTile(TileDescriptor),
    SetTileSize(u8, Rect),
    LoadBlock { tile: u8, uls: u16, ult: u16, texels: u16, dxt: u16 },
    LoadTile(u8, Rect),
    LoadTlut { tile: u8, count: u16 },
    SetCombine(CombineMode),

    SetEnvColor(Rgba),
    SetPrimColor { color: Rgba, min_lod: u8, lod_frac: u8 },
    SetBlendColor(Rgba),
    SetFogColor(Rgba),
    SetFillColor(u32),

    SetScissor(ScissorMode, Rect),
    FillRect(Rect),
    TextureRect(TextureRect),
}

impl BackendCall {
    pub fn is_frame_marker(&self) -> bool {
        matches!(self, BackendCall::BeginFrame | BackendCall::EndFrame | BackendCall::AbortFrame(_))
    }
}

/// Backend that keeps every call it receives, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls minus the begin/end/abort frame markers.
    pub fn render_calls(&self) -> impl Iterator<Item = &BackendCall> {
        self.calls.iter().filter(|call| !call.is_frame_marker())
    }

    pub fn take(&mut self) -> Vec<BackendCall> {
        core::mem::take(&mut self.calls)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Backend for RecordingBackend {
    fn begin_frame(&mut self) {
        self.calls.push(BackendCall::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.calls.push(BackendCall::EndFrame);
    }

    fn abort_frame(&mut self, error: &InterpretError) {
        self.calls.push(BackendCall::AbortFrame(*error));
    }

    fn upload_vertices(&mut self, v0: usize, vertices: &[Vertex]) {
        self.calls.push(BackendCall::UploadVertices { v0, vertices: vertices.to_vec() });
    }

    fn draw_triangle(&mut self, indices: [u8; 3]) {
        self.calls.push(BackendCall::DrawTriangle(indices));
    }

    fn set_matrix(&mut self, matrix: &Matrix, params: MatrixParams) {
        self.calls.push(BackendCall::SetMatrix(*matrix, params));
    }

    fn pop_matrix(&mut self, count: u32) {
        self.calls.push(BackendCall::PopMatrix(count));
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.calls.push(BackendCall::SetViewport(*viewport));
    }

    fn set_light(&mut self, slot: u8, light: &Light) {
        self.calls.push(BackendCall::SetLight(slot, *light));
    }

    fn set_light_count(&mut self, count: u32) {
        self.calls.push(BackendCall::SetLightCount(count));
    }

    fn set_fog(&mut self, multiplier: i16, offset: i16) {
        self.calls.push(BackendCall::SetFog { multiplier, offset });
    }

    fn set_geometry_mode(&mut self, mode: GeometryMode) {
        self.calls.push(BackendCall::SetGeometryMode(mode));
    }

    fn set_texture(&mut self, texture: &TextureState) {
        self.calls.push(BackendCall::SetTexture(*texture));
    }

    fn set_other_mode(&mut self, high: u32, low: u32) {
        self.calls.push(BackendCall::SetOtherMode { high, low });
    }

    fn set_texture_image(&mut self, image: &ImageDesc) {
        self.calls.push(BackendCall::SetTextureImage(*image));
    }

    fn set_color_image(&mut self, image: &ImageDesc) {
        self.calls.push(BackendCall::SetColorImage(*image));
    }

    fn set_depth_image(&mut self, address: u32) {
        self.calls.push(BackendCall::SetDepthImage(address));
    }

    fn set_tile(&mut self, tile: &TileDescriptor) {
        self.calls.push(BackendCall::SetTile(*tile));
    }

    fn set_tile_size(&mut self, tile: u8, rect: Rect) {
        self.calls.push(BackendCall::SetTileSize(tile, rect));
    }

    fn load_block(&mut self, tile: u8, uls: u16, ult: u16, texels: u16, dxt: u16) {
        self.calls.push(BackendCall::LoadBlock { tile, uls, ult, texels, dxt });
    }

    fn load_tile(&mut self, tile: u8, rect: Rect) {
        self.calls.push(BackendCall::LoadTile(tile, rect));
    }

    fn load_tlut(&mut self, tile: u8, count: u16) {
        self.calls.push(BackendCall::LoadTlut { tile, count });
    }

    fn set_combine(&mut self, combine: CombineMode) {
        self.calls.push(BackendCall::SetCombine(combine));
    }

    fn set_env_color(&mut self, color: Rgba) {
        self.calls.push(BackendCall::SetEnvColor(color));
    }

    fn set_prim_color(&mut self, color: Rgba, min_lod: u8, lod_frac: u8) {
        self.calls.push(BackendCall::SetPrimColor { color, min_lod, lod_frac });
    }

    fn set_blend_color(&mut self, color: Rgba) {
        self.calls.push(BackendCall::SetBlendColor(color));
    }

    fn set_fog_color(&mut self, color: Rgba) {
        self.calls.push(BackendCall::SetFogColor(color));
    }

    fn set_fill_color(&mut self, packed: u32) {
        self.calls.push(BackendCall::SetFillColor(packed));
    }

    fn set_scissor(&mut self, mode: ScissorMode, rect: Rect) {
        self.calls.push(BackendCall::SetScissor(mode, rect));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.calls.push(BackendCall::FillRect(rect));
    }

    fn texture_rect(&mut self, rect: &TextureRect) {
        self.calls.push(BackendCall::TextureRect(*rect));
    }
}
