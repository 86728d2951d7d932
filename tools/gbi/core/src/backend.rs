//! What the interpreter hands to a renderer, and the trait it hands it through.
//!
//! Values here are already out of the wire encoding: addresses are physical,
//! fixed-point numbers are `f32`, and anything read from memory is copied.

use crate::error::InterpretError;

bitflags::bitflags! {
    /// Geometry pipeline switches set by `G_GEOMETRYMODE`.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct GeometryMode: u32 {
        const ZBUFFER            = 0x0000_0001;
        const SHADE              = 0x0000_0004;
        const CULL_FRONT         = 0x0000_0200;
        const CULL_BACK          = 0x0000_0400;
        const CULL_BOTH          = Self::CULL_FRONT.bits() | Self::CULL_BACK.bits();
        const FOG                = 0x0001_0000;
        const LIGHTING           = 0x0002_0000;
        const TEXTURE_GEN        = 0x0004_0000;
        const TEXTURE_GEN_LINEAR = 0x0008_0000;
        const SHADING_SMOOTH     = 0x0020_0000;
        const CLIPPING           = 0x0080_0000;

        // bits the format doesn't name still round-trip
        const _ = !0;
    }
}

impl Default for GeometryMode {
    fn default() -> Self {
        Self::empty()
    }
}

/// One entry of the vertex buffer, as stored in memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Vertex {
    pub position: [i16; 3],
    pub flag: u16,
    /// s10.5 texture coordinates.
    pub tex_coord: [i16; 2],
    /// Vertex color, or the normal in its first three bytes when lit.
    pub color: [u8; 4],
}

impl Vertex {
    pub fn from_be_bytes(b: &[u8; 16]) -> Self {
        let i16_at = |i: usize| i16::from_be_bytes([b[i], b[i + 1]]);
        Self {
            position: [i16_at(0), i16_at(2), i16_at(4)],
            flag: u16::from_be_bytes([b[6], b[7]]),
            tex_coord: [i16_at(8), i16_at(10)],
            color: [b[12], b[13], b[14], b[15]],
        }
    }
}

/// Row-major 4x4 matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix(pub [[f32; 4]; 4]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Decodes the s15.16 layout: all sixteen integer halves first, then
    /// all sixteen fraction halves.
    pub fn from_fixed_point(b: &[u8; 64]) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, cell) in m.iter_mut().flatten().enumerate() {
            let int = i16::from_be_bytes([b[i * 2], b[i * 2 + 1]]);
            let frac = u16::from_be_bytes([b[32 + i * 2], b[33 + i * 2]]);
            let fixed = ((int as i32) << 16) | frac as i32;
            *cell = fixed as f32 / 65536.0;
        }
        Matrix(m)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MatrixParams {
    pub projection: bool,
    pub load: bool,
    pub push: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Viewport {
    pub scale: [f32; 3],
    pub translate: [f32; 3],
}

impl Viewport {
    /// Eight s13.2 halves: scale xyz + pad, then translate xyz + pad.
    pub fn from_be_bytes(b: &[u8; 16]) -> Self {
        let at = |i: usize| i16::from_be_bytes([b[i * 2], b[i * 2 + 1]]) as f32 / 4.0;
        Self {
            scale: [at(0), at(1), at(2)],
            translate: [at(4), at(5), at(6)],
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Light {
    pub color: [u8; 3],
    pub color_copy: [u8; 3],
    pub direction: [i8; 3],
}

impl Light {
    pub fn from_be_bytes(b: &[u8; 16]) -> Self {
        Self {
            color: [b[0], b[1], b[2]],
            color_copy: [b[4], b[5], b[6]],
            direction: [b[8] as i8, b[9] as i8, b[10] as i8],
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Screen or texel rectangle in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub ulx: f32,
    pub uly: f32,
    pub lrx: f32,
    pub lry: f32,
}

impl Rect {
    /// From 10.2 fixed-point corners.
    pub fn from_fixed(ulx: u16, uly: u16, lrx: u16, lry: u16) -> Self {
        Self {
            ulx: ulx as f32 / 4.0,
            uly: uly as f32 / 4.0,
            lrx: lrx as f32 / 4.0,
            lry: lry as f32 / 4.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScissorMode {
    NonInterlace,
    EvenInterlace,
    OddInterlace,
    Other(u8),
}

impl From<u8> for ScissorMode {
    fn from(mode: u8) -> Self {
        match mode {
            0 => ScissorMode::NonInterlace,
            2 => ScissorMode::EvenInterlace,
            3 => ScissorMode::OddInterlace,
            other => ScissorMode::Other(other),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba,
    Yuv,
    ColorIndex,
    IntensityAlpha,
    Intensity,
    Other(u8),
}

impl From<u8> for ImageFormat {
    fn from(format: u8) -> Self {
        match format {
            0 => ImageFormat::Rgba,
            1 => ImageFormat::Yuv,
            2 => ImageFormat::ColorIndex,
            3 => ImageFormat::IntensityAlpha,
            4 => ImageFormat::Intensity,
            other => ImageFormat::Other(other),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexelSize {
    Bits4,
    Bits8,
    Bits16,
    Bits32,
}

impl From<u8> for TexelSize {
    fn from(size: u8) -> Self {
        match size & 3 {
            0 => TexelSize::Bits4,
            1 => TexelSize::Bits8,
            2 => TexelSize::Bits16,
            _ => TexelSize::Bits32,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageDesc {
    pub format: ImageFormat,
    pub size: TexelSize,
    pub width: u16,
    pub address: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileAxis {
    pub clamp: bool,
    pub mirror: bool,
    pub mask: u8,
    pub shift: u8,
}

impl TileAxis {
    pub fn new(cm: u8, mask: u8, shift: u8) -> Self {
        Self { mirror: cm & 1 != 0, clamp: cm & 2 != 0, mask, shift }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileDescriptor {
    pub tile: u8,
    pub format: ImageFormat,
    pub size: TexelSize,
    /// Row stride in 64-bit words.
    pub line: u16,
    /// Texture memory address in 64-bit words.
    pub tmem: u16,
    pub palette: u8,
    pub s: TileAxis,
    pub t: TileAxis,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextureState {
    pub scale_s: f32,
    pub scale_t: f32,
    pub level: u8,
    pub tile: u8,
    pub enabled: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CombineMode {
    pub mux0: u32,
    pub mux1: u32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureRect {
    pub rect: Rect,
    pub tile: u8,
    pub s: f32,
    pub t: f32,
    pub dsdx: f32,
    pub dtdy: f32,
    pub flip: bool,
}

/// Receives everything a traversal draws or configures. Every method has
/// an empty default so a renderer only implements what it cares about.
#[allow(unused_variables)]
pub trait Backend {
    fn begin_frame(&mut self) {}
    fn end_frame(&mut self) {}
    /// Traversal stopped with `error`; nothing more arrives this frame.
    fn abort_frame(&mut self, error: &InterpretError) {}

    /// `vertices` replace buffer slots starting at `v0`.
    fn upload_vertices(&mut self, v0: usize, vertices: &[Vertex]) {}
    fn draw_triangle(&mut self, indices: [u8; 3]) {}
    fn set_matrix(&mut self, matrix: &Matrix, params: MatrixParams) {}
    fn pop_matrix(&mut self, count: u32) {}
    fn set_viewport(&mut self, viewport: &Viewport) {}
    fn set_light(&mut self, slot: u8, light: &Light) {}
    fn set_light_count(&mut self, count: u32) {}
    fn set_fog(&mut self, multiplier: i16, offset: i16) {}
    fn set_geometry_mode(&mut self, mode: GeometryMode) {}
    fn set_texture(&mut self, texture: &TextureState) {}

    fn set_other_mode(&mut self, high: u32, low: u32) {}
    fn set_texture_image(&mut self, image: &ImageDesc) {}
    fn set_color_image(&mut self, image: &ImageDesc) {}
    fn set_depth_image(&mut self, address: u32) {}
    fn set_tile(&mut self, tile: &TileDescriptor) {}
    fn set_tile_size(&mut self, tile: u8, rect: Rect) {}
    fn load_block(&mut self, tile: u8, uls: u16, ult: u16, texels: u16, dxt: u16) {}
    fn load_tile(&mut self, tile: u8, rect: Rect) {}
    fn load_tlut(&mut self, tile: u8, count: u16) {}
    fn set_combine(&mut self, combine: CombineMode) {}

    fn set_env_color(&mut self, color: Rgba) {}
    fn set_prim_color(&mut self, color: Rgba, min_lod: u8, lod_frac: u8) {}
    fn set_blend_color(&mut self, color: Rgba) {}
    fn set_fog_color(&mut self, color: Rgba) {}
    fn set_fill_color(&mut self, packed: u32) {}

    fn set_scissor(&mut self, mode: ScissorMode, rect: Rect) {}
    fn fill_rect(&mut self, rect: Rect) {}
    fn texture_rect(&mut self, rect: &TextureRect) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout() {
        let bytes = [
            0xFF, 0xFF, 0x00, 0x10, 0x00, 0x20, // position
            0x00, 0x00, // flag
            0x04, 0x00, 0xFC, 0x00, // st
            0x11, 0x22, 0x33, 0x44, // color
        ];
        assert_eq!(
            Vertex::from_be_bytes(&bytes),
            Vertex { position: [-1, 16, 32], flag: 0, tex_coord: [1024, -1024], color: [0x11, 0x22, 0x33, 0x44] }
        );
    }

    #[test]
    fn fixed_point_identity() {
        let mut bytes = [0u8; 64];
        for i in 0..4 {
            // integer half of m[i][i]
            bytes[(i * 4 + i) * 2 + 1] = 1;
        }
        assert_eq!(Matrix::from_fixed_point(&bytes), Matrix::IDENTITY);
    }

    #[test]
    fn fixed_point_fractions_and_negatives() {
        let mut bytes = [0u8; 64];
        // m[0][0] = 1.5
        bytes[1] = 1;
        bytes[32] = 0x80;
        // m[0][1] = -0.5: integer -1, fraction 0x8000
        bytes[2] = 0xFF;
        bytes[3] = 0xFF;
        bytes[34] = 0x80;
        let m = Matrix::from_fixed_point(&bytes);
        assert_eq!(m.0[0][0], 1.5);
        assert_eq!(m.0[0][1], -0.5);
    }

    #[test]
    fn viewport_is_quarter_pixels() {
        let mut bytes = [0u8; 16];
        bytes[0..2].copy_from_slice(&640i16.to_be_bytes());
        bytes[2..4].copy_from_slice(&480i16.to_be_bytes());
        bytes[8..10].copy_from_slice(&642i16.to_be_bytes());
        let vp = Viewport::from_be_bytes(&bytes);
        assert_eq!(vp.scale, [160.0, 120.0, 0.0]);
        assert_eq!(vp.translate, [160.5, 0.0, 0.0]);
    }

    #[test]
    fn geometry_mode_keeps_unnamed_bits() {
        let mode = GeometryMode::from_bits_retain(0x0100_0001);
        assert!(mode.contains(GeometryMode::ZBUFFER));
        assert_eq!(mode.bits(), 0x0100_0001);
    }

    #[test]
    fn tile_axis_clamp_and_mirror() {
        let axis = TileAxis::new(3, 5, 1);
        assert!(axis.clamp && axis.mirror);
        assert!(!TileAxis::new(0, 0, 0).clamp);
    }
}
