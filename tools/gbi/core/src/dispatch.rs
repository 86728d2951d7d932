use heapless::Vec;
use log::{debug, trace, warn};
use crate::backend::*;
use crate::gbi::{opcode_name, Command, Gfx, Image, MoveMem, TextureCoords, Tile, MATRIX_SIZE, VERTEX_BUFFER_LEN, VERTEX_SIZE};
use crate::interpreter::FrameStats;
use crate::memory::Memory;
use crate::segments::SegmentTable;

/// State the dispatcher tracks between commands of one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RenderState {
    pub geometry_mode: GeometryMode,
    pub other_mode_h: u32,
    pub other_mode_l: u32,
    pub texture: TextureState,
    /// Model-view matrices pushed and not yet popped.
    pub modelview_depth: u32,
    pub light_count: u32,
    pub persp_norm: u16,
}

impl RenderState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything one ordinary command may touch. Built per command by the
/// traversal loop; holds nothing past the call.
pub(crate) struct Sink<'a, M: Memory + ?Sized, B: Backend + ?Sized> {
    pub state: &'a mut RenderState,
    pub segments: &'a SegmentTable,
    pub memory: &'a M,
    pub backend: &'a mut B,
    pub stats: &'a mut FrameStats,
}

/// Segment lookup that counts and logs fallbacks. Segment 0 is the
/// conventional physical segment and never counts.
pub(crate) fn resolve(segments: &SegmentTable, stats: &mut FrameStats, logical: u32) -> u32 {
    let resolved = segments.lookup(logical);
    if resolved.fallback && resolved.segment != 0 {
        warn!(target: "gbi", "segment {} unset, using {:#010X} as physical", resolved.segment, resolved.address);
        stats.unresolved_segments += 1;
    }
    resolved.address
}

/// Replaces the `len` bits at `shift` with the same bits of `data`.
/// A length of 0 means the whole word; lengths past 32 are cut to 32.
fn merge_other_mode(word: u32, shift: u8, len: u8, data: u32) -> u32 {
    let len = match len {
        0 | 32.. => 32,
        n => n as u32,
    };
    let mask = (u32::MAX >> (32 - len)).checked_shl(shift as u32).unwrap_or(0);
    (word & !mask) | (data & mask)
}

impl<M: Memory + ?Sized, B: Backend + ?Sized> Sink<'_, M, B> {
    fn resolve(&mut self, logical: u32) -> u32 {
        resolve(self.segments, self.stats, logical)
    }

    fn reject(&mut self, address: u32, command: Command, why: &str) {
        warn!(target: "gbi", "{:08X}: rejected {:?}: {}", address, command, why);
        self.stats.rejected += 1;
    }

    fn read<const N: usize>(&self, address: u32) -> Option<[u8; N]> {
        self.memory.bytes(address, N)?.try_into().ok()
    }

    fn image(&mut self, image: Image) -> ImageDesc {
        ImageDesc {
            format: image.format.into(),
            size: image.size.into(),
            width: image.width,
            address: self.resolve(image.address),
        }
    }

    /// `record` is the command plus any trailing words it owns; `address`
    /// is where it was read from, for diagnostics.
    pub fn dispatch(&mut self, gfx: Gfx, record: &[Command], address: u32) {
        let Some(&command) = record.first() else {
            return;
        };

        match gfx {
            // nothing is pipelined, so syncs have nothing to wait for
            Gfx::NoOp | Gfx::Sync(_) => {}

            // the traversal loop consumes these before they get here
            Gfx::EndDisplayList | Gfx::DisplayList { .. } | Gfx::MoveMem(MoveMem::Segment { .. }) => {}

            Gfx::MoveMem(mv) => self.move_mem(mv, command, address),

            Gfx::Vertex { count, v0, address: logical } => {
                if v0 as usize + count as usize > VERTEX_BUFFER_LEN {
                    return self.reject(address, command, "vertex load overruns the buffer");
                }
                let physical = self.resolve(logical);
                let Some(bytes) = self.memory.bytes(physical, count as usize * VERTEX_SIZE as usize) else {
                    return self.reject(address, command, "vertex data out of bounds");
                };

                let vertices: Vec<Vertex, VERTEX_BUFFER_LEN> = bytes
                    .chunks_exact(VERTEX_SIZE as usize)
                    .filter_map(|chunk| chunk.try_into().ok())
                    .map(Vertex::from_be_bytes)
                    .collect();
                self.backend.upload_vertices(v0 as usize, &vertices);
            }
            Gfx::Triangle1(tri) => self.triangle(tri, command, address),
            Gfx::Triangle2(a, b) => {
                self.triangle(a, command, address);
                self.triangle(b, command, address);
            }
            Gfx::Matrix { address: logical, projection, load, push } => {
                let physical = self.resolve(logical);
                let Some(bytes) = self.read::<{ MATRIX_SIZE as usize }>(physical) else {
                    return self.reject(address, command, "matrix out of bounds");
                };
                if push && !projection {
                    self.state.modelview_depth += 1;
                }
                self.backend.set_matrix(&Matrix::from_fixed_point(&bytes), MatrixParams { projection, load, push });
            }
            Gfx::PopMatrix { count } => {
                self.state.modelview_depth = self.state.modelview_depth.saturating_sub(count);
                self.backend.pop_matrix(count);
            }
            Gfx::GeometryMode { keep, set } => {
                // only the low 24 bits can be cleared
                let bits = (self.state.geometry_mode.bits() & (keep | 0xFF00_0000)) | set;
                self.state.geometry_mode = GeometryMode::from_bits_retain(bits);
                self.backend.set_geometry_mode(self.state.geometry_mode);
            }
            Gfx::Texture { scale_s, scale_t, level, tile, on } => {
                self.state.texture = TextureState {
                    scale_s: scale_s as f32 / 65536.0,
                    scale_t: scale_t as f32 / 65536.0,
                    level,
                    tile,
                    enabled: on,
                };
                self.backend.set_texture(&self.state.texture);
            }

            Gfx::SetOtherModeL { shift, len, data } => {
                self.state.other_mode_l = merge_other_mode(self.state.other_mode_l, shift, len, data);
                self.backend.set_other_mode(self.state.other_mode_h, self.state.other_mode_l);
            }
            Gfx::SetOtherModeH { shift, len, data } => {
                self.state.other_mode_h = merge_other_mode(self.state.other_mode_h, shift, len, data);
                self.backend.set_other_mode(self.state.other_mode_h, self.state.other_mode_l);
            }
            Gfx::SetOtherMode { high, low } => {
                self.state.other_mode_h = high;
                self.state.other_mode_l = low;
                self.backend.set_other_mode(high, low);
            }
            Gfx::SetCombine { mux0, mux1 } => self.backend.set_combine(CombineMode { mux0, mux1 }),
            Gfx::SetScissor { mode, ulx, uly, lrx, lry } => {
                self.backend.set_scissor(mode.into(), Rect::from_fixed(ulx, uly, lrx, lry));
            }
            Gfx::FillRectangle { ulx, uly, lrx, lry } => {
                self.backend.fill_rect(Rect::from_fixed(ulx, uly, lrx, lry));
            }
            Gfx::TextureRectangle { tile, ulx, uly, lrx, lry, flip } => {
                let Some(&second) = record.get(1) else {
                    return self.reject(address, command, "texture rectangle is missing its coordinates");
                };
                let coords = TextureCoords::decode(second);
                self.backend.texture_rect(&TextureRect {
                    rect: Rect::from_fixed(ulx, uly, lrx, lry),
                    tile,
                    s: coords.s as f32 / 32.0,
                    t: coords.t as f32 / 32.0,
                    dsdx: coords.dsdx as f32 / 1024.0,
                    dtdy: coords.dtdy as f32 / 1024.0,
                    flip,
                });
            }

            Gfx::SetFillColor(packed) => self.backend.set_fill_color(packed),
            Gfx::SetFogColor(c) => self.backend.set_fog_color(c.into()),
            Gfx::SetBlendColor(c) => self.backend.set_blend_color(c.into()),
            Gfx::SetEnvColor(c) => self.backend.set_env_color(c.into()),
            Gfx::SetPrimColor { min_lod, lod_frac, color } => {
                self.backend.set_prim_color(color.into(), min_lod, lod_frac);
            }

            Gfx::SetTextureImage(image) => {
                let image = self.image(image);
                self.backend.set_texture_image(&image);
            }
            Gfx::SetColorImage(image) => {
                let image = self.image(image);
                self.backend.set_color_image(&image);
            }
            Gfx::SetDepthImage { address: logical } => {
                let physical = self.resolve(logical);
                self.backend.set_depth_image(physical);
            }
            Gfx::SetTile(tile) => self.backend.set_tile(&tile_descriptor(tile)),
            Gfx::SetTileSize(span) => {
                self.backend.set_tile_size(span.tile, Rect::from_fixed(span.uls, span.ult, span.lrs, span.lrt));
            }
            Gfx::LoadTile(span) => {
                self.backend.load_tile(span.tile, Rect::from_fixed(span.uls, span.ult, span.lrs, span.lrt));
            }
            Gfx::LoadBlock { tile, uls, ult, lrs, dxt } => self.backend.load_block(tile, uls, ult, lrs, dxt),
            Gfx::LoadTlut { tile, count } => self.backend.load_tlut(tile, count),

            Gfx::Unsupported(opcode) => {
                debug!(target: "gbi", "{:08X}: {} is not supported, skipping", address, opcode_name(opcode));
                self.stats.unsupported += 1;
            }
            Gfx::Unknown(opcode) => {
                warn!(target: "gbi", "{:08X}: unknown opcode {:02X}", address, opcode);
                self.stats.unknown_opcodes += 1;
            }
        }
    }

    fn triangle(&mut self, tri: [u8; 3], command: Command, address: u32) {
        if tri.iter().any(|&v| v as usize >= VERTEX_BUFFER_LEN) {
            return self.reject(address, command, "triangle index outside the vertex buffer");
        }
        self.backend.draw_triangle(tri);
    }

    fn move_mem(&mut self, mv: MoveMem, command: Command, address: u32) {
        match mv {
            MoveMem::Viewport { address: logical } => {
                let physical = self.resolve(logical);
                match self.read::<16>(physical) {
                    Some(bytes) => self.backend.set_viewport(&Viewport::from_be_bytes(&bytes)),
                    None => self.reject(address, command, "viewport out of bounds"),
                }
            }
            MoveMem::Light { slot, address: logical } => {
                let physical = self.resolve(logical);
                match self.read::<16>(physical) {
                    Some(bytes) => self.backend.set_light(slot, &Light::from_be_bytes(&bytes)),
                    None => self.reject(address, command, "light out of bounds"),
                }
            }
            MoveMem::Fog { multiplier, offset } => self.backend.set_fog(multiplier, offset),
            MoveMem::NumLights(count) => {
                self.state.light_count = count;
                self.backend.set_light_count(count);
            }
            MoveMem::PerspNormalize(scale) => self.state.persp_norm = scale,
            MoveMem::Clip { .. } => {
                trace!(target: "gbi", "{:08X}: clip ratio ignored", address);
            }
            MoveMem::Unknown { index, .. } => {
                warn!(target: "gbi", "{:08X}: unknown G_MOVEMEM index {:02X}", address, index);
                self.stats.unknown_opcodes += 1;
            }
            MoveMem::Segment { .. } => {}
        }
    }
}

fn tile_descriptor(tile: Tile) -> TileDescriptor {
    TileDescriptor {
        tile: tile.tile,
        format: tile.format.into(),
        size: tile.size.into(),
        line: tile.line,
        tmem: tile.tmem,
        palette: tile.palette,
        s: TileAxis::new(tile.cm_s, tile.mask_s, tile.shift_s),
        t: TileAxis::new(tile.cm_t, tile.mask_t, tile.shift_t),
    }
}
