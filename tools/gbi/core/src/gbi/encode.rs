use alloc::vec::Vec;
use bit_field::BitField;
use crate::gbi::opcodes::*;
use crate::gbi::words::*;
use crate::gbi::Command;

/// Builds display lists one command at a time, the way a game would with
/// the producer-side macros. Coordinates are passed already in their wire
/// fixed-point encoding.
#[derive(Clone, Debug, Default)]
pub struct DisplayListBuilder {
    commands: Vec<Command>,
}

#[inline(always)]
fn op(opcode: u8) -> u32 {
    (opcode as u32) << 24
}

fn with_low24(opcode: u8, operands: u32) -> u32 {
    let mut w0 = op(opcode);
    w0.set_bits(0..24, operands.get_bits(0..24));
    w0
}

fn coords(x: u16, y: u16) -> CoordWord {
    let mut word = CoordWord::from(0);
    word.set_x(x);
    word.set_y(y);
    word
}

fn triangle(v0: u8, v1: u8, v2: u8) -> u32 {
    let mut tri = TriangleWord::from(0);
    tri.set_v0(v0.wrapping_mul(2));
    tri.set_v1(v1.wrapping_mul(2));
    tri.set_v2(v2.wrapping_mul(2));
    tri.into()
}

fn rgba(color: [u8; 4]) -> u32 {
    u32::from_be_bytes(color)
}

impl DisplayListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn build(self) -> Vec<Command> {
        self.commands
    }

    /// Big-endian image of the list, ready to be copied into memory.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.commands.iter().flat_map(|c| c.to_be_bytes()).collect()
    }

    pub fn raw(&mut self, w0: u32, w1: u32) -> &mut Self {
        self.commands.push(Command::new(w0, w1));
        self
    }

    fn push(&mut self, w0: u32, w1: u32) -> &mut Self {
        self.raw(w0, w1)
    }

    fn move_mem(&mut self, index: u8, offset: u8, payload: u32) -> &mut Self {
        let mut word = MoveMemWord::from(op(G_MOVEMEM));
        word.set_index(index);
        word.set_offset(offset);
        self.push(word.into(), payload)
    }

    // control flow

    pub fn no_op(&mut self) -> &mut Self {
        self.push(op(G_SPNOOP), 0)
    }

    pub fn rdp_no_op(&mut self) -> &mut Self {
        self.push(op(G_NOOP), 0)
    }

    pub fn display_list(&mut self, address: u32) -> &mut Self {
        let mut word = DisplayListWord::from(op(G_DL));
        word.set_flag(G_DL_PUSH);
        self.push(word.into(), address)
    }

    pub fn branch_list(&mut self, address: u32) -> &mut Self {
        let mut word = DisplayListWord::from(op(G_DL));
        word.set_flag(G_DL_NOPUSH);
        self.push(word.into(), address)
    }

    pub fn end_display_list(&mut self) -> &mut Self {
        self.push(op(G_ENDDL), 0)
    }

    pub fn segment(&mut self, id: u8, base: u32) -> &mut Self {
        self.move_mem(G_MW_SEGMENT, (id & 0xF) * 4, base)
    }

    // geometry

    pub fn vertex(&mut self, address: u32, count: u8, v0: u8) -> &mut Self {
        let mut word = VertexWord::from(op(G_VTX));
        word.set_count(count);
        word.set_end(v0.wrapping_add(count));
        self.push(word.into(), address)
    }

    pub fn triangle(&mut self, v0: u8, v1: u8, v2: u8) -> &mut Self {
        self.push(op(G_TRI1) | triangle(v0, v1, v2), 0)
    }

    pub fn triangles(&mut self, a: [u8; 3], b: [u8; 3]) -> &mut Self {
        self.push(op(G_TRI2) | triangle(a[0], a[1], a[2]), triangle(b[0], b[1], b[2]))
    }

    /// `params` is the producer's `G_MTX_*` combination.
    pub fn matrix(&mut self, address: u32, params: u8) -> &mut Self {
        let mut word = MatrixWord::from(op(G_MTX));
        word.set_params(params ^ G_MTX_PUSH);
        self.push(word.into(), address)
    }

    pub fn pop_matrix(&mut self, count: u32) -> &mut Self {
        self.push(op(G_POPMTX), count * MATRIX_SIZE)
    }

    pub fn geometry_mode(&mut self, clear: u32, set: u32) -> &mut Self {
        self.push(with_low24(G_GEOMETRYMODE, !clear), set)
    }

    pub fn set_geometry_mode(&mut self, mode: u32) -> &mut Self {
        self.geometry_mode(0, mode)
    }

    pub fn clear_geometry_mode(&mut self, mode: u32) -> &mut Self {
        self.geometry_mode(mode, 0)
    }

    pub fn texture(&mut self, scale_s: u16, scale_t: u16, level: u8, tile: u8, on: bool) -> &mut Self {
        let mut word = TextureWord::from(op(G_TEXTURE));
        word.set_level(level);
        word.set_tile(tile);
        word.set_on(on as u8);
        let mut scale = HalfWords::from(0);
        scale.set_hi(scale_s);
        scale.set_lo(scale_t);
        self.push(word.into(), scale.into())
    }

    pub fn viewport(&mut self, address: u32) -> &mut Self {
        self.move_mem(G_MV_VIEWPORT, 0, address)
    }

    /// `slot` counts from zero.
    pub fn light(&mut self, address: u32, slot: u8) -> &mut Self {
        self.move_mem(G_MV_L0 + (slot & 7) * 2, 0, address)
    }

    pub fn num_lights(&mut self, count: u32) -> &mut Self {
        self.move_mem(G_MW_NUMLIGHT, 0, count)
    }

    pub fn fog(&mut self, multiplier: i16, offset: i16) -> &mut Self {
        let mut fog = HalfWords::from(0);
        fog.set_hi(multiplier as u16);
        fog.set_lo(offset as u16);
        self.move_mem(G_MW_FOG, 0, fog.into())
    }

    pub fn persp_normalize(&mut self, scale: u16) -> &mut Self {
        self.move_mem(G_MW_PERSPNORM, 0, scale as u32)
    }

    pub fn clip_ratio(&mut self, offset: u8, value: u32) -> &mut Self {
        self.move_mem(G_MW_CLIP, offset, value)
    }

    // rasterizer state

    pub fn load_sync(&mut self) -> &mut Self {
        self.push(op(G_RDPLOADSYNC), 0)
    }

    pub fn pipe_sync(&mut self) -> &mut Self {
        self.push(op(G_RDPPIPESYNC), 0)
    }

    pub fn tile_sync(&mut self) -> &mut Self {
        self.push(op(G_RDPTILESYNC), 0)
    }

    pub fn full_sync(&mut self) -> &mut Self {
        self.push(op(G_RDPFULLSYNC), 0)
    }

    pub fn set_other_mode_l(&mut self, shift: u8, len: u8, data: u32) -> &mut Self {
        let mut word = OtherModeWord::from(op(G_SETOTHERMODE_L));
        word.set_shift(shift);
        word.set_len(len);
        self.push(word.into(), data)
    }

    pub fn set_other_mode_h(&mut self, shift: u8, len: u8, data: u32) -> &mut Self {
        let mut word = OtherModeWord::from(op(G_SETOTHERMODE_H));
        word.set_shift(shift);
        word.set_len(len);
        self.push(word.into(), data)
    }

    pub fn set_other_mode(&mut self, high: u32, low: u32) -> &mut Self {
        self.push(with_low24(G_RDPSETOTHERMODE, high), low)
    }

    pub fn set_combine(&mut self, mux0: u32, mux1: u32) -> &mut Self {
        self.push(with_low24(G_SETCOMBINE, mux0), mux1)
    }

    pub fn set_scissor(&mut self, mode: u8, ulx: u16, uly: u16, lrx: u16, lry: u16) -> &mut Self {
        let mut lr = coords(lrx, lry);
        lr.set_mode(mode);
        self.push(op(G_SETSCISSOR) | u32::from(coords(ulx, uly)), lr.into())
    }

    pub fn fill_rectangle(&mut self, ulx: u16, uly: u16, lrx: u16, lry: u16) -> &mut Self {
        self.push(op(G_FILLRECT) | u32::from(coords(lrx, lry)), coords(ulx, uly).into())
    }

    pub fn texture_rectangle(
        &mut self,
        tile: u8,
        (ulx, uly): (u16, u16),
        (lrx, lry): (u16, u16),
        (s, t): (i16, i16),
        (dsdx, dtdy): (i16, i16),
    ) -> &mut Self {
        self.texture_rectangle_op(G_TEXRECT, tile, (ulx, uly), (lrx, lry), (s, t), (dsdx, dtdy))
    }

    pub fn texture_rectangle_flip(
        &mut self,
        tile: u8,
        (ulx, uly): (u16, u16),
        (lrx, lry): (u16, u16),
        (s, t): (i16, i16),
        (dsdx, dtdy): (i16, i16),
    ) -> &mut Self {
        self.texture_rectangle_op(G_TEXRECTFLIP, tile, (ulx, uly), (lrx, lry), (s, t), (dsdx, dtdy))
    }

    fn texture_rectangle_op(
        &mut self,
        opcode: u8,
        tile: u8,
        (ulx, uly): (u16, u16),
        (lrx, lry): (u16, u16),
        (s, t): (i16, i16),
        (dsdx, dtdy): (i16, i16),
    ) -> &mut Self {
        let mut ul = coords(ulx, uly);
        ul.set_tile(tile);
        self.push(op(opcode) | u32::from(coords(lrx, lry)), ul.into());

        let mut st = HalfWords::from(0);
        st.set_hi(s as u16);
        st.set_lo(t as u16);
        let mut steps = HalfWords::from(0);
        steps.set_hi(dsdx as u16);
        steps.set_lo(dtdy as u16);
        self.push(st.into(), steps.into())
    }

    // colors

    pub fn set_fill_color(&mut self, packed: u32) -> &mut Self {
        self.push(op(G_SETFILLCOLOR), packed)
    }

    pub fn set_fog_color(&mut self, color: [u8; 4]) -> &mut Self {
        self.push(op(G_SETFOGCOLOR), rgba(color))
    }

    pub fn set_blend_color(&mut self, color: [u8; 4]) -> &mut Self {
        self.push(op(G_SETBLENDCOLOR), rgba(color))
    }

    pub fn set_env_color(&mut self, color: [u8; 4]) -> &mut Self {
        self.push(op(G_SETENVCOLOR), rgba(color))
    }

    pub fn set_prim_color(&mut self, min_lod: u8, lod_frac: u8, color: [u8; 4]) -> &mut Self {
        let mut word = PrimColorWord::from(op(G_SETPRIMCOLOR));
        word.set_min_lod(min_lod);
        word.set_lod_frac(lod_frac);
        self.push(word.into(), rgba(color))
    }

    // images and tiles

    fn image(&mut self, opcode: u8, format: u8, size: u8, width: u16, address: u32) -> &mut Self {
        let mut word = ImageWord::from(op(opcode));
        word.set_format(format);
        word.set_size(size);
        word.set_width_minus_one(width.wrapping_sub(1));
        self.push(word.into(), address)
    }

    pub fn set_texture_image(&mut self, format: u8, size: u8, width: u16, address: u32) -> &mut Self {
        self.image(G_SETTIMG, format, size, width, address)
    }

    pub fn set_color_image(&mut self, format: u8, size: u8, width: u16, address: u32) -> &mut Self {
        self.image(G_SETCIMG, format, size, width, address)
    }

    pub fn set_depth_image(&mut self, address: u32) -> &mut Self {
        self.push(op(G_SETZIMG), address)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_tile(
        &mut self,
        format: u8,
        size: u8,
        line: u16,
        tmem: u16,
        tile: u8,
        palette: u8,
        (cm_t, mask_t, shift_t): (u8, u8, u8),
        (cm_s, mask_s, shift_s): (u8, u8, u8),
    ) -> &mut Self {
        let mut word = TileWord::from(op(G_SETTILE));
        word.set_format(format);
        word.set_size(size);
        word.set_line(line);
        word.set_tmem(tmem);

        let mut attr = TileAttrWord::from(0);
        attr.set_tile(tile);
        attr.set_palette(palette);
        attr.set_cm_t(cm_t);
        attr.set_mask_t(mask_t);
        attr.set_shift_t(shift_t);
        attr.set_cm_s(cm_s);
        attr.set_mask_s(mask_s);
        attr.set_shift_s(shift_s);
        self.push(word.into(), attr.into())
    }

    fn tile_span(&mut self, opcode: u8, tile: u8, uls: u16, ult: u16, lrs: u16, lrt: u16) -> &mut Self {
        let mut lr = coords(lrs, lrt);
        lr.set_tile(tile);
        self.push(op(opcode) | u32::from(coords(uls, ult)), lr.into())
    }

    pub fn set_tile_size(&mut self, tile: u8, uls: u16, ult: u16, lrs: u16, lrt: u16) -> &mut Self {
        self.tile_span(G_SETTILESIZE, tile, uls, ult, lrs, lrt)
    }

    pub fn load_tile(&mut self, tile: u8, uls: u16, ult: u16, lrs: u16, lrt: u16) -> &mut Self {
        self.tile_span(G_LOADTILE, tile, uls, ult, lrs, lrt)
    }

    pub fn load_block(&mut self, tile: u8, uls: u16, ult: u16, lrs: u16, dxt: u16) -> &mut Self {
        self.tile_span(G_LOADBLOCK, tile, uls, ult, lrs, dxt)
    }

    pub fn load_tlut(&mut self, tile: u8, count: u16) -> &mut Self {
        let mut tlut = TlutWord::from(0);
        tlut.set_tile(tile);
        tlut.set_count_minus_one(count.wrapping_sub(1));
        self.push(op(G_LOADTLUT), tlut.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbi::{Gfx, MoveMem, TextureCoords};

    fn single(build: impl FnOnce(&mut DisplayListBuilder)) -> Command {
        let mut dl = DisplayListBuilder::new();
        build(&mut dl);
        assert_eq!(dl.len(), 1);
        dl.commands()[0]
    }

    #[test]
    fn vertex_matches_the_macro() {
        let cmd = single(|dl| {
            dl.vertex(0x0600_0100, 3, 4);
        });
        assert_eq!(cmd, Command::new(0x0400_300E, 0x0600_0100));
    }

    #[test]
    fn display_list_calls_and_branches() {
        assert_eq!(single(|dl| { dl.display_list(0x0300_0000); }), Command::new(0x0600_0000, 0x0300_0000));
        assert_eq!(single(|dl| { dl.branch_list(0x0300_0000); }), Command::new(0x0601_0000, 0x0300_0000));
    }

    #[test]
    fn segment_uses_the_segment_sub_index() {
        let cmd = single(|dl| {
            dl.segment(3, 0x1000);
        });
        assert_eq!(cmd, Command::new(0x0300_060C, 0x1000));
        assert_eq!(Gfx::decode(cmd), Gfx::MoveMem(MoveMem::Segment { id: 3, base: 0x1000 }));
    }

    #[test]
    fn geometry_mode_keeps_the_complement_of_clear() {
        let cmd = single(|dl| {
            dl.geometry_mode(0x0000_0004, 0x0000_0001);
        });
        assert_eq!(Gfx::decode(cmd), Gfx::GeometryMode { keep: 0x00FF_FFFB, set: 1 });
    }

    #[test]
    fn matrix_params_round_trip_through_the_inverted_push_bit() {
        let cmd = single(|dl| {
            dl.matrix(0x0100_0000, G_MTX_PROJECTION | G_MTX_LOAD | G_MTX_NOPUSH);
        });
        assert_eq!(
            Gfx::decode(cmd),
            Gfx::Matrix { address: 0x0100_0000, projection: true, load: true, push: false }
        );
    }

    #[test]
    fn texture_rectangle_emits_two_commands() {
        let mut dl = DisplayListBuilder::new();
        dl.texture_rectangle_flip(2, (40, 80), (120, 160), (32, -32), (1024, -1024));
        let cmds = dl.build();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].width(), 2);
        assert_eq!(
            Gfx::decode(cmds[0]),
            Gfx::TextureRectangle { tile: 2, ulx: 40, uly: 80, lrx: 120, lry: 160, flip: true }
        );
        assert_eq!(
            TextureCoords::decode(cmds[1]),
            TextureCoords { s: 32, t: -32, dsdx: 1024, dtdy: -1024 }
        );
    }

    #[test]
    fn bytes_follow_command_order() {
        let mut dl = DisplayListBuilder::new();
        dl.pipe_sync().end_display_list();
        assert_eq!(
            dl.to_bytes(),
            [0xE7, 0, 0, 0, 0, 0, 0, 0, 0xDF, 0, 0, 0, 0, 0, 0, 0]
        );
    }
}
