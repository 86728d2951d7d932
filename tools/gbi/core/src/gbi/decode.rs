use bit_field::BitField;
use crate::gbi::opcodes::*;
use crate::gbi::words::*;
use crate::gbi::Command;

/// A command with its operands pulled out of the packed words.
///
/// Decoding is total: every bit pattern decodes to something, and
/// addresses are left segmented. Whether the operands make sense is up to
/// whoever consumes the result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gfx {
    NoOp,
    Sync(u8),
    EndDisplayList,
    DisplayList { address: u32, branch: bool },
    MoveMem(MoveMem),

    Vertex { count: u8, v0: u8, address: u32 },
    Triangle1([u8; 3]),
    Triangle2([u8; 3], [u8; 3]),
    Matrix { address: u32, projection: bool, load: bool, push: bool },
    PopMatrix { count: u32 },
    GeometryMode { keep: u32, set: u32 },
    Texture { scale_s: u16, scale_t: u16, level: u8, tile: u8, on: bool },

    SetOtherModeL { shift: u8, len: u8, data: u32 },
    SetOtherModeH { shift: u8, len: u8, data: u32 },
    SetOtherMode { high: u32, low: u32 },
    SetCombine { mux0: u32, mux1: u32 },
    SetScissor { mode: u8, ulx: u16, uly: u16, lrx: u16, lry: u16 },
    FillRectangle { ulx: u16, uly: u16, lrx: u16, lry: u16 },
    /// First half of a texture rectangle; see [`TextureCoords`] for the second.
    TextureRectangle { tile: u8, ulx: u16, uly: u16, lrx: u16, lry: u16, flip: bool },

    SetFillColor(u32),
    SetFogColor([u8; 4]),
    SetBlendColor([u8; 4]),
    SetEnvColor([u8; 4]),
    SetPrimColor { min_lod: u8, lod_frac: u8, color: [u8; 4] },

    SetTextureImage(Image),
    SetColorImage(Image),
    SetDepthImage { address: u32 },
    SetTile(Tile),
    SetTileSize(TileSpan),
    LoadTile(TileSpan),
    LoadBlock { tile: u8, uls: u16, ult: u16, lrs: u16, dxt: u16 },
    LoadTlut { tile: u8, count: u16 },

    /// Known opcode this interpreter does not act on.
    Unsupported(u8),
    Unknown(u8),
}

/// The `G_MOVEMEM` family, split by sub-index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveMem {
    Segment { id: u8, base: u32 },
    Viewport { address: u32 },
    Light { slot: u8, address: u32 },
    Fog { multiplier: i16, offset: i16 },
    NumLights(u32),
    PerspNormalize(u16),
    Clip { offset: u8, value: u32 },
    Unknown { index: u8, offset: u8, payload: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub format: u8,
    pub size: u8,
    pub width: u16,
    pub address: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub tile: u8,
    pub format: u8,
    pub size: u8,
    pub line: u16,
    pub tmem: u16,
    pub palette: u8,
    pub cm_t: u8,
    pub mask_t: u8,
    pub shift_t: u8,
    pub cm_s: u8,
    pub mask_s: u8,
    pub shift_s: u8,
}

/// Tile-relative texel rectangle, 10.2 fixed point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileSpan {
    pub tile: u8,
    pub uls: u16,
    pub ult: u16,
    pub lrs: u16,
    pub lrt: u16,
}

/// Trailing command of a texture rectangle: s/t are s10.5, the steps s5.10.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureCoords {
    pub s: i16,
    pub t: i16,
    pub dsdx: i16,
    pub dtdy: i16,
}

impl TextureCoords {
    pub fn decode(command: Command) -> Self {
        let st = HalfWords::from(command.w0);
        let steps = HalfWords::from(command.w1);
        Self {
            s: st.hi() as i16,
            t: st.lo() as i16,
            dsdx: steps.hi() as i16,
            dtdy: steps.lo() as i16,
        }
    }
}

#[inline(always)]
fn low24(word: u32) -> u32 {
    word.get_bits(0..24)
}

fn triangle(word: u32) -> [u8; 3] {
    let tri = TriangleWord::from(word);
    [tri.v0() / 2, tri.v1() / 2, tri.v2() / 2]
}

fn rgba(word: u32) -> [u8; 4] {
    let c = ColorWord::from(word);
    [c.r(), c.g(), c.b(), c.a()]
}

fn image(command: Command) -> Image {
    let img = ImageWord::from(command.w0);
    Image {
        format: img.format(),
        size: img.size(),
        width: img.width_minus_one() + 1,
        address: command.w1,
    }
}

fn tile_span(command: Command) -> TileSpan {
    let ul = CoordWord::from(command.w0);
    let lr = CoordWord::from(command.w1);
    TileSpan { tile: lr.tile(), uls: ul.x(), ult: ul.y(), lrs: lr.x(), lrt: lr.y() }
}

impl MoveMem {
    pub fn decode(command: Command) -> Self {
        let word = MoveMemWord::from(command.w0);
        let payload = command.w1;
        match word.index() {
            G_MW_SEGMENT => MoveMem::Segment { id: (word.offset() / 4) & 0xF, base: payload },
            G_MV_VIEWPORT => MoveMem::Viewport { address: payload },
            index @ G_MV_L0..=G_MV_L7 if index % 2 == 0 => MoveMem::Light {
                slot: (index - G_MV_L0) / 2,
                address: payload,
            },
            G_MW_FOG => {
                let fog = HalfWords::from(payload);
                MoveMem::Fog { multiplier: fog.hi() as i16, offset: fog.lo() as i16 }
            }
            G_MW_NUMLIGHT => MoveMem::NumLights(payload),
            G_MW_PERSPNORM => MoveMem::PerspNormalize(HalfWords::from(payload).lo()),
            G_MW_CLIP => MoveMem::Clip { offset: word.offset(), value: payload },
            index => MoveMem::Unknown { index, offset: word.offset(), payload },
        }
    }
}

impl Gfx {
    pub fn decode(command: Command) -> Self {
        let Command { w0, w1 } = command;

        match command.opcode() {
            G_SPNOOP | G_NOOP => Gfx::NoOp,
            op @ (G_RDPLOADSYNC | G_RDPPIPESYNC | G_RDPTILESYNC | G_RDPFULLSYNC) => Gfx::Sync(op),
            G_ENDDL => Gfx::EndDisplayList,
            G_DL => Gfx::DisplayList {
                address: w1,
                branch: DisplayListWord::from(w0).flag() == G_DL_NOPUSH,
            },
            G_MOVEMEM => Gfx::MoveMem(MoveMem::decode(command)),

            G_VTX => {
                let vtx = VertexWord::from(w0);
                Gfx::Vertex {
                    count: vtx.count(),
                    v0: vtx.end().wrapping_sub(vtx.count()),
                    address: w1,
                }
            }
            G_TRI1 => Gfx::Triangle1(triangle(w0)),
            G_TRI2 => Gfx::Triangle2(triangle(w0), triangle(w1)),
            G_MTX => {
                // push is stored inverted
                let params = MatrixWord::from(w0).params() ^ G_MTX_PUSH;
                Gfx::Matrix {
                    address: w1,
                    projection: params & G_MTX_PROJECTION != 0,
                    load: params & G_MTX_LOAD != 0,
                    push: params & G_MTX_PUSH != 0,
                }
            }
            G_POPMTX => Gfx::PopMatrix { count: (w1 / MATRIX_SIZE).max(1) },
            G_GEOMETRYMODE => Gfx::GeometryMode { keep: low24(w0), set: w1 },
            G_TEXTURE => {
                let tex = TextureWord::from(w0);
                let scale = HalfWords::from(w1);
                Gfx::Texture {
                    scale_s: scale.hi(),
                    scale_t: scale.lo(),
                    level: tex.level(),
                    tile: tex.tile(),
                    on: tex.on() != 0,
                }
            }

            G_SETOTHERMODE_L => {
                let mode = OtherModeWord::from(w0);
                Gfx::SetOtherModeL { shift: mode.shift(), len: mode.len(), data: w1 }
            }
            G_SETOTHERMODE_H => {
                let mode = OtherModeWord::from(w0);
                Gfx::SetOtherModeH { shift: mode.shift(), len: mode.len(), data: w1 }
            }
            G_RDPSETOTHERMODE => Gfx::SetOtherMode { high: low24(w0), low: w1 },
            G_SETCOMBINE => Gfx::SetCombine { mux0: low24(w0), mux1: w1 },
            G_SETSCISSOR => {
                let ul = CoordWord::from(w0);
                let lr = CoordWord::from(w1);
                Gfx::SetScissor { mode: lr.mode(), ulx: ul.x(), uly: ul.y(), lrx: lr.x(), lry: lr.y() }
            }
            G_FILLRECT => {
                let lr = CoordWord::from(w0);
                let ul = CoordWord::from(w1);
                Gfx::FillRectangle { ulx: ul.x(), uly: ul.y(), lrx: lr.x(), lry: lr.y() }
            }
            op @ (G_TEXRECT | G_TEXRECTFLIP) => {
                let lr = CoordWord::from(w0);
                let ul = CoordWord::from(w1);
                Gfx::TextureRectangle {
                    tile: ul.tile(),
                    ulx: ul.x(),
                    uly: ul.y(),
                    lrx: lr.x(),
                    lry: lr.y(),
                    flip: op == G_TEXRECTFLIP,
                }
            }

            G_SETFILLCOLOR => Gfx::SetFillColor(w1),
            G_SETFOGCOLOR => Gfx::SetFogColor(rgba(w1)),
            G_SETBLENDCOLOR => Gfx::SetBlendColor(rgba(w1)),
            G_SETENVCOLOR => Gfx::SetEnvColor(rgba(w1)),
            G_SETPRIMCOLOR => {
                let prim = PrimColorWord::from(w0);
                Gfx::SetPrimColor { min_lod: prim.min_lod(), lod_frac: prim.lod_frac(), color: rgba(w1) }
            }

            G_SETTIMG => Gfx::SetTextureImage(image(command)),
            G_SETCIMG => Gfx::SetColorImage(image(command)),
            G_SETZIMG => Gfx::SetDepthImage { address: w1 },
            G_SETTILE => {
                let fmt = TileWord::from(w0);
                let attr = TileAttrWord::from(w1);
                Gfx::SetTile(Tile {
                    tile: attr.tile(),
                    format: fmt.format(),
                    size: fmt.size(),
                    line: fmt.line(),
                    tmem: fmt.tmem(),
                    palette: attr.palette(),
                    cm_t: attr.cm_t(),
                    mask_t: attr.mask_t(),
                    shift_t: attr.shift_t(),
                    cm_s: attr.cm_s(),
                    mask_s: attr.mask_s(),
                    shift_s: attr.shift_s(),
                })
            }
            G_SETTILESIZE => Gfx::SetTileSize(tile_span(command)),
            G_LOADTILE => Gfx::LoadTile(tile_span(command)),
            G_LOADBLOCK => {
                let span = tile_span(command);
                Gfx::LoadBlock { tile: span.tile, uls: span.uls, ult: span.ult, lrs: span.lrs, dxt: span.lrt }
            }
            G_LOADTLUT => {
                let tlut = TlutWord::from(w1);
                Gfx::LoadTlut { tile: tlut.tile(), count: tlut.count_minus_one() + 1 }
            }

            op @ (G_LOAD_UCODE | G_BRANCH_Z | G_MODIFYVTX | G_LINE3D | G_SETKEYGB | G_SETKEYR
                | G_SETCONVERT | G_SETPRIMDEPTH) => Gfx::Unsupported(op),
            op => Gfx::Unknown(op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_load() {
        // gSPVertex(vtx = 0x06000100, n = 3, v0 = 4)
        let cmd = Command::new(0x0400_300E, 0x0600_0100);
        assert_eq!(Gfx::decode(cmd), Gfx::Vertex { count: 3, v0: 4, address: 0x0600_0100 });
    }

    #[test]
    fn triangle_indices_are_halved() {
        let cmd = Command::new(0x0C00_0204, 0);
        assert_eq!(Gfx::decode(cmd), Gfx::Triangle1([0, 1, 2]));
    }

    #[test]
    fn display_list_flag() {
        assert_eq!(
            Gfx::decode(Command::new(0x0600_0000, 0x0300_0000)),
            Gfx::DisplayList { address: 0x0300_0000, branch: false }
        );
        assert_eq!(
            Gfx::decode(Command::new(0x0601_0000, 0x0300_0000)),
            Gfx::DisplayList { address: 0x0300_0000, branch: true }
        );
        // anything but the no-push flag is a call
        assert_eq!(
            Gfx::decode(Command::new(0x0607_0000, 0x0300_0000)),
            Gfx::DisplayList { address: 0x0300_0000, branch: false }
        );
    }

    #[test]
    fn matrix_push_bit_is_inverted() {
        // G_MTX_PROJECTION | G_MTX_LOAD | G_MTX_NOPUSH, xored with 1
        let cmd = Command::new(0x0100_0007, 0x0100_0000);
        assert_eq!(
            Gfx::decode(cmd),
            Gfx::Matrix { address: 0x0100_0000, projection: true, load: true, push: false }
        );
        let cmd = Command::new(0x0100_0000, 0x0100_0000);
        assert_eq!(
            Gfx::decode(cmd),
            Gfx::Matrix { address: 0x0100_0000, projection: false, load: false, push: true }
        );
    }

    #[test]
    fn movemem_segment_uses_offset_over_four() {
        let cmd = Command::new(0x0300_060C, 0x0010_0000);
        assert_eq!(Gfx::decode(cmd), Gfx::MoveMem(MoveMem::Segment { id: 3, base: 0x0010_0000 }));
    }

    #[test]
    fn movemem_segment_id_wraps_to_four_bits() {
        let cmd = Command::new(0x0300_0644, 0x0010_0000);
        assert_eq!(Gfx::decode(cmd), Gfx::MoveMem(MoveMem::Segment { id: 1, base: 0x0010_0000 }));
    }

    #[test]
    fn movemem_lights_only_on_even_indices() {
        let cmd = Command::new(0x0300_8800, 0x0400_0000);
        assert_eq!(Gfx::decode(cmd), Gfx::MoveMem(MoveMem::Light { slot: 1, address: 0x0400_0000 }));
        let cmd = Command::new(0x0300_8700, 0x0400_0000);
        assert_eq!(
            Gfx::decode(cmd),
            Gfx::MoveMem(MoveMem::Unknown { index: 0x87, offset: 0, payload: 0x0400_0000 })
        );
    }

    #[test]
    fn pop_matrix_counts_whole_matrices() {
        assert_eq!(Gfx::decode(Command::new(0xD800_0000, 0)), Gfx::PopMatrix { count: 1 });
        assert_eq!(Gfx::decode(Command::new(0xD800_0000, 128)), Gfx::PopMatrix { count: 2 });
    }

    #[test]
    fn fill_rectangle_puts_lower_right_first() {
        let cmd = Command::new(0xF650_03C0, 0x0001_0002);
        assert_eq!(
            Gfx::decode(cmd),
            Gfx::FillRectangle { ulx: 0x10, uly: 0x02, lrx: 0x500, lry: 0x3C0 }
        );
    }

    #[test]
    fn texture_coords() {
        let coords = TextureCoords::decode(Command::new(0x0020_FFE0, 0x0400_FC00));
        assert_eq!(coords, TextureCoords { s: 32, t: -32, dsdx: 1024, dtdy: -1024 });
    }

    #[test]
    fn sync_and_unknown() {
        assert_eq!(Gfx::decode(Command::new(0xE700_0000, 0)), Gfx::Sync(G_RDPPIPESYNC));
        assert_eq!(Gfx::decode(Command::new(0xC000_0000, 0)), Gfx::NoOp);
        assert_eq!(Gfx::decode(Command::new(0xEC00_0000, 0)), Gfx::Unsupported(G_SETCONVERT));
        assert_eq!(Gfx::decode(Command::new(0x4200_0000, 0)), Gfx::Unknown(0x42));
    }
}
