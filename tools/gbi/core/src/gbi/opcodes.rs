// geometry
pub const G_SPNOOP: u8         = 0x00;
pub const G_MTX: u8            = 0x01;
pub const G_MOVEMEM: u8        = 0x03;
pub const G_VTX: u8            = 0x04;
pub const G_DL: u8             = 0x06;
pub const G_LOAD_UCODE: u8     = 0x07;
pub const G_BRANCH_Z: u8       = 0x08;
pub const G_TRI2: u8           = 0x09;
pub const G_MODIFYVTX: u8      = 0x0B;
pub const G_TRI1: u8           = 0x0C;
pub const G_NOOP: u8           = 0xC0;
pub const G_LINE3D: u8         = 0xD1;
pub const G_TEXTURE: u8        = 0xD7;
pub const G_POPMTX: u8         = 0xD8;
pub const G_GEOMETRYMODE: u8   = 0xD9;
pub const G_ENDDL: u8          = 0xDF;

// rasterizer
pub const G_SETOTHERMODE_L: u8 = 0xE2;
pub const G_SETOTHERMODE_H: u8 = 0xE3;
pub const G_TEXRECT: u8        = 0xE4;
pub const G_TEXRECTFLIP: u8    = 0xE5;
pub const G_RDPLOADSYNC: u8    = 0xE6;
pub const G_RDPPIPESYNC: u8    = 0xE7;
pub const G_RDPTILESYNC: u8    = 0xE8;
pub const G_RDPFULLSYNC: u8    = 0xE9;
pub const G_SETKEYGB: u8       = 0xEA;
pub const G_SETKEYR: u8        = 0xEB;
pub const G_SETCONVERT: u8     = 0xEC;
pub const G_SETSCISSOR: u8     = 0xED;
pub const G_SETPRIMDEPTH: u8   = 0xEE;
pub const G_RDPSETOTHERMODE: u8 = 0xEF;
pub const G_LOADTLUT: u8       = 0xF0;
pub const G_SETTILESIZE: u8    = 0xF2;
pub const G_LOADBLOCK: u8      = 0xF3;
pub const G_LOADTILE: u8       = 0xF4;
pub const G_SETTILE: u8        = 0xF5;
pub const G_FILLRECT: u8       = 0xF6;
pub const G_SETFILLCOLOR: u8   = 0xF7;
pub const G_SETFOGCOLOR: u8    = 0xF8;
pub const G_SETBLENDCOLOR: u8  = 0xF9;
pub const G_SETPRIMCOLOR: u8   = 0xFA;
pub const G_SETENVCOLOR: u8    = 0xFB;
pub const G_SETCOMBINE: u8     = 0xFC;
pub const G_SETTIMG: u8        = 0xFD;
pub const G_SETZIMG: u8        = 0xFE;
pub const G_SETCIMG: u8        = 0xFF;

// G_MOVEMEM sub-indices
pub const G_MW_CLIP: u8        = 0x04;
pub const G_MW_SEGMENT: u8     = 0x06;
pub const G_MW_FOG: u8         = 0x08;
pub const G_MW_NUMLIGHT: u8    = 0x0C;
pub const G_MW_PERSPNORM: u8   = 0x0E;
pub const G_MV_VIEWPORT: u8    = 0x80;
pub const G_MV_L0: u8          = 0x86;
pub const G_MV_L7: u8          = 0x94;

// G_DL flag
pub const G_DL_PUSH: u8        = 0x00;
pub const G_DL_NOPUSH: u8      = 0x01;

// G_MTX params, as the producer writes them (push is inverted on the wire)
pub const G_MTX_NOPUSH: u8     = 0x00;
pub const G_MTX_PUSH: u8       = 0x01;
pub const G_MTX_MUL: u8        = 0x00;
pub const G_MTX_LOAD: u8       = 0x02;
pub const G_MTX_MODELVIEW: u8  = 0x00;
pub const G_MTX_PROJECTION: u8 = 0x04;

/// Entries in the vertex buffer that `G_VTX` fills and triangles index into.
pub const VERTEX_BUFFER_LEN: usize = 32;

/// Bytes per vertex record in memory.
pub const VERTEX_SIZE: u32 = 16;

/// Bytes per fixed-point matrix in memory.
pub const MATRIX_SIZE: u32 = 64;

pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        G_SPNOOP => "G_SPNOOP",
        G_MTX => "G_MTX",
        G_MOVEMEM => "G_MOVEMEM",
        G_VTX => "G_VTX",
        G_DL => "G_DL",
        G_LOAD_UCODE => "G_LOAD_UCODE",
        G_BRANCH_Z => "G_BRANCH_Z",
        G_TRI2 => "G_TRI2",
        G_MODIFYVTX => "G_MODIFYVTX",
        G_TRI1 => "G_TRI1",
        G_NOOP => "G_NOOP",
        G_LINE3D => "G_LINE3D",
        G_TEXTURE => "G_TEXTURE",
        G_POPMTX => "G_POPMTX",
        G_GEOMETRYMODE => "G_GEOMETRYMODE",
        G_ENDDL => "G_ENDDL",
        G_SETOTHERMODE_L => "G_SETOTHERMODE_L",
        G_SETOTHERMODE_H => "G_SETOTHERMODE_H",
        G_TEXRECT => "G_TEXRECT",
        G_TEXRECTFLIP => "G_TEXRECTFLIP",
        G_RDPLOADSYNC => "G_RDPLOADSYNC",
        G_RDPPIPESYNC => "G_RDPPIPESYNC",
        G_RDPTILESYNC => "G_RDPTILESYNC",
        G_RDPFULLSYNC => "G_RDPFULLSYNC",
        G_SETKEYGB => "G_SETKEYGB",
        G_SETKEYR => "G_SETKEYR",
        G_SETCONVERT => "G_SETCONVERT",
        G_SETSCISSOR => "G_SETSCISSOR",
        G_SETPRIMDEPTH => "G_SETPRIMDEPTH",
        G_RDPSETOTHERMODE => "G_RDPSETOTHERMODE",
        G_LOADTLUT => "G_LOADTLUT",
        G_SETTILESIZE => "G_SETTILESIZE",
        G_LOADBLOCK => "G_LOADBLOCK",
        G_LOADTILE => "G_LOADTILE",
        G_SETTILE => "G_SETTILE",
        G_FILLRECT => "G_FILLRECT",
        G_SETFILLCOLOR => "G_SETFILLCOLOR",
        G_SETFOGCOLOR => "G_SETFOGCOLOR",
        G_SETBLENDCOLOR => "G_SETBLENDCOLOR",
        G_SETPRIMCOLOR => "G_SETPRIMCOLOR",
        G_SETENVCOLOR => "G_SETENVCOLOR",
        G_SETCOMBINE => "G_SETCOMBINE",
        G_SETTIMG => "G_SETTIMG",
        G_SETZIMG => "G_SETZIMG",
        G_SETCIMG => "G_SETCIMG",
        _ => "???",
    }
}

/// Commands per record for `opcode`. Texture rectangles carry their
/// texture coordinates in a trailing command.
#[inline(always)]
pub fn command_width(opcode: u8) -> usize {
    match opcode {
        G_TEXRECT | G_TEXRECTFLIP => 2,
        _ => 1,
    }
}
