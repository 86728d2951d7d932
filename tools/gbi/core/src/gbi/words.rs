//! Operand layouts of the command words. None of these carry the opcode;
//! the encoder ors it into the top byte of `w0`.

use bitfield::bitfield;

macro_rules! raw_word {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<u32> for $name {
                #[inline(always)]
                fn from(word: u32) -> Self {
                    $name(word)
                }
            }

            impl From<$name> for u32 {
                #[inline(always)]
                fn from(word: $name) -> u32 {
                    word.0
                }
            }
        )*
    };
}

bitfield! {
    /// `G_VTX` w0. `end` is one past the last vertex slot written.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct VertexWord(u32);
    impl Debug;
    pub u8, count, set_count: 19, 12;
    pub u8, end, set_end: 7, 1;
}

bitfield! {
    /// One triangle; each index is stored doubled.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct TriangleWord(u32);
    impl Debug;
    pub u8, v0, set_v0: 23, 16;
    pub u8, v1, set_v1: 15, 8;
    pub u8, v2, set_v2: 7, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct DisplayListWord(u32);
    impl Debug;
    pub u8, flag, set_flag: 23, 16;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct MoveMemWord(u32);
    impl Debug;
    pub u8, index, set_index: 15, 8;
    pub u8, offset, set_offset: 7, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct MatrixWord(u32);
    impl Debug;
    pub u8, params, set_params: 7, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct TextureWord(u32);
    impl Debug;
    pub u8, level, set_level: 13, 11;
    pub u8, tile, set_tile: 10, 8;
    pub u8, on, set_on: 7, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct OtherModeWord(u32);
    impl Debug;
    pub u8, shift, set_shift: 15, 8;
    pub u8, len, set_len: 7, 0;
}

bitfield! {
    /// Pair of 10.2 coordinates. Tile and scissor mode share the top bits
    /// of the second word, depending on the command.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct CoordWord(u32);
    impl Debug;
    pub u8, mode, set_mode: 31, 24;
    pub u8, tile, set_tile: 26, 24;
    pub u16, x, set_x: 23, 12;
    pub u16, y, set_y: 11, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct ImageWord(u32);
    impl Debug;
    pub u8, format, set_format: 23, 21;
    pub u8, size, set_size: 20, 19;
    pub u16, width_minus_one, set_width_minus_one: 11, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct TileWord(u32);
    impl Debug;
    pub u8, format, set_format: 23, 21;
    pub u8, size, set_size: 20, 19;
    pub u16, line, set_line: 17, 9;
    pub u16, tmem, set_tmem: 8, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct TileAttrWord(u32);
    impl Debug;
    pub u8, tile, set_tile: 26, 24;
    pub u8, palette, set_palette: 23, 20;
    pub u8, cm_t, set_cm_t: 19, 18;
    pub u8, mask_t, set_mask_t: 17, 14;
    pub u8, shift_t, set_shift_t: 13, 10;
    pub u8, cm_s, set_cm_s: 9, 8;
    pub u8, mask_s, set_mask_s: 7, 4;
    pub u8, shift_s, set_shift_s: 3, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct TlutWord(u32);
    impl Debug;
    pub u8, tile, set_tile: 26, 24;
    pub u16, count_minus_one, set_count_minus_one: 23, 14;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct PrimColorWord(u32);
    impl Debug;
    pub u8, min_lod, set_min_lod: 15, 8;
    pub u8, lod_frac, set_lod_frac: 7, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct ColorWord(u32);
    impl Debug;
    pub u8, r, set_r: 31, 24;
    pub u8, g, set_g: 23, 16;
    pub u8, b, set_b: 15, 8;
    pub u8, a, set_a: 7, 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct HalfWords(u32);
    impl Debug;
    pub u16, hi, set_hi: 31, 16;
    pub u16, lo, set_lo: 15, 0;
}

raw_word!(
    VertexWord, TriangleWord, DisplayListWord, MoveMemWord, MatrixWord, TextureWord,
    OtherModeWord, CoordWord, ImageWord, TileWord, TileAttrWord, TlutWord, PrimColorWord,
    ColorWord, HalfWords,
);
