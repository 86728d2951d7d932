#![allow(dead_code)]

use gbi_core::{BackendCall, DisplayListBuilder, FrameStats, InterpretError, Interpreter, InterpreterConfig, Rdram, RecordingBackend};

pub const RAM_SIZE: usize = 0x10_0000;

/// A memory image plus an interpreter to run lists out of it.
pub struct Harness {
    pub ram: Rdram,
    pub interp: Interpreter,
}

pub struct Frame {
    pub result: Result<FrameStats, InterpretError>,
    /// Everything the backend saw, frame markers included.
    pub calls: Vec<BackendCall>,
}

impl Frame {
    pub fn render_calls(&self) -> Vec<BackendCall> {
        self.calls.iter().filter(|c| !c.is_frame_marker()).cloned().collect()
    }

    pub fn stats(&self) -> FrameStats {
        self.result.clone().expect("frame should have succeeded")
    }

    /// Red channel of every env color set, in order. Tests use env colors
    /// as cheap markers.
    pub fn markers(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::SetEnvColor(color) => Some(color.r),
                _ => None,
            })
            .collect()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self { ram: Rdram::new(RAM_SIZE), interp: Interpreter::new(config) }
    }

    pub fn list(&mut self, address: u32, build: impl FnOnce(&mut DisplayListBuilder)) -> &mut Self {
        let mut dl = DisplayListBuilder::new();
        build(&mut dl);
        self.ram.write_display_list(address, dl.commands()).unwrap();
        self
    }

    pub fn bytes(&mut self, address: u32, bytes: &[u8]) -> &mut Self {
        self.ram.write_bytes(address, bytes).unwrap();
        self
    }

    pub fn run(&mut self, root: u32) -> Frame {
        let mut backend = RecordingBackend::new();
        let result = self.interp.interpret(&self.ram, &mut backend, root);
        Frame { result, calls: backend.calls }
    }
}

pub fn marker(value: u8) -> [u8; 4] {
    [value, 0, 0, 0xFF]
}

/// 16-byte vertex record.
pub fn vertex_bytes(position: [i16; 3], tex_coord: [i16; 2], color: [u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    for p in position {
        out.extend_from_slice(&p.to_be_bytes());
    }
    out.extend_from_slice(&0u16.to_be_bytes());
    for t in tex_coord {
        out.extend_from_slice(&t.to_be_bytes());
    }
    out.extend_from_slice(&color);
    out
}

/// s15.16 matrix in the split integer/fraction layout.
pub fn matrix_bytes(m: [[f32; 4]; 4]) -> Vec<u8> {
    let fixed: Vec<i32> = m.iter().flatten().map(|v| (v * 65536.0) as i32).collect();
    let mut out = Vec::with_capacity(64);
    for f in &fixed {
        out.extend_from_slice(&((f >> 16) as i16).to_be_bytes());
    }
    for f in &fixed {
        out.extend_from_slice(&((f & 0xFFFF) as u16).to_be_bytes());
    }
    out
}
