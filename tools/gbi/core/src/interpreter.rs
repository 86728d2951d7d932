use log::{debug, trace, warn};
use crate::backend::Backend;
use crate::call_stack::{CallStack, MAX_CALL_STACK_DEPTH};
use crate::dispatch::{self, RenderState, Sink};
use crate::error::InterpretError;
use crate::gbi::{Gfx, MoveMem, COMMAND_SIZE};
use crate::memory::Memory;
use crate::segments::SegmentTable;

/// What to do with a call or branch whose target can't be a display list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BadPointerPolicy {
    /// Log it and carry on with the next command.
    #[default]
    Skip,
    /// Fail the frame with `MalformedSubListPointer`.
    Abort,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub call_stack_depth: usize,
    /// Upper bound on commands per frame. Branch cycles never touch the
    /// call stack, so this is what stops them.
    pub command_limit: Option<usize>,
    pub bad_sub_list: BadPointerPolicy,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            call_stack_depth: 16,
            command_limit: Some(1_000_000),
            bad_sub_list: BadPointerPolicy::Skip,
        }
    }
}

/// Counters for one traversal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub commands: usize,
    pub max_depth: usize,
    pub unknown_opcodes: usize,
    pub unsupported: usize,
    pub rejected: usize,
    pub unresolved_segments: usize,
    pub malformed_pointers: usize,
}

/// Walks display lists and feeds a [`Backend`].
///
/// Each instance owns its segment table and call stack, so any number of
/// them can run side by side. Segments persist from frame to frame; the
/// call stack and [`RenderState`] start over with every [`Interpreter::interpret`].
#[derive(Clone, Debug)]
pub struct Interpreter {
    config: InterpreterConfig,
    segments: SegmentTable,
    stack: CallStack,
    state: RenderState,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterConfig::default())
    }
}

#[inline(always)]
fn is_display_list<M: Memory + ?Sized>(memory: &M, address: u32) -> bool {
    address != 0 && address % COMMAND_SIZE == 0 && memory.read_command(address).is_some()
}

impl Interpreter {
    pub fn new(mut config: InterpreterConfig) -> Self {
        if config.call_stack_depth > MAX_CALL_STACK_DEPTH {
            warn!(
                target: "gbi",
                "call stack depth {} is above the supported {}, clamping",
                config.call_stack_depth, MAX_CALL_STACK_DEPTH
            );
            config.call_stack_depth = MAX_CALL_STACK_DEPTH;
        }

        Self {
            stack: CallStack::new(config.call_stack_depth),
            config,
            segments: SegmentTable::new(),
            state: RenderState::default(),
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Lets the producer set up segments before a frame.
    pub fn set_segment(&mut self, id: u8, base: u32) {
        debug!(target: "gbi", "segment {} = {:#010X}", id & 0xF, base);
        self.segments.set(id, base);
    }

    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut SegmentTable {
        &mut self.segments
    }

    /// After an aborted frame this still holds the return addresses that
    /// were live at the failure.
    pub fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn render_state(&self) -> &RenderState {
        &self.state
    }

    /// Back to a freshly constructed interpreter, segments included.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.stack.clear();
        self.state.reset();
    }

    /// Runs the display list at physical address `root` to completion.
    pub fn interpret<M, B>(&mut self, memory: &M, backend: &mut B, root: u32) -> Result<FrameStats, InterpretError>
    where
        M: Memory + ?Sized,
        B: Backend + ?Sized,
    {
        self.stack.clear();
        self.state.reset();
        let mut stats = FrameStats::default();

        backend.begin_frame();
        match self.walk(memory, backend, root, &mut stats) {
            Ok(()) => {
                debug!(target: "gbi", "frame done: {:?}", stats);
                backend.end_frame();
                Ok(stats)
            }
            Err(err) => {
                warn!(target: "gbi", "frame aborted after {} commands: {}", stats.commands, err);
                backend.abort_frame(&err);
                Err(err)
            }
        }
    }

    fn walk<M, B>(&mut self, memory: &M, backend: &mut B, root: u32, stats: &mut FrameStats) -> Result<(), InterpretError>
    where
        M: Memory + ?Sized,
        B: Backend + ?Sized,
    {
        if !is_display_list(memory, root) {
            stats.malformed_pointers += 1;
            return Err(InterpretError::MalformedSubListPointer { logical: root, address: root });
        }

        let mut pc = root;
        loop {
            if let Some(limit) = self.config.command_limit {
                if stats.commands >= limit {
                    return Err(InterpretError::CommandLimitExceeded { limit });
                }
            }

            let command = memory.read_command(pc).ok_or(InterpretError::CommandOutOfBounds { address: pc })?;
            let next = pc.wrapping_add(COMMAND_SIZE);
            stats.commands += 1;
            trace!(target: "gbi", "{:08X}: {:?}", pc, command);

            match Gfx::decode(command) {
                Gfx::EndDisplayList => match self.stack.pop() {
                    Some(ret) => {
                        debug!(target: "gbi", "{:08X}: return to {:08X}", pc, ret);
                        pc = ret;
                    }
                    None => return Ok(()),
                },

                Gfx::DisplayList { address: logical, branch } => {
                    let target = dispatch::resolve(&self.segments, stats, logical);

                    if !is_display_list(memory, target) {
                        stats.malformed_pointers += 1;
                        let err = InterpretError::MalformedSubListPointer { logical, address: target };
                        match self.config.bad_sub_list {
                            BadPointerPolicy::Abort => return Err(err),
                            BadPointerPolicy::Skip => {
                                warn!(target: "gbi", "{:08X}: skipping sub-list: {}", pc, err);
                                pc = next;
                                continue;
                            }
                        }
                    }

                    if branch {
                        debug!(target: "gbi", "{:08X}: branch to {:08X}", pc, target);
                    } else {
                        debug!(target: "gbi", "{:08X}: call {:08X}", pc, target);
                        self.stack.push(next).map_err(|_| InterpretError::CallStackOverflow {
                            capacity: self.stack.capacity(),
                            address: target,
                        })?;
                        stats.max_depth = stats.max_depth.max(self.stack.depth());
                    }
                    pc = target;
                }

                Gfx::MoveMem(MoveMem::Segment { id, base }) => {
                    self.set_segment(id, base);
                    pc = next;
                }

                gfx => {
                    let width = command.width();
                    let mut record = [command; 2];
                    for (i, slot) in record.iter_mut().enumerate().take(width).skip(1) {
                        let address = pc.wrapping_add(i as u32 * COMMAND_SIZE);
                        *slot = memory.read_command(address).ok_or(InterpretError::CommandOutOfBounds { address })?;
                    }

                    Sink {
                        state: &mut self.state,
                        segments: &self.segments,
                        memory,
                        backend: &mut *backend,
                        stats: &mut *stats,
                    }
                    .dispatch(gfx, &record[..width], pc);

                    pc = pc.wrapping_add(width as u32 * COMMAND_SIZE);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbi::DisplayListBuilder;
    use crate::memory::Rdram;
    use crate::recorder::{BackendCall, RecordingBackend};

    fn load(ram: &mut Rdram, address: u32, dl: &DisplayListBuilder) {
        ram.write_display_list(address, dl.commands()).unwrap();
    }

    #[test]
    fn config_defaults() {
        let config = InterpreterConfig::default();
        assert_eq!(config.call_stack_depth, 16);
        assert_eq!(config.command_limit, Some(1_000_000));
        assert_eq!(config.bad_sub_list, BadPointerPolicy::Skip);
    }

    #[test]
    fn deep_stacks_are_clamped() {
        let interp = Interpreter::new(InterpreterConfig { call_stack_depth: 500, ..Default::default() });
        assert_eq!(interp.config().call_stack_depth, MAX_CALL_STACK_DEPTH);
        assert_eq!(interp.call_stack().capacity(), MAX_CALL_STACK_DEPTH);
    }

    #[test]
    fn null_root_aborts() {
        let ram = Rdram::new(0x100);
        let mut backend = RecordingBackend::default();
        let err = Interpreter::default().interpret(&ram, &mut backend, 0).unwrap_err();
        assert_eq!(err, InterpretError::MalformedSubListPointer { logical: 0, address: 0 });
        assert_eq!(backend.calls, [BackendCall::BeginFrame, BackendCall::AbortFrame(err)]);
    }

    #[test]
    fn misaligned_root_aborts() {
        let ram = Rdram::new(0x100);
        let mut backend = RecordingBackend::default();
        let err = Interpreter::default().interpret(&ram, &mut backend, 0x44).unwrap_err();
        assert_eq!(err, InterpretError::MalformedSubListPointer { logical: 0x44, address: 0x44 });
    }

    #[test]
    fn running_off_the_end_of_memory() {
        let mut ram = Rdram::new(0x20);
        let mut dl = DisplayListBuilder::new();
        dl.pipe_sync().pipe_sync();
        load(&mut ram, 0x10, &dl);

        let mut backend = RecordingBackend::default();
        let err = Interpreter::default().interpret(&ram, &mut backend, 0x10).unwrap_err();
        assert_eq!(err, InterpretError::CommandOutOfBounds { address: 0x20 });
    }

    #[test]
    fn texture_rectangle_cut_off_by_the_end_of_memory() {
        let mut ram = Rdram::new(0x18);
        let mut dl = DisplayListBuilder::new();
        dl.pipe_sync().texture_rectangle(0, (0, 0), (4, 4), (0, 0), (1024, 1024));
        // only the first half of the rectangle fits
        ram.write_display_list(0x08, &dl.commands()[..2]).unwrap();

        let mut backend = RecordingBackend::default();
        let err = Interpreter::default().interpret(&ram, &mut backend, 0x08).unwrap_err();
        assert_eq!(err, InterpretError::CommandOutOfBounds { address: 0x18 });
    }

    #[test]
    fn branch_cycles_hit_the_command_limit() {
        let mut ram = Rdram::new(0x100);
        let mut dl = DisplayListBuilder::new();
        dl.branch_list(0x40);
        load(&mut ram, 0x40, &dl);

        let mut interp = Interpreter::new(InterpreterConfig { command_limit: Some(100), ..Default::default() });
        let mut backend = RecordingBackend::default();
        let err = interp.interpret(&ram, &mut backend, 0x40).unwrap_err();
        assert_eq!(err, InterpretError::CommandLimitExceeded { limit: 100 });
        assert_eq!(interp.call_stack().depth(), 0);
    }

    #[test]
    fn segment_commands_update_the_table() {
        let mut ram = Rdram::new(0x100);
        let mut dl = DisplayListBuilder::new();
        dl.segment(6, 0x0008_0000).end_display_list();
        load(&mut ram, 0x40, &dl);

        let mut interp = Interpreter::default();
        let mut backend = RecordingBackend::default();
        interp.interpret(&ram, &mut backend, 0x40).unwrap();
        assert_eq!(interp.segments().get(6), Some(0x0008_0000));
        assert_eq!(backend.render_calls().count(), 0);
    }

    #[test]
    fn reset_clears_segments() {
        let mut interp = Interpreter::default();
        interp.set_segment(2, 0x1000);
        interp.reset();
        assert_eq!(interp.segments().get(2), None);
    }
}
