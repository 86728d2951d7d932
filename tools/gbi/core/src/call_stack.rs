use heapless::Vec;

/// Backing capacity of the call stack. Configured depths above this are
/// clamped.
pub const MAX_CALL_STACK_DEPTH: usize = 64;

/// Bounded stack of return addresses. Storage is inline; depth is checked
/// against the configured capacity, never against the host stack.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<u32, MAX_CALL_STACK_DEPTH>,
    capacity: usize,
}

impl CallStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::new(),
            capacity: capacity.min(MAX_CALL_STACK_DEPTH),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Hands `return_address` back if the stack is already at capacity.
    pub fn push(&mut self, return_address: u32) -> Result<(), u32> {
        if self.frames.len() >= self.capacity {
            return Err(return_address);
        }
        self.frames.push(return_address)
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.frames.pop()
    }

    /// Return addresses, outermost first.
    pub fn frames(&self) -> &[u32] {
        &self.frames
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_order() {
        let mut stack = CallStack::new(4);
        stack.push(0x10).unwrap();
        stack.push(0x20).unwrap();
        assert_eq!(stack.frames(), &[0x10, 0x20]);
        assert_eq!(stack.pop(), Some(0x20));
        assert_eq!(stack.pop(), Some(0x10));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn refuses_to_grow_past_capacity() {
        let mut stack = CallStack::new(2);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.push(3), Err(3));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn capacity_is_clamped() {
        let stack = CallStack::new(1000);
        assert_eq!(stack.capacity(), MAX_CALL_STACK_DEPTH);
    }

    #[test]
    fn zero_capacity_rejects_every_call() {
        let mut stack = CallStack::new(0);
        assert_eq!(stack.push(8), Err(8));
    }
}
