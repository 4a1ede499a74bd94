//! Stacking of the most recent raw frames.
use crate::error::DeepqError;
use anyhow::Result;

/// Number of frames in a stacked observation.
pub const N_FRAMES: usize = 4;

/// Turns a window of raw frames into one observation.
pub trait ObsComposer<F> {
    /// Composed observation, the input of the action-value function.
    type Obs: Clone;

    /// Composes frames given from the oldest to the newest.
    fn compose(&self, frames: &[&F]) -> Result<Self::Obs>;
}

/// A ring buffer of the [`N_FRAMES`] most recent frames.
///
/// A push on a full stack overwrites the oldest frame.
#[derive(Debug, Clone)]
pub struct FrameStack<F> {
    frames: [Option<F>; N_FRAMES],
    head: usize,
    len: usize,
}

impl<F> Default for FrameStack<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FrameStack<F> {
    /// Constructs an empty stack.
    pub fn new() -> Self {
        Self {
            frames: std::array::from_fn(|_| None),
            head: 0,
            len: 0,
        }
    }

    /// Appends a frame, evicting the oldest one when the stack is full.
    pub fn push(&mut self, frame: F) {
        self.frames[self.head] = Some(frame);
        self.head = (self.head + 1) % N_FRAMES;
        self.len = (self.len + 1).min(N_FRAMES);
    }

    /// Removes all frames.
    pub fn clear(&mut self) {
        self.frames.iter_mut().for_each(|f| *f = None);
        self.head = 0;
        self.len = 0;
    }

    /// Returns the number of frames in the stack.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the stack holds no frame.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the stack holds [`N_FRAMES`] frames.
    pub fn is_full(&self) -> bool {
        self.len == N_FRAMES
    }

    /// Returns the frames from the oldest to the newest.
    pub fn frames(&self) -> Vec<&F> {
        (0..self.len)
            .filter_map(|k| self.frames[(self.head + N_FRAMES - self.len + k) % N_FRAMES].as_ref())
            .collect()
    }

    /// Composes the stacked frames into one observation.
    ///
    /// Fails with [`DeepqError::FrameStackNotFull`] before [`N_FRAMES`] pushes.
    pub fn compose<C: ObsComposer<F>>(&self, composer: &C) -> Result<C::Obs> {
        if !self.is_full() {
            return Err(DeepqError::FrameStackNotFull { len: self.len }.into());
        }
        composer.compose(&self.frames())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Concat;

    impl ObsComposer<u8> for Concat {
        type Obs = Vec<u8>;

        fn compose(&self, frames: &[&u8]) -> Result<Vec<u8>> {
            Ok(frames.iter().map(|&&f| f).collect())
        }
    }

    #[test]
    fn test_compose_requires_full_stack() {
        let mut stack = FrameStack::new();
        for f in 0..3u8 {
            stack.push(f);
            let err = stack.compose(&Concat).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<DeepqError>(),
                Some(DeepqError::FrameStackNotFull { .. })
            ));
        }
        stack.push(3);
        assert_eq!(stack.compose(&Concat).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_oldest_frame_is_evicted() {
        let mut stack = FrameStack::new();
        for f in 0..7u8 {
            stack.push(f);
        }
        assert_eq!(stack.len(), N_FRAMES);
        assert_eq!(stack.frames(), vec![&3, &4, &5, &6]);
        assert_eq!(stack.compose(&Concat).unwrap(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_clear() {
        let mut stack = FrameStack::new();
        for f in 0..5u8 {
            stack.push(f);
        }
        stack.clear();
        assert!(stack.is_empty());
        stack.push(9);
        assert_eq!(stack.frames(), vec![&9]);
    }
}
