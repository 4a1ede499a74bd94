//! Fixed-capacity replay buffer.
use super::{ReplayBufferConfig, Transition, TransitionBatch};
use crate::error::DeepqError;
use anyhow::Result;
use rand::Rng;

/// A fixed-capacity replay buffer with uniform sampling.
///
/// The five sequences grow together until `capacity` is reached. After that,
/// the write position `i` cycles over the sequences and always points to the
/// oldest transition, which is the one overwritten by the next push.
pub struct ReplayBuffer<O> {
    capacity: usize,
    i: usize,
    obs: Vec<O>,
    act: Vec<usize>,
    next_obs: Vec<O>,
    reward: Vec<f32>,
    is_done: Vec<bool>,
}

impl<O: Clone> ReplayBuffer<O> {
    /// Builds an empty replay buffer.
    pub fn build(config: &ReplayBufferConfig) -> Result<Self> {
        let capacity = config.capacity;
        if capacity == 0 {
            return Err(DeepqError::InvalidConfig(
                "replay buffer capacity must be positive".to_string(),
            )
            .into());
        }

        Ok(Self {
            capacity,
            i: 0,
            obs: Vec::with_capacity(capacity),
            act: Vec::with_capacity(capacity),
            next_obs: Vec::with_capacity(capacity),
            reward: Vec::with_capacity(capacity),
            is_done: Vec::with_capacity(capacity),
        })
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of stored transitions.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if no transition is stored.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Returns `true` if a batch of the given size can be sampled,
    /// i.e., the buffer holds more than `batch_size` transitions.
    pub fn is_ready(&self, batch_size: usize) -> bool {
        self.len() > batch_size
    }

    /// Pushes a transition, evicting the oldest one if the buffer is full.
    pub fn push(&mut self, tr: Transition<O>) {
        let Transition {
            obs,
            act,
            reward,
            next_obs,
            is_done,
        } = tr;

        if self.len() < self.capacity {
            self.obs.push(obs);
            self.act.push(act);
            self.next_obs.push(next_obs);
            self.reward.push(reward);
            self.is_done.push(is_done);
        } else {
            let i = self.i;
            self.obs[i] = obs;
            self.act[i] = act;
            self.next_obs[i] = next_obs;
            self.reward[i] = reward;
            self.is_done[i] = is_done;
            self.i = (i + 1) % self.capacity;
        }
    }

    /// Returns the transition at `ix`, counted from the oldest one.
    pub fn get(&self, ix: usize) -> Option<Transition<O>> {
        if ix >= self.len() {
            return None;
        }
        let j = self.position(ix);

        Some(Transition::new(
            self.obs[j].clone(),
            self.act[j],
            self.reward[j],
            self.next_obs[j].clone(),
            self.is_done[j],
        ))
    }

    /// Samples `size` transitions uniformly at random, with replacement.
    ///
    /// Fails with [`DeepqError::NotReady`] unless the buffer holds more than
    /// `size` transitions.
    pub fn batch<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Result<TransitionBatch<O>> {
        if !self.is_ready(size) {
            return Err(DeepqError::NotReady {
                len: self.len(),
                batch_size: size,
            }
            .into());
        }

        let len = self.len();
        let ixs = (0..size)
            .map(|_| rng.gen_range(0..len))
            .collect::<Vec<_>>();
        let js = ixs.iter().map(|&ix| self.position(ix)).collect::<Vec<_>>();

        Ok(TransitionBatch {
            obs: js.iter().map(|&j| self.obs[j].clone()).collect(),
            act: js.iter().map(|&j| self.act[j]).collect(),
            next_obs: js.iter().map(|&j| self.next_obs[j].clone()).collect(),
            reward: js.iter().map(|&j| self.reward[j]).collect(),
            is_done: js.iter().map(|&j| self.is_done[j]).collect(),
            ix_sample: ixs,
        })
    }

    /// Maps an index counted from the oldest transition to a storage position.
    #[inline]
    fn position(&self, ix: usize) -> usize {
        if self.len() < self.capacity {
            ix
        } else {
            (self.i + ix) % self.capacity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn tr(k: usize) -> Transition<usize> {
        Transition::new(k, k % 4, k as f32, k + 1, k % 5 == 0)
    }

    fn buffer(capacity: usize) -> ReplayBuffer<usize> {
        ReplayBuffer::build(&ReplayBufferConfig::default().capacity(capacity)).unwrap()
    }

    fn assert_aligned<O>(b: &ReplayBuffer<O>) {
        let n = b.reward.len();
        assert_eq!(b.obs.len(), n);
        assert_eq!(b.act.len(), n);
        assert_eq!(b.next_obs.len(), n);
        assert_eq!(b.is_done.len(), n);
        assert!(n <= b.capacity);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut b = buffer(3);
        for k in 1..=4 {
            b.push(tr(k));
        }

        assert_eq!(b.len(), 3);
        let contents = (0..3).map(|ix| b.get(ix).unwrap()).collect::<Vec<_>>();
        assert_eq!(contents, vec![tr(2), tr(3), tr(4)]);
        assert!(b.get(3).is_none());
    }

    #[test]
    fn test_sequences_stay_aligned() {
        let mut b = buffer(7);
        for k in 0..30 {
            b.push(tr(k));
            assert_aligned(&b);
            assert_eq!(b.len(), (k + 1).min(7));
        }

        // The oldest entry is the 7th most recent push
        assert_eq!(b.get(0).unwrap(), tr(23));
        assert_eq!(b.get(6).unwrap(), tr(29));
    }

    #[test]
    fn test_not_ready_until_more_than_batch_size() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut b = buffer(10);
        for k in 0..4 {
            b.push(tr(k));
        }

        assert!(!b.is_ready(4));
        let err = b.batch(4, &mut rng).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeepqError>(),
            Some(DeepqError::NotReady {
                len: 4,
                batch_size: 4
            })
        ));

        b.push(tr(4));
        assert!(b.is_ready(4));
        assert_eq!(b.batch(4, &mut rng).unwrap().len(), 4);
    }

    #[test]
    fn test_batch_is_consistent_with_contents() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut b = buffer(5);
        for k in 0..12 {
            b.push(tr(k));
        }

        let mut seen = [false; 5];
        for _ in 0..50 {
            let batch = b.batch(4, &mut rng).unwrap();
            assert_eq!(batch.len(), 4);
            for (n, &ix) in batch.ix_sample.iter().enumerate() {
                assert!(ix < 5);
                seen[ix] = true;
                let expected = b.get(ix).unwrap();
                assert_eq!(batch.obs[n], expected.obs);
                assert_eq!(batch.act[n], expected.act);
                assert_eq!(batch.next_obs[n], expected.next_obs);
                assert_eq!(batch.reward[n], expected.reward);
                assert_eq!(batch.is_done[n], expected.is_done);
            }
        }

        // Only the 5 most recent transitions remain and all of them are drawn
        assert!(seen.iter().all(|&s| s));
        assert!((0..5).all(|ix| b.get(ix).unwrap().obs >= 7));
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let mut b = buffer(100);
        for k in 0..100 {
            b.push(tr(k));
        }
        let ixs1 = b.batch(32, &mut StdRng::seed_from_u64(7)).unwrap().ix_sample;
        let ixs2 = b.batch(32, &mut StdRng::seed_from_u64(7)).unwrap().ix_sample;

        assert_eq!(ixs1, ixs2);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(ReplayBuffer::<usize>::build(&ReplayBufferConfig::default().capacity(0)).is_err());
    }
}
