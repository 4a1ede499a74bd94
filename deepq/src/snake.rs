//! Snake game rendered as RGB frames.
use anyhow::{ensure, Result};
use deepq_core::{Env, Step};
use log::trace;
use ndarray::Array3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;

/// Height and width of rendered frames.
pub const FRAME_SIZE: usize = 64;

/// Number of actions: up, right, down and left.
pub const NUM_ACTIONS: usize = 4;

const HEAD: [u8; 3] = [0, 255, 0];
const BODY: [u8; 3] = [0, 128, 0];
const FOOD: [u8; 3] = [255, 0, 0];

/// Snake on a square grid.
///
/// Actions set the direction of the head. Eating food gives +1 and grows the
/// snake by one cell. Hitting a wall or the body gives -1 and ends the episode,
/// as does filling the whole grid.
pub struct SnakeGame {
    size: usize,
    snake: VecDeque<(usize, usize)>,
    food: Option<(usize, usize)>,
    rng: StdRng,
}

impl SnakeGame {
    /// Constructs a game on a `size x size` grid.
    pub fn new(size: usize, seed: u64) -> Result<Self> {
        ensure!(size >= 2, "grid size must be at least 2, got {}", size);
        let mut game = Self {
            size,
            snake: VecDeque::new(),
            food: None,
            rng: StdRng::seed_from_u64(seed),
        };
        game.reset();
        Ok(game)
    }

    /// Returns the number of cells occupied by the snake.
    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    fn reset(&mut self) {
        self.snake.clear();
        self.snake.push_front((self.size / 2, self.size / 2));
        self.food = self.place_food();
    }

    /// Picks an empty cell uniformly, `None` if the grid is full.
    fn place_food(&mut self) -> Option<(usize, usize)> {
        let empty = (0..self.size * self.size)
            .map(|i| (i / self.size, i % self.size))
            .filter(|cell| !self.snake.contains(cell))
            .collect::<Vec<_>>();
        if empty.is_empty() {
            None
        } else {
            Some(empty[self.rng.gen_range(0..empty.len())])
        }
    }

    /// Returns the cell next to the head in the direction of `act`.
    fn next_head(&self, act: usize) -> Option<(usize, usize)> {
        let (y, x) = *self.snake.front()?;
        match act {
            0 => y.checked_sub(1).map(|y| (y, x)),
            1 => (x + 1 < self.size).then_some((y, x + 1)),
            2 => (y + 1 < self.size).then_some((y + 1, x)),
            _ => x.checked_sub(1).map(|x| (y, x)),
        }
    }
}

impl Env for SnakeGame {
    type Frame = Array3<u8>;

    fn init(&mut self) -> Result<()> {
        self.reset();
        Ok(())
    }

    fn state(&self) -> Result<Array3<u8>> {
        let mut cells = vec![[0u8; 3]; self.size * self.size];
        for (i, &(y, x)) in self.snake.iter().enumerate() {
            cells[y * self.size + x] = if i == 0 { HEAD } else { BODY };
        }
        if let Some((y, x)) = self.food {
            cells[y * self.size + x] = FOOD;
        }

        let n = self.size;
        Ok(Array3::from_shape_fn((FRAME_SIZE, FRAME_SIZE, 3), |(py, px, c)| {
            cells[(py * n / FRAME_SIZE) * n + px * n / FRAME_SIZE][c]
        }))
    }

    fn step(&mut self, act: usize) -> Result<Step<Array3<u8>>> {
        ensure!(act < NUM_ACTIONS, "invalid action {}", act);

        let head = match self.next_head(act) {
            Some(head) => head,
            None => return Ok(Step::new(self.state()?, -1.0, true)),
        };
        let eats = self.food == Some(head);

        // The tail moves away unless the snake grows
        if !eats {
            self.snake.pop_back();
        }
        if self.snake.contains(&head) {
            return Ok(Step::new(self.state()?, -1.0, true));
        }
        self.snake.push_front(head);

        let (reward, is_done) = if eats {
            self.food = self.place_food();
            trace!("food eaten, length {}", self.snake.len());
            (1.0, self.food.is_none())
        } else {
            (0.0, false)
        };

        Ok(Step::new(self.state()?, reward, is_done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_shape() -> Result<()> {
        let game = SnakeGame::new(30, 0)?;
        let frame = game.state()?;
        assert_eq!(frame.dim(), (FRAME_SIZE, FRAME_SIZE, 3));
        assert!(frame.iter().any(|&v| v == 255));
        Ok(())
    }

    #[test]
    fn test_wall_ends_episode() -> Result<()> {
        let mut game = SnakeGame::new(4, 0)?;
        game.food = Some((3, 3));
        game.snake = VecDeque::from([(2, 2)]);

        assert_eq!(game.step(0)?.reward, 0.0);
        assert_eq!(game.step(0)?.reward, 0.0);
        let step = game.step(0)?;
        assert_eq!(step.reward, -1.0);
        assert!(step.is_done);
        Ok(())
    }

    #[test]
    fn test_eating_grows_snake() -> Result<()> {
        let mut game = SnakeGame::new(10, 0)?;
        game.snake = VecDeque::from([(5, 5)]);
        game.food = Some((5, 6));

        let step = game.step(1)?;
        assert_eq!(step.reward, 1.0);
        assert!(!step.is_done);
        assert_eq!(game.snake_len(), 2);
        assert_ne!(game.food, Some((5, 6)));
        Ok(())
    }

    #[test]
    fn test_body_collision() -> Result<()> {
        let mut game = SnakeGame::new(10, 0)?;
        game.food = Some((0, 0));
        game.snake = VecDeque::from([(5, 5), (5, 6), (6, 6), (6, 5), (6, 4)]);

        // Turning down hits the body
        let step = game.step(2)?;
        assert_eq!(step.reward, -1.0);
        assert!(step.is_done);
        Ok(())
    }

    #[test]
    fn test_init_resets() -> Result<()> {
        let mut game = SnakeGame::new(10, 0)?;
        game.snake = VecDeque::from([(1, 1), (1, 2), (1, 3)]);
        game.init()?;
        assert_eq!(game.snake_len(), 1);
        Ok(())
    }
}
