/// Remaining lives. Only wrong answers and misses cost a life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeTracker {
    lives: u32,
}

impl LifeTracker {
    pub fn new(lives: u32) -> Self {
        Self { lives }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_depleted(&self) -> bool {
        self.lives == 0
    }

    /// Lose one life, never going below zero. Returns `true` when no lives
    /// remain.
    pub fn decrement(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.is_depleted()
    }
}
