use enum_dispatch::enum_dispatch;

#[enum_dispatch]
pub trait EpsilonSchedule {
    /// Exploration rate to use once `finished_episodes` games have been played.
    fn epsilon(&self, finished_episodes: u64) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f64);

impl EpsilonSchedule for Constant {
    fn epsilon(&self, _finished_episodes: u64) -> f64 {
        self.0
    }
}

/// `scale * (1 - k / num_training)`, never below zero.
#[derive(Debug, Clone, Copy)]
pub struct LinearDecay {
    pub scale: f64,
    pub num_training: u64,
}

impl LinearDecay {
    pub fn new(scale: f64, num_training: u64) -> Self {
        Self {
            scale,
            num_training,
        }
    }
}

impl EpsilonSchedule for LinearDecay {
    fn epsilon(&self, finished_episodes: u64) -> f64 {
        if self.num_training == 0 {
            return 0.0;
        }
        let remaining: f64 = 1.0 - finished_episodes as f64 / self.num_training as f64;
        (self.scale * remaining).max(0.0)
    }
}

#[derive(Debug, Clone, Copy)]
#[enum_dispatch(EpsilonSchedule)]
pub enum EnumEpsilonSchedule {
    Constant(Constant),
    LinearDecay(LinearDecay),
}
