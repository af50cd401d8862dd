use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::env::{Env, GameState};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeOutcome {
    pub score: f64,
    pub steps: u64,
    /// the host reports the game as won
    pub won: bool,
    /// stopped by `max_steps` before the game ended
    pub truncated: bool,
}

/// Plays one game: `get_action` until the host reports a terminal state,
/// then `final_update`. A game cut short by `max_steps` still gets its
/// final update so the agent's bookkeeping stays consistent.
pub fn play_episode<S: GameState>(
    env: &mut dyn Env<S>,
    agent: &mut dyn Agent<S>,
    max_steps: u64,
) -> Result<EpisodeOutcome> {
    let mut state: S = env.reset();
    let mut steps: u64 = 0;
    while !state.is_terminal() && steps < max_steps {
        let action = agent.get_action(&state)?;
        state = env.step(action)?;
        steps += 1;
    }
    let truncated: bool = !state.is_terminal();
    if truncated {
        warn!(steps, "episode truncated before the game ended");
    }
    if steps > 0 {
        agent.final_update(&state)?;
    }
    debug!(score = state.score(), steps, "episode finished");
    Ok(EpisodeOutcome {
        score: state.score(),
        steps,
        won: state.is_win(),
        truncated,
    })
}

/// Share of won games among `outcomes`.
pub fn win_rate(outcomes: &[EpisodeOutcome]) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    outcomes.iter().filter(|o| o.won).count() as f64 / outcomes.len() as f64
}

pub fn average_score(outcomes: &[EpisodeOutcome]) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    outcomes.iter().map(|o| o.score).sum::<f64>() / outcomes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::BanditAgent;
    use crate::env::{Direction, GridGame, GridState, Layout};

    struct AlwaysEast;

    impl Agent<GridState> for AlwaysEast {
        fn get_action(&mut self, _state: &GridState) -> Result<Direction> {
            Ok(Direction::East)
        }
    }

    #[test]
    fn plays_until_the_game_ends() {
        let layout: Layout = "%%%%%\n%P .%\n%%%%%".parse().unwrap();
        let mut game = GridGame::new(layout, 0);
        let mut agent = BanditAgent::new(0.0, 0).unwrap();
        let outcome = play_episode::<GridState>(&mut game, &mut agent, 100).unwrap();
        // Pacman may wander, but every move costs one point
        assert!(!outcome.truncated);
        assert!(outcome.won);
        assert_eq!(outcome.score, 510.0 - outcome.steps as f64);
    }

    #[test]
    fn long_wins_still_count_with_a_negative_score() {
        let corridor: String = format!("P{}.", " ".repeat(529));
        let wall: String = "%".repeat(corridor.len() + 2);
        let layout: Layout = format!("{wall}\n%{corridor}%\n{wall}").parse().unwrap();
        let mut game = GridGame::new(layout, 0);
        let mut agent = AlwaysEast;
        let outcome = play_episode::<GridState>(&mut game, &mut agent, 1000).unwrap();
        assert_eq!(outcome.steps, 530);
        assert_eq!(outcome.score, 510.0 - 530.0);
        assert!(!outcome.truncated);
        assert!(outcome.won);
    }

    #[test]
    fn truncated_games_are_not_wins() {
        let layout: Layout = "%%%%%%%%\n%P    .%\n%%%%%%%%".parse().unwrap();
        let mut game = GridGame::new(layout, 0);
        let mut agent = BanditAgent::new(0.0, 0).unwrap();
        let outcome = play_episode::<GridState>(&mut game, &mut agent, 2).unwrap();
        assert!(outcome.truncated);
        assert!(!outcome.won);
        assert_eq!(outcome.steps, 2);
    }

    #[test]
    fn summaries() {
        let o = |score: f64, won: bool| EpisodeOutcome {
            score,
            steps: 1,
            won,
            truncated: false,
        };
        let outcomes = [o(500.0, true), o(-500.0, false)];
        assert_eq!(win_rate(&outcomes), 0.5);
        assert_eq!(average_score(&outcomes), 0.0);
        assert_eq!(win_rate(&[]), 0.0);
    }
}
