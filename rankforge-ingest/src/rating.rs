//! Elo-style rank updates (spec §4.5). Pure functions only; the
//! read-modify-write against storage, including the per-player lock, lives
//! in the commit coordinator, which is the one place that talks to a
//! `Transaction`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingConfig {
    pub base_k: f64,
    pub headshot_k: f64,
    pub initial_rank: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            base_k: 32.0,
            headshot_k: 64.0,
            initial_rank: 1000.0,
        }
    }
}

pub fn expected_score(rank_a: f64, rank_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rank_b - rank_a) / 400.0))
}

/// Returns the updated `(killer_rank, victim_rank)` after one kill.
pub fn apply_kill(
    killer_rank: f64,
    victim_rank: f64,
    is_headshot: bool,
    config: &RatingConfig,
) -> (f64, f64) {
    let k = if is_headshot {
        config.headshot_k
    } else {
        config.base_k
    };
    let expected_killer = expected_score(killer_rank, victim_rank);
    let delta = k * (1.0 - expected_killer);
    (killer_rank + delta, victim_rank - delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_ranks_split_evenly() {
        let config = RatingConfig::default();
        let (killer, victim) = apply_kill(1000.0, 1000.0, false, &config);
        assert_eq!(killer, 1016.0);
        assert_eq!(victim, 984.0);
    }

    #[test]
    fn headshot_doubles_the_swing() {
        let config = RatingConfig::default();
        let (killer, victim) = apply_kill(1000.0, 1000.0, true, &config);
        assert_eq!(killer, 1032.0);
        assert_eq!(victim, 968.0);
    }

    #[test]
    fn underdog_kill_swings_more_than_favorite_kill() {
        let config = RatingConfig::default();
        let (underdog_new, _) = apply_kill(900.0, 1100.0, false, &config);
        let (favorite_new, _) = apply_kill(1100.0, 900.0, false, &config);
        assert!(underdog_new - 900.0 > favorite_new - 1100.0);
    }
}
