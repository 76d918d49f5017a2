//! Pattern scores for Gomoku evaluation
//!
//! These constants define the scoring weights for various board patterns.
//! Carefully tuned for strong play with Ninuki-renju rules.

/// Pattern scores for evaluation
/// These are carefully tuned for strong play
pub struct PatternScore;

impl PatternScore {
    // Winning patterns
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;
    /// Capture win (5 pairs captured)
    pub const CAPTURE_WIN: i32 = 1_000_000;

    // Strong attacking patterns
    /// Open four: _OOOO_ (unstoppable without capture)
    pub const OPEN_FOUR: i32 = 100_000;
    /// Closed four: XOOOO_ or _OOOOX (one way to extend)
    pub const CLOSED_FOUR: i32 = 50_000;

    // Moderate threats
    /// Open three: _OOO_ (becomes open four if not blocked)
    pub const OPEN_THREE: i32 = 10_000;
    /// Closed three: XOOO_ or _OOOX (one side blocked)
    /// Must be well below OPEN_THREE (10K) — a closed three is half as dangerous
    /// since the opponent has a clear blocking point.
    pub const CLOSED_THREE: i32 = 1_500;

    // Building patterns
    /// Open two: _OO_ (potential to grow)
    pub const OPEN_TWO: i32 = 1_000;
    /// Closed two: XOO_ or _OOX (one side blocked)
    pub const CLOSED_TWO: i32 = 200;

    // Capture related — Pente captures are critical in Ninuki-renju.
    // A single capture removes 2 opponent stones AND advances toward capture win.
    /// Can capture opponent's pair next move
    pub const CAPTURE_THREAT: i32 = 8_000;
    /// Value per captured pair
    pub const CAPTURE_PAIR: i32 = 2_000;
    /// 4 pairs captured (one more = win) - must be >> OPEN_FOUR
    pub const NEAR_CAPTURE_WIN: i32 = 80_000;

    // Note: Defense-first behavior is handled by move ordering (score_move),
    // NOT by the evaluation function. The evaluation must be symmetric
    // for negamax correctness: evaluate(board, A) == -evaluate(board, B).
}

/// Tunable weight table backing [`crate::eval::evaluate`].
///
/// `PatternScore`'s constants are this struct's defaults. Pulling the weights
/// out into a value (rather than leaving them as associated constants) lets
/// the engine load alternate tunings from [`crate::config::Config`] while
/// keeping a single evaluator implementation. Every transposition-table and
/// eval-cache entry is scoped to [`HeuristicConfig::heuristic_hash`] so a
/// later weight change can never be served a score computed under a
/// different table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub five: i32,
    pub capture_win: i32,
    pub open_four: i32,
    pub closed_four: i32,
    pub open_three: i32,
    pub closed_three: i32,
    pub open_two: i32,
    pub closed_two: i32,
    pub capture_threat: i32,
    pub capture_pair: i32,
    pub near_capture_win: i32,
    /// Per-distance-unit bonus for stones near the board center.
    pub position_weight: i32,
    /// Penalty for each pair of own stones the opponent can capture next move.
    pub vulnerable_pair_penalty: i32,
}

impl HeuristicConfig {
    #[must_use]
    pub fn cap_weights(&self) -> [i32; 6] {
        [
            0,
            self.capture_pair,
            self.capture_pair * 3 + 1_000,
            self.near_capture_win / 4,
            self.near_capture_win,
            self.capture_win,
        ]
    }

    /// FNV-1a hash of the weight table, used to scope cached scores to the
    /// evaluator that produced them.
    #[must_use]
    pub fn heuristic_hash(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let fields = [
            self.five,
            self.capture_win,
            self.open_four,
            self.closed_four,
            self.open_three,
            self.closed_three,
            self.open_two,
            self.closed_two,
            self.capture_threat,
            self.capture_pair,
            self.near_capture_win,
            self.position_weight,
            self.vulnerable_pair_penalty,
        ];

        let mut hash = OFFSET;
        for field in fields {
            for byte in field.to_le_bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(PRIME);
            }
        }
        hash
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            five: PatternScore::FIVE,
            capture_win: PatternScore::CAPTURE_WIN,
            open_four: PatternScore::OPEN_FOUR,
            closed_four: PatternScore::CLOSED_FOUR,
            open_three: PatternScore::OPEN_THREE,
            closed_three: PatternScore::CLOSED_THREE,
            open_two: PatternScore::OPEN_TWO,
            closed_two: PatternScore::CLOSED_TWO,
            capture_threat: PatternScore::CAPTURE_THREAT,
            capture_pair: PatternScore::CAPTURE_PAIR,
            near_capture_win: PatternScore::NEAR_CAPTURE_WIN,
            position_weight: 3,
            vulnerable_pair_penalty: 4_000,
        }
    }
}

/// Capture-based scoring against a weight table. Same non-linear, symmetric
/// shape as [`capture_score`], parameterized by `cfg` instead of the fixed
/// `CAP_WEIGHTS` table.
#[must_use]
pub fn capture_score_cfg(my_captures: u8, opp_captures: u8, cfg: &HeuristicConfig) -> i32 {
    let weights = cfg.cap_weights();
    weights[my_captures.min(5) as usize] - weights[opp_captures.min(5) as usize]
}

/// Capture-based scoring with non-linear weights
///
/// The scoring is exponential as captures approach the winning threshold.
/// MUST be symmetric for negamax: capture_score(a, b) == -capture_score(b, a).
///
/// # Arguments
/// * `my_captures` - Number of pairs captured by the player
/// * `opp_captures` - Number of pairs captured by the opponent
///
/// # Returns
/// Score differential (positive = advantage, negative = disadvantage)
pub fn capture_score(my_captures: u8, opp_captures: u8) -> i32 {
    // Non-linear scoring - closer to win = exponentially more valuable
    // Each level must be significantly higher than pattern threats at that stage
    // to ensure the AI treats capture accumulation as a serious strategic factor.
    const CAP_WEIGHTS: [i32; 6] = [
        0,
        2_000,     // 1 capture: minor advantage
        7_000,     // 2 captures: moderate (> CLOSED_THREE)
        20_000,    // 3 captures: serious threat (> OPEN_THREE)
        PatternScore::NEAR_CAPTURE_WIN, // 4 captures: 80K, near-winning
        PatternScore::CAPTURE_WIN,      // 5 captures: 1M, game over
    ];

    let my_score = CAP_WEIGHTS[my_captures.min(5) as usize];
    let opp_score = CAP_WEIGHTS[opp_captures.min(5) as usize];

    my_score - opp_score
}
