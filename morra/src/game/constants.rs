/// Lowest card a player may throw.
pub const MIN_CARD: u8 = 1;
/// Highest card a player may throw.
pub const MAX_CARD: u8 = 5;
/// Lowest total a player may predict.
pub const MIN_PREDICTION: u8 = 1;
/// Highest total a player may predict.
pub const MAX_PREDICTION: u8 = 10;
/// Player identifiers are truncated to this many characters.
pub const MAX_PLAYER_ID_LENGTH: usize = 64;
/// Default lower bound on a game's bet amount.
pub const DEFAULT_MIN_BET: u64 = 0;
/// Default upper bound on a game's bet amount (10 SOL in lamports).
pub const DEFAULT_MAX_BET: u64 = 10_000_000_000;
/// Default number of optimistic-concurrency retries per transition.
pub const DEFAULT_MAX_UPDATE_RETRIES: u32 = 5;
/// Default buffered records per game subscription channel.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 32;
