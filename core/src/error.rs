use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Clock is paused; resume before ticking")]
    ClockPaused,

    #[error("Game over on day {day}; restart to keep playing")]
    GameOver { day: u32 },

    #[error("Need at least {required} points of interest, have {available}")]
    NotEnoughPoints { required: usize, available: usize },

    #[error("Run not initialized")]
    RunNotInitialized,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
