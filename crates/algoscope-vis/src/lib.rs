//! Algoscope Visualization
//!
//! Replays recorded steps with playback controls and serves them to a
//! rendering surface.
//!
//! # Architecture
//!
//! - **Render**: folds steps into the state a surface draws
//! - **Playback**: a synchronous cursor with reset and seek
//! - **Player**: auto mode on a timer, step mode behind a single-slot gate
//! - **REST API**: run algorithms, mutate the tree and trie, control playback
//! - **WebSocket**: streams each applied step
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisConfig::from_env());
//! server.serve().await?;
//! ```

mod config;
mod error;
mod gate;
mod player;
mod playback;
mod render;
mod server;

pub use config::VisConfig;
pub use error::{Error, Result};
pub use gate::{Cancelled, StepGate};
pub use player::{AppliedStep, Player};
pub use playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus};
pub use render::RenderState;
pub use server::VisServer;

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_algorithms::execute;

    #[test]
    fn playback_replays_an_algorithm_run() {
        let run = execute("heapSort", &[4.0, 1.0, 3.0, 2.0], None).unwrap();
        let initial = RenderState::for_array(&[4.0, 1.0, 3.0, 2.0]);
        let mut playback = Playback::new(run.steps.clone(), initial);

        playback.play();
        while playback.advance().is_some() {}

        assert_eq!(playback.state(), PlaybackState::Done);
        assert_eq!(playback.cursor(), run.steps.len());
        assert_eq!(playback.render().array, run.final_array);
        assert!(playback.render().finished);
    }

    #[tokio::test]
    async fn player_drives_a_search_to_its_result() {
        let run = execute("binarySearch", &[9.0, 3.0, 7.0, 1.0], Some(7.0)).unwrap();
        let playback = Playback::new(run.steps, RenderState::default())
            .with_speed(PlaybackSpeed::new(1, 1));
        let player = Player::new(playback);

        player.start().await;
        player.wait().await;

        let render = player.render().await;
        assert_eq!(render.found_index, Some(2));
        assert_eq!(render.array, vec![1.0, 3.0, 7.0, 9.0]);
    }
}
