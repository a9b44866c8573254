//! Animation catalog for one tileset.
//!
//! [`AnimationData`] is an append-only list of [`AnimationState`]s, each a
//! closed range of frames in the tileset. It is built once while loading and
//! then shared (read-only) by every [`Animation`] cursor playing it.
//!
//! [`Animation`]: crate::components::animation::Animation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Result, TilesparkError};
use crate::resources::tileset::Tileset;

/// Ticks between frame advances when no refresh rate is configured.
pub const DEFAULT_ANIMATION_REFRESH_RATE: u32 = 25;

/// One named sequence: frames `first_frame..=last_frame` of the tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState {
    pub first_frame: u32,
    pub last_frame: u32,
    /// Sheet row tag carried through from configuration.
    #[serde(default)]
    pub row: u32,
}

impl AnimationState {
    pub fn new(first_frame: u32, last_frame: u32) -> Self {
        Self {
            first_frame,
            last_frame,
            row: 0,
        }
    }

    pub fn with_row(mut self, row: u32) -> Self {
        self.row = row;
        self
    }

    /// Number of frames in the sequence.
    pub fn frame_count(&self) -> u32 {
        self.last_frame.saturating_sub(self.first_frame) + 1
    }

    pub fn contains(&self, frame: u32) -> bool {
        (self.first_frame..=self.last_frame).contains(&frame)
    }
}

/// Append-only catalog of animation states bound to one tileset.
#[derive(Debug, Clone)]
pub struct AnimationData {
    tileset: Arc<Tileset>,
    states: SmallVec<[AnimationState; 8]>,
    refresh_rate: u32,
}

impl AnimationData {
    pub fn new(tileset: Arc<Tileset>) -> Self {
        Self::with_refresh_rate(tileset, DEFAULT_ANIMATION_REFRESH_RATE)
    }

    pub fn with_refresh_rate(tileset: Arc<Tileset>, refresh_rate: u32) -> Self {
        Self {
            tileset,
            states: SmallVec::new(),
            refresh_rate,
        }
    }

    /// Append `state`; its index is the previous [`n_states`](Self::n_states).
    ///
    /// Fails if the state's last frame lies outside the tileset or the range
    /// is inverted. The catalog is left unchanged on failure.
    pub fn add_state(&mut self, state: AnimationState) -> Result<usize> {
        let frame_count = self.tileset.frame_count();
        if state.last_frame >= frame_count {
            return Err(TilesparkError::out_of_range(
                "frame",
                state.last_frame as usize,
                frame_count as usize,
            ));
        }
        if state.first_frame > state.last_frame {
            return Err(TilesparkError::invalid(format!(
                "animation state frames {}-{} are inverted",
                state.first_frame, state.last_frame
            )));
        }
        self.states.push(state);
        Ok(self.states.len() - 1)
    }

    pub fn state(&self, index: usize) -> Result<&AnimationState> {
        self.states
            .get(index)
            .ok_or_else(|| TilesparkError::out_of_range("state", index, self.states.len()))
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[AnimationState] {
        &self.states
    }

    pub fn tileset(&self) -> &Arc<Tileset> {
        &self.tileset
    }

    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset() -> Arc<Tileset> {
        Arc::new(Tileset::new("tiles", 64, 64, 32, 32).unwrap())
    }

    fn sample_states() -> Vec<AnimationState> {
        vec![
            AnimationState::new(0, 1),
            AnimationState::new(2, 2).with_row(1),
            AnimationState::new(1, 2).with_row(2),
        ]
    }

    #[test]
    fn test_references_its_tileset() {
        let t = tileset();
        let data = AnimationData::new(Arc::clone(&t));
        assert!(Arc::ptr_eq(data.tileset(), &t));
    }

    #[test]
    fn test_default_refresh_rate() {
        let data = AnimationData::new(tileset());
        assert_eq!(data.refresh_rate(), DEFAULT_ANIMATION_REFRESH_RATE);
    }

    #[test]
    fn test_given_refresh_rate() {
        let data = AnimationData::with_refresh_rate(tileset(), 30);
        assert_eq!(data.refresh_rate(), 30);
    }

    #[test]
    fn test_added_states_keep_insertion_order() {
        let mut data = AnimationData::new(tileset());
        for (i, state) in sample_states().into_iter().enumerate() {
            assert_eq!(data.add_state(state).unwrap(), i);
        }
        for (i, state) in sample_states().iter().enumerate() {
            assert_eq!(data.state(i).unwrap(), state);
        }
    }

    #[test]
    fn test_n_states_counts_additions() {
        let mut data = AnimationData::new(tileset());
        assert_eq!(data.n_states(), 0);
        for (i, state) in sample_states().into_iter().enumerate() {
            data.add_state(state).unwrap();
            assert_eq!(data.n_states(), i + 1);
        }
    }

    #[test]
    fn test_out_of_range_last_frame_rejected() {
        let mut data = AnimationData::new(tileset());
        assert!(matches!(
            data.add_state(AnimationState::new(0, 5)),
            Err(TilesparkError::OutOfRange { .. })
        ));
        assert!(matches!(
            data.add_state(AnimationState::new(0, 4)),
            Err(TilesparkError::OutOfRange { .. })
        ));
        assert!(data.add_state(AnimationState::new(0, 3)).is_ok());
        assert_eq!(data.n_states(), 1);
    }

    #[test]
    fn test_add_state_succeeds_iff_last_frame_below_frame_count() {
        let frames = tileset().frame_count();
        for last in 0..frames + 3 {
            let mut data = AnimationData::new(tileset());
            assert_eq!(data.add_state(AnimationState::new(0, last)).is_ok(), last < frames);
        }
    }

    #[test]
    fn test_inverted_state_rejected() {
        let mut data = AnimationData::new(tileset());
        assert!(matches!(
            data.add_state(AnimationState::new(3, 1)),
            Err(TilesparkError::InvalidConfiguration(_))
        ));
        assert_eq!(data.n_states(), 0);
    }

    #[test]
    fn test_out_of_range_state_lookup() {
        let mut data = AnimationData::new(tileset());
        assert!(data.state(0).is_err());
        data.add_state(AnimationState::new(0, 1)).unwrap();
        assert!(data.state(0).is_ok());
        assert!(matches!(
            data.state(1),
            Err(TilesparkError::OutOfRange { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn test_state_frame_count_and_contains() {
        let s = AnimationState::new(1, 3);
        assert_eq!(s.frame_count(), 3);
        assert!(s.contains(1));
        assert!(s.contains(3));
        assert!(!s.contains(0));
        assert!(!s.contains(4));
    }
}
