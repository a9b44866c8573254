//! Animation playback cursor component.
//!
//! An [`Animation`] plays one [`AnimationData`] catalog: it remembers which
//! state is active and which frame of that state is showing. Frames loop
//! unconditionally; there is no "finished" notion.
//!
//! The cursor never schedules itself. The game loop calls [`Animation::tick`]
//! once per frame (the [`animation`](crate::systems::animation::animation)
//! system does this) and the cursor advances every `refresh_rate` ticks, or
//! the caller drives [`Animation::advance`] directly on its own cadence.

use std::sync::Arc;

use bevy_ecs::prelude::Component;

use crate::error::Result;
use crate::resources::animationdata::AnimationData;
use crate::resources::tileset::TileRect;

#[derive(Debug, Clone, Component)]
pub struct Animation {
    data: Arc<AnimationData>,
    current_state: usize,
    current_frame: u32,
    refresh_rate: u32,
    ticks: u32,
}

impl Animation {
    /// Bind to `data`, playing at the catalog's refresh rate.
    pub fn new(data: Arc<AnimationData>) -> Self {
        let refresh_rate = data.refresh_rate();
        Self::with_refresh_rate(data, refresh_rate)
    }

    pub fn with_refresh_rate(data: Arc<AnimationData>, refresh_rate: u32) -> Self {
        let current_frame = data.state(0).map(|s| s.first_frame).unwrap_or(0);
        Self {
            data,
            current_state: 0,
            current_frame,
            refresh_rate,
            ticks: 0,
        }
    }

    pub fn current_state(&self) -> usize {
        self.current_state
    }

    /// Absolute frame index in the tileset.
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }

    pub fn data(&self) -> &Arc<AnimationData> {
        &self.data
    }

    /// Switch to `new_state`, restarting at its first frame.
    ///
    /// On error the cursor is left untouched.
    pub fn set_state(&mut self, new_state: usize) -> Result<()> {
        let first_frame = self.data.state(new_state)?.first_frame;
        self.current_state = new_state;
        self.current_frame = first_frame;
        self.ticks = 0;
        Ok(())
    }

    /// Step one frame, wrapping to the first frame after the last one.
    pub fn advance(&mut self) {
        let Ok(state) = self.data.state(self.current_state) else {
            return;
        };
        self.current_frame = if self.current_frame >= state.last_frame {
            state.first_frame
        } else {
            self.current_frame + 1
        };
    }

    /// Count one caller tick and advance when `refresh_rate` ticks have passed.
    ///
    /// Returns `true` if the frame changed.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks < self.refresh_rate {
            return false;
        }
        self.ticks = 0;
        let before = self.current_frame;
        self.advance();
        before != self.current_frame
    }

    /// Source rectangle of the current frame in the bound tileset.
    pub fn tile_rect(&self) -> Result<TileRect> {
        self.data.tileset().tile_rect(self.current_frame)
    }
}
