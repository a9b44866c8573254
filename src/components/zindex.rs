//! Z-index component for render ordering.
//!
//! The [`ZIndex`] component controls the drawing order of entities. Entities
//! with higher z-index values are drawn on top of those with lower values;
//! entities without one draw at 0.

use bevy_ecs::prelude::Component;

/// Rendering order hint for 2D drawing.
///
/// Higher values are drawn later (on top). The render pass sorts by
/// `ZIndex` to achieve a painter's algorithm.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);
