use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::SliderError;
use crate::state::ShaderState;
use crate::texture::TextureRef;
use crate::timeline::{Easing, Tween};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Animating,
}

/// What one [`TransitionController::advance`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    Idle,
    Progress,
    /// The tween reached 1.0; [`TransitionController::commit`] must follow
    /// once the final frame has been drawn.
    Completed { index: usize },
}

struct ActiveTransition {
    index: usize,
    target: TextureRef,
    tween: Tween,
    finished: bool,
}

/// Drives `disp_factor` from its current value to 1.0 and swaps textures.
/// At most one transition is active at a time.
pub struct TransitionController {
    duration: Duration,
    easing: Easing,
    active: Option<ActiveTransition>,
}

impl TransitionController {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            active: None,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.active.is_some() {
            TransitionPhase::Animating
        } else {
            TransitionPhase::Idle
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.index)
    }

    pub fn begin(
        &mut self,
        shader: &mut ShaderState,
        index: usize,
        target: TextureRef,
        now: Instant,
    ) -> Result<(), SliderError> {
        if self.active.is_some() {
            return Err(SliderError::TransitionBusy);
        }
        debug!(
            index,
            source = %target.source,
            duration_ms = self.duration.as_millis() as u64,
            "starting transition"
        );
        shader.next = Some(target.clone());
        let tween = Tween::new(shader.disp_factor, 1.0, self.duration, self.easing, now);
        self.active = Some(ActiveTransition {
            index,
            target,
            tween,
            finished: false,
        });
        Ok(())
    }

    pub fn advance(&mut self, shader: &mut ShaderState, now: Instant) -> TransitionStep {
        let Some(active) = self.active.as_mut() else {
            return TransitionStep::Idle;
        };
        if active.finished {
            return TransitionStep::Completed {
                index: active.index,
            };
        }
        let (value, finished) = active.tween.sample(now);
        shader.disp_factor = value;
        if finished {
            active.finished = true;
            shader.disp_factor = active.tween.target();
            TransitionStep::Completed {
                index: active.index,
            }
        } else {
            TransitionStep::Progress
        }
    }

    /// Makes the target texture current and resets the factor. Returns the
    /// committed index, or `None` when nothing had completed.
    pub fn commit(&mut self, shader: &mut ShaderState) -> Option<usize> {
        if !self.active.as_ref().is_some_and(|active| active.finished) {
            return None;
        }
        let active = self.active.take()?;
        shader.current = Some(active.target);
        shader.disp_factor = 0.0;
        debug!(index = active.index, "transition committed");
        Some(active.index)
    }
}
