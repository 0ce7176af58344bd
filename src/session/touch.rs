//! Touch gesture sequencing.
//!
//! Gestures are sequences of three touch primitives sent to the server's
//! `injectInputEvent` method: press (action 0), release (action 1), and
//! move (action 2), always on the first pointer. Primitives execute eagerly
//! when awaited and return the session handle, so gestures chain fluently:
//!
//! ```no_run
//! # async fn example(session: &android_automator::Session) -> android_automator::Result<()> {
//! session
//!     .press(100, 200).await?
//!     .pause(0.25).await
//!     .move_to(300, 200).await?
//!     .release(300, 200).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Composite gestures ([`Session::tap`], [`Session::long_press`],
//! [`Session::swipe`]) are built purely from the primitives above; they
//! issue no additional protocol calls.
//!
//! There is no cancellation: a caller that abandons a chain mid-way leaves
//! the device in whatever state the last delivered primitive left it.
//! Always match a press with a release.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::sleep;
use tracing::trace;

use crate::error::Result;

use super::core::Session;

// ============================================================================
// Constants
// ============================================================================

/// Touch-down action code.
const ACTION_PRESS: i32 = 0;

/// Touch-up action code.
const ACTION_RELEASE: i32 = 1;

/// Touch-move action code.
const ACTION_MOVE: i32 = 2;

/// All gestures use the first pointer.
const POINTER_ID: i32 = 0;

/// Pause between press and release in a tap (100ms).
const TAP_PAUSE_SECS: f64 = 0.1;

/// Default long-press hold duration.
const LONG_PRESS_SECS: f64 = 1.0;

/// Default swipe duration.
const SWIPE_SECS: f64 = 0.5;

/// Interpolation steps per second of swipe duration.
const STEPS_PER_SECOND: f64 = 10.0;

// ============================================================================
// Session - Touch Primitives
// ============================================================================

impl Session {
    /// Presses the pointer down at the given coordinates.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`](crate::Error::NotConnected) if the session
    /// is not connected (no network call is issued), or
    /// [`Error::Server`](crate::Error::Server) if the device rejects the
    /// event.
    pub async fn press(&self, x: i32, y: i32) -> Result<&Self> {
        self.inject(ACTION_PRESS, x, y).await?;
        Ok(self)
    }

    /// Releases the pointer at the given coordinates.
    pub async fn release(&self, x: i32, y: i32) -> Result<&Self> {
        self.inject(ACTION_RELEASE, x, y).await?;
        Ok(self)
    }

    /// Moves the pointer to the given coordinates.
    pub async fn move_to(&self, x: i32, y: i32) -> Result<&Self> {
        self.inject(ACTION_MOVE, x, y).await?;
        Ok(self)
    }

    /// Suspends the gesture for the given number of seconds.
    ///
    /// Unlike the other primitives, this does not require a connected
    /// session and cannot fail: no transport call is made, so there is
    /// nothing to guard. Purely a delay in this task; other sessions keep
    /// running.
    pub async fn pause(&self, seconds: f64) -> &Self {
        sleep(Duration::from_secs_f64(seconds)).await;
        self
    }

    /// Sends one touch event.
    async fn inject(&self, action: i32, x: i32, y: i32) -> Result<()> {
        self.ensure_connected()?;
        trace!(action, x, y, "Injecting touch event");
        self.rpc(
            "injectInputEvent",
            vec![action.into(), x.into(), y.into(), POINTER_ID.into()],
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// Session - Composite Gestures
// ============================================================================

impl Session {
    /// Taps at the given coordinates.
    ///
    /// Press, a 100ms hold, then release at the same point.
    pub async fn tap(&self, x: i32, y: i32) -> Result<&Self> {
        self.press(x, y)
            .await?
            .pause(TAP_PAUSE_SECS)
            .await
            .release(x, y)
            .await
    }

    /// Long-presses at the given coordinates for the default 1s hold.
    pub async fn long_press(&self, x: i32, y: i32) -> Result<&Self> {
        self.long_press_for(x, y, LONG_PRESS_SECS).await
    }

    /// Long-presses at the given coordinates with an explicit hold.
    pub async fn long_press_for(&self, x: i32, y: i32, duration_secs: f64) -> Result<&Self> {
        self.press(x, y)
            .await?
            .pause(duration_secs)
            .await
            .release(x, y)
            .await
    }

    /// Swipes from one point to another over the default 0.5s.
    pub async fn swipe(&self, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> Result<&Self> {
        self.swipe_for(from_x, from_y, to_x, to_y, SWIPE_SECS).await
    }

    /// Swipes from one point to another over an explicit duration.
    ///
    /// The path is linearly interpolated at ten steps per second (at least
    /// one step, so a zero duration still moves); the final step lands
    /// exactly on the destination regardless of rounding in the
    /// intermediate steps.
    pub async fn swipe_for(
        &self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
        duration_secs: f64,
    ) -> Result<&Self> {
        let path = swipe_path((from_x, from_y), (to_x, to_y), duration_secs);
        let step_pause = duration_secs / path.len() as f64;

        self.press(from_x, from_y).await?;
        for (x, y) in path {
            self.move_to(x, y).await?;
            self.pause(step_pause).await;
        }
        self.release(to_x, to_y).await
    }
}

// ============================================================================
// Path Planning
// ============================================================================

/// Plans the interpolated move points of a swipe.
///
/// Produces `max(1, floor(duration * 10))` points. Intermediate points are
/// rounded linear interpolations; the last point is the destination itself.
pub(crate) fn swipe_path(from: (i32, i32), to: (i32, i32), duration_secs: f64) -> Vec<(i32, i32)> {
    let steps = ((duration_secs * STEPS_PER_SECOND).floor() as usize).max(1);

    (1..=steps)
        .map(|step| {
            if step == steps {
                return to;
            }
            let fraction = step as f64 / steps as f64;
            (
                from.0 + (f64::from(to.0 - from.0) * fraction).round() as i32,
                from.1 + (f64::from(to.1 - from.1) * fraction).round() as i32,
            )
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
