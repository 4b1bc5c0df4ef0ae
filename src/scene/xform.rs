//! Transform node state.

use glam::Mat4;
use tracing::trace;

use crate::archive::{Archive, ObjectId};
use crate::util::{Chrono, TimeRange};

/// Cached local matrix plus the per-frame inherit flag.
///
/// Constant matrices are cached once at init and never re-read; animated ones
/// refresh only while the requested time sits strictly inside the node's
/// window, so boundary times reuse the cache.
#[derive(Clone, Debug)]
pub struct XformState {
    /// Local matrix at the last resampled time.
    pub local: Mat4,
    /// Whether this transform composes with its parent.
    pub inherits: bool,
    animated: bool,
}

impl Default for XformState {
    fn default() -> Self {
        Self {
            local: Mat4::IDENTITY,
            inherits: true,
            animated: false,
        }
    }
}

impl XformState {
    /// Cache the initial matrix and record whether the values animate.
    pub(crate) fn init(&mut self, archive: &Archive, obj: ObjectId) {
        *self = Self::default();
        if let Some(vals) = archive.property(obj, ".vals") {
            self.animated = !vals.is_constant();
            if let Some(m) = vals.mat4_sample(0) {
                self.local = m.as_mat4();
            }
        }
        if let Some(p) = archive.property(obj, ".inherits") {
            self.inherits = p.bool_sample(0).unwrap_or(true);
        }
    }

    /// Refresh the inherit flag, and the matrix when the values animate and
    /// `time` lies strictly inside `window`.
    pub(crate) fn resample(
        &mut self,
        archive: &Archive,
        obj: ObjectId,
        time: Chrono,
        window: TimeRange,
    ) {
        if let Some(p) = archive.property(obj, ".inherits") {
            self.inherits = p.bool_at(time).unwrap_or(true);
        }
        if !self.animated {
            return;
        }
        if window.min < time && time < window.max {
            if let Some(vals) = archive.property(obj, ".vals") {
                if let Some(m) = vals.mat4_at(time) {
                    self.local = m.as_mat4();
                }
            }
        } else {
            trace!(time, ?window, "transform time at or outside window, matrix cached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity_inheriting() {
        let state = XformState::default();
        assert_eq!(state.local, Mat4::IDENTITY);
        assert!(state.inherits);
    }
}
