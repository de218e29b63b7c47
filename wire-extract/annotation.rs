use wire_core::{Point2D, WireObservation};

/// One of the three user-movable key points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Handle {
    Left,
    Right,
    Sag,
}

impl Handle {
    /// Hit-test priority
    pub const ALL: [Handle; 3] = [Handle::Left, Handle::Right, Handle::Sag];
}

/// Manual correction state for the endpoints and the sag point.
///
/// Every interaction consumes the current state and returns the next one.
/// An armed handle is placed by the next press; otherwise a press grabs the
/// first handle within reach and drags it until release.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub p1: Point2D,
    pub p2: Point2D,
    pub p_sag: Point2D,
    pub armed: Option<Handle>,
    pub dragging: Option<Handle>,
}

impl Annotation {
    /// Neutral layout for a `width` x `height` view
    pub fn reset(width: f64, height: f64) -> Self {
        Self {
            p1: Point2D::new(0.2 * width, 0.5 * height),
            p2: Point2D::new(0.8 * width, 0.5 * height),
            p_sag: Point2D::new(0.5 * width, 0.7 * height),
            armed: None,
            dragging: None,
        }
    }

    pub fn from_observation(observation: &WireObservation) -> Self {
        Self {
            p1: observation.p1,
            p2: observation.p2,
            p_sag: observation.p_sag,
            armed: None,
            dragging: None,
        }
    }

    pub fn point(&self, handle: Handle) -> Point2D {
        match handle {
            Handle::Left => self.p1,
            Handle::Right => self.p2,
            Handle::Sag => self.p_sag,
        }
    }

    fn with_point(mut self, handle: Handle, at: Point2D) -> Self {
        match handle {
            Handle::Left => self.p1 = at,
            Handle::Right => self.p2 = at,
            Handle::Sag => self.p_sag = at,
        }
        self
    }

    /// Place `handle` at the next press
    pub fn arm(self, handle: Handle) -> Self {
        Self {
            armed: Some(handle),
            ..self
        }
    }

    /// Place the armed handle, or start dragging the first handle within `radius`
    pub fn press(self, at: Point2D, radius: f64) -> Self {
        if let Some(handle) = self.armed {
            return Self {
                armed: None,
                ..self.with_point(handle, at)
            };
        }

        let hit = Handle::ALL
            .into_iter()
            .find(|&h| self.point(h).distance(&at) < radius);
        Self { dragging: hit, ..self }
    }

    /// Move the dragged handle; no-op when nothing is being dragged
    pub fn drag(self, at: Point2D) -> Self {
        match self.dragging {
            Some(handle) => self.with_point(handle, at),
            None => self,
        }
    }

    pub fn release(self) -> Self {
        Self { dragging: None, ..self }
    }

    /// Corrected key points with the unchanged wire samples
    pub fn apply_to(&self, observation: &WireObservation) -> WireObservation {
        WireObservation {
            p1: self.p1,
            p2: self.p2,
            p_sag: self.p_sag,
            candidate_points: observation.candidate_points.clone(),
        }
    }
}
