use crate::collision::FeaturePair;
use crate::math::Vector2;

/// One contact point between two boxes, plus the solver state attached to it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contact {
    /// World-space contact position, on the reference face
    pub position: Vector2,

    /// Contact normal, pointing from the first body of the pair to the second
    pub normal: Vector2,

    /// Signed distance along the normal; negative means overlapping
    pub separation: f32,

    /// Which edges produced this point
    pub feature: FeaturePair,

    /// Offsets from each body's center to the contact position
    pub(crate) r1: Vector2,
    pub(crate) r2: Vector2,

    /// Accumulated normal impulse
    pub(crate) normal_impulse: f32,

    /// Accumulated tangent (friction) impulse
    pub(crate) tangent_impulse: f32,

    /// Accumulated normal impulse for split position correction
    pub(crate) bias_impulse: f32,

    pub(crate) mass_normal: f32,
    pub(crate) mass_tangent: f32,

    /// Target separating velocity from position correction
    pub(crate) bias: f32,
}

impl Contact {
    /// Creates a fresh contact with no accumulated impulse
    pub fn new(position: Vector2, normal: Vector2, separation: f32, feature: FeaturePair) -> Self {
        Self {
            position,
            normal,
            separation,
            feature,
            ..Self::default()
        }
    }

    /// Accumulated normal impulse
    pub fn normal_impulse(&self) -> f32 {
        self.normal_impulse
    }

    /// Accumulated friction impulse
    pub fn tangent_impulse(&self) -> f32 {
        self.tangent_impulse
    }

    /// Accumulated position-correction impulse
    pub fn bias_impulse(&self) -> f32 {
        self.bias_impulse
    }

    /// Unit tangent used for friction, the normal rotated clockwise
    #[inline]
    pub fn tangent(&self) -> Vector2 {
        self.normal.cross_scalar(1.0)
    }

    /// Copies the accumulated impulses of `previous` into this contact
    pub(crate) fn warm_start_from(&mut self, previous: &Contact) {
        self.normal_impulse = previous.normal_impulse;
        self.tangent_impulse = previous.tangent_impulse;
        self.bias_impulse = previous.bias_impulse;
    }
}
