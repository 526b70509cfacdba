mod arbiter;
mod broad_phase;
mod collision_pair;
mod contact;
mod feature;
pub(crate) mod narrow_phase;

pub use self::arbiter::Arbiter;
pub use self::broad_phase::{BroadPhase, BruteForceBroadPhase};
pub use self::collision_pair::CollisionPair;
pub use self::contact::Contact;
pub use self::feature::{EdgeId, FeaturePair};
pub use self::narrow_phase::{collide, MAX_CONTACT_POINTS};
