mod constraint;
mod joint;

pub use self::constraint::Constraint;
pub use self::joint::{Joint, DEFAULT_JOINT_BIAS_FACTOR};
