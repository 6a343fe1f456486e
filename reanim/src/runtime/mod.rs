mod command;
mod component;
mod engine;
mod interpolate;
mod merge;
mod mode;
mod parent;
mod playback;
mod visibility;

pub use command::*;
pub use component::*;
pub use engine::*;
pub use interpolate::*;
pub use merge::*;
pub use mode::*;
pub use parent::{ParentBinding, ParentOffset};
pub use playback::*;
pub use visibility::*;

pub(crate) use parent::apply_parent_offsets;






#[cfg(test)]
mod mode_tests;



#[cfg(test)]
mod engine_tests;
