//! Auth-domain identifiers, scope sets, authorization codes, and issued tokens.

pub mod code;
pub mod id;
pub mod scope;
pub mod token;

pub use code::*;
pub use id::*;
pub use scope::*;
pub use token::{secret::*, *};
