//! Ports Layer - Trait definitions
//!
//! - `inbound`: the membership API collaborators program against

pub mod inbound;

pub use inbound::MembershipFilter;
