// Entity Models - the two kinds of roster records
//
// Each side has:
// - a raw member record, shaped like the source service returns it
// - an account value the engine works on, built once per run and never mutated

pub mod game;
pub mod community;

pub use game::{GameAccount, GameMember};
pub use community::{CommunityAccount, CommunityMember};
