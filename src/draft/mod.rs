// Draft arithmetic core: ordering, keepers, projections, and history.

pub mod carryover;
pub mod keepers;
pub mod order;
pub mod projection;
pub mod rounds;
pub mod types;
