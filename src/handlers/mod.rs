// handlers/mod.rs - Handlers split by security tier
//
// Public (no auth) → Protected (bearer JWT required)
pub mod public;
pub mod protected;
