//! Per-asset-type behavior dispatch: one pure-function module per
//! category, each a `tick(context, enemies) -> decision` call with no
//! ECS dependency.

pub mod base;
pub mod drone;
pub mod hostile;
pub mod rover;
pub mod turret;
