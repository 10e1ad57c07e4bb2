pub mod throttle_maintenance;

pub use throttle_maintenance::spawn_throttle_prune_task;
