pub const OK: i32 = 0;
/// Query blocked or errored (the user's SQL, not our setup).
pub const QUERY_ERROR: i32 = 1;
pub const CONFIG_ERROR: i32 = 2;
