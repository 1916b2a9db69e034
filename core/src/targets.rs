pub const CALCULATOR: &str = "calculator";
pub const CATALOG: &str = "catalog";
pub const FLOW: &str = "flow";
pub const SYNC: &str = "sync";
pub const ANALYSIS: &str = "analysis";
pub const CONFIG: &str = "config";
pub const UI: &str = "ui";

pub const ALL: [&str; 7] = [CALCULATOR, CATALOG, FLOW, SYNC, ANALYSIS, CONFIG, UI];
