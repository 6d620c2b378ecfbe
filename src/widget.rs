pub mod chart;
pub mod toggles;
