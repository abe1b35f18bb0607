pub mod stage1_pairs;
pub mod stage2_correlate;
pub mod stage3_aggregate;
pub mod stage4_background;
pub mod stage5_significance;
pub mod stage6_report;
