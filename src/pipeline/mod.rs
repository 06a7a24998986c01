pub mod stage1_load;
pub mod stage2_calibrate;
pub mod stage3_evaluate;
pub mod stage4_report;
