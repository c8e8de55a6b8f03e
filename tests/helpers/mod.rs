// ==========================================
// 集成测试公共辅助
// ==========================================
#![allow(dead_code)]

pub mod milestone_builder;

use chrono::NaiveDate;

/// 构造日期 (测试专用)
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}
