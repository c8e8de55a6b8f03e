// ==========================================
// 施工进度计划分析引擎 - 日期/区间工具
// ==========================================
// 口径: 区间一律为结束开区间 [start, end)
// - 01-01 ~ 01-05 占用 4 天
// - 首尾相接的两个区间重叠 0 天
// "今天" 由调用方显式传入, 保证结果可复现
// ==========================================

use crate::domain::milestone::Milestone;
use chrono::{Duration, NaiveDate};

/// 距离 date 的天数 (今天为 0, 过去为负)
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// date 是否早于今天
pub fn is_overdue(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// start 到 end 的天数 (可为负)
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// date 平移 days 天; 超出日期范围时饱和到 NaiveDate::MIN / MAX
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// 两个区间的交集 (无交集返回 None)
pub fn overlap_range(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = start_a.max(start_b);
    let end = end_a.min(end_b);
    if start < end {
        Some((start, end))
    } else {
        None
    }
}

/// 两个区间共享的整天数, 不相交或仅边界相接时为 0
pub fn days_overlap(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> i64 {
    overlap_range(start_a, end_a, start_b, end_b)
        .map(|(start, end)| days_between(start, end))
        .unwrap_or(0)
}

/// 节点工期 (天), 最少 1 天
///
/// 无明确起止时退化为 planned_date 单点, 工期同样取 1
pub fn milestone_duration_days(milestone: &Milestone) -> i64 {
    match (milestone.effective_start(), milestone.effective_end()) {
        (Some(start), Some(end)) => days_between(start, end).max(1),
        _ => 1,
    }
}
