//! 学习计划：按路线图条目的天数展开为逐日学习安排
//!
//! 条目 duration 为自由文本，取开头的整数作为天数（"5 days" → 5）；无法解析或为 0 的条目不产生安排。
//! 路线图可由 [`roadmap`] 按课程与级别生成，也可从 JSON 文件读入。
//! 生成结果连同课程、级别、起始日期一起作为 [`StudyPlanRecord`] 保存到 JSON 文件，见 [`store`]。

pub mod roadmap;
pub mod store;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::PlannerError;

pub use roadmap::generate_roadmap;
pub use store::StudyPlanStore;

/// 路线图条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 如 "5 days"
    pub duration: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// 单日学习安排
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub date: NaiveDate,
    pub topic: String,
    /// 小时
    pub duration: u32,
    pub completed: bool,
    /// 0..=100
    pub progress: u8,
}

/// 持久化的学习计划
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanRecord {
    pub course: String,
    pub roadmap: Vec<RoadmapItem>,
    pub level: String,
    pub daily_hours: u32,
    pub start_date: NaiveDate,
    pub study_plan: Vec<StudySession>,
}

/// 完成情况统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub completed: usize,
    pub total: usize,
    /// 四舍五入的百分比
    pub percentage: u32,
}

/// duration 开头的整数天数；没有数字时为 0
pub fn parse_days(duration: &str) -> u32 {
    let digits: String = duration
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// 解析 YYYY-MM-DD
pub fn parse_start_date(text: &str) -> Result<NaiveDate, PlannerError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| PlannerError::InvalidDate(text.to_string()))
}

/// 按路线图顺序逐日展开；id 从 "1" 连续编号，日期从 start_date 起每个安排顺延一天
pub fn generate_study_plan(
    roadmap: &[RoadmapItem],
    start_date: NaiveDate,
    daily_hours: u32,
) -> Vec<StudySession> {
    let mut sessions = Vec::new();
    let mut offset: u64 = 0;

    for item in roadmap {
        let days = parse_days(&item.duration);
        if days == 0 {
            tracing::debug!(item = %item.id, duration = %item.duration, "roadmap item skipped");
        }
        for day in 0..days {
            let Some(date) = start_date.checked_add_days(Days::new(offset)) else {
                tracing::warn!(offset, "study plan date out of range, truncating");
                return sessions;
            };
            let topic = if day == 0 {
                item.title.clone()
            } else {
                format!("{} (Day {})", item.title, day + 1)
            };
            sessions.push(StudySession {
                id: (sessions.len() + 1).to_string(),
                date,
                topic,
                duration: daily_hours,
                completed: false,
                progress: 0,
            });
            offset += 1;
        }
    }
    sessions
}

/// 总学习时长（小时）
pub fn total_hours(sessions: &[StudySession]) -> u32 {
    sessions.iter().map(|s| s.duration).sum()
}

/// 最后一个安排的日期
pub fn completion_date(sessions: &[StudySession]) -> Option<NaiveDate> {
    sessions.last().map(|s| s.date)
}

impl StudyPlanRecord {
    /// 生成新计划；daily_hours 必须为正
    pub fn generate(
        course: impl Into<String>,
        level: impl Into<String>,
        roadmap: Vec<RoadmapItem>,
        start_date: NaiveDate,
        daily_hours: u32,
    ) -> Result<Self, PlannerError> {
        if daily_hours == 0 {
            return Err(PlannerError::InvalidHours(daily_hours));
        }
        let study_plan = generate_study_plan(&roadmap, start_date, daily_hours);
        tracing::info!(
            sessions = study_plan.len(),
            items = roadmap.len(),
            "study plan generated"
        );
        Ok(Self {
            course: course.into(),
            roadmap,
            level: level.into(),
            daily_hours,
            start_date,
            study_plan,
        })
    }

    fn session_mut(&mut self, id: &str) -> Option<&mut StudySession> {
        self.study_plan.iter_mut().find(|s| s.id == id)
    }

    /// 标记完成并把进度置为 100；id 不存在时返回 false
    pub fn mark_completed(&mut self, id: &str) -> bool {
        match self.session_mut(id) {
            Some(session) => {
                session.completed = true;
                session.progress = 100;
                true
            }
            None => false,
        }
    }

    /// 顺延一天，返回新日期
    pub fn postpone(&mut self, id: &str) -> Option<NaiveDate> {
        let session = self.session_mut(id)?;
        session.date = session.date.checked_add_days(Days::new(1))?;
        Some(session.date)
    }

    /// 清空所有完成状态与进度
    pub fn reset_progress(&mut self) {
        for session in &mut self.study_plan {
            session.completed = false;
            session.progress = 0;
        }
    }

    pub fn stats(&self) -> ProgressStats {
        let total = self.study_plan.len();
        let completed = self.study_plan.iter().filter(|s| s.completed).count();
        let percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        ProgressStats {
            completed,
            total,
            percentage,
        }
    }

    /// 第 week 周（0 起）的安排，每周 7 个
    pub fn week(&self, week: usize) -> &[StudySession] {
        let start = week.saturating_mul(7).min(self.study_plan.len());
        let end = (start + 7).min(self.study_plan.len());
        &self.study_plan[start..end]
    }
}
