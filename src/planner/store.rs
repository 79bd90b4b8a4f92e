//! 学习计划持久化
//!
//! 单文件 JSON（pretty），保存整个 [`StudyPlanRecord`]；文件不存在时 load 返回 None。

use std::path::{Path, PathBuf};

use crate::core::PlannerError;
use crate::planner::StudyPlanRecord;

#[derive(Debug, Clone)]
pub struct StudyPlanStore {
    path: PathBuf,
}

impl StudyPlanStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<StudyPlanRecord>, PlannerError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// 写入 JSON 文件；父目录不存在时自动创建
    pub fn save(&self, plan: &StudyPlanRecord) -> Result<(), PlannerError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(plan)?)?;
        tracing::debug!(path = %self.path.display(), "study plan saved");
        Ok(())
    }
}
