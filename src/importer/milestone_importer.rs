// ==========================================
// 施工进度计划分析引擎 - 节点导入器
// ==========================================
// 流程: 解析 → 映射 → 主键去重 → (可选) 落库
// 红线: 导入器不做分析, 只产出 Milestone 快照
// ==========================================

use crate::domain::milestone::Milestone;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::milestone_mapper::MilestoneFieldMapper;
use crate::repository::MilestoneRepository;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{info, instrument};
use uuid::Uuid;

/// 落库导入汇总
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub imported: usize,
    pub project_ids: Vec<String>,
}

// ==========================================
// MilestoneImporter - 节点导入器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MilestoneImporter {
    mapper: MilestoneFieldMapper,
}

impl MilestoneImporter {
    pub fn new(mapper: MilestoneFieldMapper) -> Self {
        Self { mapper }
    }

    /// 读取文件为节点列表 (保持文件行序)
    ///
    /// 任一行映射失败即整体失败; 同一项目内节点ID重复视为错误
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn load_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<Milestone>> {
        let rows = UniversalFileParser.parse(file_path.as_ref())?;

        let mut seen = HashSet::new();
        let mut milestones = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            // 表头占第 1 行
            let row_number = idx + 2;
            let milestone = self.mapper.map_row(row, row_number)?;
            if !seen.insert((milestone.project_id.clone(), milestone.id.clone())) {
                return Err(ImportError::DuplicateId {
                    row: row_number,
                    id: milestone.id,
                });
            }
            milestones.push(milestone);
        }

        info!(count = milestones.len(), "节点文件解析完成");
        Ok(milestones)
    }

    /// 读取文件并写入快照库 (单事务)
    pub fn import_to_repository<P: AsRef<Path>>(
        &self,
        file_path: P,
        repo: &MilestoneRepository,
    ) -> ImportResult<ImportSummary> {
        let milestones = self.load_file(file_path)?;
        let imported = repo.insert_batch(&milestones)?;
        let project_ids: BTreeSet<_> = milestones.iter().map(|m| m.project_id.clone()).collect();

        let summary = ImportSummary {
            batch_id: Uuid::new_v4().to_string(),
            imported,
            project_ids: project_ids.into_iter().collect(),
        };
        info!(batch_id = %summary.batch_id, imported, "节点导入落库完成");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_duplicate_id_reports_file_row() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,project_id,name").unwrap();
        writeln!(file, "M1,P1,Setup").unwrap();
        writeln!(file, "M1,P1,Setup again").unwrap();

        let result = MilestoneImporter::default().load_file(file.path());
        assert!(matches!(
            result,
            Err(ImportError::DuplicateId { row: 3, ref id }) if id == "M1"
        ));
    }

    #[test]
    fn test_same_id_allowed_across_projects() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,project_id,name").unwrap();
        writeln!(file, "A,P1,Foundations").unwrap();
        writeln!(file, "A,P2,Demolition").unwrap();

        let milestones = MilestoneImporter::default().load_file(file.path()).unwrap();
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[1].project_id, "P2");
    }
}
