// ==========================================
// 检查表报告系统 - 分阶段输出
// ==========================================
// 阶段 1: 全部内容写入同目录的 .<name>.partial 暂存文件
// 阶段 2: 逐个 rename 到目标路径
// 红线: 任一步失败时，清理暂存文件及本次已提交的目标文件
// ==========================================

use crate::pipeline::error::{PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 一次提交的输出集合（内容已在内存中渲染完成）
#[derive(Debug, Default)]
pub struct StagedOutput {
    entries: Vec<(PathBuf, Vec<u8>)>,
}

impl StagedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个输出（不落盘）
    pub fn stage(&mut self, target: PathBuf, content: Vec<u8>) {
        self.entries.push((target, content));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 提交全部输出
    ///
    /// # 返回
    /// - Ok(Vec<PathBuf>): 已写出的目标路径（登记顺序）
    /// - Err(OutputWrite): 失败时不留下本次的任何文件
    pub fn commit(self) -> PipelineResult<Vec<PathBuf>> {
        // === 阶段 1: 暂存 ===
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(self.entries.len());
        for (target, content) in self.entries {
            let partial = partial_path(&target);
            if let Err(e) = fs::write(&partial, &content) {
                remove_all(staged.iter().map(|(p, _)| p.as_path()));
                remove_file_quiet(&partial);
                return Err(write_error(&target, e));
            }
            staged.push((partial, target));
        }

        // === 阶段 2: 提交 ===
        let mut committed: Vec<PathBuf> = Vec::with_capacity(staged.len());
        let mut pending = staged.into_iter();
        while let Some((partial, target)) = pending.next() {
            if let Err(e) = fs::rename(&partial, &target) {
                remove_file_quiet(&partial);
                let rest: Vec<(PathBuf, PathBuf)> = pending.by_ref().collect();
                remove_all(rest.iter().map(|(p, _)| p.as_path()));
                remove_all(committed.iter().map(PathBuf::as_path));
                return Err(write_error(&target, e));
            }
            debug!(output = %target.display(), "输出已提交");
            committed.push(target);
        }

        Ok(committed)
    }
}

/// 暂存路径：与目标同目录，保证 rename 不跨文件系统
fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    target.with_file_name(format!(".{}.partial", name))
}

fn write_error(target: &Path, err: std::io::Error) -> PipelineError {
    PipelineError::OutputWrite {
        path: target.display().to_string(),
        message: err.to_string(),
    }
}

fn remove_all<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        remove_file_quiet(path);
    }
}

fn remove_file_quiet(path: &Path) {
    if path.is_file() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "清理输出文件失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_writes_all_targets() {
        let dir = TempDir::new().unwrap();
        let mut output = StagedOutput::new();
        output.stage(dir.path().join("a.json"), b"{}".to_vec());
        output.stage(dir.path().join("a_report.xlsx"), vec![1, 2, 3]);
        assert_eq!(output.len(), 2);

        let written = output.commit().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read(dir.path().join("a.json")).unwrap(), b"{}");
        assert_eq!(fs::read(dir.path().join("a_report.xlsx")).unwrap(), vec![1, 2, 3]);
        assert!(!dir.path().join(".a.json.partial").exists());
    }

    #[test]
    fn test_failed_target_rolls_back_earlier_outputs() {
        let dir = TempDir::new().unwrap();
        // 目标位置已被目录占用，rename 必然失败
        fs::create_dir(dir.path().join("a_report.xlsx")).unwrap();

        let mut output = StagedOutput::new();
        output.stage(dir.path().join("a.json"), b"{}".to_vec());
        output.stage(dir.path().join("a_report.xlsx"), vec![1, 2, 3]);
        output.stage(dir.path().join("a_violations.xlsx"), vec![4]);

        let result = output.commit();
        assert!(matches!(result, Err(PipelineError::OutputWrite { .. })));
        assert!(!dir.path().join("a.json").exists());
        assert!(!dir.path().join("a_violations.xlsx").exists());
        assert!(dir.path().join("a_report.xlsx").is_dir());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        assert_eq!(
            partial_path(Path::new("/out/upp_report.xlsx")),
            PathBuf::from("/out/.upp_report.xlsx.partial")
        );
    }
}
