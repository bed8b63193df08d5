//! 统一诊断系统
//!
//! 约束解析只会把结构化的诊断记录推入调用方提供的 [`DiagnosticBag`]，
//! 从不格式化文本，也不会因为诊断而中断解析。
//!
//! # 模块结构
//!
//! - [`error`] - 诊断数据结构 (Diagnostic, Severity, DiagnosticKind)

pub mod error;

pub use error::{Diagnostic, DiagnosticArgument, DiagnosticKind, Severity};

/// 诊断队列
///
/// 按推入顺序保存诊断，调用方决定何时消费。
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// 创建空队列
    pub fn new() -> Self {
        Self::default()
    }

    /// 推入一条诊断
    pub fn push(
        &mut self,
        diagnostic: Diagnostic,
    ) {
        tracing::debug!(
            code = diagnostic.kind.code(),
            location = %diagnostic.span,
            "diagnostic reported"
        );
        self.items.push(diagnostic);
    }

    /// 追加另一个队列中的全部诊断
    pub fn extend(
        &mut self,
        other: DiagnosticBag,
    ) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 是否存在错误级别的诊断
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity.is_error())
    }

    /// 统计某类诊断的数量
    pub fn count_of(
        &self,
        kind: DiagnosticKind,
    ) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// 取出全部诊断，队列被清空
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
