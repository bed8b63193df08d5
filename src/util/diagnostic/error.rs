//! 诊断数据结构
//!
//! # 设计原则
//!
//! - `Diagnostic` 只携带种类、位置和相关符号，不包含渲染后的文本
//! - 消息的格式化由显示子系统负责

use std::fmt;

use crate::frontend::core::type_system::{SymbolId, TemplateParamId, TypeSymbol};
use crate::util::span::Span;

/// 诊断严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// 获取严重级别对应的数字值
    pub fn as_u8(&self) -> u8 {
        match self {
            Severity::Error => 4,
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::Hint => 1,
        }
    }

    /// 检查是否为错误级别
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// 约束解析产生的诊断种类
///
/// 全部可恢复：解析总会完成并返回尽力而为的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// 模板参数的约束（传递地）引用了自身
    CircularConstraint,
    /// 同一参数上的两个约束类型互不包含
    ConflictingBaseConstraint,
    /// 约束同时要求"原始类型"和"对象类型"
    IncompatibleConstraintKinds,
}

impl DiagnosticKind {
    /// 错误码
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::CircularConstraint => "E2101",
            DiagnosticKind::ConflictingBaseConstraint => "E2102",
            DiagnosticKind::IncompatibleConstraintKinds => "E2103",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            DiagnosticKind::CircularConstraint => "circular constraint",
            DiagnosticKind::ConflictingBaseConstraint => "conflicting base constraint",
            DiagnosticKind::IncompatibleConstraintKinds => "incompatible constraint kinds",
        };
        write!(f, "{}", name)
    }
}

/// 诊断中涉及的符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticArgument {
    Symbol(SymbolId),
    TemplateParameter(TemplateParamId),
    Type(TypeSymbol),
}

/// 诊断记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 严重级别
    pub severity: Severity,
    /// 诊断种类
    pub kind: DiagnosticKind,
    /// 位置信息
    pub span: Span,
    /// 相关符号
    pub arguments: Vec<DiagnosticArgument>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        span: Span,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            span,
            arguments: Vec::new(),
        }
    }

    /// 附加一个相关符号
    pub fn with_argument(
        mut self,
        argument: DiagnosticArgument,
    ) -> Self {
        self.arguments.push(argument);
        self
    }

    /// 诊断是否涉及某个模板参数
    pub fn mentions_parameter(
        &self,
        parameter: TemplateParamId,
    ) -> bool {
        self.arguments
            .iter()
            .any(|a| *a == DiagnosticArgument::TemplateParameter(parameter))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}",
            self.severity,
            self.kind.code(),
            self.kind,
            self.span
        )
    }
}
