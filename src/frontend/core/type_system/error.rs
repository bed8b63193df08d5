//! 符号层错误
//!
//! 这里的错误都不是面向用户的诊断：要么是调用方（绑定器）违反了契约，
//! 要么是引用的外部符号无法唯一解析。它们只中止当前调用。

use thiserror::Error;

use super::ids::{AssemblyId, NamedTypeId};

/// 符号操作错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// 模板实参数量与声明不符
    #[error("Arity mismatch for '{name}': expected {expected} template arguments, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// 对非泛型声明调用 construct
    #[error("'{name}' is not generic and cannot be constructed")]
    NotGeneric { name: String },

    /// construct 的接收者不是未构造的声明
    #[error("'{name}' is already constructed; construct must be called on its definition")]
    NotADefinition { name: String },

    /// 类型参数收到常量实参，或常量参数收到类型实参
    #[error("Template argument {ordinal} of '{name}' has the wrong kind")]
    TemplateArgumentKindMismatch { name: String, ordinal: usize },

    /// 引用的程序集中找不到符号
    #[error("Referenced symbol '{name}' with arity {arity} was not found")]
    MissingReferencedSymbol { name: String, arity: usize },

    /// 引用的程序集中有多个候选
    #[error("Referenced symbol '{name}' with arity {arity} is ambiguous between {candidates:?}")]
    AmbiguousReferencedSymbol {
        name: String,
        arity: usize,
        candidates: Vec<AssemblyId>,
    },

    /// 声明的类型种类不能作为命名类型
    #[error("'{name}' cannot be declared as a named type of this kind")]
    InvalidTypeKind { name: String },

    /// 一次性写入的值被重复设置
    #[error("{what} of '{name}' is already initialized")]
    AlreadyInitialized { what: &'static str, name: String },

    /// 约束来自被重写方法或源参数，不能直接设置
    #[error("Constraints of '{name}' are {source_kind} and cannot be declared")]
    ConstraintsNotDeclarable {
        name: String,
        source_kind: &'static str,
    },

    /// 基类型链形成环
    #[error("Setting the base type of '{name}' would create a cycle")]
    CyclicBaseType { name: String },

    /// 成员只能声明在源定义上
    #[error("Members can only be declared on a type definition, not on {0}")]
    InvalidContainingType(NamedTypeId),
}

/// 符号操作结果
pub type Result<T> = std::result::Result<T, SymbolError>;
