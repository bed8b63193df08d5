//! 类型系统子模块
//!
//! 将符号层拆分为多个子模块：
//! - ids: 带类型的符号索引
//! - symbol: 类型句柄、可空标记、模板实参等值类型
//! - compilation: 符号存储、声明 API 与查询
//! - equality: 结构相等与哈希
//! - conversions: 约束合并使用的隐式转换
//! - substitute: 模板替换映射
//! - construct: 构造/替换符号的工厂
//! - error: 契约错误定义

pub mod compilation;
pub mod construct;
pub mod conversions;
pub mod equality;
pub mod error;
pub mod ids;
pub mod substitute;
pub mod symbol;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use compilation::{
    Compilation, MethodDeclaration, SymbolArena, TemplateParameterDeclaration, TypeDeclaration,
    ValueMemberDeclaration,
};
pub use error::{Result, SymbolError};
pub use ids::{
    ArrayTypeId, AssemblyId, FieldId, MethodId, NamedTypeId, PropertyId, SymbolId, SymbolKind,
    TemplateOwner, TemplateParamId,
};
pub use substitute::TemplateMap;
pub use symbol::{
    Accessibility, BoundExpression, ConstantValue, MemberModifiers, MethodSignature, Parameter,
    RefKind, SpecialType, TemplateParameterKind, TypeCompareKind, TypeKind, TypeOrConstant,
    TypeSymbol, TypeWithAnnotations,
};
