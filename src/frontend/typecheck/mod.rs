//! 模板约束与成员关系检查
//!
//! 在符号层之上实现：
//! - 模板参数约束边界解析（环形约束、冲突基类、继承约束）
//! - 成员签名比较
//! - 重写/隐藏关系解析

pub mod bounds;
pub mod overrides;
pub mod signature;

#[cfg(test)]
mod tests;

pub use bounds::{resolve_bounds, InProgress, TypeParameterBounds};
pub use overrides::OverriddenOrHiddenMembersResult;
pub use signature::MemberSignatureComparer;
