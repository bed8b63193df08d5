//! 符号标识
//!
//! 符号存放在 [`SymbolArena`](super::compilation::SymbolArena) 中，
//! 通过带类型的索引引用。两个索引相等即"同一个对象"；
//! 结构相等由 [`equality`](super::equality) 模块单独判断。

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// 在所属 arena 中的位置
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// 命名类型（类、结构体、原始类型、错误类型）
    NamedTypeId,
    "type"
);
define_id!(
    /// 数组类型
    ArrayTypeId,
    "array"
);
define_id!(
    /// 模板参数
    TemplateParamId,
    "tparam"
);
define_id!(MethodId, "method");
define_id!(FieldId, "field");
define_id!(PropertyId, "property");

/// 程序集标识
///
/// `SOURCE` 是正在编译的程序集，其余为引用的程序集。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssemblyId(pub(crate) u32);

impl AssemblyId {
    /// 当前编译的源程序集
    pub const SOURCE: AssemblyId = AssemblyId(0);
    /// 核心库
    pub const CORLIB: AssemblyId = AssemblyId(1);

    pub fn is_source(self) -> bool {
        self == Self::SOURCE
    }
}

/// 符号种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    NamedType,
    Method,
    Field,
    Property,
}

/// 可作为类型成员出现的符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolId {
    NamedType(NamedTypeId),
    Method(MethodId),
    Field(FieldId),
    Property(PropertyId),
}

impl SymbolId {
    pub fn kind(self) -> SymbolKind {
        match self {
            SymbolId::NamedType(_) => SymbolKind::NamedType,
            SymbolId::Method(_) => SymbolKind::Method,
            SymbolId::Field(_) => SymbolKind::Field,
            SymbolId::Property(_) => SymbolKind::Property,
        }
    }

    pub fn as_method(self) -> Option<MethodId> {
        match self {
            SymbolId::Method(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_named_type(self) -> Option<NamedTypeId> {
        match self {
            SymbolId::NamedType(id) => Some(id),
            _ => None,
        }
    }
}

impl From<NamedTypeId> for SymbolId {
    fn from(id: NamedTypeId) -> Self {
        SymbolId::NamedType(id)
    }
}

impl From<MethodId> for SymbolId {
    fn from(id: MethodId) -> Self {
        SymbolId::Method(id)
    }
}

impl From<FieldId> for SymbolId {
    fn from(id: FieldId) -> Self {
        SymbolId::Field(id)
    }
}

impl From<PropertyId> for SymbolId {
    fn from(id: PropertyId) -> Self {
        SymbolId::Property(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            SymbolId::NamedType(id) => write!(f, "{}", id),
            SymbolId::Method(id) => write!(f, "{}", id),
            SymbolId::Field(id) => write!(f, "{}", id),
            SymbolId::Property(id) => write!(f, "{}", id),
        }
    }
}

/// 模板参数的声明者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateOwner {
    Type(NamedTypeId),
    Method(MethodId),
    /// 签名比较使用的规范化参数，不属于任何声明
    Indexed,
}
