//! 类型与符号的基本值类型
//!
//! - TypeSymbol: 类型句柄（命名类型、数组、模板参数）
//! - TypeWithAnnotations: 类型 + 可空标记
//! - TypeOrConstant: 模板实参（类型或常量）
//! - TypeCompareKind: 控制结构相等的标志位

use std::fmt;

use bitflags::bitflags;

use super::ids::{ArrayTypeId, NamedTypeId, TemplateParamId};

/// 类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Class,
    Struct,
    Array,
    TemplateParameter,
    Error,
}

impl TypeKind {
    /// 值类型（结构体与原始类型）
    pub fn is_value_type(self) -> bool {
        matches!(self, TypeKind::Primitive | TypeKind::Struct)
    }

    /// 引用类型（类与数组）
    pub fn is_reference_type(self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Array)
    }
}

/// 核心库中具有特殊含义的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecialType {
    #[default]
    None,
    Object,
    ValueType,
    Array,
    Void,
    Nullable,
    Boolean,
    Int32,
    Int64,
    Double,
    String,
}

impl SpecialType {
    /// 核心库中需要预先声明的全部特殊类型
    pub const ALL: [SpecialType; 10] = [
        SpecialType::Object,
        SpecialType::ValueType,
        SpecialType::Array,
        SpecialType::Void,
        SpecialType::Nullable,
        SpecialType::Boolean,
        SpecialType::Int32,
        SpecialType::Int64,
        SpecialType::Double,
        SpecialType::String,
    ];
}

/// 类型句柄
///
/// 句柄相等表示引用同一个已分配的符号，不代表结构相等。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Named(NamedTypeId),
    Array(ArrayTypeId),
    TemplateParameter(TemplateParamId),
}

impl TypeSymbol {
    pub fn as_named(self) -> Option<NamedTypeId> {
        match self {
            TypeSymbol::Named(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_template_parameter(self) -> Option<TemplateParamId> {
        match self {
            TypeSymbol::TemplateParameter(id) => Some(id),
            _ => None,
        }
    }
}

impl From<NamedTypeId> for TypeSymbol {
    fn from(id: NamedTypeId) -> Self {
        TypeSymbol::Named(id)
    }
}

impl From<ArrayTypeId> for TypeSymbol {
    fn from(id: ArrayTypeId) -> Self {
        TypeSymbol::Array(id)
    }
}

impl From<TemplateParamId> for TypeSymbol {
    fn from(id: TemplateParamId) -> Self {
        TypeSymbol::TemplateParameter(id)
    }
}

/// 类型 + 可空标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeWithAnnotations {
    pub ty: TypeSymbol,
    pub is_nullable: bool,
}

impl TypeWithAnnotations {
    pub fn new(ty: impl Into<TypeSymbol>) -> Self {
        Self {
            ty: ty.into(),
            is_nullable: false,
        }
    }

    pub fn nullable(ty: impl Into<TypeSymbol>) -> Self {
        Self {
            ty: ty.into(),
            is_nullable: true,
        }
    }

    pub fn with_nullability(
        self,
        is_nullable: bool,
    ) -> Self {
        Self {
            ty: self.ty,
            is_nullable,
        }
    }

    /// 换成另一个类型，保留可空标记
    pub fn with_type(
        self,
        ty: impl Into<TypeSymbol>,
    ) -> Self {
        Self {
            ty: ty.into(),
            is_nullable: self.is_nullable,
        }
    }

    /// 同一个类型引用且可空标记相同
    pub fn is_same_as(
        &self,
        other: &TypeWithAnnotations,
    ) -> bool {
        self.ty == other.ty && self.is_nullable == other.is_nullable
    }
}

impl From<TypeSymbol> for TypeWithAnnotations {
    fn from(ty: TypeSymbol) -> Self {
        Self::new(ty)
    }
}

impl From<NamedTypeId> for TypeWithAnnotations {
    fn from(id: NamedTypeId) -> Self {
        Self::new(id)
    }
}

impl From<ArrayTypeId> for TypeWithAnnotations {
    fn from(id: ArrayTypeId) -> Self {
        Self::new(id)
    }
}

impl From<TemplateParamId> for TypeWithAnnotations {
    fn from(id: TemplateParamId) -> Self {
        Self::new(id)
    }
}

/// 非类型模板实参的常量值
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Char(char),
    String(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConstantValue::Bool(b) => write!(f, "{}", b),
            ConstantValue::Int(n) => write!(f, "{}", n),
            ConstantValue::Char(c) => write!(f, "'{}'", c),
            ConstantValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// 模板实参：类型或常量
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeOrConstant {
    Type(TypeWithAnnotations),
    Constant(ConstantValue),
}

impl TypeOrConstant {
    pub fn as_type(&self) -> Option<TypeWithAnnotations> {
        match self {
            TypeOrConstant::Type(t) => Some(*t),
            TypeOrConstant::Constant(_) => None,
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, TypeOrConstant::Type(_))
    }

    /// 引用层面的相同：类型实参比较句柄和可空标记，常量比较值
    pub fn is_same_as(
        &self,
        other: &TypeOrConstant,
    ) -> bool {
        match (self, other) {
            (TypeOrConstant::Type(a), TypeOrConstant::Type(b)) => a.is_same_as(b),
            (TypeOrConstant::Constant(a), TypeOrConstant::Constant(b)) => a == b,
            _ => false,
        }
    }
}

impl From<TypeWithAnnotations> for TypeOrConstant {
    fn from(t: TypeWithAnnotations) -> Self {
        TypeOrConstant::Type(t)
    }
}

impl From<TypeSymbol> for TypeOrConstant {
    fn from(t: TypeSymbol) -> Self {
        TypeOrConstant::Type(TypeWithAnnotations::new(t))
    }
}

impl From<NamedTypeId> for TypeOrConstant {
    fn from(t: NamedTypeId) -> Self {
        TypeOrConstant::Type(TypeWithAnnotations::new(t))
    }
}

impl From<ArrayTypeId> for TypeOrConstant {
    fn from(t: ArrayTypeId) -> Self {
        TypeOrConstant::Type(TypeWithAnnotations::new(t))
    }
}

impl From<TemplateParamId> for TypeOrConstant {
    fn from(t: TemplateParamId) -> Self {
        TypeOrConstant::Type(TypeWithAnnotations::new(t))
    }
}

impl From<ConstantValue> for TypeOrConstant {
    fn from(c: ConstantValue) -> Self {
        TypeOrConstant::Constant(c)
    }
}

bitflags! {
    /// 结构相等时可以忽略的差异
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeCompareKind: u8 {
        const IGNORE_NULLABILITY = 1 << 0;
        const IGNORE_ARRAY_SIZES_AND_LOWER_BOUNDS = 1 << 1;
    }
}

impl TypeCompareKind {
    /// 不忽略任何差异
    pub const CONSIDER_EVERYTHING: TypeCompareKind = TypeCompareKind::empty();
    /// 默认比较方式：忽略可空标记
    pub const DEFAULT: TypeCompareKind = TypeCompareKind::IGNORE_NULLABILITY;
}

impl Default for TypeCompareKind {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 模板参数接受的实参种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateParameterKind {
    #[default]
    Type,
    /// 非类型参数（常量实参）
    Constant,
}

/// 参数传递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

/// 可访问性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

/// 成员修饰符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemberModifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_sealed: bool,
}

impl MemberModifiers {
    pub const NONE: MemberModifiers = MemberModifiers {
        is_static: false,
        is_virtual: false,
        is_abstract: false,
        is_override: false,
        is_sealed: false,
    };

    pub const VIRTUAL: MemberModifiers = MemberModifiers {
        is_virtual: true,
        ..MemberModifiers::NONE
    };

    pub const ABSTRACT: MemberModifiers = MemberModifiers {
        is_abstract: true,
        ..MemberModifiers::NONE
    };

    pub const OVERRIDE: MemberModifiers = MemberModifiers {
        is_override: true,
        ..MemberModifiers::NONE
    };

    pub const STATIC: MemberModifiers = MemberModifiers {
        is_static: true,
        ..MemberModifiers::NONE
    };
}

/// 约束子句上绑定后的表达式
///
/// 由语句/表达式绑定器产生，这里只作为不透明值保存，供显示使用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundExpression {
    pub text: String,
}

impl BoundExpression {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 方法参数
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeWithAnnotations,
    pub ref_kind: RefKind,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<TypeWithAnnotations>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ref_kind: RefKind::None,
        }
    }

    pub fn with_ref_kind(
        mut self,
        ref_kind: RefKind,
    ) -> Self {
        self.ref_kind = ref_kind;
        self
    }
}

/// 方法签名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub return_type: TypeWithAnnotations,
    pub parameters: Vec<Parameter>,
}

impl MethodSignature {
    pub fn new(
        return_type: impl Into<TypeWithAnnotations>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            return_type: return_type.into(),
            parameters,
        }
    }
}
