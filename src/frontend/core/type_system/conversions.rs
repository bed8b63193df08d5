//! 约束合并使用的隐式转换
//!
//! 只覆盖包含关系判断需要的转换：恒等、隐式引用转换、装箱。
//! 用户定义转换与数值转换不在此列。

use super::compilation::Compilation;
use super::ids::NamedTypeId;
use super::symbol::{SpecialType, TypeCompareKind, TypeKind, TypeSymbol};

impl Compilation {
    /// `from` 是否有到 `to` 的恒等、隐式引用或装箱转换
    ///
    /// 错误类型与任何类型双向可转换，避免连锁诊断。
    pub fn has_encompassing_conversion(
        &self,
        from: TypeSymbol,
        to: TypeSymbol,
    ) -> bool {
        if self.types_equal(from, to, TypeCompareKind::IGNORE_NULLABILITY) {
            return true;
        }
        if self.is_error_type(from) || self.is_error_type(to) {
            return true;
        }
        if self.special_type(to) == SpecialType::Object {
            return true;
        }
        match from {
            TypeSymbol::Named(id) => match to {
                TypeSymbol::Named(target) => self.inherits_from(id, target),
                _ => false,
            },
            TypeSymbol::Array(id) => {
                if self.special_type(to) == SpecialType::Array {
                    return true;
                }
                let TypeSymbol::Array(target) = to else {
                    return false;
                };
                let (source, target) = (self.array(id), self.array(target));
                source.rank == target.rank
                    && source.is_sz == target.is_sz
                    && self.is_reference_type(source.element.ty)
                    && self.is_reference_type(target.element.ty)
                    && self.has_encompassing_conversion(source.element.ty, target.element.ty)
            }
            TypeSymbol::TemplateParameter(p) => {
                if self
                    .constraint_types(p)
                    .iter()
                    .any(|c| self.has_encompassing_conversion(c.ty, to))
                {
                    return true;
                }
                match (self.effective_base_class(p), to) {
                    (Some(base), TypeSymbol::Named(target)) => {
                        self.named_types_equal(base, target, TypeCompareKind::IGNORE_NULLABILITY)
                            || self.inherits_from(base, target)
                    }
                    _ => false,
                }
            }
        }
    }

    /// `derived` 的基类型链上是否出现 `base`
    pub fn inherits_from(
        &self,
        derived: NamedTypeId,
        base: NamedTypeId,
    ) -> bool {
        let mut current = self.base_type(derived);
        while let Some(t) = current {
            if self.named_types_equal(t, base, TypeCompareKind::IGNORE_NULLABILITY) {
                return true;
            }
            current = self.base_type(t);
        }
        false
    }

    /// 引用类型：类、数组，以及有 object 约束的模板参数
    pub fn is_reference_type(
        &self,
        ty: TypeSymbol,
    ) -> bool {
        match ty {
            TypeSymbol::Named(id) => self.named(id).type_kind == TypeKind::Class,
            TypeSymbol::Array(_) => true,
            TypeSymbol::TemplateParameter(p) => {
                let data = self.param(p);
                data.has_object_type_constraint
                    || (!data.has_primitive_type_constraint
                        && self
                            .effective_base_class(p)
                            .is_some_and(|base| !self.is_object_or_value_type(base)))
            }
        }
    }

    /// 值类型：结构体、原始类型，以及有 primitive 约束的模板参数
    pub fn is_value_type(
        &self,
        ty: TypeSymbol,
    ) -> bool {
        match ty {
            TypeSymbol::Named(id) => self.named(id).type_kind.is_value_type(),
            TypeSymbol::Array(_) => false,
            TypeSymbol::TemplateParameter(p) => {
                self.param(p).has_primitive_type_constraint
                    || self.special_type(self.deduced_base_type(p)) == SpecialType::ValueType
                    || self.type_kind(self.deduced_base_type(p)).is_value_type()
            }
        }
    }

    pub(crate) fn is_object_or_value_type(
        &self,
        id: NamedTypeId,
    ) -> bool {
        matches!(
            self.named(id).special_type,
            SpecialType::Object | SpecialType::ValueType
        )
    }
}
