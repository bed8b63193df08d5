//! 类型结构相等与哈希
//!
//! 相等规则：
//! - 命名类型：同一原始定义 + 相等的外层类型 + 逐个相等的模板实参；
//!   两个未构造的定义只有在是同一个符号时才相等
//! - 模板参数：同一个符号；或两个替换参数的原始参数、序号、所在类型都相等
//! - 数组：元素类型、维数、是否 SZ 数组；除非忽略，还比较尺寸和下界
//!
//! 哈希在默认比较方式（忽略可空标记）下与相等保持一致。

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::compilation::{Compilation, ConstraintSource, NamedTypeVariant};
use super::ids::{ArrayTypeId, NamedTypeId, TemplateParamId};
use super::symbol::{TypeCompareKind, TypeOrConstant, TypeSymbol, TypeWithAnnotations};

impl Compilation {
    /// 按 `compare_kind` 比较两个类型
    pub fn types_equal(
        &self,
        a: TypeSymbol,
        b: TypeSymbol,
        compare_kind: TypeCompareKind,
    ) -> bool {
        if a == b {
            return true;
        }
        match (a, b) {
            (TypeSymbol::Named(x), TypeSymbol::Named(y)) => {
                self.named_types_equal(x, y, compare_kind)
            }
            (TypeSymbol::Array(x), TypeSymbol::Array(y)) => {
                self.array_types_equal(x, y, compare_kind)
            }
            (TypeSymbol::TemplateParameter(x), TypeSymbol::TemplateParameter(y)) => {
                self.template_parameters_equal(x, y, compare_kind)
            }
            _ => false,
        }
    }

    /// 类型 + 可空标记的比较
    pub fn type_with_annotations_equal(
        &self,
        a: TypeWithAnnotations,
        b: TypeWithAnnotations,
        compare_kind: TypeCompareKind,
    ) -> bool {
        if !compare_kind.contains(TypeCompareKind::IGNORE_NULLABILITY)
            && a.is_nullable != b.is_nullable
        {
            return false;
        }
        self.types_equal(a.ty, b.ty, compare_kind)
    }

    /// 模板实参的比较，按实参种类分派
    pub fn type_or_constant_equal(
        &self,
        a: &TypeOrConstant,
        b: &TypeOrConstant,
        compare_kind: TypeCompareKind,
    ) -> bool {
        match (a, b) {
            (TypeOrConstant::Type(x), TypeOrConstant::Type(y)) => {
                self.type_with_annotations_equal(*x, *y, compare_kind)
            }
            (TypeOrConstant::Constant(x), TypeOrConstant::Constant(y)) => x == y,
            _ => false,
        }
    }

    pub fn named_types_equal(
        &self,
        a: NamedTypeId,
        b: NamedTypeId,
        compare_kind: TypeCompareKind,
    ) -> bool {
        if a == b {
            return true;
        }
        let (x, y) = (self.named(a), self.named(b));
        // 未构造的定义只按引用相等
        if matches!(x.variant, NamedTypeVariant::Definition(_))
            || matches!(y.variant, NamedTypeVariant::Definition(_))
        {
            return false;
        }
        if self.original_definition(a) != self.original_definition(b) {
            return false;
        }
        let containers_equal = match (x.containing_type, y.containing_type) {
            (None, None) => true,
            (Some(cx), Some(cy)) => self.named_types_equal(cx, cy, compare_kind),
            _ => false,
        };
        if !containers_equal {
            return false;
        }
        let (args_a, args_b) = (self.template_arguments(a), self.template_arguments(b));
        args_a.len() == args_b.len()
            && args_a
                .iter()
                .zip(&args_b)
                .all(|(p, q)| self.type_or_constant_equal(p, q, compare_kind))
    }

    fn template_parameters_equal(
        &self,
        a: TemplateParamId,
        b: TemplateParamId,
        compare_kind: TypeCompareKind,
    ) -> bool {
        if a == b {
            return true;
        }
        let (x, y) = (self.param(a), self.param(b));
        let both_substituted = matches!(x.source, ConstraintSource::Substituted { .. })
            && matches!(y.source, ConstraintSource::Substituted { .. });
        if !both_substituted || x.ordinal != y.ordinal {
            return false;
        }
        if self.template_parameter_original(a) != self.template_parameter_original(b) {
            return false;
        }
        match (
            self.template_parameter_containing_type(a),
            self.template_parameter_containing_type(b),
        ) {
            (Some(cx), Some(cy)) => self.named_types_equal(cx, cy, compare_kind),
            (None, None) => true,
            _ => false,
        }
    }

    fn array_types_equal(
        &self,
        a: ArrayTypeId,
        b: ArrayTypeId,
        compare_kind: TypeCompareKind,
    ) -> bool {
        let (x, y) = (self.array(a), self.array(b));
        if x.rank != y.rank || x.is_sz != y.is_sz {
            return false;
        }
        if !self.type_with_annotations_equal(x.element, y.element, compare_kind) {
            return false;
        }
        if compare_kind.contains(TypeCompareKind::IGNORE_ARRAY_SIZES_AND_LOWER_BOUNDS) {
            return true;
        }
        x.sizes == y.sizes && normalized_lower_bounds(&x.lower_bounds, x.rank)
            == normalized_lower_bounds(&y.lower_bounds, y.rank)
    }

    /// 与 `types_equal(.., TypeCompareKind::DEFAULT)` 一致的哈希
    pub fn type_hash(
        &self,
        ty: TypeSymbol,
    ) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_type_into(ty, &mut hasher);
        hasher.finish()
    }

    pub(crate) fn hash_type_into<H: Hasher>(
        &self,
        ty: TypeSymbol,
        state: &mut H,
    ) {
        match ty {
            TypeSymbol::Named(id) => {
                0u8.hash(state);
                let data = self.named(id);
                match &data.variant {
                    NamedTypeVariant::Definition(_) => id.hash(state),
                    _ => {
                        self.original_definition(id).hash(state);
                        for argument in self.template_arguments(id) {
                            self.hash_argument_into(&argument, state);
                        }
                    }
                }
            }
            TypeSymbol::Array(id) => {
                1u8.hash(state);
                let data = self.array(id);
                data.rank.hash(state);
                self.hash_type_into(data.element.ty, state);
            }
            TypeSymbol::TemplateParameter(id) => {
                2u8.hash(state);
                self.template_parameter_original(id).hash(state);
            }
        }
    }

    fn hash_argument_into<H: Hasher>(
        &self,
        argument: &TypeOrConstant,
        state: &mut H,
    ) {
        match argument {
            TypeOrConstant::Type(t) => self.hash_type_into(t.ty, state),
            TypeOrConstant::Constant(c) => c.hash(state),
        }
    }
}

fn normalized_lower_bounds(
    lower_bounds: &Option<Vec<i64>>,
    rank: usize,
) -> Vec<i64> {
    let mut bounds = lower_bounds.clone().unwrap_or_default();
    if bounds.len() < rank {
        bounds.resize(rank, 0);
    }
    bounds
}
