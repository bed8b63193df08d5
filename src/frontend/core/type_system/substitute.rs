//! 模板替换
//!
//! [`TemplateMap`] 把模板参数映射到实参（类型或常量），并据此重写类型、
//! 模板实参列表、约束类型列表和方法签名。
//!
//! 替换不改变任何东西时必须返回输入的同一个符号 id：
//! 调用方依赖这一点避免连锁分配。

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::{trace, warn};

use super::compilation::{Compilation, ConstraintSource, SymbolArena, TemplateParamData};
use super::ids::{ArrayTypeId, NamedTypeId, TemplateOwner, TemplateParamId};
use super::symbol::{
    MethodSignature, Parameter, TypeCompareKind, TypeOrConstant, TypeSymbol, TypeWithAnnotations,
};

/// 模板参数到实参的映射，构造后不可变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMap {
    mapping: IndexMap<TemplateParamId, TypeOrConstant>,
}

impl TemplateMap {
    /// 空映射
    pub fn empty() -> Self {
        Self::default()
    }

    /// `params[i] -> args[i]`；多余的一侧被忽略
    pub fn new(
        params: &[TemplateParamId],
        args: &[TypeOrConstant],
    ) -> Self {
        Self::with_container(None, params, args)
    }

    /// 在外层映射的基础上追加一组绑定
    pub fn with_container(
        container: Option<&TemplateMap>,
        params: &[TemplateParamId],
        args: &[TypeOrConstant],
    ) -> Self {
        let mut mapping = container.map(|m| m.mapping.clone()).unwrap_or_default();
        for (param, arg) in params.iter().zip(args) {
            mapping.insert(*param, arg.clone());
        }
        Self { mapping }
    }

    pub fn get(
        &self,
        param: TemplateParamId,
    ) -> Option<&TypeOrConstant> {
        self.mapping.get(&param)
    }

    pub fn contains(
        &self,
        param: TemplateParamId,
    ) -> bool {
        self.mapping.contains_key(&param)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TemplateParamId, &TypeOrConstant)> {
        self.mapping.iter()
    }

    // ------------------------------------------------------------------
    // 类型替换
    // ------------------------------------------------------------------

    /// 替换类型中出现的模板参数
    ///
    /// 不在映射中的参数原样返回（嵌套模板的部分替换）。
    /// 结果的可空标记是原标记与实参标记的并。
    pub fn substitute_type(
        &self,
        c: &Compilation,
        ty: TypeWithAnnotations,
    ) -> TypeOrConstant {
        match ty.ty {
            TypeSymbol::TemplateParameter(p) => match self.mapping.get(&p) {
                Some(TypeOrConstant::Type(arg)) => {
                    TypeOrConstant::Type(arg.with_nullability(arg.is_nullable || ty.is_nullable))
                }
                Some(constant @ TypeOrConstant::Constant(_)) => constant.clone(),
                None => TypeOrConstant::Type(ty),
            },
            TypeSymbol::Named(id) => {
                let substituted = self.substitute_named_type(c, id);
                TypeOrConstant::Type(ty.with_type(substituted))
            }
            TypeSymbol::Array(id) => {
                let substituted = self.substitute_array_type(c, id);
                TypeOrConstant::Type(ty.with_type(substituted))
            }
        }
    }

    /// 类型位置上的替换：常量实参出现在类型位置时得到错误类型
    pub fn substitute_type_strict(
        &self,
        c: &Compilation,
        ty: TypeWithAnnotations,
    ) -> TypeWithAnnotations {
        match self.substitute_type(c, ty) {
            TypeOrConstant::Type(t) => t,
            TypeOrConstant::Constant(value) => {
                warn!(%value, "constant template argument used in a type position");
                TypeWithAnnotations::new(c.error_type(value.to_string(), 0))
            }
        }
    }

    /// 替换命名类型：先替换其 `constructed_from`（容器变化时在新容器中重新查找），
    /// 再替换模板实参；都没有变化时返回原 id
    pub fn substitute_named_type(
        &self,
        c: &Compilation,
        previous: NamedTypeId,
    ) -> NamedTypeId {
        if self.is_empty() {
            return previous;
        }
        let old_constructed_from = c.constructed_from(previous);
        let new_constructed_from = self.substitute_member_type(c, old_constructed_from);
        let mut changed = new_constructed_from != old_constructed_from;

        let old_arguments = c.template_arguments(previous);
        let new_arguments = self.substitute_template_arguments(c, &old_arguments);
        if !changed {
            changed = old_arguments
                .iter()
                .zip(&new_arguments)
                .any(|(old, new)| !old.is_same_as(new));
        }
        if !changed {
            return previous;
        }
        if new_arguments.is_empty() {
            return new_constructed_from;
        }
        match c.construct(new_constructed_from, new_arguments) {
            Ok(constructed) => constructed,
            Err(err) => {
                warn!(%err, "substitution produced an invalid construction");
                c.error_type(c.type_name(TypeSymbol::Named(previous)), c.arity(previous))
            }
        }
    }

    /// 容器被替换后，在新容器中找到对应的嵌套类型
    fn substitute_member_type(
        &self,
        c: &Compilation,
        previous: NamedTypeId,
    ) -> NamedTypeId {
        let Some(old_container) = c.containing_type(previous) else {
            return previous;
        };
        let new_container = self.substitute_named_type(c, old_container);
        if new_container == old_container {
            return previous;
        }
        c.type_member_for_definition(new_container, c.original_definition(previous))
            .unwrap_or(previous)
    }

    /// 替换数组元素类型；元素不变时返回原数组
    pub fn substitute_array_type(
        &self,
        c: &Compilation,
        previous: ArrayTypeId,
    ) -> ArrayTypeId {
        let data = c.array(previous);
        let element = self.substitute_type_strict(c, data.element);
        if element.is_same_as(&data.element) {
            return previous;
        }
        let rebuilt = c.allocate_array_like(&data, element);
        trace!(%previous, %rebuilt, "rebuilt array type");
        rebuilt
    }

    /// 逐个替换模板实参
    pub fn substitute_template_arguments(
        &self,
        c: &Compilation,
        arguments: &[TypeOrConstant],
    ) -> Vec<TypeOrConstant> {
        arguments
            .iter()
            .map(|argument| match argument {
                TypeOrConstant::Type(t) => self.substitute_type(c, *t),
                TypeOrConstant::Constant(_) => argument.clone(),
            })
            .collect()
    }

    /// 替换约束类型列表并去重
    ///
    /// 忽略可空标记后相等的两项合并为一项，保留先出现的位置；
    /// 其中任一项不可空时结果不可空。
    pub fn substitute_constraint_types(
        &self,
        c: &Compilation,
        constraint_types: &[TypeWithAnnotations],
    ) -> Vec<TypeWithAnnotations> {
        let mut result: Vec<TypeWithAnnotations> = Vec::with_capacity(constraint_types.len());
        for constraint in constraint_types {
            let substituted = self.substitute_type_strict(c, *constraint);
            let existing = result.iter().position(|seen| {
                c.types_equal(seen.ty, substituted.ty, TypeCompareKind::IGNORE_NULLABILITY)
            });
            match existing {
                Some(index) => {
                    if !substituted.is_nullable {
                        result[index] = result[index].with_nullability(false);
                    }
                }
                None => result.push(substituted),
            }
        }
        result
    }

    /// 替换返回类型与全部参数类型
    pub fn substitute_signature(
        &self,
        c: &Compilation,
        signature: &MethodSignature,
    ) -> MethodSignature {
        MethodSignature {
            return_type: self.substitute_type_strict(c, signature.return_type),
            parameters: signature
                .parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    ty: self.substitute_type_strict(c, p.ty),
                    ref_kind: p.ref_kind,
                })
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // 重命名
    // ------------------------------------------------------------------

    /// 把 `old_params` 重新挂到 `new_owner` 上
    ///
    /// 返回追加了 `old -> new` 绑定的新映射和新参数。
    /// 新参数的约束是原参数约束经新映射替换的结果。
    pub fn with_alpha_rename(
        &self,
        c: &Compilation,
        old_params: &[TemplateParamId],
        new_owner: TemplateOwner,
    ) -> (TemplateMap, Vec<TemplateParamId>) {
        let mut arena = c.arena.write();
        self.alpha_rename_in(&mut arena, old_params, new_owner)
    }

    /// 与 [`with_alpha_rename`](Self::with_alpha_rename) 相同，但使用调用方已持有的 arena
    pub(crate) fn alpha_rename_in(
        &self,
        arena: &mut SymbolArena,
        old_params: &[TemplateParamId],
        new_owner: TemplateOwner,
    ) -> (TemplateMap, Vec<TemplateParamId>) {
        if old_params.is_empty() {
            return (self.clone(), Vec::new());
        }
        let new_params: Vec<TemplateParamId> = old_params
            .iter()
            .map(|old| {
                let original = arena.params[old.index()].clone();
                arena.push_param(TemplateParamData {
                    name: original.name.clone(),
                    ordinal: original.ordinal,
                    owner: new_owner,
                    kind: original.kind,
                    has_primitive_type_constraint: original.has_primitive_type_constraint,
                    has_object_type_constraint: original.has_object_type_constraint,
                    span: original.span,
                    source: ConstraintSource::Substituted {
                        original: *old,
                        map: OnceCell::new(),
                    },
                    bounds: OnceCell::new(),
                })
            })
            .collect();
        let arguments: Vec<TypeOrConstant> =
            new_params.iter().map(|p| TypeOrConstant::from(*p)).collect();
        let map = TemplateMap::with_container(Some(self), old_params, &arguments);
        let shared = Arc::new(map.clone());
        for param in &new_params {
            if let ConstraintSource::Substituted { map: cell, .. } =
                &arena.params[param.index()].source
            {
                let _ = cell.set(shared.clone());
            }
        }
        (map, new_params)
    }
}
