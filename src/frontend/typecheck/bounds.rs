//! 模板参数约束解析
//!
//! 从声明的约束类型计算模板参数的有效基类、推导基类型和约束类型列表。
//!
//! # 规则
//!
//! - 初始有效基类为 Object；参数有 primitive 约束时没有有效基类，推导基类型为 ValueType
//! - 同一声明中的参数相互约束形成环时报告 CircularConstraint，并丢弃该约束
//! - 两个约束的推导基类型互不包含时报告 ConflictingBaseConstraint，保留先出现的一个
//! - 继承约束同时蕴含 primitive 与 object 时报告 IncompatibleConstraintKinds
//!
//! 所有诊断都可恢复，解析总会完成。

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::frontend::core::type_system::compilation::{Compilation, ConstraintSource};
use crate::frontend::core::type_system::substitute::TemplateMap;
use crate::frontend::core::type_system::{
    NamedTypeId, SpecialType, TemplateOwner, TemplateParamId, TypeKind, TypeOrConstant,
    TypeSymbol, TypeWithAnnotations,
};
use crate::util::diagnostic::{Diagnostic, DiagnosticArgument, DiagnosticBag, DiagnosticKind};
use crate::util::span::Span;

/// 解析后的约束边界
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterBounds {
    /// 被接受的约束类型（环形约束已剔除）
    pub constraint_types: Vec<TypeWithAnnotations>,
    /// 有效基类；primitive 约束的参数没有
    pub effective_base_class: Option<NamedTypeId>,
    /// 全部约束合并后的最具体类型
    pub deduced_base_type: TypeSymbol,
}

/// 当前正在解析的模板参数，最近进入的在前
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InProgress(SmallVec<[TemplateParamId; 4]>);

impl InProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回在前端追加了 `parameter` 的新栈，自身不变
    pub fn prepend(
        &self,
        parameter: TemplateParamId,
    ) -> Self {
        let mut stack = self.0.clone();
        stack.insert(0, parameter);
        Self(stack)
    }

    pub fn contains(
        &self,
        parameter: TemplateParamId,
    ) -> bool {
        self.0.contains(&parameter)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 约束隐含的类型类别
#[derive(Debug, Clone, Copy, Default)]
struct ImpliedKinds {
    primitive: bool,
    object: bool,
}

/// 解析 `parameter` 的约束边界
///
/// `in_progress` 必须已经包含 `parameter`。诊断推入 `diagnostics`；
/// 没有约束且推导基类型为 Object 时返回 `None`。
pub fn resolve_bounds(
    c: &Compilation,
    parameter: TemplateParamId,
    in_progress: &InProgress,
    constraint_types: &[TypeWithAnnotations],
    inherited: bool,
    span: Span,
    diagnostics: &mut DiagnosticBag,
) -> Option<TypeParameterBounds> {
    let object = c.object_type();
    let value_type = c.get_special_type(SpecialType::ValueType);
    let owner = c.template_parameter_owner(parameter);
    let has_primitive = c.has_primitive_type_constraint(parameter);
    let has_object = c.has_object_type_constraint(parameter);

    let mut effective_base_class = if has_primitive { None } else { Some(object) };
    let mut deduced_base_type = TypeSymbol::Named(if has_primitive { value_type } else { object });
    let mut accepted = Vec::with_capacity(constraint_types.len());
    let mut implied = ImpliedKinds::default();

    for constraint in constraint_types {
        let (constraint_effective, constraint_deduced) = match constraint.ty {
            TypeSymbol::TemplateParameter(other) => {
                if c.template_parameter_owner(other) == owner && in_progress.contains(other) {
                    report_circular(diagnostics, parameter, other, span);
                    continue;
                }
                let effective = c.effective_base_class_with(other, in_progress);
                let deduced = c.deduced_base_type_with(other, in_progress);
                implied.primitive |= c.has_primitive_type_constraint(other)
                    || c.type_kind(deduced).is_value_type();
                implied.object |= c.has_object_type_constraint(other)
                    || effective.is_some_and(|base| !c.is_object_or_value_type(base));
                (effective, deduced)
            }
            TypeSymbol::Named(id) => match c.type_kind(constraint.ty) {
                TypeKind::Struct | TypeKind::Primitive => {
                    if let Some(underlying) = c.nullable_underlying_type(constraint.ty) {
                        if let TypeSymbol::TemplateParameter(other) = underlying.ty {
                            if c.template_parameter_owner(other) == owner
                                && in_progress.contains(other)
                            {
                                report_circular(diagnostics, parameter, other, span);
                                continue;
                            }
                        }
                    }
                    implied.primitive = true;
                    (Some(value_type), constraint.ty)
                }
                TypeKind::Error => (Some(id), constraint.ty),
                _ => {
                    implied.object |= !c.is_object_or_value_type(id);
                    (Some(id), constraint.ty)
                }
            },
            TypeSymbol::Array(_) => {
                implied.object = true;
                (
                    Some(c.get_special_type(SpecialType::Array)),
                    constraint.ty,
                )
            }
        };

        accepted.push(*constraint);

        if c.is_error_type(deduced_base_type) || c.is_error_type(constraint_deduced) {
            continue;
        }
        if c.has_encompassing_conversion(deduced_base_type, constraint_deduced) {
            continue;
        }
        if c.has_encompassing_conversion(constraint_deduced, deduced_base_type) {
            deduced_base_type = constraint_deduced;
            effective_base_class = constraint_effective;
        } else {
            trace!(%parameter, "conflicting base constraints");
            diagnostics.push(
                Diagnostic::new(DiagnosticKind::ConflictingBaseConstraint, span)
                    .with_argument(DiagnosticArgument::TemplateParameter(parameter))
                    .with_argument(DiagnosticArgument::Type(constraint.ty))
                    .with_argument(DiagnosticArgument::Type(deduced_base_type)),
            );
        }
    }

    if accepted.is_empty() && deduced_base_type == TypeSymbol::Named(object) {
        return None;
    }

    if inherited && (has_primitive || implied.primitive) && (has_object || implied.object) {
        diagnostics.push(
            Diagnostic::new(DiagnosticKind::IncompatibleConstraintKinds, span)
                .with_argument(DiagnosticArgument::TemplateParameter(parameter)),
        );
    }

    Some(TypeParameterBounds {
        constraint_types: accepted,
        effective_base_class,
        deduced_base_type,
    })
}

fn report_circular(
    diagnostics: &mut DiagnosticBag,
    parameter: TemplateParamId,
    other: TemplateParamId,
    span: Span,
) {
    trace!(%parameter, %other, "circular constraint");
    diagnostics.push(
        Diagnostic::new(DiagnosticKind::CircularConstraint, span)
            .with_argument(DiagnosticArgument::TemplateParameter(parameter))
            .with_argument(DiagnosticArgument::TemplateParameter(other)),
    );
}

/// 解析边界所需的输入
struct ConstraintInput {
    types: Vec<TypeWithAnnotations>,
    inherited: bool,
}

impl Compilation {
    /// 模板参数的约束边界（第一次查询时解析并缓存）
    pub fn template_parameter_bounds(
        &self,
        parameter: TemplateParamId,
    ) -> Option<Arc<TypeParameterBounds>> {
        self.bounds_with(parameter, &InProgress::new())
    }

    pub(crate) fn bounds_with(
        &self,
        parameter: TemplateParamId,
        in_progress: &InProgress,
    ) -> Option<Arc<TypeParameterBounds>> {
        let data = self.param(parameter);
        if let Some(bounds) = data.bounds.get() {
            return bounds.clone();
        }
        let in_progress = in_progress.prepend(parameter);
        let input = self.constraint_input(parameter);
        let mut diagnostics = DiagnosticBag::new();
        let resolved = resolve_bounds(
            self,
            parameter,
            &in_progress,
            &input.types,
            input.inherited,
            data.span,
            &mut diagnostics,
        )
        .map(Arc::new);
        match data.bounds.try_insert(resolved) {
            Ok(bounds) => {
                debug!(
                    %parameter,
                    constraints = bounds.as_ref().map_or(0, |b| b.constraint_types.len()),
                    diagnostics = diagnostics.len(),
                    "resolved template parameter bounds"
                );
                // 替换参数的约束子句已在源参数上报告过
                if matches!(
                    data.source,
                    ConstraintSource::Declared(_) | ConstraintSource::Inherited
                ) {
                    self.report(diagnostics);
                }
                bounds.clone()
            }
            // 另一个线程先完成，丢弃本次结果和诊断
            Err((winner, _)) => winner.clone(),
        }
    }

    /// 约束类型列表（已剔除环形约束）
    pub fn constraint_types(
        &self,
        parameter: TemplateParamId,
    ) -> Vec<TypeWithAnnotations> {
        self.template_parameter_bounds(parameter)
            .map(|b| b.constraint_types.clone())
            .unwrap_or_default()
    }

    /// 有效基类；primitive 约束的参数没有有效基类
    pub fn effective_base_class(
        &self,
        parameter: TemplateParamId,
    ) -> Option<NamedTypeId> {
        self.effective_base_class_with(parameter, &InProgress::new())
    }

    pub fn deduced_base_type(
        &self,
        parameter: TemplateParamId,
    ) -> TypeSymbol {
        self.deduced_base_type_with(parameter, &InProgress::new())
    }

    fn effective_base_class_with(
        &self,
        parameter: TemplateParamId,
        in_progress: &InProgress,
    ) -> Option<NamedTypeId> {
        match self.bounds_with(parameter, in_progress) {
            Some(bounds) => bounds.effective_base_class,
            None => Some(self.object_type()),
        }
    }

    fn deduced_base_type_with(
        &self,
        parameter: TemplateParamId,
        in_progress: &InProgress,
    ) -> TypeSymbol {
        match self.bounds_with(parameter, in_progress) {
            Some(bounds) => bounds.deduced_base_type,
            None => TypeSymbol::Named(self.object_type()),
        }
    }

    /// 声明或继承的 primitive 约束
    pub fn has_primitive_type_constraint(
        &self,
        parameter: TemplateParamId,
    ) -> bool {
        let data = self.param(parameter);
        data.has_primitive_type_constraint
            || (matches!(data.source, ConstraintSource::Inherited)
                && self
                    .inherited_from(parameter)
                    .is_some_and(|base| self.has_primitive_type_constraint(base)))
    }

    /// 声明或继承的 object 约束
    pub fn has_object_type_constraint(
        &self,
        parameter: TemplateParamId,
    ) -> bool {
        let data = self.param(parameter);
        data.has_object_type_constraint
            || (matches!(data.source, ConstraintSource::Inherited)
                && self
                    .inherited_from(parameter)
                    .is_some_and(|base| self.has_object_type_constraint(base)))
    }

    /// 重写方法的模板参数对应的被重写方法参数（按序号）
    fn inherited_from(
        &self,
        parameter: TemplateParamId,
    ) -> Option<TemplateParamId> {
        let TemplateOwner::Method(method) = self.template_parameter_owner(parameter) else {
            return None;
        };
        let overridden = self.overridden_method(method)?;
        self.method_template_parameters(overridden)
            .get(self.template_parameter_ordinal(parameter))
            .copied()
    }

    fn constraint_input(
        &self,
        parameter: TemplateParamId,
    ) -> ConstraintInput {
        let data = self.param(parameter);
        match &data.source {
            ConstraintSource::Declared(cell) => ConstraintInput {
                types: cell.get().map(|c| c.types.clone()).unwrap_or_default(),
                inherited: false,
            },
            ConstraintSource::Substituted { original, map } => {
                let original_input = self.constraint_input(*original);
                let types = match map.get() {
                    Some(map) => map.substitute_constraint_types(self, &original_input.types),
                    None => original_input.types,
                };
                ConstraintInput {
                    types,
                    inherited: original_input.inherited,
                }
            }
            ConstraintSource::Inherited => ConstraintInput {
                types: self.inherited_constraint_types(parameter),
                inherited: true,
            },
            ConstraintSource::Unconstrained => ConstraintInput {
                types: Vec::new(),
                inherited: false,
            },
        }
    }

    /// 被重写方法对应参数的约束，换成本方法自己的参数
    fn inherited_constraint_types(
        &self,
        parameter: TemplateParamId,
    ) -> Vec<TypeWithAnnotations> {
        let TemplateOwner::Method(method) = self.template_parameter_owner(parameter) else {
            return Vec::new();
        };
        let Some(overridden) = self.overridden_method(method) else {
            return Vec::new();
        };
        let base_params = self.method_template_parameters(overridden);
        let own_params = self.method_template_parameters(method);
        let Some(base_param) = base_params.get(self.template_parameter_ordinal(parameter)) else {
            return Vec::new();
        };
        let arguments: Vec<TypeOrConstant> =
            own_params.iter().map(|p| TypeOrConstant::from(*p)).collect();
        let map = TemplateMap::new(&base_params, &arguments);
        map.substitute_constraint_types(self, &self.constraint_types(*base_param))
    }
}
