//! 构造与替换符号的工厂
//!
//! - `construct` / `construct_method`：用模板实参实例化未构造的声明
//! - `as_member`：把定义的成员重新绑定到已实例化的容器中
//!
//! 前置条件由调用方（绑定器）保证；违反时返回 [`SymbolError`]，
//! 只中止当前调用。

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use super::compilation::{
    Compilation, ConstructedNamedType, MethodData, MethodVariant, NamedTypeData, NamedTypeVariant,
    SubstitutedNamedType, ValueMemberData, ValueMemberVariant,
};
use super::error::{Result, SymbolError};
use super::ids::{FieldId, MethodId, NamedTypeId, PropertyId, SymbolId, TemplateOwner, TemplateParamId};
use super::substitute::TemplateMap;
use super::symbol::{
    SpecialType, TemplateParameterKind, TypeOrConstant, TypeSymbol, TypeWithAnnotations,
};

impl Compilation {
    /// 用模板实参实例化 `definition`
    ///
    /// 实参恰好是声明自身的模板参数时返回 `definition` 本身；
    /// 同一声明以相同实参（按句柄与可空标记）再次构造时返回已有的实例。
    pub fn construct(
        &self,
        definition: NamedTypeId,
        arguments: Vec<TypeOrConstant>,
    ) -> Result<NamedTypeId> {
        let data = self.named(definition);
        if matches!(data.variant, NamedTypeVariant::Constructed(_)) {
            return Err(SymbolError::NotADefinition {
                name: data.name.clone(),
            });
        }
        let params = self.template_parameters(definition);
        self.check_template_arguments(&data.name, &params, &arguments)?;
        Ok(self.construct_unchecked(definition, &data, &params, arguments))
    }

    fn check_template_arguments(
        &self,
        name: &str,
        params: &[TemplateParamId],
        arguments: &[TypeOrConstant],
    ) -> Result<()> {
        if params.is_empty() {
            return Err(SymbolError::NotGeneric {
                name: name.to_string(),
            });
        }
        if params.len() != arguments.len() {
            return Err(SymbolError::ArityMismatch {
                name: name.to_string(),
                expected: params.len(),
                found: arguments.len(),
            });
        }
        for (ordinal, (param, argument)) in params.iter().zip(arguments).enumerate() {
            let expects_type = self.template_parameter_kind(*param) == TemplateParameterKind::Type;
            if expects_type != argument.is_type() {
                return Err(SymbolError::TemplateArgumentKindMismatch {
                    name: name.to_string(),
                    ordinal,
                });
            }
        }
        Ok(())
    }

    fn is_identity_instantiation(
        params: &[TemplateParamId],
        arguments: &[TypeOrConstant],
    ) -> bool {
        params.iter().zip(arguments).all(|(param, argument)| {
            matches!(
                argument,
                TypeOrConstant::Type(TypeWithAnnotations {
                    ty: TypeSymbol::TemplateParameter(p),
                    is_nullable: false,
                }) if p == param
            )
        })
    }

    fn construct_unchecked(
        &self,
        definition: NamedTypeId,
        data: &NamedTypeData,
        params: &[TemplateParamId],
        arguments: Vec<TypeOrConstant>,
    ) -> NamedTypeId {
        if Self::is_identity_instantiation(params, &arguments) {
            return definition;
        }
        let mut cache = self.constructed_types.lock();
        let key = (definition, arguments);
        if let Some(existing) = cache.get(&key) {
            return *existing;
        }
        let original_definition = self.original_definition(definition);
        let container_map = data
            .containing_type
            .and_then(|container| self.template_substitution(container));
        let map = TemplateMap::with_container(
            container_map.as_deref(),
            &self.template_parameters(original_definition),
            &key.1,
        );
        let id = self.arena.write().push_type(NamedTypeData {
            name: data.name.clone(),
            type_kind: data.type_kind,
            special_type: data.special_type,
            assembly: data.assembly,
            accessibility: data.accessibility,
            containing_type: data.containing_type,
            span: data.span,
            variant: NamedTypeVariant::Constructed(ConstructedNamedType {
                constructed_from: definition,
                original_definition,
                template_arguments: key.1.clone(),
                map: Arc::new(map),
                base_type: OnceCell::new(),
                members: OnceCell::new(),
            }),
            overridden_or_hidden: OnceCell::new(),
        });
        cache.insert(key, id);
        debug!(name = %data.name, from = %definition, %id, "constructed type");
        id
    }

    /// `Nullable<T>`
    pub fn nullable_of(
        &self,
        underlying: impl Into<TypeWithAnnotations>,
    ) -> NamedTypeId {
        let definition = self.get_special_type(SpecialType::Nullable);
        let data = self.named(definition);
        let params = self.template_parameters(definition);
        self.construct_unchecked(
            definition,
            &data,
            &params,
            vec![TypeOrConstant::Type(underlying.into())],
        )
    }

    /// `Nullable<X>` 的 `X`；其他类型返回 `None`
    pub fn nullable_underlying_type(
        &self,
        ty: TypeSymbol,
    ) -> Option<TypeWithAnnotations> {
        let id = ty.as_named()?;
        if self.named(id).special_type != SpecialType::Nullable {
            return None;
        }
        match &self.named(id).variant {
            NamedTypeVariant::Constructed(c) => c.template_arguments.first()?.as_type(),
            _ => None,
        }
    }

    /// 用模板实参实例化泛型方法
    pub fn construct_method(
        &self,
        definition: MethodId,
        arguments: Vec<TypeOrConstant>,
    ) -> Result<MethodId> {
        let data = self.method(definition);
        if matches!(data.variant, MethodVariant::Constructed { .. }) {
            return Err(SymbolError::NotADefinition {
                name: data.common.name.clone(),
            });
        }
        let params = self.method_template_parameters(definition);
        self.check_template_arguments(&data.common.name, &params, &arguments)?;
        if Self::is_identity_instantiation(&params, &arguments) {
            return Ok(definition);
        }
        let mut cache = self.constructed_methods.lock();
        let key = (definition, arguments);
        if let Some(existing) = cache.get(&key) {
            return Ok(*existing);
        }
        let original_definition = self.method_original_definition(definition);
        let container_map = self.template_substitution(data.common.containing_type);
        let map = TemplateMap::with_container(
            container_map.as_deref(),
            &self.method_template_parameters(original_definition),
            &key.1,
        );
        let id = self.arena.write().push_method(MethodData {
            common: data.common.rebind(data.common.containing_type),
            variant: MethodVariant::Constructed {
                constructed_from: definition,
                original_definition,
                template_arguments: key.1.clone(),
                map: Arc::new(map),
            },
            signature: OnceCell::new(),
            canonical_signature: OnceCell::new(),
        });
        cache.insert(key, id);
        debug!(name = %data.common.name, from = %definition, %id, "constructed method");
        Ok(id)
    }

    /// 把成员重新绑定到 `new_owner`
    ///
    /// `new_owner` 是未实例化的定义时原样返回；
    /// 否则创建经 `new_owner` 映射替换的成员，泛型成员的模板参数会被重命名。
    pub fn as_member(
        &self,
        member: SymbolId,
        new_owner: NamedTypeId,
    ) -> SymbolId {
        let Some(map) = self.template_substitution(new_owner) else {
            return member;
        };
        match member {
            SymbolId::NamedType(nested) => {
                SymbolId::NamedType(self.substituted_nested_type(nested, new_owner, &map))
            }
            SymbolId::Method(method) => {
                SymbolId::Method(self.substituted_method(method, new_owner, &map))
            }
            SymbolId::Field(field) => {
                let data = self.field(field);
                let substituted = self.substituted_value_member(&data, member, new_owner, &map);
                let mut arena = self.arena.write();
                let id = FieldId::from_index(arena.fields.len());
                arena.fields.push(Arc::new(substituted));
                SymbolId::Field(id)
            }
            SymbolId::Property(property) => {
                let data = self.property(property);
                let substituted = self.substituted_value_member(&data, member, new_owner, &map);
                let mut arena = self.arena.write();
                let id = PropertyId::from_index(arena.properties.len());
                arena.properties.push(Arc::new(substituted));
                SymbolId::Property(id)
            }
        }
    }

    fn substituted_value_member(
        &self,
        data: &ValueMemberData,
        member: SymbolId,
        new_owner: NamedTypeId,
        map: &Arc<TemplateMap>,
    ) -> ValueMemberData {
        ValueMemberData {
            common: data.common.rebind(new_owner),
            variant: ValueMemberVariant::Substituted {
                original_definition: self.member_original_definition(member),
                map: map.clone(),
                ty: OnceCell::new(),
            },
        }
    }

    fn substituted_nested_type(
        &self,
        nested: NamedTypeId,
        new_owner: NamedTypeId,
        map: &Arc<TemplateMap>,
    ) -> NamedTypeId {
        let data = self.named(nested);
        let original_definition = self.original_definition(nested);
        let old_params = self.template_parameters(nested);
        let id = {
            let mut arena = self.arena.write();
            let id = arena.next_type_id();
            let (renamed, template_parameters) =
                map.alpha_rename_in(&mut arena, &old_params, TemplateOwner::Type(id));
            let map = if template_parameters.is_empty() {
                map.clone()
            } else {
                Arc::new(renamed)
            };
            arena.push_type(NamedTypeData {
                name: data.name.clone(),
                type_kind: data.type_kind,
                special_type: data.special_type,
                assembly: data.assembly,
                accessibility: data.accessibility,
                containing_type: Some(new_owner),
                span: data.span,
                variant: NamedTypeVariant::Substituted(SubstitutedNamedType {
                    original_definition,
                    template_parameters,
                    map,
                    base_type: OnceCell::new(),
                    members: OnceCell::new(),
                }),
                overridden_or_hidden: OnceCell::new(),
            })
        };
        debug!(name = %data.name, owner = %new_owner, %id, "substituted nested type");
        id
    }

    fn substituted_method(
        &self,
        method: MethodId,
        new_owner: NamedTypeId,
        map: &Arc<TemplateMap>,
    ) -> MethodId {
        let data = self.method(method);
        let original_definition = self.method_original_definition(method);
        let old_params = self.method_template_parameters(method);
        let mut arena = self.arena.write();
        let id = arena.next_method_id();
        let (renamed, template_parameters) =
            map.alpha_rename_in(&mut arena, &old_params, TemplateOwner::Method(id));
        let map = if template_parameters.is_empty() {
            map.clone()
        } else {
            Arc::new(renamed)
        };
        arena.push_method(MethodData {
            common: data.common.rebind(new_owner),
            variant: MethodVariant::Substituted {
                original_definition,
                template_parameters,
                map,
            },
            signature: OnceCell::new(),
            canonical_signature: OnceCell::new(),
        })
    }

    /// 构造/替换类型的成员：定义的每个成员经 `as_member` 重新绑定
    pub(crate) fn instantiate_members(
        &self,
        original_definition: NamedTypeId,
        owner: NamedTypeId,
    ) -> Vec<SymbolId> {
        let members: Vec<SymbolId> = self
            .members(original_definition)
            .into_iter()
            .map(|member| self.as_member(member, owner))
            .collect();
        debug!(%owner, count = members.len(), "instantiated members");
        members
    }
}
