//! 编译单元与符号存储
//!
//! 所有符号都分配在 [`SymbolArena`] 中并通过索引引用：
//! - 源定义：绑定器通过 `declare_*` 系列方法创建
//! - 构造/替换变体：由 [`construct`](super::construct) 与
//!   [`substitute`](super::substitute) 按需创建
//!
//! 符号创建后不再修改。需要延迟计算的字段（约束边界、构造类型的成员、
//! 替换后的签名、重写/隐藏结果）统一使用 `OnceCell`，保证并发绑定时
//! 每个符号只会缓存一个结果。
//!
//! # 锁约定
//!
//! arena 的读锁只用于克隆出 `Arc`，持锁期间不调用任何可能分配符号的方法。

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use super::error::{Result, SymbolError};
use super::ids::{
    ArrayTypeId, AssemblyId, FieldId, MethodId, NamedTypeId, PropertyId, SymbolId, SymbolKind,
    TemplateOwner, TemplateParamId,
};
use super::substitute::TemplateMap;
use super::symbol::{
    Accessibility, BoundExpression, MemberModifiers, MethodSignature, SpecialType,
    TemplateParameterKind, TypeKind, TypeOrConstant, TypeSymbol, TypeWithAnnotations,
};
use crate::frontend::typecheck::bounds::TypeParameterBounds;
use crate::frontend::typecheck::overrides::OverriddenOrHiddenMembersResult;
use crate::util::config::EngineConfig;
use crate::util::diagnostic::{Diagnostic, DiagnosticBag};
use crate::util::span::Span;

// ============================================================================
// 符号数据
// ============================================================================

/// 模板参数
#[derive(Debug)]
pub struct TemplateParamData {
    pub(crate) name: String,
    pub(crate) ordinal: usize,
    pub(crate) owner: TemplateOwner,
    pub(crate) kind: TemplateParameterKind,
    pub(crate) has_primitive_type_constraint: bool,
    pub(crate) has_object_type_constraint: bool,
    pub(crate) span: Span,
    pub(crate) source: ConstraintSource,
    /// 未初始化 = 尚未解析；`Some(None)` = 已解析且没有需要记录的边界
    pub(crate) bounds: OnceCell<Option<Arc<TypeParameterBounds>>>,
}

/// 约束类型的来源
#[derive(Debug)]
pub(crate) enum ConstraintSource {
    /// 源码中声明的约束子句
    Declared(OnceCell<DeclaredConstraints>),
    /// 替换/重命名产生的参数，约束来自原参数经映射替换
    Substituted {
        original: TemplateParamId,
        map: OnceCell<Arc<TemplateMap>>,
    },
    /// 重写方法的参数，约束继承自被重写方法
    Inherited,
    /// 规范化参数，没有约束
    Unconstrained,
}

impl ConstraintSource {
    fn describe(&self) -> &'static str {
        match self {
            ConstraintSource::Declared(_) => "declared",
            ConstraintSource::Substituted { .. } => "substituted",
            ConstraintSource::Inherited => "inherited",
            ConstraintSource::Unconstrained => "canonical",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DeclaredConstraints {
    pub(crate) types: Vec<TypeWithAnnotations>,
    pub(crate) expressions: Vec<BoundExpression>,
}

/// 命名类型
#[derive(Debug)]
pub struct NamedTypeData {
    pub(crate) name: String,
    pub(crate) type_kind: TypeKind,
    pub(crate) special_type: SpecialType,
    pub(crate) assembly: AssemblyId,
    pub(crate) accessibility: Accessibility,
    pub(crate) containing_type: Option<NamedTypeId>,
    pub(crate) span: Span,
    pub(crate) variant: NamedTypeVariant,
    pub(crate) overridden_or_hidden: OnceCell<Arc<OverriddenOrHiddenMembersResult>>,
}

/// 命名类型的生命周期状态
#[derive(Debug)]
pub(crate) enum NamedTypeVariant {
    /// 源定义（错误类型也是定义，`type_kind == Error`）
    Definition(NamedTypeDefinition),
    /// 已实例化容器中的嵌套类型
    Substituted(SubstitutedNamedType),
    /// 用模板实参构造的实例
    Constructed(ConstructedNamedType),
}

#[derive(Debug)]
pub(crate) struct NamedTypeDefinition {
    pub(crate) template_parameters: Vec<TemplateParamId>,
    pub(crate) base_type: OnceCell<Option<NamedTypeId>>,
    pub(crate) members: RwLock<Vec<SymbolId>>,
}

#[derive(Debug)]
pub(crate) struct SubstitutedNamedType {
    pub(crate) original_definition: NamedTypeId,
    pub(crate) template_parameters: Vec<TemplateParamId>,
    pub(crate) map: Arc<TemplateMap>,
    pub(crate) base_type: OnceCell<Option<NamedTypeId>>,
    pub(crate) members: OnceCell<Vec<SymbolId>>,
}

#[derive(Debug)]
pub(crate) struct ConstructedNamedType {
    pub(crate) constructed_from: NamedTypeId,
    pub(crate) original_definition: NamedTypeId,
    pub(crate) template_arguments: Vec<TypeOrConstant>,
    pub(crate) map: Arc<TemplateMap>,
    pub(crate) base_type: OnceCell<Option<NamedTypeId>>,
    pub(crate) members: OnceCell<Vec<SymbolId>>,
}

/// 数组类型
#[derive(Debug, Clone)]
pub struct ArrayTypeData {
    pub(crate) element: TypeWithAnnotations,
    pub(crate) rank: usize,
    pub(crate) is_sz: bool,
    pub(crate) sizes: Vec<usize>,
    pub(crate) lower_bounds: Option<Vec<i64>>,
}

/// 成员公共部分
#[derive(Debug)]
pub(crate) struct MemberCommon {
    pub(crate) name: String,
    pub(crate) containing_type: NamedTypeId,
    pub(crate) modifiers: MemberModifiers,
    pub(crate) accessibility: Accessibility,
    pub(crate) span: Span,
    pub(crate) overridden_or_hidden: OnceCell<Arc<OverriddenOrHiddenMembersResult>>,
}

impl MemberCommon {
    pub(crate) fn rebind(
        &self,
        containing_type: NamedTypeId,
    ) -> MemberCommon {
        MemberCommon {
            name: self.name.clone(),
            containing_type,
            modifiers: self.modifiers,
            accessibility: self.accessibility,
            span: self.span,
            overridden_or_hidden: OnceCell::new(),
        }
    }
}

/// 方法
#[derive(Debug)]
pub struct MethodData {
    pub(crate) common: MemberCommon,
    pub(crate) variant: MethodVariant,
    pub(crate) signature: OnceCell<Arc<MethodSignature>>,
    /// 模板参数换成规范参数后的签名，签名比较使用
    pub(crate) canonical_signature: OnceCell<Arc<MethodSignature>>,
}

#[derive(Debug)]
pub(crate) enum MethodVariant {
    Definition {
        template_parameters: Vec<TemplateParamId>,
    },
    /// 已实例化容器中的方法
    Substituted {
        original_definition: MethodId,
        template_parameters: Vec<TemplateParamId>,
        map: Arc<TemplateMap>,
    },
    /// 用模板实参构造的泛型方法实例
    Constructed {
        constructed_from: MethodId,
        original_definition: MethodId,
        template_arguments: Vec<TypeOrConstant>,
        map: Arc<TemplateMap>,
    },
}

/// 字段与属性
#[derive(Debug)]
pub struct ValueMemberData {
    pub(crate) common: MemberCommon,
    pub(crate) variant: ValueMemberVariant,
}

#[derive(Debug)]
pub(crate) enum ValueMemberVariant {
    Definition {
        ty: TypeWithAnnotations,
    },
    Substituted {
        original_definition: SymbolId,
        map: Arc<TemplateMap>,
        ty: OnceCell<TypeWithAnnotations>,
    },
}

/// 符号存储
#[derive(Debug, Default)]
pub struct SymbolArena {
    pub(crate) types: Vec<Arc<NamedTypeData>>,
    pub(crate) arrays: Vec<Arc<ArrayTypeData>>,
    pub(crate) params: Vec<Arc<TemplateParamData>>,
    pub(crate) methods: Vec<Arc<MethodData>>,
    pub(crate) fields: Vec<Arc<ValueMemberData>>,
    pub(crate) properties: Vec<Arc<ValueMemberData>>,
    pub(crate) assemblies: Vec<String>,
}

impl SymbolArena {
    pub(crate) fn next_type_id(&self) -> NamedTypeId {
        NamedTypeId::from_index(self.types.len())
    }

    pub(crate) fn next_method_id(&self) -> MethodId {
        MethodId::from_index(self.methods.len())
    }

    pub(crate) fn push_type(
        &mut self,
        data: NamedTypeData,
    ) -> NamedTypeId {
        let id = self.next_type_id();
        self.types.push(Arc::new(data));
        id
    }

    pub(crate) fn push_method(
        &mut self,
        data: MethodData,
    ) -> MethodId {
        let id = self.next_method_id();
        self.methods.push(Arc::new(data));
        id
    }

    pub(crate) fn push_param(
        &mut self,
        data: TemplateParamData,
    ) -> TemplateParamId {
        let id = TemplateParamId::from_index(self.params.len());
        self.params.push(Arc::new(data));
        id
    }

    pub(crate) fn push_array(
        &mut self,
        data: ArrayTypeData,
    ) -> ArrayTypeId {
        let id = ArrayTypeId::from_index(self.arrays.len());
        self.arrays.push(Arc::new(data));
        id
    }

    /// 为 `owner` 分配一组源模板参数
    fn declare_params(
        &mut self,
        owner: TemplateOwner,
        declarations: &[TemplateParameterDeclaration],
        inherited: bool,
    ) -> Vec<TemplateParamId> {
        declarations
            .iter()
            .enumerate()
            .map(|(ordinal, decl)| {
                self.push_param(TemplateParamData {
                    name: decl.name.clone(),
                    ordinal,
                    owner,
                    kind: decl.kind,
                    has_primitive_type_constraint: decl.has_primitive_type_constraint,
                    has_object_type_constraint: decl.has_object_type_constraint,
                    span: decl.span,
                    source: if inherited {
                        ConstraintSource::Inherited
                    } else {
                        ConstraintSource::Declared(OnceCell::new())
                    },
                    bounds: OnceCell::new(),
                })
            })
            .collect()
    }
}

// ============================================================================
// 声明描述
// ============================================================================

/// 模板参数声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameterDeclaration {
    pub name: String,
    pub kind: TemplateParameterKind,
    pub has_primitive_type_constraint: bool,
    pub has_object_type_constraint: bool,
    pub span: Span,
}

impl TemplateParameterDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TemplateParameterKind::Type,
            has_primitive_type_constraint: false,
            has_object_type_constraint: false,
            span: Span::dummy(),
        }
    }

    /// `where T: primitive`
    pub fn primitive(mut self) -> Self {
        self.has_primitive_type_constraint = true;
        self
    }

    /// `where T: object`
    pub fn object(mut self) -> Self {
        self.has_object_type_constraint = true;
        self
    }

    /// 非类型参数
    pub fn constant(mut self) -> Self {
        self.kind = TemplateParameterKind::Constant;
        self
    }

    pub fn at(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }
}

impl From<&str> for TemplateParameterDeclaration {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 命名类型声明
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: TypeKind,
    pub special_type: SpecialType,
    pub containing_type: Option<NamedTypeId>,
    pub template_parameters: Vec<TemplateParameterDeclaration>,
    pub accessibility: Accessibility,
    pub assembly: AssemblyId,
    pub span: Span,
}

impl TypeDeclaration {
    pub fn new(
        name: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            special_type: SpecialType::None,
            containing_type: None,
            template_parameters: Vec::new(),
            accessibility: Accessibility::Public,
            assembly: AssemblyId::SOURCE,
            span: Span::dummy(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    pub fn with_template_parameters<I, P>(
        mut self,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TemplateParameterDeclaration>,
    {
        self.template_parameters = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn nested_in(
        mut self,
        container: NamedTypeId,
    ) -> Self {
        self.containing_type = Some(container);
        self
    }

    pub fn in_assembly(
        mut self,
        assembly: AssemblyId,
    ) -> Self {
        self.assembly = assembly;
        self
    }

    pub fn with_accessibility(
        mut self,
        accessibility: Accessibility,
    ) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_special_type(
        mut self,
        special_type: SpecialType,
    ) -> Self {
        self.special_type = special_type;
        self
    }

    pub fn at(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }
}

/// 方法声明
#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub name: String,
    pub template_parameters: Vec<TemplateParameterDeclaration>,
    pub modifiers: MemberModifiers,
    pub accessibility: Accessibility,
    pub span: Span,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_parameters: Vec::new(),
            modifiers: MemberModifiers::NONE,
            accessibility: Accessibility::Public,
            span: Span::dummy(),
        }
    }

    pub fn with_template_parameters<I, P>(
        mut self,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TemplateParameterDeclaration>,
    {
        self.template_parameters = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_modifiers(
        mut self,
        modifiers: MemberModifiers,
    ) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_accessibility(
        mut self,
        accessibility: Accessibility,
    ) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn at(
        mut self,
        span: Span,
    ) -> Self {
        self.span = span;
        self
    }
}

/// 字段/属性声明
#[derive(Debug, Clone)]
pub struct ValueMemberDeclaration {
    pub name: String,
    pub ty: TypeWithAnnotations,
    pub modifiers: MemberModifiers,
    pub accessibility: Accessibility,
    pub span: Span,
}

impl ValueMemberDeclaration {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<TypeWithAnnotations>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            modifiers: MemberModifiers::NONE,
            accessibility: Accessibility::Public,
            span: Span::dummy(),
        }
    }

    pub fn with_modifiers(
        mut self,
        modifiers: MemberModifiers,
    ) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_accessibility(
        mut self,
        accessibility: Accessibility,
    ) -> Self {
        self.accessibility = accessibility;
        self
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// 实例化缓存的键：被构造的声明与逐个实参
pub(crate) type InstantiationKey<Id> = (Id, Vec<TypeOrConstant>);

/// 编译单元的符号表
///
/// `Compilation` 是 `Send + Sync` 的，多个声明可以并发绑定。
#[derive(Debug)]
pub struct Compilation {
    pub(crate) arena: RwLock<SymbolArena>,
    special_types: IndexMap<SpecialType, NamedTypeId>,
    indexed_parameters: Mutex<Vec<TemplateParamId>>,
    /// 相同实参的构造共享同一个符号
    pub(crate) constructed_types: Mutex<HashMap<InstantiationKey<NamedTypeId>, NamedTypeId>>,
    pub(crate) constructed_methods: Mutex<HashMap<InstantiationKey<MethodId>, MethodId>>,
    diagnostics: Mutex<DiagnosticBag>,
    config: EngineConfig,
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new()
    }
}

impl Compilation {
    /// 创建带核心库的编译单元
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut compilation = Self {
            arena: RwLock::new(SymbolArena {
                assemblies: vec!["<source>".to_string(), "corlib".to_string()],
                ..SymbolArena::default()
            }),
            special_types: IndexMap::new(),
            indexed_parameters: Mutex::new(Vec::new()),
            constructed_types: Mutex::new(HashMap::new()),
            constructed_methods: Mutex::new(HashMap::new()),
            diagnostics: Mutex::new(DiagnosticBag::new()),
            config,
        };
        compilation.seed_core_library();
        compilation
    }

    fn seed_core_library(&mut self) {
        for special in SpecialType::ALL {
            let (name, kind, params): (&str, TypeKind, Vec<TemplateParameterDeclaration>) =
                match special {
                    SpecialType::Object => ("Object", TypeKind::Class, vec![]),
                    SpecialType::ValueType => ("ValueType", TypeKind::Class, vec![]),
                    SpecialType::Array => ("Array", TypeKind::Class, vec![]),
                    SpecialType::String => ("String", TypeKind::Class, vec![]),
                    SpecialType::Void => ("Void", TypeKind::Struct, vec![]),
                    SpecialType::Nullable => (
                        "Nullable",
                        TypeKind::Struct,
                        vec![TemplateParameterDeclaration::new("T").primitive()],
                    ),
                    SpecialType::Boolean => ("Boolean", TypeKind::Primitive, vec![]),
                    SpecialType::Int32 => ("Int32", TypeKind::Primitive, vec![]),
                    SpecialType::Int64 => ("Int64", TypeKind::Primitive, vec![]),
                    SpecialType::Double => ("Double", TypeKind::Primitive, vec![]),
                    SpecialType::None => continue,
                };
            let declaration = TypeDeclaration::new(name, kind)
                .with_special_type(special)
                .with_template_parameters(params)
                .in_assembly(AssemblyId::CORLIB);
            let id = self.allocate_definition(&declaration);
            self.special_types.insert(special, id);
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // arena 访问
    // ------------------------------------------------------------------

    pub(crate) fn named(
        &self,
        id: NamedTypeId,
    ) -> Arc<NamedTypeData> {
        self.arena.read().types[id.index()].clone()
    }

    pub(crate) fn array(
        &self,
        id: ArrayTypeId,
    ) -> Arc<ArrayTypeData> {
        self.arena.read().arrays[id.index()].clone()
    }

    pub(crate) fn param(
        &self,
        id: TemplateParamId,
    ) -> Arc<TemplateParamData> {
        self.arena.read().params[id.index()].clone()
    }

    pub(crate) fn method(
        &self,
        id: MethodId,
    ) -> Arc<MethodData> {
        self.arena.read().methods[id.index()].clone()
    }

    pub(crate) fn field(
        &self,
        id: FieldId,
    ) -> Arc<ValueMemberData> {
        self.arena.read().fields[id.index()].clone()
    }

    pub(crate) fn property(
        &self,
        id: PropertyId,
    ) -> Arc<ValueMemberData> {
        self.arena.read().properties[id.index()].clone()
    }

    pub(crate) fn value_member(
        &self,
        id: SymbolId,
    ) -> Option<Arc<ValueMemberData>> {
        match id {
            SymbolId::Field(f) => Some(self.field(f)),
            SymbolId::Property(p) => Some(self.property(p)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // 程序集
    // ------------------------------------------------------------------

    /// 注册一个引用的程序集
    pub fn add_reference(
        &self,
        name: impl Into<String>,
    ) -> AssemblyId {
        let mut arena = self.arena.write();
        let id = AssemblyId(arena.assemblies.len() as u32);
        arena.assemblies.push(name.into());
        id
    }

    pub fn assembly_name(
        &self,
        assembly: AssemblyId,
    ) -> Option<String> {
        self.arena.read().assemblies.get(assembly.0 as usize).cloned()
    }

    /// 在引用的程序集中按名称和元数查找顶层类型
    ///
    /// 找不到或有多个候选都是致命错误：说明更早的编译阶段接受了无效输入。
    pub fn resolve_referenced_type(
        &self,
        name: &str,
        arity: usize,
    ) -> Result<NamedTypeId> {
        let candidates: Vec<(NamedTypeId, AssemblyId)> = {
            let arena = self.arena.read();
            arena
                .types
                .iter()
                .enumerate()
                .filter(|(_, data)| {
                    !data.assembly.is_source()
                        && data.containing_type.is_none()
                        && data.name == name
                        && data.type_kind != TypeKind::Error
                        && matches!(&data.variant, NamedTypeVariant::Definition(def) if def.template_parameters.len() == arity)
                })
                .map(|(index, data)| (NamedTypeId::from_index(index), data.assembly))
                .collect()
        };
        match candidates.as_slice() {
            [(id, _)] => Ok(*id),
            [] => {
                error!(name, arity, "referenced type not found");
                Err(SymbolError::MissingReferencedSymbol {
                    name: name.to_string(),
                    arity,
                })
            }
            _ => {
                error!(name, arity, count = candidates.len(), "referenced type is ambiguous");
                Err(SymbolError::AmbiguousReferencedSymbol {
                    name: name.to_string(),
                    arity,
                    candidates: candidates.iter().map(|(_, a)| *a).collect(),
                })
            }
        }
    }

    /// 在引用类型中按名称和元数查找方法
    pub fn resolve_referenced_method(
        &self,
        container: NamedTypeId,
        name: &str,
        arity: usize,
    ) -> Result<MethodId> {
        let candidates: Vec<MethodId> = self
            .members_named(container, name)
            .into_iter()
            .filter_map(SymbolId::as_method)
            .filter(|m| self.method_arity(*m) == arity)
            .collect();
        match candidates.as_slice() {
            [m] => Ok(*m),
            [] => {
                error!(name, arity, "referenced method not found");
                Err(SymbolError::MissingReferencedSymbol {
                    name: name.to_string(),
                    arity,
                })
            }
            _ => {
                error!(name, arity, count = candidates.len(), "referenced method is ambiguous");
                let assembly = self.named(container).assembly;
                Err(SymbolError::AmbiguousReferencedSymbol {
                    name: name.to_string(),
                    arity,
                    candidates: vec![assembly; candidates.len()],
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // 声明
    // ------------------------------------------------------------------

    fn allocate_definition(
        &self,
        declaration: &TypeDeclaration,
    ) -> NamedTypeId {
        let mut arena = self.arena.write();
        let id = arena.next_type_id();
        let template_parameters = arena.declare_params(
            TemplateOwner::Type(id),
            &declaration.template_parameters,
            false,
        );
        arena.push_type(NamedTypeData {
            name: declaration.name.clone(),
            type_kind: declaration.kind,
            special_type: declaration.special_type,
            assembly: declaration.assembly,
            accessibility: declaration.accessibility,
            containing_type: declaration.containing_type,
            span: declaration.span,
            variant: NamedTypeVariant::Definition(NamedTypeDefinition {
                template_parameters,
                base_type: OnceCell::new(),
                members: RwLock::new(Vec::new()),
            }),
            overridden_or_hidden: OnceCell::new(),
        })
    }

    /// 声明命名类型（嵌套类型会加入容器的成员列表）
    pub fn declare_type(
        &self,
        declaration: TypeDeclaration,
    ) -> Result<NamedTypeId> {
        if matches!(
            declaration.kind,
            TypeKind::Array | TypeKind::TemplateParameter
        ) {
            return Err(SymbolError::InvalidTypeKind {
                name: declaration.name,
            });
        }
        let container = match declaration.containing_type {
            Some(container) => Some(self.definition_members_of(container)?),
            None => None,
        };
        let id = self.allocate_definition(&declaration);
        if let Some(container) = container {
            Self::push_member(&container, SymbolId::NamedType(id));
        }
        debug!(name = %declaration.name, %id, "declared type");
        Ok(id)
    }

    /// 创建错误类型（无法解析或有歧义的名称）
    pub fn error_type(
        &self,
        name: impl Into<String>,
        arity: usize,
    ) -> NamedTypeId {
        let params = (0..arity)
            .map(|i| TemplateParameterDeclaration::new(format!("T{}", i)))
            .collect::<Vec<_>>();
        let declaration = TypeDeclaration::new(name, TypeKind::Error).with_template_parameters(params);
        self.allocate_definition(&declaration)
    }

    fn definition_members_of(
        &self,
        container: NamedTypeId,
    ) -> Result<Arc<NamedTypeData>> {
        let data = self.named(container);
        match &data.variant {
            NamedTypeVariant::Definition(_) => Ok(data),
            _ => Err(SymbolError::InvalidContainingType(container)),
        }
    }

    fn push_member(
        data: &NamedTypeData,
        member: SymbolId,
    ) {
        if let NamedTypeVariant::Definition(def) = &data.variant {
            def.members.write().push(member);
        }
    }

    /// 设置基类型（一次性写入，拒绝形成环）
    pub fn set_base_type(
        &self,
        ty: NamedTypeId,
        base: NamedTypeId,
    ) -> Result<()> {
        let data = self.named(ty);
        let NamedTypeVariant::Definition(def) = &data.variant else {
            return Err(SymbolError::NotADefinition {
                name: data.name.clone(),
            });
        };
        let mut current = Some(base);
        while let Some(t) = current {
            if self.original_definition(t) == ty {
                return Err(SymbolError::CyclicBaseType {
                    name: data.name.clone(),
                });
            }
            current = self.base_type(t);
        }
        def.base_type
            .set(Some(base))
            .map_err(|_| SymbolError::AlreadyInitialized {
                what: "base type",
                name: data.name.clone(),
            })
    }

    /// 设置模板参数的约束子句（一次性写入）
    pub fn set_constraints(
        &self,
        parameter: TemplateParamId,
        constraint_types: Vec<TypeWithAnnotations>,
        constraint_expressions: Vec<BoundExpression>,
    ) -> Result<()> {
        let data = self.param(parameter);
        let cell = match &data.source {
            ConstraintSource::Declared(cell) => cell,
            other => {
                return Err(SymbolError::ConstraintsNotDeclarable {
                    name: data.name.clone(),
                    source_kind: other.describe(),
                })
            }
        };
        cell.set(DeclaredConstraints {
            types: constraint_types,
            expressions: constraint_expressions,
        })
        .map_err(|_| SymbolError::AlreadyInitialized {
            what: "constraints",
            name: data.name.clone(),
        })
    }

    /// 声明方法
    ///
    /// 泛型重写方法的模板参数不声明约束，而是继承被重写方法的约束。
    pub fn declare_method(
        &self,
        containing_type: NamedTypeId,
        declaration: MethodDeclaration,
    ) -> Result<MethodId> {
        let container = self.definition_members_of(containing_type)?;
        let id = {
            let mut arena = self.arena.write();
            let id = arena.next_method_id();
            let template_parameters = arena.declare_params(
                TemplateOwner::Method(id),
                &declaration.template_parameters,
                declaration.modifiers.is_override,
            );
            arena.push_method(MethodData {
                common: MemberCommon {
                    name: declaration.name.clone(),
                    containing_type,
                    modifiers: declaration.modifiers,
                    accessibility: declaration.accessibility,
                    span: declaration.span,
                    overridden_or_hidden: OnceCell::new(),
                },
                variant: MethodVariant::Definition {
                    template_parameters,
                },
                signature: OnceCell::new(),
                canonical_signature: OnceCell::new(),
            })
        };
        Self::push_member(&container, SymbolId::Method(id));
        Ok(id)
    }

    /// 设置方法签名（一次性写入）
    pub fn set_method_signature(
        &self,
        method: MethodId,
        signature: MethodSignature,
    ) -> Result<()> {
        let data = self.method(method);
        if !matches!(data.variant, MethodVariant::Definition { .. }) {
            return Err(SymbolError::NotADefinition {
                name: data.common.name.clone(),
            });
        }
        data.signature
            .set(Arc::new(signature))
            .map_err(|_| SymbolError::AlreadyInitialized {
                what: "signature",
                name: data.common.name.clone(),
            })
    }

    fn value_member_definition(
        containing_type: NamedTypeId,
        declaration: ValueMemberDeclaration,
    ) -> ValueMemberData {
        ValueMemberData {
            common: MemberCommon {
                name: declaration.name,
                containing_type,
                modifiers: declaration.modifiers,
                accessibility: declaration.accessibility,
                span: declaration.span,
                overridden_or_hidden: OnceCell::new(),
            },
            variant: ValueMemberVariant::Definition { ty: declaration.ty },
        }
    }

    pub fn declare_field(
        &self,
        containing_type: NamedTypeId,
        declaration: ValueMemberDeclaration,
    ) -> Result<FieldId> {
        let container = self.definition_members_of(containing_type)?;
        let id = {
            let mut arena = self.arena.write();
            let id = FieldId::from_index(arena.fields.len());
            arena
                .fields
                .push(Arc::new(Self::value_member_definition(containing_type, declaration)));
            id
        };
        Self::push_member(&container, SymbolId::Field(id));
        Ok(id)
    }

    pub fn declare_property(
        &self,
        containing_type: NamedTypeId,
        declaration: ValueMemberDeclaration,
    ) -> Result<PropertyId> {
        let container = self.definition_members_of(containing_type)?;
        let id = {
            let mut arena = self.arena.write();
            let id = PropertyId::from_index(arena.properties.len());
            arena
                .properties
                .push(Arc::new(Self::value_member_definition(containing_type, declaration)));
            id
        };
        Self::push_member(&container, SymbolId::Property(id));
        Ok(id)
    }

    /// 一维零下界数组 `T[]`
    pub fn sz_array_type(
        &self,
        element: impl Into<TypeWithAnnotations>,
    ) -> ArrayTypeId {
        self.arena.write().push_array(ArrayTypeData {
            element: element.into(),
            rank: 1,
            is_sz: true,
            sizes: Vec::new(),
            lower_bounds: None,
        })
    }

    /// 多维数组 `T[,]`
    pub fn array_type(
        &self,
        element: impl Into<TypeWithAnnotations>,
        rank: usize,
    ) -> ArrayTypeId {
        self.array_type_with_bounds(element, rank, Vec::new(), None)
    }

    /// 带尺寸和下界的多维数组
    pub fn array_type_with_bounds(
        &self,
        element: impl Into<TypeWithAnnotations>,
        rank: usize,
        sizes: Vec<usize>,
        lower_bounds: Option<Vec<i64>>,
    ) -> ArrayTypeId {
        self.arena.write().push_array(ArrayTypeData {
            element: element.into(),
            rank: rank.max(1),
            is_sz: false,
            sizes,
            lower_bounds,
        })
    }

    pub(crate) fn allocate_array_like(
        &self,
        template: &ArrayTypeData,
        element: TypeWithAnnotations,
    ) -> ArrayTypeId {
        self.arena.write().push_array(ArrayTypeData {
            element,
            ..template.clone()
        })
    }

    /// 结束声明阶段；按配置急切解析全部模板参数的边界
    pub fn finish_declarations(&self) {
        if !self.config.symbols.eager_constraint_resolution {
            return;
        }
        let count = self.arena.read().params.len();
        debug!(count, "resolving template parameter bounds eagerly");
        for index in 0..count {
            let parameter = TemplateParamId::from_index(index);
            if self.param(parameter).owner != TemplateOwner::Indexed {
                self.template_parameter_bounds(parameter);
            }
        }
    }

    // ------------------------------------------------------------------
    // 声明诊断
    // ------------------------------------------------------------------

    pub(crate) fn report(
        &self,
        diagnostics: DiagnosticBag,
    ) {
        if !diagnostics.is_empty() {
            self.diagnostics.lock().extend(diagnostics);
        }
    }

    /// 延迟解析过程中累积的诊断
    pub fn declaration_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().iter().cloned().collect()
    }

    pub fn take_declaration_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().drain()
    }

    // ------------------------------------------------------------------
    // 类型查询
    // ------------------------------------------------------------------

    /// 核心库中的特殊类型
    ///
    /// # Panics
    ///
    /// `special` 为 [`SpecialType::None`] 时 panic：它不对应任何核心库类型。
    /// 不确定时使用 [`try_special_type`](Self::try_special_type)。
    pub fn get_special_type(
        &self,
        special: SpecialType,
    ) -> NamedTypeId {
        match self.try_special_type(special) {
            Some(id) => id,
            None => panic!("{:?} is not a core library type", special),
        }
    }

    /// `SpecialType::None` 返回 `None`
    pub fn try_special_type(
        &self,
        special: SpecialType,
    ) -> Option<NamedTypeId> {
        self.special_types.get(&special).copied()
    }

    pub fn object_type(&self) -> NamedTypeId {
        self.get_special_type(SpecialType::Object)
    }

    pub fn type_kind(
        &self,
        ty: TypeSymbol,
    ) -> TypeKind {
        match ty {
            TypeSymbol::Named(id) => self.named(id).type_kind,
            TypeSymbol::Array(_) => TypeKind::Array,
            TypeSymbol::TemplateParameter(_) => TypeKind::TemplateParameter,
        }
    }

    pub fn special_type(
        &self,
        ty: TypeSymbol,
    ) -> SpecialType {
        match ty {
            TypeSymbol::Named(id) => self.named(id).special_type,
            _ => SpecialType::None,
        }
    }

    pub fn is_error_type(
        &self,
        ty: TypeSymbol,
    ) -> bool {
        self.type_kind(ty) == TypeKind::Error
    }

    /// 简单名称（不含模板实参）
    pub fn type_name(
        &self,
        ty: TypeSymbol,
    ) -> String {
        match ty {
            TypeSymbol::Named(id) => self.named(id).name.clone(),
            TypeSymbol::TemplateParameter(id) => self.param(id).name.clone(),
            TypeSymbol::Array(id) => {
                let data = self.array(id);
                let commas = ",".repeat(data.rank.saturating_sub(1));
                let star = if !data.is_sz && data.rank == 1 { "*" } else { "" };
                format!("{}[{}{}]", self.type_name(data.element.ty), star, commas)
            }
        }
    }

    pub fn containing_type(
        &self,
        id: NamedTypeId,
    ) -> Option<NamedTypeId> {
        self.named(id).containing_type
    }

    pub fn assembly(
        &self,
        id: NamedTypeId,
    ) -> AssemblyId {
        self.named(id).assembly
    }

    /// 是否为未构造的源定义（`original_definition == self`）
    pub fn is_definition(
        &self,
        id: NamedTypeId,
    ) -> bool {
        matches!(self.named(id).variant, NamedTypeVariant::Definition(_))
    }

    /// 是否为"未构造"的类型：源定义或尚未绑定自身实参的替换嵌套类型
    pub fn is_unconstructed(
        &self,
        id: NamedTypeId,
    ) -> bool {
        !matches!(self.named(id).variant, NamedTypeVariant::Constructed(_))
    }

    pub fn original_definition(
        &self,
        id: NamedTypeId,
    ) -> NamedTypeId {
        match &self.named(id).variant {
            NamedTypeVariant::Definition(_) => id,
            NamedTypeVariant::Substituted(s) => s.original_definition,
            NamedTypeVariant::Constructed(c) => c.original_definition,
        }
    }

    pub fn constructed_from(
        &self,
        id: NamedTypeId,
    ) -> NamedTypeId {
        match &self.named(id).variant {
            NamedTypeVariant::Constructed(c) => c.constructed_from,
            _ => id,
        }
    }

    pub fn template_parameters(
        &self,
        id: NamedTypeId,
    ) -> Vec<TemplateParamId> {
        match &self.named(id).variant {
            NamedTypeVariant::Definition(d) => d.template_parameters.clone(),
            NamedTypeVariant::Substituted(s) => s.template_parameters.clone(),
            NamedTypeVariant::Constructed(c) => self.template_parameters(c.constructed_from),
        }
    }

    pub fn arity(
        &self,
        id: NamedTypeId,
    ) -> usize {
        match &self.named(id).variant {
            NamedTypeVariant::Definition(d) => d.template_parameters.len(),
            NamedTypeVariant::Substituted(s) => s.template_parameters.len(),
            NamedTypeVariant::Constructed(c) => c.template_arguments.len(),
        }
    }

    /// 模板实参；未构造的类型以自身参数作为实参
    pub fn template_arguments(
        &self,
        id: NamedTypeId,
    ) -> Vec<TypeOrConstant> {
        match &self.named(id).variant {
            NamedTypeVariant::Constructed(c) => c.template_arguments.clone(),
            NamedTypeVariant::Definition(d) => {
                d.template_parameters.iter().map(|p| TypeOrConstant::from(*p)).collect()
            }
            NamedTypeVariant::Substituted(s) => {
                s.template_parameters.iter().map(|p| TypeOrConstant::from(*p)).collect()
            }
        }
    }

    /// 源定义没有替换映射
    pub fn template_substitution(
        &self,
        id: NamedTypeId,
    ) -> Option<Arc<TemplateMap>> {
        match &self.named(id).variant {
            NamedTypeVariant::Definition(_) => None,
            NamedTypeVariant::Substituted(s) => Some(s.map.clone()),
            NamedTypeVariant::Constructed(c) => Some(c.map.clone()),
        }
    }

    fn default_base_type(
        &self,
        data: &NamedTypeData,
    ) -> Option<NamedTypeId> {
        match data.type_kind {
            TypeKind::Error | TypeKind::Array | TypeKind::TemplateParameter => None,
            TypeKind::Class if data.special_type == SpecialType::Object => None,
            TypeKind::Class => Some(self.get_special_type(SpecialType::Object)),
            TypeKind::Struct | TypeKind::Primitive => {
                Some(self.get_special_type(SpecialType::ValueType))
            }
        }
    }

    /// 基类型；`None` 表示 Object 或没有基类
    ///
    /// 构造/替换类型的基类型是定义的基类型经自身映射替换的结果（延迟计算）。
    pub fn base_type(
        &self,
        id: NamedTypeId,
    ) -> Option<NamedTypeId> {
        let data = self.named(id);
        match &data.variant {
            NamedTypeVariant::Definition(d) => match d.base_type.get() {
                Some(base) => *base,
                None => self.default_base_type(&data),
            },
            NamedTypeVariant::Substituted(s) => memoize(&s.base_type, || {
                self.base_type(s.original_definition)
                    .map(|base| s.map.substitute_named_type(self, base))
            }),
            NamedTypeVariant::Constructed(c) => memoize(&c.base_type, || {
                self.base_type(c.original_definition)
                    .map(|base| c.map.substitute_named_type(self, base))
            }),
        }
    }

    /// 任意类型的基类型：数组为 `Array`，模板参数为有效基类
    pub fn base_type_of(
        &self,
        ty: TypeSymbol,
    ) -> Option<NamedTypeId> {
        match ty {
            TypeSymbol::Named(id) => self.base_type(id),
            TypeSymbol::Array(_) => Some(self.get_special_type(SpecialType::Array)),
            TypeSymbol::TemplateParameter(p) => self.effective_base_class(p),
        }
    }

    // ------------------------------------------------------------------
    // 成员查询
    // ------------------------------------------------------------------

    /// 类型的成员；构造/替换类型的成员在第一次查询时生成并缓存
    pub fn members(
        &self,
        id: NamedTypeId,
    ) -> Vec<SymbolId> {
        let data = self.named(id);
        match &data.variant {
            NamedTypeVariant::Definition(d) => d.members.read().clone(),
            NamedTypeVariant::Substituted(s) => memoize(&s.members, || {
                self.instantiate_members(s.original_definition, id)
            }),
            NamedTypeVariant::Constructed(c) => memoize(&c.members, || {
                self.instantiate_members(c.original_definition, id)
            }),
        }
    }

    pub fn members_named(
        &self,
        id: NamedTypeId,
        name: &str,
    ) -> Vec<SymbolId> {
        self.members(id)
            .into_iter()
            .filter(|m| self.member_name(*m) == name)
            .collect()
    }

    /// 按名称和元数查找嵌套类型
    pub fn get_type_member(
        &self,
        container: NamedTypeId,
        name: &str,
        arity: usize,
    ) -> Option<NamedTypeId> {
        self.members_named(container, name)
            .into_iter()
            .filter_map(SymbolId::as_named_type)
            .find(|t| self.arity(*t) == arity)
    }

    /// 容器中与 `original` 对应的嵌套类型
    pub(crate) fn type_member_for_definition(
        &self,
        container: NamedTypeId,
        original: NamedTypeId,
    ) -> Option<NamedTypeId> {
        self.members(container)
            .into_iter()
            .filter_map(SymbolId::as_named_type)
            .find(|t| self.original_definition(*t) == original)
    }

    pub fn member_name(
        &self,
        member: SymbolId,
    ) -> String {
        match member {
            SymbolId::NamedType(t) => self.named(t).name.clone(),
            SymbolId::Method(m) => self.method(m).common.name.clone(),
            SymbolId::Field(f) => self.field(f).common.name.clone(),
            SymbolId::Property(p) => self.property(p).common.name.clone(),
        }
    }

    pub fn member_containing_type(
        &self,
        member: SymbolId,
    ) -> Option<NamedTypeId> {
        match member {
            SymbolId::NamedType(t) => self.containing_type(t),
            SymbolId::Method(m) => Some(self.method(m).common.containing_type),
            SymbolId::Field(f) => Some(self.field(f).common.containing_type),
            SymbolId::Property(p) => Some(self.property(p).common.containing_type),
        }
    }

    /// 成员的模板元数（字段、属性为 0）
    pub fn member_arity(
        &self,
        member: SymbolId,
    ) -> usize {
        match member {
            SymbolId::NamedType(t) => self.arity(t),
            SymbolId::Method(m) => self.method_arity(m),
            SymbolId::Field(_) | SymbolId::Property(_) => 0,
        }
    }

    pub fn member_modifiers(
        &self,
        member: SymbolId,
    ) -> MemberModifiers {
        match member {
            SymbolId::NamedType(_) => MemberModifiers::NONE,
            SymbolId::Method(m) => self.method(m).common.modifiers,
            SymbolId::Field(f) => self.field(f).common.modifiers,
            SymbolId::Property(p) => self.property(p).common.modifiers,
        }
    }

    pub fn member_accessibility(
        &self,
        member: SymbolId,
    ) -> Accessibility {
        match member {
            SymbolId::NamedType(t) => self.named(t).accessibility,
            SymbolId::Method(m) => self.method(m).common.accessibility,
            SymbolId::Field(f) => self.field(f).common.accessibility,
            SymbolId::Property(p) => self.property(p).common.accessibility,
        }
    }

    pub fn member_original_definition(
        &self,
        member: SymbolId,
    ) -> SymbolId {
        match member {
            SymbolId::NamedType(t) => SymbolId::NamedType(self.original_definition(t)),
            SymbolId::Method(m) => SymbolId::Method(self.method_original_definition(m)),
            SymbolId::Field(_) | SymbolId::Property(_) => {
                match self.value_member(member).map(|d| match &d.variant {
                    ValueMemberVariant::Definition { .. } => member,
                    ValueMemberVariant::Substituted {
                        original_definition,
                        ..
                    } => *original_definition,
                }) {
                    Some(original) => original,
                    None => member,
                }
            }
        }
    }

    pub fn member_kind(
        &self,
        member: SymbolId,
    ) -> SymbolKind {
        member.kind()
    }

    // ------------------------------------------------------------------
    // 方法查询
    // ------------------------------------------------------------------

    pub fn method_template_parameters(
        &self,
        id: MethodId,
    ) -> Vec<TemplateParamId> {
        match &self.method(id).variant {
            MethodVariant::Definition {
                template_parameters,
            }
            | MethodVariant::Substituted {
                template_parameters,
                ..
            } => template_parameters.clone(),
            MethodVariant::Constructed {
                constructed_from, ..
            } => self.method_template_parameters(*constructed_from),
        }
    }

    pub fn method_arity(
        &self,
        id: MethodId,
    ) -> usize {
        match &self.method(id).variant {
            MethodVariant::Definition {
                template_parameters,
            }
            | MethodVariant::Substituted {
                template_parameters,
                ..
            } => template_parameters.len(),
            MethodVariant::Constructed {
                template_arguments, ..
            } => template_arguments.len(),
        }
    }

    pub fn method_template_arguments(
        &self,
        id: MethodId,
    ) -> Vec<TypeOrConstant> {
        match &self.method(id).variant {
            MethodVariant::Constructed {
                template_arguments, ..
            } => template_arguments.clone(),
            _ => self
                .method_template_parameters(id)
                .into_iter()
                .map(TypeOrConstant::from)
                .collect(),
        }
    }

    pub fn method_constructed_from(
        &self,
        id: MethodId,
    ) -> MethodId {
        match &self.method(id).variant {
            MethodVariant::Constructed {
                constructed_from, ..
            } => *constructed_from,
            _ => id,
        }
    }

    pub fn method_original_definition(
        &self,
        id: MethodId,
    ) -> MethodId {
        match &self.method(id).variant {
            MethodVariant::Definition { .. } => id,
            MethodVariant::Substituted {
                original_definition,
                ..
            }
            | MethodVariant::Constructed {
                original_definition,
                ..
            } => *original_definition,
        }
    }

    pub fn method_substitution(
        &self,
        id: MethodId,
    ) -> Option<Arc<TemplateMap>> {
        match &self.method(id).variant {
            MethodVariant::Definition { .. } => None,
            MethodVariant::Substituted { map, .. } | MethodVariant::Constructed { map, .. } => {
                Some(map.clone())
            }
        }
    }

    /// 方法签名；替换/构造方法的签名在第一次查询时经映射计算
    pub fn method_signature(
        &self,
        id: MethodId,
    ) -> Arc<MethodSignature> {
        let data = self.method(id);
        match &data.variant {
            MethodVariant::Definition { .. } => match data.signature.get() {
                Some(signature) => signature.clone(),
                None => Arc::new(MethodSignature::new(
                    self.get_special_type(SpecialType::Void),
                    Vec::new(),
                )),
            },
            MethodVariant::Substituted {
                original_definition,
                map,
                ..
            }
            | MethodVariant::Constructed {
                original_definition,
                map,
                ..
            } => memoize(&data.signature, || {
                let original = self.method_signature(*original_definition);
                Arc::new(map.substitute_signature(self, &original))
            }),
        }
    }

    pub fn return_type(
        &self,
        id: MethodId,
    ) -> TypeWithAnnotations {
        self.method_signature(id).return_type
    }

    // ------------------------------------------------------------------
    // 字段与属性
    // ------------------------------------------------------------------

    /// 字段或属性的类型
    pub fn value_member_type(
        &self,
        member: SymbolId,
    ) -> Option<TypeWithAnnotations> {
        let data = self.value_member(member)?;
        Some(match &data.variant {
            ValueMemberVariant::Definition { ty } => *ty,
            ValueMemberVariant::Substituted {
                original_definition,
                map,
                ty,
            } => memoize(ty, || {
                let original = self
                    .value_member_type(*original_definition)
                    .unwrap_or_else(|| TypeWithAnnotations::new(self.object_type()));
                map.substitute_type_strict(self, original)
            }),
        })
    }

    pub fn field_type(
        &self,
        id: FieldId,
    ) -> TypeWithAnnotations {
        self.value_member_type(SymbolId::Field(id))
            .unwrap_or_else(|| TypeWithAnnotations::new(self.object_type()))
    }

    pub fn property_type(
        &self,
        id: PropertyId,
    ) -> TypeWithAnnotations {
        self.value_member_type(SymbolId::Property(id))
            .unwrap_or_else(|| TypeWithAnnotations::new(self.object_type()))
    }

    // ------------------------------------------------------------------
    // 模板参数查询
    // ------------------------------------------------------------------

    pub fn template_parameter_name(
        &self,
        id: TemplateParamId,
    ) -> String {
        self.param(id).name.clone()
    }

    pub fn template_parameter_ordinal(
        &self,
        id: TemplateParamId,
    ) -> usize {
        self.param(id).ordinal
    }

    pub fn template_parameter_owner(
        &self,
        id: TemplateParamId,
    ) -> TemplateOwner {
        self.param(id).owner
    }

    pub fn template_parameter_kind(
        &self,
        id: TemplateParamId,
    ) -> TemplateParameterKind {
        self.param(id).kind
    }

    pub fn template_parameter_span(
        &self,
        id: TemplateParamId,
    ) -> Span {
        self.param(id).span
    }

    /// 参数所属声明的外层类型（类型参数为声明类型的容器，方法参数为方法所在类型）
    pub fn template_parameter_containing_type(
        &self,
        id: TemplateParamId,
    ) -> Option<NamedTypeId> {
        match self.param(id).owner {
            TemplateOwner::Type(t) => self.containing_type(t),
            TemplateOwner::Method(m) => Some(self.method(m).common.containing_type),
            TemplateOwner::Indexed => None,
        }
    }

    /// 沿替换链追溯到源参数
    pub fn template_parameter_original(
        &self,
        id: TemplateParamId,
    ) -> TemplateParamId {
        match &self.param(id).source {
            ConstraintSource::Substituted { original, .. } => {
                self.template_parameter_original(*original)
            }
            _ => id,
        }
    }

    /// 约束子句上绑定的表达式（仅供显示）
    pub fn constraint_expressions(
        &self,
        id: TemplateParamId,
    ) -> Vec<BoundExpression> {
        let original = self.template_parameter_original(id);
        match &self.param(original).source {
            ConstraintSource::Declared(cell) => cell
                .get()
                .map(|c| c.expressions.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// 按序号取得规范化的模板参数（签名比较使用）
    pub(crate) fn indexed_template_parameter(
        &self,
        ordinal: usize,
    ) -> TemplateParamId {
        let mut indexed = self.indexed_parameters.lock();
        while indexed.len() <= ordinal {
            let next = indexed.len();
            let id = self.arena.write().push_param(TemplateParamData {
                name: format!("!{}", next),
                ordinal: next,
                owner: TemplateOwner::Indexed,
                kind: TemplateParameterKind::Type,
                has_primitive_type_constraint: false,
                has_object_type_constraint: false,
                span: Span::dummy(),
                source: ConstraintSource::Unconstrained,
                bounds: OnceCell::new(),
            });
            indexed.push(id);
        }
        indexed[ordinal]
    }

    // ------------------------------------------------------------------
    // 数组查询
    // ------------------------------------------------------------------

    pub fn array_element_type(
        &self,
        id: ArrayTypeId,
    ) -> TypeWithAnnotations {
        self.array(id).element
    }

    pub fn array_rank(
        &self,
        id: ArrayTypeId,
    ) -> usize {
        self.array(id).rank
    }

    pub fn is_sz_array(
        &self,
        id: ArrayTypeId,
    ) -> bool {
        self.array(id).is_sz
    }

    pub fn array_sizes(
        &self,
        id: ArrayTypeId,
    ) -> Vec<usize> {
        self.array(id).sizes.clone()
    }

    pub fn array_lower_bounds(
        &self,
        id: ArrayTypeId,
    ) -> Option<Vec<i64>> {
        self.array(id).lower_bounds.clone()
    }
}

/// 一次性发布：先在锁外计算，再尝试写入；竞争失败时丢弃自己的结果，返回胜者的值
///
/// 计算过程可能递归查询其他符号，不能在 `get_or_init` 中进行。
pub(crate) fn memoize<T: Clone>(
    cell: &OnceCell<T>,
    compute: impl FnOnce() -> T,
) -> T {
    if let Some(value) = cell.get() {
        return value.clone();
    }
    match cell.try_insert(compute()) {
        Ok(value) => value.clone(),
        Err((winner, _)) => winner.clone(),
    }
}
