//! 重写与隐藏关系解析
//!
//! 从成员所在类型的直接基类开始，每次只扫描一层基类型中同名的成员：
//! - 种类不同且元数对得上（相等，或候选是零元方法）的成员被隐藏；
//!   这里非泛型方法的元数按参数个数计，所以字段 `X` 隐藏 `X()` 而不隐藏 `X(int)`
//! - 种类相同时，完全匹配优先，其次记录第一个宽松匹配
//!
//! 某一层产生了匹配或隐藏成员就停止向上查找，更远的祖先不再考虑。
//! 结果按成员缓存，只计算一次。

use std::sync::Arc;

use tracing::debug;

use super::signature::MemberSignatureComparer;
use crate::frontend::core::type_system::compilation::memoize;
use crate::frontend::core::type_system::{
    Accessibility, Compilation, MethodId, NamedTypeId, SymbolId, SymbolKind,
};

/// 重写/隐藏查询结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverriddenOrHiddenMembersResult {
    pub overridden_members: Vec<SymbolId>,
    pub hidden_members: Vec<SymbolId>,
}

impl OverriddenOrHiddenMembersResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.overridden_members.is_empty() && self.hidden_members.is_empty()
    }

    /// 被重写的代表成员
    pub fn overridden_member(&self) -> Option<SymbolId> {
        self.overridden_members.first().copied()
    }
}

/// 精确匹配与宽松匹配使用的比较器
fn comparers_for(
    is_override: bool,
    same_assembly: bool,
) -> (MemberSignatureComparer, MemberSignatureComparer) {
    if is_override && same_assembly {
        (
            MemberSignatureComparer::OVERRIDE,
            MemberSignatureComparer::OVERRIDE,
        )
    } else {
        (
            MemberSignatureComparer::OVERRIDE_WITH_RETURN,
            MemberSignatureComparer::OVERRIDE,
        )
    }
}

impl Compilation {
    /// 成员重写或隐藏的基类成员（第一次查询时计算并缓存）
    pub fn overridden_or_hidden_members(
        &self,
        member: SymbolId,
    ) -> Arc<OverriddenOrHiddenMembersResult> {
        let compute = || Arc::new(self.find_overridden_or_hidden_members(member));
        match member {
            SymbolId::NamedType(t) => memoize(&self.named(t).overridden_or_hidden, compute),
            SymbolId::Method(m) => memoize(&self.method(m).common.overridden_or_hidden, compute),
            SymbolId::Field(f) => memoize(&self.field(f).common.overridden_or_hidden, compute),
            SymbolId::Property(p) => {
                memoize(&self.property(p).common.overridden_or_hidden, compute)
            }
        }
    }

    /// 重写方法所重写的基类方法
    pub fn overridden_method(
        &self,
        method: MethodId,
    ) -> Option<MethodId> {
        let member = SymbolId::Method(method);
        if !self.member_modifiers(member).is_override {
            return None;
        }
        self.overridden_or_hidden_members(member)
            .overridden_member()
            .and_then(SymbolId::as_method)
    }

    /// 不经缓存地计算重写/隐藏关系
    pub fn find_overridden_or_hidden_members(
        &self,
        member: SymbolId,
    ) -> OverriddenOrHiddenMembersResult {
        let Some(containing_type) = self.member_containing_type(member) else {
            return OverriddenOrHiddenMembersResult::empty();
        };
        let name = self.member_name(member);
        let kind = member.kind();
        let arity = self.hiding_arity(member);
        let is_override = self.member_modifiers(member).is_override;
        let assembly = self.assembly(containing_type);

        let mut hidden = Vec::new();
        let mut representative = None;
        let mut current = self.base_type(containing_type);
        while let Some(base) = current {
            let (exact_comparer, fallback_comparer) =
                comparers_for(is_override, self.assembly(base) == assembly);
            let mut exact = None;
            let mut fallback = None;
            for candidate in self.members_named(base, &name) {
                if !self.is_accessible_from(candidate, base, containing_type) {
                    continue;
                }
                if candidate.kind() != kind {
                    let candidate_arity = self.hiding_arity(candidate);
                    if candidate_arity == arity
                        || (candidate.kind() == SymbolKind::Method && candidate_arity == 0)
                    {
                        hidden.push(candidate);
                    }
                    continue;
                }
                if exact.is_some() {
                    continue;
                }
                if exact_comparer.equals(self, member, candidate) {
                    exact = Some(candidate);
                } else if fallback.is_none() && fallback_comparer.equals(self, member, candidate) {
                    fallback = Some(candidate);
                }
            }
            representative = exact.or(fallback);
            if representative.is_some() || !hidden.is_empty() {
                break;
            }
            current = self.base_type(base);
        }

        let mut overridden = Vec::new();
        if let Some(representative) = representative {
            let (target, comparer) = if is_override {
                (&mut overridden, MemberSignatureComparer::OVERRIDE)
            } else {
                (&mut hidden, MemberSignatureComparer::HIDE)
            };
            target.push(representative);
            if let Some(container) = self.member_containing_type(representative) {
                for sibling in self.members_named(container, &name) {
                    if sibling != representative
                        && sibling.kind() == kind
                        && !target.contains(&sibling)
                        && comparer.equals(self, representative, sibling)
                    {
                        target.push(sibling);
                    }
                }
            }
        }

        debug!(
            %member,
            name = %name,
            overridden = overridden.len(),
            hidden = hidden.len(),
            "resolved overridden or hidden members"
        );
        OverriddenOrHiddenMembersResult {
            overridden_members: overridden,
            hidden_members: hidden,
        }
    }

    /// 跨种类隐藏判断使用的元数
    ///
    /// 泛型方法取模板元数，非泛型方法取参数个数，其他成员同 `member_arity`。
    fn hiding_arity(
        &self,
        member: SymbolId,
    ) -> usize {
        match member {
            SymbolId::Method(m) => match self.method_arity(m) {
                0 => self.method_signature(m).parameters.len(),
                arity => arity,
            },
            _ => self.member_arity(member),
        }
    }

    /// 基类型 `owner` 中的成员对派生类型 `from` 是否可见
    fn is_accessible_from(
        &self,
        candidate: SymbolId,
        owner: NamedTypeId,
        from: NamedTypeId,
    ) -> bool {
        match self.member_accessibility(candidate) {
            Accessibility::Public | Accessibility::Protected => true,
            Accessibility::Internal => self.assembly(owner) == self.assembly(from),
            Accessibility::Private => false,
        }
    }
}
