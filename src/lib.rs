//! Muban (模板) generic symbol engine
//!
//! The template type and symbol resolution core of a compiler front end:
//! type identity, template-parameter constraint resolution, template substitution,
//! constructed/substituted symbols and override/hide resolution.
//!
//! # Example
//!
//! ```
//! use muban::{Compilation, TypeDeclaration, TypeOrConstant, SpecialType};
//!
//! let c = Compilation::new();
//! let list = c
//!     .declare_type(TypeDeclaration::class("List").with_template_parameters(["T"]))
//!     .unwrap();
//! let int = c.get_special_type(SpecialType::Int32);
//! let list_of_int = c.construct(list, vec![TypeOrConstant::from(int)]).unwrap();
//! assert_eq!(c.original_definition(list_of_int), list);
//! ```

#![doc(html_root_url = "https://docs.rs/muban")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;

// Utility modules
pub mod util;

use ::std::path::Path;

use anyhow::Context;
use tracing::debug;

pub use frontend::core::type_system::{
    Accessibility, ArrayTypeId, AssemblyId, BoundExpression, Compilation, ConstantValue, FieldId,
    MemberModifiers, MethodDeclaration, MethodId, MethodSignature, NamedTypeId, Parameter,
    PropertyId, RefKind, SpecialType, SymbolError, SymbolId, SymbolKind, TemplateMap,
    TemplateOwner, TemplateParamId, TemplateParameterDeclaration, TemplateParameterKind,
    TypeCompareKind, TypeDeclaration, TypeKind, TypeOrConstant, TypeSymbol, TypeWithAnnotations,
    ValueMemberDeclaration,
};
pub use frontend::typecheck::{
    InProgress, MemberSignatureComparer, OverriddenOrHiddenMembersResult, TypeParameterBounds,
};
pub use util::config::EngineConfig;
pub use util::diagnostic::{Diagnostic, DiagnosticBag, DiagnosticKind, Severity};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "Muban (模板)";

/// Build a compilation from a TOML configuration file
///
/// A missing file yields the default configuration.
pub fn compilation_from_config_file(path: &Path) -> anyhow::Result<Compilation> {
    let config = util::config::load_config(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    util::logger::init_with_level(config.logging.level);
    debug!(
        eager = config.symbols.eager_constraint_resolution,
        "creating compilation"
    );
    Ok(Compilation::with_config(config))
}
