//! Extension registry for vellum.
//!
//! Extensions are declared as [`ExtensionDescriptor`]s. [`Registry::build`]
//! resolves them into dependency order, assembles their node and mark types
//! into one [`DocumentSchema`](vellum_model::DocumentSchema), and merges
//! their commands, key bindings, behaviors, input rules and converters with a
//! deterministic [`DuplicatePolicy`].

pub use assembler::assemble;
pub use collision::{Collision, DuplicatePolicy, InsertAction, KeyKind};
pub use commands::{BUILTIN_SOURCE, CommandRegistry};
pub use config::ExtensionConfig;
pub use convert::{ConvertError, Converter};
pub use descriptor::{Category, CommandMap, ExtensionContext, ExtensionDescriptor, ResolvedType};
pub use error::ConfigError;
pub use input_rule::{InputRule, InputRuleHandler};
pub use keymap::Keymap;
pub use registry::{Registry, RegistryOptions};
pub use resolver::{ResolvedExtensions, resolve, resolve_with};

mod assembler;
mod collision;
mod commands;
mod config;
mod convert;
mod descriptor;
mod error;
mod input_rule;
mod keymap;
mod registry;
mod resolver;
