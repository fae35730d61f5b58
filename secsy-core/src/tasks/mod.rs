//! Task descriptors and their registry
//!
//! A task wraps one external reconnaissance binary. Everything about the
//! invocation is data; execution lives in [`crate::runner`].

pub mod builtin;
pub mod descriptor;
pub mod external;
pub mod output_map;
pub mod registry;


pub use descriptor::{
    Category, CommandLine, MetaOption, OptKeyMap, OptionKind, OptionSpec, TaskDescriptor,
    TaskOptions, cli_name,
};
pub use output_map::{Derivation, FieldRule, MappingError, OutputMap};
pub use registry::TaskRegistry;
