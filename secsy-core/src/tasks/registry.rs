//! Task registry
//!
//! Built once per invocation: internal descriptors in declaration order,
//! then external descriptors in file-name order. Lookups are exact.

use crate::config::TasksConfig;
use crate::error::{Result, SecsyError};
use crate::tasks::builtin;
use crate::tasks::descriptor::TaskDescriptor;
use crate::tasks::external;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<TaskDescriptor>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Internal tasks only
    pub fn builtin() -> Self {
        Self { tasks: builtin::all() }
    }

    /// Internal tasks plus those found in the external tasks directory.
    /// An external task may not shadow one already registered.
    pub fn discover(config: &TasksConfig) -> Result<Self> {
        let mut registry = Self::builtin();
        if let Some(dir) = &config.external_dir {
            for descriptor in external::load_dir(dir)? {
                if let Err(e) = registry.register(descriptor) {
                    warn!("{}", e);
                }
            }
        }
        debug!("Registered {} tasks", registry.len());
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: TaskDescriptor) -> Result<()> {
        descriptor.validate()?;
        if self.contains(&descriptor.name) {
            return Err(SecsyError::descriptor(&descriptor.name, "a task with this name is already registered"));
        }
        self.tasks.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn resolve(&self, name: &str) -> Result<&TaskDescriptor> {
        self.get(name).ok_or_else(|| SecsyError::UnknownTask { name: name.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks picked by a comma-separated name list, in registry order.
    /// `None` selects everything; names that match nothing are dropped.
    pub fn select(&self, names: Option<&str>) -> Vec<&TaskDescriptor> {
        match names {
            None => self.tasks.iter().collect(),
            Some(list) => {
                let wanted: Vec<&str> = list.split(',').collect();
                self.tasks.iter().filter(|t| wanted.contains(&t.name.as_str())).collect()
            }
        }
    }
}
