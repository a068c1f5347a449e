use crate::error::ResolveError;
use crate::path;
use crate::value::Value;
use std::collections::BTreeMap;

/// Name of the variable that holds the output register.
pub const OUTPUT_VARIABLE: &str = "output";

/// The variables of one script execution.
///
/// The output register lives here as the `output` variable, so scripts can
/// reference it as `${output}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    vars: BTreeMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Variables::default()
    }

    pub fn get(&self, name: &str) -> Result<&Value, ResolveError> {
        self.vars
            .get(name)
            .ok_or_else(|| ResolveError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Bind `name`, overwriting any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// A frozen copy to resolve against while this environment changes.
    pub fn snapshot(&self) -> Variables {
        self.clone()
    }

    /// Look up a reference body such as `person.address[0].city`.
    pub fn lookup(&self, reference: &str) -> Result<&Value, ResolveError> {
        let (name, path) = path::split_reference(reference);
        let value = self.get(name)?;
        path::resolve(value, path).map_err(|source| ResolveError::Path {
            reference: reference.to_string(),
            source,
        })
    }

    /// The current output value; `None` when unset or null.
    pub fn output(&self) -> Option<&Value> {
        self.vars.get(OUTPUT_VARIABLE).filter(|v| !v.is_null())
    }

    pub fn set_output(&mut self, value: Value) {
        self.set(OUTPUT_VARIABLE, value);
    }
}
