use crate::assert::{assert_equals, assert_that};
use crate::ast::*;
use crate::error::ScriptError;
use crate::interpolate::{resolve_text, resolve_value};
use crate::render::to_yaml;
use crate::value::Value;
use crate::variables::Variables;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, trace, warn};

/// Upper bound on passes over the variable assignments.
pub const MAX_BINDING_PASSES: usize = 10;

/// Executes one parsed script against its own variables, writing `Print`
/// output to `out`.
pub struct Interpreter<W: Write> {
    vars: Variables,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Interpreter {
            vars: Variables::new(),
            out,
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    /// Bind declared inputs: the override when given, else the default.
    /// Overrides for undeclared names are bound too.
    pub fn bind_inputs(&mut self, metadata: &ScriptMetadata, input: &BTreeMap<String, String>) {
        for param in &metadata.input {
            match (input.get(&param.name), &param.default) {
                (Some(given), _) => self.vars.set(param.name.clone(), Value::from(given.as_str())),
                (None, Some(default)) => self.vars.set(param.name.clone(), default.clone()),
                (None, None) => {}
            }
        }
        for (name, given) in input {
            if metadata.input_param(name).is_none() {
                self.vars.set(name.clone(), Value::from(given.as_str()));
            }
        }
    }

    /// Run both phases. Returns the final output value, if any.
    pub fn run(&mut self, commands: &[Command]) -> Result<Option<Value>, ScriptError> {
        self.bind_assignments(commands);
        for cmd in commands {
            self.execute_command(cmd)?;
        }
        self.out.flush()?;
        Ok(self.vars.output().cloned())
    }

    /// Phase 1: settle the `${name}: value` assignments.
    ///
    /// Each pass resolves every assignment against a snapshot of the
    /// variables, then binds the results that changed. Assignments that fail
    /// to resolve are retried on the next pass. Stops when a pass changes
    /// nothing or after `MAX_BINDING_PASSES`.
    pub fn bind_assignments(&mut self, commands: &[Command]) {
        for pass in 0..MAX_BINDING_PASSES {
            let snapshot = self.vars.snapshot();
            let mut candidates: Vec<(&str, Value)> = Vec::new();
            for cmd in commands {
                let Command::VarAssignment { name, value } = cmd else {
                    continue;
                };
                match resolve_value(value, &snapshot) {
                    Ok(resolved) => {
                        candidates.retain(|(n, _)| *n != name.as_str());
                        candidates.push((name.as_str(), resolved));
                    }
                    Err(err) => trace!(name = %name, %err, "assignment not resolvable yet"),
                }
            }

            let mut changed = 0;
            for (name, resolved) in candidates {
                if self.vars.get(name).ok() != Some(&resolved) {
                    trace!(name, value = %to_yaml(&resolved), "bound");
                    self.vars.set(name, resolved);
                    changed += 1;
                }
            }
            debug!(pass, changed, "assignment pass");
            if changed == 0 {
                return;
            }
        }
        warn!(
            passes = MAX_BINDING_PASSES,
            "variable assignments did not settle"
        );
    }

    /// Phase 2: one imperative command.
    fn execute_command(&mut self, cmd: &Command) -> Result<(), ScriptError> {
        trace!(command = cmd.keyword(), "execute");
        match cmd {
            Command::VarAssignment { .. } | Command::TestCaseMarker(_) => Ok(()),
            Command::AsAlias(name) => self.execute_as(name),
            Command::Print(text) => self.execute_print(text),
            Command::Output(value) => {
                let resolved = self.resolve(cmd, value)?;
                self.vars.set_output(resolved);
                Ok(())
            }
            Command::ExpectedOutput(value) => {
                let expected = to_yaml(&self.resolve(cmd, value)?);
                let actual = to_yaml(self.vars.output().unwrap_or(&Value::Null));
                if expected == actual {
                    Ok(())
                } else {
                    Err(ScriptError::UnexpectedOutput { expected, actual })
                }
            }
            Command::AssertEquals { actual, expected } => {
                let actual = self.resolve(cmd, actual)?;
                let expected = self.resolve(cmd, expected)?;
                Ok(assert_equals(actual, expected)?)
            }
            Command::AssertThat(tree) => {
                let resolved = self.resolve(cmd, tree)?;
                Ok(assert_that(&resolved)?)
            }
        }
    }

    fn execute_as(&mut self, name: &str) -> Result<(), ScriptError> {
        let output = self.vars.output().cloned().ok_or(ScriptError::EmptyOutput)?;
        self.vars.set(name, output);
        Ok(())
    }

    /// An empty `Print` is skipped: nothing is written and the output
    /// register keeps its value.
    fn execute_print(&mut self, text: &str) -> Result<(), ScriptError> {
        if text.is_empty() {
            return Ok(());
        }
        let resolved = resolve_text(text, &self.vars)
            .into_result()
            .map_err(ScriptError::resolve("Print"))?;
        writeln!(self.out, "{}", resolved)?;
        self.vars.set_output(Value::String(resolved));
        Ok(())
    }

    fn resolve(&self, cmd: &Command, value: &Value) -> Result<Value, ScriptError> {
        resolve_value(value, &self.vars).map_err(ScriptError::resolve(cmd.keyword()))
    }
}

/// Execute a parsed script with the given input values, writing `Print`
/// output to `out`. Returns the final output value, if any.
pub fn execute<W: Write>(
    script: &ParsedScript,
    input: &BTreeMap<String, String>,
    out: W,
) -> Result<Option<Value>, ScriptError> {
    let mut interpreter = Interpreter::new(out);
    interpreter.bind_inputs(&script.metadata, input);
    interpreter.run(&script.commands)
}
