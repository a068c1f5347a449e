use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write;

const OPTIONS_YAML: &str = include_str!("../resources/command-line-options.yaml");

/// A global command-line option definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliOption {
    pub description: String,
    #[serde(default, rename = "short option")]
    pub short_option: Option<String>,
}

/// All global options, keyed by long name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Options(pub BTreeMap<String, CliOption>);

impl Options {
    /// Load the option definitions bundled with the binary.
    pub fn load() -> Result<Options, serde_yaml::Error> {
        serde_yaml::from_str(OPTIONS_YAML)
    }

    pub fn get(&self, name: &str) -> Option<&CliOption> {
        self.0.get(name)
    }

    /// Global usage text, options sorted by name.
    pub fn format_help(&self) -> String {
        let mut help = String::new();
        help.push_str("Instacli -- Instantly create CLI applications with light scripting!\n\n");
        help.push_str("Usage:\n");
        help.push_str("   instacli [global options] file | directory [command options]\n\n");
        help.push_str("Global options:\n");
        for (name, opt) in &self.0 {
            let short = match &opt.short_option {
                Some(s) => format!(", -{}", s),
                None => String::new(),
            };
            let _ = writeln!(help, "  --{}{}   {}", name, short, opt.description);
        }
        help
    }
}
