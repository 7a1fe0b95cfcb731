//! Helper code for scripting libraries.
//!
//! Turns a selector plus per-level check marks into a call chain. Unchecked
//! levels are skipped and their relative depth is folded into the next
//! emitted level.

use uiinspect_protocols::{Attribute, BackendKind};

use crate::selector::{Selector, SelectorLevel};
use crate::synthesizer::Synthesis;

const WINDOW_MANAGER_ARGUMENTS: &[(Attribute, &str)] = &[
    (Attribute::Name, "Name"),
    (Attribute::RegexName, "RegexName"),
    (Attribute::ClassName, "ClassName"),
    (Attribute::AutomationId, "AutomationId"),
];

const ACCESS_BRIDGE_KEYS: &[(Attribute, &str)] = &[
    (Attribute::Name, "name"),
    (Attribute::RegexName, "regex_name"),
    (Attribute::Description, "description"),
    (Attribute::States, "states"),
];

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    backend: BackendKind,
}

impl CodeGenerator {
    pub fn new(backend: BackendKind) -> Self {
        Self { backend }
    }

    /// Generate with the synthesized default check marks.
    pub fn generate_default(&self, synthesis: &Synthesis) -> String {
        self.generate(&synthesis.selector(), &synthesis.default_mask())
    }

    /// Levels past the end of `mask` count as checked.
    pub fn generate(&self, selector: &Selector, mask: &[bool]) -> String {
        match self.backend {
            BackendKind::WindowManager => window_manager_chain(selector, mask),
            BackendKind::AccessBridge => access_bridge_levels(selector, mask),
        }
    }
}

fn is_checked(mask: &[bool], index: usize) -> bool {
    mask.get(index).copied().unwrap_or(true)
}

fn arguments(level: &SelectorLevel, names: &[(Attribute, &str)], separator: &str) -> Vec<String> {
    names
        .iter()
        .filter_map(|(attribute, name)| {
            level
                .attribute(*attribute)
                .map(|value| format!("{}{}{}", name, separator, quote(value)))
        })
        .collect()
}

fn window_manager_chain(selector: &Selector, mask: &[bool]) -> String {
    let mut code = String::from("uiautomation\n");
    let mut depth = 0;
    for (index, level) in selector.levels().iter().enumerate() {
        depth = level.relative_depth.saturating_add(depth);
        if !is_checked(mask, index) {
            continue;
        }

        let mut args = arguments(level, WINDOW_MANAGER_ARGUMENTS, "=");
        if index > 0 && level.occurrence_index > 1 {
            args.push(format!("foundIndex={}", level.occurrence_index));
        }
        args.push(format!("Depth={}", depth));
        code.push_str(&format!(".{}Control({})\n", level.tag, args.join(", ")));
        depth = 0;
    }
    code
}

fn access_bridge_levels(selector: &Selector, mask: &[bool]) -> String {
    let mut rows = Vec::new();
    let mut depth = 0;
    for (index, level) in selector.levels().iter().enumerate() {
        depth = level.relative_depth.saturating_add(depth);
        if !is_checked(mask, index) {
            continue;
        }
        // The window level is the driver's attach point.
        if index == 0 {
            depth = 0;
            continue;
        }

        let mut fields = vec![format!("role: {}", quote(&level.tag))];
        fields.extend(arguments(level, ACCESS_BRIDGE_KEYS, ": "));
        if level.occurrence_index > 1 {
            fields.push(format!("found_index: {}", level.occurrence_index));
        }
        fields.push(format!("depth: {}", depth));
        rows.push(format!("    {{{}}}", fields.join(", ")));
        depth = 0;
    }

    if rows.len() > 1 {
        format!("jdriver.find_element_by_levels((\n{}\n))", rows.join(",\n"))
    } else {
        format!("jdriver.find_element_by_levels(\n{}\n)", rows.join(",\n"))
    }
}

#[cfg(test)]
#[path = "codegen_tests.rs"]
mod tests;
