//! Role prompts for the planner, dependency installer, and component writer.
//!
//! The planner and component writer embed the template-conventions document
//! so generated code follows the base repository's layout.

use crate::types::ComponentSpec;
use std::path::Path;

const PLANNER_ROLE: &str = "You are an expert React developer and project planner. \
Your job is to create a structured plan based on a user's request and a set of template conventions.";

const PLANNER_CONTRACT: &str = r#"
Your plan MUST be a JSON object with four keys: `codename`, `npm_dependencies`, `shadcn_dependencies`, and `components`.
- `codename`: A creative, two-word, lowercase, snake_cased project name.
- `npm_dependencies`: A list of any NEW npm packages to install.
- `shadcn_dependencies`: A list of any NEW shadcn-ui components to add.
- `components`: A list of objects for custom components to create. Each component object MUST have:
  - `file_path`: The relative path from src directory (e.g., "components/Header.tsx", "App.tsx")
  - `description`: A clear description of what the component should do

**CRITICAL RULE:** If a UI element is a standard shadcn-ui component, you **MUST** list its name in `shadcn_dependencies`. **DO NOT** add it to `components`.

Your output MUST be ONLY the raw JSON object.
"#;

const COMPONENT_ROLE: &str = "You are a senior React developer AI that writes clean, modern TSX code. \
You MUST follow the template conventions provided below.";

const COMPONENT_CONTRACT: &str = r#"
- Your task is to write the full code for a single React component.
- You MUST use the `write_react_component` tool to output the code.
- Your ONLY output must be a call to the `write_react_component` tool.
"#;

/// System prompt for the dependency installer.
pub const DEPENDENCY_SYSTEM_PROMPT: &str = r#"
You are a dependency management expert for a Vite+React project using pnpm.
- You will be given a list of dependencies and told which command to use to install them.
- Group all dependencies into a single command where possible.
- You MUST use the `execute_shell_command` tool to run the installation command.
- For the tool call, you MUST specify the `cwd_override` argument with the project's root path.
"#;

pub fn planner_system_prompt(template_context: &str) -> String {
    format!("{PLANNER_ROLE}\n\n{template_context}\n---{PLANNER_CONTRACT}")
}

pub fn component_system_prompt(template_context: &str) -> String {
    format!("{COMPONENT_ROLE}\n\n{template_context}\n---{COMPONENT_CONTRACT}")
}

/// Planner input for a fresh project.
pub fn planning_context(user_request: &str) -> String {
    format!("User's Request: \"{user_request}\"\n\n(This is a new project.)")
}

pub fn install_prompt(dependencies: &[String], project_path: &Path, instruction: &str) -> String {
    format!(
        "The project is located at '{}'.\n{}\nThe dependencies to install are: {}\n\
         Run the command with `cwd_override` set to '{}'.\n",
        project_path.display(),
        instruction,
        dependencies.join(", "),
        project_path.display(),
    )
}

pub fn component_prompt(spec: &ComponentSpec, project_path: &Path) -> String {
    format!(
        "The project is located at '{project}'.\n\
         Create the React component as described below, following all template conventions.\n\n\
         File Path: {file}\n\
         Description: {description}\n\n\
         Write the complete code and use the `write_react_component` tool to save it \
         with `project_path` set to '{project}'.\n",
        project = project_path.display(),
        file = spec.path().unwrap_or("unknown"),
        description = spec.description_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_prompt_scopes_to_project() {
        let prompt = install_prompt(
            &["zustand".into(), "clsx".into()],
            Path::new("cozy_otter"),
            "Use pnpm add.",
        );
        assert!(prompt.contains("The project is located at 'cozy_otter'."));
        assert!(prompt.contains("zustand, clsx"));
        assert!(prompt.contains("cwd_override"));
    }

    #[test]
    fn component_prompt_uses_synthesized_description() {
        let spec = ComponentSpec {
            file_path: Some("App.tsx".into()),
            description: None,
        };
        let prompt = component_prompt(&spec, Path::new("proj"));
        assert!(prompt.contains("File Path: App.tsx"));
        assert!(prompt.contains("Description: Create a component for App.tsx."));
    }

    #[test]
    fn planner_prompt_embeds_template_context() {
        let prompt = planner_system_prompt("Use @/components/ui for shadcn.");
        assert!(prompt.contains("Use @/components/ui for shadcn."));
        assert!(prompt.contains("`codename`"));
    }

    #[test]
    fn planning_context_marks_new_projects() {
        let context = planning_context("a todo app");
        assert!(context.starts_with("User's Request: \"a todo app\""));
        assert!(context.ends_with("(This is a new project.)"));
    }
}
