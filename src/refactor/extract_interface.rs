//! Extract Interface (C6.6, spec.md §4.6.6): synthesizes interface text for
//! a class/struct's public instance members. Never writes to disk — the
//! client saves the suggested file itself.

use super::RefactorError;
use crate::model::{Accessibility, Symbol, SymbolKind};

pub struct ExtractInterfaceArgs<'a> {
    pub interface_name: &'a str,
    pub include_member_names: Option<&'a [String]>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractedInterface {
    pub text: String,
    pub suggested_file_name: String,
}

fn is_extractable(member: &Symbol) -> bool {
    if member.is_static || member.accessibility != Accessibility::Public {
        return false;
    }
    matches!(member.kind, SymbolKind::Method | SymbolKind::Property | SymbolKind::Event)
}

pub fn extract_interface(
    type_symbol: &Symbol,
    members: &[Symbol],
    args: ExtractInterfaceArgs<'_>,
) -> Result<ExtractedInterface, RefactorError> {
    let mut candidates: Vec<&Symbol> = members.iter().filter(|m| is_extractable(m)).collect();

    if let Some(names) = args.include_member_names {
        candidates.retain(|m| names.iter().any(|n| n == &m.name));
    }

    let namespace = type_symbol.namespace.clone();
    let mut text = String::new();
    if let Some(ns) = &namespace {
        if !ns.is_empty() {
            text.push_str(&format!("namespace {ns}\n{{\n"));
        }
    }

    text.push_str(&format!("public interface {}\n{{\n", args.interface_name));
    for member in &candidates {
        text.push_str(&member_signature(member));
    }
    text.push_str("}\n");

    if namespace.as_deref().is_some_and(|ns| !ns.is_empty()) {
        text.push_str("}\n");
    }

    Ok(ExtractedInterface {
        text,
        suggested_file_name: format!("{}.cs", args.interface_name),
    })
}

fn member_signature(member: &Symbol) -> String {
    match member.kind {
        SymbolKind::Method => {
            let method = member.method.clone().unwrap_or_default();
            let params = method
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.type_display, p.name))
                .collect::<Vec<_>>()
                .join(", ");
            format!("    {} {}({});\n", method.return_type, member.name, params)
        }
        SymbolKind::Property => {
            let type_display = member.method.as_ref().map(|m| m.return_type.as_str()).unwrap_or("object");
            format!("    {} {} {{ get; set; }}\n", type_display, member.name)
        }
        SymbolKind::Event => format!("    event EventHandler {};\n", member.name),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, MethodAttributes, Parameter};

    fn method(name: &str) -> Symbol {
        Symbol {
            bridge_id: format!("sym#{name}"),
            kind: SymbolKind::Method,
            name: name.to_string(),
            display_name: name.to_string(),
            accessibility: Accessibility::Public,
            locations: vec![Location::Source {
                file: "A.cs".into(),
                start_line: 0,
                start_column: 0,
                end_line: 0,
                end_column: 1,
            }],
            containing_type: Some("Foo".to_string()),
            namespace: Some("MyApp".to_string()),
            attributes: vec![],
            method: Some(MethodAttributes {
                return_type: "void".to_string(),
                parameters: vec![Parameter {
                    name: "input".to_string(),
                    type_display: "string".to_string(),
                }],
                is_async: false,
                is_static: false,
                is_extension: false,
            }),
            is_static: false,
            is_implicitly_declared: false,
        }
    }

    fn type_symbol() -> Symbol {
        Symbol {
            bridge_id: "sym#Foo".to_string(),
            kind: SymbolKind::Class,
            name: "Foo".to_string(),
            display_name: "Foo".to_string(),
            accessibility: Accessibility::Public,
            locations: vec![],
            containing_type: None,
            namespace: Some("MyApp".to_string()),
            attributes: vec![],
            method: None,
            is_static: false,
            is_implicitly_declared: false,
        }
    }

    #[test]
    fn synthesizes_public_instance_methods_only() {
        let mut private_method = method("Hidden");
        private_method.accessibility = Accessibility::Private;

        let members = vec![method("DoWork"), private_method];
        let result = extract_interface(
            &type_symbol(),
            &members,
            ExtractInterfaceArgs {
                interface_name: "IFoo",
                include_member_names: None,
            },
        )
        .unwrap();

        assert!(result.text.contains("DoWork"));
        assert!(!result.text.contains("Hidden"));
        assert_eq!(result.suggested_file_name, "IFoo.cs");
    }

    #[test]
    fn include_member_names_intersects() {
        let members = vec![method("DoWork"), method("DoMore")];
        let result = extract_interface(
            &type_symbol(),
            &members,
            ExtractInterfaceArgs {
                interface_name: "IFoo",
                include_member_names: Some(&["DoWork".to_string()]),
            },
        )
        .unwrap();
        assert!(result.text.contains("DoWork"));
        assert!(!result.text.contains("DoMore"));
    }
}
