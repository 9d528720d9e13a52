//! Markup emission.
//!
//! Renders a document as the XML consumed by the configuration service.
//! Output is deterministic: the same document always yields the same bytes.
//!
//! Wrapper elements (`services`, `ports`, `environment`, `variables`) are
//! always written for an existing owner. Their children are filtered: ports
//! need both endpoints, variables need both name and value, and optional
//! scalars are skipped when empty.

use std::borrow::Cow;

use crate::document::{Application, Document, Environment, Port, Protocol, Service, Variable};

/// XML declaration written on the first line.
pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Name of the root element.
pub const ROOT_ELEMENT: &str = "devops-config";

/// Schema version carried on the root element.
pub const SCHEMA_VERSION: &str = "1.0";

/// Emitted when the application name is empty.
pub const PLACEHOLDER_NAME: &str = "my-app";

/// Emitted when the application version is empty.
pub const PLACEHOLDER_VERSION: &str = "1.0.0";

const INDENT: &str = "    ";

/// Serializes a document to markup text.
#[must_use]
pub fn emit(document: &Document) -> String {
    let mut writer = MarkupWriter::default();

    writer.raw(XML_HEADER);
    writer.raw(&format!(r#"<{ROOT_ELEMENT} version="{SCHEMA_VERSION}">"#));
    writer.depth += 1;

    write_application(&mut writer, &document.application);

    writer.open("environments");
    for environment in &document.environments {
        write_environment(&mut writer, environment);
    }
    writer.close("environments");

    writer.depth -= 1;
    writer.raw(&format!("</{ROOT_ELEMENT}>"));

    writer.finish()
}

fn write_application(writer: &mut MarkupWriter, application: &Application) {
    writer.open("application");
    writer.leaf("name", or_placeholder(&application.name, PLACEHOLDER_NAME));
    writer.leaf("version", or_placeholder(&application.version, PLACEHOLDER_VERSION));
    writer.optional_leaf("description", &application.description);
    writer.close("application");
}

fn write_environment(writer: &mut MarkupWriter, environment: &Environment) {
    writer.open("environment");
    writer.leaf("name", &environment.name);

    writer.open("services");
    for service in &environment.services {
        write_service(writer, service);
    }
    writer.close("services");

    write_variables(writer, "variables", &environment.variables);
    writer.close("environment");
}

fn write_service(writer: &mut MarkupWriter, service: &Service) {
    writer.open("service");
    writer.leaf("name", &service.name);
    writer.leaf("image", &service.image);
    writer.optional_leaf("tag", &service.tag);

    writer.open("ports");
    for port in service.ports.iter().filter(|p| p.is_complete()) {
        write_port(writer, port);
    }
    writer.close("ports");

    write_variables(writer, "environment", &service.environment);

    writer.optional_leaf("command", &service.command);
    writer.optional_leaf("working_dir", &service.working_dir);
    writer.optional_leaf("replicas", &service.replicas);
    writer.close("service");
}

fn write_port(writer: &mut MarkupWriter, port: &Port) {
    writer.open("port");
    writer.leaf("host", &port.host);
    writer.leaf("container", &port.container);
    if port.protocol != Protocol::Tcp {
        writer.leaf("protocol", port.protocol.as_str());
    }
    writer.close("port");
}

fn write_variables(writer: &mut MarkupWriter, wrapper: &str, variables: &[Variable]) {
    writer.open(wrapper);
    for variable in variables.iter().filter(|v| v.is_complete()) {
        writer.open("variable");
        writer.leaf("name", &variable.name);
        writer.leaf("value", &variable.value);
        writer.close("variable");
    }
    writer.close(wrapper);
}

const fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

/// Escapes the characters that would break element text and drops those
/// XML 1.0 does not allow at all.
fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>']) && value.chars().all(is_xml_char) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other if is_xml_char(other) => escaped.push(other),
            _ => {}
        }
    }
    Cow::Owned(escaped)
}

/// The XML 1.0 `Char` production. Surrogates cannot occur in a `char`.
const fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Line-oriented writer with depth-proportional indentation.
#[derive(Debug, Default)]
struct MarkupWriter {
    out: String,
    depth: usize,
}

impl MarkupWriter {
    fn raw(&mut self, line: &str) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(line);
    }

    fn open(&mut self, tag: &str) {
        self.raw(&format!("<{tag}>"));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.raw(&format!("</{tag}>"));
    }

    fn leaf(&mut self, tag: &str, value: &str) {
        self.raw(&format!("<{tag}>{}</{tag}>", escape(value)));
    }

    fn optional_leaf(&mut self, tag: &str, value: &str) {
        if !value.is_empty() {
            self.leaf(tag, value);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{Edit, FormEditor, PortField, VariableField};

    fn scenario() -> Document {
        let mut doc = Document::new();
        doc.application.name = String::from("my-app");
        doc.application.version = String::from("1.0.0");
        doc.environments[0].services.push(Service {
            name: String::from("web"),
            image: String::from("nginx"),
            tag: String::from("alpine"),
            ports: vec![Port {
                host: String::from("8080"),
                container: String::from("80"),
                protocol: Protocol::Tcp,
            }],
            ..Service::default()
        });
        doc
    }

    #[test]
    fn test_emit_scenario_exact() {
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<devops-config version="1.0">
    <application>
        <name>my-app</name>
        <version>1.0.0</version>
    </application>
    <environments>
        <environment>
            <name>dev</name>
            <services>
                <service>
                    <name>web</name>
                    <image>nginx</image>
                    <tag>alpine</tag>
                    <ports>
                        <port>
                            <host>8080</host>
                            <container>80</container>
                        </port>
                    </ports>
                    <environment>
                    </environment>
                </service>
            </services>
            <variables>
            </variables>
        </environment>
    </environments>
</devops-config>"#;

        assert_eq!(emit(&scenario()), expected);
    }

    #[test]
    fn test_emit_is_deterministic() {
        let doc = scenario();
        assert_eq!(emit(&doc), emit(&doc));
    }

    #[test]
    fn test_placeholders_and_description() {
        let mut doc = Document::new();
        let markup = emit(&doc);
        assert!(markup.contains("<name>my-app</name>"));
        assert!(markup.contains("<version>1.0.0</version>"));
        assert!(!markup.contains("<description>"));

        doc.application.description = String::from("Shop front");
        assert!(emit(&doc).contains("        <description>Shop front</description>\n"));
    }

    #[test]
    fn test_incomplete_ports_are_filtered() {
        let mut doc = scenario();
        doc.environments[0].services[0].ports.push(Port {
            host: String::from("9090"),
            ..Port::default()
        });
        doc.environments[0].services[0].ports.push(Port {
            container: String::from("443"),
            ..Port::default()
        });

        let markup = emit(&doc);
        assert_eq!(markup.matches("<port>").count(), 1);
        assert!(!markup.contains("9090"));
        assert!(!markup.contains("443"));
    }

    #[test]
    fn test_empty_ports_wrapper_still_emitted() {
        let mut doc = scenario();
        doc.environments[0].services[0].ports = vec![Port::default()];

        let markup = emit(&doc);
        assert!(markup.contains("                    <ports>\n                    </ports>"));
        assert!(!markup.contains("<port>"));
    }

    #[test]
    fn test_variables_filtered_in_order() {
        let mut doc = scenario();
        doc.environments[0].variables = vec![
            Variable::new("B", "2"),
            Variable::new("SKIPPED", ""),
            Variable::new("", "orphan"),
            Variable::new("A", "1"),
            Variable::new("B", "2"),
        ];
        doc.environments[0].services[0].environment = vec![Variable::new("LOG", "debug")];

        let markup = emit(&doc);
        assert_eq!(markup.matches("<variable>").count(), 4);
        assert!(!markup.contains("SKIPPED"));
        assert!(!markup.contains("orphan"));

        let b = markup.find("<name>B</name>").expect("B emitted");
        let a = markup.find("<name>A</name>").expect("A emitted");
        assert!(b < a);
        assert!(markup.contains(
            "                    <environment>\n                        <variable>\n                            <name>LOG</name>"
        ));
    }

    #[test]
    fn test_add_environment_then_emit() {
        let doc = FormEditor::new()
            .apply(&scenario(), Edit::AddEnvironment { name: String::from("staging") })
            .expect("add environment");

        let markup = emit(&doc);
        assert!(markup.contains(
            "        <environment>\n            <name>staging</name>\n            <services>\n            </services>\n            <variables>\n            </variables>\n        </environment>"
        ));
    }

    #[test]
    fn test_protocol_child_follows_protocol() {
        let editor = FormEditor::new();
        let set_protocol = |doc: &Document, value: &str| {
            editor
                .apply(
                    doc,
                    Edit::UpdatePort {
                        env: 0,
                        service: 0,
                        port: 0,
                        field: PortField::Protocol,
                        value: value.to_string(),
                    },
                )
                .expect("update port")
        };

        let udp = set_protocol(&scenario(), "udp");
        assert!(emit(&udp).contains("                            <protocol>udp</protocol>\n"));

        let tcp = set_protocol(&udp, "tcp");
        assert!(!emit(&tcp).contains("<protocol>"));
    }

    #[test]
    fn test_half_filled_variable_not_emitted() {
        let editor = FormEditor::new();
        let doc = editor
            .apply(&scenario(), Edit::AddServiceVariable { env: 0, service: 0 })
            .expect("add variable");
        let doc = editor
            .apply(
                &doc,
                Edit::UpdateServiceVariable {
                    env: 0,
                    service: 0,
                    variable: 0,
                    field: VariableField::Name,
                    value: String::from("API_KEY"),
                },
            )
            .expect("name variable");

        let markup = emit(&doc);
        assert!(!markup.contains("<variable>"));
        assert!(!markup.contains("API_KEY"));
    }

    #[test]
    fn test_optional_service_fields() {
        let mut doc = scenario();
        let service = &mut doc.environments[0].services[0];
        service.command = String::from("npm start");
        service.replicas = String::from("3");

        let markup = emit(&doc);
        assert!(markup.contains("<command>npm start</command>"));
        assert!(markup.contains("<replicas>3</replicas>"));
        assert!(!markup.contains("<working_dir>"));

        let command = markup.find("<command>").expect("command");
        let ports_end = markup.find("</ports>").expect("ports");
        assert!(ports_end < command);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = scenario();
        doc.environments[0].services[0].command = String::from("a && b < c");
        assert!(emit(&doc).contains("<command>a &amp;&amp; b &lt; c</command>"));
    }

    #[test]
    fn test_forbidden_characters_are_dropped() {
        let mut doc = scenario();
        doc.environments[0].services[0].command = String::from("run\u{1}\u{FFFE} --fast\tnow");
        assert!(emit(&doc).contains("<command>run --fast\tnow</command>"));
    }

    #[test]
    fn test_no_trailing_newline() {
        assert!(emit(&scenario()).ends_with("</devops-config>"));
    }
}
