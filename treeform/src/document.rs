//! Output tree and its XML rendering
//!
//! Rules build [`Element`]s and append them under the [`Document`] root. The
//! tree is only ever appended to; rendering walks it once.
//!
//! ## Format
//!
//! - Attributes keep insertion order
//! - Elements without children are self-closing
//! - Children are indented one level per depth
//! - Newlines, carriage returns and tabs in attribute values are written as
//!   character references so parsers do not normalize them to spaces
//! - Characters XML 1.0 cannot carry at all (C0 controls other than the three
//!   above, U+FFFE, U+FFFF) are replaced with U+FFFD
//!
//! ## Example
//!
//! ```text
//! <objects>
//!   <object id="2" type="string" value="a"/>
//!   <object id="1" type="list" declaredElementType="string">
//!     <element ref="2"/>
//!   </object>
//! </objects>
//! ```

use serde::Serialize;

/// A node of the output tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute, keeping insertion order
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.attributes.iter().position(|(existing, _)| *existing == name) {
            Some(index) => self.attributes[index].1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }
}

/// Rendering knobs for [`Document::to_xml`]
#[derive(Debug, Clone, PartialEq)]
pub struct XmlOptions {
    /// String repeated once per nesting level
    pub indent: String,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first
    pub declaration: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            declaration: false,
        }
    }
}

/// Output document: a single root element that collects every node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    root: Element,
}

impl Document {
    pub const DEFAULT_ROOT_TAG: &'static str = "objects";

    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            root: Element::new(root_tag),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Append a node under the root
    pub fn append(&mut self, element: Element) {
        self.root.append(element);
    }

    /// Find the node carrying `id="<id>"` directly under the root
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.root
            .children
            .iter()
            .find(|element| element.attribute("id") == Some(id))
    }

    /// Render the document as XML text
    pub fn to_xml(&self, options: &XmlOptions) -> String {
        let mut writer = XmlWriter::new(options);
        if options.declaration {
            writer.output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        writer.write_element(&self.root);
        writer.output
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROOT_TAG)
    }
}

struct XmlWriter<'a> {
    options: &'a XmlOptions,
    output: String,
    indent_level: usize,
}

impl<'a> XmlWriter<'a> {
    fn new(options: &'a XmlOptions) -> Self {
        Self {
            options,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent);
        }
    }

    fn write_element(&mut self, element: &Element) {
        self.push_indent();
        self.output.push('<');
        self.output.push_str(&element.tag);
        for (name, value) in &element.attributes {
            self.output.push(' ');
            self.output.push_str(name);
            self.output.push_str("=\"");
            self.output.push_str(&escape_xml(value));
            self.output.push('"');
        }

        if element.children.is_empty() {
            self.output.push_str("/>\n");
            return;
        }

        self.output.push_str(">\n");
        self.indent_level += 1;
        for child in &element.children {
            self.write_element(child);
        }
        self.indent_level -= 1;
        self.push_indent();
        self.output.push_str("</");
        self.output.push_str(&element.tag);
        self.output.push_str(">\n");
    }
}

/// Escape a string for use in an attribute value
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                escaped.push(char::REPLACEMENT_CHARACTER)
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Whether `name` can be written as an XML element or attribute name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}
