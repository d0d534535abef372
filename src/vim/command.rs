//! esxcli command descriptor and schema-driven argument coercion.
//!
//! A raw argv like `["system","settings","advanced","set","-o","/Net/X"]`
//! splits into a dotted namespace (`system.settings.advanced`), a method name
//! (`set`), and flag tokens. The flag tokens are coerced against the
//! parameter schema fetched at call time and emitted as tag-wrapped SOAP
//! arguments in canonical (byte-wise ascending) name order. The remote
//! endpoint requires that ordering, it is not cosmetic.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{Result, VimError};

/// Wire type of one schema parameter, dispatched by a finite switch instead
/// of runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    Boolean,
    Integer,
    String,
    Other,
}

impl WireType {
    /// Map the describe response's type string onto a wire type.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "boolean" => WireType::Boolean,
            "byte" | "short" | "int" | "integer" | "long" => WireType::Integer,
            "string" => WireType::String,
            _ => WireType::Other,
        }
    }
}

/// One entry of a method's parameter schema.
#[derive(Debug, Clone, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub wire_type: WireType,
}

/// One typed, tag-wrapped RPC argument, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoapArgument {
    pub name: String,
    pub val: String,
}

/// Wrap an already-encoded value in an element tagged with the parameter
/// name: `option` + `/Net/X` becomes `<option>/Net/X</option>`.
pub fn soap_argument(name: &str, val: &str) -> SoapArgument {
    SoapArgument {
        name: name.to_string(),
        val: format!("<{name}>{val}</{name}>"),
    }
}

/// Management handle id for a namespace: dots become dashes under the fixed
/// `ha-cli-handler-` prefix.
pub fn cli_handler_moid(namespace: &str) -> String {
    format!("ha-cli-handler-{}", namespace.replace('.', "-"))
}

/// Escape wire metacharacters in a string value before tag wrapping.
fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A parsed esxcli command line: namespace + method name + raw flag tokens.
///
/// Constructed once per raw argument list; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Command {
    namespace: String,
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Split raw argv: the leading run of non-flag tokens is the command
    /// path (namespace + method name), the rest are flag tokens.
    pub fn new(args: &[String]) -> Result<Self> {
        let path_len = args
            .iter()
            .position(|a| a.starts_with('-'))
            .unwrap_or(args.len());

        if path_len < 2 {
            return Err(VimError::Argument(
                "esxcli command requires a namespace and a method name".into(),
            ));
        }

        Ok(Command {
            namespace: args[..path_len - 1].join("."),
            name: args[path_len - 1].clone(),
            args: args[path_len..].to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully-qualified remote method identifier.
    pub fn method(&self) -> String {
        format!("vim.EsxCLI.{}.{}", self.namespace, self.name)
    }

    /// Management handle identifier derived from the namespace.
    pub fn moid(&self) -> String {
        cli_handler_moid(&self.namespace)
    }

    /// Coerce the flag tokens against `params` into wire arguments.
    ///
    /// A `-name` (or `--name`) token matches case-sensitively against the
    /// full parameter name, else against a unique first-letter alias.
    /// Boolean parameters are presence flags; every other type consumes the
    /// following token as its value. Output is sorted ascending by parameter
    /// name and omits unset parameters.
    pub fn parse(&self, params: &[ParamInfo]) -> Result<Vec<SoapArgument>> {
        let mut values: BTreeMap<&str, (WireType, String)> = BTreeMap::new();

        let mut iter = self.args.iter();
        while let Some(token) = iter.next() {
            let Some(flag) = token.strip_prefix('-') else {
                return Err(VimError::Argument(format!("unexpected argument: '{token}'")));
            };
            let flag = flag.strip_prefix('-').unwrap_or(flag);

            let param = lookup_param(params, flag)?;

            let raw = match param.wire_type {
                WireType::Boolean => "true".to_string(),
                _ => iter
                    .next()
                    .ok_or_else(|| {
                        VimError::Argument(format!("option '-{flag}' requires a value"))
                    })?
                    .clone(),
            };

            if param.wire_type == WireType::Integer && !is_integer_literal(&raw) {
                return Err(VimError::Argument(format!(
                    "invalid integer value for '-{flag}': '{raw}'"
                )));
            }

            // Last occurrence wins for repeated flags.
            values.insert(param.name.as_str(), (param.wire_type, raw));
        }

        Ok(values
            .into_iter()
            .map(|(name, (wire_type, raw))| match wire_type {
                WireType::String => soap_argument(name, &xml_escape(&raw)),
                _ => soap_argument(name, &raw),
            })
            .collect())
    }
}

fn lookup_param<'a>(params: &'a [ParamInfo], flag: &str) -> Result<&'a ParamInfo> {
    if let Some(param) = params.iter().find(|p| p.name == flag) {
        return Ok(param);
    }

    if flag.len() == 1 {
        let first = flag.as_bytes()[0];
        let mut aliased = params.iter().filter(|p| p.name.as_bytes().first() == Some(&first));
        if let Some(param) = aliased.next() {
            if aliased.next().is_some() {
                return Err(VimError::Argument(format!("ambiguous option: '-{flag}'")));
            }
            return Ok(param);
        }
    }

    Err(VimError::Argument(format!("unknown option: '-{flag}'")))
}
