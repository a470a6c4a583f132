//! Statement tokenizing for canonical Puppetfile lines.
//!
//! Classifies each canonical line into a typed [`Statement`] and extracts raw
//! arguments and attribute key/value pairs in declaration order. No semantic
//! interpretation happens here beyond the lexical shape of values; module
//! semantics are applied by the builder.

use crate::normalize::CanonicalLine;
use crate::puppetfile::PuppetfileError;

/// Lexical value of a `:key => value` attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Single-quoted string literal.
    Str(String),
    /// Bare `true` / `false`.
    Bool(bool),
    /// The `:control_branch` symbol, resolved by the builder against the
    /// caller-supplied control-repo branch.
    ControlBranch,
}

/// One attribute pair as written, order-preserving and uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub key: String,
    pub value: AttrValue,
}

/// A classified canonical statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `mod '<name>'[, '<version>'][, :attr => value, ...]`
    Module {
        name: String,
        version: Option<String>,
        attributes: Vec<RawAttribute>,
    },
    /// `forge.baseUrl '<url>'`
    ForgeBaseUrl(String),
    /// `forge.cacheTtl <duration-literal>`, kept raw so diagnostics can
    /// quote the offending value.
    ForgeCacheTtl(String),
    /// `moduledir '<path>'`
    ModuleDir(String),
}

/// Classify one canonical line.
pub fn tokenize(line: &CanonicalLine, file: &str) -> Result<Statement, PuppetfileError> {
    let text = line.text.as_str();
    let (keyword, rest) = match text.split_once(char::is_whitespace) {
        Some((k, r)) => (k, r.trim()),
        None => (text, ""),
    };

    match keyword {
        "mod" => tokenize_module(rest, line, file),
        "forge.baseUrl" => Ok(Statement::ForgeBaseUrl(directive_arg(
            rest,
            "forge.baseUrl",
            line,
            file,
        )?)),
        "forge.cacheTtl" => Ok(Statement::ForgeCacheTtl(directive_arg(
            rest,
            "forge.cacheTtl",
            line,
            file,
        )?)),
        "moduledir" => Ok(Statement::ModuleDir(directive_arg(
            rest,
            "moduledir",
            line,
            file,
        )?)),
        _ => Err(PuppetfileError::UnrecognizedStatement {
            file: file.to_owned(),
            line: line.text.clone(),
        }),
    }
}

fn directive_arg(
    rest: &str,
    directive: &str,
    line: &CanonicalLine,
    file: &str,
) -> Result<String, PuppetfileError> {
    if rest.is_empty() {
        return Err(malformed(
            format!("missing argument to {directive}"),
            line,
            file,
        ));
    }
    Ok(unquote(rest).unwrap_or(rest).to_owned())
}

fn tokenize_module(
    rest: &str,
    line: &CanonicalLine,
    file: &str,
) -> Result<Statement, PuppetfileError> {
    if rest.is_empty() {
        return Err(malformed("missing module name".to_owned(), line, file));
    }
    let args = split_args(rest);

    let Some(name) = args.first().and_then(|first| unquote(first)) else {
        return Err(malformed(
            "module name must be a quoted string".to_owned(),
            line,
            file,
        ));
    };

    let mut version: Option<String> = None;
    let mut attributes: Vec<RawAttribute> = Vec::new();

    for arg in &args[1..] {
        if arg.is_empty() {
            return Err(malformed(
                "empty argument (dangling comma)".to_owned(),
                line,
                file,
            ));
        }
        match parse_attribute(arg) {
            Some(Ok(pair)) => {
                attributes.push(pair);
                continue;
            }
            Some(Err(reason)) => return Err(malformed(reason, line, file)),
            None => {}
        }
        let literal = match unquote(arg) {
            Some(quoted) => quoted,
            // `:latest` / `:present` may also appear as bare symbols.
            None => match *arg {
                ":latest" => "latest",
                ":present" => "present",
                _ => {
                    return Err(malformed(
                        format!("expected ':key => value' attribute, got '{arg}'"),
                        line,
                        file,
                    ))
                }
            },
        };
        if version.is_some() {
            return Err(malformed(
                "more than one version literal".to_owned(),
                line,
                file,
            ));
        }
        if !attributes.is_empty() {
            return Err(malformed(
                "version literal must precede attributes".to_owned(),
                line,
                file,
            ));
        }
        version = Some(literal.to_owned());
    }

    Ok(Statement::Module {
        name: name.to_owned(),
        version,
        attributes,
    })
}

fn parse_attribute(arg: &str) -> Option<Result<RawAttribute, String>> {
    let body = arg.strip_prefix(':')?;
    let (raw_key, raw_value) = body.split_once("=>")?;
    Some(build_attribute(raw_key.trim(), raw_value.trim()))
}

fn build_attribute(key: &str, value: &str) -> Result<RawAttribute, String> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(format!("invalid attribute key ':{key}'"));
    }
    let value = match value {
        "true" => AttrValue::Bool(true),
        "false" => AttrValue::Bool(false),
        ":control_branch" => AttrValue::ControlBranch,
        other => match unquote(other) {
            Some(quoted) => AttrValue::Str(quoted.to_owned()),
            None => return Err(format!("unsupported value '{other}' for attribute :{key}")),
        },
    };
    Ok(RawAttribute {
        key: key.to_owned(),
        value,
    })
}

fn malformed(reason: String, line: &CanonicalLine, file: &str) -> PuppetfileError {
    PuppetfileError::MalformedStatement {
        reason,
        file: file.to_owned(),
        line: line.text.clone(),
    }
}

/// Split on commas outside single-quoted strings, trimming each segment.
fn split_args(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    for (pos, c) in input.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            ',' if !in_quote => {
                parts.push(input[start..pos].trim());
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('\'')?.strip_suffix('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(text: &str) -> CanonicalLine {
        CanonicalLine {
            source_line: 1,
            text: text.to_owned(),
        }
    }

    fn tokenize_ok(text: &str) -> Statement {
        tokenize(&canonical(text), "Puppetfile").unwrap()
    }

    #[test]
    fn classifies_directives() {
        assert_eq!(
            tokenize_ok("forge.baseUrl 'https://forge.example.com'"),
            Statement::ForgeBaseUrl("https://forge.example.com".to_owned())
        );
        assert_eq!(
            tokenize_ok("forge.cacheTtl 50m"),
            Statement::ForgeCacheTtl("50m".to_owned())
        );
        assert_eq!(
            tokenize_ok("moduledir 'external_modules'"),
            Statement::ModuleDir("external_modules".to_owned())
        );
    }

    #[test]
    fn module_with_version_literal() {
        assert_eq!(
            tokenize_ok("mod 'puppetlabs/apt', '2.3.0'"),
            Statement::Module {
                name: "puppetlabs/apt".to_owned(),
                version: Some("2.3.0".to_owned()),
                attributes: Vec::new(),
            }
        );
    }

    #[test]
    fn module_with_symbol_version() {
        assert_eq!(
            tokenize_ok("mod 'puppetlabs/stdlib', :latest"),
            Statement::Module {
                name: "puppetlabs/stdlib".to_owned(),
                version: Some("latest".to_owned()),
                attributes: Vec::new(),
            }
        );
    }

    #[test]
    fn module_with_attributes_preserves_order() {
        let Statement::Module {
            name, attributes, ..
        } = tokenize_ok(
            "mod 'sensu',:git => 'https://github.com/sensu/sensu-puppet.git',:commit => '8f4fc578',:link => true",
        )
        else {
            panic!("expected module statement");
        };
        assert_eq!(name, "sensu");
        let keys: Vec<&str> = attributes.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["git", "commit", "link"]);
        assert_eq!(attributes[2].value, AttrValue::Bool(true));
    }

    #[test]
    fn control_branch_symbol_value() {
        let Statement::Module { attributes, .. } =
            tokenize_ok("mod 'profiles',:git => 'git@example.com/p.git',:branch => :control_branch")
        else {
            panic!("expected module statement");
        };
        assert_eq!(attributes[1].value, AttrValue::ControlBranch);
    }

    #[test]
    fn comma_inside_quotes_is_not_a_separator() {
        let Statement::Module { attributes, .. } =
            tokenize_ok("mod 'odd',:git => 'https://example.com/a,b.git'")
        else {
            panic!("expected module statement");
        };
        assert_eq!(
            attributes[0].value,
            AttrValue::Str("https://example.com/a,b.git".to_owned())
        );
    }

    #[test]
    fn dangling_comma_is_fatal() {
        let err = tokenize(
            &canonical("mod 'foo',:git => 'https://example.com/foo.git',"),
            "Puppetfile",
        )
        .unwrap_err();
        assert!(matches!(err, PuppetfileError::MalformedStatement { .. }));
    }

    #[test]
    fn unjoined_attribute_line_is_unrecognized() {
        // A continuation line whose predecessor lacked the trailing comma.
        let err = tokenize(&canonical(":git => 'https://example.com/foo.git'"), "pf").unwrap_err();
        assert!(matches!(
            err,
            PuppetfileError::UnrecognizedStatement { .. }
        ));
    }

    #[test]
    fn version_after_attributes_is_fatal() {
        let err = tokenize(
            &canonical("mod 'foo',:git => 'https://example.com/foo.git', '1.0.0'"),
            "pf",
        )
        .unwrap_err();
        assert!(matches!(err, PuppetfileError::MalformedStatement { .. }));
    }

    #[test]
    fn unquoted_module_name_is_fatal() {
        let err = tokenize(&canonical("mod foo"), "pf").unwrap_err();
        assert!(matches!(err, PuppetfileError::MalformedStatement { .. }));
    }
}
