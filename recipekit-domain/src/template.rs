use crate::error::SpecError;
use crate::spec::Spec;

/// A string with `{dep:NAME}`, `{variant:NAME}`, `{prefix}` and `{version}`
/// placeholders, rendered against a spec.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(&'static str);

impl Template {
    pub const fn new(raw: &'static str) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &'static str {
        self.0
    }

    pub fn render(&self, spec: &Spec) -> Result<String, SpecError> {
        let err = |reason: String| SpecError::Template {
            template: self.0.to_string(),
            reason,
        };

        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0;
        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix("{{") {
                out.push('{');
                rest = after;
                continue;
            }
            if let Some(after) = tail.strip_prefix("}}") {
                out.push('}');
                rest = after;
                continue;
            }
            if tail.starts_with('}') {
                return Err(err("unmatched '}'".to_string()));
            }
            let end = tail
                .find('}')
                .ok_or_else(|| err("unterminated placeholder".to_string()))?;
            let key = &tail[1..end];
            out.push_str(&self.lookup(key, spec).map_err(|e| match e {
                SpecError::Template { reason, .. } => err(reason),
                other => other,
            })?);
            rest = &tail[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn lookup(&self, key: &str, spec: &Spec) -> Result<String, SpecError> {
        match key.split_once(':') {
            Some(("dep", name)) => Ok(spec.dep_prefix(name)?.to_string()),
            Some(("variant", name)) => spec
                .variant(name)
                .map(ToString::to_string)
                .ok_or_else(|| SpecError::Template {
                    template: self.0.to_string(),
                    reason: format!("unknown variant '{name}'"),
                }),
            None if key == "prefix" => Ok(spec.prefix().to_string()),
            None if key == "version" => Ok(spec.version().to_string()),
            _ => Err(SpecError::Template {
                template: self.0.to_string(),
                reason: format!("unknown placeholder '{{{key}}}'"),
            }),
        }
    }
}
