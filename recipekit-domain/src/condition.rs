use crate::spec::Spec;
use std::fmt;

/// A predicate over a resolved spec, written the way spec strings read:
/// `+claw`, `~openmp`, `host=daint`, `%gcc`, `@ham`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    Enabled(&'static str),
    Disabled(&'static str),
    Equals(&'static str, &'static str),
    NotEquals(&'static str, &'static str),
    Compiler(&'static str),
    Version(&'static str),
    All(Vec<Condition>),
}

impl Condition {
    pub fn holds(&self, spec: &Spec) -> bool {
        match self {
            Condition::Always => true,
            Condition::Enabled(name) => spec.enabled(name),
            Condition::Disabled(name) => spec
                .variant(name)
                .and_then(|v| v.as_bool())
                .is_some_and(|b| !b),
            Condition::Equals(name, value) => spec.variant(name).is_some_and(|v| v.has(value)),
            Condition::NotEquals(name, value) => spec.variant(name).is_some_and(|v| !v.has(value)),
            Condition::Compiler(name) => spec.compiler().name == *name,
            Condition::Version(name) => spec.version() == *name,
            Condition::All(conds) => conds.iter().all(|c| c.holds(spec)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("*"),
            Condition::Enabled(name) => write!(f, "+{name}"),
            Condition::Disabled(name) => write!(f, "~{name}"),
            Condition::Equals(name, value) => write!(f, "{name}={value}"),
            Condition::NotEquals(name, value) => write!(f, "{name}!={value}"),
            Condition::Compiler(name) => write!(f, "%{name}"),
            Condition::Version(name) => write!(f, "@{name}"),
            Condition::All(conds) => {
                let parts: Vec<String> = conds.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Condition;

    #[test]
    fn display_uses_spec_syntax() {
        let c = Condition::All(vec![
            Condition::Enabled("claw"),
            Condition::Compiler("intel"),
            Condition::Equals("host", "daint"),
        ]);
        assert_eq!(c.to_string(), "+claw %intel host=daint");
        assert_eq!(Condition::Disabled("openmp").to_string(), "~openmp");
        assert_eq!(Condition::Version("ham").to_string(), "@ham");
    }
}
