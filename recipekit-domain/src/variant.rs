use crate::error::SpecError;
use recipekit_types::variant::VariantValue;

/// Allowed values for a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantDomain {
    Bool,
    Enum {
        values: &'static [&'static str],
        multi: bool,
    },
    /// Any single string (site names, test names, directories).
    Free,
}

/// A named, typed build option, declared once per recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDecl {
    pub name: &'static str,
    pub description: &'static str,
    pub domain: VariantDomain,
    pub default: VariantValue,
}

impl VariantDecl {
    pub fn boolean(name: &'static str, default: bool, description: &'static str) -> Self {
        Self {
            name,
            description,
            domain: VariantDomain::Bool,
            default: VariantValue::Bool(default),
        }
    }

    pub fn one_of(
        name: &'static str,
        values: &'static [&'static str],
        default: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            domain: VariantDomain::Enum {
                values,
                multi: false,
            },
            default: VariantValue::text(default),
        }
    }

    pub fn free(name: &'static str, default: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            domain: VariantDomain::Free,
            default: VariantValue::text(default),
        }
    }

    /// Check `value` against the domain, normalizing a lone string into a
    /// one-element list for multi-valued variants.
    pub fn validate(&self, value: VariantValue) -> Result<VariantValue, SpecError> {
        let invalid = |value: &VariantValue| SpecError::InvalidVariantValue {
            name: self.name.to_string(),
            value: value.to_string(),
            expected: self.expected(),
        };

        match (&self.domain, value) {
            (VariantDomain::Bool, v @ VariantValue::Bool(_)) => Ok(v),
            (VariantDomain::Free, v @ VariantValue::Text(_)) => Ok(v),
            (VariantDomain::Enum { values, multi }, VariantValue::Text(s)) => {
                if !values.contains(&s.as_str()) {
                    return Err(invalid(&VariantValue::Text(s)));
                }
                if *multi {
                    Ok(VariantValue::List(vec![s]))
                } else {
                    Ok(VariantValue::Text(s))
                }
            }
            (VariantDomain::Enum { values, multi: true }, VariantValue::List(vs)) => {
                match vs.iter().find(|v| !values.contains(&v.as_str())) {
                    Some(bad) => Err(invalid(&VariantValue::Text(bad.clone()))),
                    None => Ok(VariantValue::List(vs)),
                }
            }
            (_, v) => Err(invalid(&v)),
        }
    }

    fn expected(&self) -> String {
        match &self.domain {
            VariantDomain::Bool => "true or false".to_string(),
            VariantDomain::Enum { values, multi } => {
                let list = values.join(", ");
                if *multi {
                    format!("any of [{list}]")
                } else {
                    format!("one of [{list}]")
                }
            }
            VariantDomain::Free => "a string".to_string(),
        }
    }

    /// Short human description of the domain, used by `explain`.
    pub fn domain_label(&self) -> String {
        match &self.domain {
            VariantDomain::Bool => "bool".to_string(),
            VariantDomain::Enum { values, multi: false } => values.join("|"),
            VariantDomain::Enum { values, multi: true } => format!("[{}]", values.join(",")),
            VariantDomain::Free => "string".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGETS: &[&str] = &["gpu", "cpu"];

    #[test]
    fn enum_rejects_value_outside_domain() {
        let decl = VariantDecl::one_of("icon_target", TARGETS, "gpu", "target");
        let err = decl.validate(VariantValue::text("fpga")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'fpga' for variant 'icon_target': expected one of [gpu, cpu]"
        );
    }

    #[test]
    fn bool_rejects_string() {
        let decl = VariantDecl::boolean("claw", true, "claw");
        assert!(decl.validate(VariantValue::text("yes")).is_err());
        assert_eq!(
            decl.validate(VariantValue::Bool(false)).unwrap(),
            VariantValue::Bool(false)
        );
    }

    #[test]
    fn multi_enum_normalizes_single_string() {
        let decl = VariantDecl {
            name: "targets",
            description: "",
            domain: VariantDomain::Enum {
                values: TARGETS,
                multi: true,
            },
            default: VariantValue::List(vec![]),
        };
        assert_eq!(
            decl.validate(VariantValue::text("cpu")).unwrap(),
            VariantValue::List(vec!["cpu".into()])
        );
        assert!(
            decl.validate(VariantValue::List(vec!["cpu".into(), "tpu".into()]))
                .is_err()
        );
    }

    #[test]
    fn free_accepts_any_string() {
        let decl = VariantDecl::free("test_name", "none", "test");
        assert!(decl.validate(VariantValue::text("atm_amip_test")).is_ok());
        assert!(decl.validate(VariantValue::Bool(true)).is_err());
    }
}
