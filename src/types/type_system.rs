//! Type System for Caju

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Caju type.
///
/// Types compare by structural equality only: there is no subtyping and no
/// coercion between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// `numero`
    Number,
    /// `caractere`
    Character,
    /// `booleano`
    Boolean,
    /// `vazio`
    Void,
    /// Sentinel for an expression that could not be typed after an earlier error
    Unknown,
    /// `vetor[T]`
    Array(Box<Type>),
    /// Signature of a declared function
    Function { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    /// Create an array type
    pub fn array(elem: Type) -> Self {
        Self::Array(Box::new(elem))
    }

    /// Create a function signature type
    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Self::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// Element type of an array, `None` for every other type
    pub fn element(&self) -> Option<&Type> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Check whether a value of type `got` may stand where `self` is expected.
    ///
    /// Exact equality, except that `Unknown` on either side is accepted so an
    /// error already reported upstream does not cascade.
    pub fn accepts(&self, got: &Type) -> bool {
        self.is_unknown() || got.is_unknown() || self == got
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "numero"),
            Self::Character => write!(f, "caractere"),
            Self::Boolean => write!(f, "booleano"),
            Self::Void => write!(f, "vazio"),
            Self::Unknown => write!(f, "desconhecido"),
            Self::Array(elem) => write!(f, "vetor[{}]", elem),
            Self::Function { params, ret } => {
                write!(f, "funcao(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, "): {}", ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_uses_source_spelling() {
        assert_eq!(Type::Number.to_string(), "numero");
        assert_eq!(Type::array(Type::Character).to_string(), "vetor[caractere]");
        assert_eq!(
            Type::function(vec![Type::Number, Type::Boolean], Type::Void).to_string(),
            "funcao(numero, booleano): vazio"
        );
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Type::array(Type::Number), Type::array(Type::Number));
        assert_ne!(Type::array(Type::Number), Type::array(Type::Boolean));
        assert_ne!(Type::Number, Type::Character);
    }

    #[test]
    fn test_unknown_is_accepted_both_ways() {
        assert!(Type::Number.accepts(&Type::Unknown));
        assert!(Type::Unknown.accepts(&Type::Boolean));
        assert!(!Type::Number.accepts(&Type::Boolean));
    }

    #[test]
    fn test_element_of_array() {
        assert_eq!(Type::array(Type::Number).element(), Some(&Type::Number));
        assert_eq!(Type::Number.element(), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Type::array(Type::Number)).unwrap();
        assert_eq!(json, serde_json::json!({ "array": "number" }));
        let back: Type = serde_json::from_value(serde_json::json!("boolean")).unwrap();
        assert_eq!(back, Type::Boolean);
    }
}
