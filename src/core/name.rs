//! Hierarchical diagnostic names for allocated gates.
//!
//! A name is built while instantiation descends through composite prototypes:
//! every composite level appends `[type] ` and, when the placement carries a
//! label, `{label}: `. The primitive gate finally appends its own `[type] `.

use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GateName(String);

impl GateName {
    pub fn root() -> Self {
        Self::default()
    }

    /// Starts from an arbitrary caller supplied prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn with_type(&self, type_name: &str) -> Self {
        let mut name = self.clone();
        name.0.push('[');
        name.0.push_str(type_name);
        name.0.push_str("] ");
        name
    }

    pub fn with_child(&self, label: &str) -> Self {
        let mut name = self.clone();
        name.0.push('{');
        name.0.push_str(label);
        name.0.push_str("}: ");
        name
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim_end())
    }
}

impl From<GateName> for String {
    fn from(name: GateName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_types_and_labels() {
        let name = GateName::root()
            .with_type("clock halver")
            .with_child("down detector")
            .with_type("falling edge detector")
            .with_type("register");

        assert_eq!(
            name.as_str(),
            "[clock halver] {down detector}: [falling edge detector] [register] "
        );
        assert_eq!(
            name.to_string(),
            "[clock halver] {down detector}: [falling edge detector] [register]"
        );
    }

    #[test]
    fn builders_do_not_mutate_parent() {
        let parent = GateName::with_prefix("top ");
        let _child = parent.with_type("nand");
        assert_eq!(parent.as_str(), "top ");
    }
}
