use serde::{Deserialize, Serialize};

/// Element classes the pipeline can resolve on an engine session.
///
/// A typed selector instead of the engine's stringly class patterns; the
/// session decides how each class maps onto its own model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementClass {
    Generator,
    Line,
    Transformer,
    Load,
}

impl ElementClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementClass::Generator => "generator",
            ElementClass::Line => "line",
            ElementClass::Transformer => "transformer",
            ElementClass::Load => "load",
        }
    }
}

/// Variables to sample for every element of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalGroup {
    pub class: ElementClass,
    pub variables: Vec<String>,
}

/// The monitored-signal specification for a whole sweep.
///
/// Group order and variable order are preserved: they fix the column order
/// of the exported result table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub groups: Vec<SignalGroup>,
}

impl SignalSpec {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.variables.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_class_round_trips_snake_case() {
        let json = serde_json::to_string(&ElementClass::Generator).unwrap();
        assert_eq!(json, "\"generator\"");
        let parsed: ElementClass = serde_json::from_str("\"load\"").unwrap();
        assert_eq!(parsed, ElementClass::Load);
    }

    #[test]
    fn empty_spec_is_detected() {
        let spec = SignalSpec::default();
        assert!(spec.is_empty());
        let spec = SignalSpec {
            groups: vec![SignalGroup {
                class: ElementClass::Generator,
                variables: vec!["s:outofstep".into()],
            }],
        };
        assert!(!spec.is_empty());
    }
}
