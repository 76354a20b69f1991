//! Write rules: which elements are written, and how.
//!
//! A rule is looked up by the element's tag key (such as `"00100010"`),
//! then by its dictionary alias (such as `"PatientName"`),
//! then by its group name (such as `"Patient"`),
//! and finally falls back to the `default` rule.
use crate::error::*;
use dwv_core::dictionary::DataDictionaryEntry;
use dwv_core::value::{DataSetSequence, PrimitiveValue, Value, C};
use dwv_core::{DataDictionary, DataElement, DataSet, Header, Tag, VR};
use dwv_dictionary_std::{group_name, tags, StandardDataDictionary};
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The key of the fallback rule.
pub const DEFAULT_KEY: &str = "default";

/// What to do with an element when writing.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum Action {
    /// Write the element as is.
    Copy,
    /// Leave the element out.
    Remove,
    /// Write the element with an empty value.
    Clear,
    /// Write the element with the value of the rule.
    Replace,
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Action::Copy),
            "remove" => Ok(Action::Remove),
            "clear" => Ok(Action::Clear),
            "replace" => Ok(Action::Replace),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Action::Copy => "copy",
            Action::Remove => "remove",
            Action::Clear => "clear",
            Action::Replace => "replace",
        })
    }
}

/// A single write rule.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRule {
    pub action: Action,
    /// The new value, for [`Action::Replace`].
    pub value: Option<PrimitiveValue>,
}

impl WriteRule {
    pub fn copy() -> Self {
        WriteRule {
            action: Action::Copy,
            value: None,
        }
    }

    pub fn remove() -> Self {
        WriteRule {
            action: Action::Remove,
            value: None,
        }
    }

    pub fn clear() -> Self {
        WriteRule {
            action: Action::Clear,
            value: None,
        }
    }

    pub fn replace(value: impl Into<PrimitiveValue>) -> Self {
        WriteRule {
            action: Action::Replace,
            value: Some(value.into()),
        }
    }
}

/// The rule as written in JSON.
#[derive(Debug, Deserialize)]
struct RawRule {
    action: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

/// Convert a JSON rule value into a primitive value.
fn json_to_primitive(value: &serde_json::Value) -> PrimitiveValue {
    use serde_json::Value as Json;
    match value {
        Json::Null => PrimitiveValue::Empty,
        Json::Bool(b) => PrimitiveValue::from(if *b { "true" } else { "false" }),
        Json::String(s) => PrimitiveValue::from(s.as_str()),
        Json::Number(n) => match n.as_i64() {
            Some(i) => PrimitiveValue::from(i),
            None => PrimitiveValue::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::Array(values) => {
            if values.iter().all(|v| v.is_i64()) {
                PrimitiveValue::I64(values.iter().filter_map(|v| v.as_i64()).collect())
            } else if values.iter().all(|v| v.is_number()) {
                PrimitiveValue::F64(values.iter().filter_map(|v| v.as_f64()).collect())
            } else {
                PrimitiveValue::Strs(
                    values
                        .iter()
                        .map(|v| match v {
                            Json::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                )
            }
        }
        Json::Object(_) => PrimitiveValue::from(value.to_string()),
    }
}

/// A set of write rules keyed by tag, alias or group name.
///
/// A `default` rule always exists, copying elements unless replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRules {
    rules: HashMap<String, WriteRule>,
}

impl Default for WriteRules {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(DEFAULT_KEY.to_string(), WriteRule::copy());
        WriteRules { rules }
    }
}

impl WriteRules {
    /// Rules which copy every element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule from its textual action.
    ///
    /// Fails with [`ErrorKind::InvalidRuleAction`]
    /// if the action is not one of
    /// `copy`, `remove`, `clear` or `replace`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        action: &str,
        value: Option<PrimitiveValue>,
    ) -> Result<&mut Self> {
        let key = key.into();
        let action: Action = action.parse().map_err(|_| {
            InvalidRuleActionSnafu {
                key: key.clone(),
                action,
            }
            .build()
        })?;
        self.rules.insert(key, WriteRule { action, value });
        Ok(self)
    }

    /// Register a rule.
    pub fn with_rule(mut self, key: impl Into<String>, rule: WriteRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    /// Parse rules from JSON of the form
    /// `{"key": {"action": "...", "value": ...}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, RawRule> = serde_json::from_str(json).context(ParseRulesSnafu)?;
        let mut rules = WriteRules::new();
        for (key, rule) in raw {
            let value = rule.value.as_ref().map(json_to_primitive);
            rules.insert(key, &rule.action, value)?;
        }
        Ok(rules)
    }

    /// The rules replacing or clearing identifying attributes.
    pub fn anonymise() -> Self {
        let mut rules = WriteRules::new()
            .with_rule("PatientName", WriteRule::replace("Anonymized"))
            .with_rule("PatientID", WriteRule::replace("Anonymized"));
        for tag in IDENTIFYING_TAGS {
            rules = rules.with_rule(tag.key(), WriteRule::clear());
        }
        rules
    }

    pub fn get(&self, key: &str) -> Option<&WriteRule> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the rule applying to an element.
    pub fn rule_for(&self, tag: Tag) -> &WriteRule {
        static COPY: WriteRule = WriteRule {
            action: Action::Copy,
            value: None,
        };
        self.rules
            .get(&tag.key())
            .or_else(|| {
                StandardDataDictionary
                    .by_tag(tag)
                    .filter(|entry| entry.tag() == tag)
                    .and_then(|entry| self.rules.get(entry.alias()))
            })
            .or_else(|| group_name(tag.0).and_then(|name| self.rules.get(name)))
            .or_else(|| self.rules.get(DEFAULT_KEY))
            .unwrap_or(&COPY)
    }

    /// Apply the rules to a data set, descending into sequence items.
    pub fn apply(&self, dataset: &DataSet) -> DataSet {
        dataset
            .iter()
            .filter_map(|element| self.apply_element(element))
            .collect()
    }

    fn apply_element(&self, element: &DataElement) -> Option<DataElement> {
        let rule = self.rule_for(element.tag());
        match rule.action {
            Action::Remove => None,
            Action::Copy => match element.value() {
                Value::Sequence(seq) => {
                    let items: C<DataSet> = seq.items().iter().map(|item| self.apply(item)).collect();
                    Some(element.with_value(DataSetSequence::new(items, seq.length())))
                }
                _ => Some(element.clone()),
            },
            Action::Clear => Some(match element.value() {
                Value::Sequence(_) => DataElement::new(
                    element.tag(),
                    element.vr(),
                    DataSetSequence::undefined(C::new()),
                ),
                _ => DataElement::empty(element.tag(), element.vr()),
            }),
            Action::Replace => {
                let value = rule.value.clone().unwrap_or(PrimitiveValue::Empty);
                let vr = match element.vr() {
                    VR::SQ => VR::UN,
                    vr => vr,
                };
                Some(DataElement::new(element.tag(), vr, value))
            }
        }
    }
}

/// Attributes cleared by [`WriteRules::anonymise`],
/// besides the patient name and ID which are replaced.
const IDENTIFYING_TAGS: &[Tag] = &[
    tags::ACCESSION_NUMBER,
    tags::INSTITUTION_NAME,
    tags::INSTITUTION_ADDRESS,
    tags::INSTITUTIONAL_DEPARTMENT_NAME,
    tags::REFERRING_PHYSICIAN_NAME,
    tags::REFERRING_PHYSICIAN_ADDRESS,
    tags::REFERRING_PHYSICIAN_TELEPHONE_NUMBERS,
    tags::STATION_NAME,
    tags::STUDY_DESCRIPTION,
    tags::SERIES_DESCRIPTION,
    tags::PHYSICIANS_OF_RECORD,
    tags::PERFORMING_PHYSICIAN_NAME,
    tags::NAME_OF_PHYSICIANS_READING_STUDY,
    tags::OPERATORS_NAME,
    tags::REQUESTING_PHYSICIAN,
    tags::ISSUER_OF_PATIENT_ID,
    tags::PATIENT_BIRTH_DATE,
    tags::PATIENT_BIRTH_TIME,
    tags::OTHER_PATIENT_I_DS,
    tags::OTHER_PATIENT_NAMES,
    tags::OTHER_PATIENT_I_DS_SEQUENCE,
    tags::PATIENT_ADDRESS,
    tags::PATIENT_TELEPHONE_NUMBERS,
    tags::PATIENT_COMMENTS,
    tags::DEVICE_SERIAL_NUMBER,
    tags::PROTOCOL_NAME,
    tags::STUDY_ID,
    tags::IMAGE_COMMENTS,
    tags::REQUEST_ATTRIBUTES_SEQUENCE,
    tags::CONTENT_SEQUENCE,
];
