use std::fmt;

use smallvec::SmallVec;

use crate::graph::pad::Pad;

/// Name of ffmpeg's passthrough video filter.
pub const PASSTHROUGH: &str = "null";

/// Scalar option value of a filter.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// Integer value.
    Int(i64),
    /// Floating-point value, printed with at most six decimals.
    Float(f64),
    /// Text value, escaped for the option parser and quoted for the graph parser.
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => {
                let rounded = (v * 1e6).round() / 1e6;
                // -0 would otherwise print as "-0".
                write!(f, "{}", if rounded == 0.0 { 0.0 } else { rounded })
            }
            Self::Text(s) => f.write_str(&escape_text(s)),
        }
    }
}

/// Escape a text value for both parsing levels ffmpeg applies to it.
///
/// The graph parser unquotes the whole option string first; the filter then splits what is
/// left on `:` and unescapes again.
fn escape_text(s: &str) -> String {
    const GRAPH_SPECIAL: &[char] = &['[', ']', ',', ';', '\'', '\\', ' ', '\t', '\n'];
    let mut option_level = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }
    if !option_level.contains(GRAPH_SPECIAL) {
        return option_level;
    }
    format!("'{}'", option_level.replace('\'', r"'\''"))
}

macro_rules! option_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for OptionValue {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

option_value_from_int!(i32, u32, i64);

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A filter request that is not yet attached to any pads.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    /// ffmpeg filter name.
    pub name: String,
    /// Options in emission order.
    pub options: Vec<(String, OptionValue)>,
}

impl Filter {
    /// Create a filter with no options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Append an option.
    pub fn opt(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// Append an option only when `value` is present.
    pub fn opt_some<V: Into<OptionValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.opt(key, v),
            None => self,
        }
    }

    /// Look up an option by key.
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Attach the filter to explicit pads.
    pub fn wire(
        self,
        inputs: impl IntoIterator<Item = Pad>,
        outputs: impl IntoIterator<Item = Pad>,
    ) -> FilterStage {
        FilterStage {
            name: self.name,
            options: self.options,
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }
}

/// A filter attached to pads. Empty pad lists mean the single implicit pad.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterStage {
    /// ffmpeg filter name.
    pub name: String,
    /// Options in emission order.
    pub options: Vec<(String, OptionValue)>,
    /// Consumed pads.
    pub inputs: SmallVec<[Pad; 2]>,
    /// Produced pads.
    pub outputs: SmallVec<[Pad; 2]>,
}

impl FilterStage {
    /// Return `true` when this stage forwards frames untouched.
    pub fn is_passthrough(&self) -> bool {
        self.name == PASSTHROUGH
    }

    /// Look up an option by key.
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "{pad}")?;
        }
        f.write_str(&self.name)?;
        for (i, (key, value)) in self.options.iter().enumerate() {
            let sep = if i == 0 { '=' } else { ':' };
            write!(f, "{sep}{key}={value}")?;
        }
        for pad in &self.outputs {
            write!(f, "{pad}")?;
        }
        Ok(())
    }
}

/// Serialize stages into ffmpeg's `-filter_complex` grammar.
pub fn serialize_graph(stages: &[FilterStage]) -> String {
    stages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
#[path = "../../tests/unit/graph/filter.rs"]
mod tests;
