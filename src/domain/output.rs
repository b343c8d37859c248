use std::collections::BTreeMap;

/// One labeled representation of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    /// Lower-case machine name, e.g. `wif_uncompressed`
    pub key: String,
    /// Human label; defaults to the machine name with `_` replaced by spaces
    pub label: String,
    pub value: Option<String>,
}

impl OutputField {
    pub fn new(key: &str, value: Option<String>, label: Option<&str>) -> Self {
        let key = key.to_lowercase();
        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| key.replace('_', " "));
        Self {
            key,
            label,
            value: value.filter(|v| !v.is_empty()),
        }
    }
}

/// Ordered output for one resolved key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutput {
    fields: Vec<OutputField>,
}

impl KeyOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: OutputField) {
        self.fields.push(field);
    }

    /// Fields in emission order, label-only fields included
    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .and_then(|f| f.value.as_deref())
    }

    /// Valued fields keyed by machine name
    pub fn display_map(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|f| f.value.clone().map(|v| (f.key.clone(), v)))
            .collect()
    }
}
