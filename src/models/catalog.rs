use crate::error::{ProcessingError, Result};
use crate::utils::constants::SLOT_COLUMN_PREFIX;
use std::collections::HashMap;

/// Report column name for a 1-based slot, e.g. `Data 3`
pub fn slot_column_name(slot: usize) -> String {
    format!("{} {}", SLOT_COLUMN_PREFIX, slot)
}

/// Ordered parameter vocabulary of one station; slot = position + 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterCatalog {
    codes: Vec<String>,
    slots: HashMap<String, usize>,
}

impl ParameterCatalog {
    pub fn new<I, S>(station_id: &str, codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = Vec::new();
        let mut slots = HashMap::new();

        for code in codes {
            let code = code.as_ref().trim();
            if code.is_empty() {
                return Err(ProcessingError::Config(format!(
                    "Parameter catalog for {} contains a blank code",
                    station_id
                )));
            }
            if slots.insert(code.to_string(), ordered.len() + 1).is_some() {
                return Err(ProcessingError::DuplicateParameter {
                    station_id: station_id.to_string(),
                    code: code.to_string(),
                });
            }
            ordered.push(code.to_string());
        }

        if ordered.is_empty() {
            return Err(ProcessingError::Config(format!(
                "Parameter catalog for {} is empty",
                station_id
            )));
        }

        Ok(Self {
            codes: ordered,
            slots,
        })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// 1-based slot of a parameter code, matched after trimming
    pub fn slot_of(&self, code: &str) -> Option<usize> {
        self.slots.get(code.trim()).copied()
    }

    pub fn code_at(&self, slot: usize) -> Option<&str> {
        slot.checked_sub(1)
            .and_then(|i| self.codes.get(i))
            .map(String::as_str)
    }

    pub fn column_names(&self) -> Vec<String> {
        (1..=self.len()).map(slot_column_name).collect()
    }

    /// `Data i` column to parameter code pairs, in slot order
    pub fn column_mapping(&self) -> Vec<(String, String)> {
        self.codes
            .iter()
            .enumerate()
            .map(|(i, code)| (slot_column_name(i + 1), code.clone()))
            .collect()
    }
}
