//! In-memory knapsack instances and their line-oriented text encoding.
//!
//! The on-disk form is one header line `<item_count> <capacity>` followed by
//! one `<weight> <value>` line per item, every line newline-terminated.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use shared::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub weight: u64,
    pub value: u64,
}

impl Item {
    pub fn new(weight: u64, value: u64) -> Self {
        Self { weight, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    capacity: u64,
    items: Vec<Item>,
}

impl Instance {
    /// Build an instance, rejecting empty item lists and zero magnitudes.
    pub fn new(capacity: u64, items: Vec<Item>) -> AppResult<Self> {
        if items.is_empty() {
            return Err(AppError::InvalidParameter(
                "an instance needs at least one item".into(),
            ));
        }
        if capacity == 0 {
            return Err(AppError::InvalidParameter(
                "instance capacity must be positive".into(),
            ));
        }
        if let Some(position) = items
            .iter()
            .position(|item| item.weight == 0 || item.value == 0)
        {
            return Err(AppError::InvalidParameter(format!(
                "item {} has a zero weight or value",
                position + 1
            )));
        }
        Ok(Self { capacity, items })
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn encode(&self) -> String {
        // Roughly two short integers per line.
        let mut out = String::with_capacity((self.items.len() + 1) * 16);
        let _ = writeln!(out, "{} {}", self.items.len(), self.capacity);
        for item in &self.items {
            let _ = writeln!(out, "{} {}", item.weight, item.value);
        }
        out
    }

    /// Parse the text encoding back into an instance.
    pub fn decode(text: &str) -> AppResult<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| AppError::MalformedInstance("empty instance file".into()))?;
        let (count, capacity) = parse_pair(header, 1)?;

        let items = lines
            .enumerate()
            .map(|(offset, line)| {
                parse_pair(line, offset + 2).map(|(weight, value)| Item::new(weight, value))
            })
            .collect::<AppResult<Vec<_>>>()?;

        if items.len() as u64 != count {
            return Err(AppError::MalformedInstance(format!(
                "header declares {count} items but {} item lines follow",
                items.len()
            )));
        }

        Self::new(capacity, items).map_err(|err| AppError::MalformedInstance(err.to_string()))
    }

    /// Write the encoded instance, replacing any existing file at `path`.
    pub fn write_to(&self, path: &Path) -> AppResult<()> {
        fs::write(path, self.encode())
            .map_err(|err| AppError::io(format!("failed to write instance {path:?}"), err))
    }

    pub fn read_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| AppError::io(format!("failed to read instance {path:?}"), err))?;
        Self::decode(&contents)
    }
}

fn parse_pair(line: &str, line_number: usize) -> AppResult<(u64, u64)> {
    let mut fields = line.split(' ');
    let (Some(first), Some(second), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(AppError::MalformedInstance(format!(
            "line {line_number} must hold exactly two space-separated integers"
        )));
    };
    let parse = |token: &str| {
        token.parse::<u64>().map_err(|err| {
            AppError::MalformedInstance(format!("line {line_number}: {token:?} is not an integer ({err})"))
        })
    };
    Ok((parse(first)?, parse(second)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instance {
        Instance::new(11, vec![Item::new(5, 5), Item::new(3, 7), Item::new(5, 5)]).unwrap()
    }

    #[test]
    fn encodes_header_then_one_line_per_item() {
        assert_eq!(sample().encode(), "3 11\n5 5\n3 7\n5 5\n");
    }

    #[test]
    fn decode_reverses_encode() {
        let instance = sample();
        let decoded = Instance::decode(&instance.encode()).unwrap();
        assert_eq!(decoded, instance);
        assert_eq!(decoded.item_count(), 3);
    }

    #[test]
    fn rejects_invariant_violations() {
        assert!(Instance::new(10, Vec::new()).is_err());
        assert!(Instance::new(0, vec![Item::new(1, 1)]).is_err());
        assert!(Instance::new(10, vec![Item::new(1, 0)]).is_err());
    }

    #[test]
    fn decode_rejects_count_mismatch() {
        let err = Instance::decode("2 10\n1 1\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedInstance(_)));
    }

    #[test]
    fn decode_rejects_non_integer_tokens() {
        assert!(Instance::decode("1 10\n1 x\n").is_err());
        assert!(Instance::decode("1 10\n1  2\n").is_err());
        assert!(Instance::decode("").is_err());
    }
}
