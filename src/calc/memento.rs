use super::models::Calculation;

/// A frozen copy of the history taken before a mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    entries: Vec<Calculation>,
}

impl Snapshot {
    pub fn new(entries: Vec<Calculation>) -> Self {
        Self { entries }
    }

    pub fn into_entries(self) -> Vec<Calculation> {
        self.entries
    }
}

#[cfg(test)]
impl Snapshot {
    pub fn entries(&self) -> &[Calculation] {
        &self.entries
    }
}
