/// One table row. `position` is the unique, stable key used when merging
/// an edited copy back into the canonical list.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub position: u32,
    pub name: String,
    pub weight: f64,
    pub symbol: String,
}

impl Element {
    pub fn new(position: u32, name: &str, weight: f64, symbol: &str) -> Self {
        Self {
            position,
            name: name.to_string(),
            weight,
            symbol: symbol.to_string(),
        }
    }

    /// Every field in its textual form, in column order.
    pub fn cells(&self) -> [String; 4] {
        [
            self.position.to_string(),
            self.name.clone(),
            self.weight.to_string(),
            self.symbol.clone(),
        ]
    }

    /// Case-insensitive substring match against any field, numeric fields
    /// included in their textual form. An empty needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.cells()
            .iter()
            .any(|cell| cell.to_lowercase().contains(&needle))
    }
}

/// The fixed working set the application is seeded with.
pub fn seed_elements() -> Vec<Element> {
    vec![
        Element::new(1, "Hydrogen", 1.0079, "H"),
        Element::new(2, "Helium", 4.0026, "He"),
        Element::new(3, "Lithium", 6.941, "Li"),
        Element::new(4, "Beryllium", 9.0122, "Be"),
        Element::new(5, "Boron", 10.811, "B"),
        Element::new(6, "Carbon", 12.0107, "C"),
        Element::new(7, "Nitrogen", 14.0067, "N"),
        Element::new(8, "Oxygen", 15.9994, "O"),
        Element::new(9, "Fluorine", 18.9984, "F"),
        Element::new(10, "Neon", 20.1797, "Ne"),
    ]
}
